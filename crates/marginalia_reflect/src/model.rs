//! Class model input.
//!
//! Rust has no runtime class reflection, so the structure a reflect is built
//! from is declared up front: a [`Constructor`] names the class, links its
//! parent, and lists its own instance and static members. A [`Body`] is an
//! optional literal shape carrying declared member types, read through the
//! [`TypeIntrospector`](crate::TypeIntrospector).

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use marginalia_foundation::{ClassId, Type};

use crate::filter::Kind;
use crate::introspect::MemberType;

/// A callable member value: a name and its declared arity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Callable {
    /// Function name.
    pub name: Arc<str>,
    /// Number of declared formal parameters.
    pub arity: usize,
}

impl Callable {
    /// Creates a callable with the given name and arity.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    /// Returns the name, optionally decorated with the call signature.
    #[must_use]
    pub fn signed(&self, with_signature: bool) -> String {
        if with_signature {
            format!("{}/{}", self.name, self.arity)
        } else {
            self.name.to_string()
        }
    }
}

/// The value held by a member: a callable makes it a method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberValue {
    /// Plain data.
    Field,
    /// A callable.
    Method(Callable),
}

/// An own member of a class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberDef {
    /// Member name.
    pub name: Arc<str>,
    /// Member value.
    pub value: MemberValue,
}

impl MemberDef {
    /// Returns whether this member is a field or a method.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self.value {
            MemberValue::Field => Kind::Field,
            MemberValue::Method(_) => Kind::Method,
        }
    }

    /// Returns the callable for methods.
    #[must_use]
    pub fn callable(&self) -> Option<&Callable> {
        match &self.value {
            MemberValue::Method(c) => Some(c),
            MemberValue::Field => None,
        }
    }
}

#[derive(Debug)]
struct ClassDef {
    name: Arc<str>,
    parent: Option<Constructor>,
    builtin: bool,
    instance_members: Vec<MemberDef>,
    static_members: Vec<MemberDef>,
}

/// Identity of a class.
///
/// Two constructors are the same class only if they come from the same
/// allocation. Cloning is O(1) and preserves identity.
#[derive(Clone)]
pub struct Constructor(Arc<ClassDef>);

impl Constructor {
    /// Starts declaring a class with the given fully-qualified name.
    #[must_use]
    pub fn builder(name: impl Into<Arc<str>>) -> ConstructorBuilder {
        ConstructorBuilder {
            def: ClassDef {
                name: name.into(),
                parent: None,
                builtin: false,
                instance_members: Vec::new(),
                static_members: Vec::new(),
            },
        }
    }

    /// Declares a built-in root class (never recorded as a parent).
    #[must_use]
    pub fn builtin(name: impl Into<Arc<str>>) -> Self {
        let mut builder = Self::builder(name);
        builder.def.builtin = true;
        builder.build()
    }

    /// Returns the fully-qualified class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the parent constructor, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Constructor> {
        self.0.parent.as_ref()
    }

    /// Returns true for built-in root classes.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.0.builtin
    }

    /// Returns the own instance members, in declaration order.
    #[must_use]
    pub fn instance_members(&self) -> &[MemberDef] {
        &self.0.instance_members
    }

    /// Returns the own static members, in declaration order.
    #[must_use]
    pub fn static_members(&self) -> &[MemberDef] {
        &self.0.static_members
    }

    /// Returns the name, optionally decorated with the number of own members.
    #[must_use]
    pub fn signed(&self, with_signature: bool) -> String {
        if with_signature {
            format!(
                "class {} {{{}+{}}}",
                self.0.name,
                self.0.instance_members.len(),
                self.0.static_members.len()
            )
        } else {
            self.0.name.to_string()
        }
    }

    /// Returns true if both constructors come from the same allocation.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Constructor {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Constructor {}

impl Hash for Constructor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constructor({})", self.0.name)
    }
}

/// Builder for [`Constructor`].
#[derive(Debug)]
pub struct ConstructorBuilder {
    def: ClassDef,
}

impl ConstructorBuilder {
    /// Sets the parent class.
    #[must_use]
    pub fn extends(mut self, parent: &Constructor) -> Self {
        self.def.parent = Some(parent.clone());
        self
    }

    /// Adds an own instance field.
    #[must_use]
    pub fn field(mut self, name: impl Into<Arc<str>>) -> Self {
        self.def.instance_members.push(MemberDef {
            name: name.into(),
            value: MemberValue::Field,
        });
        self
    }

    /// Adds an own instance method with the given arity.
    #[must_use]
    pub fn method(mut self, name: impl Into<Arc<str>>, arity: usize) -> Self {
        let name = name.into();
        self.def.instance_members.push(MemberDef {
            value: MemberValue::Method(Callable::new(name.clone(), arity)),
            name,
        });
        self
    }

    /// Adds an own static field.
    #[must_use]
    pub fn static_field(mut self, name: impl Into<Arc<str>>) -> Self {
        self.def.static_members.push(MemberDef {
            name: name.into(),
            value: MemberValue::Field,
        });
        self
    }

    /// Adds an own static method with the given arity.
    #[must_use]
    pub fn static_method(mut self, name: impl Into<Arc<str>>, arity: usize) -> Self {
        let name = name.into();
        self.def.static_members.push(MemberDef {
            value: MemberValue::Method(Callable::new(name.clone(), arity)),
            name,
        });
        self
    }

    /// Finishes the declaration.
    #[must_use]
    pub fn build(self) -> Constructor {
        Constructor(Arc::new(self.def))
    }
}

/// A literal class body snapshot: declared member types.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Body {
    members: HashMap<Arc<str>, MemberType>,
}

impl Body {
    /// Creates an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field type.
    #[must_use]
    pub fn field(mut self, name: impl Into<Arc<str>>, ty: Type) -> Self {
        self.members.insert(name.into(), MemberType::Field(ty));
        self
    }

    /// Declares a method signature.
    #[must_use]
    pub fn method(mut self, name: impl Into<Arc<str>>, params: Vec<Type>, returns: Option<Type>) -> Self {
        self.members
            .insert(name.into(), MemberType::Method { params, returns });
        self
    }

    /// Returns the declared type of a member.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberType> {
        self.members.get(name)
    }

    /// Returns a callable for a declared method, derived from its signature.
    #[must_use]
    pub fn callable(&self, name: &str) -> Option<Callable> {
        match self.members.get(name) {
            Some(MemberType::Method { params, .. }) => Some(Callable::new(name, params.len())),
            _ => None,
        }
    }

    /// Returns the number of declared members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// An instance of a class, optionally carrying its literal body.
#[derive(Clone, Debug)]
pub struct Object {
    constructor: Constructor,
    body: Option<Arc<Body>>,
}

impl Object {
    /// Creates an instance of the given class.
    #[must_use]
    pub fn new(constructor: &Constructor) -> Self {
        Self {
            constructor: constructor.clone(),
            body: None,
        }
    }

    /// Attaches a literal body to this instance.
    #[must_use]
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(Arc::new(body));
        self
    }

    /// Returns the instance's constructor.
    #[must_use]
    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    /// Returns the literal body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&Arc<Body>> {
        self.body.as_ref()
    }
}

/// Any of the shapes a class can be referred to by.
#[derive(Clone, Copy, Debug)]
pub enum ClassRef<'a> {
    /// The class itself.
    Constructor(&'a Constructor),
    /// The fully-qualified name of a registered class.
    Name(&'a str),
    /// An instance, resolved through its constructor.
    Object(&'a Object),
    /// A class reflect id.
    Id(ClassId),
}

impl fmt::Display for ClassRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructor(c) => write!(f, "{}", c.name()),
            Self::Name(n) => write!(f, "{n}"),
            Self::Object(o) => write!(f, "<instance>{}", o.constructor().name()),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

impl<'a> From<&'a Constructor> for ClassRef<'a> {
    fn from(c: &'a Constructor) -> Self {
        Self::Constructor(c)
    }
}

impl<'a> From<&'a str> for ClassRef<'a> {
    fn from(n: &'a str) -> Self {
        Self::Name(n)
    }
}

impl<'a> From<&'a Object> for ClassRef<'a> {
    fn from(o: &'a Object) -> Self {
        Self::Object(o)
    }
}

impl From<ClassId> for ClassRef<'_> {
    fn from(id: ClassId) -> Self {
        Self::Id(id)
    }
}
