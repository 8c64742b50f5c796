//! Integration tests for Layer 1: Reflect
//!
//! Tests for class registration, property listing, type discovery, and
//! decorator resolution over a bare reflect store.

mod properties;
