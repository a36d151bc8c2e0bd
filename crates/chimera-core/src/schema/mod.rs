//! Declarative payload validation.
//!
//! A deliberately small subset of JSON Schema: required fields, primitive
//! kinds, element schemas for arrays, nested schemas for objects, and closed
//! objects via `additionalProperties: false`. Nothing else is interpreted.

pub mod validator;

pub use validator::{validate, validate_excluding};
