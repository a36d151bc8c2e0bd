//! HTTP/REST API layer for Chimera.
//!
//! Axum-based REST API at `/api/v1/` exposing the loaded skill contracts and
//! skill invocation.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
