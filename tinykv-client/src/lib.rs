//! # tinykv-client
//!
//! Client library for tinykv.
//!
//! This crate provides:
//! - Immutable connection configuration with resolved defaults
//! - An async session owning exactly one socket
//! - Strict request/response alternation (the protocol has no request IDs)
//! - Typed results for PING, GET, SET, EXISTS and DELETE

pub mod config;
pub mod error;
pub mod session;

pub use config::{ConnectionConfig, ConnectionConfigBuilder};
pub use error::ClientError;
pub use session::{Session, SessionState};
