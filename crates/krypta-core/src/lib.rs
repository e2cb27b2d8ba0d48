//! # Krypta core
//!
//! Domain layer of the Krypta end-to-end encrypted file storage server:
//! entity models, the error taxonomy, identifier and password primitives,
//! sqlx repositories over the metadata store, and the services that hold
//! the business rules (sessions, authorization, namespace, blobs, users).
//!
//! The server never sees plaintext content or keys: blob bytes, `cryptData`
//! and `encryptedMetaData` values pass through as opaque strings.

pub mod error;
pub mod ident;
pub mod model;
pub mod password;
pub mod repo;
pub mod service;

pub use error::{Error, Result};
