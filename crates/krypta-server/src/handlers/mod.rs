//! Request handlers, one module per API area

pub mod admin;
pub mod blob;
pub mod bucket;
pub mod directory;
pub mod file;
pub mod health;
pub mod metrics;
pub mod user;
