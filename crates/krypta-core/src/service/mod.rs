//! Business services
//!
//! Services own the rules; repositories own the SQL. Handlers call
//! services, services call repositories and the storage adapters.

pub mod access;
pub mod admin;
pub mod auth;
pub mod blob;
pub mod bucket;
pub mod directory;
pub mod file;
pub mod metrics;
pub mod session;
pub mod user;

pub use access::{
    ensure_directory_in_bucket, ensure_file_in_bucket, require_global_permission,
};
pub use admin::{AdminService, DefaultAdmin};
pub use auth::AuthService;
pub use blob::BlobService;
pub use bucket::BucketService;
pub use directory::DirectoryService;
pub use file::FileService;
pub use metrics::MetricsService;
pub use session::SessionService;
pub use user::UserService;
