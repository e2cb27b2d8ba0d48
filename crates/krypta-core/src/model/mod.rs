//! Entity models backing the metadata store tables

mod blob;
mod bucket;
mod directory;
mod file;
mod session;
mod user;

pub use blob::{Blob, BlobStatus};
pub use bucket::{Bucket, BucketOverview, BucketPermission, BucketPermissionFlag};
pub use directory::Directory;
pub use file::File;
pub use session::{CachedSession, Session, SessionListEntry};
pub use user::{AuthData, GlobalPermission, User, UserListItem};
