//! Repositories over the metadata store
//!
//! One repository per table, each a thin wrapper around the shared
//! `PgPool`. Mutations are single-statement updates; the one multi-row
//! invariant (bucket + root directory + creator permission) commits inside
//! a transaction in [`BucketRepo::create_bucket_graph`].

mod blobs;
mod buckets;
mod directories;
mod files;
mod sessions;
mod users;

pub use blobs::BlobRepo;
pub use buckets::BucketRepo;
pub use directories::DirectoryRepo;
pub use files::FileRepo;
pub use sessions::SessionRepo;
pub use users::UserRepo;
