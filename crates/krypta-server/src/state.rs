//! Application state
//!
//! One `AppState` is built at startup and shared as an `Arc` across
//! handlers. Construction connects and pings every external dependency,
//! runs the schema migrations, and seeds the default admin, so a server
//! that starts is a server that can serve.

use crate::config::Settings;
use crate::metrics::HttpMetrics;
use krypta_core::password::Argon2Config;
use krypta_core::repo::{
    BlobRepo, BucketRepo, DirectoryRepo, FileRepo, SessionRepo, UserRepo,
};
use krypta_core::service::{
    AdminService, AuthService, BlobService, BucketService, DefaultAdmin, DirectoryService,
    FileService, MetricsService, SessionService, UserService,
};
use krypta_store::{ChunkIndex, ObjectStore, ObjectStoreConfig};
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Shared state for the whole HTTP surface.
pub struct AppState {
    pub settings: Settings,
    pub argon2: Argon2Config,
    pub db: PgPool,
    pub redis: ConnectionManager,
    pub sessions: SessionService,
    pub auth: AuthService,
    pub users: UserService,
    pub admin: AdminService,
    pub buckets: BucketService,
    pub directories: DirectoryService,
    pub files: FileService,
    pub blobs: BlobService,
    pub metrics: MetricsService,
    pub http_metrics: HttpMetrics,
}

impl AppState {
    /// Connect every dependency, migrate, wire services, seed the admin.
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(settings.database.max_connections)
            .connect(&settings.database.url)
            .await?;
        sqlx::query("SELECT 1").execute(&db).await?;
        info!("metadata store connection established");

        sqlx::migrate!("./migrations").run(&db).await?;

        let redis_client = redis::Client::open(settings.redis.url.as_str())?;
        let mut redis = ConnectionManager::new(redis_client).await?;
        let _: () = redis::cmd("PING").query_async(&mut redis).await?;
        info!("cache connection established");

        let store = ObjectStore::connect(&ObjectStoreConfig {
            endpoint: settings.object_store.endpoint.clone(),
            access_key: settings.object_store.access_key.clone(),
            secret_key: settings.object_store.secret_key.clone(),
            container: settings.object_store.container.clone(),
            region: settings.object_store.region.clone(),
        })
        .await?;
        store.ensure_container().await?;
        info!(container = %settings.object_store.container, "object store ready");

        let argon2 = settings.argon2_config();

        let user_repo = UserRepo::new(db.clone());
        let session_repo = SessionRepo::new(db.clone());
        let bucket_repo = BucketRepo::new(db.clone());
        let directory_repo = DirectoryRepo::new(db.clone());
        let file_repo = FileRepo::new(db.clone());
        let blob_repo = BlobRepo::new(db.clone());

        let sessions = SessionService::new(
            redis.clone(),
            session_repo,
            settings.iam.api_key_length,
            settings.session_validity(),
        );
        let users = UserService::new(user_repo.clone());
        let auth = AuthService::new(sessions.clone(), users.clone(), settings.iam.api_key_length);
        let admin = AdminService::new(user_repo, sessions.clone(), argon2.clone());
        let buckets = BucketService::new(bucket_repo, directory_repo.clone());
        let directories = DirectoryService::new(directory_repo, file_repo.clone());
        let files = FileService::new(file_repo);
        let blobs = BlobService::new(blob_repo, store.clone(), ChunkIndex::new(redis.clone()));
        let metrics = MetricsService::new(store, settings.blob_storage.capacity_bytes);

        admin
            .seed_default_admin(&DefaultAdmin {
                user_name: settings.iam.default_admin_username.clone(),
                display_name: settings.iam.default_admin_display_name.clone(),
                password: settings.iam.default_admin_password.clone(),
            })
            .await?;

        Ok(Self {
            settings,
            argon2,
            db,
            redis,
            sessions,
            auth,
            users,
            admin,
            buckets,
            directories,
            files,
            blobs,
            metrics,
            http_metrics: HttpMetrics::new()?,
        })
    }
}
