//! Application state for intake-cloud

use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use dashmap::DashSet;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::{BackendKind, Config};
use crate::db::memory::MemoryStore;
use crate::db::{FeedbackStore, PgStore, SubmissionStore, UserStore};
use crate::email::{EmailProvider, Notifier};
use crate::error::BoxError;
use crate::live::{FeedbackHub, pg_listener};
use crate::storage::{MemoryObjectStore, ObjectStore, S3Store};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub submissions: Arc<dyn SubmissionStore>,
    pub feedback: Arc<dyn FeedbackStore>,
    /// Uploaded pictures and archives
    pub objects: Arc<dyn ObjectStore>,
    pub notifier: Notifier,
    /// Feedback change feed
    pub hub: FeedbackHub,
    /// (submission, evaluator) pairs with a decision being recorded
    pub decisions_in_flight: Arc<DashSet<(Uuid, Uuid)>>,
    /// JWT secret for session tokens
    pub jwt_secret: String,
}

/// Handles to the in-memory backend, for inspection in tests and tooling
#[derive(Clone)]
pub struct MemoryBackend {
    pub store: Arc<MemoryStore>,
    pub objects: Arc<MemoryObjectStore>,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        match config.backend {
            BackendKind::Postgres => Self::postgres(config).await,
            BackendKind::Memory => {
                tracing::warn!("Using in-memory backend, data is lost on restart");
                let (state, _) = Self::memory(config, Notifier::from_config(config));
                Ok(state)
            }
        }
    }

    async fn postgres(config: &Config) -> Result<Self, BoxError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or("DATABASE_URL must be set for the postgres backend")?;
        let pool = PgPool::connect(url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let hub = FeedbackHub::new();
        pg_listener::spawn(&pool, hub.clone()).await?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let objects = S3Store::new(
            S3Client::new(&aws_config),
            config.storage_s3_bucket.clone(),
            config.storage_public_base_url.clone(),
        );

        let store = Arc::new(PgStore::new(pool));
        Ok(Self {
            users: store.clone(),
            submissions: store.clone(),
            feedback: store,
            objects: Arc::new(objects),
            notifier: Notifier::from_config(config),
            hub,
            decisions_in_flight: Arc::new(DashSet::new()),
            jwt_secret: config.jwt_secret.clone(),
        })
    }

    /// State over in-process stores
    pub fn memory(config: &Config, notifier: Notifier) -> (Self, MemoryBackend) {
        let hub = FeedbackHub::new();
        let store = Arc::new(MemoryStore::new(hub.clone()));
        let objects = Arc::new(MemoryObjectStore::new(config.storage_public_base_url.clone()));

        let state = Self {
            users: store.clone(),
            submissions: store.clone(),
            feedback: store.clone(),
            objects: objects.clone(),
            notifier,
            hub,
            decisions_in_flight: Arc::new(DashSet::new()),
            jwt_secret: config.jwt_secret.clone(),
        };
        (state, MemoryBackend { store, objects })
    }

    /// In-memory state with an explicit email provider
    pub fn memory_with_provider(
        config: &Config,
        provider: Option<Arc<dyn EmailProvider>>,
    ) -> (Self, MemoryBackend) {
        Self::memory(config, Notifier::new(provider))
    }
}
