pub mod memory;
pub mod postgres;
mod traits;

pub use traits::*;

use std::sync::Arc;

use sqlx::PgPool;

/// Aggregate handle over every store, injected into the service layer.
///
/// All state lives behind these traits; the engine keeps no caches of counts
/// or flags.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub videos: Arc<dyn VideoStore>,
    pub comments: Arc<dyn CommentStore>,
    pub tweets: Arc<dyn TweetStore>,
    pub playlists: Arc<dyn PlaylistStore>,
    pub likes: Arc<dyn LikeStore>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
}

impl Stores {
    /// Connect PostgreSQL-backed stores using the shared pool settings
    pub async fn connect(config: &crate::config::Config) -> crate::error::Result<Self> {
        let db_config = db_pool::DbConfig {
            service_name: "engagement-service".to_string(),
            database_url: config.database.url.clone(),
            max_connections: config.database.max_connections,
            min_connections: config.database.min_connections,
            ..db_pool::DbConfig::default()
        };
        db_config.log_config();

        let pool = db_pool::create_pool(db_config).await?;
        Ok(Self::postgres(pool))
    }

    /// PostgreSQL-backed stores sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PgUserStore::new(pool.clone())),
            videos: Arc::new(postgres::PgVideoStore::new(pool.clone())),
            comments: Arc::new(postgres::PgCommentStore::new(pool.clone())),
            tweets: Arc::new(postgres::PgTweetStore::new(pool.clone())),
            playlists: Arc::new(postgres::PgPlaylistStore::new(pool.clone())),
            likes: Arc::new(postgres::PgLikeStore::new(pool.clone())),
            subscriptions: Arc::new(postgres::PgSubscriptionStore::new(pool)),
        }
    }

    /// In-memory stores for tests and single-process deployments
    pub fn memory() -> Self {
        let store = Arc::new(memory::MemoryStore::new());
        Self {
            users: store.clone(),
            videos: store.clone(),
            comments: store.clone(),
            tweets: store.clone(),
            playlists: store.clone(),
            likes: store.clone(),
            subscriptions: store,
        }
    }
}
