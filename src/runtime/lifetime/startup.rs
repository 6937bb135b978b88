use crate::cache::{MokaCacheWrapper, ObjectCache};
use crate::config::AppConfig;
use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 创建存储实例并执行迁移
async fn create_storage() -> crate::errors::Result<Arc<dyn Storage>> {
    let storage = SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}

/// 创建内存缓存
fn create_cache() -> Arc<dyn ObjectCache> {
    let config = AppConfig::get();
    debug!(
        "Creating in-memory cache (max capacity: {}, ttl: {}s)",
        config.cache.memory.max_capacity, config.cache.default_ttl
    );
    Arc::new(MokaCacheWrapper::from_config())
}

/// 准备服务器启动的上下文
pub async fn prepare_server_startup() -> StartupContext {
    let storage = create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    let cache = create_cache();
    warn!("Cache backend initialized");

    StartupContext { storage, cache }
}
