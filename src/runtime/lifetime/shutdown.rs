use tokio::signal;
use tracing::{error, warn};

/// 等待 Ctrl+C；进行中的 WebSocket 连接随服务器一起关闭
pub async fn listen_for_shutdown() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, initiating graceful shutdown...");
}
