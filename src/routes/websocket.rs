use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, rt, web};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::cache::ObjectCache;
use crate::middlewares::require_jwt::authenticate_token;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::websocket::WebSocketService;
use crate::storage::Storage;

#[derive(Debug, Deserialize)]
pub struct WsConnectQuery {
    pub token: String,
}

// 建立 WebSocket 连接；浏览器无法在握手时设置请求头，令牌走查询参数
pub async fn connect(
    req: HttpRequest,
    body: web::Payload,
    query: web::Query<WsConnectQuery>,
    storage: web::Data<Arc<dyn Storage>>,
    cache: web::Data<Arc<dyn ObjectCache>>,
) -> ActixResult<HttpResponse> {
    let user = match authenticate_token(&query.token, storage.get_ref(), cache.get_ref()).await {
        Ok(user) => user,
        Err(err) => {
            info!("WebSocket authentication failed: {}", err);
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::Unauthorized,
                format!("Unauthorized: {err}"),
            )));
        }
    };

    let (response, session, stream) = actix_ws::handle(&req, body)?;
    rt::spawn(WebSocketService::handle_connection(user.id, session, stream));

    Ok(response)
}

// 配置路由
pub fn configure_websocket_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/v1/ws").route(web::get().to(connect)));
}
