use serde::Deserialize;

use super::entities::UserRole;

/// 同步（创建）用户请求
///
/// 用户由 LMS 同步而来，本服务不处理密码。
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub display_name: Option<String>,
}
