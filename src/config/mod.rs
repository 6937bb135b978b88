//! 配置管理
//!
//! 分层加载：`config.toml` → `config.{APP_ENV}.toml` → `EXAMSYSTEM_*` 环境变量 → 常用环境变量覆盖。

#[path = "impl.rs"]
mod loader;
mod structs;

pub use structs::*;
