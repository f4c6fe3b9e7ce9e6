//! 中国象棋对局服务
//!
//! 包含:
//! - 对局任务（每局一个 tokio 任务）
//! - AI 驱动
//! - 对局管理
//! - 服务端配置

pub mod actor;
pub mod config;
pub mod driver;
pub mod error;
pub mod manager;

pub use actor::{AiTurn, SessionHandle};
pub use config::{default_config_path, ServerConfig};
pub use error::{GameId, Result, ServerError};
pub use manager::{GameManager, GameSummary};
