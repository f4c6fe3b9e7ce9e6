//! 服务端错误类型

use thiserror::Error;
use xiangqi_core::ChessError;

/// 对局编号
pub type GameId = u64;

/// 服务端错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServerError {
    /// 对局不存在
    #[error("Game {0} not found")]
    GameNotFound(GameId),

    /// 对局任务已经停止
    #[error("Game {0} session closed")]
    SessionClosed(GameId),

    /// 规则引擎拒绝了命令
    #[error(transparent)]
    Chess(#[from] ChessError),
}

/// 服务端操作结果类型
pub type Result<T> = std::result::Result<T, ServerError>;
