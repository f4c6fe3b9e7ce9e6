//! 错误类型定义

use std::fmt;

use thiserror::Error;

use crate::piece::{PieceKind, Side, Square};

/// 走法被拒绝的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMoveReason {
    /// 起点没有棋子
    NoPiece,
    /// 不是该方的回合
    NotYourTurn,
    /// 游戏已结束
    GameOver,
    /// 不符合棋子的走法规则
    InvalidPattern,
    /// 走完后己方将帅被将军
    LeavesGeneralInCheck,
}

impl fmt::Display for IllegalMoveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IllegalMoveReason::NoPiece => "no piece on origin square",
            IllegalMoveReason::NotYourTurn => "not your turn",
            IllegalMoveReason::GameOver => "game is already over",
            IllegalMoveReason::InvalidPattern => "piece cannot move there",
            IllegalMoveReason::LeavesGeneralInCheck => "move would leave general in check",
        };
        f.write_str(text)
    }
}

/// 状态机操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Move,
    AiMove,
    Undo,
    Resign,
    Pause,
    Resume,
    ToggleAi,
}

/// 摆子违反的规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementRule {
    /// 棋子不能放在该位置
    Position,
    /// 超过该棋子的数量上限
    CountCap,
    /// 目标位置已有棋子
    Occupied,
    /// 缺少将/帅
    MissingGeneral,
    /// 将帅照面
    FacingGenerals,
}

/// 规则引擎错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    /// 坐标越界
    #[error("Square out of bounds: ({row}, {col})")]
    OutOfBounds { row: u8, col: u8 },

    /// 非法走法
    #[error("Illegal move from {from} to {to}: {reason}")]
    IllegalMove {
        from: Square,
        to: Square,
        reason: IllegalMoveReason,
    },

    /// 当前状态不允许该操作
    #[error("Cannot {operation:?} now: {reason}")]
    InvalidTransition {
        operation: Operation,
        reason: String,
    },

    /// 摆子违规
    #[error("Cannot place {side:?} {kind:?} at {square}: {rule:?}")]
    PlacementViolation {
        side: Side,
        kind: PieceKind,
        square: Square,
        rule: PlacementRule,
    },

    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },

    /// 无效的棋局描述
    #[error("Invalid board description: {reason}")]
    InvalidDescription { reason: String },
}

impl ChessError {
    pub(crate) fn illegal(from: Square, to: Square, reason: IllegalMoveReason) -> Self {
        ChessError::IllegalMove { from, to, reason }
    }

    pub(crate) fn transition(operation: Operation, reason: impl Into<String>) -> Self {
        ChessError::InvalidTransition {
            operation,
            reason: reason.into(),
        }
    }
}

/// 规则操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
