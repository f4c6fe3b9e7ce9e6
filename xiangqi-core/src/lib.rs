//! 中国象棋规则引擎
//!
//! 包含:
//! - 棋子、坐标、棋盘等核心数据结构
//! - 走法生成、将军检测和走法验证
//! - 对局状态机（回合、悔棋、认输、暂停、AI 控制）
//! - 自由摆子验证和棋局描述
//! - FEN 格式和 Zobrist 局面哈希

mod board;
mod check;
mod constants;
mod description;
mod error;
mod fen;
mod moves;
mod piece;
mod session;
mod setup;
mod validator;
mod zobrist;

pub use board::Board;
pub use check::CheckDetector;
pub use constants::*;
pub use description::{BoardDescription, PlacedPiece};
pub use error::{ChessError, IllegalMoveReason, Operation, PlacementRule, Result};
pub use fen::{Fen, INITIAL_FEN};
pub use moves::{Move, MoveGenerator};
pub use piece::{Piece, PieceKind, Side, Square};
pub use session::{
    AiControl, AppliedMove, DrawReason, GameMode, GameResult, GameSession, GameSnapshot,
    HistoryEntry, SessionConfig, SessionStatus, WinReason,
};
pub use setup::SetupValidator;
pub use validator::MoveValidator;
pub use zobrist::{position_key, ZobristTable};
