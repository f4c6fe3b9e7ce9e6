//! 将军检测

use crate::board::Board;
use crate::moves::MoveGenerator;
use crate::piece::Side;
use crate::validator::MoveValidator;

/// 将军检测器
pub struct CheckDetector;

impl CheckDetector {
    /// 检查指定方是否被将军
    ///
    /// 将帅照面同样算作双方被将军；没有将的一方视为被将军。
    pub fn is_in_check(board: &Board, side: Side) -> bool {
        let Some(general) = board.find_general(side) else {
            return true;
        };

        if board.generals_facing() {
            return true;
        }

        board.pieces(side.opponent()).into_iter().any(|(origin, _)| {
            MoveGenerator::destinations(board, origin).contains(&general)
        })
    }

    /// 指定方是否还有合法走法
    pub fn has_legal_move(board: &Board, side: Side) -> bool {
        board.squares_of(side).into_iter().any(|origin| {
            MoveGenerator::destinations(board, origin)
                .into_iter()
                .any(|to| !MoveValidator::leaves_in_check(board, side, origin, to))
        })
    }

    /// 检查是否被将死
    pub fn is_checkmate(board: &Board, side: Side) -> bool {
        Self::is_in_check(board, side) && !Self::has_legal_move(board, side)
    }

    /// 检查是否困毙（未被将军但无子可动）
    pub fn is_stalemate(board: &Board, side: Side) -> bool {
        !Self::is_in_check(board, side) && !Self::has_legal_move(board, side)
    }
}
