//! 走法合法性验证

use crate::board::Board;
use crate::check::CheckDetector;
use crate::error::{ChessError, IllegalMoveReason, Result};
use crate::moves::{Move, MoveGenerator};
use crate::piece::{Piece, Side, Square};

/// 走法验证器
///
/// 在伪合法走法的基础上，逐个在棋盘副本上试走，排除走后己方被将军的走法。
pub struct MoveValidator;

impl MoveValidator {
    /// 起点棋子的所有合法目标位置
    ///
    /// 起点越界返回 `OutOfBounds`，起点无子返回空集合。
    pub fn legal_moves(board: &Board, origin: Square) -> Result<Vec<Square>> {
        let Some(piece) = board.piece_at(origin)? else {
            return Ok(Vec::new());
        };

        Ok(MoveGenerator::destinations(board, origin)
            .into_iter()
            .filter(|&to| !Self::leaves_in_check(board, piece.side, origin, to))
            .collect())
    }

    /// 生成指定方的所有合法走法
    pub fn generate_legal(board: &Board, side: Side) -> Vec<Move> {
        MoveGenerator::generate_pseudo_legal(board, side)
            .into_iter()
            .filter(|mv| !Self::leaves_in_check(board, side, mv.from, mv.to))
            .collect()
    }

    /// 验证 `turn` 方走出的这步棋，返回被移动的棋子
    pub fn validate(board: &Board, turn: Side, mv: Move) -> Result<Piece> {
        let Move { from, to } = mv;
        to.validate()?;

        let Some(piece) = board.piece_at(from)? else {
            return Err(ChessError::illegal(from, to, IllegalMoveReason::NoPiece));
        };

        if piece.side != turn {
            return Err(ChessError::illegal(from, to, IllegalMoveReason::NotYourTurn));
        }

        if !MoveGenerator::destinations(board, from).contains(&to) {
            return Err(ChessError::illegal(from, to, IllegalMoveReason::InvalidPattern));
        }

        if Self::leaves_in_check(board, turn, from, to) {
            return Err(ChessError::illegal(
                from,
                to,
                IllegalMoveReason::LeavesGeneralInCheck,
            ));
        }

        Ok(piece)
    }

    /// 在棋盘副本上试走，判断走后 `side` 是否被将军
    pub fn leaves_in_check(board: &Board, side: Side, from: Square, to: Square) -> bool {
        let mut trial = board.clone();
        trial.move_piece(from, to);
        CheckDetector::is_in_check(&trial, side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::Fen;
    use crate::piece::PieceKind;

    fn sq(row: u8, col: u8) -> Square {
        Square::new_unchecked(row, col)
    }

    #[test]
    fn test_initial_legal_moves() {
        let board = Board::initial();
        assert_eq!(MoveValidator::generate_legal(&board, Side::Red).len(), 44);
        assert_eq!(MoveValidator::generate_legal(&board, Side::Black).len(), 44);
    }

    #[test]
    fn test_legal_moves_empty_origin_and_bounds() {
        let board = Board::initial();
        assert_eq!(MoveValidator::legal_moves(&board, sq(4, 4)), Ok(Vec::new()));
        assert_eq!(
            MoveValidator::legal_moves(&board, sq(10, 0)),
            Err(ChessError::OutOfBounds { row: 10, col: 0 })
        );
    }

    #[test]
    fn test_pinned_chariot() {
        // 红车挡在帅和黑车之间，只能沿 4 列移动
        let (board, _) = Fen::parse("3k5/9/9/9/4r4/9/4R4/9/9/4K4 r").unwrap();
        let targets = MoveValidator::legal_moves(&board, sq(6, 4)).unwrap();

        assert!(!targets.is_empty());
        assert!(targets.iter().all(|to| to.col == 4), "被牵制的车离开了 4 列: {:?}", targets);
        assert!(targets.contains(&sq(4, 4)));
    }

    #[test]
    fn test_blocker_between_generals() {
        // 过河红兵是将帅之间唯一的隔子，横走会让将帅照面
        let (board, _) = Fen::parse("4k4/9/9/9/4P4/9/9/9/9/4K4 r").unwrap();
        assert_eq!(MoveGenerator::destinations(&board, sq(4, 4)).len(), 3);
        let targets = MoveValidator::legal_moves(&board, sq(4, 4)).unwrap();
        assert_eq!(targets, vec![sq(3, 4)]);
    }

    #[test]
    fn test_legal_moves_never_leave_check() {
        let (board, turn) = Fen::parse("3k5/9/9/9/4r4/9/9/9/4A4/3AK4 r").unwrap();
        for mv in MoveValidator::generate_legal(&board, turn) {
            let mut trial = board.clone();
            trial.move_piece(mv.from, mv.to);
            assert!(!CheckDetector::is_in_check(&trial, turn), "{} 走后仍被将军", mv);
        }
    }

    #[test]
    fn test_validate_reasons() {
        let board = Board::initial();
        let reason = |mv: Move| match MoveValidator::validate(&board, Side::Red, mv) {
            Err(ChessError::IllegalMove { reason, .. }) => Some(reason),
            _ => None,
        };

        assert_eq!(
            reason(Move::new(sq(5, 0), sq(4, 0))),
            Some(IllegalMoveReason::NoPiece)
        );
        assert_eq!(
            reason(Move::new(sq(3, 0), sq(4, 0))),
            Some(IllegalMoveReason::NotYourTurn)
        );
        assert_eq!(
            reason(Move::new(sq(9, 0), sq(5, 1))),
            Some(IllegalMoveReason::InvalidPattern)
        );
        assert_eq!(
            MoveValidator::validate(&board, Side::Red, Move::new(sq(7, 1), sq(7, 4))),
            Ok(Piece::new(Side::Red, PieceKind::Cannon))
        );
        assert_eq!(
            MoveValidator::validate(&board, Side::Red, Move::new(sq(7, 1), sq(7, 9))),
            Err(ChessError::OutOfBounds { row: 7, col: 9 })
        );
    }

    #[test]
    fn test_validate_leaves_general_in_check() {
        let (board, _) = Fen::parse("3k5/9/9/9/4r4/9/4R4/9/9/4K4 r").unwrap();
        assert_eq!(
            MoveValidator::validate(&board, Side::Red, Move::new(sq(6, 4), sq(6, 0))),
            Err(ChessError::IllegalMove {
                from: sq(6, 4),
                to: sq(6, 0),
                reason: IllegalMoveReason::LeavesGeneralInCheck,
            })
        );
    }

    #[test]
    fn test_checkmate_every_move_confirms_check() {
        let (board, _) = Fen::parse("R3k4/R8/9/9/9/9/9/9/9/3K5 b").unwrap();
        let pseudo = MoveGenerator::generate_pseudo_legal(&board, Side::Black);
        assert!(!pseudo.is_empty());
        for mv in pseudo {
            assert!(MoveValidator::leaves_in_check(&board, Side::Black, mv.from, mv.to));
        }
        assert!(MoveValidator::generate_legal(&board, Side::Black).is_empty());
    }
}
