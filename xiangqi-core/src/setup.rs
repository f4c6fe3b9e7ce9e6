//! 自由摆子验证

use tracing::debug;

use crate::board::Board;
use crate::error::{ChessError, PlacementRule, Result};
use crate::piece::{Piece, PieceKind, Side, Square};

/// 红方仕的合法位置
const RED_ADVISOR_POINTS: [(u8, u8); 5] = [(7, 3), (7, 5), (8, 4), (9, 3), (9, 5)];

/// 红方相的合法位置
const RED_ELEPHANT_POINTS: [(u8, u8); 7] =
    [(5, 2), (5, 6), (7, 0), (7, 4), (7, 8), (9, 2), (9, 6)];

/// 兵在己方半场允许的列
const SOLDIER_HOME_COLS: [u8; 5] = [0, 2, 4, 6, 8];

/// 摆子验证器
pub struct SetupValidator;

impl SetupValidator {
    /// 棋子能否放在该位置（不考虑占用和数量）
    pub fn is_valid_placement(side: Side, kind: PieceKind, square: Square) -> bool {
        if !square.is_valid() {
            return false;
        }

        match kind {
            PieceKind::General => square.in_palace(side),
            PieceKind::Advisor => on_fixed_point(&RED_ADVISOR_POINTS, side, square),
            PieceKind::Elephant => on_fixed_point(&RED_ELEPHANT_POINTS, side, square),
            PieceKind::Soldier => {
                square.has_crossed_river(side) || SOLDIER_HOME_COLS.contains(&square.col)
            }
            PieceKind::Horse | PieceKind::Chariot | PieceKind::Cannon => true,
        }
    }

    /// 检查在当前棋盘上摆放该棋子是否合法
    pub fn check_placement(board: &Board, side: Side, kind: PieceKind, square: Square) -> Result<()> {
        let square = square.validate()?;
        let violation = |rule| ChessError::PlacementViolation {
            side,
            kind,
            square,
            rule,
        };

        if !Self::is_valid_placement(side, kind, square) {
            return Err(violation(PlacementRule::Position));
        }

        if board.get(square).is_some() {
            return Err(violation(PlacementRule::Occupied));
        }

        if board.count(side, kind) >= kind.max_count() {
            return Err(violation(PlacementRule::CountCap));
        }

        Ok(())
    }

    /// 当前棋盘上该棋子所有可摆放的位置
    pub fn legal_placement_squares(board: &Board, side: Side, kind: PieceKind) -> Vec<Square> {
        if board.count(side, kind) >= kind.max_count() {
            return Vec::new();
        }

        Square::all()
            .filter(|&square| board.get(square).is_none())
            .filter(|&square| Self::is_valid_placement(side, kind, square))
            .collect()
    }

    /// 验证后摆放棋子
    pub fn place(board: &mut Board, square: Square, piece: Piece) -> Result<()> {
        Self::check_placement(board, piece.side, piece.kind, square)?;
        board.set(square, Some(piece))?;
        debug!("Placed {:?} {:?} at {}", piece.side, piece.kind, square);
        Ok(())
    }

    /// 验证整个棋盘可以作为自定义开局
    ///
    /// 要求每个棋子位置合法、数量不超限、双方都有将且不照面。
    pub fn validate_board(board: &Board) -> Result<()> {
        for (square, piece) in board.all_pieces() {
            if !Self::is_valid_placement(piece.side, piece.kind, square) {
                return Err(ChessError::PlacementViolation {
                    side: piece.side,
                    kind: piece.kind,
                    square,
                    rule: PlacementRule::Position,
                });
            }
        }

        for side in [Side::Red, Side::Black] {
            for kind in PieceKind::ALL {
                if board.count(side, kind) > kind.max_count() {
                    let square = board
                        .pieces(side)
                        .into_iter()
                        .filter(|(_, piece)| piece.kind == kind)
                        .map(|(square, _)| square)
                        .last()
                        .unwrap_or(Square::new_unchecked(0, 0));
                    return Err(ChessError::PlacementViolation {
                        side,
                        kind,
                        square,
                        rule: PlacementRule::CountCap,
                    });
                }
            }

            if board.find_general(side).is_none() {
                return Err(ChessError::PlacementViolation {
                    side,
                    kind: PieceKind::General,
                    square: palace_center(side),
                    rule: PlacementRule::MissingGeneral,
                });
            }
        }

        if board.generals_facing() {
            let square = board
                .find_general(Side::Red)
                .unwrap_or_else(|| palace_center(Side::Red));
            return Err(ChessError::PlacementViolation {
                side: Side::Red,
                kind: PieceKind::General,
                square,
                rule: PlacementRule::FacingGenerals,
            });
        }

        Ok(())
    }
}

/// 黑方的固定点是红方固定点的上下镜像
fn on_fixed_point(red_points: &[(u8, u8)], side: Side, square: Square) -> bool {
    let row = match side {
        Side::Red => square.row,
        Side::Black => 9 - square.row,
    };
    red_points.contains(&(row, square.col))
}

fn palace_center(side: Side) -> Square {
    match side {
        Side::Red => Square::new_unchecked(8, 4),
        Side::Black => Square::new_unchecked(1, 4),
    }
}
