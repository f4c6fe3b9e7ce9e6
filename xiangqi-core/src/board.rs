//! 棋盘

use crate::constants::{BOARD_COLS, BOARD_SIZE};
use crate::error::Result;
use crate::piece::{Piece, PieceKind, Side, Square};

/// 底线棋子排列（从第 0 列到第 8 列）
const BACK_RANK: [PieceKind; BOARD_COLS] = [
    PieceKind::Chariot,
    PieceKind::Horse,
    PieceKind::Elephant,
    PieceKind::Advisor,
    PieceKind::General,
    PieceKind::Advisor,
    PieceKind::Elephant,
    PieceKind::Horse,
    PieceKind::Chariot,
];

/// 棋盘
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// 10x9 棋盘，索引为 row * 9 + col
    squares: Vec<Option<Piece>>,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: vec![None; BOARD_SIZE],
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::empty();

        for (side, back, cannon, soldier) in [(Side::Black, 0, 2, 3), (Side::Red, 9, 7, 6)] {
            for (col, kind) in BACK_RANK.iter().enumerate() {
                board.put(Square::new_unchecked(back, col as u8), Some(Piece::new(side, *kind)));
            }
            for col in [1, 7] {
                board.put(
                    Square::new_unchecked(cannon, col),
                    Some(Piece::new(side, PieceKind::Cannon)),
                );
            }
            for col in (0..BOARD_COLS as u8).step_by(2) {
                board.put(
                    Square::new_unchecked(soldier, col),
                    Some(Piece::new(side, PieceKind::Soldier)),
                );
            }
        }

        board
    }

    /// 获取指定位置的棋子，越界返回 `OutOfBounds`
    pub fn piece_at(&self, square: Square) -> Result<Option<Piece>> {
        let square = square.validate()?;
        Ok(self.squares[square.to_index()])
    }

    /// 设置指定位置的棋子，越界返回 `OutOfBounds`
    pub fn set(&mut self, square: Square, piece: Option<Piece>) -> Result<()> {
        let square = square.validate()?;
        self.squares[square.to_index()] = piece;
        Ok(())
    }

    /// 获取指定位置的棋子（越界视为空）
    pub fn get(&self, square: Square) -> Option<Piece> {
        if square.is_valid() {
            self.squares[square.to_index()]
        } else {
            None
        }
    }

    /// 内部写入，坐标由调用方保证合法
    pub(crate) fn put(&mut self, square: Square, piece: Option<Piece>) {
        debug_assert!(square.is_valid(), "square {square} out of bounds");
        self.squares[square.to_index()] = piece;
    }

    /// 移动棋子（不检查规则），返回被吃的棋子
    ///
    /// 两个坐标都必须在棋盘内。
    pub fn move_piece(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.get(from);
        let captured = self.get(to);
        self.put(from, None);
        self.put(to, piece);
        captured
    }

    /// 查找指定阵营的将/帅位置
    pub fn find_general(&self, side: Side) -> Option<Square> {
        self.all_pieces()
            .into_iter()
            .find(|(_, piece)| piece.side == side && piece.kind == PieceKind::General)
            .map(|(square, _)| square)
    }

    /// 获取指定阵营所有棋子所在的坐标
    pub fn squares_of(&self, side: Side) -> Vec<Square> {
        self.pieces(side).into_iter().map(|(square, _)| square).collect()
    }

    /// 获取指定阵营的所有棋子
    pub fn pieces(&self, side: Side) -> Vec<(Square, Piece)> {
        self.all_pieces()
            .into_iter()
            .filter(|(_, piece)| piece.side == side)
            .collect()
    }

    /// 获取所有棋子（按行优先）
    pub fn all_pieces(&self) -> Vec<(Square, Piece)> {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(index, piece)| Some((Square::from_index(index)?, (*piece)?)))
            .collect()
    }

    /// 统计指定阵营某种棋子的数量
    pub fn count(&self, side: Side, kind: PieceKind) -> usize {
        self.squares
            .iter()
            .flatten()
            .filter(|piece| piece.side == side && piece.kind == kind)
            .count()
    }

    /// 检查两个将是否面对面（同一列且中间无子）
    pub fn generals_facing(&self) -> bool {
        let (Some(red), Some(black)) = (
            self.find_general(Side::Red),
            self.find_general(Side::Black),
        ) else {
            return false;
        };

        if red.col != black.col {
            return false;
        }

        let (top, bottom) = if black.row < red.row {
            (black.row, red.row)
        } else {
            (red.row, black.row)
        };

        ((top + 1)..bottom).all(|row| self.get(Square::new_unchecked(row, red.col)).is_none())
    }

    /// 完整的 10x9 网格快照（第 0 行在前）
    pub fn grid(&self) -> Vec<Vec<Option<Piece>>> {
        self.squares
            .chunks(BOARD_COLS)
            .map(|row| row.to_vec())
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}
