//! 棋子与坐标定义

use serde::{Deserialize, Serialize};

use crate::constants::{
    BLACK_RIVER_ROW, BOARD_COLS, BOARD_ROWS, PALACE_MAX_COL, PALACE_MIN_COL, RED_RIVER_ROW,
};
use crate::error::{ChessError, Result};

/// 棋子种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    /// 将/帅
    General,
    /// 士/仕
    Advisor,
    /// 象/相
    Elephant,
    /// 马/傌
    Horse,
    /// 车/俥
    Chariot,
    /// 炮/砲
    Cannon,
    /// 兵/卒
    Soldier,
}

impl PieceKind {
    /// 全部棋子种类
    pub const ALL: [PieceKind; 7] = [
        PieceKind::General,
        PieceKind::Advisor,
        PieceKind::Elephant,
        PieceKind::Horse,
        PieceKind::Chariot,
        PieceKind::Cannon,
        PieceKind::Soldier,
    ];

    /// 每方允许的最大数量
    pub fn max_count(&self) -> usize {
        match self {
            PieceKind::General => 1,
            PieceKind::Soldier => 5,
            _ => 2,
        }
    }

    /// 在 Zobrist 表等数组中的下标
    pub fn index(&self) -> usize {
        match self {
            PieceKind::General => 0,
            PieceKind::Advisor => 1,
            PieceKind::Elephant => 2,
            PieceKind::Horse => 3,
            PieceKind::Chariot => 4,
            PieceKind::Cannon => 5,
            PieceKind::Soldier => 6,
        }
    }

    /// 获取 FEN 字符（红方大写，黑方小写）
    pub fn to_fen_char(&self, side: Side) -> char {
        let c = match self {
            PieceKind::General => 'k',
            PieceKind::Advisor => 'a',
            PieceKind::Elephant => 'b',
            PieceKind::Horse => 'n',
            PieceKind::Chariot => 'r',
            PieceKind::Cannon => 'c',
            PieceKind::Soldier => 'p',
        };
        match side {
            Side::Red => c.to_ascii_uppercase(),
            Side::Black => c,
        }
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<(PieceKind, Side)> {
        let side = if c.is_ascii_uppercase() {
            Side::Red
        } else {
            Side::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'k' => PieceKind::General,
            'a' => PieceKind::Advisor,
            'b' | 'e' => PieceKind::Elephant,
            'n' | 'h' => PieceKind::Horse,
            'r' => PieceKind::Chariot,
            'c' => PieceKind::Cannon,
            'p' => PieceKind::Soldier,
            _ => return None,
        };
        Some((kind, side))
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 红方（先手，在下方，第 5-9 行）
    Red,
    /// 黑方（后手，在上方，第 0-4 行）
    Black,
}

impl Side {
    /// 获取对方阵营
    pub fn opponent(&self) -> Side {
        match self {
            Side::Red => Side::Black,
            Side::Black => Side::Red,
        }
    }

    /// 前进方向的行增量
    pub fn forward(&self) -> i8 {
        match self {
            Side::Red => -1,
            Side::Black => 1,
        }
    }

    /// 数组下标
    pub fn index(&self) -> usize {
        match self {
            Side::Red => 0,
            Side::Black => 1,
        }
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        match self {
            Side::Red => 'r',
            Side::Black => 'b',
        }
    }

    /// 从 FEN 字符解析（兼容 w 表示红方）
    pub fn from_fen_char(c: char) -> Option<Side> {
        match c {
            'r' | 'R' | 'w' | 'W' => Some(Side::Red),
            'b' | 'B' => Some(Side::Black),
            _ => None,
        }
    }
}

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub side: Side,
    pub kind: PieceKind,
}

impl Piece {
    /// 创建新棋子
    pub const fn new(side: Side, kind: PieceKind) -> Self {
        Self { side, kind }
    }

    /// 获取棋子显示的汉字
    pub fn display_char(&self) -> char {
        match (self.kind, self.side) {
            (PieceKind::General, Side::Red) => '帥',
            (PieceKind::General, Side::Black) => '將',
            (PieceKind::Advisor, Side::Red) => '仕',
            (PieceKind::Advisor, Side::Black) => '士',
            (PieceKind::Elephant, Side::Red) => '相',
            (PieceKind::Elephant, Side::Black) => '象',
            (PieceKind::Horse, Side::Red) => '傌',
            (PieceKind::Horse, Side::Black) => '馬',
            (PieceKind::Chariot, Side::Red) => '俥',
            (PieceKind::Chariot, Side::Black) => '車',
            (PieceKind::Cannon, Side::Red) => '炮',
            (PieceKind::Cannon, Side::Black) => '砲',
            (PieceKind::Soldier, Side::Red) => '兵',
            (PieceKind::Soldier, Side::Black) => '卒',
        }
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        self.kind.to_fen_char(self.side)
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Piece> {
        PieceKind::from_fen_char(c).map(|(kind, side)| Piece { side, kind })
    }
}

/// 棋盘交叉点
///
/// 第 0 行是黑方底线，第 9 行是红方底线。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    /// 行 (0-9)
    pub row: u8,
    /// 列 (0-8)
    pub col: u8,
}

impl Square {
    /// 创建新坐标，越界时返回 `OutOfBounds`
    pub fn new(row: u8, col: u8) -> Result<Self> {
        let square = Self { row, col };
        if square.is_valid() {
            Ok(square)
        } else {
            Err(ChessError::OutOfBounds { row, col })
        }
    }

    /// 创建新坐标（不检查边界，内部使用）
    pub const fn new_unchecked(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// 检查坐标是否在棋盘内
    pub fn is_valid(&self) -> bool {
        (self.row as usize) < BOARD_ROWS && (self.col as usize) < BOARD_COLS
    }

    /// 越界时返回 `OutOfBounds`
    pub fn validate(self) -> Result<Self> {
        Self::new(self.row, self.col)
    }

    /// 是否在指定方的半场（未过河）
    pub fn on_own_half(&self, side: Side) -> bool {
        match side {
            Side::Red => self.row >= RED_RIVER_ROW,
            Side::Black => self.row <= BLACK_RIVER_ROW,
        }
    }

    /// 对指定方而言是否已经过河
    pub fn has_crossed_river(&self, side: Side) -> bool {
        !self.on_own_half(side)
    }

    /// 检查是否在指定方的九宫格内
    pub fn in_palace(&self, side: Side) -> bool {
        let in_col = (PALACE_MIN_COL..=PALACE_MAX_COL).contains(&self.col);
        let in_row = match side {
            Side::Red => (7..=9).contains(&self.row),
            Side::Black => (0..=2).contains(&self.row),
        };
        in_col && in_row
    }

    /// 获取偏移后的坐标
    pub fn offset(&self, d_row: i8, d_col: i8) -> Option<Square> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if row >= 0 && (row as usize) < BOARD_ROWS && col >= 0 && (col as usize) < BOARD_COLS {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// 转换为数组索引
    pub fn to_index(&self) -> usize {
        self.row as usize * BOARD_COLS + self.col as usize
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < BOARD_ROWS * BOARD_COLS {
            Some(Square {
                row: (index / BOARD_COLS) as u8,
                col: (index % BOARD_COLS) as u8,
            })
        } else {
            None
        }
    }

    /// 遍历棋盘上所有坐标（按行优先）
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_ROWS * BOARD_COLS).filter_map(Square::from_index)
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_display_char() {
        let red_general = Piece::new(Side::Red, PieceKind::General);
        assert_eq!(red_general.display_char(), '帥');

        let black_soldier = Piece::new(Side::Black, PieceKind::Soldier);
        assert_eq!(black_soldier.display_char(), '卒');
    }

    #[test]
    fn test_piece_fen_char() {
        assert_eq!(Piece::new(Side::Red, PieceKind::General).to_fen_char(), 'K');
        assert_eq!(Piece::new(Side::Black, PieceKind::Elephant).to_fen_char(), 'b');

        assert_eq!(
            Piece::from_fen_char('R'),
            Some(Piece::new(Side::Red, PieceKind::Chariot))
        );
        assert_eq!(
            Piece::from_fen_char('n'),
            Some(Piece::new(Side::Black, PieceKind::Horse))
        );
        assert_eq!(Piece::from_fen_char('x'), None);
    }

    #[test]
    fn test_square_bounds() {
        assert!(Square::new(0, 0).is_ok());
        assert!(Square::new(9, 8).is_ok());
        assert_eq!(
            Square::new(10, 0),
            Err(ChessError::OutOfBounds { row: 10, col: 0 })
        );
        assert!(Square::new(0, 9).is_err());
        assert!(Square::new_unchecked(12, 3).validate().is_err());
    }

    #[test]
    fn test_square_palace() {
        assert!(Square::new_unchecked(9, 4).in_palace(Side::Red));
        assert!(Square::new_unchecked(7, 3).in_palace(Side::Red));
        assert!(!Square::new_unchecked(6, 4).in_palace(Side::Red));
        assert!(!Square::new_unchecked(8, 6).in_palace(Side::Red));

        assert!(Square::new_unchecked(0, 4).in_palace(Side::Black));
        assert!(Square::new_unchecked(2, 5).in_palace(Side::Black));
        assert!(!Square::new_unchecked(3, 4).in_palace(Side::Black));
    }

    #[test]
    fn test_square_river() {
        assert!(Square::new_unchecked(5, 0).on_own_half(Side::Red));
        assert!(Square::new_unchecked(4, 0).has_crossed_river(Side::Red));
        assert!(Square::new_unchecked(4, 0).on_own_half(Side::Black));
        assert!(Square::new_unchecked(5, 0).has_crossed_river(Side::Black));
    }

    #[test]
    fn test_square_index_roundtrip() {
        let square = Square::new_unchecked(7, 1);
        assert_eq!(square.to_index(), 64);
        assert_eq!(Square::from_index(64), Some(square));
        assert_eq!(Square::from_index(90), None);
        assert_eq!(Square::all().count(), 90);
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Red.opponent(), Side::Black);
        assert_eq!(Side::Black.opponent(), Side::Red);
        assert_eq!(Side::Red.forward(), -1);
        assert_eq!(Side::Black.forward(), 1);
    }
}
