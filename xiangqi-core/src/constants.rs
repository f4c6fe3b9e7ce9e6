//! 规则常量定义

/// 棋盘宽度（列数）
pub const BOARD_COLS: usize = 9;

/// 棋盘高度（行数）
pub const BOARD_ROWS: usize = 10;

/// 棋盘交叉点总数
pub const BOARD_SIZE: usize = BOARD_COLS * BOARD_ROWS;

/// 黑方半场的最后一行（河界在第 4 行与第 5 行之间）
pub const BLACK_RIVER_ROW: u8 = 4;

/// 红方半场的第一行
pub const RED_RIVER_ROW: u8 = 5;

/// 九宫格最左列
pub const PALACE_MIN_COL: u8 = 3;

/// 九宫格最右列
pub const PALACE_MAX_COL: u8 = 5;

/// 默认的重复局面判和次数
pub const DEFAULT_REPETITION_LIMIT: u32 = 3;

/// 默认的无吃子判和步数（60 回合 = 120 步）
pub const DEFAULT_NO_CAPTURE_LIMIT: u32 = 120;
