//! FEN 格式解析和生成
//!
//! 中国象棋 FEN 格式：
//! `<棋盘> <走子方> <无吃子步数> <回合数>`
//!
//! 第一段从第 0 行（黑方底线）写到第 9 行（红方底线）。后两段可省略，
//! 解析时忽略。
//!
//! 示例：
//! `rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR r 0 1`

use crate::board::Board;
use crate::constants::{BOARD_COLS, BOARD_ROWS};
use crate::error::{ChessError, Result};
use crate::piece::{Piece, Side, Square};

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR r 0 1";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为棋盘和走子方（缺省为红方）
    pub fn parse(fen: &str) -> Result<(Board, Side)> {
        let mut parts = fen.split_whitespace();
        let Some(board_str) = parts.next() else {
            return Err(invalid("Empty FEN string"));
        };

        let board = Self::parse_board(board_str)?;

        let turn = match parts.next() {
            None => Side::Red,
            Some(field) => {
                let mut chars = field.chars();
                match (chars.next().and_then(Side::from_fen_char), chars.next()) {
                    (Some(side), None) => side,
                    _ => return Err(invalid(format!("Invalid side to move: {}", field))),
                }
            }
        };

        Ok((board, turn))
    }

    /// 解析棋盘部分
    fn parse_board(board_str: &str) -> Result<Board> {
        let mut board = Board::empty();
        let rows: Vec<&str> = board_str.split('/').collect();

        if rows.len() != BOARD_ROWS {
            return Err(invalid(format!("Expected 10 rows, got {}", rows.len())));
        }

        for (row, text) in rows.iter().enumerate() {
            let mut col = 0usize;

            for c in text.chars() {
                if col >= BOARD_COLS {
                    return Err(invalid(format!("Row {} has too many columns", row)));
                }

                match c {
                    '1'..='9' => col += c as usize - '0' as usize,
                    _ => {
                        let piece = Piece::from_fen_char(c)
                            .ok_or_else(|| invalid(format!("Invalid piece character: {}", c)))?;
                        board.put(Square::new_unchecked(row as u8, col as u8), Some(piece));
                        col += 1;
                    }
                }
            }

            if col != BOARD_COLS {
                return Err(invalid(format!(
                    "Row {} has {} columns, expected 9",
                    row, col
                )));
            }
        }

        Ok(board)
    }

    /// 生成完整 FEN 字符串
    pub fn to_string(board: &Board, turn: Side, no_capture: u32, round: u32) -> String {
        format!(
            "{} {} {} {}",
            Self::board_to_string(board),
            turn.to_fen_char(),
            no_capture,
            round
        )
    }

    /// 将棋盘转换为 FEN 棋盘部分
    pub fn board_to_string(board: &Board) -> String {
        board
            .grid()
            .iter()
            .map(|row| {
                let mut text = String::new();
                let mut empty = 0;
                for square in row {
                    match square {
                        Some(piece) => {
                            if empty > 0 {
                                text.push_str(&empty.to_string());
                                empty = 0;
                            }
                            text.push(piece.to_fen_char());
                        }
                        None => empty += 1,
                    }
                }
                if empty > 0 {
                    text.push_str(&empty.to_string());
                }
                text
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn invalid(reason: impl Into<String>) -> ChessError {
    ChessError::InvalidFen {
        reason: reason.into(),
    }
}
