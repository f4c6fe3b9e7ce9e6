//! 棋局描述：自定义摆子和保存局面用的序列化格式

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{ChessError, Result};
use crate::piece::{Piece, PieceKind, Side, Square};

/// 棋盘上的一个棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedPiece {
    #[serde(flatten)]
    pub square: Square,
    pub side: Side,
    pub kind: PieceKind,
}

impl PlacedPiece {
    pub fn piece(&self) -> Piece {
        Piece::new(self.side, self.kind)
    }
}

/// 棋局描述，足以重建一个棋盘
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardDescription {
    pub pieces: Vec<PlacedPiece>,
}

impl BoardDescription {
    /// 从 JSON 解析
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ChessError::InvalidDescription {
            reason: e.to_string(),
        })
    }

    /// 序列化为 JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ChessError::InvalidDescription {
            reason: e.to_string(),
        })
    }
}

impl Board {
    /// 导出棋局描述（按行优先）
    pub fn to_description(&self) -> BoardDescription {
        BoardDescription {
            pieces: self
                .all_pieces()
                .into_iter()
                .map(|(square, piece)| PlacedPiece {
                    square,
                    side: piece.side,
                    kind: piece.kind,
                })
                .collect(),
        }
    }

    /// 从棋局描述重建棋盘
    ///
    /// 只检查坐标和重复位置，摆子规则由 `SetupValidator` 负责。
    pub fn from_description(description: &BoardDescription) -> Result<Board> {
        let mut board = Board::empty();
        for placed in &description.pieces {
            if board.piece_at(placed.square)?.is_some() {
                return Err(ChessError::InvalidDescription {
                    reason: format!("square {} listed twice", placed.square),
                });
            }
            board.set(placed.square, Some(placed.piece()))?;
        }
        Ok(board)
    }
}
