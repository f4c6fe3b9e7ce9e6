//! Zobrist 哈希
//!
//! 用于识别重复局面（棋子分布 + 走子方）

use std::sync::OnceLock;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::board::Board;
use crate::constants::BOARD_SIZE;
use crate::piece::{Piece, Side, Square};

/// Zobrist 哈希表
pub struct ZobristTable {
    /// 棋子哈希值 [side][kind][square]
    pieces: [[[u64; BOARD_SIZE]; 7]; 2],
    /// 黑方走子时异或的哈希值
    side_to_move: u64,
}

impl ZobristTable {
    /// 创建新的 Zobrist 表（使用固定种子保证确定性）
    fn new() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(0xDEADBEEF_CAFE_1234);

        let mut pieces = [[[0u64; BOARD_SIZE]; 7]; 2];
        for side in pieces.iter_mut() {
            for kind in side.iter_mut() {
                for key in kind.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        Self {
            pieces,
            side_to_move: rng.gen(),
        }
    }

    /// 全局共享的只读表
    pub fn global() -> &'static ZobristTable {
        static TABLE: OnceLock<ZobristTable> = OnceLock::new();
        TABLE.get_or_init(ZobristTable::new)
    }

    /// 计算局面的完整哈希值
    pub fn hash(&self, board: &Board, turn: Side) -> u64 {
        let mut hash = board
            .all_pieces()
            .into_iter()
            .fold(0u64, |acc, (square, piece)| acc ^ self.piece_hash(piece, square));

        if turn == Side::Black {
            hash ^= self.side_to_move;
        }

        hash
    }

    /// 获取棋子在某位置的哈希值
    #[inline]
    pub fn piece_hash(&self, piece: Piece, square: Square) -> u64 {
        self.pieces[piece.side.index()][piece.kind.index()][square.to_index()]
    }
}

/// 使用全局表计算局面哈希
pub fn position_key(board: &Board, turn: Side) -> u64 {
    ZobristTable::global().hash(board, turn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zobrist_deterministic() {
        let board = Board::initial();
        assert_eq!(
            ZobristTable::new().hash(&board, Side::Red),
            position_key(&board, Side::Red),
            "Zobrist 哈希应该是确定性的"
        );
    }

    #[test]
    fn test_zobrist_turn_and_position_matter() {
        let board = Board::initial();
        let initial = position_key(&board, Side::Red);
        assert_ne!(initial, position_key(&board, Side::Black));

        let mut moved = board.clone();
        moved.move_piece(Square::new_unchecked(7, 1), Square::new_unchecked(7, 4));
        assert_ne!(initial, position_key(&moved, Side::Red));

        moved.move_piece(Square::new_unchecked(7, 4), Square::new_unchecked(7, 1));
        assert_eq!(initial, position_key(&moved, Side::Red));
    }
}
