//! 走法生成（伪合法走法，不考虑将军）

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::piece::{Piece, PieceKind, Side, Square};

/// 正交方向
const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// 斜向方向
const DIAGONAL: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// 马的 8 个方向和对应的马腿偏移
const HORSE_JUMPS: [((i8, i8), (i8, i8)); 8] = [
    ((-2, -1), (-1, 0)),
    ((-2, 1), (-1, 0)),
    ((2, -1), (1, 0)),
    ((2, 1), (1, 0)),
    ((-1, -2), (0, -1)),
    ((1, -2), (0, -1)),
    ((-1, 2), (0, 1)),
    ((1, 2), (0, 1)),
];

/// 走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// 起始位置
    pub from: Square,
    /// 目标位置
    pub to: Square,
}

impl Move {
    /// 创建新走法
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    /// 在给定棋盘上这步棋会吃掉的棋子
    pub fn captured_on(&self, board: &Board) -> Option<Piece> {
        board.get(self.to)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// 走法生成器
pub struct MoveGenerator;

impl MoveGenerator {
    /// 起点棋子的所有伪合法目标位置（起点无子时为空）
    pub fn destinations(board: &Board, origin: Square) -> Vec<Square> {
        let mut targets = Vec::with_capacity(17);
        if let Some(piece) = board.get(origin) {
            Self::generate_piece_moves(board, origin, piece, &mut targets);
        }
        targets
    }

    /// 生成指定阵营的所有伪合法走法
    pub fn generate_pseudo_legal(board: &Board, side: Side) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        let mut targets = Vec::with_capacity(17);

        for (origin, piece) in board.pieces(side) {
            targets.clear();
            Self::generate_piece_moves(board, origin, piece, &mut targets);
            moves.extend(targets.iter().map(|&to| Move::new(origin, to)));
        }

        moves
    }

    /// 生成指定棋子的所有伪合法目标
    fn generate_piece_moves(board: &Board, pos: Square, piece: Piece, targets: &mut Vec<Square>) {
        match piece.kind {
            PieceKind::General => Self::generate_general_moves(board, pos, piece.side, targets),
            PieceKind::Advisor => Self::generate_advisor_moves(board, pos, piece.side, targets),
            PieceKind::Elephant => Self::generate_elephant_moves(board, pos, piece.side, targets),
            PieceKind::Horse => Self::generate_horse_moves(board, pos, piece.side, targets),
            PieceKind::Chariot => Self::generate_chariot_moves(board, pos, piece.side, targets),
            PieceKind::Cannon => Self::generate_cannon_moves(board, pos, piece.side, targets),
            PieceKind::Soldier => Self::generate_soldier_moves(board, pos, piece.side, targets),
        }
    }

    /// 生成将/帅的走法：九宫内正交一步
    fn generate_general_moves(board: &Board, pos: Square, side: Side, targets: &mut Vec<Square>) {
        for (dr, dc) in ORTHOGONAL {
            if let Some(to) = pos.offset(dr, dc) {
                if to.in_palace(side) {
                    Self::try_add(board, to, side, targets);
                }
            }
        }
    }

    /// 生成士/仕的走法：九宫内斜走一步
    fn generate_advisor_moves(board: &Board, pos: Square, side: Side, targets: &mut Vec<Square>) {
        for (dr, dc) in DIAGONAL {
            if let Some(to) = pos.offset(dr, dc) {
                if to.in_palace(side) {
                    Self::try_add(board, to, side, targets);
                }
            }
        }
    }

    /// 生成象/相的走法：田字，象眼被堵不能走，不能过河
    fn generate_elephant_moves(board: &Board, pos: Square, side: Side, targets: &mut Vec<Square>) {
        for (dr, dc) in DIAGONAL {
            let Some(eye) = pos.offset(dr, dc) else {
                continue;
            };
            if board.get(eye).is_some() {
                continue;
            }

            if let Some(to) = pos.offset(dr * 2, dc * 2) {
                if to.on_own_half(side) {
                    Self::try_add(board, to, side, targets);
                }
            }
        }
    }

    /// 生成马/傌的走法：日字，马腿被堵不能走
    fn generate_horse_moves(board: &Board, pos: Square, side: Side, targets: &mut Vec<Square>) {
        for ((dr, dc), (leg_r, leg_c)) in HORSE_JUMPS {
            let Some(leg) = pos.offset(leg_r, leg_c) else {
                continue;
            };
            if board.get(leg).is_some() {
                continue;
            }

            if let Some(to) = pos.offset(dr, dc) {
                Self::try_add(board, to, side, targets);
            }
        }
    }

    /// 生成车/俥的走法：直线滑行，遇子即停
    fn generate_chariot_moves(board: &Board, pos: Square, side: Side, targets: &mut Vec<Square>) {
        for (dr, dc) in ORTHOGONAL {
            let mut current = pos;
            while let Some(to) = current.offset(dr, dc) {
                if let Some(target) = board.get(to) {
                    if target.side != side {
                        targets.push(to);
                    }
                    break;
                }
                targets.push(to);
                current = to;
            }
        }
    }

    /// 生成炮/砲的走法：平移同车，吃子需要恰好一个炮架
    fn generate_cannon_moves(board: &Board, pos: Square, side: Side, targets: &mut Vec<Square>) {
        for (dr, dc) in ORTHOGONAL {
            let mut current = pos;
            let mut screens = 0u8;

            while let Some(to) = current.offset(dr, dc) {
                match board.get(to) {
                    None if screens == 0 => targets.push(to),
                    None => {}
                    Some(_) if screens == 0 => screens += 1,
                    Some(target) => {
                        if target.side != side {
                            targets.push(to);
                        }
                        break;
                    }
                }
                current = to;
            }
        }
    }

    /// 生成兵/卒的走法：未过河只能前进，过河后可左右
    fn generate_soldier_moves(board: &Board, pos: Square, side: Side, targets: &mut Vec<Square>) {
        if let Some(to) = pos.offset(side.forward(), 0) {
            Self::try_add(board, to, side, targets);
        }

        if pos.has_crossed_river(side) {
            for dc in [-1i8, 1] {
                if let Some(to) = pos.offset(0, dc) {
                    Self::try_add(board, to, side, targets);
                }
            }
        }
    }

    /// 目标为空或有对方棋子时加入
    fn try_add(board: &Board, to: Square, side: Side, targets: &mut Vec<Square>) {
        match board.get(to) {
            Some(target) if target.side == side => {}
            _ => targets.push(to),
        }
    }
}
