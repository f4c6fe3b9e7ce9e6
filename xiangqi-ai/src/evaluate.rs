//! 棋局评估函数

use xiangqi_core::{Board, Piece, PieceKind, Side, Square, BOARD_COLS, BOARD_ROWS};

/// 评估器
pub struct Evaluator;

/// 棋子位置分值表（红方视角，第 0 行是对方底线，黑方需要上下镜像）
/// 索引为 row * 9 + col
mod position_tables {
    /// 兵的位置分值
    pub const SOLDIER: [i32; 90] = [
        0,  3,  6,  9, 12,  9,  6,  3,  0,
       40, 80, 95,115,125,115, 95, 80, 40,
       30, 60, 85,105,115,105, 85, 60, 30,
       20, 40, 60, 75, 85, 75, 60, 40, 20,
       10, 20, 30, 40, 50, 40, 30, 20, 10,
        0,  0,  0,  0,  0,  0,  0,  0,  0,
        0,  0,  0,  0,  0,  0,  0,  0,  0,
        0,  0,  0,  0,  0,  0,  0,  0,  0,
        0,  0,  0,  0,  0,  0,  0,  0,  0,
        0,  0,  0,  0,  0,  0,  0,  0,  0,
    ];

    /// 马的位置分值
    pub const HORSE: [i32; 90] = [
        5, 15, 25, 30, 25, 30, 25, 15,  5,
       15, 35, 45, 55, 45, 55, 45, 35, 15,
       20, 45, 60, 70, 75, 70, 60, 45, 20,
       25, 50, 70, 80, 80, 80, 70, 50, 25,
       30, 55, 75, 85, 85, 85, 75, 55, 30,
       25, 50, 70, 80, 80, 80, 70, 50, 25,
       20, 40, 55, 65, 70, 65, 55, 40, 20,
       10, 30, 45, 50, 50, 50, 45, 30, 10,
        5, 20, 30, 35, 20, 35, 30, 20,  5,
        0, 10, 20, 25, 20, 25, 20, 10,  0,
    ];

    /// 炮的位置分值
    pub const CANNON: [i32; 90] = [
       15, 15, 10, 25, 30, 25, 10, 15, 15,
       10, 20, 25, 35, 45, 35, 25, 20, 10,
       10, 20, 30, 40, 55, 40, 30, 20, 10,
       10, 25, 35, 45, 55, 45, 35, 25, 10,
       10, 30, 40, 50, 60, 50, 40, 30, 10,
       10, 30, 40, 50, 60, 50, 40, 30, 10,
       10, 25, 35, 45, 55, 45, 35, 25, 10,
       10, 25, 30, 40, 60, 40, 30, 25, 10,
       10, 20, 25, 30, 40, 30, 25, 20, 10,
       10, 10, 15, 20, 25, 20, 15, 10, 10,
    ];

    /// 车的位置分值
    pub const CHARIOT: [i32; 90] = [
       20, 30, 30, 45, 50, 45, 30, 30, 20,
       30, 50, 55, 65, 75, 65, 55, 50, 30,
       25, 45, 50, 60, 70, 60, 50, 45, 25,
       30, 50, 60, 70, 80, 70, 60, 50, 30,
       40, 60, 70, 80, 90, 80, 70, 60, 40,
       40, 60, 70, 80, 90, 80, 70, 60, 40,
       30, 50, 60, 70, 80, 70, 60, 50, 30,
       20, 40, 50, 60, 70, 60, 50, 40, 20,
       20, 40, 50, 60, 70, 60, 50, 40, 20,
       10, 25, 20, 40, 45, 40, 20, 25, 10,
    ];
}

impl Evaluator {
    /// 棋子基础分值
    pub fn piece_value(kind: PieceKind) -> i32 {
        match kind {
            PieceKind::General => 10000,
            PieceKind::Chariot => 900,
            PieceKind::Cannon => 450,
            PieceKind::Horse => 400,
            PieceKind::Elephant => 200,
            PieceKind::Advisor => 200,
            PieceKind::Soldier => 100,
        }
    }

    /// 评估棋局（红方视角，正值对红方有利）
    pub fn evaluate(board: &Board) -> i32 {
        board
            .all_pieces()
            .into_iter()
            .map(|(square, piece)| {
                let score = Self::piece_value(piece.kind) + Self::position_bonus(square, piece);
                match piece.side {
                    Side::Red => score,
                    Side::Black => -score,
                }
            })
            .sum()
    }

    /// 从 `side` 视角评估
    pub fn evaluate_for(board: &Board, side: Side) -> i32 {
        match side {
            Side::Red => Self::evaluate(board),
            Side::Black => -Self::evaluate(board),
        }
    }

    /// 获取位置加成分
    fn position_bonus(square: Square, piece: Piece) -> i32 {
        let row = match piece.side {
            Side::Red => square.row as usize,
            Side::Black => BOARD_ROWS - 1 - square.row as usize,
        };
        let index = row * BOARD_COLS + square.col as usize;

        match piece.kind {
            PieceKind::Soldier => position_tables::SOLDIER[index],
            PieceKind::Horse => position_tables::HORSE[index],
            PieceKind::Cannon => position_tables::CANNON[index],
            PieceKind::Chariot => position_tables::CHARIOT[index],
            _ => 0,
        }
    }

    /// 快速评估（仅计算子力差）
    pub fn evaluate_material(board: &Board) -> i32 {
        board
            .all_pieces()
            .into_iter()
            .map(|(_, piece)| match piece.side {
                Side::Red => Self::piece_value(piece.kind),
                Side::Black => -Self::piece_value(piece.kind),
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xiangqi_core::Fen;

    fn score(fen: &str) -> i32 {
        let (board, _) = Fen::parse(fen).unwrap();
        Evaluator::evaluate(&board)
    }

    #[test]
    fn test_initial_evaluation() {
        let board = Board::initial();
        assert_eq!(Evaluator::evaluate(&board), 0, "初始局面应该是平衡的");
        assert_eq!(Evaluator::evaluate_material(&board), 0);
    }

    #[test]
    fn test_material_advantage() {
        // 红方少一个车
        let (board, _) =
            Fen::parse("rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABN1 r").unwrap();
        let material = Evaluator::evaluate_material(&board);
        assert_eq!(material, -900);
        assert!(Evaluator::evaluate_for(&board, Side::Black) > 0);
    }

    #[test]
    fn test_crossed_soldier_worth_more() {
        let crossed = score("3k5/9/9/9/4P4/9/9/9/9/5K3 r");
        let home = score("3k5/9/9/9/9/9/4P4/9/9/5K3 r");
        assert!(crossed > home, "过河兵应该比未过河兵价值高: {} vs {}", crossed, home);
    }

    #[test]
    fn test_central_pieces_worth_more() {
        for kind in ['N', 'C', 'R'] {
            let center = score(&format!("3k5/9/9/9/4{}4/9/9/9/9/5K3 r", kind));
            let corner = score(&format!("3k5/9/9/9/9/9/9/9/9/{}4K3 r", kind));
            assert!(center > corner, "{} 居中应该更好: {} vs {}", kind, center, corner);
        }
    }

    #[test]
    fn test_black_mirror() {
        // 红兵 (4,4) 和黑卒 (5,4) 在镜像位置
        assert_eq!(score("4k4/9/9/9/4P4/4p4/9/9/9/3K5 r"), 0);
        assert!(score("3k5/9/9/9/9/9/9/9/4R4/5K3 r") > 500);
    }
}
