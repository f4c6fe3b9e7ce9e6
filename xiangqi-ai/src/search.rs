//! 搜索引擎
//!
//! 实现 Alpha-Beta 剪枝 + 迭代加深 + 静态搜索

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use xiangqi_core::{position_key, Board, Move, MoveValidator, Side};

use crate::evaluate::Evaluator;

/// 将死分值（减去步数，越快将死越好）
const MATE_SCORE: i32 = 30_000;

/// AI 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// 最大搜索深度
    pub max_depth: u8,
    /// 单步思考时间上限
    pub time_limit_ms: u64,
    /// 静态搜索深度
    pub quiescence_depth: u8,
    /// 同分走法随机选择的种子（None 使用系统熵）
    pub seed: Option<u64>,
}

impl AiConfig {
    /// 指定搜索深度
    pub fn with_depth(max_depth: u8) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            time_limit_ms: 3000,
            quiescence_depth: 4,
            seed: None,
        }
    }
}

/// AI 引擎
pub struct AiEngine {
    config: AiConfig,
    rng: ChaCha8Rng,
    nodes_searched: u64,
}

impl AiEngine {
    /// 创建新的 AI 引擎
    pub fn new(config: AiConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            config,
            rng,
            nodes_searched: 0,
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// 搜索 `side` 的最佳走法
    ///
    /// `seen` 是对局中出现过的局面哈希，走向这些局面的着法只在别无选择时使用。
    pub fn search(&mut self, board: &Board, side: Side, seen: &[u64]) -> Option<Move> {
        self.nodes_searched = 0;
        let deadline = Instant::now() + Duration::from_millis(self.config.time_limit_ms);

        let mut moves = MoveValidator::generate_legal(board, side);
        if moves.len() <= 1 {
            return moves.first().copied();
        }

        // 打乱后稳定排序：同分走法随机，吃子优先
        moves.shuffle(&mut self.rng);
        order_moves(board, &mut moves);

        let fresh: Vec<Move> = moves
            .iter()
            .copied()
            .filter(|mv| {
                let mut next = board.clone();
                next.move_piece(mv.from, mv.to);
                !seen.contains(&position_key(&next, side.opponent()))
            })
            .collect();
        if !fresh.is_empty() && fresh.len() < moves.len() {
            debug!("Avoiding {} repeating moves", moves.len() - fresh.len());
            moves = fresh;
        }

        let mut best_move = moves[0];

        for depth in 1..=self.config.max_depth.max(1) {
            let mut current_best = None;
            let mut alpha = -MATE_SCORE - 1;
            let mut finished = true;

            for &mv in &moves {
                if Instant::now() >= deadline {
                    finished = false;
                    break;
                }

                let mut next = board.clone();
                next.move_piece(mv.from, mv.to);
                let score = -self.alpha_beta(
                    &next,
                    side.opponent(),
                    depth - 1,
                    1,
                    -MATE_SCORE - 1,
                    -alpha,
                    &deadline,
                );

                if score > alpha {
                    alpha = score;
                    current_best = Some(mv);
                }
            }

            // 未完成的一层只有在是第一层时才采用
            if let Some(mv) = current_best {
                if finished || depth == 1 {
                    best_move = mv;
                }
            }

            debug!(
                "depth {} best {} score {} nodes {}",
                depth, best_move, alpha, self.nodes_searched
            );

            if !finished || alpha >= MATE_SCORE - depth as i32 {
                break;
            }
        }

        Some(best_move)
    }

    /// Alpha-Beta 搜索（负极大值形式）
    #[allow(clippy::too_many_arguments)]
    fn alpha_beta(
        &mut self,
        board: &Board,
        side: Side,
        depth: u8,
        ply: i32,
        mut alpha: i32,
        beta: i32,
        deadline: &Instant,
    ) -> i32 {
        self.nodes_searched += 1;

        let mut moves = MoveValidator::generate_legal(board, side);

        // 无子可动：将死和困毙都判负
        if moves.is_empty() {
            return -MATE_SCORE + ply;
        }

        if depth == 0 || Instant::now() >= *deadline {
            return self.quiescence(board, side, alpha, beta, self.config.quiescence_depth);
        }

        order_moves(board, &mut moves);

        for mv in moves {
            let mut next = board.clone();
            next.move_piece(mv.from, mv.to);

            let score = -self.alpha_beta(
                &next,
                side.opponent(),
                depth - 1,
                ply + 1,
                -beta,
                -alpha,
                deadline,
            );

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }

    /// 静态搜索（只搜索吃子走法）
    fn quiescence(&mut self, board: &Board, side: Side, mut alpha: i32, beta: i32, depth: u8) -> i32 {
        self.nodes_searched += 1;

        let stand_pat = Evaluator::evaluate_for(board, side);
        if stand_pat >= beta {
            return beta;
        }
        if depth == 0 {
            return stand_pat.max(alpha);
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut captures: Vec<Move> = MoveValidator::generate_legal(board, side)
            .into_iter()
            .filter(|mv| mv.captured_on(board).is_some())
            .collect();
        order_moves(board, &mut captures);

        for mv in captures {
            let mut next = board.clone();
            next.move_piece(mv.from, mv.to);

            let score = -self.quiescence(&next, side.opponent(), -beta, -alpha, depth - 1);

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }

    /// 获取搜索的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}

/// 按被吃棋子价值从高到低排序，不吃子的排在最后
fn order_moves(board: &Board, moves: &mut [Move]) {
    moves.sort_by_key(|mv| {
        std::cmp::Reverse(
            mv.captured_on(board)
                .map(|piece| Evaluator::piece_value(piece.kind))
                .unwrap_or(0),
        )
    });
}
