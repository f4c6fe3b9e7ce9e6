//! 对局状态机
//!
//! 一个 `GameSession` 独占一块棋盘，负责回合、悔棋、认输、暂停和 AI 控制标志。
//! 所有被拒绝的操作都不会改变任何状态。

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::Board;
use crate::check::CheckDetector;
use crate::constants::{DEFAULT_NO_CAPTURE_LIMIT, DEFAULT_REPETITION_LIMIT};
use crate::description::BoardDescription;
use crate::error::{ChessError, IllegalMoveReason, Operation, Result};
use crate::fen::Fen;
use crate::moves::Move;
use crate::piece::{Piece, Side, Square};
use crate::setup::SetupValidator;
use crate::validator::MoveValidator;
use crate::zobrist::position_key;

/// 胜利原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    /// 将死
    Checkmate,
    /// 困毙（无子可动的一方判负）
    Stalemate,
    /// 对方认输
    Resignation,
    /// 吃掉了对方的将
    GeneralCaptured,
}

/// 和棋原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    /// 重复局面
    Repetition,
    /// 长时间无吃子
    NoCapture,
}

/// 对局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Win { winner: Side, reason: WinReason },
    Draw(DrawReason),
}

impl GameResult {
    /// 获胜方（和棋为 None）
    pub fn winner(&self) -> Option<Side> {
        match self {
            GameResult::Win { winner, .. } => Some(*winner),
            GameResult::Draw(_) => None,
        }
    }
}

/// 对局状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// 进行中
    Active,
    /// 暂停（仅双方都由 AI 控制时）
    Paused,
    /// 已结束
    Over(GameResult),
}

/// 对局模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// 双人对弈
    PlayerVsPlayer,
    /// 人机对弈（AI 执黑）
    PlayerVsAi,
    /// AI 对 AI
    AiVsAi,
    /// 自定义摆子
    Custom,
}

/// 双方的 AI 控制标志
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiControl {
    pub red: bool,
    pub black: bool,
}

impl AiControl {
    /// 双方都由人控制
    pub fn none() -> Self {
        Self::default()
    }

    /// 双方都由 AI 控制
    pub fn both() -> Self {
        Self {
            red: true,
            black: true,
        }
    }

    /// 只有一方由 AI 控制
    pub fn only(side: Side) -> Self {
        let mut control = Self::none();
        control.set(side, true);
        control
    }

    pub fn is_enabled(&self, side: Side) -> bool {
        match side {
            Side::Red => self.red,
            Side::Black => self.black,
        }
    }

    pub fn set(&mut self, side: Side, enabled: bool) {
        match side {
            Side::Red => self.red = enabled,
            Side::Black => self.black = enabled,
        }
    }

    /// 双方是否都由 AI 控制
    pub fn all(&self) -> bool {
        self.red && self.black
    }
}

/// 和棋规则配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 同一局面出现多少次判和（None 表示关闭）
    pub repetition_limit: Option<u32>,
    /// 连续多少步无吃子判和（None 表示关闭）
    pub no_capture_limit: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            repetition_limit: Some(DEFAULT_REPETITION_LIMIT),
            no_capture_limit: Some(DEFAULT_NO_CAPTURE_LIMIT),
        }
    }
}

/// 走法历史记录，足以精确撤销
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "move")]
    pub mv: Move,
    /// 被移动的棋子
    pub piece: Piece,
    /// 被吃的棋子
    pub captured: Option<Piece>,
    /// 走这步之前的无吃子步数
    pub prev_no_capture: u32,
}

/// 一步棋执行后的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMove {
    pub entry: HistoryEntry,
    /// 走完后轮到的一方是否被将军
    pub gives_check: bool,
    /// 这步棋结束了对局
    pub result: Option<GameResult>,
}

/// 对局快照（只读视图）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub grid: Vec<Vec<Option<Piece>>>,
    pub fen: String,
    pub turn: Side,
    pub in_check: bool,
    pub result: Option<GameResult>,
    pub ai: AiControl,
    pub paused: bool,
    pub status: SessionStatus,
    pub mode: GameMode,
    pub revision: u64,
    pub last_move: Option<Move>,
    pub ply: usize,
}

/// 对局
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    turn: Side,
    history: Vec<HistoryEntry>,
    ai: AiControl,
    status: SessionStatus,
    in_check: bool,
    revision: u64,
    /// 每个局面（含走子方）的哈希，第一个是开局局面
    position_keys: Vec<u64>,
    no_capture: u32,
    mode: GameMode,
    config: SessionConfig,
}

impl GameSession {
    /// 标准开局，双方都由人控制
    pub fn standard() -> Self {
        Self::new(Board::initial(), Side::Red, AiControl::none(), GameMode::PlayerVsPlayer)
    }

    /// 标准开局，黑方由 AI 控制
    pub fn player_vs_ai() -> Self {
        Self::new(
            Board::initial(),
            Side::Red,
            AiControl::only(Side::Black),
            GameMode::PlayerVsAi,
        )
    }

    /// 标准开局，双方都由 AI 控制，可指定先手
    pub fn ai_vs_ai(first_mover: Side) -> Self {
        Self::new(Board::initial(), first_mover, AiControl::both(), GameMode::AiVsAi)
    }

    /// 自定义摆子开局
    ///
    /// 棋盘先经过 `SetupValidator::validate_board`；后手方开局即被将军的局面无效。
    /// 先手方开局即无子可动时，对局直接结束。
    pub fn custom(description: &BoardDescription, ai: AiControl, first_mover: Side) -> Result<Self> {
        let board = Board::from_description(description)?;
        SetupValidator::validate_board(&board)?;

        if CheckDetector::is_in_check(&board, first_mover.opponent()) {
            return Err(ChessError::InvalidDescription {
                reason: format!("{:?} would start in check", first_mover.opponent()),
            });
        }

        Ok(Self::new(board, first_mover, ai, GameMode::Custom))
    }

    fn new(board: Board, turn: Side, ai: AiControl, mode: GameMode) -> Self {
        let mut session = Self {
            in_check: CheckDetector::is_in_check(&board, turn),
            position_keys: vec![position_key(&board, turn)],
            board,
            turn,
            history: Vec::new(),
            ai,
            status: SessionStatus::Active,
            revision: 0,
            no_capture: 0,
            mode,
            config: SessionConfig::default(),
        };

        if let Some(result) = session.terminal_result() {
            info!("Session created already over: {:?}", result);
            session.status = SessionStatus::Over(result);
        }

        session
    }

    /// 替换和棋规则配置
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    // ===== 查询 =====

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    /// 轮到的一方是否被将军
    pub fn in_check(&self) -> bool {
        self.in_check
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn result(&self) -> Option<GameResult> {
        match self.status {
            SessionStatus::Over(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, SessionStatus::Over(_))
    }

    pub fn is_paused(&self) -> bool {
        self.status == SessionStatus::Paused
    }

    pub fn ai_control(&self) -> AiControl {
        self.ai
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// 每次成功的状态变更都会加一
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// 对局中出现过的所有局面哈希（含开局局面）
    pub fn position_keys(&self) -> &[u64] {
        &self.position_keys
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|entry| entry.mv)
    }

    /// 起点棋子的合法目标（供点选使用）
    pub fn legal_moves(&self, origin: Square) -> Result<Vec<Square>> {
        MoveValidator::legal_moves(&self.board, origin)
    }

    /// 当前局面的 FEN
    pub fn fen(&self) -> String {
        let round = self.history.len() as u32 / 2 + 1;
        Fen::to_string(&self.board, self.turn, self.no_capture, round)
    }

    /// 生成只读快照
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            grid: self.board.grid(),
            fen: self.fen(),
            turn: self.turn,
            in_check: self.in_check,
            result: self.result(),
            ai: self.ai,
            paused: self.is_paused(),
            status: self.status,
            mode: self.mode,
            revision: self.revision,
            last_move: self.last_move(),
            ply: self.history.len(),
        }
    }

    // ===== 命令 =====

    /// 人类走棋
    pub fn play(&mut self, from: Square, to: Square) -> Result<AppliedMove> {
        self.require_active(Operation::Move)?;

        if self.ai.is_enabled(self.turn) {
            return Err(ChessError::transition(
                Operation::Move,
                format!("{:?} is controlled by AI", self.turn),
            ));
        }

        self.apply_move(Move::new(from, to))
    }

    /// AI 走棋
    ///
    /// `revision` 是 AI 计算时看到的版本号，过期的走法会被拒绝。
    pub fn play_ai(&mut self, revision: u64, from: Square, to: Square) -> Result<AppliedMove> {
        self.require_active(Operation::AiMove)?;

        if !self.ai.is_enabled(self.turn) {
            return Err(ChessError::transition(
                Operation::AiMove,
                format!("{:?} is not controlled by AI", self.turn),
            ));
        }

        if revision != self.revision {
            return Err(ChessError::transition(
                Operation::AiMove,
                format!("stale revision {} (current {})", revision, self.revision),
            ));
        }

        self.apply_move(Move::new(from, to))
    }

    /// 验证并执行走法
    fn apply_move(&mut self, mv: Move) -> Result<AppliedMove> {
        if self.is_over() {
            return Err(ChessError::illegal(mv.from, mv.to, IllegalMoveReason::GameOver));
        }

        let piece = MoveValidator::validate(&self.board, self.turn, mv)?;
        let captured = self.board.move_piece(mv.from, mv.to);

        let entry = HistoryEntry {
            mv,
            piece,
            captured,
            prev_no_capture: self.no_capture,
        };
        self.history.push(entry);
        self.no_capture = if captured.is_some() { 0 } else { self.no_capture + 1 };

        self.turn = self.turn.opponent();
        self.in_check = CheckDetector::is_in_check(&self.board, self.turn);
        self.position_keys.push(position_key(&self.board, self.turn));
        self.revision += 1;

        debug!(
            "{:?} {:?} {} captured={:?} check={}",
            piece.side, piece.kind, mv, captured, self.in_check
        );

        let result = self.terminal_result();
        if let Some(result) = result {
            info!("Game over after {} plies: {:?}", self.history.len(), result);
            self.status = SessionStatus::Over(result);
        }

        Ok(AppliedMove {
            entry,
            gives_check: self.in_check,
            result,
        })
    }

    /// 悔一步棋
    pub fn undo(&mut self) -> Result<HistoryEntry> {
        self.require_active(Operation::Undo)?;

        let Some(entry) = self.history.pop() else {
            return Err(ChessError::transition(Operation::Undo, "no move to undo"));
        };

        self.board.move_piece(entry.mv.to, entry.mv.from);
        self.board.put(entry.mv.to, entry.captured);
        self.turn = entry.piece.side;
        self.no_capture = entry.prev_no_capture;
        self.position_keys.pop();
        self.in_check = CheckDetector::is_in_check(&self.board, self.turn);
        self.revision += 1;

        debug!("Undo {}", entry.mv);
        Ok(entry)
    }

    /// 悔棋直到轮到人类一方（最少一步，最多两步）
    pub fn undo_to_human(&mut self) -> Result<Vec<HistoryEntry>> {
        let mut undone = vec![self.undo()?];

        if self.ai.is_enabled(self.turn) && !self.history.is_empty() {
            undone.push(self.undo()?);
        }

        Ok(undone)
    }

    /// 认输
    pub fn resign(&mut self, side: Side) -> Result<GameResult> {
        self.require_active(Operation::Resign)?;

        let result = GameResult::Win {
            winner: side.opponent(),
            reason: WinReason::Resignation,
        };
        self.status = SessionStatus::Over(result);
        self.revision += 1;

        info!("{:?} resigned", side);
        Ok(result)
    }

    /// 暂停（双方都由 AI 控制时）
    pub fn pause(&mut self) -> Result<()> {
        self.require_active(Operation::Pause)?;

        if !self.ai.all() {
            return Err(ChessError::transition(
                Operation::Pause,
                "pause requires both sides on AI",
            ));
        }

        self.status = SessionStatus::Paused;
        self.revision += 1;
        Ok(())
    }

    /// 继续
    pub fn resume(&mut self) -> Result<()> {
        if self.status != SessionStatus::Paused {
            return Err(ChessError::transition(Operation::Resume, "session is not paused"));
        }

        self.status = SessionStatus::Active;
        self.revision += 1;
        Ok(())
    }

    /// 切换某一方的 AI 控制
    ///
    /// 暂停中关闭任意一方的 AI 会自动继续对局。
    pub fn set_ai(&mut self, side: Side, enabled: bool) -> Result<()> {
        if self.is_over() {
            return Err(ChessError::transition(Operation::ToggleAi, "game is over"));
        }

        self.ai.set(side, enabled);
        if self.status == SessionStatus::Paused && !self.ai.all() {
            self.status = SessionStatus::Active;
        }
        self.revision += 1;

        debug!("{:?} AI {}", side, if enabled { "on" } else { "off" });
        Ok(())
    }

    fn require_active(&self, operation: Operation) -> Result<()> {
        match self.status {
            SessionStatus::Active => Ok(()),
            SessionStatus::Paused => Err(ChessError::transition(operation, "game is paused")),
            SessionStatus::Over(_) => Err(ChessError::transition(operation, "game is over")),
        }
    }

    /// 以轮到的一方为准判断对局是否结束
    fn terminal_result(&self) -> Option<GameResult> {
        let side = self.turn;
        let win = |reason| GameResult::Win {
            winner: side.opponent(),
            reason,
        };

        if self.board.find_general(side).is_none() {
            return Some(win(WinReason::GeneralCaptured));
        }

        if !CheckDetector::has_legal_move(&self.board, side) {
            return Some(if self.in_check {
                win(WinReason::Checkmate)
            } else {
                win(WinReason::Stalemate)
            });
        }

        if let (Some(limit), Some(current)) = (self.config.repetition_limit, self.position_keys.last()) {
            let seen = self.position_keys.iter().filter(|key| *key == current).count();
            if seen >= limit as usize {
                return Some(GameResult::Draw(DrawReason::Repetition));
            }
        }

        if let Some(limit) = self.config.no_capture_limit {
            if self.no_capture >= limit {
                return Some(GameResult::Draw(DrawReason::NoCapture));
            }
        }

        None
    }
}
