//! 对局管理

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::info;
use xiangqi_core::{AiControl, BoardDescription, GameMode, GameSession, SessionStatus, Side};

use crate::actor::{self, SessionHandle};
use crate::config::ServerConfig;
use crate::driver;
use crate::error::{GameId, Result, ServerError};

/// 对局概要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: GameId,
    pub mode: GameMode,
    pub status: SessionStatus,
    pub turn: Side,
    pub ply: usize,
    pub ai: AiControl,
    pub created_at: DateTime<Utc>,
}

struct ManagedGame {
    handle: SessionHandle,
    created_at: DateTime<Utc>,
    session_task: JoinHandle<()>,
    driver_task: JoinHandle<()>,
}

impl ManagedGame {
    fn stop(&self) {
        self.driver_task.abort();
        self.session_task.abort();
    }
}

/// 对局管理器
///
/// 每局棋对应一个对局任务和一个 AI 驱动任务，创建方法必须在 tokio 运行时内调用。
pub struct GameManager {
    games: HashMap<GameId, ManagedGame>,
    next_id: AtomicU64,
    config: ServerConfig,
}

impl GameManager {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            games: HashMap::new(),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// 生成对局 ID
    fn generate_id(&self) -> GameId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// 双人对局
    pub fn create_standard(&mut self) -> SessionHandle {
        self.start(GameSession::standard())
    }

    /// 人机对局（人执红）
    pub fn create_player_vs_ai(&mut self) -> SessionHandle {
        self.start(GameSession::player_vs_ai())
    }

    /// 机机对局
    pub fn create_ai_vs_ai(&mut self, first_mover: Side) -> SessionHandle {
        self.start(GameSession::ai_vs_ai(first_mover))
    }

    /// 自定义摆子对局
    pub fn create_custom(
        &mut self,
        description: &BoardDescription,
        ai: AiControl,
        first_mover: Side,
    ) -> Result<SessionHandle> {
        let session = GameSession::custom(description, ai, first_mover)?;
        Ok(self.start(session))
    }

    fn start(&mut self, session: GameSession) -> SessionHandle {
        let id = self.generate_id();
        let session = session.with_config(self.config.session);
        let mode = session.mode();

        let (handle, session_task) =
            actor::spawn(id, session, self.config.command_queue_capacity);
        let driver_task = driver::spawn(
            handle.clone(),
            self.config.ai_config(),
            Duration::from_millis(self.config.ai_move_delay_ms),
        );

        self.games.insert(
            id,
            ManagedGame {
                handle: handle.clone(),
                created_at: Utc::now(),
                session_task,
                driver_task,
            },
        );

        info!("创建对局 {} ({:?})", id, mode);
        handle
    }

    /// 获取对局句柄
    pub fn get(&self, id: GameId) -> Result<SessionHandle> {
        self.games
            .get(&id)
            .map(|game| game.handle.clone())
            .ok_or(ServerError::GameNotFound(id))
    }

    /// 删除对局并停止其任务
    pub fn delete(&mut self, id: GameId) -> Result<()> {
        let game = self.games.remove(&id).ok_or(ServerError::GameNotFound(id))?;
        game.stop();
        info!("删除对局 {}", id);
        Ok(())
    }

    /// 所有对局概要，按 ID 排序
    pub fn list(&self) -> Vec<GameSummary> {
        let mut summaries: Vec<GameSummary> = self
            .games
            .iter()
            .map(|(&id, game)| {
                let snapshot = game.handle.snapshot();
                GameSummary {
                    id,
                    mode: snapshot.mode,
                    status: snapshot.status,
                    turn: snapshot.turn,
                    ply: snapshot.ply,
                    ai: snapshot.ai,
                    created_at: game.created_at,
                }
            })
            .collect();
        summaries.sort_by_key(|summary| summary.id);
        summaries
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl Drop for GameManager {
    fn drop(&mut self) {
        for game in self.games.values() {
            game.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xiangqi_core::{ChessError, DrawReason, GameResult, PieceKind, PlacedPiece, Square};

    fn manager() -> GameManager {
        GameManager::new(ServerConfig {
            ai_depth: 1,
            ai_move_delay_ms: 0,
            ..ServerConfig::default()
        })
    }

    fn placed(row: u8, col: u8, side: Side, kind: PieceKind) -> PlacedPiece {
        PlacedPiece {
            square: Square::new_unchecked(row, col),
            side,
            kind,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let mut manager = manager();
        let first = manager.create_standard();
        let second = manager.create_player_vs_ai();
        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);

        let list = manager.list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].mode, GameMode::PlayerVsPlayer);
        assert_eq!(list[1].mode, GameMode::PlayerVsAi);
        assert_eq!(list[1].ai, AiControl::only(Side::Black));
        assert_eq!(list[0].status, SessionStatus::Active);
        assert_eq!(list[0].ply, 0);
    }

    #[tokio::test]
    async fn test_delete_stops_game() {
        let mut manager = manager();
        let handle = manager.create_ai_vs_ai(Side::Black);
        let id = handle.id();

        manager.delete(id).unwrap();
        assert!(manager.is_empty());
        assert_eq!(manager.get(id).unwrap_err(), ServerError::GameNotFound(id));
        assert_eq!(manager.delete(id).unwrap_err(), ServerError::GameNotFound(id));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_create_custom() {
        let mut manager = manager();
        let description = BoardDescription {
            pieces: vec![
                placed(0, 4, Side::Black, PieceKind::General),
                placed(9, 3, Side::Red, PieceKind::General),
                placed(5, 0, Side::Red, PieceKind::Chariot),
            ],
        };

        let handle = manager
            .create_custom(&description, AiControl::none(), Side::Red)
            .unwrap();
        assert_eq!(handle.snapshot().mode, GameMode::Custom);
        assert_eq!(manager.get(handle.id()).unwrap().id(), handle.id());

        let invalid = BoardDescription {
            pieces: vec![placed(0, 4, Side::Black, PieceKind::General)],
        };
        let err = manager
            .create_custom(&invalid, AiControl::none(), Side::Red)
            .unwrap_err();
        assert!(matches!(
            err,
            ServerError::Chess(ChessError::PlacementViolation { .. })
        ));
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn test_session_config_applied() {
        let mut config = ServerConfig::default();
        config.session.repetition_limit = None;
        config.session.no_capture_limit = Some(8);
        let mut manager = GameManager::new(config);
        let handle = manager.create_standard();

        // 双方来回跳马，第 8 步后无吃子判和
        let shuffle = [
            ((9, 1), (7, 2)),
            ((0, 1), (2, 2)),
            ((7, 2), (9, 1)),
            ((2, 2), (0, 1)),
        ];
        let mut last = None;
        for ((fr, fc), (tr, tc)) in shuffle.iter().chain(shuffle.iter()) {
            let applied = handle
                .play(Square::new_unchecked(*fr, *fc), Square::new_unchecked(*tr, *tc))
                .await
                .unwrap();
            last = applied.result;
        }

        assert_eq!(last, Some(GameResult::Draw(DrawReason::NoCapture)));
        assert_eq!(manager.list()[0].status, SessionStatus::Over(GameResult::Draw(DrawReason::NoCapture)));
    }
}
