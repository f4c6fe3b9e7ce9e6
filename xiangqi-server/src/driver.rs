//! AI 驱动
//!
//! 订阅对局快照，轮到 AI 一方时在阻塞线程池中搜索，再带着版本号提交走法。

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use xiangqi_ai::{AiConfig, AiEngine};
use xiangqi_core::ChessError;

use crate::actor::SessionHandle;
use crate::error::ServerError;

/// 启动 AI 驱动任务，对局任务结束后自动退出
pub fn spawn(handle: SessionHandle, config: AiConfig, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(run(handle, config, delay))
}

async fn run(handle: SessionHandle, config: AiConfig, delay: Duration) {
    let mut engine = AiEngine::new(config);
    let mut state = handle.subscribe();

    loop {
        let _ = state.borrow_and_update();

        let turn = match handle.ai_turn().await {
            Ok(turn) => turn,
            Err(_) => break,
        };

        if let Some(turn) = turn {
            tokio::time::sleep(delay).await;
            if state.borrow().revision != turn.revision {
                continue;
            }

            let revision = turn.revision;
            let searched = tokio::task::spawn_blocking(move || {
                let best = engine.search(&turn.board, turn.side, &turn.seen);
                debug!("AI searched {} nodes", engine.nodes_searched());
                (engine, best)
            })
            .await;

            let best = match searched {
                Ok((returned, best)) => {
                    engine = returned;
                    best
                }
                Err(e) => {
                    error!("Game {} AI 搜索任务失败: {}", handle.id(), e);
                    break;
                }
            };

            match best {
                Some(mv) => match handle.play_ai(revision, mv.from, mv.to).await {
                    Ok(applied) => {
                        if let Some(result) = applied.result {
                            info!("Game {} 结束: {:?}", handle.id(), result);
                        }
                    }
                    Err(ServerError::Chess(ChessError::InvalidTransition { reason, .. })) => {
                        warn!("AI 计算期间对局状态已改变，丢弃 AI 走法: {}", reason);
                    }
                    Err(ServerError::Chess(e)) => {
                        error!("Game {} AI 走法被拒绝: {}", handle.id(), e);
                    }
                    Err(_) => break,
                },
                None => warn!("Game {} AI 无法找到合法走法", handle.id()),
            }
        }

        if state.changed().await.is_err() {
            break;
        }
    }

    debug!("Game {} AI driver stopped", handle.id());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor;
    use xiangqi_core::{GameSession, Side, Square};

    fn sq(row: u8, col: u8) -> Square {
        Square::new_unchecked(row, col)
    }

    fn fast_ai() -> AiConfig {
        AiConfig {
            max_depth: 1,
            time_limit_ms: 1000,
            seed: Some(1),
            ..AiConfig::default()
        }
    }

    async fn wait_for_ply(handle: &SessionHandle, ply: usize) {
        let mut state = handle.subscribe();
        tokio::time::timeout(Duration::from_secs(10), async {
            while state.borrow_and_update().ply < ply {
                state.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_ai_replies_to_human() {
        let (handle, _task) = actor::spawn(1, GameSession::player_vs_ai(), 8);
        let _driver = spawn(handle.clone(), fast_ai(), Duration::ZERO);

        handle.play(sq(7, 1), sq(7, 4)).await.unwrap();
        wait_for_ply(&handle, 2).await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.turn, Side::Red);
        assert!(snapshot.last_move.is_some());
    }

    #[tokio::test]
    async fn test_paused_game_waits_for_resume() {
        let (handle, _task) = actor::spawn(2, GameSession::ai_vs_ai(Side::Red), 8);
        handle.pause().await.unwrap();
        let _driver = spawn(handle.clone(), fast_ai(), Duration::ZERO);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handle.snapshot().ply, 0);

        handle.resume().await.unwrap();
        wait_for_ply(&handle, 2).await;
    }

    #[tokio::test]
    async fn test_driver_stops_with_session() {
        let (handle, task) = actor::spawn(3, GameSession::standard(), 8);
        let driver = spawn(handle.clone(), fast_ai(), Duration::ZERO);

        task.abort();
        drop(handle);
        tokio::time::timeout(Duration::from_secs(5), driver)
            .await
            .unwrap()
            .unwrap();
    }
}
