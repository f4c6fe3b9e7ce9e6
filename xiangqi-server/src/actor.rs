//! 对局任务
//!
//! 每局棋由一个独立任务独占 `GameSession`，外部通过 `SessionHandle` 发送命令。
//! 命令按到达顺序逐个执行，每次成功修改后通过 watch 通道发布新的快照。

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::debug;
use xiangqi_core::{
    AppliedMove, Board, ChessError, GameResult, GameSession, GameSnapshot, HistoryEntry, Side,
    Square,
};

use crate::error::{GameId, Result, ServerError};

type Reply<T> = oneshot::Sender<std::result::Result<T, ChessError>>;

/// 轮到 AI 时交给搜索的局面
#[derive(Debug, Clone)]
pub struct AiTurn {
    pub board: Board,
    pub side: Side,
    /// 取局面时的版本号，提交走法时原样带回
    pub revision: u64,
    /// 已出现过的局面哈希
    pub seen: Vec<u64>,
}

enum Command {
    Play {
        from: Square,
        to: Square,
        reply: Reply<AppliedMove>,
    },
    PlayAi {
        revision: u64,
        from: Square,
        to: Square,
        reply: Reply<AppliedMove>,
    },
    Undo {
        reply: Reply<HistoryEntry>,
    },
    UndoToHuman {
        reply: Reply<Vec<HistoryEntry>>,
    },
    Resign {
        side: Side,
        reply: Reply<GameResult>,
    },
    Pause {
        reply: Reply<()>,
    },
    Resume {
        reply: Reply<()>,
    },
    SetAi {
        side: Side,
        enabled: bool,
        reply: Reply<()>,
    },
    LegalMoves {
        origin: Square,
        reply: Reply<Vec<Square>>,
    },
    AiTurn {
        reply: oneshot::Sender<Option<AiTurn>>,
    },
}

/// 对局句柄（可克隆，所有克隆共享同一个对局任务）
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: GameId,
    tx: mpsc::Sender<Command>,
    state: watch::Receiver<GameSnapshot>,
}

/// 启动对局任务
///
/// 返回的句柄在任务结束后所有命令都会得到 `SessionClosed`。
pub fn spawn(id: GameId, session: GameSession, capacity: usize) -> (SessionHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let (state_tx, state) = watch::channel(session.snapshot());

    let task = tokio::spawn(run(id, session, rx, state_tx));
    (SessionHandle { id, tx, state }, task)
}

async fn run(
    id: GameId,
    mut session: GameSession,
    mut rx: mpsc::Receiver<Command>,
    state_tx: watch::Sender<GameSnapshot>,
) {
    debug!("Game {} task started", id);

    while let Some(command) = rx.recv().await {
        handle(&mut session, command, &state_tx);
    }

    debug!("Game {} task stopped", id);
}

fn handle(session: &mut GameSession, command: Command, state_tx: &watch::Sender<GameSnapshot>) {
    match command {
        Command::Play { from, to, reply } => {
            let result = session.play(from, to);
            respond(session, state_tx, reply, result);
        }
        Command::PlayAi {
            revision,
            from,
            to,
            reply,
        } => {
            let result = session.play_ai(revision, from, to);
            respond(session, state_tx, reply, result);
        }
        Command::Undo { reply } => {
            let result = session.undo();
            respond(session, state_tx, reply, result);
        }
        Command::UndoToHuman { reply } => {
            let result = session.undo_to_human();
            respond(session, state_tx, reply, result);
        }
        Command::Resign { side, reply } => {
            let result = session.resign(side);
            respond(session, state_tx, reply, result);
        }
        Command::Pause { reply } => {
            let result = session.pause();
            respond(session, state_tx, reply, result);
        }
        Command::Resume { reply } => {
            let result = session.resume();
            respond(session, state_tx, reply, result);
        }
        Command::SetAi {
            side,
            enabled,
            reply,
        } => {
            let result = session.set_ai(side, enabled);
            respond(session, state_tx, reply, result);
        }
        Command::LegalMoves { origin, reply } => {
            let result = session.legal_moves(origin);
            respond(session, state_tx, reply, result);
        }
        Command::AiTurn { reply } => {
            let turn = ai_turn(session);
            respond(session, state_tx, reply, turn);
        }
    }
}

/// 先发布快照再回复，请求方拿到回复时快照已经是最新的
fn respond<T>(
    session: &GameSession,
    state_tx: &watch::Sender<GameSnapshot>,
    reply: oneshot::Sender<T>,
    value: T,
) {
    let changed = state_tx.borrow().revision != session.revision();
    if changed {
        state_tx.send_replace(session.snapshot());
    }

    // 请求方已经放弃等待时回复会被丢弃
    let _ = reply.send(value);
}

fn ai_turn(session: &GameSession) -> Option<AiTurn> {
    let side = session.turn();
    if session.is_over() || session.is_paused() || !session.ai_control().is_enabled(side) {
        return None;
    }

    Some(AiTurn {
        board: session.board().clone(),
        side,
        revision: session.revision(),
        seen: session.position_keys().to_vec(),
    })
}

impl SessionHandle {
    pub fn id(&self) -> GameId {
        self.id
    }

    /// 最新快照
    pub fn snapshot(&self) -> GameSnapshot {
        self.state.borrow().clone()
    }

    /// 订阅快照更新
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.state.clone()
    }

    /// 对局任务是否已经停止
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| ServerError::SessionClosed(self.id))?;
        response.await.map_err(|_| ServerError::SessionClosed(self.id))
    }

    /// 人类走棋
    pub async fn play(&self, from: Square, to: Square) -> Result<AppliedMove> {
        Ok(self.request(|reply| Command::Play { from, to, reply }).await??)
    }

    /// AI 走棋，`revision` 来自 `ai_turn`
    pub async fn play_ai(&self, revision: u64, from: Square, to: Square) -> Result<AppliedMove> {
        Ok(self
            .request(|reply| Command::PlayAi {
                revision,
                from,
                to,
                reply,
            })
            .await??)
    }

    pub async fn undo(&self) -> Result<HistoryEntry> {
        Ok(self.request(|reply| Command::Undo { reply }).await??)
    }

    /// 悔棋直到轮到人类一方
    pub async fn undo_to_human(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.request(|reply| Command::UndoToHuman { reply }).await??)
    }

    pub async fn resign(&self, side: Side) -> Result<GameResult> {
        Ok(self.request(|reply| Command::Resign { side, reply }).await??)
    }

    pub async fn pause(&self) -> Result<()> {
        Ok(self.request(|reply| Command::Pause { reply }).await??)
    }

    pub async fn resume(&self) -> Result<()> {
        Ok(self.request(|reply| Command::Resume { reply }).await??)
    }

    /// 切换某一方的 AI 控制
    pub async fn set_ai(&self, side: Side, enabled: bool) -> Result<()> {
        Ok(self
            .request(|reply| Command::SetAi {
                side,
                enabled,
                reply,
            })
            .await??)
    }

    /// 某个棋子的合法落点
    pub async fn legal_moves(&self, origin: Square) -> Result<Vec<Square>> {
        Ok(self
            .request(|reply| Command::LegalMoves { origin, reply })
            .await??)
    }

    /// 轮到 AI 时返回当前局面，否则返回 None
    pub async fn ai_turn(&self) -> Result<Option<AiTurn>> {
        self.request(|reply| Command::AiTurn { reply }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xiangqi_core::{Operation, SessionStatus, WinReason};

    fn sq(row: u8, col: u8) -> Square {
        Square::new_unchecked(row, col)
    }

    #[tokio::test]
    async fn test_play_publishes_snapshot() {
        let (handle, _task) = spawn(1, GameSession::standard(), 8);
        let mut state = handle.subscribe();
        assert_eq!(handle.snapshot().revision, 0);

        let applied = handle.play(sq(7, 1), sq(7, 4)).await.unwrap();
        assert_eq!(applied.entry.captured, None);

        state.changed().await.unwrap();
        let snapshot = state.borrow_and_update().clone();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.turn, Side::Black);
        assert_eq!(snapshot.ply, 1);
        assert_eq!(snapshot.last_move.map(|mv| mv.to), Some(sq(7, 4)));
    }

    #[tokio::test]
    async fn test_rejected_command_keeps_revision() {
        let (handle, _task) = spawn(2, GameSession::standard(), 8);

        let err = handle.play(sq(0, 0), sq(1, 0)).await.unwrap_err();
        assert!(matches!(err, ServerError::Chess(ChessError::IllegalMove { .. })));

        let err = handle.resume().await.unwrap_err();
        assert!(matches!(
            err,
            ServerError::Chess(ChessError::InvalidTransition {
                operation: Operation::Resume,
                ..
            })
        ));

        assert_eq!(handle.snapshot().revision, 0);
    }

    #[tokio::test]
    async fn test_ai_turn_and_stale_revision() {
        let (handle, _task) = spawn(3, GameSession::player_vs_ai(), 8);
        assert!(handle.ai_turn().await.unwrap().is_none());

        handle.play(sq(9, 1), sq(7, 2)).await.unwrap();
        let turn = handle.ai_turn().await.unwrap().unwrap();
        assert_eq!(turn.side, Side::Black);
        assert_eq!(turn.revision, 1);
        assert_eq!(turn.seen.len(), 2);

        // 人类悔棋后旧版本的 AI 走法必须被拒绝
        handle.undo().await.unwrap();
        let err = handle
            .play_ai(turn.revision, sq(0, 1), sq(2, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Chess(ChessError::InvalidTransition { .. })));
        assert_eq!(handle.snapshot().ply, 0);
    }

    #[tokio::test]
    async fn test_pause_blocks_ai_turn() {
        let (handle, _task) = spawn(4, GameSession::ai_vs_ai(Side::Red), 8);
        assert!(handle.ai_turn().await.unwrap().is_some());

        handle.pause().await.unwrap();
        assert!(handle.ai_turn().await.unwrap().is_none());
        assert!(handle.snapshot().paused);

        handle.set_ai(Side::Red, false).await.unwrap();
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Active);
        assert!(handle.ai_turn().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resign_and_legal_moves() {
        let (handle, _task) = spawn(5, GameSession::standard(), 8);

        let targets = handle.legal_moves(sq(9, 1)).await.unwrap();
        assert_eq!(targets.len(), 2);

        let result = handle.resign(Side::Red).await.unwrap();
        assert_eq!(
            result,
            GameResult::Win {
                winner: Side::Black,
                reason: WinReason::Resignation
            }
        );
        assert_eq!(handle.snapshot().result, Some(result));
    }

    #[tokio::test]
    async fn test_closed_session() {
        let (handle, task) = spawn(6, GameSession::standard(), 8);
        task.abort();
        let _ = task.await;

        assert!(handle.is_closed());
        assert_eq!(
            handle.undo().await.unwrap_err(),
            ServerError::SessionClosed(6)
        );
    }
}
