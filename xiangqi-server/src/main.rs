use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xiangqi_core::{GameResult, GameSnapshot, Side};
use xiangqi_server::{GameManager, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // 第一个参数为配置文件路径
    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = ServerConfig::load(path.as_deref())?;

    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(config.log_directive.parse()?))
        .init();

    info!("中国象棋对局服务启动中...");

    let mut manager = GameManager::new(config);
    let handle = manager.create_ai_vs_ai(Side::Red);
    let mut state = handle.subscribe();

    tokio::select! {
        result = wait_for_result(&mut state) => match result {
            Some(result) => info!("对局结束: {:?}", result),
            None => warn!("对局任务意外停止"),
        },
        _ = tokio::signal::ctrl_c() => info!("收到中断信号"),
    }

    let snapshot = handle.snapshot();
    info!("共 {} 步，终局 FEN: {}", snapshot.ply, snapshot.fen);

    manager.delete(handle.id())?;
    Ok(())
}

async fn wait_for_result(state: &mut watch::Receiver<GameSnapshot>) -> Option<GameResult> {
    loop {
        if let Some(result) = state.borrow_and_update().result {
            return Some(result);
        }
        if state.changed().await.is_err() {
            return None;
        }
    }
}
