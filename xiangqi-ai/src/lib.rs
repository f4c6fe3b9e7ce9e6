//! 中国象棋 AI 引擎
//!
//! 包含:
//! - 棋局评估函数
//! - Alpha-Beta 搜索 + 迭代加深 + 静态搜索
//! - 避免重复局面的走法选择

mod evaluate;
mod search;

pub use evaluate::Evaluator;
pub use search::{AiConfig, AiEngine};
