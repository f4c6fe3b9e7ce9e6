//! 服务端配置

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use xiangqi_ai::AiConfig;
use xiangqi_core::SessionConfig;

/// 服务端配置（JSON，缺失字段使用默认值）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 追加到 `RUST_LOG` 之后的日志过滤指令
    pub log_directive: String,
    /// AI 搜索深度
    pub ai_depth: u8,
    /// AI 单步思考时间上限
    pub ai_time_limit_ms: u64,
    /// AI 落子前的等待时间
    pub ai_move_delay_ms: u64,
    /// 每局命令队列长度
    pub command_queue_capacity: usize,
    /// 和棋规则
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_directive: "xiangqi_server=info".to_string(),
            ai_depth: 3,
            ai_time_limit_ms: 3000,
            ai_move_delay_ms: 500,
            command_queue_capacity: 32,
            session: SessionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// 加载配置
    ///
    /// 指定路径时必须能读取；否则尝试默认路径，不存在则使用默认值。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// 从文件读取
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("配置文件格式错误: {:?}", path))
    }

    /// AI 引擎配置
    pub fn ai_config(&self) -> AiConfig {
        AiConfig {
            max_depth: self.ai_depth,
            time_limit_ms: self.ai_time_limit_ms,
            ..AiConfig::default()
        }
    }
}

/// 获取跨平台的默认配置路径
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("xiangqi").join("server.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.ai_depth, 3);
        assert_eq!(config.ai_move_delay_ms, 500);
        assert_eq!(config.session.repetition_limit, Some(3));
        assert_eq!(config.session.no_capture_limit, Some(120));
        assert_eq!(config.ai_config().max_depth, 3);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"ai_depth": 2, "session": {{"repetition_limit": null}}}}"#
        )
        .unwrap();

        let config = ServerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.ai_depth, 2);
        assert_eq!(config.command_queue_capacity, 32);
        assert_eq!(config.session.repetition_limit, None);
        assert_eq!(config.session.no_capture_limit, Some(120));
        assert_eq!(config.log_directive, "xiangqi_server=info");
    }

    #[test]
    fn test_explicit_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ServerConfig::load(Some(&dir.path().join("missing.json"))).is_err());

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "not json").unwrap();
        let err = ServerConfig::from_file(&bad).unwrap_err();
        assert!(err.to_string().contains("配置文件格式错误"));
    }

    #[test]
    fn test_default_path_shape() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("xiangqi/server.json"));
        }
    }
}
