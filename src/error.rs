//! # 统一错误处理模块
//!
//! 定义 Matfetch 的所有错误类型，使用 `thiserror` 派生。
//!
//! 错误分两类：致命错误（配置不可读、API key 缺失/被拒绝）终止整个运行；
//! 逐条错误（单个化学式解析失败、写文件失败、请求重试耗尽）只记入统计，
//! 不中断剩余化学式的处理。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// Matfetch 统一错误类型
#[derive(Error, Debug)]
pub enum MatfetchError {
    // ─────────────────────────────────────────────────────────────
    // 配置错误（致命）
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to load config: {path}\nReason: {reason}")]
    ConfigError { path: String, reason: String },

    #[error("API key not set (use [api].api_key in config or the MP_API_KEY environment variable)")]
    MissingApiKey,

    #[error("API key rejected by server (HTTP {status})")]
    AuthRejected { status: u16 },

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 逐条错误（记入统计，不中断运行）
    // ─────────────────────────────────────────────────────────────
    #[error("Request for '{formula}' failed after retries: {reason}")]
    Request { formula: String, reason: String },

    #[error("Cannot parse formula '{formula}': {reason}")]
    FormulaParse { formula: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

impl MatfetchError {
    /// 是否为致命错误（终止整个运行）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MatfetchError::ConfigError { .. }
                | MatfetchError::MissingApiKey
                | MatfetchError::AuthRejected { .. }
        )
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, MatfetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(MatfetchError::MissingApiKey.is_fatal());
        assert!(MatfetchError::AuthRejected { status: 401 }.is_fatal());
        assert!(!MatfetchError::Request {
            formula: "BeAlN2".to_string(),
            reason: "timeout".to_string(),
        }
        .is_fatal());
        assert!(!MatfetchError::FormulaParse {
            formula: "??".to_string(),
            reason: "no element tokens".to_string(),
        }
        .is_fatal());
    }
}
