//! # Materials Project HTTP 客户端
//!
//! 按化学式查询 summary 端点，带鉴权、限速与重试。
//!
//! ## 重试策略
//! - 429 / 5xx / 网络错误视为瞬态，指数退避后重试
//!   （第 n 次重试前等待 `backoff_factor^n` 秒，上限 60 秒）
//! - 401 / 403 为致命鉴权错误，立即上抛终止运行
//! - 200 且 `data` 为空或 404 表示数据库无此化学式，返回 `NotFound`
//! - 重试耗尽返回 `Request` 错误，由编排器降级到本地生成
//!
//! ## 限速
//! 相邻两次请求之间至少间隔 `request_delay` 秒（客户端内部计时强制）。
//!
//! ## 依赖关系
//! - 被 `commands/fetch.rs` 构造，经 `StructureSource` trait 注入 `pipeline/`
//! - 使用 `reqwest` blocking 客户端和 `api/response.rs` 响应模型

use crate::api::response::SummaryResponse;
use crate::api::{Lookup, StructureSource};
use crate::config::ApiConfig;
use crate::error::{MatfetchError, Result};

use std::time::{Duration, Instant};

/// 单次 HTTP 请求超时
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// 退避等待上限
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Materials Project 客户端
///
/// 单实例独占请求预算：所有请求串行发出，间隔由 `last_request` 强制。
#[derive(Debug)]
pub struct MpClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    request_delay: Duration,
    max_attempts: u32,
    backoff_factor: f64,
    last_request: Option<Instant>,
}

impl MpClient {
    /// 创建客户端；API key 为空时立即失败（启动期校验，不等到首次请求）
    pub fn new(api_key: String, config: &ApiConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(MatfetchError::MissingApiKey);
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("matfetch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MatfetchError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(MpClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            request_delay: Duration::from_secs_f64(config.request_delay.max(0.0)),
            max_attempts: config.max_retries.max(1),
            backoff_factor: config.backoff_factor.max(1.0),
            last_request: None,
        })
    }

    /// 保证相邻请求间隔不小于 request_delay
    fn throttle(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.request_delay {
                std::thread::sleep(self.request_delay - elapsed);
            }
        }
    }

    /// 第 attempt 次失败后的退避时长（attempt 从 0 起）
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let secs = self.backoff_factor.powi(attempt as i32);
        Duration::from_secs_f64(secs).min(MAX_BACKOFF)
    }
}

/// 瞬态状态码：限流与服务端错误
fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

impl StructureSource for MpClient {
    fn lookup(&mut self, formula: &str) -> Result<Lookup> {
        if formula.trim().is_empty() {
            return Err(MatfetchError::InvalidArgument(
                "formula must be non-empty".to_string(),
            ));
        }

        let url = format!("{}/materials/summary/", self.base_url);

        let mut attempt = 0u32;
        loop {
            self.throttle();
            let result = self
                .http
                .get(&url)
                .header("X-API-KEY", &self.api_key)
                .query(&[
                    ("formula", formula),
                    ("_fields", "material_id,structure"),
                    ("_limit", "1"),
                ])
                .send();
            self.last_request = Some(Instant::now());

            // 非瞬态结果直接返回；瞬态失败记录原因进入退避
            let transient_reason = match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    match status {
                        200 => {
                            let body: SummaryResponse =
                                resp.json().map_err(|e| MatfetchError::Request {
                                    formula: formula.to_string(),
                                    reason: format!("malformed response body: {e}"),
                                })?;
                            return match body.data.into_iter().next() {
                                Some(doc) => Ok(Lookup::Found(doc.into_record(formula)?)),
                                None => Ok(Lookup::NotFound),
                            };
                        }
                        401 | 403 => return Err(MatfetchError::AuthRejected { status }),
                        404 => return Ok(Lookup::NotFound),
                        s if is_retryable_status(s) => format!("HTTP {s}"),
                        s => {
                            return Err(MatfetchError::Request {
                                formula: formula.to_string(),
                                reason: format!("unexpected HTTP status {s}"),
                            })
                        }
                    }
                }
                Err(e) => e.to_string(),
            };

            attempt += 1;
            if attempt >= self.max_attempts {
                return Err(MatfetchError::Request {
                    formula: formula.to_string(),
                    reason: format!("{transient_reason} (after {attempt} attempts)"),
                });
            }
            std::thread::sleep(self.backoff_delay(attempt - 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    fn test_config() -> ApiConfig {
        ApiConfig {
            request_delay: 0.0,
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_empty_api_key_rejected_eagerly() {
        let err = MpClient::new(String::new(), &test_config()).unwrap_err();
        assert!(matches!(err, MatfetchError::MissingApiKey));

        let err = MpClient::new("   ".to_string(), &test_config()).unwrap_err();
        assert!(matches!(err, MatfetchError::MissingApiKey));
    }

    #[test]
    fn test_backoff_schedule() {
        let client = MpClient::new("test-key".to_string(), &test_config()).unwrap();

        // backoff_factor = 2.0 -> 1s, 2s, 4s
        assert_eq!(client.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(client.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(client.backoff_delay(2), Duration::from_secs(4));

        // 封顶 60 秒
        assert_eq!(client.backoff_delay(30), MAX_BACKOFF);
    }

    #[test]
    fn test_retryable_status_classification() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(200));
        assert!(!is_retryable_status(401));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(400));
    }

    #[test]
    fn test_empty_formula_rejected() {
        let mut client = MpClient::new("test-key".to_string(), &test_config()).unwrap();
        let err = client.lookup("").unwrap_err();
        assert!(matches!(err, MatfetchError::InvalidArgument(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ApiConfig {
            base_url: "https://api.materialsproject.org/".to_string(),
            ..test_config()
        };
        let client = MpClient::new("test-key".to_string(), &config).unwrap();
        assert_eq!(client.base_url, "https://api.materialsproject.org");
    }
}
