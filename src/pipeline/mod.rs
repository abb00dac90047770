//! # 取数流水线模块
//!
//! 编排 查询 → 降级生成 → 写盘 的逐条状态机，并聚合运行报告。
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 `api/`, `generator/`, `formats/`, `models/`
//! - 子模块: runner, report

pub mod report;
pub mod runner;

pub use report::RunReport;
pub use runner::{FetchOutcome, OutcomeStatus, PipelineRunner, RunOptions};
