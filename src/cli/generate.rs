//! # generate 子命令 CLI 定义
//!
//! 离线模式：跳过远程查询，为化学式直接生成占位结构。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 复用 `cli/fetch.rs` 的 OutputFormat
//! - 参数传递给 `commands/generate.rs`

use crate::cli::fetch::OutputFormat;
use clap::Args;
use std::path::PathBuf;

/// generate 子命令参数
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Formulas to generate (defaults to the config file list)
    pub formulas: Vec<String>,

    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "matfetch.toml")]
    pub config: PathBuf,

    /// Output directory for structure files (overrides the config file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Structure file format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Cif)]
    pub format: OutputFormat,

    /// Skip writing the per-formula CSV report
    #[arg(long, default_value_t = false)]
    pub no_report: bool,
}
