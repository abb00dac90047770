//! # fetch 子命令 CLI 定义
//!
//! 完整流水线：远程查询 → 生成降级 → 写盘 → 汇总报告。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/fetch.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 结构文件输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Crystallographic Information File
    Cif,
    /// VASP POSCAR format
    Poscar,
}

impl OutputFormat {
    /// 输出文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Cif => "cif",
            OutputFormat::Poscar => "vasp",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Cif => write!(f, "cif"),
            OutputFormat::Poscar => write!(f, "poscar"),
        }
    }
}

/// fetch 子命令参数
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "matfetch.toml")]
    pub config: PathBuf,

    /// Materials Project API key (overrides the config file)
    #[arg(long, env = "MP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

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
