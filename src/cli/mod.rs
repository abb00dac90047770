//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `fetch`: 远程获取 + 生成降级的完整流水线
//! - `generate`: 纯本地结构生成
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: fetch, generate

pub mod fetch;
pub mod generate;

use clap::{Parser, Subcommand};

/// Matfetch - 材料结构获取与生成工具
#[derive(Parser)]
#[command(name = "matfetch")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Materials Project structure acquisition and generation toolkit", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch structures from Materials Project, generating fallbacks on miss
    Fetch(fetch::FetchArgs),

    /// Generate placeholder structures locally without querying the API
    Generate(generate::GenerateArgs),
}
