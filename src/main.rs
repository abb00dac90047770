//! # Matfetch - 材料结构获取与生成工具
//!
//! 按化学式从 Materials Project 拉取晶体结构；数据库未命中时
//! 降级为本地启发式生成，结果统一序列化为 CIF/POSCAR 文件，
//! 供下游特征提取与模型训练脚本消费。
//!
//! ## 子命令
//! - `fetch`    - 远程查询 + 生成降级的完整流水线
//! - `generate` - 纯本地结构生成（无网络流量）
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── api/       (远程数据库客户端)
//!   │     ├── generator/ (结构生成器)
//!   │     ├── pipeline/  (取数流水线与报告)
//!   │     ├── formats/   (结构文件序列化)
//!   │     └── models/    (数据模型)
//!   ├── config.rs   (TOML 配置)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod api;
mod cli;
mod commands;
mod config;
mod error;
mod formats;
mod generator;
mod models;
mod pipeline;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
