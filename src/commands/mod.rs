//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `config.rs`, `pipeline/`, `utils/`
//! - 子模块: fetch, generate

pub mod fetch;
pub mod generate;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Fetch(args) => fetch::execute(args),
        Commands::Generate(args) => generate::execute(args),
    }
}
