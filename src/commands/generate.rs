//! # generate 命令实现
//!
//! 离线生成模式：注入永远未命中的查询源，复用取数流水线，
//! 不产生网络流量，也不做批次暂停。
//!
//! ## 依赖关系
//! - 使用 `cli/generate.rs` 定义的参数
//! - 使用 `config.rs`, `api/mod.rs` 的 OfflineSource, `pipeline/`
//! - 使用 `utils/output.rs`

use crate::api::OfflineSource;
use crate::cli::generate::GenerateArgs;
use crate::config::Config;
use crate::error::{MatfetchError, Result};
use crate::pipeline::{report, PipelineRunner, RunOptions, RunReport};
use crate::utils::output;

use std::time::Duration;

/// 执行 generate 命令
pub fn execute(args: GenerateArgs) -> Result<()> {
    output::print_header("Generating Structures");

    // 命令行给了化学式时允许没有配置文件
    let config = if args.config.exists() {
        Config::load(&args.config)?
    } else if args.formulas.is_empty() {
        return Err(MatfetchError::ConfigError {
            path: args.config.display().to_string(),
            reason: "config file not found and no formulas given on the command line"
                .to_string(),
        });
    } else {
        Config::from_toml("", "builtin defaults")?
    };

    let formulas = if args.formulas.is_empty() {
        config.formulas.clone()
    } else {
        args.formulas.clone()
    };
    if formulas.is_empty() {
        return Err(MatfetchError::ConfigError {
            path: args.config.display().to_string(),
            reason: "no formulas to process".to_string(),
        });
    }

    let structure_dir = args
        .output
        .clone()
        .unwrap_or_else(|| config.api.structure_dir.clone());

    output::print_info(&format!("Generating {} structures offline", formulas.len()));

    let options = RunOptions {
        structure_dir: structure_dir.clone(),
        format: args.format,
        batch_size: formulas.len().max(1),
        batch_pause: Duration::ZERO,
        write_checkpoint: false,
    };

    let mut runner = PipelineRunner::new(OfflineSource, options);
    let outcomes = runner.run(&formulas)?;

    let run_report = RunReport::from_outcomes(&outcomes, structure_dir.clone());

    if !args.no_report {
        let csv_path = structure_dir.join("fetch_report.csv");
        match report::write_csv(&outcomes, &csv_path) {
            Ok(()) => output::print_info(&format!("Report written to '{}'", csv_path.display())),
            Err(e) => output::print_warning(&e.to_string()),
        }
    }

    report::print_report(&run_report, &outcomes);
    Ok(())
}
