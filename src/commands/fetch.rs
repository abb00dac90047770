//! # fetch 命令实现
//!
//! 完整取数流水线：加载配置 → 构造 API 客户端 → 逐条
//! 查询/降级/写盘 → 汇总报告。
//!
//! ## 依赖关系
//! - 使用 `cli/fetch.rs` 定义的参数
//! - 使用 `config.rs`, `api/client.rs`, `pipeline/`
//! - 使用 `utils/output.rs`

use crate::api::MpClient;
use crate::cli::fetch::FetchArgs;
use crate::config::Config;
use crate::error::{MatfetchError, Result};
use crate::pipeline::{report, PipelineRunner, RunOptions, RunReport};
use crate::utils::output;

use std::time::Duration;

/// 执行 fetch 命令
pub fn execute(args: FetchArgs) -> Result<()> {
    output::print_header("Fetching Structures");

    let config = Config::load(&args.config)?;
    if config.formulas.is_empty() {
        return Err(MatfetchError::ConfigError {
            path: args.config.display().to_string(),
            reason: "formulas list is empty".to_string(),
        });
    }

    // 启动期校验 API key，缺失时在处理任何化学式之前终止
    let api_key = config.resolve_api_key(args.api_key.as_deref())?;
    let client = MpClient::new(api_key, &config.api)?;

    let structure_dir = args
        .output
        .clone()
        .unwrap_or_else(|| config.api.structure_dir.clone());

    output::print_info(&format!(
        "Processing {} formulas (batch size {}, request delay {}s)",
        config.formulas.len(),
        config.api.batch_size,
        config.api.request_delay
    ));

    let options = RunOptions {
        structure_dir: structure_dir.clone(),
        format: args.format,
        batch_size: config.api.batch_size,
        batch_pause: Duration::from_secs_f64(config.api.request_delay.max(0.0)),
        write_checkpoint: true,
    };

    let mut runner = PipelineRunner::new(client, options);
    let outcomes = runner.run(&config.formulas)?;

    let run_report = RunReport::from_outcomes(&outcomes, structure_dir.clone());

    if !args.no_report {
        let csv_path = structure_dir.join("fetch_report.csv");
        // 报告写失败只告警：逐条处理已经完成
        match report::write_csv(&outcomes, &csv_path) {
            Ok(()) => output::print_info(&format!("Report written to '{}'", csv_path.display())),
            Err(e) => output::print_warning(&e.to_string()),
        }
    }

    report::print_report(&run_report, &outcomes);
    Ok(())
}
