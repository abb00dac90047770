//! # 运行报告
//!
//! 把一次运行的全部逐条结果聚合成汇总报告：尝试数、成功数、
//! 来源分布与成功率。聚合本身是出错不了的纯函数；打印和 CSV
//! 导出是唯一的副作用。
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 `pipeline/runner.rs` 的 FetchOutcome
//! - 使用 `tabled` 生成终端表格、`csv` 导出明细

use crate::error::{MatfetchError, Result};
use crate::models::Provenance;
use crate::pipeline::runner::{FetchOutcome, OutcomeStatus};
use crate::utils::output;

use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 一次运行的汇总
#[derive(Debug, Clone)]
pub struct RunReport {
    /// 输入化学式总数
    pub attempted: usize,
    /// 成功保存的数量
    pub succeeded: usize,
    /// 其中来自远程数据库的数量
    pub fetched: usize,
    /// 其中本地生成的数量
    pub generated: usize,
    /// 失败数量
    pub failed: usize,
    /// 结构文件输出目录
    pub structure_dir: PathBuf,
}

impl RunReport {
    /// 从有序结果列表聚合
    pub fn from_outcomes(outcomes: &[FetchOutcome], structure_dir: impl Into<PathBuf>) -> Self {
        let mut report = RunReport {
            attempted: outcomes.len(),
            succeeded: 0,
            fetched: 0,
            generated: 0,
            failed: 0,
            structure_dir: structure_dir.into(),
        };

        for outcome in outcomes {
            match outcome.status {
                OutcomeStatus::Success => {
                    report.succeeded += 1;
                    match outcome.source {
                        Some(Provenance::Fetched { .. }) => report.fetched += 1,
                        Some(Provenance::Generated) => report.generated += 1,
                        None => {}
                    }
                }
                OutcomeStatus::Failure => report.failed += 1,
            }
        }

        report
    }

    /// 成功率，范围 [0, 1]；无输入时为 0
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.attempted as f64
        }
    }
}

/// 报告表格行
#[derive(Debug, Clone, Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Formula")]
    formula: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl OutcomeRow {
    fn from_outcome(outcome: &FetchOutcome) -> Self {
        OutcomeRow {
            formula: outcome.formula.clone(),
            status: match outcome.status {
                OutcomeStatus::Success => "ok".to_string(),
                OutcomeStatus::Failure => "failed".to_string(),
            },
            source: outcome
                .source
                .as_ref()
                .map(|s| s.tag().to_string())
                .unwrap_or_else(|| "-".to_string()),
            detail: match (&outcome.path, &outcome.detail) {
                (Some(path), _) => path.display().to_string(),
                (None, Some(reason)) => reason.clone(),
                (None, None) => String::new(),
            },
        }
    }
}

/// 打印汇总报告到终端
pub fn print_report(report: &RunReport, outcomes: &[FetchOutcome]) {
    let rows: Vec<OutcomeRow> = outcomes.iter().map(OutcomeRow::from_outcome).collect();
    let table = Table::new(&rows);
    println!("{}", table);
    println!();

    output::print_success(&format!(
        "Success rate: {:.1}%",
        report.success_rate() * 100.0
    ));
    output::print_info(&format!(
        "Structures saved to: {}",
        report.structure_dir.display()
    ));
}

/// 导出逐条明细到 CSV
pub fn write_csv(outcomes: &[FetchOutcome], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path).map_err(MatfetchError::CsvError)?;

    wtr.write_record(["formula", "status", "source", "material_id", "path"])
        .map_err(MatfetchError::CsvError)?;

    for outcome in outcomes {
        let material_id = match &outcome.source {
            Some(Provenance::Fetched {
                material_id: Some(id),
            }) => id.clone(),
            _ => String::new(),
        };
        wtr.write_record([
            outcome.formula.clone(),
            match outcome.status {
                OutcomeStatus::Success => "success".to_string(),
                OutcomeStatus::Failure => "failure".to_string(),
            },
            outcome
                .source
                .as_ref()
                .map(|s| s.tag().to_string())
                .unwrap_or_default(),
            material_id,
            outcome
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        ])
        .map_err(MatfetchError::CsvError)?;
    }

    wtr.flush().map_err(|e| MatfetchError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn outcome(
        formula: &str,
        status: OutcomeStatus,
        source: Option<Provenance>,
    ) -> FetchOutcome {
        FetchOutcome {
            formula: formula.to_string(),
            status,
            source,
            path: None,
            detail: None,
        }
    }

    #[test]
    fn test_empty_run_has_zero_rate() {
        let report = RunReport::from_outcomes(&[], "structures");
        assert_eq!(report.attempted, 0);
        assert!((report.success_rate() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_aggregation_counts() {
        let outcomes = vec![
            outcome(
                "BeAlN2",
                OutcomeStatus::Success,
                Some(Provenance::Fetched {
                    material_id: Some("mp-1".to_string()),
                }),
            ),
            outcome("XxYyZz9", OutcomeStatus::Success, Some(Provenance::Generated)),
            outcome("??", OutcomeStatus::Failure, None),
        ];
        let report = RunReport::from_outcomes(&outcomes, "structures");

        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.fetched, 1);
        assert_eq!(report.generated, 1);
        assert_eq!(report.failed, 1);

        let rate = report.success_rate();
        assert!((0.0..=1.0).contains(&rate));
        assert!((rate - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_resolved_is_full_rate() {
        let outcomes = vec![
            outcome("NaCl", OutcomeStatus::Success, Some(Provenance::Generated)),
            outcome("TiO2", OutcomeStatus::Success, Some(Provenance::Generated)),
        ];
        let report = RunReport::from_outcomes(&outcomes, "structures");
        assert!((report.success_rate() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_csv_export() {
        let outcomes = vec![
            FetchOutcome {
                formula: "AlSb".to_string(),
                status: OutcomeStatus::Success,
                source: Some(Provenance::Fetched {
                    material_id: Some("mp-2624".to_string()),
                }),
                path: Some(PathBuf::from("structures/AlSb_fetched.cif")),
                detail: None,
            },
            FetchOutcome {
                formula: "??".to_string(),
                status: OutcomeStatus::Failure,
                source: None,
                path: None,
                detail: Some("unparseable".to_string()),
            },
        ];

        let csv_path = std::env::temp_dir().join(format!(
            "matfetch_report_test_{}.csv",
            std::process::id()
        ));
        write_csv(&outcomes, &csv_path).unwrap();

        let content = std::fs::read_to_string(&csv_path).unwrap();
        std::fs::remove_file(&csv_path).ok();

        assert!(content.starts_with("formula,status,source,material_id,path"));
        assert!(content.contains("AlSb,success,fetched,mp-2624,structures/AlSb_fetched.cif"));
        assert!(content.contains("??,failure,,,"));
    }
}
