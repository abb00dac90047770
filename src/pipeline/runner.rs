//! # 取数流水线
//!
//! 逐条执行状态机：
//! `Pending → Fetching → {Fetched | Generating → Generated} → Saved | Failed`
//!
//! 严格按输入顺序串行处理，每条化学式恰好产生一条结果记录。
//! 远程未命中或请求重试耗尽都降级到本地生成；只有鉴权错误和
//! 输出目录不可建是致命的。
//!
//! ## 批次行为
//! 每处理 `batch_size` 条后写一次检查点并额外暂停 `batch_pause`，
//! 配合客户端内部的请求间隔共同控制 API 压力。
//!
//! ## 依赖关系
//! - 被 `commands/fetch.rs` 和 `commands/generate.rs` 调用
//! - 使用 `api/`（经 StructureSource trait）、`generator/`、`formats/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::api::{Lookup, StructureSource};
use crate::cli::fetch::OutputFormat;
use crate::error::{MatfetchError, Result};
use crate::formats;
use crate::generator;
use crate::models::{Provenance, StructureRecord};
use crate::utils::{output, progress};

use indicatif::ProgressBar;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// 检查点文件名（结构目录下）
const CHECKPOINT_FILE: &str = "fetch_checkpoint.json";

/// 单条化学式的最终状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Failure,
}

/// 单条化学式的处理结果
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub formula: String,
    pub status: OutcomeStatus,
    /// 成功时的结构来源；解析失败时为 None
    pub source: Option<Provenance>,
    /// 成功写盘的文件路径
    pub path: Option<PathBuf>,
    /// 失败原因
    pub detail: Option<String>,
}

/// 解析阶段的三态结果，保存步骤统一消费
enum Resolution {
    Fetched(StructureRecord),
    Generated(StructureRecord),
    Failed(String),
}

/// 流水线运行参数
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// 结构文件输出目录
    pub structure_dir: PathBuf,
    /// 输出格式
    pub format: OutputFormat,
    /// 批次大小
    pub batch_size: usize,
    /// 批次边界的额外暂停
    pub batch_pause: Duration,
    /// 是否在批次边界写检查点
    pub write_checkpoint: bool,
}

/// 取数流水线执行器
///
/// 对查询源泛型：生产环境注入 `MpClient`，离线模式注入 `OfflineSource`，
/// 测试注入桩实现。
pub struct PipelineRunner<S: StructureSource> {
    source: S,
    options: RunOptions,
}

impl<S: StructureSource> PipelineRunner<S> {
    pub fn new(source: S, options: RunOptions) -> Self {
        PipelineRunner { source, options }
    }

    /// 处理整个化学式列表
    ///
    /// 返回与输入等长、同序的结果列表。仅致命错误上抛；逐条失败
    /// 记入对应的结果并继续处理剩余化学式。
    pub fn run(&mut self, formulas: &[String]) -> Result<Vec<FetchOutcome>> {
        fs::create_dir_all(&self.options.structure_dir).map_err(|e| {
            MatfetchError::FileWriteError {
                path: self.options.structure_dir.display().to_string(),
                source: e,
            }
        })?;

        let pb = progress::create_progress_bar(formulas.len() as u64, "Processing");
        let mut outcomes: Vec<FetchOutcome> = Vec::with_capacity(formulas.len());

        for (idx, formula) in formulas.iter().enumerate() {
            let resolution = self.resolve(formula, &pb)?;
            let outcome = self.save(formula, resolution, &pb);
            outcomes.push(outcome);
            pb.inc(1);

            // 批次边界：先落检查点再暂停
            let done = idx + 1;
            if done % self.options.batch_size == 0 && done < formulas.len() {
                if self.options.write_checkpoint {
                    self.write_checkpoint(&outcomes, &pb);
                }
                if !self.options.batch_pause.is_zero() {
                    std::thread::sleep(self.options.batch_pause);
                }
            }
        }

        if self.options.write_checkpoint {
            self.write_checkpoint(&outcomes, &pb);
        }

        pb.finish_and_clear();
        Ok(outcomes)
    }

    /// `Fetching → {Fetched | Generating → Generated | Failed}`
    fn resolve(&mut self, formula: &str, pb: &ProgressBar) -> Result<Resolution> {
        match self.source.lookup(formula) {
            Ok(Lookup::Found(record)) => Ok(Resolution::Fetched(record)),
            Ok(Lookup::NotFound) => {
                pb.suspend(|| {
                    output::print_warning(&format!(
                        "'{}' not in database, generating placeholder",
                        formula
                    ));
                });
                Ok(self.generate(formula))
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                pb.suspend(|| output::print_warning(&e.to_string()));
                Ok(self.generate(formula))
            }
        }
    }

    fn generate(&self, formula: &str) -> Resolution {
        match generator::generate(formula) {
            Ok(record) => Resolution::Generated(record),
            Err(e) => Resolution::Failed(e.to_string()),
        }
    }

    /// `{Fetched, Generated} → Saved | Failed`，写失败不重试
    fn save(&self, formula: &str, resolution: Resolution, pb: &ProgressBar) -> FetchOutcome {
        let record = match resolution {
            Resolution::Fetched(r) | Resolution::Generated(r) => r,
            Resolution::Failed(reason) => {
                pb.suspend(|| output::print_error(&format!("{}: {}", formula, reason)));
                return FetchOutcome {
                    formula: formula.to_string(),
                    status: OutcomeStatus::Failure,
                    source: None,
                    path: None,
                    detail: Some(reason),
                };
            }
        };

        let file_name = format!(
            "{}_{}.{}",
            formula.replace(' ', ""),
            record.provenance.tag(),
            self.options.format.extension()
        );
        let path = self.options.structure_dir.join(file_name);
        let content = match self.options.format {
            OutputFormat::Cif => formats::to_cif_string(&record),
            OutputFormat::Poscar => formats::to_poscar_string(&record),
        };

        match fs::write(&path, content) {
            Ok(()) => FetchOutcome {
                formula: formula.to_string(),
                status: OutcomeStatus::Success,
                source: Some(record.provenance.clone()),
                path: Some(path),
                detail: None,
            },
            Err(e) => {
                let err = MatfetchError::FileWriteError {
                    path: path.display().to_string(),
                    source: e,
                };
                pb.suspend(|| output::print_error(&err.to_string()));
                FetchOutcome {
                    formula: formula.to_string(),
                    status: OutcomeStatus::Failure,
                    source: Some(record.provenance.clone()),
                    path: None,
                    detail: Some(err.to_string()),
                }
            }
        }
    }

    /// 把已成功的化学式列表落盘；检查点写失败只告警，不影响运行
    fn write_checkpoint(&self, outcomes: &[FetchOutcome], pb: &ProgressBar) {
        let saved: Vec<&str> = outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Success)
            .map(|o| o.formula.as_str())
            .collect();

        let path = self.options.structure_dir.join(CHECKPOINT_FILE);
        let result = serde_json::to_string_pretty(&saved)
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(&path, json).map_err(|e| e.to_string()));

        if let Err(reason) = result {
            pb.suspend(|| {
                output::print_warning(&format!(
                    "failed to write checkpoint '{}': {}",
                    path.display(),
                    reason
                ));
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lattice, Site};
    use std::collections::HashMap;

    enum StubMode {
        Map(HashMap<String, StructureRecord>),
        AlwaysError,
        AuthError,
    }

    struct StubSource {
        mode: StubMode,
    }

    impl StubSource {
        fn with_records(records: &[StructureRecord]) -> Self {
            let map = records
                .iter()
                .map(|r| (r.formula.clone(), r.clone()))
                .collect();
            StubSource {
                mode: StubMode::Map(map),
            }
        }
    }

    impl StructureSource for StubSource {
        fn lookup(&mut self, formula: &str) -> Result<Lookup> {
            match &self.mode {
                StubMode::Map(map) => Ok(map
                    .get(formula)
                    .cloned()
                    .map(Lookup::Found)
                    .unwrap_or(Lookup::NotFound)),
                StubMode::AlwaysError => Err(MatfetchError::Request {
                    formula: formula.to_string(),
                    reason: "connection timed out".to_string(),
                }),
                StubMode::AuthError => Err(MatfetchError::AuthRejected { status: 401 }),
            }
        }
    }

    fn fetched_record(formula: &str, material_id: &str) -> StructureRecord {
        StructureRecord::new(
            formula,
            Provenance::Fetched {
                material_id: Some(material_id.to_string()),
            },
            Lattice::cubic(4.0),
            vec![Site::new("Fe", [0.0, 0.0, 0.0])],
        )
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "matfetch_runner_{}_{}",
            tag,
            std::process::id()
        ));
        fs::remove_dir_all(&dir).ok();
        dir
    }

    fn options(dir: &PathBuf) -> RunOptions {
        RunOptions {
            structure_dir: dir.clone(),
            format: OutputFormat::Cif,
            batch_size: 2,
            batch_pause: Duration::ZERO,
            write_checkpoint: false,
        }
    }

    fn formulas(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fetch_with_generation_fallback() {
        let dir = temp_dir("fallback");
        let source = StubSource::with_records(&[fetched_record("BeAlN2", "mp-1")]);
        let mut runner = PipelineRunner::new(source, options(&dir));

        let outcomes = runner.run(&formulas(&["BeAlN2", "XxYyZz9"])).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].status, OutcomeStatus::Success);
        assert!(matches!(
            outcomes[0].source,
            Some(Provenance::Fetched { .. })
        ));
        assert_eq!(outcomes[1].status, OutcomeStatus::Success);
        assert_eq!(outcomes[1].source, Some(Provenance::Generated));

        // 磁盘上恰好两个结构文件，命名带来源标签
        assert!(dir.join("BeAlN2_fetched.cif").exists());
        assert!(dir.join("XxYyZz9_generated.cif").exists());

        let report = crate::pipeline::report::RunReport::from_outcomes(&outcomes, &dir);
        assert!((report.success_rate() - 1.0).abs() < 1e-12);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_one_outcome_per_formula_in_order() {
        let dir = temp_dir("order");
        let source = StubSource::with_records(&[]);
        let mut runner = PipelineRunner::new(source, options(&dir));

        let input = formulas(&["NaCl", "not-a-formula", "TiO2"]);
        let outcomes = runner.run(&input).unwrap();

        assert_eq!(outcomes.len(), input.len());
        for (outcome, formula) in outcomes.iter().zip(&input) {
            assert_eq!(&outcome.formula, formula);
        }
        assert_eq!(outcomes[0].status, OutcomeStatus::Success);
        // 解析失败记为失败但不中断后续处理
        assert_eq!(outcomes[1].status, OutcomeStatus::Failure);
        assert!(outcomes[1].detail.is_some());
        assert_eq!(outcomes[2].status, OutcomeStatus::Success);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_request_errors_fall_back_to_generation() {
        let dir = temp_dir("request_err");
        let source = StubSource {
            mode: StubMode::AlwaysError,
        };
        let mut runner = PipelineRunner::new(source, options(&dir));

        let outcomes = runner.run(&formulas(&["NaCl", "KBr"])).unwrap();

        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            assert_eq!(outcome.status, OutcomeStatus::Success);
            assert_eq!(outcome.source, Some(Provenance::Generated));
        }

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_auth_error_aborts_before_any_file() {
        let dir = temp_dir("auth");
        let source = StubSource {
            mode: StubMode::AuthError,
        };
        let mut runner = PipelineRunner::new(source, options(&dir));

        let err = runner.run(&formulas(&["NaCl", "KBr"])).unwrap_err();
        assert!(err.is_fatal());

        // 没有结构文件写出
        let entries: Vec<_> = fs::read_dir(&dir)
            .map(|rd| rd.filter_map(|e| e.ok()).collect())
            .unwrap_or_default();
        assert!(entries.is_empty());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_checkpoint_lists_saved_formulas() {
        let dir = temp_dir("checkpoint");
        let source = StubSource::with_records(&[]);
        let mut opts = options(&dir);
        opts.write_checkpoint = true;
        opts.batch_size = 1;
        let mut runner = PipelineRunner::new(source, opts);

        runner.run(&formulas(&["NaCl", "TiO2"])).unwrap();

        let content = fs::read_to_string(dir.join(CHECKPOINT_FILE)).unwrap();
        let saved: Vec<String> = serde_json::from_str(&content).unwrap();
        assert_eq!(saved, vec!["NaCl", "TiO2"]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_failure_recorded_not_raised() {
        let dir = temp_dir("write_fail");
        fs::create_dir_all(&dir).unwrap();
        // 预先占位一个同名目录，令 fs::write 失败
        fs::create_dir_all(dir.join("NaCl_generated.cif")).unwrap();

        let source = StubSource::with_records(&[]);
        let mut runner = PipelineRunner::new(source, options(&dir));

        let outcomes = runner.run(&formulas(&["NaCl", "TiO2"])).unwrap();

        assert_eq!(outcomes[0].status, OutcomeStatus::Failure);
        assert!(outcomes[0].detail.as_deref().unwrap().contains("NaCl_generated.cif"));
        // 后续化学式不受影响
        assert_eq!(outcomes[1].status, OutcomeStatus::Success);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_poscar_format_extension() {
        let dir = temp_dir("poscar");
        let source = StubSource::with_records(&[]);
        let mut opts = options(&dir);
        opts.format = OutputFormat::Poscar;
        let mut runner = PipelineRunner::new(source, opts);

        let outcomes = runner.run(&formulas(&["NaCl"])).unwrap();

        assert_eq!(outcomes[0].status, OutcomeStatus::Success);
        assert!(dir.join("NaCl_generated.vasp").exists());

        fs::remove_dir_all(&dir).ok();
    }
}
