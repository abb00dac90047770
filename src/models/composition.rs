//! # 化学式解析
//!
//! 将化学式字符串（如 `BeAlN2`）解析为元素/计数多重集。
//!
//! ## 规则
//! - 元素符号形如 `[A-Z][a-z]?`，后接可选的正整数计数（缺省为 1）
//! - 同一元素出现多次时计数合并
//! - 原子总数上限 10000，超出按解析错误处理
//! - 符号只要求句法合法，不要求真实存在于周期表
//!   （下游按需提供默认元素属性）
//!
//! ## 依赖关系
//! - 被 `generator/` 使用
//! - 使用 `regex` 做分词

use crate::error::{MatfetchError, Result};
use regex::Regex;
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][a-z]?)(\d*)").expect("valid regex"));

/// 单个晶胞可容纳的原子数上限
const MAX_ATOMS: u64 = 10_000;

/// 已解析的化学组成
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// 原始化学式
    pub formula: String,
    /// (元素, 计数)，按首次出现顺序
    entries: Vec<(String, u32)>,
}

impl Composition {
    /// 解析化学式字符串
    pub fn parse(formula: &str) -> Result<Composition> {
        let fail = |reason: String| MatfetchError::FormulaParse {
            formula: formula.to_string(),
            reason,
        };

        let trimmed = formula.trim();
        if trimmed.is_empty() {
            return Err(fail("empty formula".to_string()));
        }

        let mut entries: Vec<(String, u32)> = Vec::new();
        let mut cursor = 0;

        for cap in TOKEN_RE.captures_iter(trimmed) {
            let whole = cap.get(0).expect("match");
            // 相邻 token 之间不允许有未识别字符
            if whole.start() != cursor {
                return Err(fail(format!(
                    "unexpected character at position {}: '{}'",
                    cursor,
                    &trimmed[cursor..whole.start()]
                )));
            }
            cursor = whole.end();

            let element = cap[1].to_string();
            let count: u32 = if cap[2].is_empty() {
                1
            } else {
                cap[2]
                    .parse()
                    .map_err(|_| fail(format!("invalid count for element {}", element)))?
            };

            if count == 0 {
                return Err(fail(format!("zero count for element {}", element)));
            }

            match entries.iter_mut().find(|(el, _)| *el == element) {
                Some((_, c)) => {
                    *c = c.checked_add(count).ok_or_else(|| {
                        fail(format!("count overflow for element {}", element))
                    })?;
                }
                None => entries.push((element, count)),
            }
        }

        if cursor != trimmed.len() {
            return Err(fail(format!(
                "trailing characters: '{}'",
                &trimmed[cursor..]
            )));
        }

        if entries.is_empty() {
            return Err(fail("no element tokens".to_string()));
        }

        let total: u64 = entries.iter().map(|(_, c)| u64::from(*c)).sum();
        if total > MAX_ATOMS {
            return Err(fail(format!(
                "atom count {} exceeds supported maximum {}",
                total, MAX_ATOMS
            )));
        }

        Ok(Composition {
            formula: trimmed.to_string(),
            entries,
        })
    }

    /// (元素, 计数) 列表，按首次出现顺序
    pub fn entries(&self) -> &[(String, u32)] {
        &self.entries
    }

    /// 约化组成：各计数除以最大公约数，化学式保持原文
    pub fn reduced(&self) -> Composition {
        let g = self.entries.iter().map(|(_, c)| *c).fold(0, gcd).max(1);
        Composition {
            formula: self.formula.clone(),
            entries: self
                .entries
                .iter()
                .map(|(el, c)| (el.clone(), c / g))
                .collect(),
        }
    }
}

/// 最大公约数
fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
