//! # 晶体结构数据模型
//!
//! 定义统一的晶体结构记录：晶格 + 原子位点 + 来源标记。
//! 记录一经创建不再修改，序列化写盘后即丢弃。
//!
//! ## 依赖关系
//! - 被 `api/`, `generator/`, `formats/`, `pipeline/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格参数 (a, b, c, alpha, beta, gamma) 创建晶格
    /// 角度单位：度
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let alpha_rad = alpha.to_radians();
        let beta_rad = beta.to_radians();
        let gamma_rad = gamma.to_radians();

        // 计算晶格向量
        let cos_alpha = alpha_rad.cos();
        let cos_beta = beta_rad.cos();
        let cos_gamma = gamma_rad.cos();
        let sin_gamma = gamma_rad.sin();

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (c * c - c1 * c1 - c2 * c2).sqrt();
        let c_vec = [c1, c2, c3];

        Lattice {
            matrix: [a_vec, b_vec, c_vec],
        }
    }

    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 立方晶格
    pub fn cubic(a: f64) -> Self {
        Lattice::from_parameters(a, a, a, 90.0, 90.0, 90.0)
    }

    /// 六方晶格 (gamma = 120°)
    pub fn hexagonal(a: f64, c: f64) -> Self {
        Lattice::from_parameters(a, a, c, 90.0, 90.0, 120.0)
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let a_vec = self.matrix[0];
        let b_vec = self.matrix[1];
        let c_vec = self.matrix[2];

        let a = (a_vec[0].powi(2) + a_vec[1].powi(2) + a_vec[2].powi(2)).sqrt();
        let b = (b_vec[0].powi(2) + b_vec[1].powi(2) + b_vec[2].powi(2)).sqrt();
        let c = (c_vec[0].powi(2) + c_vec[1].powi(2) + c_vec[2].powi(2)).sqrt();

        let dot_bc: f64 = b_vec.iter().zip(c_vec.iter()).map(|(x, y)| x * y).sum();
        let dot_ac: f64 = a_vec.iter().zip(c_vec.iter()).map(|(x, y)| x * y).sum();
        let dot_ab: f64 = a_vec.iter().zip(b_vec.iter()).map(|(x, y)| x * y).sum();

        let alpha = (dot_bc / (b * c)).acos().to_degrees();
        let beta = (dot_ac / (a * c)).acos().to_degrees();
        let gamma = (dot_ab / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积
    pub fn volume(&self) -> f64 {
        let a = self.matrix[0];
        let b = self.matrix[1];
        let c = self.matrix[2];

        // 行列式计算
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }
}

/// 原子位点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],
}

impl Site {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Site {
            element: element.into(),
            position,
        }
    }
}

/// 结构记录来源
///
/// `Fetched` 与 `Generated` 的结构在下游绝不能混为一谈：前者是数据库中
/// 实测收录的结构，后者只是启发式合成的占位结构。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// 从远程数据库取得，附带数据库编号
    Fetched { material_id: Option<String> },
    /// 本地启发式生成
    Generated,
}

impl Provenance {
    /// 来源标签，用于文件命名和报告
    pub fn tag(&self) -> &'static str {
        match self {
            Provenance::Fetched { .. } => "fetched",
            Provenance::Generated => "generated",
        }
    }
}

/// 晶体结构记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureRecord {
    /// 目标化学式（输入原文）
    pub formula: String,

    /// 来源标记
    pub provenance: Provenance,

    /// 晶格
    pub lattice: Lattice,

    /// 原子位点列表
    pub sites: Vec<Site>,
}

impl StructureRecord {
    pub fn new(
        formula: impl Into<String>,
        provenance: Provenance,
        lattice: Lattice,
        sites: Vec<Site>,
    ) -> Self {
        StructureRecord {
            formula: formula.into(),
            provenance,
            lattice,
            sites,
        }
    }

    /// 由位点列表计算化学式（元素按字母序）
    pub fn site_formula(&self) -> String {
        use std::collections::BTreeMap;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for site in &self.sites {
            *counts.entry(site.element.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// 数据库编号（仅 fetched 记录有）
    pub fn material_id(&self) -> Option<&str> {
        match &self.provenance {
            Provenance::Fetched { material_id } => material_id.as_deref(),
            Provenance::Generated => None,
        }
    }

    /// 结构内部一致性检查：晶格非退化、位点非空、分数坐标落在 [0, 1)
    pub fn is_consistent(&self) -> bool {
        if self.sites.is_empty() {
            return false;
        }
        if self.lattice.volume().abs() < 1e-6 {
            return false;
        }
        self.sites.iter().all(|s| {
            s.position
                .iter()
                .all(|&x| x.is_finite() && (0.0..1.0).contains(&x))
        })
    }
}
