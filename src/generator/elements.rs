//! # 元素属性数据库
//!
//! 提供结构生成所需的元素启发式属性：原子半径、Pauling 电负性、典型化合价。
//!
//! ## 数据来源
//! CRC Handbook of Chemistry and Physics（经验原子半径，Å）
//! 与 Pauling 电负性标度。数值只用于启发式晶格估计，不要求高精度。
//!
//! ## 依赖关系
//! - 被 `generator/mod.rs` 调用
//! - 纯静态数据，无外部依赖
//!
//! 未收录的符号（句法合法即可）返回 [`ElementData::default_unknown`]，
//! 保证任何可解析的化学式都能完成生成。

use std::collections::HashMap;
use std::sync::LazyLock;

/// 单个元素的启发式属性
#[derive(Debug, Clone, Copy)]
pub struct ElementData {
    /// 原子序数（未知符号为 0）
    pub atomic_number: u8,
    /// 经验原子半径 (Å)
    pub radius: f64,
    /// Pauling 电负性（稀有气体等无标度值时为 None）
    pub electronegativity: Option<f64>,
    /// 典型化合价
    pub valence: u8,
}

impl ElementData {
    /// 未知符号的占位属性
    pub fn default_unknown() -> Self {
        ElementData {
            atomic_number: 0,
            radius: 1.5,
            electronegativity: None,
            valence: 2,
        }
    }

    /// 电负性，未定义时取标度中段值
    pub fn en_or_default(&self) -> f64 {
        self.electronegativity.unwrap_or(1.75)
    }
}

/// (符号, 原子序数, 半径 Å, 电负性, 化合价)
#[rustfmt::skip]
const ELEMENT_TABLE: &[(&str, u8, f64, f64, u8)] = &[
    // 第一、二周期
    ("H",   1, 0.53, 2.20, 1), ("He",  2, 0.31, 0.00, 0),
    ("Li",  3, 1.67, 0.98, 1), ("Be",  4, 1.12, 1.57, 2),
    ("B",   5, 0.87, 2.04, 3), ("C",   6, 0.67, 2.55, 4),
    ("N",   7, 0.56, 3.04, 3), ("O",   8, 0.48, 3.44, 2),
    ("F",   9, 0.42, 3.98, 1), ("Ne", 10, 0.38, 0.00, 0),
    // 第三周期
    ("Na", 11, 1.90, 0.93, 1), ("Mg", 12, 1.45, 1.31, 2),
    ("Al", 13, 1.18, 1.61, 3), ("Si", 14, 1.11, 1.90, 4),
    ("P",  15, 0.98, 2.19, 5), ("S",  16, 0.88, 2.58, 6),
    ("Cl", 17, 0.79, 3.16, 1), ("Ar", 18, 0.71, 0.00, 0),
    // 第四周期
    ("K",  19, 2.43, 0.82, 1), ("Ca", 20, 1.94, 1.00, 2),
    ("Sc", 21, 1.84, 1.36, 3), ("Ti", 22, 1.76, 1.54, 4),
    ("V",  23, 1.71, 1.63, 5), ("Cr", 24, 1.66, 1.66, 3),
    ("Mn", 25, 1.61, 1.55, 2), ("Fe", 26, 1.56, 1.83, 3),
    ("Co", 27, 1.52, 1.88, 2), ("Ni", 28, 1.49, 1.91, 2),
    ("Cu", 29, 1.45, 1.90, 2), ("Zn", 30, 1.42, 1.65, 2),
    ("Ga", 31, 1.36, 1.81, 3), ("Ge", 32, 1.25, 2.01, 4),
    ("As", 33, 1.14, 2.18, 3), ("Se", 34, 1.03, 2.55, 2),
    ("Br", 35, 0.94, 2.96, 1), ("Kr", 36, 0.88, 3.00, 0),
    // 第五周期
    ("Rb", 37, 2.65, 0.82, 1), ("Sr", 38, 2.19, 0.95, 2),
    ("Y",  39, 2.12, 1.22, 3), ("Zr", 40, 2.06, 1.33, 4),
    ("Nb", 41, 1.98, 1.60, 5), ("Mo", 42, 1.90, 2.16, 6),
    ("Tc", 43, 1.83, 1.90, 7), ("Ru", 44, 1.78, 2.20, 3),
    ("Rh", 45, 1.73, 2.28, 3), ("Pd", 46, 1.69, 2.20, 2),
    ("Ag", 47, 1.65, 1.93, 1), ("Cd", 48, 1.61, 1.69, 2),
    ("In", 49, 1.56, 1.78, 3), ("Sn", 50, 1.45, 1.96, 4),
    ("Sb", 51, 1.33, 2.05, 3), ("Te", 52, 1.23, 2.10, 2),
    ("I",  53, 1.15, 2.66, 1), ("Xe", 54, 1.08, 2.60, 0),
    // 第六周期（含镧系）
    ("Cs", 55, 2.98, 0.79, 1), ("Ba", 56, 2.53, 0.89, 2),
    ("La", 57, 2.26, 1.10, 3), ("Ce", 58, 2.10, 1.12, 3),
    ("Pr", 59, 2.47, 1.13, 3), ("Nd", 60, 2.06, 1.14, 3),
    ("Sm", 62, 2.38, 1.17, 3), ("Eu", 63, 2.31, 1.20, 2),
    ("Gd", 64, 2.33, 1.20, 3), ("Tb", 65, 2.25, 1.10, 3),
    ("Dy", 66, 2.28, 1.22, 3), ("Ho", 67, 2.26, 1.23, 3),
    ("Er", 68, 2.26, 1.24, 3), ("Tm", 69, 2.22, 1.25, 3),
    ("Yb", 70, 2.22, 1.10, 2), ("Lu", 71, 2.17, 1.27, 3),
    ("Hf", 72, 2.08, 1.30, 4), ("Ta", 73, 2.00, 1.50, 5),
    ("W",  74, 1.93, 2.36, 6), ("Re", 75, 1.88, 1.90, 7),
    ("Os", 76, 1.85, 2.20, 4), ("Ir", 77, 1.80, 2.20, 4),
    ("Pt", 78, 1.77, 2.28, 2), ("Au", 79, 1.74, 2.54, 3),
    ("Hg", 80, 1.71, 2.00, 2), ("Tl", 81, 1.56, 1.62, 1),
    ("Pb", 82, 1.54, 2.33, 2), ("Bi", 83, 1.43, 2.02, 3),
];

/// 元素属性数据库
pub static ELEMENT_DATA: LazyLock<HashMap<&'static str, ElementData>> = LazyLock::new(|| {
    let mut m = HashMap::with_capacity(ELEMENT_TABLE.len());
    for &(symbol, z, radius, en, valence) in ELEMENT_TABLE {
        m.insert(
            symbol,
            ElementData {
                atomic_number: z,
                radius,
                // 表中 0.0 表示无 Pauling 标度值
                electronegativity: if en > 0.0 { Some(en) } else { None },
                valence,
            },
        );
    }
    m
});

/// 查询元素属性，未知符号返回占位属性
pub fn lookup(symbol: &str) -> ElementData {
    ELEMENT_DATA
        .get(symbol)
        .copied()
        .unwrap_or_else(ElementData::default_unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_element() {
        let fe = lookup("Fe");
        assert_eq!(fe.atomic_number, 26);
        assert!((fe.radius - 1.56).abs() < 1e-9);
        assert_eq!(fe.electronegativity, Some(1.83));
    }

    #[test]
    fn test_lookup_unknown_symbol_falls_back() {
        let xx = lookup("Xx");
        assert_eq!(xx.atomic_number, 0);
        assert!(xx.radius > 0.0);
    }

    #[test]
    fn test_noble_gas_has_no_electronegativity() {
        let ne = lookup("Ne");
        assert_eq!(ne.electronegativity, None);
        assert!((ne.en_or_default() - 1.75).abs() < 1e-9);
    }

    #[test]
    fn test_table_has_no_duplicate_symbols() {
        assert_eq!(ELEMENT_DATA.len(), ELEMENT_TABLE.len());
    }
}
