//! # 结构生成器
//!
//! 当远程数据库没有匹配记录时，为化学式确定性地合成一个占位晶体结构。
//!
//! ## 原型阶梯
//! 1. 三元 1:1:2  → 六方 ABX₂ 晶胞（4 位点）
//! 2. 二元 1:1    → 岩盐结构（8 位点）
//! 3. 二元 1:2    → 萤石结构（12 位点）
//! 4. 二元 1:3    → 立方 AB₃（L1₂ 型，4 位点）
//! 5. 其余组成    → 立方堆积晶胞：约化化学式的原子摆到 k³ 子格点上
//!
//! 晶格常数由元素原子半径估算；阳离子位点按电负性升序分配
//! （电负性最低的元素占 A 位）。整个过程无随机性，同一化学式
//! 两次生成得到逐位相同的结果。
//!
//! ## 依赖关系
//! - 被 `pipeline/` 和 `commands/generate.rs` 调用
//! - 使用 `models/composition.rs` 解析化学式
//! - 子模块 `elements` 提供元素属性

pub mod elements;

use crate::error::Result;
use crate::models::{Composition, Lattice, Provenance, Site, StructureRecord};

/// 晶格常数下限 (Å)，避免未知元素的占位半径产生退化晶胞
const MIN_LATTICE: f64 = 2.5;

/// 约化组成匹配到的原型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prototype {
    /// 三元 1:1:2
    TernaryAbx2,
    /// 二元 1:1
    RockSalt,
    /// 二元 1:2
    Fluorite,
    /// 二元 1:3
    CubicAb3,
    /// 无匹配原型
    Packed,
}

/// 为化学式生成占位结构
///
/// 只在化学式本身无法解析时返回错误；任何可解析的组成都能生成
/// 一个内部一致的结构（未知元素符号使用默认属性）。
pub fn generate(formula: &str) -> Result<StructureRecord> {
    let comp = Composition::parse(formula)?;
    let reduced = comp.reduced();
    let entries = reduced.entries();

    let record = match classify(entries) {
        Prototype::TernaryAbx2 => ternary_abx2(formula, entries),
        Prototype::RockSalt => rock_salt(formula, entries),
        Prototype::Fluorite => fluorite(formula, entries),
        Prototype::CubicAb3 => cubic_ab3(formula, entries),
        Prototype::Packed => packed_cell(formula, entries),
    };

    debug_assert!(record.is_consistent());
    Ok(record)
}

/// 按约化计数选择原型
///
/// 对应原型的化学计量比 {1, 1/2, 2, 1/3, 3} 之外的组成一律走堆积晶胞。
fn classify(reduced: &[(String, u32)]) -> Prototype {
    let mut counts: Vec<u32> = reduced.iter().map(|(_, c)| *c).collect();
    counts.sort_unstable();

    match (reduced.len(), counts.as_slice()) {
        (3, [1, 1, 2]) => Prototype::TernaryAbx2,
        (2, [1, 1]) => Prototype::RockSalt,
        (2, [1, 2]) => Prototype::Fluorite,
        (2, [1, 3]) => Prototype::CubicAb3,
        _ => Prototype::Packed,
    }
}

/// 六方 ABX₂ 晶胞
///
/// A(0,0,0)、B(1/3,2/3,1/2)、X(2/3,1/3,1/4)、X(2/3,1/3,3/4)。
/// 计数为 1 的两个元素占 A/B 位（电负性低者为 A），计数为 2 的占 X 位。
fn ternary_abx2(formula: &str, reduced: &[(String, u32)]) -> StructureRecord {
    let mut cations: Vec<&str> = reduced
        .iter()
        .filter(|(_, c)| *c == 1)
        .map(|(el, _)| el.as_str())
        .collect();
    sort_by_electronegativity(&mut cations);
    let x = reduced
        .iter()
        .find(|(_, c)| *c == 2)
        .map(|(el, _)| el.as_str())
        .expect("classify guarantees a count-2 element");

    let (a_el, b_el) = (cations[0], cations[1]);
    let r_a = elements::lookup(a_el).radius;
    let r_x = elements::lookup(x).radius;

    // A-X 最近邻距离 ≈ 0.712 a（取 c/a = 5/3 时），反解 a
    let a = (1.4 * (r_a + r_x)).max(MIN_LATTICE);
    let c = a * 5.0 / 3.0;

    let sites = vec![
        Site::new(a_el, [0.0, 0.0, 0.0]),
        Site::new(b_el, [1.0 / 3.0, 2.0 / 3.0, 0.5]),
        Site::new(x, [2.0 / 3.0, 1.0 / 3.0, 0.25]),
        Site::new(x, [2.0 / 3.0, 1.0 / 3.0, 0.75]),
    ];

    StructureRecord::new(
        formula,
        Provenance::Generated,
        Lattice::hexagonal(a, c),
        sites,
    )
}

/// 岩盐结构：阳离子占 fcc 格点，阴离子占棱心/体心
fn rock_salt(formula: &str, reduced: &[(String, u32)]) -> StructureRecord {
    let mut els: Vec<&str> = reduced.iter().map(|(el, _)| el.as_str()).collect();
    sort_by_electronegativity(&mut els);
    let (cation, anion) = (els[0], els[1]);

    let r_sum = elements::lookup(cation).radius + elements::lookup(anion).radius;
    // 最近邻沿棱方向，间距 a/2
    let a = (2.0 * r_sum).max(MIN_LATTICE);

    let mut sites = Vec::with_capacity(8);
    for pos in [
        [0.0, 0.0, 0.0],
        [0.5, 0.5, 0.0],
        [0.5, 0.0, 0.5],
        [0.0, 0.5, 0.5],
    ] {
        sites.push(Site::new(cation, pos));
    }
    for pos in [
        [0.5, 0.0, 0.0],
        [0.0, 0.5, 0.0],
        [0.0, 0.0, 0.5],
        [0.5, 0.5, 0.5],
    ] {
        sites.push(Site::new(anion, pos));
    }

    StructureRecord::new(formula, Provenance::Generated, Lattice::cubic(a), sites)
}

/// 萤石结构：计数 1 的元素占 fcc 格点，计数 2 的占八个四面体空隙
fn fluorite(formula: &str, reduced: &[(String, u32)]) -> StructureRecord {
    let a_el = reduced
        .iter()
        .find(|(_, c)| *c == 1)
        .map(|(el, _)| el.as_str())
        .expect("classify guarantees a count-1 element");
    let b_el = reduced
        .iter()
        .find(|(_, c)| *c == 2)
        .map(|(el, _)| el.as_str())
        .expect("classify guarantees a count-2 element");

    let r_sum = elements::lookup(a_el).radius + elements::lookup(b_el).radius;
    // 最近邻沿体对角线 1/4 处，间距 √3 a / 4
    let a = (4.0 * r_sum / 3f64.sqrt()).max(MIN_LATTICE);

    let mut sites = Vec::with_capacity(12);
    for pos in [
        [0.0, 0.0, 0.0],
        [0.5, 0.5, 0.0],
        [0.5, 0.0, 0.5],
        [0.0, 0.5, 0.5],
    ] {
        sites.push(Site::new(a_el, pos));
    }
    for i in 0..8u32 {
        let pick = |bit: u32| if bit == 0 { 0.25 } else { 0.75 };
        sites.push(Site::new(
            b_el,
            [pick(i & 1), pick((i >> 1) & 1), pick((i >> 2) & 1)],
        ));
    }

    StructureRecord::new(formula, Provenance::Generated, Lattice::cubic(a), sites)
}

/// 立方 AB₃（L1₂ 型）：少数元素占角点，多数元素占面心
fn cubic_ab3(formula: &str, reduced: &[(String, u32)]) -> StructureRecord {
    let a_el = reduced
        .iter()
        .find(|(_, c)| *c == 1)
        .map(|(el, _)| el.as_str())
        .expect("classify guarantees a count-1 element");
    let b_el = reduced
        .iter()
        .find(|(_, c)| *c == 3)
        .map(|(el, _)| el.as_str())
        .expect("classify guarantees a count-3 element");

    let r_sum = elements::lookup(a_el).radius + elements::lookup(b_el).radius;
    // 最近邻为角点-面心，间距 a/√2
    let a = (2f64.sqrt() * r_sum).max(MIN_LATTICE);

    let sites = vec![
        Site::new(a_el, [0.0, 0.0, 0.0]),
        Site::new(b_el, [0.5, 0.5, 0.0]),
        Site::new(b_el, [0.5, 0.0, 0.5]),
        Site::new(b_el, [0.0, 0.5, 0.5]),
    ];

    StructureRecord::new(formula, Provenance::Generated, Lattice::cubic(a), sites)
}

/// 堆积晶胞：约化化学式的全部原子按出现顺序摆上 k³ 子格点
///
/// k = ⌈∛N⌉，晶胞边长按平均半径放缩，任何组成都能成胞。
fn packed_cell(formula: &str, reduced: &[(String, u32)]) -> StructureRecord {
    let total: u32 = reduced.iter().map(|(_, c)| c).sum();
    let k = (total as f64).cbrt().ceil() as u32;
    let k = k.max(1);

    let mean_radius = reduced
        .iter()
        .map(|(el, c)| elements::lookup(el).radius * f64::from(*c))
        .sum::<f64>()
        / f64::from(total);
    let a = (f64::from(k) * 2.0 * mean_radius).max(MIN_LATTICE);

    let mut sites = Vec::with_capacity(total as usize);
    let mut slot = 0u32;
    for (el, count) in reduced {
        for _ in 0..*count {
            let i = slot % k;
            let j = (slot / k) % k;
            let l = slot / (k * k);
            let frac = |n: u32| (f64::from(n) + 0.5) / f64::from(k);
            sites.push(Site::new(el.as_str(), [frac(i), frac(j), frac(l)]));
            slot += 1;
        }
    }

    StructureRecord::new(formula, Provenance::Generated, Lattice::cubic(a), sites)
}

/// 电负性升序排序（无标度值时取中段默认值）
///
/// 电负性相同时依次按化合价、原子序数决出次序，仍相同则保持
/// 原顺序，保证同一化学式两次生成的位点分配一致。
fn sort_by_electronegativity(els: &mut [&str]) {
    els.sort_by(|a, b| {
        let da = elements::lookup(a);
        let db = elements::lookup(b);
        (da.en_or_default(), da.valence, da.atomic_number)
            .partial_cmp(&(db.en_or_default(), db.valence, db.atomic_number))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
