//! # VASP POSCAR 格式输出
//!
//! 将结构记录序列化为 POSCAR 文本（VASP 5+ 带元素符号行）。
//! 位点按元素分组写出，组顺序为元素首次出现的顺序。
//!
//! ## 依赖关系
//! - 被 `pipeline/runner.rs` 和 `commands/` 使用
//! - 使用 `models/structure.rs`

use crate::models::StructureRecord;

/// 将结构记录转换为 POSCAR 格式字符串
pub fn to_poscar_string(record: &StructureRecord) -> String {
    use std::collections::BTreeMap;

    // 按元素分组统计，保留首次出现顺序
    let mut elem_order: Vec<String> = Vec::new();
    let mut elem_sites: BTreeMap<String, Vec<[f64; 3]>> = BTreeMap::new();

    for site in &record.sites {
        if !elem_order.contains(&site.element) {
            elem_order.push(site.element.clone());
        }
        elem_sites
            .entry(site.element.clone())
            .or_default()
            .push(site.position);
    }

    let mut result = String::new();

    // Line 0: Comment（化学式 + 来源标签）
    result.push_str(&format!("{} ({})\n", record.formula, record.provenance.tag()));

    // Line 1: Scale
    result.push_str("1.0\n");

    // Lines 2-4: Lattice
    for row in &record.lattice.matrix {
        result.push_str(&format!(
            "  {:16.10}  {:16.10}  {:16.10}\n",
            row[0], row[1], row[2]
        ));
    }

    // Line 5: Elements
    result.push_str(&format!("   {}\n", elem_order.join("   ")));

    // Line 6: Counts
    let counts: Vec<String> = elem_order
        .iter()
        .map(|e| elem_sites.get(e).map(|v| v.len()).unwrap_or(0).to_string())
        .collect();
    result.push_str(&format!("   {}\n", counts.join("   ")));

    // Coordinate type
    result.push_str("Direct\n");

    // Site positions
    for elem in &elem_order {
        if let Some(positions) = elem_sites.get(elem) {
            for pos in positions {
                result.push_str(&format!(
                    "  {:16.10}  {:16.10}  {:16.10}\n",
                    pos[0], pos[1], pos[2]
                ));
            }
        }
    }

    result
}
