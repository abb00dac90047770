//! # CIF 格式输出
//!
//! 将结构记录序列化为 Crystallographic Information File 文本。
//! 对称性一律按 P1 写出（位点已是完整晶胞展开）。
//!
//! 文件头以 `#` 注释记录来源：fetched 记录附数据库编号，
//! generated 记录明确标注为合成结构，避免下游误用。
//!
//! ## 依赖关系
//! - 被 `pipeline/runner.rs` 和 `commands/` 使用
//! - 使用 `models/structure.rs`

use crate::models::{Provenance, StructureRecord};

/// 将结构记录转换为 CIF 格式字符串
pub fn to_cif_string(record: &StructureRecord) -> String {
    let (a, b, c, alpha, beta, gamma) = record.lattice.parameters();

    let mut result = String::new();

    // 来源注释
    match &record.provenance {
        Provenance::Fetched { material_id } => {
            result.push_str("# Source: Materials Project\n");
            if let Some(id) = material_id {
                result.push_str(&format!("# Materials Project ID: {}\n", id));
            }
        }
        Provenance::Generated => {
            result.push_str("# Source: generated (heuristic prototype, not an observed structure)\n");
        }
    }

    result.push_str(&format!("data_{}\n", record.formula.replace(' ', "_")));
    result.push_str("_symmetry_space_group_name_H-M    'P 1'\n");
    result.push_str("_symmetry_Int_Tables_number       1\n");
    result.push_str(&format!(
        "_chemical_formula_sum             '{}'\n\n",
        record.site_formula()
    ));

    result.push_str(&format!("_cell_length_a    {:.6}\n", a));
    result.push_str(&format!("_cell_length_b    {:.6}\n", b));
    result.push_str(&format!("_cell_length_c    {:.6}\n", c));
    result.push_str(&format!("_cell_angle_alpha {:.4}\n", alpha));
    result.push_str(&format!("_cell_angle_beta  {:.4}\n", beta));
    result.push_str(&format!("_cell_angle_gamma {:.4}\n\n", gamma));

    result.push_str("loop_\n");
    result.push_str("_atom_site_label\n");
    result.push_str("_atom_site_type_symbol\n");
    result.push_str("_atom_site_fract_x\n");
    result.push_str("_atom_site_fract_y\n");
    result.push_str("_atom_site_fract_z\n");
    result.push_str("_atom_site_occupancy\n");

    for (i, site) in record.sites.iter().enumerate() {
        result.push_str(&format!(
            "{}{} {} {:.10} {:.10} {:.10} 1.0\n",
            site.element,
            i + 1,
            site.element,
            site.position[0],
            site.position[1],
            site.position[2]
        ));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lattice, Provenance, Site, StructureRecord};

    fn sample_record(provenance: Provenance) -> StructureRecord {
        StructureRecord::new(
            "NaCl",
            provenance,
            Lattice::cubic(5.64),
            vec![
                Site::new("Na", [0.0, 0.0, 0.0]),
                Site::new("Cl", [0.5, 0.5, 0.5]),
            ],
        )
    }

    #[test]
    fn test_cif_contains_cell_and_sites() {
        let cif = to_cif_string(&sample_record(Provenance::Generated));

        assert!(cif.contains("data_NaCl"));
        assert!(cif.contains("_cell_length_a    5.640000"));
        assert!(cif.contains("_cell_angle_gamma 90.0000"));
        assert!(cif.contains("_chemical_formula_sum             'ClNa'"));
        assert!(cif.contains("Na1 Na 0.0000000000 0.0000000000 0.0000000000 1.0"));
        assert!(cif.contains("Cl2 Cl 0.5000000000 0.5000000000 0.5000000000 1.0"));
    }

    #[test]
    fn test_cif_provenance_header() {
        let generated = to_cif_string(&sample_record(Provenance::Generated));
        assert!(generated.starts_with("# Source: generated"));

        let fetched = to_cif_string(&sample_record(Provenance::Fetched {
            material_id: Some("mp-22862".to_string()),
        }));
        assert!(fetched.contains("# Source: Materials Project"));
        assert!(fetched.contains("# Materials Project ID: mp-22862"));
    }

    #[test]
    fn test_cif_deterministic() {
        let record = sample_record(Provenance::Generated);
        assert_eq!(to_cif_string(&record), to_cif_string(&record));
    }
}
