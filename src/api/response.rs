//! # Materials Project API 响应模型
//!
//! summary 端点返回 pymatgen 风格的结构 JSON：
//! ```text
//! {
//!   "data": [
//!     {
//!       "material_id": "mp-2624",
//!       "structure": {
//!         "lattice": { "matrix": [[...], [...], [...]] },
//!         "sites": [
//!           { "species": [{"element": "Al", "occu": 1.0}], "abc": [0, 0, 0] }
//!         ]
//!       }
//!     }
//!   ]
//! }
//! ```
//! 未列出的字段一律忽略。
//!
//! ## 依赖关系
//! - 被 `api/client.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{MatfetchError, Result};
use crate::models::{Lattice, Provenance, Site, StructureRecord};
use serde::Deserialize;

/// summary 端点响应体
#[derive(Debug, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub data: Vec<SummaryDoc>,
}

/// 单条查询结果
#[derive(Debug, Deserialize)]
pub struct SummaryDoc {
    pub material_id: Option<String>,
    pub structure: Option<ApiStructure>,
}

#[derive(Debug, Deserialize)]
pub struct ApiStructure {
    pub lattice: ApiLattice,
    pub sites: Vec<ApiSite>,
}

#[derive(Debug, Deserialize)]
pub struct ApiLattice {
    pub matrix: [[f64; 3]; 3],
}

#[derive(Debug, Deserialize)]
pub struct ApiSite {
    pub species: Vec<ApiSpecies>,
    /// 分数坐标
    pub abc: [f64; 3],
}

#[derive(Debug, Deserialize)]
pub struct ApiSpecies {
    pub element: String,
    #[serde(default = "default_occupancy")]
    pub occu: f64,
}

fn default_occupancy() -> f64 {
    1.0
}

impl SummaryDoc {
    /// 转换为结构记录；每个位点取占据度最高的物种
    pub fn into_record(self, formula: &str) -> Result<StructureRecord> {
        let structure = self.structure.ok_or_else(|| MatfetchError::Request {
            formula: formula.to_string(),
            reason: "response document has no structure field".to_string(),
        })?;

        if structure.sites.is_empty() {
            return Err(MatfetchError::Request {
                formula: formula.to_string(),
                reason: "response structure has no sites".to_string(),
            });
        }

        let mut sites = Vec::with_capacity(structure.sites.len());
        for api_site in structure.sites {
            let dominant = api_site
                .species
                .into_iter()
                .max_by(|a, b| {
                    a.occu
                        .partial_cmp(&b.occu)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .ok_or_else(|| MatfetchError::Request {
                    formula: formula.to_string(),
                    reason: "site has no species".to_string(),
                })?;
            sites.push(Site::new(dominant.element, api_site.abc));
        }

        Ok(StructureRecord::new(
            formula,
            Provenance::Fetched {
                material_id: self.material_id,
            },
            Lattice::from_vectors(structure.lattice.matrix),
            sites,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "data": [
            {
                "material_id": "mp-2624",
                "structure": {
                    "lattice": {
                        "matrix": [[4.04, 0.0, 0.0], [0.0, 4.04, 0.0], [0.0, 0.0, 4.04]],
                        "a": 4.04
                    },
                    "sites": [
                        {
                            "species": [{"element": "Al", "occu": 1.0}],
                            "abc": [0.0, 0.0, 0.0],
                            "label": "Al"
                        },
                        {
                            "species": [{"element": "Sb", "occu": 1.0}],
                            "abc": [0.25, 0.25, 0.25]
                        }
                    ]
                }
            }
        ]
    }"#;

    #[test]
    fn test_deserialize_and_convert() {
        let resp: SummaryResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(resp.data.len(), 1);

        let record = resp
            .data
            .into_iter()
            .next()
            .unwrap()
            .into_record("AlSb")
            .unwrap();

        assert_eq!(record.formula, "AlSb");
        assert_eq!(record.material_id(), Some("mp-2624"));
        assert_eq!(record.sites.len(), 2);
        assert_eq!(record.sites[1].element, "Sb");

        let (a, _, _, _, _, _) = record.lattice.parameters();
        assert!((a - 4.04).abs() < 1e-9);
    }

    #[test]
    fn test_empty_data_deserializes() {
        let resp: SummaryResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(resp.data.is_empty());
    }

    #[test]
    fn test_missing_structure_is_error() {
        let doc = SummaryDoc {
            material_id: Some("mp-1".to_string()),
            structure: None,
        };
        assert!(doc.into_record("NaCl").is_err());
    }

    #[test]
    fn test_dominant_species_wins() {
        let json = r#"{
            "species": [
                {"element": "Fe", "occu": 0.25},
                {"element": "Ni", "occu": 0.75}
            ],
            "abc": [0.5, 0.5, 0.5]
        }"#;
        let site: ApiSite = serde_json::from_str(json).unwrap();
        let doc = SummaryDoc {
            material_id: None,
            structure: Some(ApiStructure {
                lattice: ApiLattice {
                    matrix: [[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]],
                },
                sites: vec![site],
            }),
        };
        let record = doc.into_record("FeNi").unwrap();
        assert_eq!(record.sites[0].element, "Ni");
    }
}
