//! # 数据模型模块
//!
//! 定义晶体结构记录与化学式组成的数据模型。
//!
//! ## 依赖关系
//! - 被 `api/`, `generator/`, `formats/`, `pipeline/` 使用
//! - 子模块: structure, composition

pub mod composition;
pub mod structure;

pub use composition::Composition;
pub use structure::{Lattice, Provenance, Site, StructureRecord};
