//! # 远程结构数据库客户端模块
//!
//! 定义结构查询的统一接口 [`StructureSource`] 及其生产实现
//! （Materials Project HTTP 客户端）。编排器只依赖 trait，
//! 便于测试替换和离线运行。
//!
//! ## 依赖关系
//! - 被 `pipeline/` 和 `commands/` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: client, response

pub mod client;
pub mod response;

pub use client::MpClient;

use crate::error::Result;
use crate::models::StructureRecord;

/// 单次查询的结果：命中记录，或数据库明确无此化学式
///
/// “未找到”是正常结果而非错误；网络/限流失败走 `Err` 分支。
#[derive(Debug, Clone)]
pub enum Lookup {
    Found(StructureRecord),
    NotFound,
}

/// 结构查询源
///
/// `&mut self` 是因为生产实现要维护请求间隔的时间戳。
pub trait StructureSource {
    fn lookup(&mut self, formula: &str) -> Result<Lookup>;
}

/// 离线查询源：永远返回未找到，使流水线只走生成分支
///
/// `generate` 子命令用它复用完整的编排逻辑而不产生任何网络流量。
#[derive(Debug, Default)]
pub struct OfflineSource;

impl StructureSource for OfflineSource {
    fn lookup(&mut self, _formula: &str) -> Result<Lookup> {
        Ok(Lookup::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_source_always_misses() {
        let mut source = OfflineSource;
        assert!(matches!(source.lookup("NaCl").unwrap(), Lookup::NotFound));
        assert!(matches!(source.lookup("Fe2O3").unwrap(), Lookup::NotFound));
    }
}
