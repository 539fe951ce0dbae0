//! # 数据模型模块
//!
//! 定义原子结构与能带数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `neb/`, `bands/` 和 `commands/` 使用
//! - 子模块: structure, bands

pub mod bands;
pub mod structure;

pub use bands::{BandData, BandTable, BandsHeader, Spin, SpinChannel, SymmetryPoint};
pub use structure::{
    ensure_compatible, Atom, ImageSequence, Species, SpeciesIndex, SpeciesTable, Structure,
};
