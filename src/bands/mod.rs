//! # 能带图模块
//!
//! 从 SIESTA 的 `.bands` 文件生成能带图。
//!
//! ## 子模块
//! - `extract`: 调用 gnubands 提取能带
//! - `plot`: 能带图描述与渲染
//! - `export`: CSV 导出
//!
//! ## 依赖关系
//! - 被 `commands/bands.rs` 使用
//! - 使用 `models/bands.rs`

pub mod export;
pub mod extract;
pub mod plot;

pub use extract::{BandExtractor, EnergyWindow, Gnubands};
pub use plot::{BandPlot, BandPlotRenderer, PlotOptions, PlottersRenderer};
