//! # 解析器模块
//!
//! 提供 SIESTA 输入与输出文件的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: fdf, bands, gnubands

pub mod bands;
pub mod fdf;
pub mod gnubands;
