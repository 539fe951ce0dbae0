//! # 工具函数模块
//!
//! 提供终端输出与进度指示。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 子模块: output, progress

pub mod output;
pub mod progress;
