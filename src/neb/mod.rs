//! # NEB 镜像生成模块
//!
//! 在初末态之间生成中间镜像，并写出 XYZ 轨迹。
//!
//! ## 子模块
//! - `interpolate`: 插值接口与线性插值
//! - `idpp`: IDPP 插值
//! - `xyz`: 轨迹写出
//!
//! ## 依赖关系
//! - 被 `commands/neb.rs` 使用
//! - 使用 `models/structure.rs`

pub mod idpp;
pub mod interpolate;
pub mod xyz;

pub use idpp::{IdppInterpolator, RelaxReport};
pub use interpolate::{Interpolation, LinearInterpolator, PathInterpolator};
