//! # neb 子命令 CLI 定义
//!
//! 在初末态 `.fdf` 结构之间生成 NEB 中间镜像。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/neb.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 插值方法
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum InterpolationMethod {
    /// Linear interpolation of Cartesian coordinates
    Li,
    /// Image Dependent Pair Potential
    Idpp,
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpolationMethod::Li => write!(f, "li"),
            InterpolationMethod::Idpp => write!(f, "idpp"),
        }
    }
}

/// neb 子命令参数
#[derive(Args, Debug)]
pub struct NebArgs {
    /// Directory containing the endpoint .fdf files (images are written here too)
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,

    /// Number of intermediate images
    #[arg(short, long, default_value_t = 5)]
    pub nimages: usize,

    /// Initial structure name, without the .fdf extension.
    /// Use `--if` or `-i`; a single-dash `-if` is read as `-i f`
    #[arg(short = 'i', long = "initialfile", visible_alias = "if", default_value = "initial")]
    pub initial_file: String,

    /// Final structure name, without the .fdf extension.
    /// Use `--ff` or `-f`; a single-dash `-ff` is read as `-f f`
    #[arg(short = 'f', long = "finalfile", visible_alias = "ff", default_value = "final")]
    pub final_file: String,

    /// Interpolation method
    #[arg(short, long, value_enum, default_value = "li")]
    pub method: InterpolationMethod,

    /// Maximum IDPP optimizer steps
    #[arg(long, default_value_t = 100)]
    pub idpp_steps: usize,

    /// IDPP convergence threshold on the largest atomic force
    #[arg(long, default_value_t = 0.1)]
    pub idpp_fmax: f64,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}
