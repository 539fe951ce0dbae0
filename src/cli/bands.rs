//! # bands 子命令 CLI 定义
//!
//! 从 SIESTA 的 `.bands` 文件绘制能带图。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/bands.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 图片格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PlotFormat {
    /// PNG bitmap
    Png,
    /// Scalable vector graphics
    Svg,
}

impl PlotFormat {
    pub fn extension(self) -> &'static str {
        match self {
            PlotFormat::Png => "png",
            PlotFormat::Svg => "svg",
        }
    }
}

/// bands 子命令参数
#[derive(Args, Debug)]
pub struct BandsArgs {
    /// SIESTA input file providing SystemLabel
    #[arg(short, long, default_value = "input.fdf")]
    pub input: PathBuf,

    /// gnubands executable
    #[arg(long, env = "GNUBANDS", default_value = "gnubands")]
    pub gnubands: PathBuf,

    /// Output directory for band output and plots
    #[arg(short, long, default_value = "Bandstructure")]
    pub output_dir: PathBuf,

    /// Energy window around the Fermi level (eV)
    #[arg(short, long, default_value_t = 5.0)]
    pub window: f64,

    /// Index of the symmetry point that ends the x axis
    #[arg(long, default_value_t = 2)]
    pub xmax_point: usize,

    /// Image format
    #[arg(short, long, value_enum, default_value = "png")]
    pub format: PlotFormat,

    /// Image width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Also export each spin channel as CSV
    #[arg(long, default_value_t = false)]
    pub csv: bool,
}
