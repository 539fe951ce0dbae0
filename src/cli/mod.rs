//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `neb`: 生成 NEB 中间镜像
//! - `bands`: 绘制能带图
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: neb, bands

pub mod bands;
pub mod neb;

use clap::{Parser, Subcommand};

/// Siestool - SIESTA 计算辅助工具箱
#[derive(Parser)]
#[command(name = "siestool")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "NEB image generation and band structure plots for SIESTA", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Generate NEB images between two .fdf structures
    Neb(neb::NebArgs),

    /// Plot band structure from a SIESTA .bands file
    Bands(bands::BandsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_neb_aliases() {
        let cli = Cli::parse_from(["siestool", "neb", "--if", "a", "--ff", "b", "-m", "idpp"]);
        match cli.command {
            Commands::Neb(args) => {
                assert_eq!(args.initial_file, "a");
                assert_eq!(args.final_file, "b");
                assert_eq!(args.method, neb::InterpolationMethod::Idpp);
                assert_eq!(args.nimages, 5);
            }
            _ => panic!("expected neb"),
        }
    }

    #[test]
    fn test_neb_help_mentions_double_dash_aliases() {
        let mut cmd = Cli::command();
        let neb = cmd.find_subcommand_mut("neb").unwrap();
        let help = neb.render_long_help().to_string();
        assert!(help.contains("read as"));
        assert!(help.contains("-i f"));
        assert!(help.contains("-f f"));
    }

    #[test]
    fn test_single_dash_two_letter_flag_rejected() {
        let result = Cli::try_parse_from(["siestool", "neb", "-if", "start", "-ff", "end"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bands_defaults() {
        let cli = Cli::parse_from(["siestool", "bands"]);
        match cli.command {
            Commands::Bands(args) => {
                assert_eq!(args.input, std::path::PathBuf::from("input.fdf"));
                assert_eq!(args.window, 5.0);
                assert_eq!(args.xmax_point, 2);
                assert_eq!(args.format, bands::PlotFormat::Png);
            }
            _ => panic!("expected bands"),
        }
    }
}
