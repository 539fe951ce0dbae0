//! # Siestool - SIESTA 计算辅助工具箱
//!
//! 把 NEB 镜像生成和能带图绘制两个脚本合并为单一可执行文件。
//!
//! ## 子命令
//! - `neb`   - 由初末态 .fdf 生成 NEB 中间镜像 (线性 / IDPP)
//! - `bands` - 调用 gnubands 并绘制自旋分辨能带图
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (fdf / bands / gnubands 解析器)
//!   │     ├── neb/       (插值与 XYZ 写出)
//!   │     ├── bands/     (能带提取、绘图与导出)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod bands;
mod cli;
mod commands;
mod error;
mod models;
mod neb;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
