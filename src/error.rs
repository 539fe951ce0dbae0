//! # 统一错误处理模块
//!
//! 定义 siestool 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// siestool 统一错误类型
#[derive(Error, Debug)]
pub enum SiestoolError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Missing required keyword '{keyword}' in {path}")]
    MissingKeyword { keyword: String, path: String },

    #[error("Invalid structure format: {0}")]
    InvalidFormat(String),

    #[error("Species index {index} is out of range (species table has {available} entries)")]
    SpeciesIndexOutOfRange { index: usize, available: usize },

    // ─────────────────────────────────────────────────────────────
    // 插值错误
    // ─────────────────────────────────────────────────────────────
    #[error("Initial and final structures are incompatible: {reason}")]
    IncompatibleEndpoints { reason: String },

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command '{command}' not found")]
    CommandNotFound { command: String },

    #[error("External command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 绘图 / CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Plotting failed: {0}")]
    PlotError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SiestoolError>;
