//! # SIESTA .bands 文件解析器
//!
//! 按行位置读取 `.bands` 文件头，再扫描带引号的行作为高对称点。
//!
//! ## .bands 格式说明
//! ```text
//! -4.1234                      <- 费米能 (eV)
//!  0.000000  3.456789          <- k 路径起止
//! -20.5  15.3                  <- 全局能量范围 (eV)
//!  10  2  50                   <- nbands nspin nk
//! ...                          <- 本征值
//!  4
//!  0.000000 'Gamma'            <- 高对称点
//!  1.234567 'X'
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/bands.rs` 使用
//! - 使用 `models/bands.rs`

use crate::error::{Result, SiestoolError};
use crate::models::{BandTable, SymmetryPoint};
use std::fs;
use std::path::Path;

/// 解析 .bands 文件
pub fn parse_bands_file(path: &Path) -> Result<BandTable> {
    let content = fs::read_to_string(path).map_err(|e| SiestoolError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_bands_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 .bands 格式
pub fn parse_bands_content(content: &str, source: &str) -> Result<BandTable> {
    let err = |reason: String| SiestoolError::ParseError {
        format: "bands".to_string(),
        path: source.to_string(),
        reason,
    };

    let lines: Vec<&str> = content.lines().collect();
    if lines.len() < 3 {
        return Err(err(format!(
            "expected at least 3 header lines, found {}",
            lines.len()
        )));
    }

    let fermi = parse_floats(lines[0], 1).map_err(|e| err(format!("line 1: {}", e)))?;
    let k_range = parse_floats(lines[1], 2).map_err(|e| err(format!("line 2: {}", e)))?;
    let e_range = parse_floats(lines[2], 2).map_err(|e| err(format!("line 3: {}", e)))?;

    let mut symmetry_points = Vec::new();
    for (lineno, line) in lines.iter().enumerate().skip(3) {
        if !line.contains('\'') {
            continue;
        }
        let point = parse_symmetry_point(line)
            .map_err(|e| err(format!("line {}: {}", lineno + 1, e)))?;
        symmetry_points.push(point);
    }

    Ok(BandTable {
        fermi_energy: fermi[0],
        k_range: (k_range[0], k_range[1]),
        energy_range: (e_range[0], e_range[1]),
        symmetry_points,
    })
}

/// 读取行首的 `count` 个浮点数
fn parse_floats(line: &str, count: usize) -> std::result::Result<Vec<f64>, String> {
    let values: Vec<f64> = line
        .split_whitespace()
        .take(count)
        .map(|t| t.parse::<f64>().map_err(|_| format!("invalid number '{}'", t)))
        .collect::<std::result::Result<_, _>>()?;

    if values.len() < count {
        return Err(format!("expected {} number(s), found {}", count, values.len()));
    }
    Ok(values)
}

/// 高对称点行: `k 'label'`
fn parse_symmetry_point(line: &str) -> std::result::Result<SymmetryPoint, String> {
    let position = line
        .split_whitespace()
        .next()
        .and_then(|t| t.parse::<f64>().ok())
        .ok_or_else(|| format!("invalid symmetry point line '{}'", line.trim()))?;

    let start = line.find('\'').unwrap_or(0);
    let end = line.rfind('\'').unwrap_or(line.len());
    let label = if end > start {
        line[start + 1..end].trim()
    } else {
        line[start + 1..].trim()
    };

    Ok(SymmetryPoint {
        position,
        label: label.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANDS: &str = "   -4.5130
    0.000000    2.718282
  -19.876543   12.345678
    4    2    3
    0.000000  -10.0  -5.0   1.0   2.0
              -10.1  -5.1   1.1   2.1
    1.359141   -9.0  -4.0   2.0   3.0
               -9.1  -4.1   2.1   3.1
    2.718282   -8.0  -3.0   3.0   4.0
               -8.1  -3.1   3.1   4.1
    3
    0.000000 'Gamma'
    1.359141 'X'
    2.718282 'M'
";

    #[test]
    fn test_parse_header() {
        let table = parse_bands_content(BANDS, "test.bands").unwrap();
        assert!((table.fermi_energy + 4.513).abs() < 1e-9);
        assert!((table.k_range.1 - 2.718282).abs() < 1e-9);
        assert!((table.energy_range.0 + 19.876543).abs() < 1e-9);
        assert!((table.energy_range.1 - 12.345678).abs() < 1e-9);
    }

    #[test]
    fn test_parse_symmetry_points() {
        let table = parse_bands_content(BANDS, "test.bands").unwrap();
        let labels: Vec<&str> = table
            .symmetry_points
            .iter()
            .map(|p| p.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Gamma", "X", "M"]);
        assert!((table.symmetry_points[1].position - 1.359141).abs() < 1e-9);
    }

    #[test]
    fn test_truncated_header() {
        let err = parse_bands_content("-4.5\n0.0 1.0\n", "short.bands").unwrap_err();
        assert!(matches!(err, SiestoolError::ParseError { .. }));
    }

    #[test]
    fn test_bad_energy_range() {
        let content = "-4.5\n0.0 1.0\n-20.0\n";
        let err = parse_bands_content(content, "bad.bands").unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_label_with_spaces_inside_quotes() {
        let point = parse_symmetry_point("  0.5  ' K '").unwrap();
        assert_eq!(point.label, "K");
        assert!((point.position - 0.5).abs() < 1e-12);
    }
}
