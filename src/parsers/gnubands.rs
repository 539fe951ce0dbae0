//! # gnubands 输出解析（自旋通道拆分）
//!
//! 逐行读取 gnubands 输出：从 `# Nbands, Nspin, Nk = ...` 头行恢复
//! 能带/自旋/k 点数，数据行按自旋字段 ("1"/"2") 分到上/下自旋通道。
//!
//! ## gnubands 输出格式
//! ```text
//! # GNUBANDS: Utility for SIESTA to transform bands output
//! # Nbands, Nspin, Nk = 10 2 50
//! # k_min, k_max = 0.0 2.7
//!     0.000000  -10.000000    1
//!     0.054364   -9.998754    1
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/bands.rs` 使用
//! - 使用 `models/bands.rs`

use crate::error::{Result, SiestoolError};
use crate::models::{BandData, BandsHeader, Spin, SpinChannel};

use regex::Regex;

/// 拆分 gnubands 输出为上/下自旋通道
pub fn split_spin_channels(content: &str, source: &str) -> Result<BandData> {
    let header_re = Regex::new(r"Nbands,\s*Nspin,\s*Nk\s*=\s*(\d+)\s+(\d+)\s+(\d+)").unwrap();

    let err = |reason: String| SiestoolError::ParseError {
        format: "gnubands output".to_string(),
        path: source.to_string(),
        reason,
    };

    let mut header: Option<BandsHeader> = None;
    let mut up = SpinChannel::default();
    let mut down = SpinChannel::default();

    for (lineno, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            if let Some(caps) = header_re.captures(trimmed) {
                // 正则保证三个字段都是数字
                let field = |i: usize| caps[i].parse::<usize>().unwrap_or_default();
                header = Some(BandsHeader {
                    nbands: field(1),
                    nspin: field(2),
                    nk: field(3),
                });
            }
            continue;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        if parts.len() < 3 {
            return Err(err(format!(
                "line {}: expected 'k energy spin', got '{}'",
                lineno + 1,
                trimmed
            )));
        }

        let k: f64 = parts[0]
            .parse()
            .map_err(|_| err(format!("line {}: invalid k '{}'", lineno + 1, parts[0])))?;
        let energy: f64 = parts[1]
            .parse()
            .map_err(|_| err(format!("line {}: invalid energy '{}'", lineno + 1, parts[1])))?;

        match Spin::from_field(parts[2]) {
            Some(Spin::Up) => up.push(k, energy),
            Some(Spin::Down) => down.push(k, energy),
            None => {
                return Err(err(format!(
                    "line {}: unknown spin index '{}'",
                    lineno + 1,
                    parts[2]
                )));
            }
        }
    }

    let header =
        header.ok_or_else(|| err("missing '# Nbands, Nspin, Nk =' header".to_string()))?;

    Ok(BandData { header, up, down })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "# GNUBANDS: Utility for SIESTA to transform bands output
# Nbands, Nspin, Nk = 2 2 3
# k_min, k_max = 0.0 1.0
# E_min, E_max = -11.0 5.0

    0.000000  -10.000000    1
    0.500000   -9.500000    1
    1.000000   -9.000000    1

    0.000000    1.000000    1
    0.500000    1.500000    1
    1.000000    2.000000    1

    0.000000  -10.200000    2
    0.500000   -9.700000    2
    1.000000   -9.200000    2

    0.000000    0.800000    2
    0.500000    1.300000    2
    1.000000    1.800000    2
";

    #[test]
    fn test_header_counts() {
        let data = split_spin_channels(OUTPUT, "bandoutput").unwrap();
        assert_eq!(data.header.nbands, 2);
        assert_eq!(data.header.nspin, 2);
        assert_eq!(data.header.nk, 3);
        assert_eq!(data.header.total(), 12);
    }

    #[test]
    fn test_header_line_from_listing() {
        let data = split_spin_channels("# Nbands, Nspin, Nk = 10 2 50\n", "x").unwrap();
        assert_eq!(
            data.header,
            BandsHeader {
                nbands: 10,
                nspin: 2,
                nk: 50
            }
        );
        assert_eq!(data.header.total(), 1000);
    }

    #[test]
    fn test_split_channels() {
        let data = split_spin_channels(OUTPUT, "bandoutput").unwrap();
        assert_eq!(data.up.len(), 6);
        assert_eq!(data.down.len(), 6);
        assert!((data.up.energies[3] - 1.0).abs() < 1e-12);
        assert!((data.down.energies[0] + 10.2).abs() < 1e-12);
    }

    #[test]
    fn test_spin_down_routed_only_to_down() {
        let content = "# Nbands, Nspin, Nk = 1 2 1\n 0.25 -3.5 2\n";
        let data = split_spin_channels(content, "x").unwrap();
        assert!(data.up.is_empty());
        assert_eq!(data.down.kpoints, vec![0.25]);
        assert_eq!(data.down.energies, vec![-3.5]);
    }

    #[test]
    fn test_unpolarized_leaves_down_empty() {
        let content = "# Nbands, Nspin, Nk = 1 1 2\n 0.0 -1.0 1\n 1.0 -2.0 1\n";
        let data = split_spin_channels(content, "x").unwrap();
        assert!(!data.header.is_spin_polarized());
        assert_eq!(data.up.len(), 2);
        assert!(data.down.is_empty());
    }

    #[test]
    fn test_missing_header() {
        let err = split_spin_channels(" 0.0 -1.0 1\n", "x").unwrap_err();
        assert!(err.to_string().contains("Nbands"));
    }

    #[test]
    fn test_unknown_spin_index() {
        let content = "# Nbands, Nspin, Nk = 1 1 1\n 0.0 -1.0 3\n";
        assert!(split_spin_channels(content, "x").is_err());
    }

    #[test]
    fn test_empty_output_is_error() {
        assert!(split_spin_channels("", "x").is_err());
    }
}
