//! # 能带数据导出
//!
//! 将单个自旋通道导出为 CSV，列为 band, k, energy_eV，
//! 能量为 gnubands 给出的原始值（未裁剪）。
//!
//! ## 依赖关系
//! - 被 `commands/bands.rs` 调用
//! - 使用 `models/bands.rs` 的 SpinChannel
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{Result, SiestoolError};
use crate::models::SpinChannel;

use std::path::Path;

/// 导出自旋通道为 CSV 格式
pub fn channel_to_csv(channel: &SpinChannel, nbands: usize, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["band", "k", "energy_eV"])?;

    for (i, band) in channel.bands(nbands).iter().enumerate() {
        for (k, energy) in band {
            wtr.write_record(&[
                (i + 1).to_string(),
                format!("{:.6}", k),
                format!("{:.6}", energy),
            ])?;
        }
    }

    wtr.flush().map_err(|e| SiestoolError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bands-up.csv");

        let mut channel = SpinChannel::default();
        channel.push(0.0, -5.0);
        channel.push(0.5, -4.5);
        channel.push(0.0, 1.0);
        channel.push(0.5, 1.25);

        channel_to_csv(&channel, 2, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "band,k,energy_eV");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "1,0.000000,-5.000000");
        assert_eq!(lines[4], "2,0.500000,1.250000");
    }
}
