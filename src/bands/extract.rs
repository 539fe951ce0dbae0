//! # 能带提取工具调用
//!
//! 调用 SIESTA 的 `gnubands` 把 `.bands` 原始本征值转换为
//! 逐能带、逐 k 点的扁平表格。
//!
//! 等价于:
//! ```text
//! gnubands -e <floor(Emin)-1> -E <ceil(Emax)+1> < label.bands > Bandstructure/bandoutput
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/bands.rs` 调用
//! - 使用 `std::process::Command` 调用外部程序

use crate::error::{Result, SiestoolError};

use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// gnubands 输出文件名
pub const BAND_OUTPUT_FILE: &str = "bandoutput";

/// 传给 gnubands 的能量窗口 (eV，整数)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnergyWindow {
    pub emin: i64,
    pub emax: i64,
}

impl EnergyWindow {
    /// 在 `.bands` 全局能量范围外各留 1 eV
    pub fn around(energy_range: (f64, f64)) -> Self {
        EnergyWindow {
            emin: energy_range.0.floor() as i64 - 1,
            emax: energy_range.1.ceil() as i64 + 1,
        }
    }
}

/// 能带提取接口
pub trait BandExtractor {
    /// 返回提取工具的标准输出
    fn extract(&self, bands_file: &Path, window: EnergyWindow) -> Result<String>;
}

/// SIESTA gnubands
#[derive(Debug, Clone)]
pub struct Gnubands {
    pub binary: PathBuf,
}

impl Gnubands {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Gnubands {
            binary: binary.into(),
        }
    }

    fn command_line(&self, window: EnergyWindow) -> String {
        format!(
            "{} -e {} -E {}",
            self.binary.display(),
            window.emin,
            window.emax
        )
    }
}

impl BandExtractor for Gnubands {
    fn extract(&self, bands_file: &Path, window: EnergyWindow) -> Result<String> {
        let input = File::open(bands_file).map_err(|e| SiestoolError::FileReadError {
            path: bands_file.display().to_string(),
            source: e,
        })?;

        let output = Command::new(&self.binary)
            .args(["-e", &window.emin.to_string(), "-E", &window.emax.to_string()])
            .stdin(Stdio::from(input))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    SiestoolError::CommandNotFound {
                        command: self.binary.display().to_string(),
                    }
                }
                _ => SiestoolError::CommandFailed {
                    command: self.command_line(window),
                    stderr: e.to_string(),
                },
            })?;

        if !output.status.success() {
            return Err(SiestoolError::CommandFailed {
                command: self.command_line(window),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// 保存提取结果到 `<dir>/bandoutput`
pub fn save_band_output(dir: &Path, content: &str) -> Result<PathBuf> {
    let path = dir.join(BAND_OUTPUT_FILE);
    fs::write(&path, content).map_err(|e| SiestoolError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_window() {
        let window = EnergyWindow::around((-19.87, 12.34));
        assert_eq!(window, EnergyWindow { emin: -21, emax: 14 });
    }

    #[test]
    fn test_energy_window_integral_bounds() {
        let window = EnergyWindow::around((-20.0, 12.0));
        assert_eq!(window, EnergyWindow { emin: -21, emax: 13 });
    }

    #[test]
    fn test_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let bands = dir.path().join("x.bands");
        fs::write(&bands, "-4.0\n").unwrap();

        let gnubands = Gnubands::new(dir.path().join("no-such-gnubands"));
        let err = gnubands
            .extract(&bands, EnergyWindow { emin: -1, emax: 1 })
            .unwrap_err();
        assert!(matches!(err, SiestoolError::CommandNotFound { .. }));
    }

    #[test]
    fn test_missing_bands_file() {
        let dir = tempfile::tempdir().unwrap();
        let gnubands = Gnubands::new("gnubands");
        let err = gnubands
            .extract(&dir.path().join("x.bands"), EnergyWindow { emin: -1, emax: 1 })
            .unwrap_err();
        assert!(matches!(err, SiestoolError::FileReadError { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let bands = dir.path().join("x.bands");
        fs::write(&bands, "-4.0\n").unwrap();

        let err = Gnubands::new("false")
            .extract(&bands, EnergyWindow { emin: -1, emax: 1 })
            .unwrap_err();
        assert!(matches!(err, SiestoolError::CommandFailed { .. }));
    }

    #[test]
    fn test_save_band_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_band_output(dir.path(), "# Nbands, Nspin, Nk = 1 1 1\n").unwrap();
        assert_eq!(path, dir.path().join("bandoutput"));
        assert!(fs::read_to_string(path).unwrap().starts_with("# Nbands"));
    }
}
