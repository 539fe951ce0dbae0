//! # 能带数据模型
//!
//! 存储 `.bands` 文件头信息、高对称点以及按自旋通道拆分的能带数据。
//!
//! ## 依赖关系
//! - 被 `parsers/bands.rs`, `bands/` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 高对称点 (k 路径位置, 标签)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetryPoint {
    pub position: f64,
    pub label: String,
}

/// `.bands` 文件内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    /// 费米能 (eV)
    pub fermi_energy: f64,

    /// 布里渊区路径起止位置
    pub k_range: (f64, f64),

    /// 全局能量范围 (eV)
    pub energy_range: (f64, f64),

    pub symmetry_points: Vec<SymmetryPoint>,
}

/// gnubands 输出头 "# Nbands, Nspin, Nk = a b c"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandsHeader {
    pub nbands: usize,
    pub nspin: usize,
    pub nk: usize,
}

impl BandsHeader {
    /// 数据总条目数
    pub fn total(&self) -> usize {
        self.nbands * self.nspin * self.nk
    }

    pub fn is_spin_polarized(&self) -> bool {
        self.nspin == 2
    }
}

/// 自旋方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spin {
    Up,
    Down,
}

impl Spin {
    /// gnubands 的自旋字段 ("1" / "2")
    pub fn from_field(field: &str) -> Option<Spin> {
        match field {
            "1" => Some(Spin::Up),
            "2" => Some(Spin::Down),
            _ => None,
        }
    }

    /// 输出文件名后缀
    pub fn suffix(self) -> &'static str {
        match self {
            Spin::Up => "up",
            Spin::Down => "down",
        }
    }
}

impl std::fmt::Display for Spin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Spin::Up => write!(f, "Spin Up"),
            Spin::Down => write!(f, "Spin Down"),
        }
    }
}

/// 单个自旋通道的扁平 (k, E) 序列，按能带顺序排列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpinChannel {
    pub kpoints: Vec<f64>,
    pub energies: Vec<f64>,
}

impl SpinChannel {
    pub fn push(&mut self, k: f64, energy: f64) {
        self.kpoints.push(k);
        self.energies.push(energy);
    }

    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    /// 每条能带的点数 (整数除法)
    pub fn points_per_band(&self, nbands: usize) -> usize {
        if nbands == 0 {
            0
        } else {
            self.len() / nbands
        }
    }

    /// 按能带切片为折线
    pub fn bands(&self, nbands: usize) -> Vec<Vec<(f64, f64)>> {
        let per_band = self.points_per_band(nbands);
        if per_band == 0 {
            return Vec::new();
        }

        (0..nbands)
            .map(|i| {
                let range = per_band * i..per_band * (i + 1);
                self.kpoints[range.clone()]
                    .iter()
                    .zip(&self.energies[range])
                    .map(|(k, e)| (*k, *e))
                    .collect()
            })
            .collect()
    }
}

/// 拆分后的能带数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandData {
    pub header: BandsHeader,
    pub up: SpinChannel,
    pub down: SpinChannel,
}

impl BandData {
    pub fn channel(&self, spin: Spin) -> &SpinChannel {
        match spin {
            Spin::Up => &self.up,
            Spin::Down => &self.down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_total() {
        let header = BandsHeader {
            nbands: 10,
            nspin: 2,
            nk: 50,
        };
        assert_eq!(header.total(), 1000);
        assert!(header.is_spin_polarized());
    }

    #[test]
    fn test_spin_from_field() {
        assert_eq!(Spin::from_field("1"), Some(Spin::Up));
        assert_eq!(Spin::from_field("2"), Some(Spin::Down));
        assert_eq!(Spin::from_field("3"), None);
    }

    #[test]
    fn test_channel_bands() {
        let mut channel = SpinChannel::default();
        for band in 0..2 {
            for k in 0..3 {
                channel.push(k as f64, band as f64 * 10.0 + k as f64);
            }
        }
        let bands = channel.bands(2);
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0], vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(bands[1][2], (2.0, 12.0));
    }

    #[test]
    fn test_channel_bands_truncates() {
        let mut channel = SpinChannel::default();
        for i in 0..7 {
            channel.push(i as f64, 0.0);
        }
        // 7 / 2 = 3，最后一个点被丢弃
        assert_eq!(channel.points_per_band(2), 3);
        let bands = channel.bands(2);
        assert_eq!(bands[1].len(), 3);
        assert_eq!(bands[1][2].0, 5.0);
    }

    #[test]
    fn test_empty_channel_has_no_bands() {
        assert!(SpinChannel::default().bands(4).is_empty());
    }
}
