//! # 原子结构数据模型
//!
//! 定义 FDF 输入解析后的结构表示：物种表、原子记录与结构。
//! 物种通过带校验的 [`SpeciesIndex`] 查找，越界索引直接报错。
//!
//! ## 依赖关系
//! - 被 `parsers/fdf.rs` 和 `neb/` 使用
//! - 无外部模块依赖

use crate::error::{Result, SiestoolError};
use serde::{Deserialize, Serialize};

/// 物种索引（1 起始，按声明顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeciesIndex(usize);

impl SpeciesIndex {
    /// 从 1 起始的原始索引创建，0 返回 None
    pub fn new(raw: usize) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(SpeciesIndex(raw))
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

/// 化学物种 (原子序数, 元素符号)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub atomic_number: i32,
    pub symbol: String,
}

impl Species {
    pub fn new(atomic_number: i32, symbol: impl Into<String>) -> Self {
        Species {
            atomic_number,
            symbol: symbol.into(),
        }
    }
}

/// 物种表，按声明顺序排列
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesTable {
    entries: Vec<Species>,
}

impl SpeciesTable {
    pub fn new(entries: Vec<Species>) -> Self {
        SpeciesTable { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.entries.iter()
    }

    /// 按索引查找物种
    pub fn resolve(&self, index: SpeciesIndex) -> Result<&Species> {
        self.entries
            .get(index.get() - 1)
            .ok_or(SiestoolError::SpeciesIndexOutOfRange {
                index: index.get(),
                available: self.entries.len(),
            })
    }
}

/// 原子记录：笛卡尔坐标 + 已解析的元素符号
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub symbol: String,
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(symbol: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            symbol: symbol.into(),
            position,
        }
    }
}

/// 原子结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// SystemLabel
    pub label: String,

    pub species: SpeciesTable,

    pub atoms: Vec<Atom>,
}

impl Structure {
    pub fn new(label: impl Into<String>, species: SpeciesTable, atoms: Vec<Atom>) -> Self {
        Structure {
            label: label.into(),
            species,
            atoms,
        }
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn num_species(&self) -> usize {
        self.species.len()
    }

    /// 按原子顺序拼接元素符号 (e.g. "CCHO")
    pub fn formula_string(&self) -> String {
        self.atoms.iter().map(|a| a.symbol.as_str()).collect()
    }

    /// 按原子顺序的元素符号列表
    pub fn symbols(&self) -> Vec<&str> {
        self.atoms.iter().map(|a| a.symbol.as_str()).collect()
    }

    pub fn positions(&self) -> Vec<[f64; 3]> {
        self.atoms.iter().map(|a| a.position).collect()
    }

    /// 以新坐标生成同组成的结构
    pub fn with_positions(&self, positions: &[[f64; 3]]) -> Structure {
        let atoms = self
            .atoms
            .iter()
            .zip(positions)
            .map(|(atom, pos)| Atom::new(atom.symbol.clone(), *pos))
            .collect();
        Structure::new(self.label.clone(), self.species.clone(), atoms)
    }
}

/// 检查初末态是否可插值：原子数与元素顺序必须一致
pub fn ensure_compatible(initial: &Structure, final_: &Structure) -> Result<()> {
    if initial.num_atoms() != final_.num_atoms() {
        return Err(SiestoolError::IncompatibleEndpoints {
            reason: format!(
                "initial has {} atoms, final has {}",
                initial.num_atoms(),
                final_.num_atoms()
            ),
        });
    }

    if initial.atoms.is_empty() {
        return Err(SiestoolError::IncompatibleEndpoints {
            reason: "structures contain no atoms".to_string(),
        });
    }

    for (i, (a, b)) in initial.atoms.iter().zip(&final_.atoms).enumerate() {
        if a.symbol != b.symbol {
            return Err(SiestoolError::IncompatibleEndpoints {
                reason: format!(
                    "atom {} is {} in initial but {} in final",
                    i + 1,
                    a.symbol,
                    b.symbol
                ),
            });
        }
    }

    Ok(())
}

/// 插值得到的镜像序列：初态、N 个中间镜像、末态
#[derive(Debug, Clone)]
pub struct ImageSequence {
    images: Vec<Structure>,
}

impl ImageSequence {
    /// 至少需要两端两个结构
    pub fn new(images: Vec<Structure>) -> Result<Self> {
        if images.len() < 2 {
            return Err(SiestoolError::InvalidArgument(format!(
                "an image sequence needs both endpoints, got {} image(s)",
                images.len()
            )));
        }
        Ok(ImageSequence { images })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// 中间镜像数
    pub fn num_intermediate(&self) -> usize {
        self.images.len() - 2
    }

    pub fn images(&self) -> &[Structure] {
        &self.images
    }

    pub fn first(&self) -> &Structure {
        &self.images[0]
    }

    pub fn last(&self) -> &Structure {
        &self.images[self.images.len() - 1]
    }
}
