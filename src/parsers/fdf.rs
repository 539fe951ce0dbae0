//! # SIESTA .fdf 格式解析器
//!
//! 解析 SIESTA 输入文件中与结构相关的关键字和块。
//!
//! ## .fdf 格式说明
//! ```text
//! SystemLabel      benzene
//! NumberOfSpecies  2
//! NumberOfAtoms    3
//!
//! %block ChemicalSpeciesLabel
//!   1  6  C.pbr
//!   2  8  O
//! %endblock ChemicalSpeciesLabel
//!
//! %block AtomicCoordinatesAndAtomicSpecies
//!   0.000  0.000  0.000  1
//!   1.160  0.000  0.000  2
//! %endblock AtomicCoordinatesAndAtomicSpecies
//! ```
//!
//! 关键字名不区分大小写，并忽略 `.`、`_`、`-`。`#` 之后为注释。
//! `%endblock` 后的块名可省略；`%block Name < file` 引用外部文件，块在该行结束。
//!
//! ## 依赖关系
//! - 被 `commands/neb.rs`, `commands/bands.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{Result, SiestoolError};
use crate::models::{Atom, Species, SpeciesIndex, SpeciesTable, Structure};

use regex::Regex;
use std::fs;
use std::path::Path;

const KEY_SYSTEM_LABEL: &str = "systemlabel";
const KEY_NUMBER_OF_SPECIES: &str = "numberofspecies";
const KEY_NUMBER_OF_ATOMS: &str = "numberofatoms";
const BLOCK_SPECIES: &str = "chemicalspecieslabel";
const BLOCK_COORDINATES: &str = "atomiccoordinatesandatomicspecies";

/// 坐标块中的一行：坐标 + 物种索引
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateRow {
    pub position: [f64; 3],
    pub species: SpeciesIndex,
}

/// 解析后的 .fdf 文档（只读）
#[derive(Debug, Clone, PartialEq)]
pub struct FdfDocument {
    /// 来源（文件路径或名称），用于错误信息
    pub source: String,
    pub system_label: Option<String>,
    pub number_of_species: Option<usize>,
    pub number_of_atoms: Option<usize>,
    pub species: SpeciesTable,
    pub coordinates: Vec<CoordinateRow>,
    /// `%block Name < file` 形式引用外部文件的块
    pub includes: Vec<BlockInclude>,
}

/// 从外部文件读取内容的块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInclude {
    pub block: String,
    pub file: String,
}

impl FdfDocument {
    /// SystemLabel，缺失时报错
    pub fn system_label(&self) -> Result<&str> {
        self.system_label
            .as_deref()
            .ok_or_else(|| self.missing("SystemLabel"))
    }

    /// 校验必需关键字并构建结构
    pub fn into_structure(self) -> Result<Structure> {
        let label = self.system_label()?.to_string();

        if let Some(include) = self.includes.iter().find(|inc| {
            matches!(
                normalize_key(&inc.block).as_str(),
                BLOCK_SPECIES | BLOCK_COORDINATES
            )
        }) {
            return Err(SiestoolError::InvalidFormat(format!(
                "{}: block {} is read from '{}'; inline the block to use this file",
                self.source, include.block, include.file
            )));
        }
        let num_species = self
            .number_of_species
            .ok_or_else(|| self.missing("NumberOfSpecies"))?;
        let num_atoms = self
            .number_of_atoms
            .ok_or_else(|| self.missing("NumberOfAtoms"))?;

        if num_species != self.species.len() {
            return Err(SiestoolError::InvalidFormat(format!(
                "{}: NumberOfSpecies is {} but ChemicalSpeciesLabel lists {} species",
                self.source,
                num_species,
                self.species.len()
            )));
        }

        if num_atoms != self.coordinates.len() {
            return Err(SiestoolError::InvalidFormat(format!(
                "{}: NumberOfAtoms is {} but {} coordinate rows were read",
                self.source,
                num_atoms,
                self.coordinates.len()
            )));
        }

        let atoms = self
            .coordinates
            .iter()
            .map(|row| {
                let species = self.species.resolve(row.species)?;
                Ok(Atom::new(species.symbol.clone(), row.position))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Structure::new(label, self.species, atoms))
    }

    fn missing(&self, keyword: &str) -> SiestoolError {
        SiestoolError::MissingKeyword {
            keyword: keyword.to_string(),
            path: self.source.clone(),
        }
    }
}

/// 当前所在的块
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Species,
    Coordinates,
    Other,
}

/// 块边界行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockMarker<'a> {
    Begin(&'a str),
    Include { block: &'a str, file: &'a str },
    End,
}

fn block_regex() -> Regex {
    Regex::new(r"(?i)^%(end)?block\b(.*)$").unwrap()
}

/// 识别 `%block Name`、`%block Name < file` 和 `%endblock [Name]`
fn block_marker<'a>(re: &Regex, line: &'a str) -> Option<BlockMarker<'a>> {
    let caps = re.captures(line)?;
    if caps.get(1).is_some() {
        return Some(BlockMarker::End);
    }

    let rest = caps.get(2).map_or("", |m| m.as_str());
    match rest.split_once('<') {
        Some((block, file)) => Some(BlockMarker::Include {
            block: block.trim(),
            file: file.trim(),
        }),
        None => Some(BlockMarker::Begin(rest.trim())),
    }
}

fn strip_comment(raw: &str) -> &str {
    raw.split('#').next().unwrap_or_default().trim()
}

/// 解析 .fdf 文件
pub fn parse_fdf_file(path: &Path) -> Result<FdfDocument> {
    let content = fs::read_to_string(path).map_err(|e| SiestoolError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_fdf_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 .fdf 格式
pub fn parse_fdf_content(content: &str, source: &str) -> Result<FdfDocument> {
    let block_re = block_regex();

    let mut doc = FdfDocument {
        source: source.to_string(),
        system_label: None,
        number_of_species: None,
        number_of_atoms: None,
        species: SpeciesTable::default(),
        coordinates: Vec::new(),
        includes: Vec::new(),
    };
    let mut species = Vec::new();
    let mut current: Option<Block> = None;

    for (lineno, raw) in content.lines().enumerate() {
        let line = strip_comment(raw);
        if line.is_empty() {
            continue;
        }

        let err = |reason: String| SiestoolError::ParseError {
            format: "fdf".to_string(),
            path: source.to_string(),
            reason: format!("line {}: {}", lineno + 1, reason),
        };

        if let Some(marker) = block_marker(&block_re, line) {
            current = match marker {
                BlockMarker::Begin(name) => match normalize_key(name).as_str() {
                    BLOCK_SPECIES => Some(Block::Species),
                    BLOCK_COORDINATES => Some(Block::Coordinates),
                    _ => Some(Block::Other),
                },
                // 内容在外部文件中，块在本行结束
                BlockMarker::Include { block, file } => {
                    doc.includes.push(BlockInclude {
                        block: block.to_string(),
                        file: file.to_string(),
                    });
                    None
                }
                BlockMarker::End => None,
            };
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();

        match current {
            Some(Block::Species) => species.push(parse_species_row(&parts).map_err(err)?),
            Some(Block::Coordinates) => doc
                .coordinates
                .push(parse_coordinate_row(&parts).map_err(err)?),
            Some(Block::Other) => {}
            None => {
                let key = normalize_key(parts[0]);
                let value = parts.last().copied().filter(|_| parts.len() > 1);

                match key.as_str() {
                    KEY_SYSTEM_LABEL => {
                        let value =
                            value.ok_or_else(|| err("SystemLabel has no value".into()))?;
                        doc.system_label = Some(value.to_string());
                    }
                    KEY_NUMBER_OF_SPECIES => {
                        let count = parse_count(value, "NumberOfSpecies").map_err(err)?;
                        doc.number_of_species = Some(count);
                    }
                    KEY_NUMBER_OF_ATOMS => {
                        let count = parse_count(value, "NumberOfAtoms").map_err(err)?;
                        doc.number_of_atoms = Some(count);
                    }
                    _ => {}
                }
            }
        }
    }

    doc.species = SpeciesTable::new(species);
    Ok(doc)
}

/// 只读取 SystemLabel，不解析块内容
pub fn read_system_label(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| SiestoolError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    system_label_from_content(&content, &path.display().to_string())
}

/// 在块外查找 SystemLabel，块内的行一律跳过
pub fn system_label_from_content(content: &str, source: &str) -> Result<String> {
    let block_re = block_regex();
    let mut in_block = false;
    let mut label = None;

    for raw in content.lines() {
        let line = strip_comment(raw);
        if line.is_empty() {
            continue;
        }

        if let Some(marker) = block_marker(&block_re, line) {
            in_block = matches!(marker, BlockMarker::Begin(_));
            continue;
        }
        if in_block {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() > 1 && normalize_key(parts[0]) == KEY_SYSTEM_LABEL {
            label = parts.last().map(|v| v.to_string());
        }
    }

    label.ok_or_else(|| SiestoolError::MissingKeyword {
        keyword: "SystemLabel".to_string(),
        path: source.to_string(),
    })
}

/// FDF 关键字归一化：小写并去掉 `.` `_` `-`
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '.' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_count(value: Option<&str>, keyword: &str) -> std::result::Result<usize, String> {
    let value = value.ok_or_else(|| format!("{} has no value", keyword))?;
    value
        .parse()
        .map_err(|_| format!("{} expects an integer, got '{}'", keyword, value))
}

/// 物种行: `index Z label`，标签中 `.` 之后的后缀丢弃 (C.pbr -> C)
fn parse_species_row(parts: &[&str]) -> std::result::Result<Species, String> {
    if parts.len() < 3 {
        return Err(format!(
            "species row needs 'index Z label', got '{}'",
            parts.join(" ")
        ));
    }

    let atomic_number: i32 = parts[1]
        .parse()
        .map_err(|_| format!("invalid atomic number '{}'", parts[1]))?;
    let symbol = parts[2].split('.').next().unwrap_or(parts[2]);

    Ok(Species::new(atomic_number, symbol))
}

/// 坐标行: `x y z species [...]`
fn parse_coordinate_row(parts: &[&str]) -> std::result::Result<CoordinateRow, String> {
    if parts.len() < 4 {
        return Err(format!(
            "coordinate row needs 'x y z species', got '{}'",
            parts.join(" ")
        ));
    }

    let mut position = [0.0; 3];
    for (slot, token) in position.iter_mut().zip(&parts[..3]) {
        *slot = token
            .parse()
            .map_err(|_| format!("invalid coordinate '{}'", token))?;
    }

    let species = parts[3]
        .parse::<usize>()
        .ok()
        .and_then(SpeciesIndex::new)
        .ok_or_else(|| format!("invalid species index '{}'", parts[3]))?;

    Ok(CoordinateRow { position, species })
}
