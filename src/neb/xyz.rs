//! # XYZ 轨迹写出
//!
//! 每个镜像写一个 `.xyz` 文件，再按顺序拼接为动画文件。
//!
//! ## 格式
//! ```text
//! 3
//! Image_0
//! C\t0.00000000\t0.00000000\t0.00000000
//! ```
//! 坐标保留 8 位小数，字段以制表符分隔。已存在的文件直接覆盖。
//!
//! ## 依赖关系
//! - 被 `commands/neb.rs` 调用
//! - 使用 `models/structure.rs`

use crate::error::{Result, SiestoolError};
use crate::models::{ImageSequence, Structure};

use std::fs;
use std::path::{Path, PathBuf};

/// 单个镜像的 XYZ 文本块
pub fn to_xyz_block(image: &Structure, index: usize) -> String {
    let mut result = String::new();
    result.push_str(&format!("{}\n", image.num_atoms()));
    result.push_str(&format!("Image_{}\n", index));

    for atom in &image.atoms {
        result.push_str(&format!(
            "{}\t{:.8}\t{:.8}\t{:.8}\n",
            atom.symbol, atom.position[0], atom.position[1], atom.position[2]
        ));
    }

    result
}

/// 镜像文件名: images_<method><i>.xyz
pub fn image_file_name(method: &str, index: usize) -> String {
    format!("images_{}{}.xyz", method, index)
}

/// 动画文件名: images_<method>_Animation.xyz
pub fn animation_file_name(method: &str) -> String {
    format!("images_{}_Animation.xyz", method)
}

/// 写出结果
#[derive(Debug, Clone)]
pub struct TrajectoryFiles {
    pub images: Vec<PathBuf>,
    pub animation: PathBuf,
}

/// 写出全部镜像文件和动画文件
pub fn write_trajectory(
    dir: &Path,
    method: &str,
    images: &ImageSequence,
) -> Result<TrajectoryFiles> {
    let mut animation = String::new();
    let mut written = Vec::with_capacity(images.len());

    for (i, image) in images.images().iter().enumerate() {
        let block = to_xyz_block(image, i);
        let path = dir.join(image_file_name(method, i));
        write_file(&path, &block)?;
        animation.push_str(&block);
        written.push(path);
    }

    let animation_path = dir.join(animation_file_name(method));
    write_file(&animation_path, &animation)?;

    Ok(TrajectoryFiles {
        images: written,
        animation: animation_path,
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| SiestoolError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
