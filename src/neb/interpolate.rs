//! # 路径插值
//!
//! 在初态和末态之间生成 NEB 中间镜像。
//!
//! ## 功能
//! - `PathInterpolator` trait：插值方法的统一接口
//! - `LinearInterpolator`：笛卡尔坐标线性插值
//! - `IdppInterpolator` 见 `neb/idpp.rs`
//!
//! 两端镜像始终是输入结构的精确拷贝。
//!
//! ## 依赖关系
//! - 被 `commands/neb.rs` 调用
//! - 使用 `models/structure.rs`

use crate::error::Result;
use crate::models::{ensure_compatible, ImageSequence, Structure};
use crate::neb::idpp::RelaxReport;

/// 插值结果
#[derive(Debug, Clone)]
pub struct Interpolation {
    pub images: ImageSequence,

    /// 仅 IDPP 有弛豫信息
    pub relaxation: Option<RelaxReport>,
}

/// 插值方法接口
pub trait PathInterpolator {
    /// 在 `initial` 和 `final_` 之间生成 `nimages` 个中间镜像
    fn interpolate(
        &self,
        initial: &Structure,
        final_: &Structure,
        nimages: usize,
    ) -> Result<Interpolation>;
}

/// 线性插值
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator;

impl PathInterpolator for LinearInterpolator {
    fn interpolate(
        &self,
        initial: &Structure,
        final_: &Structure,
        nimages: usize,
    ) -> Result<Interpolation> {
        ensure_compatible(initial, final_)?;

        let path = linear_path(initial, final_, nimages);
        let images = assemble_images(initial, final_, &path)?;

        Ok(Interpolation {
            images,
            relaxation: None,
        })
    }
}

/// 中间镜像的线性坐标：第 i 个 (1..=n) 位于 initial + i/(n+1) * (final - initial)
pub fn linear_path(initial: &Structure, final_: &Structure, nimages: usize) -> Vec<Vec<[f64; 3]>> {
    let segments = (nimages + 1) as f64;

    (1..=nimages)
        .map(|i| {
            let t = i as f64 / segments;
            initial
                .atoms
                .iter()
                .zip(&final_.atoms)
                .map(|(a, b)| {
                    let mut pos = [0.0; 3];
                    for k in 0..3 {
                        pos[k] = a.position[k] + t * (b.position[k] - a.position[k]);
                    }
                    pos
                })
                .collect()
        })
        .collect()
}

/// 组装完整镜像序列：初态 + 中间镜像 + 末态
pub(crate) fn assemble_images(
    initial: &Structure,
    final_: &Structure,
    interior: &[Vec<[f64; 3]>],
) -> Result<ImageSequence> {
    let mut images = Vec::with_capacity(interior.len() + 2);
    images.push(initial.clone());
    images.extend(interior.iter().map(|pos| initial.with_positions(pos)));
    images.push(final_.clone());
    ImageSequence::new(images)
}
