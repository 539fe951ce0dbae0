//! # IDPP 插值 (Image Dependent Pair Potential)
//!
//! 以线性插值为起点，为每个镜像构造目标原子间距矩阵
//! `D_i = D_init + t_i (D_final - D_init)`，并在目标函数
//!
//! ```text
//! E = Σ_{a<b} (d_ab - D_ab)² / d_ab⁴
//! ```
//!
//! 上作 NEB 弛豫（improved tangent + 弹簧力），优化器为 MDMin。
//! 各镜像的 IDPP 力用 rayon 并行计算。
//!
//! 参考: Smidstrup et al., J. Chem. Phys. 140, 214106 (2014)
//!
//! ## 依赖关系
//! - 被 `commands/neb.rs` 调用
//! - 使用 `neb/interpolate.rs` 的线性路径作为初始猜测
//! - 使用 `rayon` 并行计算

use crate::error::{Result, SiestoolError};
use crate::models::{ensure_compatible, Structure};
use crate::neb::interpolate::{assemble_images, linear_path, Interpolation, PathInterpolator};

use rayon::prelude::*;

/// IDPP 弛豫结果摘要
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxReport {
    /// 执行的优化步数
    pub steps: usize,
    /// 最终最大原子力 (eV/Å)
    pub max_force: f64,
    pub converged: bool,
}

/// IDPP 插值器
#[derive(Debug, Clone, Copy)]
pub struct IdppInterpolator {
    /// 最大优化步数
    pub steps: usize,
    /// 收敛判据 (eV/Å)
    pub fmax: f64,
    /// NEB 弹簧常数
    pub spring: f64,
    /// MDMin 时间步长
    pub dt: f64,
    /// 单原子最大位移 (Å)
    pub max_step: f64,
}

impl Default for IdppInterpolator {
    fn default() -> Self {
        IdppInterpolator {
            steps: 100,
            fmax: 0.1,
            spring: 0.1,
            dt: 0.2,
            max_step: 0.2,
        }
    }
}

impl IdppInterpolator {
    pub fn new(steps: usize, fmax: f64) -> Result<Self> {
        if fmax.is_nan() || fmax <= 0.0 {
            return Err(SiestoolError::InvalidArgument(format!(
                "IDPP fmax must be positive, got {}",
                fmax
            )));
        }
        Ok(IdppInterpolator {
            steps,
            fmax,
            ..Default::default()
        })
    }

    /// 在 IDPP 势面上弛豫中间镜像
    fn relax(&self, path: &mut [Vec<f64>], targets: &[Vec<f64>]) -> RelaxReport {
        let interior = path.len() - 2;
        let mut velocity: Option<Vec<f64>> = None;
        let mut max_force = 0.0;

        for step in 0..self.steps {
            let evaluated: Vec<(f64, Vec<f64>)> = path
                .par_iter()
                .zip(targets.par_iter())
                .map(|(pos, target)| idpp_energy_forces(pos, target))
                .collect();

            let snapshot: &[Vec<f64>] = path;
            let forces: Vec<f64> = (1..=interior)
                .flat_map(|i| neb_force(snapshot, &evaluated, i, self.spring))
                .collect();

            max_force = max_atomic_norm(&forces);
            if max_force < self.fmax {
                return RelaxReport {
                    steps: step,
                    max_force,
                    converged: true,
                };
            }

            let dr = self.mdmin_step(&mut velocity, &forces);
            for (i, image) in path[1..=interior].iter_mut().enumerate() {
                let len = image.len();
                for (x, d) in image.iter_mut().zip(&dr[i * len..(i + 1) * len]) {
                    *x += d;
                }
            }
        }

        RelaxReport {
            steps: self.steps,
            max_force,
            converged: false,
        }
    }

    /// MDMin：速度只保留沿力方向的分量，反向时清零
    fn mdmin_step(&self, velocity: &mut Option<Vec<f64>>, forces: &[f64]) -> Vec<f64> {
        let first_step = velocity.is_none();
        let v = velocity.get_or_insert_with(|| vec![0.0; forces.len()]);
        let ff = dot(forces, forces);

        if !first_step && ff > 0.0 {
            for (vi, fi) in v.iter_mut().zip(forces) {
                *vi += 0.5 * self.dt * fi;
            }
            let vf = dot(v, forces);
            if vf < 0.0 {
                v.iter_mut().for_each(|vi| *vi = 0.0);
            } else {
                for (vi, fi) in v.iter_mut().zip(forces) {
                    *vi = fi * vf / ff;
                }
            }
        }

        for (vi, fi) in v.iter_mut().zip(forces) {
            *vi += 0.5 * self.dt * fi;
        }

        let mut dr: Vec<f64> = v.iter().map(|vi| self.dt * vi).collect();
        let largest = max_atomic_norm(&dr);
        if largest > self.max_step {
            let scale = self.max_step / largest;
            dr.iter_mut().for_each(|d| *d *= scale);
        }
        dr
    }
}

impl PathInterpolator for IdppInterpolator {
    fn interpolate(
        &self,
        initial: &Structure,
        final_: &Structure,
        nimages: usize,
    ) -> Result<Interpolation> {
        ensure_compatible(initial, final_)?;

        let interior = linear_path(initial, final_, nimages);
        if nimages == 0 {
            return Ok(Interpolation {
                images: assemble_images(initial, final_, &interior)?,
                relaxation: None,
            });
        }

        let mut path: Vec<Vec<f64>> = Vec::with_capacity(nimages + 2);
        path.push(flatten(&initial.positions()));
        path.extend(interior.iter().map(|pos| flatten(pos)));
        path.push(flatten(&final_.positions()));

        let d_init = distance_matrix(&path[0]);
        let d_final = distance_matrix(&path[nimages + 1]);
        let segments = (nimages + 1) as f64;
        let targets: Vec<Vec<f64>> = (0..nimages + 2)
            .map(|i| {
                let t = i as f64 / segments;
                d_init
                    .iter()
                    .zip(&d_final)
                    .map(|(a, b)| a + t * (b - a))
                    .collect()
            })
            .collect();

        let report = self.relax(&mut path, &targets);

        let relaxed: Vec<Vec<[f64; 3]>> =
            path[1..=nimages].iter().map(|p| unflatten(p)).collect();

        Ok(Interpolation {
            images: assemble_images(initial, final_, &relaxed)?,
            relaxation: Some(report),
        })
    }
}

// ─────────────────────────────────────────────────────────────
// IDPP 目标函数与 NEB 力
// ─────────────────────────────────────────────────────────────

/// 原子间距矩阵 (N×N，按行展开)
fn distance_matrix(pos: &[f64]) -> Vec<f64> {
    let n = pos.len() / 3;
    let mut d = vec![0.0; n * n];
    for a in 0..n {
        for b in (a + 1)..n {
            let dist = norm(&sub(&pos[3 * b..3 * b + 3], &pos[3 * a..3 * a + 3]));
            d[a * n + b] = dist;
            d[b * n + a] = dist;
        }
    }
    d
}

/// IDPP 能量与力
fn idpp_energy_forces(pos: &[f64], target: &[f64]) -> (f64, Vec<f64>) {
    let n = pos.len() / 3;
    let mut energy = 0.0;
    let mut forces = vec![0.0; pos.len()];

    for a in 0..n {
        for b in (a + 1)..n {
            let r = sub(&pos[3 * b..3 * b + 3], &pos[3 * a..3 * a + 3]);
            let d = norm(&r);
            // 重合原子无定义
            if d < 1e-10 {
                continue;
            }
            let dd = d - target[a * n + b];
            let d4 = d.powi(4);
            energy += dd * dd / d4;

            // -dE/dd * (r / d)
            let coeff = -2.0 * dd * (1.0 - 2.0 * dd / d) / (d4 * d);
            for k in 0..3 {
                forces[3 * b + k] += coeff * r[k];
                forces[3 * a + k] -= coeff * r[k];
            }
        }
    }

    (energy, forces)
}

/// 第 i 个镜像的 NEB 力：垂直于切线的真实力 + 沿切线的弹簧力
fn neb_force(
    path: &[Vec<f64>],
    evaluated: &[(f64, Vec<f64>)],
    i: usize,
    spring: f64,
) -> Vec<f64> {
    let tau_plus = sub(&path[i + 1], &path[i]);
    let tau_minus = sub(&path[i], &path[i - 1]);
    let tangent = improved_tangent(
        &tau_plus,
        &tau_minus,
        evaluated[i - 1].0,
        evaluated[i].0,
        evaluated[i + 1].0,
    );

    let force = &evaluated[i].1;
    let parallel = dot(force, &tangent);
    let spring_mag = spring * (norm(&tau_plus) - norm(&tau_minus));

    force
        .iter()
        .zip(&tangent)
        .map(|(f, t)| f - parallel * t + spring_mag * t)
        .collect()
}

/// Henkelman & Jónsson 改进切线
fn improved_tangent(
    tau_plus: &[f64],
    tau_minus: &[f64],
    e_prev: f64,
    e_curr: f64,
    e_next: f64,
) -> Vec<f64> {
    let tangent: Vec<f64> = if e_next > e_curr && e_curr > e_prev {
        tau_plus.to_vec()
    } else if e_next < e_curr && e_curr < e_prev {
        tau_minus.to_vec()
    } else {
        let dv_next = (e_next - e_curr).abs();
        let dv_prev = (e_prev - e_curr).abs();
        let dv_max = dv_next.max(dv_prev);
        let dv_min = dv_next.min(dv_prev);
        let (w_plus, w_minus) = if e_next > e_prev {
            (dv_max, dv_min)
        } else {
            (dv_min, dv_max)
        };
        let mixed: Vec<f64> = tau_plus
            .iter()
            .zip(tau_minus)
            .map(|(p, m)| w_plus * p + w_minus * m)
            .collect();
        // 能量完全相同时退化为两段之和
        if norm(&mixed) > 0.0 {
            mixed
        } else {
            tau_plus.iter().zip(tau_minus).map(|(p, m)| p + m).collect()
        }
    };

    let length = norm(&tangent);
    if length > 0.0 {
        tangent.iter().map(|t| t / length).collect()
    } else {
        tangent
    }
}

// ─────────────────────────────────────────────────────────────
// 向量工具
// ─────────────────────────────────────────────────────────────

fn flatten(positions: &[[f64; 3]]) -> Vec<f64> {
    positions.iter().flat_map(|p| p.iter().copied()).collect()
}

fn unflatten(flat: &[f64]) -> Vec<[f64; 3]> {
    flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}

fn sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// 逐原子力的最大模长
fn max_atomic_norm(flat: &[f64]) -> f64 {
    flat.chunks_exact(3).map(norm).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Species, SpeciesTable};

    fn dimer(p0: [f64; 3], p1: [f64; 3]) -> Structure {
        let species = SpeciesTable::new(vec![Species::new(1, "H")]);
        Structure::new("h2", species, vec![Atom::new("H", p0), Atom::new("H", p1)])
    }

    fn triatomic(shift: [f64; 3]) -> Structure {
        let species = SpeciesTable::new(vec![Species::new(8, "O"), Species::new(1, "H")]);
        let base = [[0.0, 0.0, 0.0], [0.757, 0.586, 0.0], [-0.757, 0.586, 0.0]];
        let atoms = ["O", "H", "H"]
            .iter()
            .zip(base.iter())
            .map(|(s, p)| Atom::new(*s, [p[0] + shift[0], p[1] + shift[1], p[2] + shift[2]]))
            .collect();
        Structure::new("water", species, atoms)
    }

    #[test]
    fn test_forces_match_finite_difference() {
        let pos = vec![0.0, 0.0, 0.0, 1.1, 0.2, -0.1, -0.3, 0.9, 0.4];
        let target = distance_matrix(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let (_, forces) = idpp_energy_forces(&pos, &target);

        let h = 1e-6;
        for idx in 0..pos.len() {
            let mut plus = pos.clone();
            let mut minus = pos.clone();
            plus[idx] += h;
            minus[idx] -= h;
            let numeric =
                -(idpp_energy_forces(&plus, &target).0 - idpp_energy_forces(&minus, &target).0)
                    / (2.0 * h);
            assert!(
                (numeric - forces[idx]).abs() < 1e-5,
                "component {}: analytic {} vs numeric {}",
                idx,
                forces[idx],
                numeric
            );
        }
    }

    #[test]
    fn test_energy_zero_at_target() {
        let pos = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let target = distance_matrix(&pos);
        let (energy, forces) = idpp_energy_forces(&pos, &target);
        assert!(energy.abs() < 1e-15);
        assert!(forces.iter().all(|f| f.abs() < 1e-15));
    }

    #[test]
    fn test_rigid_translation_matches_linear() {
        let initial = triatomic([0.0, 0.0, 0.0]);
        let final_ = triatomic([1.0, -0.5, 2.0]);
        let result = IdppInterpolator::default()
            .interpolate(&initial, &final_, 3)
            .unwrap();

        let report = result.relaxation.unwrap();
        assert!(report.converged);
        assert_eq!(report.steps, 0);

        let linear = linear_path(&initial, &final_, 3);
        for (image, expected) in result.images.images()[1..4].iter().zip(&linear) {
            for (atom, pos) in image.atoms.iter().zip(expected) {
                for k in 0..3 {
                    assert!((atom.position[k] - pos[k]).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_rotation_keeps_bond_length() {
        // 键绕原子 0 转 90°：线性插值在中点把键长压缩到 0.707
        let initial = dimer([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let final_ = dimer([0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let result = IdppInterpolator::default()
            .interpolate(&initial, &final_, 1)
            .unwrap();

        let middle = &result.images.images()[1];
        let d = norm(&sub(&middle.atoms[1].position, &middle.atoms[0].position));
        assert!(d > 0.85, "bond length {} not restored", d);
    }

    #[test]
    fn test_endpoints_untouched() {
        let initial = dimer([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let final_ = dimer([0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let result = IdppInterpolator::default()
            .interpolate(&initial, &final_, 4)
            .unwrap();
        assert_eq!(result.images.len(), 6);
        assert_eq!(result.images.first(), &initial);
        assert_eq!(result.images.last(), &final_);
    }

    #[test]
    fn test_zero_images_skips_relaxation() {
        let initial = dimer([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let final_ = dimer([0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let result = IdppInterpolator::default()
            .interpolate(&initial, &final_, 0)
            .unwrap();
        assert_eq!(result.images.len(), 2);
        assert!(result.relaxation.is_none());
    }

    #[test]
    fn test_default_optimizer_settings() {
        let idpp = IdppInterpolator::new(100, 0.1).unwrap();
        assert_eq!(idpp.dt, 0.2);
        assert_eq!(idpp.max_step, 0.2);
        assert_eq!(idpp.spring, 0.1);
        assert_eq!(idpp.steps, 100);
    }

    #[test]
    fn test_invalid_fmax() {
        assert!(IdppInterpolator::new(100, 0.0).is_err());
        assert!(IdppInterpolator::new(100, f64::NAN).is_err());
    }

    #[test]
    fn test_tangent_is_normalized() {
        let t = improved_tangent(&[1.0, 0.0, 0.0], &[0.0, 2.0, 0.0], 0.0, 1.0, 0.5);
        assert!((norm(&t) - 1.0).abs() < 1e-12);
    }
}
