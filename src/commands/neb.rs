//! # neb 子命令实现
//!
//! 读取初末态 `.fdf`，在两者之间插值生成 NEB 镜像并写出 XYZ 轨迹。
//!
//! ## 流程
//! 1. 读取 `<dir>/<initial>.fdf` 与 `<dir>/<final>.fdf`
//! 2. 检查两端原子数与元素顺序一致
//! 3. 线性插值或 IDPP 插值
//! 4. 写出 `images_<method><i>.xyz` 与 `images_<method>_Animation.xyz`
//!
//! ## 依赖关系
//! - 使用 `cli/neb.rs` 定义的 NebArgs
//! - 使用 `parsers/fdf.rs` 读取结构
//! - 使用 `neb/` 模块插值与写出

use crate::cli::neb::{InterpolationMethod, NebArgs};
use crate::error::{Result, SiestoolError};
use crate::models::{ensure_compatible, Structure};
use crate::neb::{xyz, IdppInterpolator, LinearInterpolator, PathInterpolator};
use crate::parsers::fdf;
use crate::utils::{output, progress};

use std::path::Path;
use tabled::{Table, Tabled};

/// 端点结构摘要行
#[derive(Debug, Clone, Tabled)]
struct EndpointRow {
    #[tabled(rename = "Endpoint")]
    endpoint: &'static str,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "SystemLabel")]
    label: String,
    #[tabled(rename = "Nspecies")]
    num_species: usize,
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "Atoms")]
    atoms: usize,
}

impl EndpointRow {
    fn new(endpoint: &'static str, file: &Path, structure: &Structure) -> Self {
        let species: Vec<&str> = structure.species.iter().map(|s| s.symbol.as_str()).collect();
        EndpointRow {
            endpoint,
            file: file.display().to_string(),
            label: structure.label.clone(),
            num_species: structure.num_species(),
            species: species.join(" "),
            atoms: structure.num_atoms(),
        }
    }
}

/// 执行 NEB 镜像生成
pub fn execute(args: NebArgs) -> Result<()> {
    output::print_header("NEB Image Generation");

    if !args.directory.is_dir() {
        return Err(SiestoolError::DirectoryNotFound {
            path: args.directory.display().to_string(),
        });
    }

    // 设置并行度
    let num_threads = if args.jobs == 0 {
        num_cpus::get()
    } else {
        args.jobs
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .ok();

    let initial_path = args.directory.join(format!("{}.fdf", args.initial_file));
    let final_path = args.directory.join(format!("{}.fdf", args.final_file));

    let initial = read_endpoint(&initial_path)?;
    let final_ = read_endpoint(&final_path)?;

    let rows = vec![
        EndpointRow::new("initial", &initial_path, &initial),
        EndpointRow::new("final", &final_path, &final_),
    ];
    println!("{}", Table::new(&rows));

    ensure_compatible(&initial, &final_)?;

    output::print_info(&format!(
        "Interpolating {} intermediate images ({})",
        args.nimages, args.method
    ));

    let interpolator: Box<dyn PathInterpolator> = match args.method {
        InterpolationMethod::Li => Box::new(LinearInterpolator),
        InterpolationMethod::Idpp => {
            Box::new(IdppInterpolator::new(args.idpp_steps, args.idpp_fmax)?)
        }
    };

    let spinner = progress::create_spinner("Interpolating");
    let result = interpolator.interpolate(&initial, &final_, args.nimages);
    spinner.finish_and_clear();
    let interpolation = result?;

    if let Some(report) = interpolation.relaxation {
        let msg = format!(
            "IDPP relaxation: {} steps, max force {:.4} eV/Å",
            report.steps, report.max_force
        );
        if report.converged {
            output::print_success(&msg);
        } else {
            output::print_warning(&format!(
                "{} (not converged to fmax = {})",
                msg, args.idpp_fmax
            ));
        }
    }

    let images = &interpolation.images;
    output::print_info(&format!(
        "Path: '{}' ({} atoms) -> '{}' ({} atoms)",
        images.first().label,
        images.first().num_atoms(),
        images.last().label,
        images.last().num_atoms()
    ));

    let method = args.method.to_string();
    let files = xyz::write_trajectory(&args.directory, &method, &interpolation.images)?;

    for path in &files.images {
        output::print_success(&format!("Wrote '{}'", path.display()));
    }

    output::print_done(&format!(
        "{} images ({} intermediate) written, animation in '{}'",
        files.images.len(),
        interpolation.images.num_intermediate(),
        files.animation.display()
    ));

    Ok(())
}

/// 读取端点结构
fn read_endpoint(path: &Path) -> Result<Structure> {
    if !path.is_file() {
        return Err(SiestoolError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    fdf::parse_fdf_file(path)?.into_structure()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn fdf_text(label: &str, x: f64) -> String {
        format!(
            "SystemLabel {label}\n\
             NumberOfSpecies 2\n\
             NumberOfAtoms 2\n\
             %block ChemicalSpeciesLabel\n\
             1 6 C.gga\n\
             2 8 O\n\
             %endblock ChemicalSpeciesLabel\n\
             %block AtomicCoordinatesAndAtomicSpecies\n\
             0.0 0.0 0.0 1\n\
             {x} 0.0 0.0 2\n\
             %endblock AtomicCoordinatesAndAtomicSpecies\n"
        )
    }

    fn args(dir: PathBuf, method: InterpolationMethod) -> NebArgs {
        NebArgs {
            directory: dir,
            nimages: 3,
            initial_file: "initial".to_string(),
            final_file: "final".to_string(),
            method,
            idpp_steps: 20,
            idpp_fmax: 0.1,
            jobs: 1,
        }
    }

    #[test]
    fn test_execute_linear() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("initial.fdf"), fdf_text("co", 1.1)).unwrap();
        fs::write(dir.path().join("final.fdf"), fdf_text("co", 1.5)).unwrap();

        execute(args(dir.path().to_path_buf(), InterpolationMethod::Li)).unwrap();

        for i in 0..5 {
            assert!(dir.path().join(format!("images_li{}.xyz", i)).exists());
        }
        let middle = fs::read_to_string(dir.path().join("images_li2.xyz")).unwrap();
        assert!(middle.contains("O\t1.30000000\t0.00000000\t0.00000000"));
        assert!(dir.path().join("images_li_Animation.xyz").exists());
    }

    #[test]
    fn test_execute_idpp() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("initial.fdf"), fdf_text("co", 1.1)).unwrap();
        fs::write(dir.path().join("final.fdf"), fdf_text("co", 1.5)).unwrap();

        execute(args(dir.path().to_path_buf(), InterpolationMethod::Idpp)).unwrap();

        let animation = fs::read_to_string(dir.path().join("images_idpp_Animation.xyz")).unwrap();
        assert_eq!(animation.matches("Image_").count(), 5);
    }

    #[test]
    fn test_endpoint_row_counts_species() {
        let structure = fdf::parse_fdf_content(&fdf_text("co", 1.1), "initial.fdf")
            .unwrap()
            .into_structure()
            .unwrap();
        let row = EndpointRow::new("initial", Path::new("initial.fdf"), &structure);
        assert_eq!(row.num_species, 2);
        assert_eq!(row.species, "C O");
        assert_eq!(row.atoms, 2);
    }

    #[test]
    fn test_missing_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("initial.fdf"), fdf_text("co", 1.1)).unwrap();

        let err = execute(args(dir.path().to_path_buf(), InterpolationMethod::Li)).unwrap_err();
        assert!(matches!(err, SiestoolError::FileNotFound { .. }));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(args(dir.path().join("nope"), InterpolationMethod::Li)).unwrap_err();
        assert!(matches!(err, SiestoolError::DirectoryNotFound { .. }));
    }
}
