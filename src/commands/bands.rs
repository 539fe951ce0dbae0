//! # bands 子命令实现
//!
//! 从 `input.fdf` 的 SystemLabel 找到 `<label>.bands`，调用 gnubands
//! 提取能带，按自旋通道拆分后绘图。
//!
//! ## 输出 (位于 `--output-dir`)
//! - `bandoutput`: gnubands 原始输出
//! - `bandstructure-up.<ext>` / `bandstructure-down.<ext>`
//! - `bands-up.csv` / `bands-down.csv` (`--csv`)
//!
//! ## 依赖关系
//! - 使用 `cli/bands.rs` 定义的 BandsArgs
//! - 使用 `parsers/` 读取 fdf、bands 与 gnubands 输出
//! - 使用 `bands/` 模块提取、绘图与导出

use crate::bands::plot::is_uneven;
use crate::bands::{
    export, extract, BandExtractor, BandPlot, BandPlotRenderer, EnergyWindow, Gnubands,
    PlotOptions, PlottersRenderer,
};
use crate::cli::bands::{BandsArgs, PlotFormat};
use crate::error::{Result, SiestoolError};
use crate::models::{BandTable, Spin};
use crate::parsers::{bands, fdf, gnubands};
use crate::utils::{output, progress};

use std::fs;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 高对称点表格行
#[derive(Debug, Clone, Tabled)]
struct SymmetryRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "k")]
    position: String,
}

/// 执行能带图绘制
pub fn execute(args: BandsArgs) -> Result<()> {
    let extractor = Gnubands::new(args.gnubands.clone());
    let renderer = PlottersRenderer {
        width: args.width,
        height: args.height,
        use_svg: args.format == PlotFormat::Svg,
    };
    run(&args, &extractor, &renderer)
}

fn run(
    args: &BandsArgs,
    extractor: &dyn BandExtractor,
    renderer: &dyn BandPlotRenderer,
) -> Result<()> {
    output::print_header("Band Structure Plot");

    if !args.input.is_file() {
        return Err(SiestoolError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }

    let label = fdf::read_system_label(&args.input)?;
    let bands_path = bands_file_path(&args.input, &label);
    if !bands_path.is_file() {
        return Err(SiestoolError::FileNotFound {
            path: bands_path.display().to_string(),
        });
    }
    output::print_info(&format!("Reading '{}'", bands_path.display()));

    let table = bands::parse_bands_file(&bands_path)?;
    print_summary(&table);

    if table.symmetry_points.is_empty() {
        output::print_warning("No symmetry points found; using the full k-path");
    } else if args.xmax_point >= table.symmetry_points.len() {
        output::print_warning(&format!(
            "Only {} symmetry points; x axis ends at the last one",
            table.symmetry_points.len()
        ));
    }

    fs::create_dir_all(&args.output_dir).map_err(|e| SiestoolError::FileWriteError {
        path: args.output_dir.display().to_string(),
        source: e,
    })?;

    let window = EnergyWindow::around(table.energy_range);
    let spinner = progress::create_spinner(&format!(
        "Extracting bands in [{}, {}] eV",
        window.emin, window.emax
    ));
    let result = extractor.extract(&bands_path, window);
    spinner.finish_and_clear();
    let raw = result?;

    let raw_path = extract::save_band_output(&args.output_dir, &raw)?;
    output::print_success(&format!("Wrote '{}'", raw_path.display()));

    let data = gnubands::split_spin_channels(&raw, &raw_path.display().to_string())?;
    let header = data.header;
    output::print_info(&format!(
        "Nbands = {}, Nspin = {}, Nk = {} ({} entries)",
        header.nbands,
        header.nspin,
        header.nk,
        header.total()
    ));

    let spins: &[Spin] = if header.is_spin_polarized() {
        &[Spin::Up, Spin::Down]
    } else {
        output::print_warning("Calculation is not spin polarized; only the spin up plot is drawn");
        &[Spin::Up]
    };

    let options = PlotOptions {
        window: args.window,
        xmax_point: args.xmax_point,
    };

    let mut written = 0;
    for &spin in spins {
        let channel = data.channel(spin);
        if channel.is_empty() {
            output::print_warning(&format!("{} channel has no data, skipped", spin));
            continue;
        }
        if is_uneven(channel, header.nbands) {
            output::print_warning(&format!(
                "{}: {} points do not split evenly into {} bands; trailing points dropped",
                spin,
                channel.len(),
                header.nbands
            ));
        }

        let plot = BandPlot::build(spin, channel, &header, &table, &options)?;
        let plot_path = args.output_dir.join(format!(
            "bandstructure-{}.{}",
            spin.suffix(),
            args.format.extension()
        ));
        renderer.render(&plot, &plot_path)?;
        output::print_success(&format!("Wrote '{}'", plot_path.display()));
        written += 1;

        if args.csv {
            let csv_path = args
                .output_dir
                .join(format!("bands-{}.csv", spin.suffix()));
            export::channel_to_csv(channel, header.nbands, &csv_path)?;
            output::print_success(&format!("Wrote '{}'", csv_path.display()));
        }
    }

    output::print_done(&format!(
        "{} band structure plot(s) in '{}'",
        written,
        args.output_dir.display()
    ));

    Ok(())
}

/// `<label>.bands`，与输入文件位于同一目录
fn bands_file_path(input: &Path, label: &str) -> PathBuf {
    let name = format!("{}.bands", label);
    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

fn print_summary(table: &BandTable) {
    output::print_info(&format!("Fermi energy: {:.4} eV", table.fermi_energy));
    output::print_info(&format!(
        "Energy range: [{:.4}, {:.4}] eV",
        table.energy_range.0, table.energy_range.1
    ));

    if table.symmetry_points.is_empty() {
        return;
    }

    let rows: Vec<SymmetryRow> = table
        .symmetry_points
        .iter()
        .enumerate()
        .map(|(i, p)| SymmetryRow {
            index: i,
            label: p.label.clone(),
            position: format!("{:.6}", p.position),
        })
        .collect();
    println!("{}", Table::new(&rows));
}
