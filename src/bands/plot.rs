//! # 能带图生成
//!
//! 分两步：
//! - `BandPlot::build` 纯计算，给出每条能带的折线、坐标范围、费米线和高对称点刻度
//! - `BandPlotRenderer` 负责实际绘制，默认实现使用 `plotters` (PNG/SVG)
//!
//! x 轴范围从第一个高对称点到第 `xmax_point` 个（默认 2，即第三个），
//! y 轴范围为费米能 ± window。
//!
//! ## 依赖关系
//! - 被 `commands/bands.rs` 调用
//! - 使用 `models/bands.rs`
//! - 使用 `plotters` 渲染图表

use crate::error::{Result, SiestoolError};
use crate::models::{BandTable, BandsHeader, Spin, SpinChannel};

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

/// matplotlib 默认色环
const BAND_COLORS: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// 绘图参数
#[derive(Debug, Clone, Copy)]
pub struct PlotOptions {
    /// 费米能上下的能量窗口 (eV)
    pub window: f64,
    /// 作为 x 轴终点的高对称点索引
    pub xmax_point: usize,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            window: 5.0,
            xmax_point: 2,
        }
    }
}

/// x 轴刻度
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

/// 一张能带图的完整描述
#[derive(Debug, Clone, PartialEq)]
pub struct BandPlot {
    pub title: String,
    /// 每条能带裁剪后的折线段
    pub bands: Vec<Vec<Vec<(f64, f64)>>>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub fermi_energy: f64,
    pub ticks: Vec<Tick>,
}

impl BandPlot {
    pub fn build(
        spin: Spin,
        channel: &SpinChannel,
        header: &BandsHeader,
        table: &BandTable,
        options: &PlotOptions,
    ) -> Result<BandPlot> {
        if header.nbands == 0 {
            return Err(SiestoolError::InvalidFormat(
                "band output declares zero bands".to_string(),
            ));
        }
        if options.window.is_nan() || options.window <= 0.0 {
            return Err(SiestoolError::InvalidArgument(format!(
                "energy window must be positive, got {}",
                options.window
            )));
        }

        let (x_range, ticks) = x_axis(table, options.xmax_point)?;
        let fermi = table.fermi_energy;
        let y_range = (fermi - options.window, fermi + options.window);

        let bands = channel
            .bands(header.nbands)
            .iter()
            .map(|band| clip_polyline(band, x_range, y_range))
            .collect();

        Ok(BandPlot {
            title: format!("{} Bandstructure", spin),
            bands,
            x_range,
            y_range,
            fermi_energy: fermi,
            ticks,
        })
    }
}

/// 能带点数不能被能带数整除时为 true（多余的点会被截断）
pub fn is_uneven(channel: &SpinChannel, nbands: usize) -> bool {
    nbands != 0 && channel.len() % nbands != 0
}

/// x 轴范围与刻度
fn x_axis(table: &BandTable, xmax_point: usize) -> Result<((f64, f64), Vec<Tick>)> {
    let points = &table.symmetry_points;
    if points.is_empty() {
        return checked_range(table.k_range).map(|r| (r, Vec::new()));
    }

    let end = xmax_point.min(points.len() - 1);
    let x_range = if end == 0 {
        (points[0].position, table.k_range.1)
    } else {
        (points[0].position, points[end].position)
    };

    let ticks = points[..=end]
        .iter()
        .map(|p| Tick {
            position: p.position,
            label: display_label(&p.label),
        })
        .collect();

    Ok((checked_range(x_range)?, ticks))
}

fn checked_range(range: (f64, f64)) -> Result<(f64, f64)> {
    if range.1 > range.0 {
        Ok(range)
    } else {
        Err(SiestoolError::InvalidFormat(format!(
            "empty k-path range [{}, {}]",
            range.0, range.1
        )))
    }
}

fn display_label(label: &str) -> String {
    if label.eq_ignore_ascii_case("gamma") {
        "Γ".to_string()
    } else {
        label.to_string()
    }
}

/// 将折线裁剪到矩形内，越界处断开
fn clip_polyline(
    points: &[(f64, f64)],
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    for pair in points.windows(2) {
        match clip_segment(pair[0], pair[1], x_range, y_range) {
            Some((a, b)) => {
                if current.last() != Some(&a) {
                    flush(&mut segments, &mut current);
                    current.push(a);
                }
                current.push(b);
            }
            None => flush(&mut segments, &mut current),
        }
    }
    flush(&mut segments, &mut current);

    segments
}

fn flush(segments: &mut Vec<Vec<(f64, f64)>>, current: &mut Vec<(f64, f64)>) {
    if current.len() > 1 {
        segments.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

/// Liang–Barsky 线段裁剪
fn clip_segment(
    p0: (f64, f64),
    p1: (f64, f64),
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let dx = p1.0 - p0.0;
    let dy = p1.1 - p0.1;
    let mut t0 = 0.0;
    let mut t1 = 1.0;

    let edges = [
        (-dx, p0.0 - x_range.0),
        (dx, x_range.1 - p0.0),
        (-dy, p0.1 - y_range.0),
        (dy, y_range.1 - p0.1),
    ];

    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                if r > t0 {
                    t0 = r;
                }
            } else {
                if r < t0 {
                    return None;
                }
                if r < t1 {
                    t1 = r;
                }
            }
        }
    }

    Some((
        (p0.0 + t0 * dx, p0.1 + t0 * dy),
        (p0.0 + t1 * dx, p0.1 + t1 * dy),
    ))
}

// ─────────────────────────────────────────────────────────────
// 渲染
// ─────────────────────────────────────────────────────────────

/// 能带图渲染接口
pub trait BandPlotRenderer {
    fn render(&self, plot: &BandPlot, output_path: &Path) -> Result<()>;
}

/// 基于 plotters 的渲染器
#[derive(Debug, Clone, Copy)]
pub struct PlottersRenderer {
    pub width: u32,
    pub height: u32,
    pub use_svg: bool,
}

impl BandPlotRenderer for PlottersRenderer {
    fn render(&self, plot: &BandPlot, output_path: &Path) -> Result<()> {
        if self.use_svg {
            let root = SVGBackend::new(output_path, (self.width, self.height)).into_drawing_area();
            draw_band_chart(&root, plot)?;
            root.present()
                .map_err(|e| SiestoolError::PlotError(e.to_string()))?;
        } else {
            let root =
                BitMapBackend::new(output_path, (self.width, self.height)).into_drawing_area();
            draw_band_chart(&root, plot)?;
            root.present()
                .map_err(|e| SiestoolError::PlotError(e.to_string()))?;
        }
        Ok(())
    }
}

/// 绘制能带图的核心逻辑
fn draw_band_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    plot: &BandPlot,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| SiestoolError::PlotError(format!("{:?}", e)))?;

    let (x0, x1) = plot.x_range;
    let (y0, y1) = plot.y_range;

    let mut chart = ChartBuilder::on(root)
        .caption(&plot.title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(|e| SiestoolError::PlotError(format!("{:?}", e)))?;

    // x 轴刻度由高对称点给出
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc("First Brillouin Zone")
        .y_desc("Energy [eV]")
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| SiestoolError::PlotError(format!("{:?}", e)))?;

    let grid_color = RGBColor(180, 180, 180);
    for tick in &plot.ticks {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(tick.position, y0), (tick.position, y1)],
                grid_color.stroke_width(1),
            )))
            .map_err(|e| SiestoolError::PlotError(format!("{:?}", e)))?;
    }

    for (i, band) in plot.bands.iter().enumerate() {
        let color = BAND_COLORS[i % BAND_COLORS.len()];
        for segment in band {
            chart
                .draw_series(LineSeries::new(
                    segment.iter().copied(),
                    color.stroke_width(2),
                ))
                .map_err(|e| SiestoolError::PlotError(format!("{:?}", e)))?;
        }
    }

    chart
        .draw_series(LineSeries::new(
            vec![(x0, plot.fermi_energy), (x1, plot.fermi_energy)],
            MAGENTA.stroke_width(1),
        ))
        .map_err(|e| SiestoolError::PlotError(format!("{:?}", e)))?;

    let label_style = ("sans-serif", 18)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    for tick in &plot.ticks {
        let (px, py) = chart.backend_coord(&(tick.position, y0));
        root.draw(&Text::new(tick.label.clone(), (px, py + 8), label_style.clone()))
            .map_err(|e| SiestoolError::PlotError(format!("{:?}", e)))?;
    }

    Ok(())
}
