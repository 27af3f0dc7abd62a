use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    bench::load_rows,
    error::{PlotError, Result},
    group::{BenchmarkGroup, group_rows},
    setting::{BarColor, Setting},
};

pub const DEFAULT_OUTPUT_DIR: &str = "benchmark_plots";
pub const X_LABEL: &str = "setting | dataset";
pub const Y_LABEL: &str = "benchmark_time";

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: BarColor,
}

impl Bar {
    /// Text drawn on top of the bar
    pub fn annotation(&self) -> String {
        format!("{:.2}", self.value)
    }
}

/// Everything needed to draw one benchmark's chart, independent of the backend
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub name: String,
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub bars: Vec<Bar>,
}

impl BarChart {
    /// Fails on the first row whose setting is not one of [`Setting::ALL`]
    pub fn from_group(group: &BenchmarkGroup) -> Result<Self> {
        let bars = group
            .rows
            .iter()
            .map(|row| -> Result<Bar> {
                let setting: Setting = row.setting.parse()?;
                Ok(Bar {
                    label: format!("{} | {}", setting.display(), row.dataset),
                    value: row.benchmark_time,
                    color: setting.color(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BarChart {
            name: group.name.clone(),
            title: format!("Benchmark: {}", group.name),
            x_label: X_LABEL,
            y_label: Y_LABEL,
            bars,
        })
    }
}

pub trait ChartRenderer {
    /// Draws `chart` and writes it to `path`. The drawing surface must not
    /// outlive this call.
    fn render(&mut self, chart: &BarChart, path: &Path) -> Result<()>;
}

pub fn chart_path(output_dir: &Path, benchmark_name: &str) -> PathBuf {
    output_dir.join(format!("{benchmark_name}.png"))
}

/// Renders one chart per benchmark in `csv_path` into `output_dir`.
///
/// Returns the absolute path of `output_dir`. Charts written before a failing
/// group are left in place.
pub fn plot_benchmarks<R: ChartRenderer>(
    csv_path: &Path,
    output_dir: &Path,
    renderer: &mut R,
) -> Result<PathBuf> {
    let rows = load_rows(csv_path)?;
    info!("Read {} rows from {csv_path:?}", rows.len());

    let groups = group_rows(rows);
    info!("Got {} benchmarks", groups.len());

    fs::create_dir_all(output_dir).map_err(|e| PlotError::io(output_dir, e))?;

    for group in &groups {
        let chart = BarChart::from_group(group)?;
        debug!("{}: {:?}", chart.name, chart.bars);

        let filepath = chart_path(output_dir, &group.name);
        if let Some(parent) = filepath.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| PlotError::io(parent, e))?;
        }
        renderer.render(&chart, &filepath)?;
        info!("Saved {filepath:?}");
    }

    std::path::absolute(output_dir).map_err(|e| PlotError::io(output_dir, e))
}
