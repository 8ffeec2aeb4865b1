//! Delay-rate line chart written as SVG.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::aggregate::KpiReport;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 130.0;
const Y_TICKS: usize = 5;

/// File name of the chart for a dimension
pub fn chart_file_name(dimension: &str) -> String {
    format!("delay_rate_by_{}.svg", dimension)
}

/// Write `delay_rate_by_<dimension>.svg` under `out_dir`.
///
/// Skipped (returns `Ok(None)`) for ungrouped reports or a single group.
pub fn export_delay_rate_chart(report: &KpiReport, out_dir: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    if !report.is_grouped() || report.groups.len() <= 1 {
        debug!("Skipping chart: {} groups", report.groups.len());
        return Ok(None);
    }

    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create output directory {}", out_dir.display()))?;

    let path = out_dir.join(chart_file_name(&report.dimension));
    let svg = render_delay_rate_svg(report);

    let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(svg.as_bytes())?;
    writer.flush()?;

    debug!("Wrote {} bytes to {}", svg.len(), path.display());
    Ok(Some(path))
}

/// Render the delay rate of each group, in report order, as an SVG line chart.
pub fn render_delay_rate_svg(report: &KpiReport) -> String {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let n = report.groups.len();

    let max_rate = report
        .groups
        .iter()
        .map(|g| g.delay_rate)
        .fold(0.0_f64, f64::max);
    let y_max = if max_rate > 0.0 { max_rate } else { 1.0 };

    let x_at = |i: usize| {
        if n > 1 {
            MARGIN_LEFT + plot_w * i as f64 / (n - 1) as f64
        } else {
            MARGIN_LEFT + plot_w / 2.0
        }
    };
    let y_at = |rate: f64| MARGIN_TOP + plot_h * (1.0 - rate / y_max);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif" font-size="11">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="20" text-anchor="middle" font-size="14">delay_rate by {}</text>"#,
        WIDTH / 2.0,
        escape(&report.dimension)
    );

    // axes
    let bottom = MARGIN_TOP + plot_h;
    let _ = writeln!(
        svg,
        r#"<path d="M{MARGIN_LEFT},{MARGIN_TOP} V{bottom} H{}" stroke="black" fill="none"/>"#,
        MARGIN_LEFT + plot_w
    );
    for t in 0..=Y_TICKS {
        let value = y_max * t as f64 / Y_TICKS as f64;
        let y = y_at(value);
        let _ = writeln!(
            svg,
            r#"<line x1="{}" y1="{y:.1}" x2="{MARGIN_LEFT}" y2="{y:.1}" stroke="black"/><text x="{}" y="{:.1}" text-anchor="end">{value:.3}</text>"#,
            MARGIN_LEFT - 4.0,
            MARGIN_LEFT - 6.0,
            y + 4.0
        );
    }

    for (i, g) in report.groups.iter().enumerate() {
        let x = x_at(i);
        let _ = writeln!(
            svg,
            r#"<text x="{x:.1}" y="{:.1}" text-anchor="end" transform="rotate(-45 {x:.1} {:.1})">{}</text>"#,
            bottom + 14.0,
            bottom + 14.0,
            escape(&g.label.to_string())
        );
    }

    let points: Vec<String> = report
        .groups
        .iter()
        .enumerate()
        .map(|(i, g)| format!("{:.1},{:.1}", x_at(i), y_at(g.delay_rate)))
        .collect();
    let _ = writeln!(
        svg,
        r##"<polyline points="{}" fill="none" stroke="#1f77b4" stroke-width="1.5"/>"##,
        points.join(" ")
    );

    svg.push_str("</svg>\n");
    svg
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
