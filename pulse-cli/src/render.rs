use anyhow::Result;
use colored::Colorize;
use pulse_core::{BarChart, Dashboard, Gauge, LineChart};
use std::io::Write;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const BAR_WIDTH: usize = 30;
const SPARK_WIDTH: usize = 40;
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Draws dashboard frames to a terminal.
///
/// Each frame clears the screen and redraws every widget, so the terminal
/// always shows the latest state only.
pub struct Renderer {
    out: Box<dyn Write + Send>,
    color: bool,
}

impl Renderer {
    pub fn new(out: Box<dyn Write + Send>, color: bool) -> Self {
        Self { out, color }
    }

    pub fn draw(&mut self, dashboard: &Dashboard) -> Result<()> {
        let frame = render_frame(dashboard, self.color);
        self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Full text of one frame.
pub fn render_frame(dashboard: &Dashboard, color: bool) -> String {
    let charts = dashboard.charts();
    let status = dashboard.status();
    let mut lines = Vec::new();

    let dot_color = if status.status().is_connected() {
        "#10b981"
    } else {
        "#ef4444"
    };
    lines.push(format!(
        "{}  {} {}",
        paint(dashboard.title(), None, color, true),
        paint("●", Some(dot_color), color, false),
        status.text()
    ));
    lines.push(format!(
        "Last update: {}",
        charts.last_update().unwrap_or("never")
    ));
    lines.push(String::new());

    lines.push(render_gauge(charts.cpu(), color));
    lines.push(render_gauge(charts.memory(), color));
    lines.push(String::new());

    lines.extend(render_line_chart(charts.network(), color));
    lines.push(String::new());
    lines.extend(render_line_chart(charts.disk_io(), color));
    lines.push(String::new());

    lines.extend(render_bar_chart(charts.disk_usage(), color));

    let mut frame = lines.join("\n");
    frame.push('\n');
    frame
}

fn render_gauge(gauge: &Gauge, color: bool) -> String {
    let [value_color, track_color] = gauge.colors();
    let filled = filled_cells(gauge.value, BAR_WIDTH);
    format!(
        "{:<14}[{}{}] {:>5.1}%",
        gauge.label,
        paint(&"█".repeat(filled), Some(value_color), color, false),
        paint(&"░".repeat(BAR_WIDTH - filled), Some(track_color), color, false),
        gauge.value
    )
}

fn render_line_chart(chart: &LineChart, color: bool) -> Vec<String> {
    let mut lines = vec![paint(&chart.title, None, color, true)];
    let peak = chart
        .datasets()
        .iter()
        .flat_map(|d| d.values().iter().copied())
        .fold(0.0_f64, f64::max);

    for dataset in chart.datasets() {
        let latest = dataset
            .latest()
            .map(format_rate)
            .unwrap_or_else(|| "-".to_string());
        let spark = sparkline(dataset.values().iter().copied(), peak, SPARK_WIDTH);
        lines.push(format!(
            "  {:<20}{:>12}  {}",
            dataset.label,
            latest,
            paint(&spark, Some(dataset.color), color, false)
        ));
    }
    lines
}

fn render_bar_chart(chart: &BarChart, color: bool) -> Vec<String> {
    let mut lines = vec![paint(&chart.title, None, color, true)];
    if chart.is_empty() {
        lines.push("  (no disks reported)".to_string());
        return lines;
    }

    let label_width = chart.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    for (label, value) in chart.bars() {
        let filled = filled_cells(value, BAR_WIDTH);
        lines.push(format!(
            "  {:<width$} [{}{}] {:>5.1}%",
            label,
            paint(&"█".repeat(filled), Some("#667eea"), color, false),
            " ".repeat(BAR_WIDTH - filled),
            value,
            width = label_width
        ));
    }
    lines
}

fn filled_cells(percent: f64, width: usize) -> usize {
    let fraction = (percent / 100.0).clamp(0.0, 1.0);
    (fraction * width as f64).round() as usize
}

/// Human-readable bytes per second, in binary units.
pub fn format_rate(bytes_per_sec: f64) -> String {
    const UNITS: [&str; 5] = ["B/s", "KiB/s", "MiB/s", "GiB/s", "TiB/s"];

    let mut value = bytes_per_sec.max(0.0);
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{:.0} {}", value, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// One block character per value, scaled against `peak`; only the newest
/// `width` values are shown.
pub fn sparkline<I>(values: I, peak: f64, width: usize) -> String
where
    I: ExactSizeIterator<Item = f64>,
{
    let skip = values.len().saturating_sub(width);
    values
        .skip(skip)
        .map(|value| {
            if peak <= 0.0 {
                return SPARKS[0];
            }
            let level = ((value / peak).clamp(0.0, 1.0) * (SPARKS.len() - 1) as f64).round();
            SPARKS[level as usize]
        })
        .collect()
}

fn paint(text: &str, hex: Option<&str>, color: bool, bold: bool) -> String {
    if !color {
        return text.to_string();
    }
    let mut styled = text.normal();
    if let Some((r, g, b)) = hex.and_then(parse_hex) {
        styled = styled.truecolor(r, g, b);
    }
    if bold {
        styled = styled.bold();
    }
    styled.to_string()
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
