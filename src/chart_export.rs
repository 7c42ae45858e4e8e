//! Chart export to PNG (plotters bitmap) and EPS (minimal PostScript, no deps).

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::chart_data::{self, palette_slot, ChartKind};
use crate::config::{parse_hex, AppConfig};
use crate::record::Record;

/// Export format for chart: PNG or EPS.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ChartExportFormat {
    #[default]
    Png,
    Eps,
}

impl ChartExportFormat {
    pub const ALL: [Self; 2] = [Self::Png, Self::Eps];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Eps => "eps",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Eps => "EPS",
        }
    }

    /// Detect from the path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }
}

/// Colors and size for a rendered chart image.
#[derive(Debug, Clone)]
pub struct ChartImageStyle {
    pub width: u32,
    pub height: u32,
    pub line_color: (u8, u8, u8),
    pub bar_color: (u8, u8, u8),
    /// Pie slice colors, cycled by record index
    pub palette: Vec<(u8, u8, u8)>,
}

impl Default for ChartImageStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            line_color: (0x3b, 0x82, 0xf6),
            bar_color: (0x10, 0xb9, 0x81),
            palette: chart_data::DEFAULT_PALETTE
                .iter()
                .filter_map(|c| parse_hex(c).ok())
                .collect(),
        }
    }
}

impl ChartImageStyle {
    /// Size from `[export]`, colors from the light theme. Colors that are not
    /// hex (named or indexed terminal colors) keep their defaults.
    pub fn from_config(config: &AppConfig) -> Self {
        let default = Self::default();
        let palette = config.theme.palette_rgb();
        Self {
            width: config.export.image_width,
            height: config.export.image_height,
            line_color: parse_hex(&config.theme.light.line_series).unwrap_or(default.line_color),
            bar_color: parse_hex(&config.theme.light.bar_series).unwrap_or(default.bar_color),
            palette: if palette.is_empty() {
                default.palette
            } else {
                palette
            },
        }
    }

    fn slice_rgb(&self, index: usize) -> (u8, u8, u8) {
        if self.palette.is_empty() {
            return (0, 0, 0);
        }
        self.palette[palette_slot(index) % self.palette.len()]
    }
}

/// Render to `path` in `format`.
pub fn write_chart(
    path: &Path,
    format: ChartExportFormat,
    records: &[Record],
    kind: ChartKind,
    style: &ChartImageStyle,
) -> Result<()> {
    match format {
        ChartExportFormat::Png => write_chart_png(path, records, kind, style)?,
        ChartExportFormat::Eps => write_chart_eps(path, records, kind, style)?,
    }
    info!(path = %path.display(), format = format.as_str(), kind = kind.key(), "chart image written");
    Ok(())
}

fn ensure_drawable(records: &[Record], kind: ChartKind) -> Result<()> {
    if records.is_empty() {
        return Err(eyre!("No data to export"));
    }
    if kind == ChartKind::Pie && chart_data::pie_slices(records).is_empty() {
        return Err(eyre!("No positive values to draw as a pie"));
    }
    Ok(())
}

/// Escape a string for PostScript ( and ) and \.
fn ps_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Generate "nice" tick values in [min, max] with roughly max_ticks steps.
fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    let range = if max > min { max - min } else { 1.0 };
    if max_ticks == 0 {
        return vec![min];
    }
    let raw_step = range / (max_ticks as f64).max(1.0);
    let mag = 10.0_f64.powf(raw_step.log10().floor());
    let norm = if mag > 0.0 { raw_step / mag } else { raw_step };
    let step = if norm <= 1.0 {
        mag
    } else if norm <= 2.0 {
        2.0 * mag
    } else if norm <= 5.0 {
        5.0 * mag
    } else {
        10.0 * mag
    };
    let step = step.max(f64::EPSILON);
    let start = (min / step).floor() * step;
    let mut ticks = Vec::new();
    let mut v = start;
    while v <= max + step * 0.001 {
        if v >= min - step * 0.001 {
            ticks.push(v);
        }
        v += step;
        if ticks.len() > max_ticks + 2 {
            break;
        }
    }
    if ticks.is_empty() {
        ticks.push(min);
    }
    ticks
}

fn rgb_unit((r, g, b): (u8, u8, u8)) -> (f64, f64, f64) {
    (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
}

/// Write chart to EPS (Encapsulated PostScript).
pub fn write_chart_eps(
    path: &Path,
    records: &[Record],
    kind: ChartKind,
    style: &ChartImageStyle,
) -> Result<()> {
    ensure_drawable(records, kind)?;

    // PostScript points; keep the image aspect ratio at 400pt wide
    const W: f64 = 400.0;
    let h = (W * style.height as f64 / style.width.max(1) as f64).max(150.0);

    let mut f = BufWriter::new(File::create(path)?);

    writeln!(f, "%!PS-Adobe-3.0 EPSF-3.0")?;
    writeln!(f, "%%BoundingBox: 0 0 {} {}", W.ceil() as i32, h.ceil() as i32)?;
    writeln!(f, "%%Creator: chartui")?;
    writeln!(f, "%%EndComments")?;
    writeln!(f, "gsave")?;
    writeln!(f, "1 setlinewidth")?;

    match kind {
        ChartKind::Pie => write_eps_pie(&mut f, records, style, W, h)?,
        ChartKind::Line | ChartKind::Bar => write_eps_xy(&mut f, records, kind, style, W, h)?,
    }

    writeln!(f, "grestore")?;
    writeln!(f, "%%EOF")?;
    f.flush()?;
    Ok(())
}

fn write_eps_xy(
    f: &mut impl Write,
    records: &[Record],
    kind: ChartKind,
    style: &ChartImageStyle,
    w: f64,
    h: f64,
) -> Result<()> {
    const MARGIN_LEFT: f64 = 50.0;
    const MARGIN_BOTTOM: f64 = 40.0;
    const MAX_TICKS: usize = 8;
    const TICK_LEN: f64 = 4.0;
    let plot_w = w - MARGIN_LEFT - 20.0;
    let plot_h = h - MARGIN_BOTTOM - 20.0;

    let n = records.len() as f64;
    let (y_min, y_max) = chart_data::value_bounds(records, kind == ChartKind::Bar);
    let y_range = y_max - y_min;
    // Category slots: record i sits at the centre of slot i
    let slot_w = plot_w / n;
    let to_x = |i: usize| MARGIN_LEFT + (i as f64 + 0.5) * slot_w;
    let to_y = |y: f64| MARGIN_BOTTOM + (y - y_min) / y_range * plot_h;
    let y_ticks = nice_ticks(y_min, y_max, MAX_TICKS);

    // Horizontal grid
    writeln!(f, "0.9 setgray")?;
    writeln!(f, "0.5 setlinewidth")?;
    for &v in &y_ticks {
        let py = to_y(v);
        if (MARGIN_BOTTOM..=MARGIN_BOTTOM + plot_h).contains(&py) {
            writeln!(f, "{} {} moveto {} 0 rlineto stroke", MARGIN_LEFT, py, plot_w)?;
        }
    }
    writeln!(f, "1 setlinewidth")?;
    writeln!(f, "0 setgray")?;

    // Axis box
    writeln!(f, "{} {} moveto", MARGIN_LEFT, MARGIN_BOTTOM)?;
    writeln!(f, "{} 0 rlineto", plot_w)?;
    writeln!(f, "0 {} rlineto", plot_h)?;
    writeln!(f, "{} 0 rlineto", -plot_w)?;
    writeln!(f, "closepath stroke")?;

    writeln!(f, "/Helvetica findfont 9 scalefont setfont")?;
    let char_w: f64 = 5.0;
    for &v in &y_ticks {
        let py = to_y(v);
        if (MARGIN_BOTTOM..=MARGIN_BOTTOM + plot_h).contains(&py) {
            writeln!(
                f,
                "{} {} moveto {} 0 rlineto stroke",
                MARGIN_LEFT, py, -TICK_LEN
            )?;
            let s = chart_data::format_value(v);
            let tx = (MARGIN_LEFT - s.len() as f64 * char_w - 6.0).max(2.0);
            writeln!(f, "{} {} moveto ({}) show", tx, py - 3.0, ps_escape(&s))?;
        }
    }
    for (i, r) in records.iter().enumerate() {
        let px = to_x(i);
        writeln!(
            f,
            "{} {} moveto 0 {} rlineto stroke",
            px, MARGIN_BOTTOM, -TICK_LEN
        )?;
        let label_w = r.name.chars().count() as f64 * char_w;
        writeln!(
            f,
            "{} {} moveto ({}) show",
            px - label_w / 2.0,
            MARGIN_BOTTOM - 14.0,
            ps_escape(&r.name)
        )?;
    }

    match kind {
        ChartKind::Line => {
            let (r, g, b) = rgb_unit(style.line_color);
            writeln!(f, "{} {} {} setrgbcolor", r, g, b)?;
            writeln!(f, "2 setlinewidth")?;
            writeln!(f, "{} {} moveto", to_x(0), to_y(records[0].value))?;
            for (i, rec) in records.iter().enumerate().skip(1) {
                writeln!(f, "{} {} lineto", to_x(i), to_y(rec.value))?;
            }
            writeln!(f, "stroke")?;
            for (i, rec) in records.iter().enumerate() {
                writeln!(f, "{} {} 3 0 360 arc fill", to_x(i), to_y(rec.value))?;
            }
        }
        ChartKind::Bar => {
            let (r, g, b) = rgb_unit(style.bar_color);
            writeln!(f, "{} {} {} setrgbcolor", r, g, b)?;
            let bar_w = slot_w * 0.7;
            let base = to_y(0.0);
            for (i, rec) in records.iter().enumerate() {
                let top = to_y(rec.value);
                writeln!(
                    f,
                    "{} {} {} {} rectfill",
                    to_x(i) - bar_w / 2.0,
                    base.min(top),
                    bar_w,
                    (top - base).abs()
                )?;
            }
        }
        ChartKind::Pie => {}
    }
    Ok(())
}

fn write_eps_pie(
    f: &mut impl Write,
    records: &[Record],
    style: &ChartImageStyle,
    w: f64,
    h: f64,
) -> Result<()> {
    let cx = w / 2.0;
    let cy = h / 2.0;
    let radius = (h / 2.0 - 30.0).max(20.0);

    let slices = chart_data::pie_slices(records);
    for slice in &slices {
        let (r, g, b) = rgb_unit(style.slice_rgb(slice.index));
        writeln!(f, "{} {} {} setrgbcolor", r, g, b)?;
        writeln!(
            f,
            "newpath {} {} moveto {} {} {} {} {} arc closepath fill",
            cx,
            cy,
            cx,
            cy,
            radius,
            slice.start_angle.to_degrees(),
            slice.end_angle().to_degrees()
        )?;
    }

    writeln!(f, "0 setgray")?;
    writeln!(f, "/Helvetica findfont 9 scalefont setfont")?;
    for slice in &slices {
        let a = slice.mid_angle();
        let lx = cx + (radius + 12.0) * a.cos();
        let ly = cy + (radius + 12.0) * a.sin();
        let label = format!("{}: {}", slice.name, chart_data::format_value(slice.value));
        // Left half labels end at the anchor
        let shift = if a.cos() < 0.0 {
            label.chars().count() as f64 * 5.0
        } else {
            0.0
        };
        writeln!(f, "{} {} moveto ({}) show", lx - shift, ly - 3.0, ps_escape(&label))?;
    }
    Ok(())
}

/// Write chart to PNG using plotters bitmap backend.
pub fn write_chart_png(
    path: &Path,
    records: &[Record],
    kind: ChartKind,
    style: &ChartImageStyle,
) -> Result<()> {
    use plotters::prelude::*;

    ensure_drawable(records, kind)?;

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    if kind == ChartKind::Pie {
        let (w, h) = (style.width as f64, style.height as f64);
        let (cx, cy) = (w / 2.0, h / 2.0);
        let radius = (w.min(h) / 2.0 - 40.0).max(10.0);

        for slice in chart_data::pie_slices(records) {
            let (r, g, b) = style.slice_rgb(slice.index);
            // Pixel y grows downwards, so negate sin to keep counter-clockwise slices
            let steps = ((slice.sweep / std::f64::consts::TAU) * 180.0).ceil().max(2.0) as usize;
            let mut points = vec![(cx as i32, cy as i32)];
            for s in 0..=steps {
                let a = slice.start_angle + slice.sweep * s as f64 / steps as f64;
                points.push((
                    (cx + radius * a.cos()).round() as i32,
                    (cy - radius * a.sin()).round() as i32,
                ));
            }
            root.draw(&Polygon::new(points, RGBColor(r, g, b).filled()))?;

            let a = slice.mid_angle();
            let label = format!("{}: {}", slice.name, chart_data::format_value(slice.value));
            let lx = cx + (radius + 10.0) * a.cos();
            let ly = cy - (radius + 10.0) * a.sin();
            let shift = if a.cos() < 0.0 {
                label.chars().count() as f64 * 7.0
            } else {
                0.0
            };
            root.draw(&Text::new(
                label,
                ((lx - shift) as i32, ly as i32),
                ("sans-serif", 14).into_font().color(&BLACK),
            ))?;
        }
        root.present()?;
        return Ok(());
    }

    let n = records.len();
    let (y_min, y_max) = chart_data::value_bounds(records, kind == ChartKind::Bar);
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();

    let mut chart = ChartBuilder::on(&root)
        .margin(30)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), y_min..y_max)?;

    let x_label_formatter = |x: &f64| {
        let i = x.round();
        if (x - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        names.get(i as usize).map(|s| s.to_string()).unwrap_or_default()
    };
    chart
        .configure_mesh()
        .x_labels(n.max(2) * 2 + 1)
        .x_label_formatter(&x_label_formatter)
        .disable_x_mesh()
        .y_desc("Valeur")
        .draw()?;

    match kind {
        ChartKind::Line => {
            let (r, g, b) = style.line_color;
            let color = RGBColor(r, g, b);
            let points = chart_data::indexed_points(records);
            chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(3)))?;
            chart.draw_series(
                points
                    .iter()
                    .map(|&p| Circle::new(p, 5, color.filled())),
            )?;
        }
        ChartKind::Bar => {
            let (r, g, b) = style.bar_color;
            let color = RGBColor(r, g, b);
            chart.draw_series(records.iter().enumerate().map(|(i, rec)| {
                let x = i as f64;
                Rectangle::new([(x - 0.35, 0.0), (x + 0.35, rec.value)], color.filled())
            }))?;
        }
        ChartKind::Pie => {}
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample_records;

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).expect("read")
    }

    #[test]
    fn format_from_path() {
        assert_eq!(
            ChartExportFormat::from_path(Path::new("a/chart.PNG")),
            Some(ChartExportFormat::Png)
        );
        assert_eq!(
            ChartExportFormat::from_path(Path::new("chart.eps")),
            Some(ChartExportFormat::Eps)
        );
        assert_eq!(ChartExportFormat::from_path(Path::new("chart.svg")), None);
        assert_eq!(ChartExportFormat::from_path(Path::new("chart")), None);
    }

    #[test]
    fn nice_ticks_cover_range() {
        let ticks = nice_ticks(0.0, 82.0, 8);
        assert_eq!(ticks.first().copied(), Some(0.0));
        assert!(*ticks.last().unwrap() >= 80.0);
        assert!(ticks.windows(2).all(|w| w[1] > w[0]));
    }

    /// Line EPS has header, axis box, category labels and the series path.
    #[test]
    fn eps_line_contains_desired_elements() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("chart.eps");
        write_chart_eps(&path, &sample_records(), ChartKind::Line, &ChartImageStyle::default())
            .expect("write_chart_eps");
        let content = read(&path);

        assert!(content.contains("%!PS-Adobe-3.0 EPSF-3.0"), "EPS header");
        assert!(content.contains("%%BoundingBox: 0 0 400 200"), "BoundingBox");
        assert!(content.contains("%%Creator: chartui"), "Creator");
        assert!(content.contains("0.9 setgray"), "grid color");
        assert!(content.contains("closepath stroke"), "axis box");
        assert!(content.contains("(Janvier) show"), "category label");
        assert!(content.contains("(Avril) show"), "category label");
        assert_eq!(content.matches(" lineto").count(), 3, "line segments");
        assert!(content.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn eps_bar_draws_one_rect_per_record() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bar.eps");
        write_chart_eps(&path, &sample_records(), ChartKind::Bar, &ChartImageStyle::default())
            .expect("write_chart_eps");
        assert_eq!(read(&path).matches("rectfill").count(), 4);
    }

    #[test]
    fn eps_pie_draws_slices_with_palette() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("pie.eps");
        let mut records = sample_records();
        records.push(Record::new("Zero", 0.0));
        write_chart_eps(&path, &records, ChartKind::Pie, &ChartImageStyle::default())
            .expect("write_chart_eps");
        let content = read(&path);
        assert_eq!(content.matches("arc closepath fill").count(), 4);
        assert!(content.contains("(Mars: 82) show"));
        assert!(!content.contains("Zero"));
        // first palette color #3b82f6
        let (r, g, b) = rgb_unit((0x3b, 0x82, 0xf6));
        assert!(content.contains(&format!("{} {} {} setrgbcolor", r, g, b)));
    }

    #[test]
    fn ps_escaping() {
        assert_eq!(ps_escape("a(b)\\c"), "a\\(b\\)\\\\c");
    }

    #[test]
    fn empty_data_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("empty.eps");
        assert!(write_chart_eps(&path, &[], ChartKind::Line, &ChartImageStyle::default()).is_err());
        let negatives = vec![Record::new("a", -1.0)];
        assert!(
            write_chart_eps(&path, &negatives, ChartKind::Pie, &ChartImageStyle::default())
                .is_err()
        );
    }
}
