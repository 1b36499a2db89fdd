use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::PI;
use std::ops::Range;

use crate::OutputFormat;

/// Style configuration for line layers
#[derive(Debug, Clone)]
pub struct LineStyle {
    pub color: Option<String>,
    pub width: Option<u32>,
    pub legend: Option<String>,
}

/// Style configuration for point layers
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: Option<String>,
    pub size: Option<u32>,
    pub alpha: Option<f64>,
}

/// Style configuration for bar layers
#[derive(Debug, Clone)]
pub struct BarStyle {
    pub color: Option<String>,
    pub edge_color: Option<String>,
    pub width: Option<f64>,
}

/// Style configuration for pie layers
#[derive(Debug, Clone)]
pub struct PieStyle {
    pub colors: Vec<String>,
    /// Degrees, counter-clockwise from the positive x axis.
    pub start_angle: f64,
}

/// What gets drawn inside the plot area.
#[derive(Debug, Clone)]
pub enum Layer {
    Line {
        points: Vec<(f64, f64)>,
        style: LineStyle,
    },
    Points {
        points: Vec<(f64, f64)>,
        style: PointStyle,
    },
    /// One bar per category, in the given order.
    Bars {
        categories: Vec<String>,
        values: Vec<f64>,
        style: BarStyle,
    },
    /// Contiguous bars over numeric bin edges. `edges.len() == counts.len() + 1`.
    Histogram {
        edges: Vec<f64>,
        counts: Vec<f64>,
        style: BarStyle,
    },
    Pie {
        slices: Vec<(String, f64)>,
        style: PieStyle,
    },
}

impl Layer {
    pub fn is_empty(&self) -> bool {
        match self {
            Layer::Line { points, .. } | Layer::Points { points, .. } => points.is_empty(),
            Layer::Bars { categories, .. } => categories.is_empty(),
            Layer::Histogram { counts, .. } => counts.is_empty(),
            Layer::Pie { slices, .. } => slices.is_empty(),
        }
    }
}

/// A single titled chart with one layer.
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub grid: bool,
    pub layer: Layer,
}

/// Drawing surface of a fixed size and output format.
pub struct Canvas {
    width: u32,
    height: u32,
    format: OutputFormat,
}

impl Canvas {
    pub fn new(width: u32, height: u32, format: OutputFormat) -> Self {
        Canvas {
            width,
            height,
            format,
        }
    }

    /// Draw the figure and encode it in the canvas format.
    pub fn render(&self, figure: &Figure) -> Result<Vec<u8>> {
        if figure.layer.is_empty() {
            anyhow::bail!("Cannot draw '{}' with no data points", figure.title);
        }

        match self.format {
            OutputFormat::Png => self.render_png(figure),
            OutputFormat::Svg => self.render_svg(figure),
        }
    }

    fn render_png(&self, figure: &Figure) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; (self.width * self.height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (self.width, self.height))
                .into_drawing_area();
            draw_figure(&root, figure)?;
            root.present().context("Failed to present drawing")?;
        }

        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(&buffer, self.width, self.height, image::ColorType::Rgb8)
                .context("Failed to encode PNG")?;
        }

        Ok(png_bytes)
    }

    fn render_svg(&self, figure: &Figure) -> Result<Vec<u8>> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height))
                .into_drawing_area();
            draw_figure(&root, figure)?;
            root.present().context("Failed to present drawing")?;
        }
        Ok(svg.into_bytes())
    }
}

fn draw_figure<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    match &figure.layer {
        Layer::Line { points, style } => draw_line(root, figure, points, style),
        Layer::Points { points, style } => draw_points(root, figure, points, style),
        Layer::Bars {
            categories,
            values,
            style,
        } => draw_bars(root, figure, categories, values, style),
        Layer::Histogram {
            edges,
            counts,
            style,
        } => draw_histogram(root, figure, edges, counts, style),
        Layer::Pie { slices, style } => draw_pie(root, figure, slices, style),
    }
}

fn draw_line<DB>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    points: &[(f64, f64)],
    style: &LineStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (x_range, y_range) = point_ranges(points);

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(&figure.title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    configure_mesh(&mut chart, figure)?;

    let color = parse_color(&style.color);
    let width = style.width.unwrap_or(1);

    let series = chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            color.stroke_width(width),
        ))
        .context("Failed to draw line series")?;

    if let Some(legend) = &style.legend {
        series
            .label(legend.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width)));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .context("Failed to draw legend")?;
    }

    Ok(())
}

fn draw_points<DB>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    points: &[(f64, f64)],
    style: &PointStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (x_range, y_range) = point_ranges(points);

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(&figure.title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    configure_mesh(&mut chart, figure)?;

    let color = parse_color(&style.color).mix(style.alpha.unwrap_or(1.0));
    let size = style.size.unwrap_or(3) as i32;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), size, color.filled())),
        )
        .context("Failed to draw point series")?;

    Ok(())
}

fn draw_bars<DB>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    categories: &[String],
    values: &[f64],
    style: &BarStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    if categories.len() != values.len() {
        anyhow::bail!(
            "Categories and values must have the same length (categories: {}, values: {})",
            categories.len(),
            values.len()
        );
    }

    let y_max = values.iter().cloned().fold(0.0, f64::max);
    let y_range = 0.0..(if y_max > 0.0 { y_max * 1.05 } else { 1.0 });

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(&figure.title, ("sans-serif", 20))
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d((0..categories.len()).into_segmented(), y_range)
        .context("Failed to build chart")?;

    let label_for = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(idx) => categories.get(*idx).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    let mut mesh = chart.configure_mesh();
    mesh.x_labels(categories.len())
        .x_label_formatter(&label_for)
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str());
    if !figure.grid {
        mesh.disable_mesh();
    }
    mesh.draw().context("Failed to draw mesh")?;

    let color = parse_color(&style.color);
    let bar_margin = bar_margin_px(root, categories.len(), style.width.unwrap_or(0.8));

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(color.filled())
                .margin(bar_margin)
                .data(values.iter().enumerate().map(|(idx, &v)| (idx, v))),
        )
        .context("Failed to draw bars")?;

    Ok(())
}

fn draw_histogram<DB>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    edges: &[f64],
    counts: &[f64],
    style: &BarStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    if edges.len() != counts.len() + 1 {
        anyhow::bail!(
            "Histogram needs one more edge than counts (edges: {}, counts: {})",
            edges.len(),
            counts.len()
        );
    }

    let x_range = padded_range(edges[0], edges[edges.len() - 1]);
    let y_max = counts.iter().cloned().fold(0.0, f64::max);
    let y_range = 0.0..(if y_max > 0.0 { y_max * 1.05 } else { 1.0 });

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(&figure.title, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    configure_mesh(&mut chart, figure)?;

    let fill = parse_color(&style.color);
    let edge = parse_color(&style.edge_color);

    for (bin, &count) in counts.iter().enumerate() {
        let corners = [(edges[bin], 0.0), (edges[bin + 1], count)];
        chart
            .draw_series(std::iter::once(Rectangle::new(corners, fill.filled())))
            .context("Failed to draw bin")?;
        if style.edge_color.is_some() {
            chart
                .draw_series(std::iter::once(Rectangle::new(corners, edge.stroke_width(1))))
                .context("Failed to draw bin edge")?;
        }
    }

    Ok(())
}

fn draw_pie<DB>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    slices: &[(String, f64)],
    style: &PieStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let area = root
        .titled(&figure.title, ("sans-serif", 20))
        .context("Failed to draw title")?;

    let (w, h) = area.dim_in_pixel();
    let center = (w as f64 / 2.0, h as f64 / 2.0);
    let radius = w.min(h) as f64 * 0.38;
    let total: f64 = slices.iter().map(|(_, v)| v).sum();
    if total <= 0.0 {
        anyhow::bail!("Pie slices must sum to a positive value");
    }

    let label_font = TextStyle::from(("sans-serif", 14).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));

    let mut angle = style.start_angle.to_radians();
    for (idx, (label, value)) in slices.iter().enumerate() {
        let sweep = value / total * 2.0 * PI;
        let color = if style.colors.is_empty() {
            parse_color(&None)
        } else {
            parse_color(&Some(style.colors[idx % style.colors.len()].clone()))
        };

        // One vertex per degree keeps the arc smooth at any size.
        let steps = ((sweep.to_degrees()).ceil() as usize).max(1);
        let mut wedge = Vec::with_capacity(steps + 2);
        wedge.push(to_pixel(center, 0.0, 0.0));
        for step in 0..=steps {
            let a = angle + sweep * step as f64 / steps as f64;
            wedge.push(to_pixel(center, radius, a));
        }
        area.draw(&Polygon::new(wedge, color.filled()))
            .context("Failed to draw pie wedge")?;

        let mid = angle + sweep / 2.0;
        area.draw(&Text::new(
            label.clone(),
            to_pixel(center, radius * 1.15, mid),
            label_font.clone(),
        ))
        .context("Failed to draw pie label")?;
        area.draw(&Text::new(
            format!("{:.1}%", value / total * 100.0),
            to_pixel(center, radius * 0.6, mid),
            label_font.clone(),
        ))
        .context("Failed to draw pie percentage")?;

        angle += sweep;
    }

    Ok(())
}

fn configure_mesh<DB>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    figure: &Figure,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut mesh = chart.configure_mesh();
    mesh.x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str());
    if !figure.grid {
        mesh.disable_mesh();
    }
    mesh.draw().context("Failed to draw mesh")?;
    Ok(())
}

/// Pixel gap on each side of a bar so that it fills `fraction` of its slot.
fn bar_margin_px<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, n: usize, fraction: f64) -> u32 {
    let (w, _) = root.dim_in_pixel();
    let slot = w as f64 / (n.max(1) + 1) as f64;
    ((slot * (1.0 - fraction.clamp(0.0, 1.0))) / 2.0).round() as u32
}

/// Counter-clockwise angle in radians around `center`, y axis pointing down.
fn to_pixel(center: (f64, f64), radius: f64, angle: f64) -> (i32, i32) {
    (
        (center.0 + radius * angle.cos()).round() as i32,
        (center.1 - radius * angle.sin()).round() as i32,
    )
}

fn point_ranges(points: &[(f64, f64)]) -> (Range<f64>, Range<f64>) {
    let (x_min, x_max) = min_max(points.iter().map(|p| p.0));
    let (y_min, y_max) = min_max(points.iter().map(|p| p.1));
    (padded_range(x_min, x_max), padded_range(y_min, y_max))
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn padded_range(min: f64, max: f64) -> Range<f64> {
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

/// Parse a color name or `#rrggbb` string to RGBColor
pub fn parse_color(color_str: &Option<String>) -> RGBColor {
    match color_str.as_deref() {
        Some("red") => RED,
        Some("green") => GREEN,
        Some("blue") => BLUE,
        Some("black") => BLACK,
        Some("yellow") => YELLOW,
        Some("cyan") => CYAN,
        Some("magenta") => MAGENTA,
        Some("white") => WHITE,
        Some("royalblue") => RGBColor(65, 105, 225),
        Some("salmon") => RGBColor(250, 128, 114),
        Some("lightgreen") => RGBColor(144, 238, 144),
        Some("skyblue") => RGBColor(135, 206, 235),
        Some("purple") => RGBColor(128, 0, 128),
        Some(hex) if hex.starts_with('#') => parse_hex(hex).unwrap_or(BLUE),
        _ => BLUE, // default
    }
}

fn parse_hex(hex: &str) -> Option<RGBColor> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_names_and_hex() {
        assert_eq!(parse_color(&Some("salmon".to_string())), RGBColor(250, 128, 114));
        assert_eq!(parse_color(&Some("#ff9999".to_string())), RGBColor(255, 153, 153));
        assert_eq!(parse_color(&Some("#zzz".to_string())), BLUE);
        assert_eq!(parse_color(&None), BLUE);
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(2.0, 2.0), 1.0..3.0);
        let r = padded_range(0.0, 10.0);
        assert_eq!(r, -0.5..10.5);
    }

    #[test]
    fn test_to_pixel_is_counter_clockwise() {
        // 90 degrees points straight up, which is a smaller y in pixel space.
        assert_eq!(to_pixel((100.0, 100.0), 10.0, PI / 2.0), (100, 90));
        assert_eq!(to_pixel((100.0, 100.0), 10.0, 0.0), (110, 100));
    }

    #[test]
    fn test_render_rejects_empty_layer() {
        let figure = Figure {
            title: "Empty".to_string(),
            x_label: String::new(),
            y_label: String::new(),
            grid: false,
            layer: Layer::Points {
                points: vec![],
                style: PointStyle { color: None, size: None, alpha: None },
            },
        };
        let canvas = Canvas::new(100, 100, OutputFormat::Png);
        assert!(canvas.render(&figure).is_err());
    }
}
