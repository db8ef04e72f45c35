//! Comparison bar chart.
//!
//! [`render_comparison_chart`] draws a grouped bar chart with two category
//! groups, `Loudness (LUFS)` and `Noise Level`, and one bar per input in each
//! group, then saves it as a PNG. The canvas lives only for the duration of
//! the call. Non-finite values (silent input has −∞ loudness) draw no bar and
//! are annotated instead.

mod glyphs;

use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};

use crate::{analysis::QualityMetrics, error::CompareError};

use glyphs::{ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};

/// Output image width in pixels.
pub const CHART_WIDTH: u32 = 800;
/// Output image height in pixels.
pub const CHART_HEIGHT: u32 = 600;
/// Category group labels, left to right.
pub const CATEGORY_LABELS: [&str; 2] = ["Loudness (LUFS)", "Noise Level"];
/// Fill colors for the first and second input.
pub const SERIES_COLORS: [Rgb<u8>; 2] = [Rgb([31, 119, 180]), Rgb([255, 127, 14])];

const TITLE: &str = "Audio Quality Comparison";
const Y_LABEL: &str = "Scores";
/// Bar width as a fraction of the distance between group centers.
const BAR_WIDTH: f64 = 0.35;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([38, 38, 38]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);

/// Render the chart and save it to `output_path` as PNG.
///
/// # Errors
///
/// Returns [`CompareError::ChartRender`] if the image cannot be encoded or
/// written.
pub fn render_comparison_chart<P: AsRef<Path>>(
    label_a: &str,
    metrics_a: &QualityMetrics,
    label_b: &str,
    metrics_b: &QualityMetrics,
    output_path: P,
) -> Result<(), CompareError> {
    let path = output_path.as_ref();
    log::debug!("Rendering comparison chart to {}", path.display());

    let image = draw_comparison_chart(label_a, metrics_a, label_b, metrics_b);
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|error| CompareError::ChartRender {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })
}

/// Draw the chart into an in-memory image without saving it.
pub fn draw_comparison_chart(
    label_a: &str,
    metrics_a: &QualityMetrics,
    label_b: &str,
    metrics_b: &QualityMetrics,
) -> RgbImage {
    let series = [
        (label_a, [metrics_a.loudness_lufs, metrics_a.noise_level]),
        (label_b, [metrics_b.loudness_lufs, metrics_b.noise_level]),
    ];

    let mut canvas = Canvas::new(CHART_WIDTH, CHART_HEIGHT);
    let area = PlotArea {
        left: 100,
        top: 60,
        right: CHART_WIDTH as i32 - 30,
        bottom: CHART_HEIGHT as i32 - 150,
    };
    let axis = ValueAxis::fit(series.iter().flat_map(|(_, values)| values.iter().copied()));

    canvas.text_centered(TITLE, CHART_WIDTH as i32 / 2, 20, 3, INK);

    for tick in axis.ticks() {
        let y = area.y_for(tick, &axis);
        canvas.hline(area.left, area.right, y, GRID);
        let label = format_tick(tick, axis.step);
        let x = area.left - 8 - text_width(&label, 2);
        canvas.text(&label, x, y - GLYPH_HEIGHT, 2, INK);
    }

    canvas.text_vertical(
        Y_LABEL,
        24,
        (area.top + area.bottom) / 2 + text_width(Y_LABEL, 2) / 2,
        2,
        INK,
    );

    for (category, category_label) in CATEGORY_LABELS.iter().enumerate() {
        for (index, (_, values)) in series.iter().enumerate() {
            let center = category as f64 + (index as f64 - 0.5) * BAR_WIDTH;
            draw_bar(&mut canvas, &area, &axis, center, values[category], SERIES_COLORS[index]);
        }
        canvas.text_centered(category_label, area.x_for(category as f64), area.bottom + 14, 2, INK);
    }

    canvas.hline(area.left, area.right, area.y_for(0.0, &axis), INK);
    canvas.outline(area.left, area.top, area.right, area.bottom, INK);

    draw_legend(&mut canvas, &area, &series.map(|(label, _)| label));

    canvas.image
}

fn draw_bar(
    canvas: &mut Canvas,
    area: &PlotArea,
    axis: &ValueAxis,
    center: f64,
    value: f64,
    color: Rgb<u8>,
) {
    let x0 = area.x_for(center - BAR_WIDTH / 2.0);
    let x1 = area.x_for(center + BAR_WIDTH / 2.0);
    let zero = area.y_for(0.0, axis);
    let annotation = format_value(value);
    let annotation_x = (x0 + x1) / 2;

    if !value.is_finite() {
        canvas.text_centered(&annotation, annotation_x, zero - 2 * GLYPH_HEIGHT - 6, 2, INK);
        return;
    }

    let top = area.y_for(value, axis);
    let (y0, y1) = if top <= zero { (top, zero + 1) } else { (zero, top + 1) };
    canvas.fill_rect(x0, y0, x1, y1.max(y0 + 1), color);

    if value >= 0.0 {
        canvas.text_centered(&annotation, annotation_x, y0 - 2 * GLYPH_HEIGHT - 4, 2, INK);
    } else {
        canvas.text_centered(&annotation, annotation_x, y1 + 4, 2, INK);
    }
}

fn draw_legend(canvas: &mut Canvas, area: &PlotArea, labels: &[&str; 2]) {
    let top = area.bottom + 48;
    let row_height = 26;
    let swatch = 16;
    let text_left = area.left + 12 + swatch + 10;
    let max_chars = ((area.right - 12 - text_left) / (ADVANCE * 2)).max(4) as usize;

    canvas.outline(area.left, top, area.right, top + 12 + row_height * 2, GRID);
    for (index, label) in labels.iter().enumerate() {
        let y = top + 10 + row_height * index as i32;
        canvas.fill_rect(area.left + 12, y, area.left + 12 + swatch, y + swatch, SERIES_COLORS[index]);
        canvas.text(&elide_front(label, max_chars), text_left, y + 1, 2, INK);
    }
}

/// Keep the tail of `label` (the file name end of a path) if it is too long.
fn elide_front(label: &str, max_chars: usize) -> String {
    let count = label.chars().count();
    if count <= max_chars {
        return label.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let tail: String = label.chars().skip(count - keep).collect();
    format!("...{tail}")
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if value.abs() >= 1.0 {
        format!("{value:.2}")
    } else {
        format!("{value:.4}")
    }
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = (-step.log10().floor()).max(0.0) as usize;
    let value = if value.abs() < step * 1e-6 { 0.0 } else { value };
    format!("{value:.decimals$}")
}

fn text_width(text: &str, scale: i32) -> i32 {
    let count = text.chars().count() as i32;
    if count == 0 {
        return 0;
    }
    (count * ADVANCE - 1) * scale
}

/// Linear value axis with "nice" tick spacing that always includes zero.
#[derive(Debug, Clone, Copy)]
struct ValueAxis {
    min: f64,
    max: f64,
    step: f64,
}

impl ValueAxis {
    fn fit(values: impl Iterator<Item = f64>) -> Self {
        let (mut low, mut high) = values
            .filter(|value| value.is_finite())
            .fold((0.0_f64, 0.0_f64), |(low, high), value| (low.min(value), high.max(value)));

        if high - low < f64::EPSILON {
            low -= 1.0;
            high += 1.0;
        }

        let step = nice_step((high - low) / 5.0);
        Self {
            min: (low / step).floor() * step,
            max: (high / step).ceil() * step,
            step,
        }
    }

    fn ticks(&self) -> impl Iterator<Item = f64> + '_ {
        let first = (self.min / self.step).round() as i64;
        let last = (self.max / self.step).round() as i64;
        (first..=last).map(move |k| k as f64 * self.step)
    }
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10_f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Pixel bounds of the plotting region.
struct PlotArea {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl PlotArea {
    /// Map a group coordinate (0 and 1 are the group centers) to a pixel column.
    fn x_for(&self, x: f64) -> i32 {
        let fraction = (x + 0.5) / 2.0;
        self.left + (fraction * (self.right - self.left) as f64).round() as i32
    }

    fn y_for(&self, value: f64, axis: &ValueAxis) -> i32 {
        let fraction = (value - axis.min) / (axis.max - axis.min);
        self.bottom - (fraction * (self.bottom - self.top) as f64).round() as i32
    }
}

/// Clipping drawing surface over an [`RgbImage`].
struct Canvas {
    image: RgbImage,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, BACKGROUND),
        }
    }

    /// Fill the half-open rectangle `[x0, x1) × [y0, y1)`.
    fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
        let width = self.image.width() as i32;
        let height = self.image.height() as i32;
        for y in y0.max(0)..y1.min(height) {
            for x in x0.max(0)..x1.min(width) {
                self.image.put_pixel(x as u32, y as u32, color);
            }
        }
    }

    fn hline(&mut self, x0: i32, x1: i32, y: i32, color: Rgb<u8>) {
        self.fill_rect(x0, y, x1 + 1, y + 1, color);
    }

    fn vline(&mut self, x: i32, y0: i32, y1: i32, color: Rgb<u8>) {
        self.fill_rect(x, y0, x + 1, y1 + 1, color);
    }

    fn outline(&mut self, left: i32, top: i32, right: i32, bottom: i32, color: Rgb<u8>) {
        self.hline(left, right, top, color);
        self.hline(left, right, bottom, color);
        self.vline(left, top, bottom, color);
        self.vline(right, top, bottom, color);
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    fn text(&mut self, text: &str, x: i32, y: i32, scale: i32, color: Rgb<u8>) {
        for (index, c) in text.chars().enumerate() {
            let origin = x + index as i32 * ADVANCE * scale;
            for (row, bits) in glyphs::glyph(c).iter().enumerate() {
                for column in 0..GLYPH_WIDTH {
                    if bits >> (GLYPH_WIDTH - 1 - column) & 1 == 1 {
                        let px = origin + column * scale;
                        let py = y + row as i32 * scale;
                        self.fill_rect(px, py, px + scale, py + scale, color);
                    }
                }
            }
        }
    }

    fn text_centered(&mut self, text: &str, center_x: i32, y: i32, scale: i32, color: Rgb<u8>) {
        self.text(text, center_x - text_width(text, scale) / 2, y, scale, color);
    }

    /// Draw `text` rotated a quarter turn counter-clockwise, reading bottom
    /// to top, starting at `(x, y)`.
    fn text_vertical(&mut self, text: &str, x: i32, y: i32, scale: i32, color: Rgb<u8>) {
        for (index, c) in text.chars().enumerate() {
            for (row, bits) in glyphs::glyph(c).iter().enumerate() {
                for column in 0..GLYPH_WIDTH {
                    if bits >> (GLYPH_WIDTH - 1 - column) & 1 == 1 {
                        let along = index as i32 * ADVANCE + column;
                        let px = x + row as i32 * scale;
                        let py = y - (along + 1) * scale;
                        self.fill_rect(px, py, px + scale, py + scale, color);
                    }
                }
            }
        }
    }
}
