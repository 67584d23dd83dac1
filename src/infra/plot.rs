// ============================================================
// Layer 6 — Embedding Plots
// ============================================================
// Renders a set of 2-D embeddings as a PNG scatter plot with the
// image crate. One fixed colour per digit class; a legend column
// on the right shows each colour next to its digit.
//
//   ┌──────────────────────────────┐ ┌──┐
//   │   · ·  ·     (plot area)     │ │■0│
//   │ ·  ·    ·                    │ │■1│
//   │      ·    ·  ·               │ │..│
//   └──────────────────────────────┘ └──┘
//
// Axes are fitted to the data with a 5% margin. When x = 0 or
// y = 0 falls inside the visible range a light axis line is drawn.

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use std::{fs, path::PathBuf};

use crate::domain::embedding::EmbeddingSet;

const WIDTH:  u32 = 800;
const HEIGHT: u32 = 800;

const PLOT_LEFT:   u32 = 30;
const PLOT_TOP:    u32 = 30;
const PLOT_RIGHT:  u32 = WIDTH - 110;
const PLOT_BOTTOM: u32 = HEIGHT - 30;

const MARGIN: f32 = 0.05;
const POINT_RADIUS: i64 = 2;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME:      Rgb<u8> = Rgb([60, 60, 60]);
const AXIS:       Rgb<u8> = Rgb([200, 200, 200]);

/// Ten-colour qualitative palette, indexed by class label.
pub const PALETTE: [Rgb<u8>; 10] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
    Rgb([140, 86, 75]),
    Rgb([227, 119, 194]),
    Rgb([127, 127, 127]),
    Rgb([188, 189, 34]),
    Rgb([23, 190, 207]),
];

/// 3x5 bitmaps for the digits 0-9, one row per u8 (low 3 bits, MSB left).
const DIGIT_GLYPHS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Writes embedding plots into one output directory.
pub struct EmbeddingPlotter {
    dir: PathBuf,
}

impl EmbeddingPlotter {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    /// Render `set` and save it as `{dir}/{file_name}`.
    pub fn save(&self, set: &EmbeddingSet, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create plot directory '{}'", self.dir.display()))?;

        let path = self.dir.join(file_name);
        if set.is_empty() {
            tracing::warn!("No embeddings to plot for '{}'", path.display());
        }
        render(set)
            .save(&path)
            .with_context(|| format!("Cannot write plot '{}'", path.display()))?;

        tracing::info!("Saved {} embeddings to '{}'", set.len(), path.display());
        Ok(path)
    }
}

/// Data range → pixel mapping for the plot area.
struct Frame {
    x0: f32,
    x1: f32,
    y0: f32,
    y1: f32,
}

impl Frame {
    fn fit(set: &EmbeddingSet) -> Self {
        let (x0, x1, y0, y1) = set.bounds().unwrap_or((-1.0, 1.0, -1.0, 1.0));
        let (x0, x1) = pad(x0, x1);
        let (y0, y1) = pad(y0, y1);
        Self { x0, x1, y0, y1 }
    }

    fn to_pixel(&self, x: f32, y: f32) -> (i64, i64) {
        let w = (PLOT_RIGHT - PLOT_LEFT) as f32;
        let h = (PLOT_BOTTOM - PLOT_TOP) as f32;
        let px = PLOT_LEFT as f32 + (x - self.x0) / (self.x1 - self.x0) * w;
        // Image rows grow downwards
        let py = PLOT_BOTTOM as f32 - (y - self.y0) / (self.y1 - self.y0) * h;
        (px.round() as i64, py.round() as i64)
    }
}

fn pad(lo: f32, hi: f32) -> (f32, f32) {
    if (hi - lo).abs() < f32::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let m = (hi - lo) * MARGIN;
    (lo - m, hi + m)
}

/// Draw the scatter plot into a new image.
pub fn render(set: &EmbeddingSet) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    let frame = Frame::fit(set);

    // Zero axes
    if frame.x0 < 0.0 && frame.x1 > 0.0 {
        let (px, _) = frame.to_pixel(0.0, frame.y0);
        fill_rect(&mut img, px, PLOT_TOP as i64, px, PLOT_BOTTOM as i64, AXIS);
    }
    if frame.y0 < 0.0 && frame.y1 > 0.0 {
        let (_, py) = frame.to_pixel(frame.x0, 0.0);
        fill_rect(&mut img, PLOT_LEFT as i64, py, PLOT_RIGHT as i64, py, AXIS);
    }

    for p in set.points() {
        let (px, py) = frame.to_pixel(p.x, p.y);
        let color = PALETTE[p.label as usize % PALETTE.len()];
        fill_disc(&mut img, px, py, POINT_RADIUS, color);
    }

    draw_frame(&mut img);
    draw_legend(&mut img);
    img
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_rect(img: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
    for y in y0..=y1 {
        for x in x0..=x1 {
            put(img, x, y, color);
        }
    }
}

fn fill_disc(img: &mut RgbImage, cx: i64, cy: i64, r: i64, color: Rgb<u8>) {
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                put(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn draw_frame(img: &mut RgbImage) {
    let (l, t, r, b) = (PLOT_LEFT as i64, PLOT_TOP as i64, PLOT_RIGHT as i64, PLOT_BOTTOM as i64);
    fill_rect(img, l, t, r, t, FRAME);
    fill_rect(img, l, b, r, b, FRAME);
    fill_rect(img, l, t, l, b, FRAME);
    fill_rect(img, r, t, r, b, FRAME);
}

fn draw_legend(img: &mut RgbImage) {
    let x = PLOT_RIGHT as i64 + 25;
    for (digit, color) in PALETTE.iter().enumerate() {
        let y = PLOT_TOP as i64 + 10 + digit as i64 * 30;
        fill_rect(img, x, y, x + 15, y + 15, *color);
        draw_glyph(img, x + 25, y, &DIGIT_GLYPHS[digit], 3, FRAME);
    }
}

/// Draw a 3x5 glyph scaled by `scale`.
fn draw_glyph(img: &mut RgbImage, x: i64, y: i64, glyph: &[u8; 5], scale: i64, color: Rgb<u8>) {
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..3 {
            if bits & (0b100 >> col) != 0 {
                let px = x + col as i64 * scale;
                let py = y + row as i64 * scale;
                fill_rect(img, px, py, px + scale - 1, py + scale - 1, color);
            }
        }
    }
}
