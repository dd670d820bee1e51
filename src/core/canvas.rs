//! In-memory RGBA raster that implements [`DrawingSurface`].
//!
//! Pixels are snapped to integer coordinates: a fill covers
//! `[round(x), round(x + w))` on each axis and a stroke is one pixel wide.
//! Anything outside the raster is clipped, so a line drawn at `x == width`
//! leaves no trace, like the right edge of a canvas.

use tracing::warn;

use crate::core::color::Rgba;
use crate::core::surface::DrawingSurface;

#[derive(Debug, Clone, PartialEq)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
    stroke_style: Rgba,
    fill_style: Rgba,
    path: Vec<Vec<(f64, f64)>>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
            stroke_style: Rgba::BLACK,
            fill_style: Rgba::BLACK,
            path: Vec::new(),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn put(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = self.index(x as u32, y as u32);
        self.pixels[idx] = color;
    }

    /// Snap a span to a clipped half-open pixel range
    fn span(start: f64, len: f64, limit: u32) -> (u32, u32) {
        let (a, b) = if len < 0.0 { (start + len, start) } else { (start, start + len) };
        let clamp = |v: f64| v.round().clamp(0.0, limit as f64) as u32;
        (clamp(a), clamp(b))
    }

    fn fill_span(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        let (x0, x1) = Self::span(x, w, self.width);
        let (y0, y1) = Self::span(y, h, self.height);
        for py in y0..y1 {
            let row = self.index(0, py);
            self.pixels[row + x0 as usize..row + x1 as usize].fill(color);
        }
    }

    /// Bresenham between two snapped points
    fn draw_segment(&mut self, from: (f64, f64), to: (f64, f64), color: Rgba) {
        let (mut x0, mut y0) = (from.0.round() as i64, from.1.round() as i64);
        let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn parse_style(style: &str, current: Rgba) -> Rgba {
        match Rgba::parse(style) {
            Ok(color) => color,
            Err(e) => {
                warn!(%e, "ignoring style");
                current
            }
        }
    }
}

impl DrawingSurface for PixelCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.fill_span(x, y, w, h, Rgba::TRANSPARENT);
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.stroke_style = Self::parse_style(style, self.stroke_style);
    }

    fn set_fill_style(&mut self, style: &str) {
        self.fill_style = Self::parse_style(style, self.fill_style);
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.push(vec![(x, y)]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        match self.path.last_mut() {
            Some(subpath) => subpath.push((x, y)),
            // lineTo on an empty path acts as moveTo
            None => self.path.push(vec![(x, y)]),
        }
    }

    fn stroke(&mut self) {
        let color = self.stroke_style;
        let segments: Vec<((f64, f64), (f64, f64))> = self
            .path
            .iter()
            .flat_map(|sub| sub.windows(2).map(|w| (w[0], w[1])))
            .collect();
        for (from, to) in segments {
            self.draw_segment(from, to, color);
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let color = self.fill_style;
        if color.is_transparent() {
            return;
        }
        self.fill_span(x, y, w, h, color);
    }
}
