//! Rasterizer: executes display lists on an RGBA canvas

use super::paint::{DisplayList, ImageSource, PaintCommand};
use crate::chart::Rgba;
use crate::{Error, Result};
use base64::Engine as _;
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::RgbaImage;
use std::f32::consts::TAU;

/// An off-screen raster buffer.
///
/// Drawing an image that is not origin-clean taints the canvas; a tainted
/// canvas still accepts drawing but refuses to hand out its pixels.
pub struct Canvas {
    pixels: RgbaImage,
    tainted_by: Option<String>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, image::Rgba(background.to_array())),
            tainted_by: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn is_tainted(&self) -> bool {
        self.tainted_by.is_some()
    }

    fn blend(&mut self, x: i32, y: i32, c: Rgba) {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return;
        }
        let px = self.pixels.get_pixel_mut(x as u32, y as u32);
        match c.3 {
            0 => {}
            255 => px.0 = c.to_array(),
            a => {
                let a = a as u32;
                let mix = |src: u8, dst: u8| ((src as u32 * a + dst as u32 * (255 - a)) / 255) as u8;
                let dst = px.0;
                let out_a = (a + dst[3] as u32 * (255 - a) / 255).min(255) as u8;
                px.0 = [mix(c.0, dst[0]), mix(c.1, dst[1]), mix(c.2, dst[2]), out_a];
            }
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, c: Rgba) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width as i32).min(self.width() as i32);
        let y1 = (y + height as i32).min(self.height() as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, c);
            }
        }
    }

    pub fn fill_rounded_rect(&mut self, x: i32, y: i32, width: u32, height: u32, radius: u32, c: Rgba) {
        let r = radius.min(width / 2).min(height / 2) as i32;
        if r == 0 {
            return self.fill_rect(x, y, width, height, c);
        }
        let (w, h) = (width as i32, height as i32);
        let r2 = (r * r) as f32;
        for py in 0..h {
            for px in 0..w {
                let cx = if px < r {
                    Some(r)
                } else if px >= w - r {
                    Some(w - r - 1)
                } else {
                    None
                };
                let cy = if py < r {
                    Some(r)
                } else if py >= h - r {
                    Some(h - r - 1)
                } else {
                    None
                };
                if let (Some(cx), Some(cy)) = (cx, cy) {
                    let dx = (px - cx) as f32;
                    let dy = (py - cy) as f32;
                    if dx * dx + dy * dy > r2 {
                        continue;
                    }
                }
                self.blend(x + px, y + py, c);
            }
        }
    }

    /// Fill an annular sector. Angles are radians clockwise from twelve o'clock.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_arc(&mut self, cx: f32, cy: f32, inner: f32, outer: f32, start: f32, sweep: f32, c: Rgba) {
        if outer <= 0.0 || sweep <= 0.0 {
            return;
        }
        let full = sweep >= TAU - f32::EPSILON;
        let x0 = (cx - outer).floor() as i32;
        let x1 = (cx + outer).ceil() as i32;
        let y0 = (cy - outer).floor() as i32;
        let y1 = (cy + outer).ceil() as i32;
        let (in2, out2) = (inner.max(0.0).powi(2), outer * outer);
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                let d2 = dx * dx + dy * dy;
                if d2 < in2 || d2 > out2 {
                    continue;
                }
                if !full {
                    let angle = dx.atan2(-dy).rem_euclid(TAU);
                    if (angle - start).rem_euclid(TAU) >= sweep {
                        continue;
                    }
                }
                self.blend(px, py, c);
            }
        }
    }

    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, c: Rgba) {
        let (mut x, mut y) = (x0, y0);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.blend(x, y, c);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draw `text` on the 8x8 glyph grid; unknown glyphs render as a hollow box.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: u32, c: Rgba) {
        let s = scale.max(1) as i32;
        let cell = 8 * s;
        for (i, ch) in text.chars().enumerate() {
            let gx = x + i as i32 * cell;
            match BASIC_FONTS.get(ch).or_else(|| LATIN_FONTS.get(ch)) {
                Some(rows) => {
                    for (row, bits) in rows.iter().enumerate() {
                        for col in 0..8 {
                            if bits & (1 << col) != 0 {
                                self.fill_rect(gx + col * s, y + row as i32 * s, s as u32, s as u32, c);
                            }
                        }
                    }
                }
                None => {
                    let (bx, by, side) = (gx + s, y + s, (6 * s) as u32);
                    self.fill_rect(bx, by, side, s as u32, c);
                    self.fill_rect(bx, by + (5 * s), side, s as u32, c);
                    self.fill_rect(bx, by, s as u32, side, c);
                    self.fill_rect(bx + 5 * s, by, s as u32, side, c);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_image(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        src: &str,
        origin_clean: bool,
        source: &ImageSource,
    ) {
        if !origin_clean && self.tainted_by.is_none() {
            log::debug!("Canvas tainted by cross-origin image {}", src);
            self.tainted_by = Some(src.to_string());
        }
        match source {
            ImageSource::Placeholder(fill) => self.fill_rect(x, y, width, height, *fill),
            ImageSource::Decoded(pixels) => {
                if pixels.width() == 0 || pixels.height() == 0 {
                    return;
                }
                for py in 0..height {
                    for px in 0..width {
                        let sx = (px as u64 * pixels.width() as u64 / width as u64) as u32;
                        let sy = (py as u64 * pixels.height() as u64 / height as u64) as u32;
                        let p = pixels.get_pixel(sx, sy).0;
                        self.blend(x + px as i32, y + py as i32, Rgba(p[0], p[1], p[2], p[3]));
                    }
                }
            }
        }
    }

    pub fn execute(&mut self, list: &DisplayList) {
        for cmd in &list.commands {
            match cmd {
                PaintCommand::SolidRect {
                    x,
                    y,
                    width,
                    height,
                    rgba,
                } => self.fill_rect(*x, *y, *width, *height, *rgba),
                PaintCommand::RoundedRect {
                    x,
                    y,
                    width,
                    height,
                    radius,
                    rgba,
                } => self.fill_rounded_rect(*x, *y, *width, *height, *radius, *rgba),
                PaintCommand::Text {
                    x,
                    y,
                    text,
                    scale,
                    rgba,
                } => self.draw_text(*x, *y, text, *scale, *rgba),
                PaintCommand::ArcSegment {
                    cx,
                    cy,
                    inner,
                    outer,
                    start,
                    sweep,
                    rgba,
                } => self.fill_arc(*cx, *cy, *inner, *outer, *start, *sweep, *rgba),
                PaintCommand::Line { x0, y0, x1, y1, rgba } => self.draw_line(*x0, *y0, *x1, *y1, *rgba),
                PaintCommand::Image {
                    x,
                    y,
                    width,
                    height,
                    src,
                    origin_clean,
                    source,
                } => self.draw_image(*x, *y, *width, *height, src, *origin_clean, source),
            }
        }
    }

    /// Read the pixels back, as `getImageData`/`toDataURL` would.
    pub fn read_pixels(&self) -> Result<&RgbaImage> {
        match &self.tainted_by {
            Some(src) => Err(Error::CaptureFailed(format!(
                "canvas is tainted by cross-origin image '{}'",
                src
            ))),
            None => Ok(&self.pixels),
        }
    }

    pub fn into_pixels(self) -> Result<RgbaImage> {
        self.read_pixels()?;
        Ok(self.pixels)
    }
}

/// Encode an RGBA buffer as PNG.
pub fn encode_png(pixels: &RgbaImage) -> Result<Vec<u8>> {
    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(Error::EncodeError("cannot encode an empty image".into()));
    }
    let mut out = std::io::Cursor::new(Vec::new());
    pixels.write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// `data:image/png;base64,...` form of encoded PNG bytes.
pub fn data_url(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}
