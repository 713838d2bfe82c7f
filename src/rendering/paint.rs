//! Paint commands and display-list construction

use super::layout::{self, Content, LayoutNode, TableLayout, CELL_PADDING, GLYPH, LEGEND_ROW};
use crate::chart::{ChartConfig, ChartKind, Rgba};
use crate::data::{format_number, format_percent};
use crate::dom::{Align, Document, ImageNode, NodeKind, TableNode, TextStyle};
use base64::Engine as _;
use std::f32::consts::TAU;
use std::sync::Arc;

/// Colour of the separators chart arcs are drawn with.
const ARC_BORDER: Rgba = Rgba::WHITE;
const PLACEHOLDER: Rgba = Rgba(0xCC, 0xCC, 0xCC, 255);

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Decoded(Arc<image::RgbaImage>),
    Placeholder(Rgba),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: Rgba,
    },
    RoundedRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        radius: u32,
        rgba: Rgba,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        scale: u32,
        rgba: Rgba,
    },
    /// Annular sector; angles in radians, clockwise from twelve o'clock.
    ArcSegment {
        cx: f32,
        cy: f32,
        inner: f32,
        outer: f32,
        start: f32,
        sweep: f32,
        rgba: Rgba,
    },
    Line {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        rgba: Rgba,
    },
    Image {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        src: String,
        origin_clean: bool,
        source: ImageSource,
    },
}

/// Ordered paint commands for a region whose top-left corner is (0, 0).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayList {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<PaintCommand>,
}

struct Painter<'a> {
    document: &'a Document,
    dx: i32,
    dy: i32,
    out: Vec<PaintCommand>,
}

/// Build the display list for `node` and its subtree, translated so the
/// node's border box starts at the origin.
pub fn display_list(node: &LayoutNode, document: &Document) -> DisplayList {
    let mut painter = Painter {
        document,
        dx: -node.rect().x,
        dy: -node.rect().y,
        out: Vec::new(),
    };
    painter.paint(node);
    DisplayList {
        width: node.rect().width,
        height: node.rect().height,
        commands: painter.out,
    }
}

/// Decode a base64 `data:` URL into pixels.
pub fn decode_data_url(src: &str) -> Option<image::RgbaImage> {
    let (meta, payload) = src.strip_prefix("data:")?.split_once(',')?;
    if !meta.ends_with(";base64") {
        return None;
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()?;
    image::load_from_memory(&bytes).ok().map(|i| i.to_rgba8())
}

impl Painter<'_> {
    fn push(&mut self, cmd: PaintCommand) {
        self.out.push(cmd);
    }

    fn rect(&mut self, x: i32, y: i32, width: u32, height: u32, radius: u32, rgba: Rgba) {
        let (x, y) = (x + self.dx, y + self.dy);
        if radius == 0 {
            self.push(PaintCommand::SolidRect {
                x,
                y,
                width,
                height,
                rgba,
            });
        } else {
            self.push(PaintCommand::RoundedRect {
                x,
                y,
                width,
                height,
                radius,
                rgba,
            });
        }
    }

    fn text(&mut self, x: i32, y: i32, text: &str, scale: u32, rgba: Rgba) {
        if text.is_empty() {
            return;
        }
        self.push(PaintCommand::Text {
            x: x + self.dx,
            y: y + self.dy,
            text: text.to_string(),
            scale,
            rgba,
        });
    }

    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, rgba: Rgba) {
        self.push(PaintCommand::Line {
            x0: x0 + self.dx,
            y0: y0 + self.dy,
            x1: x1 + self.dx,
            y1: y1 + self.dy,
            rgba,
        });
    }

    fn paint(&mut self, node: &LayoutNode) {
        let r = node.rect().clone();
        match &node.kind {
            NodeKind::Block(style) => {
                if let Some(bg) = style.background {
                    self.rect(r.x, r.y, r.width, r.height, style.radius, bg);
                }
            }
            NodeKind::Row { .. } => {}
            NodeKind::Text { style, .. } => {
                if let Content::Lines(lines) = &node.content {
                    self.paint_lines(&r, lines, style);
                }
            }
            NodeKind::Table(table) => {
                if let Content::Table(t) = &node.content {
                    self.paint_table(&r, table, t);
                }
            }
            NodeKind::Chart { config, plot } => match config.kind {
                ChartKind::Bar => self.paint_bars(&r, config),
                ChartKind::Doughnut | ChartKind::Pie => self.paint_radial(&r, config, *plot),
            },
            NodeKind::Progress {
                label,
                value,
                color,
                track,
            } => self.paint_progress(&r, label, *value, *color, *track),
            NodeKind::Image(img) => self.paint_image(&r, img),
            NodeKind::Button {
                label,
                background,
                color,
            } => {
                self.rect(r.x, r.y, r.width, r.height, 10, *background);
                let tx = r.x + (r.width.saturating_sub(layout::text_width(label, 1)) / 2) as i32;
                self.text(tx, r.y + layout::BUTTON_PADDING.1 as i32, label, 1, *color);
            }
        }
        for child in &node.children {
            self.paint(child);
        }
    }

    fn paint_lines(&mut self, r: &layout::Rect, lines: &[String], style: &TextStyle) {
        let lh = layout::line_height(style.scale) as i32;
        for (i, line) in lines.iter().enumerate() {
            let x = match style.align {
                Align::Start => r.x,
                Align::Center => {
                    r.x + (r.width.saturating_sub(layout::text_width(line, style.scale)) / 2) as i32
                }
            };
            self.text(x, r.y + i as i32 * lh, line, style.scale, style.color);
        }
    }

    fn paint_cell(&mut self, x: i32, y: i32, width: u32, lines: &[String], center: bool, rgba: Rgba) {
        let lh = layout::line_height(1) as i32;
        for (i, line) in lines.iter().enumerate() {
            let lx = if center {
                x + (width.saturating_sub(layout::text_width(line, 1)) / 2) as i32
            } else {
                x + CELL_PADDING as i32
            };
            self.text(lx, y + CELL_PADDING as i32 + i as i32 * lh, line, 1, rgba);
        }
    }

    fn paint_table(&mut self, r: &layout::Rect, table: &TableNode, t: &TableLayout) {
        let cw = t.column_width;
        let mut y = r.y;
        for (col, lines) in t.header_lines.iter().enumerate() {
            let x = r.x + (col as u32 * cw) as i32;
            if !lines.is_empty() {
                self.rect(x + 1, y, cw.saturating_sub(2), t.header_height, 8, table.header_background);
            }
            self.paint_cell(x, y, cw, lines, true, table.header_text);
        }
        y += t.header_height as i32;

        for (row, (cells, &h)) in t.cell_lines.iter().zip(&t.row_heights).enumerate() {
            if let (Some(stripe), true) = (table.stripe, row % 2 == 1) {
                self.rect(r.x, y, r.width, h, 0, stripe);
            }
            for (col, lines) in cells.iter().enumerate() {
                let x = r.x + (col as u32 * cw) as i32;
                let (rgba, center) = match (col, table.label_color) {
                    (0, Some(label)) => (label, false),
                    (0, None) => (table.text, false),
                    _ => (table.text, true),
                };
                self.paint_cell(x, y, cw, lines, center, rgba);
            }
            if let Some(rule) = table.rule {
                let bottom = y + h as i32 - 1;
                self.line(r.x, bottom, r.right() - 1, bottom, rule);
            }
            y += h as i32;
        }
    }

    fn paint_radial(&mut self, r: &layout::Rect, config: &ChartConfig, plot: u32) {
        let diameter = r.width.min(plot) as f32;
        let cx = (r.x + self.dx) as f32 + r.width as f32 / 2.0;
        let cy = (r.y + self.dy) as f32 + plot as f32 / 2.0;
        let outer = (diameter / 2.0 - 2.0).max(0.0);
        let cutout = if config.kind == ChartKind::Pie {
            0.0
        } else {
            config.options.cutout.clamp(0.0, 0.95)
        };
        let hole = outer * cutout;
        let rings = config.datasets.len().max(1) as f32;
        let thickness = (outer - hole) / rings;

        for (i, ds) in config.datasets.iter().enumerate() {
            let ring_outer = outer - thickness * i as f32;
            let ring_inner = ring_outer - thickness;
            let total: f64 = ds.data.iter().filter(|v| **v > 0.0).sum();
            if total <= 0.0 {
                continue;
            }
            let mut start = 0.0f32;
            let mut boundaries = Vec::new();
            for (j, v) in ds.data.iter().enumerate() {
                if *v <= 0.0 {
                    continue;
                }
                let sweep = (*v / total) as f32 * TAU;
                self.push(PaintCommand::ArcSegment {
                    cx,
                    cy,
                    inner: ring_inner,
                    outer: ring_outer,
                    start,
                    sweep,
                    rgba: ds.color_at(j),
                });
                boundaries.push(start);
                start += sweep;
            }
            if ds.border_width > 0 && boundaries.len() > 1 {
                for a in boundaries {
                    let (s, c) = a.sin_cos();
                    self.push(PaintCommand::Line {
                        x0: (cx + s * ring_inner).round() as i32,
                        y0: (cy - c * ring_inner).round() as i32,
                        x1: (cx + s * ring_outer).round() as i32,
                        y1: (cy - c * ring_outer).round() as i32,
                        rgba: ARC_BORDER,
                    });
                }
            }
        }

        if config.options.legend {
            let ds = config.datasets.first();
            let mut y = r.y + plot as i32 + 8;
            for (i, label) in config.labels.iter().enumerate() {
                let color = ds.map(|d| d.color_at(i)).unwrap_or(Rgba::BLACK);
                let value = ds
                    .and_then(|d| d.data.get(i))
                    .map(|v| format!(" ({})", format_number(*v)))
                    .unwrap_or_default();
                self.rect(r.x, y, 10, 10, 0, color);
                self.text(r.x + 16, y + 1, &format!("{}{}", label, value), 1, config.options.text_color);
                y += LEGEND_ROW as i32;
            }
        }
    }

    fn paint_bars(&mut self, r: &layout::Rect, config: &ChartConfig) {
        let Some(ds) = config.datasets.first() else {
            return;
        };
        let axis = config.options.text_color;
        let left = (GLYPH * 7) as i32;
        let bottom_margin = (GLYPH + 6) as i32;
        let plot_x = r.x + left;
        let plot_w = r.width.saturating_sub(left as u32 + 4);
        let plot_top = r.y + 4;
        let plot_h = (r.height as i32 - bottom_margin - 4).max(1);
        let base_y = plot_top + plot_h;

        let max = ds.data.iter().cloned().fold(0.0f64, f64::max);
        let scale_max = nice_ceiling(max);
        const TICKS: i32 = 4;
        for t in 0..=TICKS {
            let y = base_y - plot_h * t / TICKS;
            let value = scale_max * t as f64 / TICKS as f64;
            let label = format_number(value.round());
            let lx = plot_x - 4 - layout::text_width(&label, 1) as i32;
            self.text(lx, y - 4, &label, 1, axis);
            let grid = Rgba(axis.0, axis.1, axis.2, 60);
            self.line(plot_x, y, plot_x + plot_w as i32, y, grid);
        }

        let n = ds.data.len().max(config.labels.len()).max(1) as u32;
        let slot = plot_w / n;
        let bar_w = (slot * 3 / 5).max(1);
        for i in 0..n as usize {
            let sx = plot_x + (slot * i as u32) as i32;
            if let Some(v) = ds.data.get(i) {
                let h = if scale_max > 0.0 {
                    ((v.max(0.0) / scale_max) * plot_h as f64).round() as u32
                } else {
                    0
                };
                let bx = sx + (slot.saturating_sub(bar_w) / 2) as i32;
                self.rect(bx, base_y - h as i32, bar_w, h, 0, ds.color_at(i));
            }
            if let Some(label) = config.labels.get(i) {
                let max_chars = (slot / GLYPH) as usize;
                let shown: String = label.chars().take(max_chars.max(1)).collect();
                let lx = sx + (slot.saturating_sub(layout::text_width(&shown, 1)) / 2) as i32;
                self.text(lx, base_y + 6, &shown, 1, axis);
            }
        }
    }

    fn paint_progress(&mut self, r: &layout::Rect, label: &str, value: f64, color: Rgba, track: Rgba) {
        let label_w = (GLYPH * 6) as i32;
        let ty = r.y + ((r.height - GLYPH) / 2) as i32;
        self.text(r.x, ty, label, 1, color);

        let track_x = r.x + label_w + 10;
        let track_w = r.width * 3 / 5;
        self.rect(track_x, r.y, track_w, r.height, 8, track);

        let fill = ((value.clamp(0.0, 100.0) / 100.0) * track_w as f64).round() as u32;
        if fill > 0 {
            self.rect(track_x, r.y, fill, r.height, 8u32.min(fill / 2), color);
        }
        let text = format_percent(value);
        let text_w = layout::text_width(&text, 1);
        if fill >= text_w + 20 {
            self.text(track_x + 10, ty, &text, 1, Rgba::WHITE);
        } else {
            self.text(track_x + fill as i32 + 6, ty, &text, 1, color);
        }
    }

    fn paint_image(&mut self, r: &layout::Rect, img: &ImageNode) {
        let origin_clean = self.document.image_is_origin_clean(img);
        let source = match decode_data_url(&img.src) {
            Some(pixels) => ImageSource::Decoded(Arc::new(pixels)),
            None => {
                if img.src.starts_with("data:") {
                    log::warn!("Could not decode inline image; drawing placeholder");
                }
                ImageSource::Placeholder(PLACEHOLDER)
            }
        };
        self.push(PaintCommand::Image {
            x: r.x + self.dx,
            y: r.y + self.dy,
            width: r.width,
            height: r.height,
            src: img.src.clone(),
            origin_clean,
            source,
        });
    }
}

/// Round `max` up to 1, 2 or 5 times a power of ten.
fn nice_ceiling(max: f64) -> f64 {
    if max <= 0.0 || !max.is_finite() {
        return 0.0;
    }
    let magnitude = 10f64.powf(max.log10().floor());
    for step in [1.0, 2.0, 5.0, 10.0] {
        if step * magnitude >= max {
            return step * magnitude;
        }
    }
    10.0 * magnitude
}
