//! Box layout for the render tree
//!
//! Blocks stack their children vertically, rows share the available width
//! equally (falling back to stacking when a child would get narrower than the
//! row's minimum), and text wraps on an 8 px glyph grid.

use crate::chart::ChartKind;
use crate::dom::{Align, ContainerId, Document, Node, NodeKind, TableNode};
use crate::Viewport;

/// Width and height of one glyph cell at scale 1.
pub const GLYPH: u32 = 8;
/// Vertical space between wrapped lines at scale 1.
pub const LINE_GAP: u32 = 2;
pub const CELL_PADDING: u32 = 6;
pub const PROGRESS_HEIGHT: u32 = 28;
pub const LEGEND_ROW: u32 = 14;
pub const BUTTON_PADDING: (u32, u32) = (24, 12);

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxModel {
    pub margin: u32,
    pub border: u32,
    pub padding: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    pub rect: Rect,
    pub box_model: BoxModel,
}

impl LayoutBox {
    fn new(x: i32, y: i32, width: u32, height: u32, padding: u32) -> Self {
        Self {
            rect: Rect {
                x,
                y,
                width,
                height,
            },
            box_model: BoxModel {
                margin: 0,
                border: 0,
                padding,
            },
        }
    }

    pub fn content_width(&self) -> u32 {
        let total = self.box_model.margin + self.box_model.border + self.box_model.padding * 2;
        self.rect.width.saturating_sub(total)
    }
}

/// Wrapped table text, one entry per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub column_width: u32,
    pub header_height: u32,
    pub header_lines: Vec<Vec<String>>,
    pub row_heights: Vec<u32>,
    pub cell_lines: Vec<Vec<Vec<String>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    None,
    Lines(Vec<String>),
    Table(TableLayout),
}

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub lb: LayoutBox,
    pub id: Option<ContainerId>,
    pub kind: NodeKind,
    pub content: Content,
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    pub fn rect(&self) -> &Rect {
        &self.lb.rect
    }

    pub fn find(&self, id: &ContainerId) -> Option<&LayoutNode> {
        if self.id.as_ref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Find `id` together with the background painted behind it: the nearest
    /// background of the node itself or one of its ancestors.
    pub fn find_with_backdrop(
        &self,
        id: &ContainerId,
        inherited: Option<crate::chart::Rgba>,
    ) -> Option<(&LayoutNode, Option<crate::chart::Rgba>)> {
        let own = match &self.kind {
            NodeKind::Block(style) => style.background.or(inherited),
            _ => inherited,
        };
        if self.id.as_ref() == Some(id) {
            return Some((self, own));
        }
        self.children
            .iter()
            .find_map(|c| c.find_with_backdrop(id, own))
    }
}

pub fn line_height(scale: u32) -> u32 {
    (GLYPH + LINE_GAP) * scale.max(1)
}

pub fn chars_per_line(width: u32, scale: u32) -> usize {
    let cell = GLYPH * scale.max(1);
    if width >= cell {
        (width / cell) as usize
    } else {
        1
    }
}

/// Greedy word wrap; words longer than a line are split.
pub fn wrap_text(text: &str, chars_per_line: usize) -> Vec<String> {
    let limit = chars_per_line.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut cur = String::new();
        let mut cur_len = 0usize;
        for word in paragraph.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > limit {
                if cur_len > 0 {
                    lines.push(std::mem::take(&mut cur));
                    cur_len = 0;
                }
                let rest = chars.split_off(limit);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }
            let wlen = chars.len();
            if cur_len > 0 && cur_len + wlen + 1 > limit {
                lines.push(std::mem::take(&mut cur));
                cur_len = 0;
            }
            if cur_len > 0 {
                cur.push(' ');
                cur_len += 1;
            }
            cur.extend(chars);
            cur_len += wlen;
        }
        if cur_len > 0 || lines.is_empty() {
            lines.push(cur);
        }
    }
    lines
}

/// Number of glyph cells `text` occupies.
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH * scale.max(1)
}

fn legend_height(kind: ChartKind, legend: bool, labels: usize) -> u32 {
    if legend && kind != ChartKind::Bar && labels > 0 {
        labels as u32 * LEGEND_ROW + 8
    } else {
        0
    }
}

/// Preferred width of nodes that do not stretch to fill their parent.
fn intrinsic_width(node: &Node) -> Option<u32> {
    match &node.kind {
        NodeKind::Button { label, .. } => Some(text_width(label, 1) + BUTTON_PADDING.0 * 2),
        NodeKind::Image(img) => Some(img.width),
        NodeKind::Chart { config, plot } if config.kind != ChartKind::Bar && !config.options.legend => {
            Some(*plot)
        }
        _ => None,
    }
}

fn layout_table(table: &TableNode, width: u32) -> TableLayout {
    let cols = table
        .rows
        .iter()
        .map(|r| r.len())
        .chain(std::iter::once(table.headers.len()))
        .max()
        .unwrap_or(0)
        .max(1);
    let column_width = width / cols as u32;
    let cpl = chars_per_line(column_width.saturating_sub(CELL_PADDING * 2), 1);
    let lh = line_height(1);

    let wrap_row = |cells: &[String]| -> (Vec<Vec<String>>, u32) {
        let lines: Vec<Vec<String>> = (0..cols)
            .map(|i| match cells.get(i) {
                Some(c) if !c.is_empty() => wrap_text(c, cpl),
                _ => Vec::new(),
            })
            .collect();
        let n = lines.iter().map(|l| l.len()).max().unwrap_or(0).max(1) as u32;
        (lines, n * lh + CELL_PADDING * 2)
    };

    let (header_lines, header_height) = if table.headers.is_empty() {
        (Vec::new(), 0)
    } else {
        wrap_row(&table.headers)
    };
    let mut row_heights = Vec::with_capacity(table.rows.len());
    let mut cell_lines = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let (lines, h) = wrap_row(row);
        row_heights.push(h);
        cell_lines.push(lines);
    }
    TableLayout {
        column_width,
        header_height,
        header_lines,
        row_heights,
        cell_lines,
    }
}

fn stretch(node: &mut LayoutNode, height: u32) {
    if matches!(node.kind, NodeKind::Block(_)) {
        node.lb.rect.height = node.lb.rect.height.max(height);
    }
}

fn stack(children: &[Node], x: i32, y: i32, width: u32, gap: u32, align: Align) -> (Vec<LayoutNode>, u32) {
    let mut out = Vec::with_capacity(children.len());
    let mut cy = y;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            cy += gap as i32;
        }
        let cw = intrinsic_width(child).map(|w| w.min(width)).unwrap_or(width);
        let cx = match align {
            Align::Start => x,
            Align::Center => x + ((width - cw) / 2) as i32,
        };
        let laid = layout_node(child, cx, cy, cw);
        cy += laid.lb.rect.height as i32;
        out.push(laid);
    }
    (out, (cy - y) as u32)
}

/// Lay out `node` with its border box starting at (`x`, `y`) and `width` wide.
pub fn layout_node(node: &Node, x: i32, y: i32, width: u32) -> LayoutNode {
    let mut content = Content::None;
    let mut children = Vec::new();
    let (x, width, height, padding) = match &node.kind {
        NodeKind::Block(style) => {
            let (x, width) = match style.max_width {
                Some(max) if width > max => (x + ((width - max) / 2) as i32, max),
                _ => (x, width),
            };
            let pad = style.padding;
            let (laid, h) = stack(
                &node.children,
                x + pad as i32,
                y + pad as i32,
                width.saturating_sub(pad * 2),
                style.gap,
                style.align,
            );
            children = laid;
            (x, width, h + pad * 2, pad)
        }
        NodeKind::Row {
            gap,
            min_child_width,
        } => {
            let n = node.children.len() as u32;
            if n == 0 {
                (x, width, 0, 0)
            } else {
                let per = width.saturating_sub(gap * (n - 1)) / n;
                if *min_child_width > 0 && per < *min_child_width {
                    let (laid, h) = stack(&node.children, x, y, width, *gap, Align::Start);
                    children = laid;
                    (x, width, h, 0)
                } else {
                    let mut cx = x;
                    for child in &node.children {
                        children.push(layout_node(child, cx, y, per));
                        cx += (per + gap) as i32;
                    }
                    let h = children.iter().map(|c| c.lb.rect.height).max().unwrap_or(0);
                    for c in children.iter_mut() {
                        stretch(c, h);
                    }
                    (x, width, h, 0)
                }
            }
        }
        NodeKind::Text { text, style } => {
            let lines = wrap_text(text, chars_per_line(width, style.scale));
            let h = lines.len() as u32 * line_height(style.scale);
            content = Content::Lines(lines);
            (x, width, h, 0)
        }
        NodeKind::Table(table) => {
            let t = layout_table(table, width);
            let h = t.header_height + t.row_heights.iter().sum::<u32>();
            content = Content::Table(t);
            (x, width, h, 0)
        }
        NodeKind::Chart { config, plot } => {
            let legend = legend_height(config.kind, config.options.legend, config.labels.len());
            (x, width, plot + legend, 0)
        }
        NodeKind::Progress { .. } => (x, width, PROGRESS_HEIGHT, 0),
        NodeKind::Image(img) => {
            let w = img.width.min(width);
            let h = if img.width == 0 {
                0
            } else {
                (img.height as u64 * w as u64 / img.width as u64) as u32
            };
            (x, w, h, 0)
        }
        NodeKind::Button { .. } => (x, width, GLYPH + BUTTON_PADDING.1 * 2, BUTTON_PADDING.1),
    };

    LayoutNode {
        lb: LayoutBox::new(x, y, width, height, padding),
        id: node.id.clone(),
        kind: node.kind.clone(),
        content,
        children,
    }
}

/// Lay out the whole document for `viewport`. The page is at least as tall as
/// the viewport and grows with its content.
pub fn layout_document(document: &Document, viewport: Viewport) -> LayoutNode {
    let mut root = layout_node(&document.root, 0, 0, viewport.width);
    stretch(&mut root, viewport.height);
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Rgba;
    use crate::dom::{BoxStyle, Node};

    fn text(s: &str) -> Node {
        Node::text(s, Rgba::BLACK, 1, Align::Start)
    }

    #[test]
    fn wraps_on_words_and_splits_long_words() {
        assert_eq!(wrap_text("Hello world", 5), vec!["Hello", "world"]);
        assert_eq!(wrap_text("Hello world", 20), vec!["Hello world"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("", 4), vec![""]);
        assert_eq!(wrap_text("a\nb", 10), vec!["a", "b"]);
    }

    #[test]
    fn block_stacks_children_with_gap_and_padding() {
        let node = Node::block(
            BoxStyle {
                padding: 10,
                gap: 4,
                ..Default::default()
            },
            vec![text("one"), text("two")],
        );
        let l = layout_node(&node, 0, 0, 200);
        assert_eq!(l.children[0].rect().y, 10);
        assert_eq!(l.children[1].rect().y, 10 + 10 + 4);
        assert_eq!(l.rect().height, 10 + 10 + 4 + 10 + 10);
        assert_eq!(l.children[0].rect().width, 180);
        assert_eq!(l.lb.content_width(), 180);
    }

    #[test]
    fn row_wraps_below_min_child_width() {
        let row = Node::row(32, 340, vec![text("a"), text("b")]);
        let wide = layout_node(&row, 0, 0, 1000);
        assert_eq!(wide.children[0].rect().y, wide.children[1].rect().y);
        assert_eq!(wide.children[1].rect().x, 484 + 32);

        let narrow = layout_node(&row, 0, 0, 500);
        assert!(narrow.children[1].rect().y > narrow.children[0].rect().y);
        assert_eq!(narrow.children[1].rect().width, 500);
    }

    #[test]
    fn centered_button_uses_intrinsic_width() {
        let node = Node::block(
            BoxStyle {
                align: Align::Center,
                ..Default::default()
            },
            vec![Node::new(NodeKind::Button {
                label: "Go".into(),
                background: Rgba::BLACK,
                color: Rgba::WHITE,
            })],
        );
        let l = layout_node(&node, 0, 0, 200);
        let b = &l.children[0];
        assert_eq!(b.rect().width, 16 + 48);
        assert_eq!(b.rect().x, (200 - 64) / 2);
    }

    #[test]
    fn padded_width_shrinks_monotonically() {
        let inner = Node::block(BoxStyle::default(), vec![text("x")]).with_id("inner");
        let page = Node::block(
            BoxStyle {
                padding: 32,
                ..Default::default()
            },
            vec![inner],
        );
        let doc = Document::new("t", page);
        let id = ContainerId::new("inner");
        let mut last = 0;
        for w in 0..=200 {
            let l = layout_document(&doc, Viewport { width: w, height: 50 });
            let width = l.find(&id).unwrap().rect().width;
            assert_eq!(width, w.saturating_sub(64), "viewport {}", w);
            assert!(width >= last);
            last = width;
        }
    }

    #[test]
    fn page_fills_viewport_height() {
        let doc = Document::new("t", Node::block(BoxStyle::default(), vec![text("x")]));
        let l = layout_document(&doc, Viewport { width: 300, height: 400 });
        assert_eq!(l.rect().height, 400);
        assert_eq!(l.rect().width, 300);
    }
}
