//! Render tree
//!
//! A [`Document`] is the in-memory equivalent of a rendered page: a tree of
//! styled nodes, some of which carry a stable [`ContainerId`] so they can be
//! located for capture. Nodes are plain data; geometry lives in
//! [`crate::rendering::layout`].

use crate::chart::{ChartConfig, Rgba};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod compose;

/// Stable identifier of an on-screen container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub String);

impl ContainerId {
    pub const DASHBOARD_ROOT: &'static str = "dashboard-root";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn dashboard_root() -> Self {
        Self::new(Self::DASHBOARD_ROOT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Start,
    Center,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxStyle {
    pub background: Option<Rgba>,
    pub padding: u32,
    pub radius: u32,
    /// Vertical space between children.
    pub gap: u32,
    /// Horizontal placement of children narrower than the content box.
    pub align: Align,
    /// Caps the border-box width; the box is centred in the extra space.
    pub max_width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: Rgba,
    /// Glyph scale; a glyph cell is `8 * scale` pixels square.
    pub scale: u32,
    pub align: Align,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableNode {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub header_background: Rgba,
    pub header_text: Rgba,
    pub text: Rgba,
    /// Colour of the first column, when it acts as a row label.
    pub label_color: Option<Rgba>,
    /// Alternate-row background.
    pub stripe: Option<Rgba>,
    /// Rule drawn under each body row.
    pub rule: Option<Rgba>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    /// Absolute or document-relative URL, or a `data:` URL.
    pub src: String,
    pub width: u32,
    pub height: u32,
    /// Whether the element requested CORS (`crossorigin` attribute).
    pub cross_origin: bool,
    /// Whether the image host answered with a permitting CORS response.
    pub cors_granted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Block(BoxStyle),
    Row { gap: u32, min_child_width: u32 },
    Text { text: String, style: TextStyle },
    Table(TableNode),
    Chart { config: ChartConfig, plot: u32 },
    Progress {
        label: String,
        value: f64,
        color: Rgba,
        track: Rgba,
    },
    Image(ImageNode),
    Button {
        label: String,
        background: Rgba,
        color: Rgba,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: Option<ContainerId>,
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: None,
            kind,
            children: Vec::new(),
        }
    }

    pub fn block(style: BoxStyle, children: Vec<Node>) -> Self {
        Self {
            id: None,
            kind: NodeKind::Block(style),
            children,
        }
    }

    pub fn row(gap: u32, min_child_width: u32, children: Vec<Node>) -> Self {
        Self {
            id: None,
            kind: NodeKind::Row {
                gap,
                min_child_width,
            },
            children,
        }
    }

    pub fn text(text: &str, color: Rgba, scale: u32, align: Align) -> Self {
        Self::new(NodeKind::Text {
            text: text.to_string(),
            style: TextStyle {
                color,
                scale,
                align,
            },
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(ContainerId::new(id));
        self
    }

    fn find(&self, id: &ContainerId) -> Option<&Node> {
        if self.id.as_ref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    fn find_mut(&mut self, id: &ContainerId) -> Option<&mut Node> {
        if self.id.as_ref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    fn remove(&mut self, id: &ContainerId) -> Option<Node> {
        if let Some(pos) = self.children.iter().position(|c| c.id.as_ref() == Some(id)) {
            return Some(self.children.remove(pos));
        }
        self.children.iter_mut().find_map(|c| c.remove(id))
    }

    fn collect_text(&self, out: &mut Vec<String>) {
        match &self.kind {
            NodeKind::Text { text, .. } => out.push(text.clone()),
            NodeKind::Table(t) => {
                out.push(t.headers.join("\t"));
                out.extend(t.rows.iter().map(|r| r.join("\t")));
            }
            NodeKind::Progress { label, value, .. } => {
                out.push(format!("{} {}", label, crate::data::format_percent(*value)))
            }
            NodeKind::Chart { config, .. } => {
                if !config.labels.is_empty() {
                    out.push(config.labels.join("\t"));
                }
            }
            NodeKind::Button { label, .. } => out.push(label.clone()),
            _ => {}
        }
        for c in &self.children {
            c.collect_text(out);
        }
    }
}

/// A render tree plus the origin it was served from.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    /// Document origin; images from other origins taint captures.
    pub origin: url::Url,
    pub root: Node,
}

impl Document {
    pub const DEFAULT_ORIGIN: &'static str = "https://dashsnap.localhost/";

    pub fn new(title: &str, root: Node) -> Self {
        let origin = url::Url::parse(Self::DEFAULT_ORIGIN).expect("default origin is a valid URL");
        Self {
            title: title.to_string(),
            origin,
            root,
        }
    }

    pub fn with_origin(mut self, origin: &str) -> Result<Self> {
        self.origin = url::Url::parse(origin)
            .map_err(|e| Error::ConfigError(format!("Invalid origin '{}': {}", origin, e)))?;
        Ok(self)
    }

    pub fn find(&self, id: &ContainerId) -> Option<&Node> {
        self.root.find(id)
    }

    pub fn find_mut(&mut self, id: &ContainerId) -> Option<&mut Node> {
        self.root.find_mut(id)
    }

    /// Detach the node with `id` from the tree. The root itself cannot be removed.
    pub fn remove(&mut self, id: &ContainerId) -> Option<Node> {
        self.root.remove(id)
    }

    /// Replace the text of a text node.
    pub fn set_text(&mut self, id: &ContainerId, text: &str) -> Result<()> {
        let node = self
            .find_mut(id)
            .ok_or_else(|| Error::TargetNotFound(id.to_string()))?;
        match &mut node.kind {
            NodeKind::Text { text: t, .. } => {
                *t = text.to_string();
                Ok(())
            }
            _ => Err(Error::Other(format!("Element '{}' is not a text node", id))),
        }
    }

    pub fn append_child(&mut self, parent: &ContainerId, child: Node) -> Result<()> {
        let node = self
            .find_mut(parent)
            .ok_or_else(|| Error::TargetNotFound(parent.to_string()))?;
        node.children.push(child);
        Ok(())
    }

    /// Whether pixels of `image` may be read back from a canvas it was drawn on.
    pub fn image_is_origin_clean(&self, image: &ImageNode) -> bool {
        if image.src.starts_with("data:") {
            return true;
        }
        match self.origin.join(&image.src) {
            Ok(resolved) => {
                resolved.origin() == self.origin.origin() || (image.cross_origin && image.cors_granted)
            }
            Err(_) => false,
        }
    }

    /// Visible text in document order, one entry per text-bearing node.
    pub fn text_content(&self) -> String {
        let mut out = Vec::new();
        self.root.collect_text(&mut out);
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let root = Node::block(
            BoxStyle::default(),
            vec![Node::block(
                BoxStyle::default(),
                vec![Node::text("Hello", Rgba::BLACK, 1, Align::Start).with_id("greeting")],
            )
            .with_id("dashboard-root")],
        );
        Document::new("Sample", root)
    }

    fn image(src: &str, cross_origin: bool, cors_granted: bool) -> ImageNode {
        ImageNode {
            src: src.into(),
            width: 4,
            height: 4,
            cross_origin,
            cors_granted,
        }
    }

    #[test]
    fn find_and_remove_by_id() {
        let mut doc = sample();
        assert!(doc.find(&ContainerId::dashboard_root()).is_some());
        assert!(doc.find(&"greeting".into()).is_some());
        let removed = doc.remove(&ContainerId::dashboard_root()).unwrap();
        assert_eq!(removed.id, Some(ContainerId::dashboard_root()));
        assert!(doc.find(&"greeting".into()).is_none());
        assert!(doc.remove(&"greeting".into()).is_none());
    }

    #[test]
    fn set_text_updates_content() {
        let mut doc = sample();
        doc.set_text(&"greeting".into(), "Bye").unwrap();
        assert_eq!(doc.text_content(), "Bye");
        assert!(matches!(
            doc.set_text(&"missing".into(), "x"),
            Err(Error::TargetNotFound(_))
        ));
        assert!(doc.set_text(&ContainerId::dashboard_root(), "x").is_err());
    }

    #[test]
    fn image_origin_rules() {
        let doc = sample();
        assert!(doc.image_is_origin_clean(&image("logo.png", false, false)));
        assert!(doc.image_is_origin_clean(&image("https://dashsnap.localhost/a.png", false, false)));
        assert!(doc.image_is_origin_clean(&image("data:image/png;base64,AAAA", false, false)));
        assert!(!doc.image_is_origin_clean(&image("https://cdn.example.com/a.png", false, false)));
        assert!(!doc.image_is_origin_clean(&image("https://cdn.example.com/a.png", true, false)));
        assert!(doc.image_is_origin_clean(&image("https://cdn.example.com/a.png", true, true)));
    }
}
