//! Rendering pipeline: layout, paint and raster
//!
//! A capture lays out the whole document at the configured viewport, locates
//! the requested container, paints only that subtree and rasterizes it into a
//! canvas exactly the size of the container's border box.

pub mod layout;
pub mod paint;
pub mod raster;

use crate::chart::Rgba;
use crate::dom::{ContainerId, Document};
use crate::{Error, Result, Viewport};
use image::RgbaImage;

/// Encoded output of a capture.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    pub fn data_url(&self) -> String {
        raster::data_url(&self.png_data)
    }
}

/// Raw pixels of a captured container.
#[derive(Debug, Clone)]
pub struct Capture {
    pub container: ContainerId,
    pub pixels: RgbaImage,
}

impl Capture {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn encode(&self) -> Result<Screenshot> {
        Ok(Screenshot {
            width: self.width(),
            height: self.height(),
            png_data: raster::encode_png(&self.pixels)?,
        })
    }
}

/// Rasterize the container `id` of `document`.
///
/// The canvas is cleared to the nearest background behind the container
/// (white when none is set).
pub fn capture_region(document: &Document, id: &ContainerId, viewport: Viewport) -> Result<Capture> {
    let tree = layout::layout_document(document, viewport);
    let (node, backdrop) = tree
        .find_with_backdrop(id, None)
        .ok_or_else(|| Error::TargetNotFound(id.to_string()))?;
    let rect = node.rect();
    if rect.width == 0 || rect.height == 0 {
        return Err(Error::CaptureFailed(format!(
            "element '{}' has no rendered area ({}x{})",
            id, rect.width, rect.height
        )));
    }
    let list = paint::display_list(node, document);
    log::debug!(
        "Capturing '{}' at {}x{} ({} paint commands)",
        id,
        list.width,
        list.height,
        list.commands.len()
    );
    let mut canvas = raster::Canvas::new(list.width, list.height, backdrop.unwrap_or(Rgba::WHITE));
    canvas.execute(&list);
    Ok(Capture {
        container: id.clone(),
        pixels: canvas.into_pixels()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Align, BoxStyle, Node};

    fn doc() -> Document {
        Document::new(
            "t",
            Node::block(
                BoxStyle {
                    background: Some(Rgba(10, 20, 30, 255)),
                    padding: 8,
                    ..Default::default()
                },
                vec![
                    Node::block(BoxStyle::default(), vec![Node::text("Hello", Rgba::WHITE, 1, Align::Start)])
                        .with_id("box"),
                    Node::block(BoxStyle::default(), Vec::new()).with_id("empty"),
                ],
            ),
        )
    }

    #[test]
    fn capture_matches_container_size() {
        let cap = capture_region(&doc(), &"box".into(), Viewport { width: 200, height: 100 }).unwrap();
        assert_eq!((cap.width(), cap.height()), (184, 10));
        // backdrop inherited from the page block
        assert_eq!(cap.pixels.get_pixel(183, 9).0, [10, 20, 30, 255]);
        let shot = cap.encode().unwrap();
        assert!(shot.data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn missing_container_is_target_not_found() {
        let err = capture_region(&doc(), &"nope".into(), Viewport::default()).unwrap_err();
        assert!(matches!(err, Error::TargetNotFound(id) if id == "nope"));
    }

    #[test]
    fn zero_area_container_fails_capture() {
        let err = capture_region(&doc(), &"empty".into(), Viewport::default()).unwrap_err();
        assert!(matches!(err, Error::CaptureFailed(_)));
    }
}
