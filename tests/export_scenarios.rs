//! End-to-end export scenarios against an in-memory sink

use dashsnap::chart::Rgba;
use dashsnap::dom::{Align, BoxStyle, Document, ImageNode, Node, NodeKind};
use dashsnap::{ContainerId, Error, ExportConfig, Exporter, MemorySink, Surface, Viewport};
use std::sync::Arc;
use std::time::Duration;

fn hello_page() -> Document {
    let root = Node::block(
        BoxStyle {
            background: Some(Rgba::WHITE),
            padding: 10,
            ..Default::default()
        },
        vec![Node::text("Hello", Rgba::BLACK, 2, Align::Start).with_id("greeting")],
    )
    .with_id(ContainerId::DASHBOARD_ROOT);
    Document::new(
        "Hello",
        Node::block(
            BoxStyle {
                background: Some(Rgba(0xF7, 0xFA, 0xFC, 255)),
                padding: 16,
                ..Default::default()
            },
            vec![root],
        ),
    )
}

fn image(src: &str, cross_origin: bool, cors_granted: bool) -> Node {
    Node::new(NodeKind::Image(ImageNode {
        src: src.to_string(),
        width: 32,
        height: 16,
        cross_origin,
        cors_granted,
    }))
}

async fn exporter_with(document: Document, config: ExportConfig) -> (Exporter, Arc<MemorySink>) {
    let surface = Surface::spawn();
    surface.mount(document).await.expect("mount");
    let sink = Arc::new(MemorySink::new());
    (Exporter::new(surface, config, sink.clone()), sink)
}

fn small_config() -> ExportConfig {
    ExportConfig {
        viewport: Viewport {
            width: 240,
            height: 120,
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn hello_container_exports_valid_png() {
    let (exporter, sink) = exporter_with(hello_page(), small_config()).await;
    let receipt = exporter
        .export_region_as_image(&ContainerId::dashboard_root())
        .await
        .expect("export");

    // 240 - 2 * 16 padding; 10 + 20 (two-scale line) + 10
    assert_eq!((receipt.width, receipt.height), (208, 40));
    assert_eq!(receipt.file_name, "dashboard.png");

    let downloads = sink.downloads();
    assert_eq!(downloads.len(), 1);
    assert_eq!(downloads[0].file_name, "dashboard.png");

    let decoded = image::load_from_memory(&downloads[0].bytes)
        .expect("decode")
        .to_rgba8();
    assert_eq!(decoded.dimensions(), (208, 40));
    let mut found_black = false;
    let mut found_white = false;
    for p in decoded.pixels() {
        found_black |= p.0 == [0, 0, 0, 255];
        found_white |= p.0 == [255, 255, 255, 255];
    }
    assert!(found_black, "Expected rendered text pixels (black) in PNG");
    assert!(found_white, "Expected white background pixels in PNG");
}

#[tokio::test]
async fn removed_container_is_target_not_found() {
    let (exporter, sink) = exporter_with(hello_page(), small_config()).await;
    exporter
        .surface()
        .update(|doc| {
            doc.remove(&ContainerId::dashboard_root());
            Ok(())
        })
        .await
        .unwrap();

    let err = exporter
        .export_region_as_image(&ContainerId::dashboard_root())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TargetNotFound(ref id) if id == "dashboard-root"));
    assert!(sink.downloads().is_empty());
}

#[tokio::test]
async fn unknown_handle_is_target_not_found() {
    let (exporter, sink) = exporter_with(hello_page(), small_config()).await;
    let err = exporter
        .export_region_as_image(&ContainerId::new("no-such-panel"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TargetNotFound(_)));
    assert!(sink.downloads().is_empty());
}

#[tokio::test]
async fn cross_origin_image_fails_capture() {
    let (exporter, sink) = exporter_with(hello_page(), small_config()).await;
    exporter
        .surface()
        .update(|doc| {
            doc.append_child(
                &ContainerId::dashboard_root(),
                image("https://cdn.example.com/logo.png", false, false),
            )
        })
        .await
        .unwrap();

    let err = exporter
        .export_region_as_image(&ContainerId::dashboard_root())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CaptureFailed(ref m) if m.contains("cdn.example.com")));
    assert!(sink.downloads().is_empty());

    // the failure is reported, not fatal: the greeting can still be exported
    let receipt = exporter
        .export_region_as_image(&ContainerId::new("greeting"))
        .await
        .expect("untainted sibling exports");
    assert_eq!(receipt.height, 20);
}

#[tokio::test]
async fn cors_granted_and_same_origin_images_do_not_taint() {
    let (exporter, sink) = exporter_with(hello_page(), small_config()).await;
    exporter
        .surface()
        .update(|doc| {
            let root = ContainerId::dashboard_root();
            doc.append_child(&root, image("https://cdn.example.com/logo.png", true, true))?;
            doc.append_child(&root, image("/static/local.png", false, false))
        })
        .await
        .unwrap();

    exporter
        .export_region_as_image(&ContainerId::dashboard_root())
        .await
        .expect("export");
    assert_eq!(sink.downloads().len(), 1);
}

#[tokio::test]
async fn consecutive_exports_reflect_state_at_capture_time() {
    let (exporter, sink) = exporter_with(hello_page(), small_config()).await;
    let root = ContainerId::dashboard_root();

    let first = exporter.export_region_as_image(&root).await.unwrap();
    let again = exporter.export_region_as_image(&root).await.unwrap();
    assert_eq!(first.sha256, again.sha256);

    exporter
        .surface()
        .update(|doc| doc.set_text(&ContainerId::new("greeting"), "World"))
        .await
        .unwrap();
    let changed = exporter.export_region_as_image(&root).await.unwrap();
    assert_ne!(first.sha256, changed.sha256);

    let downloads = sink.downloads();
    assert_eq!(downloads.len(), 3);
    assert!(downloads.iter().all(|d| d.file_name == "dashboard.png"));
    assert_ne!(downloads[0].bytes, downloads[2].bytes);
}

#[tokio::test]
async fn busy_surface_times_out_without_download() {
    let config = ExportConfig {
        capture_timeout_ms: 50,
        ..small_config()
    };
    let (exporter, sink) = exporter_with(hello_page(), config).await;

    let surface = exporter.surface().clone();
    let busy = tokio::spawn(async move {
        surface
            .update(|_| {
                std::thread::sleep(Duration::from_millis(400));
                Ok(())
            })
            .await
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let err = exporter
        .export_region_as_image(&ContainerId::dashboard_root())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CaptureTimeout(50)));
    busy.await.unwrap().unwrap();
    assert!(sink.downloads().is_empty());
}

#[tokio::test]
async fn custom_file_name_is_used() {
    let config = ExportConfig {
        file_name: "report.png".into(),
        ..small_config()
    };
    let (exporter, sink) = exporter_with(hello_page(), config).await;
    let receipt = exporter
        .export_region_as_image(&ContainerId::dashboard_root())
        .await
        .unwrap();
    assert_eq!(receipt.file_name, "report.png");
    assert_eq!(sink.downloads()[0].file_name, "report.png");
}
