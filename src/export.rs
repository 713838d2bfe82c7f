//! Snapshot export
//!
//! A [`Surface`] is a dedicated worker thread that owns the mounted
//! [`Document`] and performs layout, paint and rasterization. Async callers
//! talk to it over a command channel and await the reply, so the calling task
//! never blocks while a capture is in flight.
//!
//! [`Exporter`] drives one export: capture the container, encode the pixels
//! as PNG and hand the blob to a [`SaveSink`] under the configured file name.

use crate::dom::{ContainerId, Document};
use crate::rendering::{self, Capture};
use crate::{Error, ExportConfig, Result, TextSnapshot, Viewport};
use log::{debug, error, info};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;

type DocumentUpdate = Box<dyn FnOnce(&mut Document) -> Result<()> + Send>;

enum Command {
    Mount(Box<Document>, oneshot::Sender<Result<()>>),
    Update(DocumentUpdate, oneshot::Sender<Result<()>>),
    Capture(ContainerId, Viewport, oneshot::Sender<Result<Capture>>),
    TextSnapshot(oneshot::Sender<Result<TextSnapshot>>),
    Close(oneshot::Sender<Result<()>>),
}

/// Handle to the rendering worker. Cloning the handle shares the worker.
#[derive(Clone)]
pub struct Surface {
    cmd_tx: Sender<Command>,
}

impl Surface {
    /// Spawn the worker with nothing mounted; captures fail with
    /// `TargetNotFound` until a document is mounted.
    pub fn spawn() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();

        thread::spawn(move || {
            let mut document: Option<Document> = None;

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Mount(doc, resp) => {
                        debug!("Mounting document '{}'", doc.title);
                        document = Some(*doc);
                        let _ = resp.send(Ok(()));
                    }
                    Command::Update(apply, resp) => {
                        let res = match document.as_mut() {
                            Some(doc) => apply(doc),
                            None => Err(Error::Other("No document mounted".into())),
                        };
                        let _ = resp.send(res);
                    }
                    Command::Capture(id, viewport, resp) => {
                        let res = match document.as_ref() {
                            Some(doc) => rendering::capture_region(doc, &id, viewport),
                            None => Err(Error::TargetNotFound(id.to_string())),
                        };
                        // the receiver is gone when the caller timed out
                        if resp.send(res).is_err() {
                            debug!("Capture of '{}' finished after its caller gave up", id);
                        }
                    }
                    Command::TextSnapshot(resp) => {
                        let res = document
                            .as_ref()
                            .map(|doc| TextSnapshot {
                                title: doc.title.clone(),
                                text: doc.text_content(),
                                url: doc.origin.to_string(),
                            })
                            .ok_or_else(|| Error::RenderError("No document mounted".into()));
                        let _ = resp.send(res);
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(Ok(()));
                        break;
                    }
                }
            }
        });

        Self { cmd_tx }
    }

    fn send(&self, cmd: Command) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| Error::Other("Surface worker has shut down".into()))
    }

    /// Replace the mounted document.
    pub async fn mount(&self, document: Document) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Mount(Box::new(document), tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Mount canceled: {}", e)))?
    }

    /// Mutate the mounted document on the worker.
    pub async fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Document) -> Result<()> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Update(Box::new(apply), tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Update canceled: {}", e)))?
    }

    /// Rasterize the container `id` at its current state.
    pub async fn capture(&self, id: ContainerId, viewport: Viewport) -> Result<Capture> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Capture(id, viewport, tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Capture canceled: {}", e)))?
    }

    pub async fn text_snapshot(&self) -> Result<TextSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::TextSnapshot(tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("TextSnapshot canceled: {}", e)))?
    }

    /// Stop the worker. Other handles to it start failing afterwards.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Close(tx))?;
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))?
    }
}

/// Receives finished image blobs; the host's file-save mechanism.
pub trait SaveSink: Send + Sync {
    /// Persist `bytes` as `file_name` and return where they went.
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String>;
}

/// Writes downloads into a directory, replacing files of the same name.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SaveSink for FileSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let save_err = |source| Error::SaveError {
            file_name: file_name.to_string(),
            source,
        };
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name == ".." {
            return Err(save_err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "file name must not contain path separators",
            )));
        }
        std::fs::create_dir_all(&self.dir).map_err(save_err)?;
        let path = self.dir.join(file_name);
        let partial = self.dir.join(format!(".{}.part", file_name));
        let written = std::fs::write(&partial, bytes).and_then(|_| std::fs::rename(&partial, &path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&partial);
            return Err(save_err(e));
        }
        Ok(path.display().to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Keeps downloads in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    downloads: Mutex<Vec<Download>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl SaveSink for MemorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let mut downloads = self
            .downloads
            .lock()
            .map_err(|_| Error::Other("download log poisoned".into()))?;
        downloads.push(Download {
            file_name: file_name.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(format!("memory:{}#{}", file_name, downloads.len()))
    }
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReceipt {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
    /// Hex SHA-256 of the PNG bytes.
    pub sha256: String,
    /// Where the sink put the file.
    pub location: String,
}

/// User-visible result of the download control.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Saved {
        file_name: String,
        location: String,
        width: u32,
        height: u32,
    },
    Failed {
        kind: &'static str,
        message: String,
    },
}

impl Notice {
    pub fn is_saved(&self) -> bool {
        matches!(self, Notice::Saved { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Saved {
                file_name,
                location,
                width,
                height,
            } => write!(f, "Saved {} ({}x{}) to {}", file_name, width, height, location),
            Notice::Failed { kind, message } => {
                write!(f, "Could not download the dashboard ({}): {}", kind, message)
            }
        }
    }
}

pub struct Exporter {
    surface: Surface,
    config: ExportConfig,
    sink: Arc<dyn SaveSink>,
}

impl Exporter {
    pub fn new(surface: Surface, config: ExportConfig, sink: Arc<dyn SaveSink>) -> Self {
        Self {
            surface,
            config,
            sink,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Capture `container`, encode it as PNG and save it as the configured
    /// file name. Nothing is saved when any step fails.
    pub async fn export_region_as_image(&self, container: &ContainerId) -> Result<ExportReceipt> {
        let timeout_ms = self.config.capture_timeout_ms;
        let capture = self.surface.capture(container.clone(), self.config.viewport);
        let capture = match tokio::time::timeout(Duration::from_millis(timeout_ms), capture).await {
            Ok(res) => res?,
            Err(_) => return Err(Error::CaptureTimeout(timeout_ms)),
        };

        let screenshot = tokio::task::spawn_blocking(move || capture.encode())
            .await
            .map_err(|e| Error::Other(format!("Encoder task failed: {}", e)))??;

        let sha256 = hex::encode(Sha256::digest(&screenshot.png_data));
        let byte_len = screenshot.png_data.len();
        let file_name = self.config.file_name.clone();

        let sink = Arc::clone(&self.sink);
        let name = file_name.clone();
        let location = tokio::task::spawn_blocking(move || sink.save(&name, &screenshot.png_data))
            .await
            .map_err(|e| Error::Other(format!("Save task failed: {}", e)))??;

        info!(
            "Exported '{}' as {} ({}x{}, {} bytes)",
            container, file_name, screenshot.width, screenshot.height, byte_len
        );
        Ok(ExportReceipt {
            file_name,
            width: screenshot.width,
            height: screenshot.height,
            byte_len,
            sha256,
            location,
        })
    }

    /// The download control: export the dashboard root and report the
    /// outcome as a notice instead of an error.
    pub async fn download_dashboard(&self) -> Notice {
        match self
            .export_region_as_image(&ContainerId::dashboard_root())
            .await
        {
            Ok(r) => Notice::Saved {
                file_name: r.file_name,
                location: r.location,
                width: r.width,
                height: r.height,
            },
            Err(e) => {
                error!("Dashboard download failed: {}", e);
                Notice::Failed {
                    kind: e.kind(),
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Rgba;
    use crate::dom::{Align, BoxStyle, Node};

    fn hello_document() -> Document {
        Document::new(
            "Hello",
            Node::block(
                BoxStyle {
                    padding: 4,
                    ..Default::default()
                },
                vec![Node::block(
                    BoxStyle::default(),
                    vec![Node::text("Hello", Rgba::BLACK, 1, Align::Start).with_id("greeting")],
                )
                .with_id(ContainerId::DASHBOARD_ROOT)],
            ),
        )
    }

    fn config() -> ExportConfig {
        ExportConfig {
            viewport: Viewport {
                width: 120,
                height: 60,
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn unmounted_surface_reports_target_not_found() {
        let sink = Arc::new(MemorySink::new());
        let exporter = Exporter::new(Surface::spawn(), config(), sink.clone());
        let err = exporter
            .export_region_as_image(&ContainerId::dashboard_root())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TargetNotFound(_)));
        assert!(sink.downloads().is_empty());
    }

    #[tokio::test]
    async fn export_saves_png_under_configured_name() {
        let sink = Arc::new(MemorySink::new());
        let surface = Surface::spawn();
        surface.mount(hello_document()).await.unwrap();
        let exporter = Exporter::new(surface, config(), sink.clone());

        let receipt = exporter
            .export_region_as_image(&ContainerId::dashboard_root())
            .await
            .unwrap();
        assert_eq!(receipt.file_name, "dashboard.png");
        assert_eq!((receipt.width, receipt.height), (112, 10));
        let downloads = sink.downloads();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].bytes.len(), receipt.byte_len);
        assert_eq!(&downloads[0].bytes[0..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(receipt.location, "memory:dashboard.png#1");
    }

    #[tokio::test]
    async fn download_control_turns_errors_into_notices() {
        let sink = Arc::new(MemorySink::new());
        let exporter = Exporter::new(Surface::spawn(), config(), sink.clone());
        let notice = exporter.download_dashboard().await;
        assert!(matches!(notice, Notice::Failed { kind: "TargetNotFound", .. }));
        assert!(notice.to_string().contains("dashboard-root"));

        exporter.surface().mount(hello_document()).await.unwrap();
        let notice = exporter.download_dashboard().await;
        assert!(notice.is_saved(), "{}", notice);
        assert_eq!(sink.downloads().len(), 1);
    }

    #[tokio::test]
    async fn text_snapshot_reflects_updates() {
        let surface = Surface::spawn();
        assert!(surface.text_snapshot().await.is_err());
        surface.mount(hello_document()).await.unwrap();
        surface
            .update(|doc| doc.set_text(&"greeting".into(), "Bye"))
            .await
            .unwrap();
        let snap = surface.text_snapshot().await.unwrap();
        assert_eq!(snap.title, "Hello");
        assert_eq!(snap.text, "Bye");
        surface.clone().close().await.unwrap();
        assert!(surface.text_snapshot().await.is_err());
    }

    #[test]
    fn file_sink_writes_into_directory() {
        let dir = std::env::temp_dir().join(format!("dashsnap-sink-{}", std::process::id()));
        let sink = FileSink::new(&dir);
        let location = sink.save("dashboard.png", b"png").unwrap();
        assert_eq!(std::fs::read(dir.join("dashboard.png")).unwrap(), b"png");
        assert!(location.ends_with("dashboard.png"));
        assert!(!dir.join(".dashboard.png.part").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn file_sink_rejects_path_like_names() {
        let dir = std::env::temp_dir().join(format!("dashsnap-names-{}", std::process::id()));
        let sink = FileSink::new(&dir);
        for name in ["../escape.png", "nested/dashboard.png", "", ".."] {
            let err = sink.save(name, b"png").unwrap_err();
            assert!(matches!(err, Error::SaveError { .. }), "{:?} accepted", name);
        }
        assert!(!dir.join("nested").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn failed_rename_leaves_no_partial_file() {
        let dir = std::env::temp_dir().join(format!("dashsnap-rename-{}", std::process::id()));
        // a non-empty directory in the way makes the final rename fail
        std::fs::create_dir_all(dir.join("dashboard.png").join("occupied")).unwrap();
        let sink = FileSink::new(&dir);
        let err = sink.save("dashboard.png", b"png").unwrap_err();
        assert!(matches!(err, Error::SaveError { .. }));
        assert!(!dir.join(".dashboard.png.part").exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
