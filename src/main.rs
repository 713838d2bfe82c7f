use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use dashsnap::data::Dashboard;
use dashsnap::{ContainerId, ExportConfig, Notice, Viewport};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dashsnap", version, about = "Render dashboards headlessly and export PNG snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export the dashboard (or one of its containers) as an image
    Download {
        #[command(flatten)]
        source: SourceArgs,
        /// Directory the image is written to
        #[arg(long, default_value = ".")]
        out: PathBuf,
        #[arg(long, default_value = ExportConfig::DEFAULT_FILE_NAME)]
        file_name: String,
        /// Container to capture
        #[arg(long, default_value = ContainerId::DASHBOARD_ROOT)]
        container: String,
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[arg(long, default_value_t = 720)]
        height: u32,
        /// Give up on a capture after this many milliseconds
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
        /// Origin the page is treated as served from
        #[arg(long, default_value = dashsnap::dom::Document::DEFAULT_ORIGIN)]
        origin: String,
    },
    /// Print the visible text of the dashboard
    Text {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the dashboard definition as JSON
    Data {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Built-in dashboard to use
    #[arg(long, default_value = "analytics")]
    dashboard: String,
    /// Load the dashboard definition from a .json or .toml file instead
    #[arg(long)]
    data: Option<PathBuf>,
}

impl SourceArgs {
    fn load(&self) -> anyhow::Result<Dashboard> {
        if let Some(path) = &self.data {
            return Dashboard::from_path(path)
                .with_context(|| format!("loading dashboard from {}", path.display()));
        }
        match Dashboard::builtin(&self.dashboard) {
            Some(d) => Ok(d),
            None => bail!(
                "unknown dashboard '{}' (available: {})",
                self.dashboard,
                Dashboard::BUILTIN_NAMES.join(", ")
            ),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Download {
            source,
            out,
            file_name,
            container,
            width,
            height,
            timeout_ms,
            origin,
        } => {
            let dashboard = source.load()?;
            let config = ExportConfig {
                viewport: Viewport { width, height },
                capture_timeout_ms: timeout_ms,
                file_name,
                output_dir: out,
                origin,
            };
            let exporter = dashsnap::new_exporter(&dashboard, config).await?;
            let container = ContainerId::new(container);
            let notice = if container == ContainerId::dashboard_root() {
                exporter.download_dashboard().await
            } else {
                match exporter.export_region_as_image(&container).await {
                    Ok(r) => Notice::Saved {
                        file_name: r.file_name,
                        location: r.location,
                        width: r.width,
                        height: r.height,
                    },
                    Err(e) => Notice::Failed {
                        kind: e.kind(),
                        message: e.to_string(),
                    },
                }
            };
            println!("{}", notice);
            exporter.surface().clone().close().await?;
            if !notice.is_saved() {
                std::process::exit(1);
            }
        }
        Command::Text { source } => {
            let dashboard = source.load()?;
            let exporter = dashsnap::new_exporter(&dashboard, ExportConfig::default()).await?;
            let snapshot = exporter.surface().text_snapshot().await?;
            println!("{}", snapshot.title);
            println!("{}", "=".repeat(60));
            println!("{}", snapshot.text);
        }
        Command::Data { source } => {
            let dashboard = source.load()?;
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
    }
    Ok(())
}
