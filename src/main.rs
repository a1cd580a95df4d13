use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::config::KeyResolver;
use crate::submit::{LogSubmitHandler, OutboxSubmitHandler, SubmitHandler};

mod app;
mod cli;
pub mod commands;
mod config;
mod content;
pub mod modal;
mod page;
pub mod submit;
mod theme;
pub mod tui;
mod ui;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting podium");

    let args = cli::Args::parse();

    let mut config = config::load()?;
    if let Some(theme) = args.theme {
        config.theme.name = theme;
    }
    if let Some(outbox) = args.outbox {
        config.inquiries.outbox = Some(outbox);
    }

    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let theme = theme::theme_from_name(&config.theme.name);
    let loaded = content::load(args.content.as_deref())?;

    let form = loaded.content.inquiry.title.clone();
    let handler: Arc<dyn SubmitHandler> = match &config.inquiries.outbox {
        Some(path) => {
            info!(outbox = %path.display(), "Inquiries go to outbox");
            Arc::new(OutboxSubmitHandler::new(form, path))
        }
        None => Arc::new(LogSubmitHandler::new(form)),
    };

    let mut app = App::new(
        loaded.content,
        loaded.asset_root,
        &config,
        handler,
        resolver,
        theme,
    )?;
    app.run().await?;

    info!("Exiting podium");
    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("podium").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "podium.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
