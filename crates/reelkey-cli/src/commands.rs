use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};

use reelkey_core::config::AppConfig;
use reelkey_core::injector::{InjectOutcome, Injector, NavEvent, PageHost};
use reelkey_core::overlay::driver::OverlayDriver;
use reelkey_core::overlay::{Message, Overlay, OverlaySettings};
use reelkey_core::relay::{bounded, Relay};
use reelkey_core::resolver::Resolver;
use reelkey_parse::{MediaKind, PageMetadata};
use reelkey_runtime::{Launcher, Runtime, SettingsPatch};

use crate::cli::ConfigCommand;
use crate::terminal::{parse_line, FilePage, Line, TerminalView};

fn read_page(path: Option<&Path>) -> Result<Option<String>> {
    path.map(|p| {
        std::fs::read_to_string(p).with_context(|| format!("reading page {}", p.display()))
    })
    .transpose()
}

pub async fn search<L: Launcher>(
    runtime: &Runtime<L>,
    query: &str,
    kind: Option<MediaKind>,
) -> Result<()> {
    let results = runtime.search(query, kind).await?;
    if results.is_empty() {
        println!("No results");
    }
    for row in results {
        println!(
            "{}\t{}\t{}\t{}",
            row.id,
            row.title,
            row.year.as_deref().unwrap_or("—"),
            row.media_type.as_deref().unwrap_or("?"),
        );
    }
    Ok(())
}

pub async fn lookup<L: Launcher>(runtime: &Runtime<L>, id: &str) -> Result<()> {
    let details = runtime.lookup_by_id(id).await?;
    println!("{} ({})", details.title, details.year.as_deref().unwrap_or("—"));
    println!("id:      {}", details.id);
    println!("type:    {}", details.media_type.as_deref().unwrap_or("?"));
    for (label, value) in [
        ("genre", &details.genre),
        ("runtime", &details.runtime),
        ("rating", &details.rating),
        ("poster", &details.poster_url),
    ] {
        if let Some(value) = value {
            println!("{label:<8} {value}");
        }
    }
    if let Some(plot) = &details.plot {
        println!("\n{plot}");
    }
    Ok(())
}

pub async fn resolve<L: Launcher>(
    runtime: Arc<Runtime<L>>,
    timeout: std::time::Duration,
    id: &str,
    page: Option<&Path>,
) -> Result<MediaKind> {
    let metadata = read_page(page)?
        .map(|html| PageMetadata::from_html(&html))
        .unwrap_or_default();
    Ok(Resolver::for_page(runtime, &metadata, timeout).resolve(id).await)
}

pub async fn open<L: Launcher>(
    runtime: Arc<Runtime<L>>,
    timeout: std::time::Duration,
    id: &str,
    kind: Option<MediaKind>,
) -> Result<()> {
    let kind = match kind {
        Some(kind) => kind,
        None => resolve(Arc::clone(&runtime), timeout, id, None).await?,
    };
    let url = bounded(timeout, runtime.open_embed(id, kind)).await?;
    println!("{url}");
    Ok(())
}

pub async fn page<L: Launcher>(
    runtime: Arc<Runtime<L>>,
    config: &AppConfig,
    path: &str,
    html: Option<&Path>,
    click: bool,
) -> Result<()> {
    let html = read_page(html)?;
    let mut host = FilePage::new(path, html.as_deref());
    let mut injector = Injector::new(config.title_pattern()?);

    match injector.handle(&mut host, NavEvent::PageShow) {
        InjectOutcome::Injected(id) => println!("watch control added for {id}"),
        InjectOutcome::Removed | InjectOutcome::Unchanged => {
            println!("not a title page: {path}");
            return Ok(());
        }
    }

    if click {
        let metadata = host.metadata();
        if let Some(request) = injector
            .activate(&runtime, &metadata, config.relay_timeout())
            .await
        {
            match request.url {
                Some(url) => println!("{} opened as {}: {url}", request.id, request.kind),
                None => bail!("could not open {}", request.id),
            }
        }
    }
    Ok(())
}

/// Interactive overlay session on stdin/stdout.
pub async fn overlay<L: Launcher>(runtime: Arc<Runtime<L>>, config: &AppConfig) -> Result<()> {
    let overlay = Overlay::new(OverlaySettings::from_config(config));
    let view = TerminalView::new(std::io::stdout());
    let mut driver = OverlayDriver::new(overlay, Arc::clone(&runtime), view)
        .with_timeout(config.relay_timeout());

    // Relay pushes (toggle, shortcut changes) reach the overlay like any
    // other message.
    let mut pushes = runtime.subscribe();
    let push_tx = driver.sender();
    let forward = tokio::spawn(async move {
        loop {
            match pushes.recv().await {
                Ok(message) => {
                    if push_tx.send(Message::from(message)).is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "overlay fell behind relay pushes");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    println!(
        "Type to search. :down :up :enter :esc :hover N :click N :key <shortcut> :toggle :quit"
    );
    let (events, rx) = mpsc::channel(32);
    let input_runtime = Arc::clone(&runtime);
    let input = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let _ = events.send(Message::Open).await;
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_line(&line) {
                Line::Send(message) => {
                    if events.send(message).await.is_err() {
                        break;
                    }
                }
                Line::Toggle => {
                    input_runtime.toggle_overlay();
                }
                Line::Quit => break,
                Line::Invalid(e) => eprintln!("{e}"),
            }
        }
    });

    driver.run(rx).await;
    forward.abort();
    input.abort();
    Ok(())
}

pub async fn config<L: Launcher>(
    runtime: &Runtime<L>,
    config_path: &Path,
    command: ConfigCommand,
) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let mut config = runtime.get_config().await;
            if !config.omdb.api_key.is_empty() {
                config.omdb.api_key = "********".into();
            }
            println!("# {}", config_path.display());
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigCommand::SetKey { key } => {
            if key.trim().is_empty() {
                bail!("API key is empty; use `config clear-key` to remove it");
            }
            runtime
                .update_settings(SettingsPatch {
                    api_key: Some(key),
                    shortcut: None,
                })
                .await?;
            println!("API key saved to {}", config_path.display());
        }
        ConfigCommand::ClearKey => {
            runtime.clear_api_key().await?;
            println!("API key removed");
        }
        ConfigCommand::SetShortcut { shortcut } => {
            let saved = runtime
                .update_settings(SettingsPatch {
                    api_key: None,
                    shortcut: Some(shortcut),
                })
                .await?;
            println!("Overlay shortcut: {}", saved.shortcut);
        }
        ConfigCommand::Init => {
            if AppConfig::ensure_default_file(config_path)? {
                println!("Wrote {}", config_path.display());
            } else {
                println!("{} already exists", config_path.display());
            }
        }
    }
    Ok(())
}

/// Config file used for this invocation.
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(AppConfig::config_path)
}

/// Read the config for this invocation; a missing file means defaults.
///
/// `config` subcommands (`editing`) see the file as stored so a bad value
/// can be shown and replaced. Everything else runs with invalid settings
/// reset to their defaults.
pub fn load_config(path: &Path, editing: bool) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let mut config = AppConfig::load_unchecked(path)
        .with_context(|| format!("loading {}", path.display()))?;
    if !editing {
        let reset = config.repair();
        if !reset.is_empty() {
            tracing::warn!(
                path = %path.display(),
                ?reset,
                "invalid settings replaced by defaults"
            );
        }
    }
    Ok(config)
}
