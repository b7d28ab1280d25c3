mod args;
mod output;

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use resttable_api::{HttpTransport, RestClient};
use resttable_engine::{FetchController, FetchResult, PollingScheduler, RefreshInterval, WidgetSettings, probe};
use resttable_util::{InMemoryStore, JsonFileStore, KeyValueStore, settings_store::resttable_config_dir};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::{Cli, Command, ConfigAction, EndpointArgs};

const LOG_FILE_NAME: &str = "resttable.log";
/// Cadence used by `watch` when the stored interval is off.
const WATCH_FALLBACK_INTERVAL: RefreshInterval = RefreshInterval::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // No subcommand => TUI, which owns the terminal
    init_tracing(cli.command.is_none());

    let (store, store_path) = open_settings_store();
    let mut settings = WidgetSettings::load(store);

    match cli.command {
        None => {
            let transport: Arc<dyn HttpTransport> = Arc::new(RestClient::new()?);
            resttable_tui::run(settings, transport).await
        }
        Some(Command::Fetch { endpoint, json }) => run_fetch(&settings, &endpoint, json).await,
        Some(Command::Probe { endpoint }) => run_probe(&settings, &endpoint).await,
        Some(Command::Watch { endpoint, interval }) => run_watch(&settings, &endpoint, interval).await,
        Some(Command::Config { action }) => run_config(&mut settings, action, store_path),
    }
}

fn init_tracing(interactive: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if !interactive {
        let _ = builder.with_writer(std::io::stderr).try_init();
        return;
    }
    match open_log_file() {
        Ok(file) => {
            let _ = builder.with_ansi(false).with_writer(Mutex::new(file)).try_init();
        }
        // Nowhere safe to write while the UI is drawing.
        Err(_) => {
            let _ = builder.with_writer(std::io::sink).try_init();
        }
    }
}

fn open_log_file() -> std::io::Result<fs::File> {
    let dir = resttable_config_dir();
    fs::create_dir_all(&dir)?;
    OpenOptions::new().create(true).append(true).open(dir.join(LOG_FILE_NAME))
}

fn open_settings_store() -> (Arc<dyn KeyValueStore>, Option<PathBuf>) {
    match JsonFileStore::open(None::<PathBuf>) {
        Ok(store) => {
            let path = store.path().to_path_buf();
            (Arc::new(store), Some(path))
        }
        Err(error) => {
            warn!(error = %error, "settings file unavailable; changes will not be saved");
            (Arc::new(InMemoryStore::new()), None)
        }
    }
}

async fn run_fetch(settings: &WidgetSettings, endpoint: &EndpointArgs, json: bool) -> Result<()> {
    let config = endpoint.apply_to(settings.config());
    if !config.has_url() {
        bail!("API URL is required");
    }
    let controller = FetchController::new(Arc::new(RestClient::new()?));
    let result = controller.fetch(&config).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(result.rows.as_ref())?);
    } else {
        println!("{}", output::render_table(&result.rows));
    }
    Ok(())
}

async fn run_probe(settings: &WidgetSettings, endpoint: &EndpointArgs) -> Result<()> {
    let config = endpoint.apply_to(settings.config());
    let client = RestClient::new()?;
    let outcome = probe(&client, &config).await;
    if !outcome.success {
        bail!(outcome.message);
    }
    println!("{}", outcome.message);
    Ok(())
}

async fn run_watch(settings: &WidgetSettings, endpoint: &EndpointArgs, interval: Option<RefreshInterval>) -> Result<()> {
    let config = endpoint.apply_to(settings.config());
    if !config.has_url() {
        bail!("API URL is required");
    }
    let mut interval = interval.unwrap_or(settings.refresh_interval());
    if interval.is_off() {
        interval = WATCH_FALLBACK_INTERVAL;
    }

    let controller = Arc::new(FetchController::new(Arc::new(RestClient::new()?)));
    let mut results = controller.subscribe();
    let mut scheduler = PollingScheduler::new(Arc::clone(&controller), config.clone());
    scheduler.set_interval(interval);
    info!(interval = interval.as_secs(), "watching endpoint");
    println!("Watching {} ({}), Ctrl-C to stop", config.url, interval.label().to_lowercase());

    let initial = Arc::clone(&controller);
    tokio::spawn(async move {
        let _ = initial.fetch(&config).await;
    });

    // The watch channel coalesces updates, so print on every settled state
    // that differs from the last one printed.
    let mut last_printed: Option<FetchResult> = None;
    loop {
        tokio::select! {
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = results.borrow_and_update().clone();
                if snapshot.loading || last_printed.as_ref() == Some(&snapshot) {
                    continue;
                }
                println!("{}", output::refresh_summary(&snapshot, Utc::now()));
                last_printed = Some(snapshot);
            }
            _ = signal::ctrl_c() => break,
        }
    }
    scheduler.stop();
    Ok(())
}

fn run_config(settings: &mut WidgetSettings, action: ConfigAction, store_path: Option<PathBuf>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let shown = serde_json::json!({
                "apiConfig": settings.config(),
                "refreshInterval": settings.refresh_interval(),
                "path": store_path.as_ref().map(|path| path.display().to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        ConfigAction::Set {
            url,
            headers,
            params,
            interval,
        } => {
            let Some(path) = store_path else {
                bail!("settings file is unavailable; nothing was saved");
            };
            let mut config = settings.config().clone();
            if let Some(url) = url {
                config.url = url;
            }
            if !headers.is_empty() {
                config.headers = headers;
            }
            if !params.is_empty() {
                config.params = params;
            }
            settings.set_config(config).context("save endpoint configuration")?;
            if let Some(interval) = interval {
                settings
                    .set_refresh_interval(interval)
                    .context("save refresh interval")?;
            }
            println!("Saved settings to {}", path.display());
        }
    }
    Ok(())
}
