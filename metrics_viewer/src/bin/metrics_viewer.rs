use std::{
    env,
    io::{self, Write},
    path::PathBuf,
    time::SystemTime,
};

use clap::{Args, Parser, Subcommand};
use metrics_viewer::{
    aggregate::IgnoreSet,
    config::{self, Config, RemoteSettings, Settings},
    model::Snapshot,
    poller::{self, Event, Pipeline, Poller},
    signal::signal,
    source::{self, Fetch, Source},
};
use tokio::{runtime::Builder, signal as os_signal, sync::mpsc, time};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

/// When set to a non-empty value and no source is selected, serve synthetic
/// metrics instead of failing.
const MOCK_ENV: &str = "MOCK_METRICS_DATA";

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::Error),
    #[error("Metrics source failed: {0}")]
    Source(#[from] source::Error),
    #[error("Poller returned an error: {0}")]
    Poller(#[from] poller::Error),
    #[error("Could not join the poller task: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, aggregate and print metrics once
    Print(CommonArgs),
    /// Poll and print metrics until interrupted
    Watch(CommonArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// path on disk to a YAML settings file, flags override its values
    #[clap(long)]
    config_path: Option<PathBuf>,
    /// read metrics from this file
    #[clap(long)]
    file: Option<PathBuf>,
    /// scrape metrics from this URL
    #[clap(long)]
    url: Option<String>,
    /// basic auth user for the URL or remote API
    #[clap(long)]
    user: Option<String>,
    /// basic auth password for the URL or remote API
    #[clap(long, env = "METRICS_VIEWER_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// base URL of a remote management API to retrieve metrics from
    #[clap(long)]
    remote_url: Option<String>,
    /// access token for the remote management API
    #[clap(long, env = "METRICS_VIEWER_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
    /// seconds between polls
    #[clap(long, allow_negative_numbers = true)]
    interval: Option<i64>,
    /// keep only metric families whose name matches this regular expression
    #[clap(long)]
    filter: Option<String>,
    /// comma separated label names to aggregate over, or ALL or NONE
    #[clap(long)]
    aggregate_ignore_labels: Option<IgnoreSet>,
}

impl CommonArgs {
    /// Settings from `config_path`, if any, with flags layered on top
    fn into_settings(self) -> Result<Settings, Error> {
        let mut settings = match &self.config_path {
            Some(path) => {
                debug!("Loading settings from {}", path.display());
                Settings::from_path(path)?
            }
            None => Settings::default(),
        };

        if let Some(file) = self.file {
            settings.file = Some(file);
        }
        if let Some(url) = self.url {
            settings.url = Some(url);
        }
        if let Some(url) = self.remote_url {
            settings
                .remote
                .get_or_insert_with(RemoteSettings::default)
                .url = url;
        }
        if let Some(remote) = settings.remote.as_mut() {
            if self.access_token.is_some() {
                remote.access_token.clone_from(&self.access_token);
            }
            if self.user.is_some() {
                remote.user.clone_from(&self.user);
            }
            if self.password.is_some() {
                remote.password.clone_from(&self.password);
            }
        }
        if self.user.is_some() {
            settings.user = self.user;
        }
        if self.password.is_some() {
            settings.password = self.password;
        }
        if let Some(interval) = self.interval {
            settings.interval = interval;
        }
        if self.filter.is_some() {
            settings.filter = self.filter;
        }
        if let Some(ignore) = self.aggregate_ignore_labels {
            settings.aggregate_ignore_labels = ignore;
        }
        Ok(settings)
    }
}

fn report_ignored(ignore: &IgnoreSet, snapshot: &Snapshot) {
    info!(ignore = %ignore, actually_ignored = ?snapshot.ignored_labels, "aggregating");
    let unused = ignore.unused(&snapshot.ignored_labels);
    if !unused.is_empty() {
        warn!(labels = ?unused, "ignore labels never appeared in the metrics");
    }
}

async fn print(config: Config) -> Result<(), Error> {
    let Config {
        source: source_config,
        interval,
        filter,
        ignore,
    } = config;
    let mut active = Source::new(source_config, interval)?;
    info!("Fetching metrics once from {active}");

    let text = time::timeout(interval, active.fetch())
        .await
        .unwrap_or(Err(source::Error::Timeout(interval)))?;
    let pipeline = Pipeline::new(filter, ignore);
    let (snapshot, warnings) = pipeline.process(1, SystemTime::now(), &text);
    for warning in warnings {
        warn!(line = warning.line, error = %warning.error, "skipped malformed line");
    }
    report_ignored(&pipeline.ignore, &snapshot);

    let mut stdout = io::stdout().lock();
    write!(stdout, "{snapshot}")?;
    stdout.flush()?;
    Ok(())
}

async fn watch(config: Config) -> Result<(), Error> {
    let Config {
        source: source_config,
        interval,
        filter,
        ignore,
    } = config;
    let active = Source::new(source_config, interval)?;
    info!("Watching metrics from {active} every {interval:?}");

    let (shutdown_watcher, shutdown_broadcaster) = signal();
    let mut shutdown_broadcaster = Some(shutdown_broadcaster);
    let (events_tx, mut events_rx) = mpsc::channel(16);
    let poller = Poller::new(
        active,
        interval,
        Pipeline::new(filter, ignore.clone()),
        shutdown_watcher,
        events_tx,
    );
    let mut poller_handle = tokio::spawn(poller.run());

    let mut reported = false;
    let stdout = io::stdout();
    loop {
        tokio::select! {
            _ = os_signal::ctrl_c(), if shutdown_broadcaster.is_some() => {
                info!("received ctrl-c");
                if let Some(broadcaster) = shutdown_broadcaster.take() {
                    broadcaster.signal();
                }
            },
            Some(event) = events_rx.recv() => match event {
                Event::Snapshot(snapshot) => {
                    if !reported {
                        report_ignored(&ignore, &snapshot);
                        reported = true;
                    }
                    let mut out = stdout.lock();
                    writeln!(out, "{snapshot}")?;
                    out.flush()?;
                }
                Event::FetchFailed { cycle, error } => {
                    warn!(cycle, %error, "metrics unavailable this cycle");
                }
                Event::ParseWarnings { cycle, warnings } => {
                    for warning in warnings {
                        warn!(cycle, line = warning.line, error = %warning.error, "skipped malformed line");
                    }
                }
            },
            res = &mut poller_handle => {
                res??;
                break;
            },
        }
    }
    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(io::stderr)
        .finish()
        .init();

    let cli = Cli::parse();
    let mock_enabled = env::var(MOCK_ENV).is_ok_and(|value| !value.is_empty());
    if mock_enabled {
        debug!("{MOCK_ENV} is set, mock data serves when no source is selected");
    }

    let runtime = Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()?;
    match cli.command {
        Commands::Print(args) => {
            let config = args.into_settings()?.resolve(mock_enabled)?;
            runtime.block_on(print(config))
        }
        Commands::Watch(args) => {
            let config = args.into_settings()?.resolve(mock_enabled)?;
            let res = runtime.block_on(watch(config));
            info!("Bye. :)");
            res
        }
    }
}
