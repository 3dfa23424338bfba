use clap::Parser;
use color_eyre::eyre::{
    Result,
    eyre,
};
use limbo_client::{
    GameConfig,
    TableLimits,
    config,
    wager::DEFAULT_HOUSE_EDGE,
};
use std::{
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling,
};
use tracing_subscriber::{
    EnvFilter,
    fmt,
};

mod client;
mod ui;

#[derive(Parser, Debug)]
#[command(version, about = "Limbo: pick a target, watch the multiplier climb", long_about = None)]
struct Args {
    /// Balance the session starts with
    #[arg(long, default_value_t = config::DEFAULT_STARTING_BALANCE)]
    balance: f64,

    /// Length of the reveal animation in milliseconds
    #[arg(long, default_value_t = 1000)]
    reveal_ms: u64,

    /// Reveal tick interval in milliseconds
    #[arg(long, default_value_t = 10)]
    tick_ms: u64,

    /// Rounds kept in history, 0 keeps everything
    #[arg(long, default_value_t = config::DEFAULT_HISTORY_CAPACITY)]
    history: usize,

    /// Abandon a round if no outcome arrives within this many seconds
    #[arg(long)]
    outcome_timeout_secs: Option<u64>,

    /// Target multiplier pre-filled in the bet form
    #[arg(short, long, default_value_t = config::DEFAULT_TARGET_MULTIPLIER)]
    target: f64,

    #[arg(short, long, default_value = "player")]
    username: String,

    /// House edge used by the local house
    #[arg(long, default_value_t = DEFAULT_HOUSE_EDGE)]
    house_edge: f64,

    /// Seed the local house for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for the rolling log file
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

impl Args {
    fn into_config(self) -> Result<(GameConfig, PathBuf)> {
        let config = GameConfig {
            starting_balance: self.balance,
            reveal_duration: Duration::from_millis(self.reveal_ms),
            tick: Duration::from_millis(self.tick_ms),
            history_capacity: (self.history > 0).then_some(self.history),
            outcome_timeout: self.outcome_timeout_secs.map(Duration::from_secs),
            default_target_multiplier: self.target,
            username: self.username,
            house_edge: self.house_edge,
            limits: TableLimits::default(),
            seed: self.seed,
            ..GameConfig::default()
        };
        config.validate().map_err(|e| eyre!(e))?;
        Ok((config, self.log_dir))
    }
}

fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let appender = rolling::daily(log_dir, "limbo.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    guard
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let (config, log_dir) = Args::parse().into_config()?;
    let _guard = init_tracing(&log_dir);
    tracing::info!(username = %config.username, "starting limbo client");
    client::run_app(config).await
}
