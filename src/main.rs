use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use rfplayer::sim::{SimConfig, SimulatedEngine};
use rfplayer::{PlaybackStatus, Player, PlayerConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Route the library's `log` records through a stderr fmt subscriber.
fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level).with_context(|| format!("invalid log level {}", level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("logger already installed: {}", e))?;
    Ok(())
}

#[derive(Parser)]
#[command(name = "rfplayer")]
#[command(about = "Drive the playback controller against a simulated engine")]
struct Cli {
    /// Level or filter directives (e.g. `debug`, `rfplayer=trace`)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one simulated source to the end and print the transcript
    Simulate(SimulateArgs),
}

#[derive(clap::Args)]
struct SimulateArgs {
    /// Source locator handed to the controller
    #[arg(long, default_value = "https://media.example/clip.m3u8")]
    source: String,

    /// Media length in seconds
    #[arg(long, default_value_t = 30.0)]
    duration: f64,

    /// Start offset as a fraction 0..1
    #[arg(long)]
    offset: Option<f64>,

    /// Start playing at readiness instead of issuing an explicit play
    #[arg(long)]
    autoplay: bool,

    /// Allow skip after this many seconds of playback
    #[arg(long)]
    skip_after: Option<f64>,

    #[arg(long)]
    muted: bool,

    /// JSON player configuration; flags above override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated seconds per wall-clock second
    #[arg(long, default_value_t = 10.0)]
    speed: f64,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

impl SimulateArgs {
    fn player_config(&self) -> anyhow::Result<PlayerConfig> {
        let mut config = match &self.config {
            Some(path) => PlayerConfig::from_path(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => PlayerConfig::default(),
        };
        config.autoplay |= self.autoplay;
        config.muted |= self.muted;
        if let Some(offset) = self.offset {
            config.start_offset = offset;
        }
        if self.skip_after.is_some() {
            config.skip_after_secs = self.skip_after;
        }
        config.validate()?;
        Ok(config)
    }

    /// Media length and the wall-clock period of one simulated second.
    fn timing(&self) -> anyhow::Result<(Duration, Duration)> {
        if self.duration.is_nan() || self.duration <= 0.0 {
            return Err(anyhow!("duration must be positive"));
        }
        if self.speed.is_nan() || self.speed <= 0.0 {
            return Err(anyhow!("speed must be positive"));
        }
        let length = Duration::try_from_secs_f64(self.duration)
            .with_context(|| format!("duration {} out of range", self.duration))?;
        let period = Duration::try_from_secs_f64(1.0 / self.speed)
            .with_context(|| format!("speed {} out of range", self.speed))?;
        Ok((length, period))
    }
}

async fn simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let (length, period) = args.timing()?;
    let config = args.player_config()?;
    let autoplay = config.autoplay;

    let engine = SimulatedEngine::new(SimConfig {
        duration: Some(length),
        ..SimConfig::default()
    });
    let remote = engine.remote();
    let player = Player::spawn(engine, config)?;

    let mut status = player.subscribe_status();
    let mut progress = player.subscribe_progress();
    let mut viewable = player.subscribe_viewable();
    let mut skip = player.subscribe_skip_allowed();

    let session = player.set_source(&args.source).await?;
    println!("source {} as session {}", args.source, session);
    if !autoplay {
        println!("host: play");
        player.play()?;
    }

    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            Some(s) = status.recv() => {
                println!("{:>6.1}s status   {}", remote.position().as_secs_f64(), s);
                if matches!(s, PlaybackStatus::Finished | PlaybackStatus::Failed) {
                    break;
                }
            }
            Some(p) = progress.recv() => {
                println!("{:>6.1}s progress {:?}", remote.position().as_secs_f64(), p);
            }
            Some(()) = viewable.recv() => {
                println!("{:>6.1}s viewable", remote.position().as_secs_f64());
            }
            Some(allowed) = skip.recv() => {
                println!("{:>6.1}s skip     allowed={}", remote.position().as_secs_f64(), allowed);
            }
            _ = ticker.tick() => {
                remote.tick();
            }
        }
    }

    // The snapshot reply is queued behind everything emitted so far.
    let snapshot = player.snapshot().await?;
    while let Ok(p) = progress.try_recv() {
        println!("{:>6.1}s progress {:?}", snapshot.position_secs, p);
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    player.shutdown().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;
    match cli.command {
        Commands::Simulate(args) => simulate(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulate_args(extra: &[&str]) -> SimulateArgs {
        let argv = ["rfplayer", "simulate"].iter().chain(extra);
        match Cli::parse_from(argv).command {
            Commands::Simulate(args) => args,
        }
    }

    #[test]
    fn timing_follows_duration_and_speed() {
        let args = simulate_args(&["--duration", "12", "--speed", "4"]);
        let (length, period) = args.timing().unwrap();
        assert_eq!(length, Duration::from_secs(12));
        assert_eq!(period, Duration::from_millis(250));
    }

    #[test]
    fn timing_rejects_unrepresentable_values() {
        let cases: [&[&str]; 5] = [
            &["--duration", "1e30"],
            &["--speed", "1e-30"],
            &["--duration", "0"],
            &["--duration", "NaN"],
            &["--speed=-1"],
        ];
        for extra in cases {
            assert!(simulate_args(extra).timing().is_err(), "{:?}", extra);
        }
    }
}
