//! MQTT Message Log CLI
//!
//! Replays JSON-lines protocol events through the message logger, using the
//! same configuration a broker integration would load.

use clap::Parser;
use mqtt_message_log::output::LOG_TARGET;
use mqtt_message_log::{EventDispatcher, MessageLogConfig, ProtocolEvent};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, error, info};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "mqtt-message-log",
    about = "Format MQTT protocol events as plain text or JSON log lines",
    version
)]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, default_value = "mqtt-message-log.yaml")]
    config: PathBuf,

    /// JSON-lines file of protocol events (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: String,

    /// Print default configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging; message lines stay visible whatever the level
    let log_level = args.log_level.parse().unwrap_or(tracing::Level::INFO);
    let filter = Targets::new()
        .with_default(log_level)
        .with_target(LOG_TARGET, tracing::Level::INFO);
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    if args.print_config {
        let yaml = serde_yaml::to_string(&MessageLogConfig::default())?;
        println!("{}", yaml);
        return Ok(());
    }

    let config = if args.validate {
        match MessageLogConfig::read(&args.config) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %args.config.display(), error = %e, "Invalid configuration");
                std::process::exit(1);
            }
        }
    } else if args.config.exists() {
        MessageLogConfig::load(&args.config)
    } else {
        info!("Using default configuration");
        MessageLogConfig::default()
    };

    if args.validate {
        info!("Configuration is valid");
        println!("Configuration Summary:");
        println!("  Format: {:?}", config.format);
        println!("  Verbose: {}", config.verbose);
        println!("  Payload: {}", config.payload);
        println!("  Redact password: {}", config.redact_password);
        println!("  Outputs: {}", config.outputs.len());
        return Ok(());
    }

    let dispatcher = EventDispatcher::from_config(&config);

    let reader: Box<dyn AsyncRead + Unpin + Send> = match args.input {
        Some(ref path) => Box::new(tokio::fs::File::open(path).await?),
        None => Box::new(tokio::io::stdin()),
    };

    let mut lines = BufReader::new(reader).lines();
    let mut line_number = 0u64;
    let mut skipped = 0u64;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ProtocolEvent>(&line) {
            Ok(event) => {
                dispatcher.dispatch(&event);
            }
            Err(e) => {
                debug!(line = line_number, error = %e, "Skipping malformed event");
                skipped += 1;
            }
        }
    }

    dispatcher.logger().flush();

    info!(
        format = ?dispatcher.logger().config().format,
        written = dispatcher.logger().lines_written(),
        filtered = dispatcher.events_filtered(),
        skipped,
        sink_errors = dispatcher.logger().sink_errors(),
        "Replay finished"
    );

    Ok(())
}
