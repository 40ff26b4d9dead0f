//! # Herald Bot Client
//!
//! Runs the event dispatch core against a line-delimited JSON gateway:
//! platform events arrive on stdin, outbound commands leave on stdout.
//!
//! ## Usage
//!
//! ```bash
//! herald --config herald.toml --log-level debug
//! ```

use anyhow::{anyhow, Context, Result};
use herald_event_system::{
    builtin_handlers, BotClient, ChannelSource, ClientContext, ClientLogger, ConnectionHandle,
    EventMetadata, OutboundCommand,
};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

mod cli;
mod config;
mod gateway;
mod logging;
mod signals;

use cli::CliArgs;
use config::{AppConfig, ConfigSource};
use signals::ShutdownSignal;

/// Main application struct that wires configuration, logging and the client.
struct Application {
    config: AppConfig,
    client: BotClient,
    outbound: mpsc::UnboundedReceiver<OutboundCommand>,
}

impl Application {
    /// Loads and validates configuration, installs logging and starts the
    /// client with the enabled built-in handlers.
    async fn new(args: CliArgs) -> Result<Self> {
        let (mut config, source) = AppConfig::load_from_file(&args.config_path)
            .await
            .with_context(|| format!("failed to load {}", args.config_path.display()))?;

        if let Some(level) = args.log_level {
            config.logging.level = level;
        }
        if args.json_logs {
            config.logging.json_format = true;
        }

        config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {e}"))?;

        logging::setup_logging(&config.logging)?;
        if source == ConfigSource::CreatedDefault {
            info!("Created default configuration file: {}", args.config_path.display());
        }

        let (connection, outbound) = ConnectionHandle::channel();
        let ctx = Arc::new(ClientContext::new(ClientLogger::tracing(), connection));

        let mut metadata = EventMetadata::new();
        let classes = config.handlers.select(builtin_handlers(&mut metadata));
        for disabled in &config.handlers.disabled {
            info!("⏭️ Handler {} disabled by configuration", disabled);
        }

        let client = BotClient::start(ctx, classes, &metadata).context("failed to wire handlers")?;

        Ok(Self {
            config,
            client,
            outbound,
        })
    }

    /// Pumps events until stdin closes or a shutdown signal arrives.
    async fn run(self) -> Result<()> {
        let Application {
            config,
            client,
            outbound,
        } = self;

        info!(
            "🤖 Starting session '{}' ({})",
            config.client.session_name,
            client.context().connection().session_id()
        );

        let (events_tx, mut source) = ChannelSource::channel(config.client.event_buffer);

        let reader = tokio::spawn(async move {
            let stdin = BufReader::new(tokio::io::stdin());
            match gateway::forward_events(stdin, events_tx).await {
                Ok(stats) => info!(
                    "📥 Inbound stream closed: {} forwarded, {} rejected",
                    stats.forwarded, stats.rejected
                ),
                Err(e) => error!("❌ Failed reading gateway input: {}", e),
            }
        });

        let writer = tokio::spawn(gateway::drain_outbound(outbound, tokio::io::stdout()));

        match ShutdownSignal::install() {
            Ok(mut shutdown) => {
                tokio::select! {
                    _ = client.run(&mut source) => {}
                    name = shutdown.recv() => {
                        info!("🛑 {} received, closing session", name);
                    }
                }
            }
            Err(e) => {
                warn!("Shutdown signals unavailable, running until input ends: {}", e);
                client.run(&mut source).await;
            }
        }

        let summary = client.summary();

        reader.abort();
        client.context().connection().close();
        // The writer finishes once the last connection handle is gone.
        drop(client);

        match writer.await {
            Ok(Ok(written)) => info!("📤 Wrote {} outbound commands", written),
            Ok(Err(e)) => error!("❌ Failed writing outbound commands: {}", e),
            Err(e) => error!("❌ Outbound writer task failed: {}", e),
        }

        info!(
            "✅ Session ended after {} events ({} handler failures)",
            summary.events, summary.failures
        );
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    let app = match Application::new(args).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("❌ Failed to start herald: {e:#}");
            std::process::exit(1);
        }
    };

    let code = match app.run().await {
        Ok(()) => 0,
        Err(e) => {
            error!("❌ Client error: {:#}", e);
            1
        }
    };
    // A pending stdin read would otherwise hold the runtime open.
    std::process::exit(code);
}
