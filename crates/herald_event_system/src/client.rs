//! Bot client: startup wiring and the event pump.
//!
//! [`BotClient::start`] loads the handler classes into a fresh dispatcher
//! and freezes it. [`BotClient::run`] then pulls events from an
//! [`EventSource`] one at a time and emits each on the dispatcher. Handler
//! failures that reach the pump are reported through the context logger,
//! which is where message-only diagnostics lose their trace.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::context::ClientContext;
use crate::dispatcher::Dispatcher;
use crate::error::LoaderError;
use crate::events::GatewayEvent;
use crate::handler::HandlerClassRef;
use crate::loader::{HandlerLoader, LoadReport};
use crate::registry::EventMetadata;

/// Where platform events come from.
#[async_trait]
pub trait EventSource: Send {
    /// Next event, or `None` once the connection is finished.
    async fn next_event(&mut self) -> Option<GatewayEvent>;
}

/// Event source fed through a tokio channel.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<GatewayEvent>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<GatewayEvent>) -> Self {
        Self { rx }
    }

    /// Creates a bounded channel and returns its sending half with the source.
    pub fn channel(buffer: usize) -> (mpsc::Sender<GatewayEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl EventSource for ChannelSource {
    async fn next_event(&mut self) -> Option<GatewayEvent> {
        self.rx.recv().await
    }
}

#[async_trait]
impl EventSource for VecDeque<GatewayEvent> {
    async fn next_event(&mut self) -> Option<GatewayEvent> {
        self.pop_front()
    }
}

/// Outcome of dispatching one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    pub handlers: usize,
    pub failures: usize,
}

/// Totals for a finished pump run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpSummary {
    pub events: u64,
    pub failures: u64,
}

pub struct BotClient {
    ctx: Arc<ClientContext>,
    dispatcher: Arc<Dispatcher>,
    report: LoadReport,
}

impl BotClient {
    /// Loads `classes` and freezes the resulting dispatcher.
    ///
    /// Fails without a client if any class is misconfigured.
    pub fn start<I>(
        ctx: Arc<ClientContext>,
        classes: I,
        metadata: &EventMetadata,
    ) -> Result<Self, LoaderError>
    where
        I: IntoIterator<Item = HandlerClassRef>,
    {
        let mut dispatcher = Dispatcher::new();
        let report = HandlerLoader::new(ctx.clone()).load(classes, metadata, &mut dispatcher)?;
        info!(
            "🚀 Client session {} ready with {} handlers on {} events",
            ctx.connection().session_id(),
            report.len(),
            dispatcher.event_names().len()
        );
        Ok(Self {
            ctx,
            dispatcher: Arc::new(dispatcher),
            report,
        })
    }

    pub fn context(&self) -> &Arc<ClientContext> {
        &self.ctx
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    /// Emits one event and reports any handler failures.
    pub fn dispatch(&self, event: &GatewayEvent) -> Dispatched {
        self.ctx.state().record_event(&event.name);
        let handlers = self.dispatcher.handler_count(event.name.as_str());

        match self.dispatcher.emit(event.name.as_str(), &event.args, &self.ctx) {
            Ok(handlers) => Dispatched {
                handlers,
                failures: 0,
            },
            Err(err) => {
                for failure in err.failures() {
                    self.ctx.report(&failure.handler, &failure.error);
                }
                Dispatched {
                    handlers,
                    failures: err.failures().len(),
                }
            }
        }
    }

    /// Totals for every event dispatched so far.
    ///
    /// Stays accurate when [`BotClient::run`] is cancelled part way through.
    pub fn summary(&self) -> PumpSummary {
        let stats = self.dispatcher.stats();
        PumpSummary {
            events: stats.events_emitted,
            failures: stats.handler_failures,
        }
    }

    /// Pumps events until the source is exhausted.
    pub async fn run<S: EventSource + ?Sized>(&self, source: &mut S) -> PumpSummary {
        let mut summary = PumpSummary::default();
        while let Some(event) = source.next_event().await {
            debug!("Received '{}' with {} args", event.name, event.args.len());
            let outcome = self.dispatch(&event);
            summary.events += 1;
            summary.failures += outcome.failures as u64;
        }
        info!(
            "Event source closed after {} events ({} handler failures)",
            summary.events, summary.failures
        );
        summary
    }
}
