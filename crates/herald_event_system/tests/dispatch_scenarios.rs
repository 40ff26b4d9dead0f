//! End-to-end scenarios for handler loading and event dispatch.

use herald_event_system::{
    builtin_handlers, declare_handlers, BotClient, ClientContext, ClientLogger, ConnectionHandle,
    DebugEvent, DiagnosticError, Dispatcher, ErrorEvent, EventArgs, EventHandler, EventMetadata, GatewayEvent,
    HandlerClass, HandlerClassRef, HandlerError, HandlerLoader, LoaderError, LogLevel, MemorySink,
    WarnEvent,
};
use std::sync::{Arc, Mutex};

fn memory_context() -> (Arc<MemorySink>, Arc<ClientContext>) {
    let sink = Arc::new(MemorySink::new());
    let (connection, _outbound) = ConnectionHandle::channel();
    let ctx = Arc::new(ClientContext::new(ClientLogger::new(sink.clone()), connection));
    (sink, ctx)
}

/// Handlers that append their name to a shared cache entry so ordering is
/// visible through the context alone.
struct AuditFirst;
struct AuditSecond;

fn append(ctx: &ClientContext, who: &str, args: &EventArgs) -> Result<(), HandlerError> {
    let payload = args.str_arg(0)?;
    let mut trail = ctx.state().cache_get("audit").unwrap_or_default();
    trail.push_str(&format!("{who}:{payload};"));
    ctx.state().cache_insert("audit", trail);
    Ok(())
}

impl EventHandler for AuditFirst {
    fn handler_name(&self) -> &str {
        "AuditFirst"
    }
    fn execute(&self, ctx: &ClientContext, args: &EventArgs) -> Result<(), HandlerError> {
        append(ctx, "first", args)
    }
}

impl HandlerClass for AuditFirst {
    fn create(_ctx: &Arc<ClientContext>) -> Self {
        AuditFirst
    }
}

impl EventHandler for AuditSecond {
    fn handler_name(&self) -> &str {
        "AuditSecond"
    }
    fn execute(&self, ctx: &ClientContext, args: &EventArgs) -> Result<(), HandlerError> {
        append(ctx, "second", args)
    }
}

impl HandlerClass for AuditSecond {
    fn create(_ctx: &Arc<ClientContext>) -> Self {
        AuditSecond
    }
}

/// Records the exact arguments of every call.
struct Capture;

static CAPTURED: Mutex<Vec<EventArgs>> = Mutex::new(Vec::new());

impl EventHandler for Capture {
    fn handler_name(&self) -> &str {
        "Capture"
    }
    fn execute(&self, _ctx: &ClientContext, args: &EventArgs) -> Result<(), HandlerError> {
        CAPTURED.lock().unwrap().push(args.clone());
        Ok(())
    }
}

impl HandlerClass for Capture {
    fn create(_ctx: &Arc<ClientContext>) -> Self {
        Capture
    }
}

#[test]
fn debug_event_logs_message_verbatim() {
    let (sink, ctx) = memory_context();
    let mut metadata = EventMetadata::new();
    let classes = declare_handlers!(metadata; DebugEvent => "debug");
    let client = BotClient::start(ctx, classes, &metadata).unwrap();

    client
        .dispatcher()
        .emit("debug", &EventArgs::from(["hello"]), client.context())
        .unwrap();

    assert_eq!(sink.messages(LogLevel::Debug), vec!["hello"]);
}

#[test]
fn warn_event_prefixes_message() {
    let (sink, ctx) = memory_context();
    let mut metadata = EventMetadata::new();
    let classes = declare_handlers!(metadata; WarnEvent => "warn");
    let client = BotClient::start(ctx, classes, &metadata).unwrap();

    client
        .dispatcher()
        .emit("warn", &EventArgs::from(["low memory"]), client.context())
        .unwrap();

    assert_eq!(sink.messages(LogLevel::Warn), vec!["CLIENT_WARN: low memory"]);
}

#[test]
fn error_event_prefixes_message() {
    let (sink, ctx) = memory_context();
    let mut metadata = EventMetadata::new();
    let classes = declare_handlers!(metadata; ErrorEvent => "error");
    let client = BotClient::start(ctx, classes, &metadata).unwrap();

    client
        .dispatcher()
        .emit("error", &EventArgs::from(["boom"]), client.context())
        .unwrap();

    assert_eq!(sink.messages(LogLevel::Error), vec!["CLIENT_ERROR: boom"]);
}

#[test]
fn missing_metadata_aborts_startup() {
    let (_sink, ctx) = memory_context();
    let mut metadata = EventMetadata::new();
    let mut classes = builtin_handlers(&mut metadata);
    classes.push(HandlerClassRef::of::<AuditFirst>());

    match BotClient::start(ctx.clone(), classes.clone(), &metadata) {
        Err(LoaderError::MissingEventName { handler }) => assert_eq!(handler, "AuditFirst"),
        Err(other) => panic!("unexpected loader error: {other}"),
        Ok(_) => panic!("startup should fail"),
    }

    // Nothing before the faulty class was bound either.
    let mut dispatcher = Dispatcher::new();
    assert!(HandlerLoader::new(ctx)
        .load(classes, &metadata, &mut dispatcher)
        .is_err());
    assert_eq!(dispatcher.handler_count("debug"), 0);
    assert_eq!(dispatcher.stats().total_handlers, 0);
}

#[test]
fn shared_event_name_delivers_to_all_in_order() {
    let (_sink, ctx) = memory_context();
    let mut metadata = EventMetadata::new();
    let classes = declare_handlers!(metadata;
        AuditFirst => "message",
        AuditSecond => "message",
    );
    let client = BotClient::start(ctx, classes, &metadata).unwrap();
    assert_eq!(client.load_report().len(), 2);

    client.dispatch(&GatewayEvent::new("message", ["a"]));
    client.dispatch(&GatewayEvent::new("message", ["b"]));

    assert_eq!(
        client.context().state().cache_get("audit").as_deref(),
        Some("first:a;second:a;first:b;second:b;")
    );
}

#[test]
fn emit_calls_handler_once_with_same_args() {
    let (_sink, ctx) = memory_context();
    let mut metadata = EventMetadata::new();
    let classes = declare_handlers!(metadata; Capture => "capture");
    let client = BotClient::start(ctx, classes, &metadata).unwrap();

    let args = EventArgs::new().with("text").with(7).with(true);
    let before = CAPTURED.lock().unwrap().len();
    assert_eq!(
        client.dispatcher().emit("capture", &args, client.context()).unwrap(),
        1
    );

    let captured = CAPTURED.lock().unwrap();
    assert_eq!(captured.len() - before, 1);
    assert_eq!(captured.last(), Some(&args));
}

#[test]
fn redeclaring_a_class_moves_it_to_the_new_event() {
    let (sink, ctx) = memory_context();
    let mut metadata = EventMetadata::new();
    metadata.attach::<DebugEvent>("trace");
    let classes = declare_handlers!(metadata; DebugEvent => "debug");
    let client = BotClient::start(ctx, classes, &metadata).unwrap();

    assert_eq!(client.dispatcher().handler_count("trace"), 0);
    client.dispatch(&GatewayEvent::new("debug", ["moved"]));
    assert_eq!(sink.messages(LogLevel::Debug), vec!["moved"]);
}

#[test]
fn diagnostic_error_has_message_only_trace() {
    let err = DiagnosticError::new("X");
    assert_eq!(err.trace(), "X");

    let rendered = HandlerError::from(err).render();
    assert_eq!(rendered, "X");
    assert!(!rendered.contains("at "));
}

#[tokio::test]
async fn pump_reports_failures_through_logger() {
    let (sink, ctx) = memory_context();
    let mut metadata = EventMetadata::new();
    let classes = builtin_handlers(&mut metadata);
    let client = BotClient::start(ctx, classes, &metadata).unwrap();

    let mut source = std::collections::VecDeque::from(vec![
        GatewayEvent::new("warn", ["disk almost full"]),
        GatewayEvent::new("error", EventArgs::new().with(500)),
    ]);
    let summary = client.run(&mut source).await;

    assert_eq!(summary.events, 2);
    assert_eq!(summary.failures, 1);
    assert_eq!(
        sink.messages(LogLevel::Error),
        vec!["ErrorEvent: argument 0 should be a string, got 500"]
    );
}
