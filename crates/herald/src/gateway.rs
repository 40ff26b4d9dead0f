//! Line-delimited JSON transport between the client and its host process.
//!
//! Each inbound line is one [`GatewayEvent`]; each outbound command is
//! written back as one JSON line.

use herald_event_system::{GatewayEvent, OutboundCommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Counters for one inbound stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ForwardStats {
    pub forwarded: usize,
    pub rejected: usize,
}

/// Parses events from `reader` into `events` until EOF or until the
/// receiving side goes away.
///
/// Lines are read as raw bytes, so a line that is not UTF-8 or not a valid
/// event is logged, counted as rejected and skipped without ending the
/// stream.
pub async fn forward_events<R>(mut reader: R, events: mpsc::Sender<GatewayEvent>) -> std::io::Result<ForwardStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = ForwardStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        if buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<GatewayEvent>(&buf) {
            Ok(event) => {
                if events.send(event).await.is_err() {
                    debug!("Event queue closed, stopping inbound reader");
                    break;
                }
                stats.forwarded += 1;
            }
            Err(e) => {
                warn!("⚠️ Skipping malformed gateway line: {}", e);
                stats.rejected += 1;
            }
        }
    }

    Ok(stats)
}

/// Writes every queued command to `writer` as a JSON line.
///
/// Returns the number of commands written once the queue is closed.
pub async fn drain_outbound<W>(
    mut commands: mpsc::UnboundedReceiver<OutboundCommand>,
    mut writer: W,
) -> anyhow::Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(command) = commands.recv().await {
        let mut line = serde_json::to_vec(&command)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_event_system::{EventArgs, EventName};
    use serde_json::json;

    #[tokio::test]
    async fn test_forward_events_skips_bad_lines() {
        let input = concat!(
            "{\"event\":\"warn\",\"args\":[\"low memory\"]}\n",
            "\n",
            "not json\n",
            "{\"event\":\"ready\"}\n",
        );
        let (tx, mut rx) = mpsc::channel(8);

        let stats = forward_events(input.as_bytes(), tx).await.unwrap();
        assert_eq!(stats, ForwardStats { forwarded: 2, rejected: 1 });

        let first = rx.recv().await.unwrap();
        assert_eq!(first.name, EventName::WARN);
        assert_eq!(first.args, EventArgs::from(["low memory"]));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.name, EventName::READY);
        assert!(second.args.is_empty());

        // Sender dropped with the reader.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_forward_events_survives_invalid_utf8() {
        let mut input = b"{\"event\":\"debug\",\"args\":[\"a\"]}\n".to_vec();
        input.extend_from_slice(&[0xff, 0xfe, b'\n']);
        input.extend_from_slice(b"{\"event\":\"debug\",\"args\":[\"b\"]}");
        let (tx, mut rx) = mpsc::channel(8);

        let stats = forward_events(input.as_slice(), tx).await.unwrap();
        assert_eq!(stats, ForwardStats { forwarded: 2, rejected: 1 });

        assert_eq!(rx.recv().await.unwrap().args, EventArgs::from(["a"]));
        assert_eq!(rx.recv().await.unwrap().args, EventArgs::from(["b"]));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_forward_stops_when_queue_closes() {
        let input = "{\"event\":\"debug\",\"args\":[\"a\"]}\n{\"event\":\"debug\",\"args\":[\"b\"]}\n";
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let stats = forward_events(input.as_bytes(), tx).await.unwrap();
        assert_eq!(stats.forwarded, 0);
    }

    #[tokio::test]
    async fn test_drain_outbound_writes_json_lines() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(OutboundCommand::new("presence", json!({"status": "online"})))
            .unwrap();
        drop(tx);

        let mut out = Vec::new();
        let written = drain_outbound(rx, &mut out).await.unwrap();
        assert_eq!(written, 1);

        let text = String::from_utf8(out).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(parsed, json!({"op": "presence", "payload": {"status": "online"}}));
        assert!(text.ends_with('\n'));
    }
}
