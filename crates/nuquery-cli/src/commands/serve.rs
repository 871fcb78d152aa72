//! Line-delimited JSON tool server.
//!
//! Each input line is `{"id": any, "tool": "...", "arguments": {...}}`; each
//! reply is one line of `{"id": ..., "result": ...}` or
//! `{"id": ..., "error": {"code", "message", "suggestion"?}}`. Requests run
//! concurrently and replies are written as they complete, so clients match
//! them by `id`. The loop ends once input is exhausted and every request has
//! been answered, or as soon as `shutdown` resolves (in-flight requests are
//! aborted). Either way the service cache is released before returning.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use nuquery_core::error::ErrorCode;
use nuquery_service::{call_tool, PackageService, ToolError};

use super::suggest_similar_tool;

#[derive(Debug, Deserialize)]
struct ToolRequest {
    #[serde(default)]
    id: Value,
    tool: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct ToolReply {
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ToolError>,
}

impl ToolReply {
    fn success(id: Value, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, error: ToolError) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Answer tool calls from `reader` until EOF or `shutdown`; returns the number handled
pub async fn serve<R, W, S>(
    service: Arc<PackageService>,
    reader: R,
    mut writer: W,
    shutdown: S,
) -> anyhow::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    let mut lines = reader.lines();
    let mut in_flight: JoinSet<ToolReply> = JoinSet::new();
    let mut reading = true;
    let mut handled = 0;
    tokio::pin!(shutdown);

    let outcome = loop {
        if !reading && in_flight.is_empty() {
            break Ok(handled);
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Interrupted with {} request(s) in flight, shutting down", in_flight.len());
                break Ok(handled);
            },
            Some(joined) = in_flight.join_next() => {
                let reply = match joined {
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!("Request task failed: {}", e);
                        continue;
                    },
                };
                if let Err(err) = write_reply(&mut writer, &reply).await {
                    break Err(err);
                }
                handled += 1;
            },
            line = lines.next_line(), if reading => {
                match line.context("Failed to read request") {
                    Ok(Some(line)) if line.trim().is_empty() => {},
                    Ok(Some(line)) => {
                        let service = Arc::clone(&service);
                        in_flight.spawn(async move { handle_line(&service, &line).await });
                    },
                    Ok(None) => {
                        debug!("Input closed; waiting on {} request(s)", in_flight.len());
                        reading = false;
                    },
                    Err(err) => break Err(err),
                }
            },
        }
    };

    in_flight.abort_all();
    service.shutdown();
    outcome
}

async fn handle_line(service: &PackageService, line: &str) -> ToolReply {
    let request: ToolRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!("Malformed request: {}", e);
            return ToolReply::failure(
                Value::Null,
                ToolError::new(ErrorCode::InvalidArguments, format!("Malformed request: {}", e)),
            );
        },
    };

    debug!("Request {} -> {}", request.id, request.tool);
    match call_tool(service, &request.tool, request.arguments).await {
        Ok(result) => ToolReply::success(request.id, result),
        Err(mut err) => {
            if err.code == ErrorCode::UnknownTool && err.suggestion.is_none() {
                err.suggestion =
                    suggest_similar_tool(&request.tool).map(|name| format!("Did you mean '{}'?", name));
            }
            ToolReply::failure(request.id, err)
        },
    }
}

async fn write_reply<W: AsyncWrite + Unpin>(writer: &mut W, reply: &ToolReply) -> anyhow::Result<()> {
    let mut encoded = serde_json::to_vec(reply).context("Failed to encode reply")?;
    encoded.push(b'\n');
    writer.write_all(&encoded).await.context("Failed to write reply")?;
    writer.flush().await.context("Failed to flush reply")
}
