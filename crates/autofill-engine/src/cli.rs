//! Line-oriented serving: one JSON message in, one JSON line out.

use crate::session::{Inbound, PageEdit, ScanSession};
use autofill_common::protocol::{Request, Response};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, warn};

/// What one input line asks for.
enum Line {
    Request(Request),
    Edit(PageEdit),
    Rejected(Response),
}

fn classify_line(text: &str) -> Line {
    let is_edit = serde_json::from_str::<serde_json::Value>(text)
        .is_ok_and(|value| value.get("edit").is_some());
    if is_edit {
        return match serde_json::from_str::<PageEdit>(text) {
            Ok(edit) => Line::Edit(edit),
            Err(e) => Line::Rejected(Response::error(format!("Malformed edit: {e}"))),
        };
    }
    match Request::from_json(text) {
        Ok(request) => Line::Request(request),
        Err(e) => {
            warn!("Rejected message: {}", e);
            Line::Rejected(Response::from(e))
        }
    }
}

/// Serialize one output line. Failures are logged, never fatal.
pub fn to_line<T: Serialize>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(line) => Some(line),
        Err(e) => {
            error!("Failed to encode output: {}", e);
            None
        }
    }
}

/// Drive `session` from `input` until EOF. Responses go to `out` in request
/// order; page edits (`{"edit": "appendHtml" | "remove", ...}`) produce no output.
pub async fn serve_lines<R, O>(session: &mut ScanSession, input: R, mut out: O)
where
    R: AsyncBufRead + Unpin,
    O: FnMut(&str),
{
    let (tx, rx) = mpsc::channel::<Inbound>(16);

    let reader = async move {
        let mut lines = input.lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to read input: {}", e);
                    break;
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let response = match classify_line(trimmed) {
                Line::Rejected(response) => response,
                Line::Edit(edit) => {
                    if tx.send(Inbound::Edit(edit)).await.is_err() {
                        break;
                    }
                    continue;
                }
                Line::Request(request) => {
                    let (reply, answer) = oneshot::channel();
                    if tx.send(Inbound::Message { request, reply }).await.is_err() {
                        break;
                    }
                    match answer.await {
                        Ok(response) => response,
                        Err(_) => break,
                    }
                }
            };
            if let Some(text) = to_line(&response) {
                out(&text);
            }
        }
    };

    tokio::join!(session.run(rx), reader);
}
