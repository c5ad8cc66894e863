// SPDX-License-Identifier: MIT

//! The two Unix-domain-socket listeners: the status/control socket
//! (`STATUS`/`STOP`/`RELOAD`, newline-terminated text in, JSON out) and
//! the add-sync socket (one JSON object per connection), per spec.md
//! §4.3/§4.7. Accept loops use a 1-second `tokio::time::timeout` around
//! `accept()` so they observe `Supervisor::is_shutting_down` without a
//! dedicated poll thread, the async-native form of the teacher's
//! spawn-a-task-per-connection `Listener::run` loop.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, warn};

use bisync_core::JobKey;

use crate::supervisor::Supervisor;
use crate::DaemonError;

const ACCEPT_POLL: Duration = Duration::from_secs(1);

fn bind(path: &Path) -> Result<UnixListener, DaemonError> {
    let _ = std::fs::remove_file(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(UnixListener::bind(path)?)
}

pub fn bind_status_socket(path: &Path) -> Result<UnixListener, DaemonError> {
    bind(path)
}

pub fn bind_add_sync_socket(path: &Path) -> Result<UnixListener, DaemonError> {
    bind(path)
}

/// Accept loop for the status/control socket. Runs until
/// `supervisor.is_shutting_down()`.
pub async fn run_status_listener(supervisor: Arc<Supervisor>, listener: UnixListener) {
    loop {
        if supervisor.is_shutting_down() {
            return;
        }
        match tokio::time::timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, _addr))) => {
                let supervisor = Arc::clone(&supervisor);
                tokio::spawn(async move {
                    if let Err(e) = handle_status_connection(stream, &supervisor).await {
                        warn!(error = %e, "status connection error");
                    }
                });
            }
            Ok(Err(e)) => warn!(error = %e, "status socket accept error"),
            Err(_) => {} // 1s poll timeout, loop back to check the shutdown flag
        }
    }
}

/// Accept loop for the add-sync socket. Runs until
/// `supervisor.is_shutting_down()`.
pub async fn run_add_sync_listener(supervisor: Arc<Supervisor>, listener: UnixListener) {
    loop {
        if supervisor.is_shutting_down() {
            return;
        }
        match tokio::time::timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, _addr))) => {
                let supervisor = Arc::clone(&supervisor);
                tokio::spawn(async move {
                    if let Err(e) = handle_add_sync_connection(stream, &supervisor).await {
                        warn!(error = %e, "add-sync connection error");
                    }
                });
            }
            Ok(Err(e)) => warn!(error = %e, "add-sync socket accept error"),
            Err(_) => {}
        }
    }
}

async fn handle_status_connection(stream: UnixStream, supervisor: &Supervisor) -> std::io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Ok(()); // client disconnected without sending anything
    }
    let command = line.trim();
    debug!(command, "status socket command received");

    let response = match command {
        "STATUS" => serde_json::to_value(supervisor.status_report().await).unwrap_or_else(|_| json!({"status": "error"})),
        "STOP" => {
            supervisor.request_shutdown();
            json!({"status": "success", "message": "Shutdown signal sent to daemon"})
        }
        "RELOAD" => match supervisor.reload().await {
            Ok(()) => json!({"status": "success"}),
            Err(message) => json!({"status": "error", "message": message}),
        },
        other => json!({"status": "error", "message": format!("unknown command: {other}")}),
    };

    let mut body = serde_json::to_vec(&response).unwrap_or_default();
    body.push(b'\n');
    write_half.write_all(&body).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct AddSyncRequest {
    job_key: String,
    #[serde(default)]
    force_bisync: bool,
}

async fn handle_add_sync_connection(stream: UnixStream, supervisor: &Supervisor) -> std::io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Ok(());
    }

    let response = match serde_json::from_str::<AddSyncRequest>(line.trim()) {
        Ok(request) => {
            let key = JobKey::new(request.job_key);
            if supervisor.has_job(&key) {
                supervisor.enqueue(key, request.force_bisync);
                "OK".to_string()
            } else {
                format!("ERROR: unknown job {key}")
            }
        }
        Err(e) => format!("ERROR: invalid add-sync request: {e}"),
    };

    write_half.write_all(response.as_bytes()).await?;
    write_half.write_all(b"\n").await?;
    Ok(())
}

#[cfg(test)]
#[path = "ipc_tests.rs"]
mod tests;
