// SPDX-License-Identifier: MIT

//! A thin client for the daemon's two Unix-domain sockets, grounded on
//! the teacher's `DaemonClient` shape but stripped to this protocol's
//! plain-text wire format: one newline-terminated command in, one
//! newline-terminated response out.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running (no socket at {0})")]
    NotRunning(PathBuf),
    #[error("I/O error talking to daemon: {0}")]
    Io(#[from] io::Error),
    #[error("daemon response timed out")]
    Timeout,
    #[error("daemon sent a response that could not be parsed: {0}")]
    BadResponse(#[from] serde_json::Error),
}

/// Connects to the status/control socket, sends one command, and returns
/// its JSON response.
pub async fn send_status_command(socket_path: &Path, command: &str) -> Result<Value, ClientError> {
    if !socket_path.exists() {
        return Err(ClientError::NotRunning(socket_path.to_path_buf()));
    }
    let line = roundtrip(socket_path, command).await?;
    Ok(serde_json::from_str(&line)?)
}

/// Connects to the add-sync socket and enqueues `job_key`, returning the
/// daemon's plain-text reply (`"OK"` or `"ERROR: ..."`).
pub async fn send_add_sync(socket_path: &Path, job_key: &str, force_bisync: bool) -> Result<String, ClientError> {
    if !socket_path.exists() {
        return Err(ClientError::NotRunning(socket_path.to_path_buf()));
    }
    #[derive(Serialize)]
    struct Request<'a> {
        job_key: &'a str,
        #[serde(skip_serializing_if = "is_false")]
        force_bisync: bool,
    }
    fn is_false(b: &bool) -> bool {
        !*b
    }
    let body = serde_json::to_string(&Request { job_key, force_bisync })?;
    roundtrip(socket_path, &body).await
}

async fn roundtrip(socket_path: &Path, line: &str) -> Result<String, ClientError> {
    let work = async {
        let stream = UnixStream::connect(socket_path).await?;
        let (read_half, mut write_half) = stream.into_split();
        write_half.write_all(line.as_bytes()).await?;
        write_half.write_all(b"\n").await?;

        let mut reader = BufReader::new(read_half);
        let mut response = String::new();
        reader.read_line(&mut response).await?;
        Ok::<_, io::Error>(response.trim_end().to_string())
    };
    tokio::time::timeout(REQUEST_TIMEOUT, work).await.map_err(|_| ClientError::Timeout)?.map_err(ClientError::from)
}
