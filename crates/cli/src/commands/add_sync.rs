// SPDX-License-Identifier: MIT

//! `rclone-bisync-manager add-sync` — enqueue one or more jobs on a
//! running daemon's add-sync socket.

use anyhow::{bail, Result};
use clap::Args;

use bisync_daemon::paths;

use crate::client;

#[derive(Args)]
pub struct AddSyncArgs {
    /// Job keys to enqueue.
    #[arg(required = true)]
    pub jobs: Vec<String>,
    /// Force a bisync run (skip resync-needed checks) for these jobs.
    #[arg(long = "force-bisync")]
    pub force_bisync: bool,
}

pub async fn run(args: AddSyncArgs) -> Result<()> {
    let socket_path = paths::add_sync_socket_path();
    let mut failures = Vec::new();

    for job in &args.jobs {
        match client::send_add_sync(&socket_path, job, args.force_bisync).await {
            Ok(response) if response == "OK" => println!("{job}: enqueued"),
            Ok(response) => {
                println!("{job}: {response}");
                failures.push(job.clone());
            }
            Err(e) => {
                println!("{job}: {e}");
                failures.push(job.clone());
            }
        }
    }

    if !failures.is_empty() {
        bail!("failed to enqueue: {}", failures.join(", "));
    }
    Ok(())
}
