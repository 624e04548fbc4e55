//! /printer command - Show print service status (poise implementation)

use tracing::{info, warn};

use cp_core::PrintServiceStatus;

use crate::commands::Context;
use crate::error::Result;

pub(crate) fn status_message(status: &PrintServiceStatus) -> String {
    let jobs = if status.queue_size == 1 { "job" } else { "jobs" };
    format!(
        "Print service is **{}** with {} {} queued.",
        status.status, status.queue_size, jobs
    )
}

/// Show print service status and queue size
#[poise::command(slash_command, rename = "printer")]
pub async fn printer(ctx: Context<'_>) -> Result<()> {
    let data = ctx.data();
    info!("Checking print service status for {}", ctx.author().name);

    let response = match data.forwarder.client().status().await {
        Ok(status) => status_message(&status),
        Err(e) => {
            warn!("Print service status check failed: {}", e);
            format!("Print service is unreachable: {}", e)
        }
    };

    ctx.say(response).await?;

    Ok(())
}
