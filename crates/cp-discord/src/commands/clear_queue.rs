//! /clearqueue command - Drop pending print jobs (poise implementation)

use tracing::{info, warn};

use crate::commands::Context;
use crate::error::Result;

/// Clear the print queue (admin only)
#[poise::command(slash_command, rename = "clearqueue")]
pub async fn clear_queue(ctx: Context<'_>) -> Result<()> {
    let data = ctx.data();
    let user_id = ctx.author().id.get();

    if !data.is_admin(user_id) {
        warn!("Rejected /clearqueue from non-admin user: {}", user_id);
        ctx.send(
            poise::CreateReply::default()
                .content("管理者のみ実行できます。")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    info!("Clearing print queue for {}", ctx.author().name);

    let response = match data.forwarder.client().clear_queue().await {
        Ok(()) => "印刷キューをクリアしました。".to_string(),
        Err(e) => {
            warn!("Failed to clear print queue: {}", e);
            format!("エラーが発生しました: {}", e)
        }
    };

    ctx.say(response).await?;

    Ok(())
}
