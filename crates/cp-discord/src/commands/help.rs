//! /help command - Show help information (poise implementation)

use crate::commands::Context;
use crate::error::Result;

pub(crate) fn help_text(channel_id: u64) -> String {
    format!(
        r#"**chatprint**

<#{channel_id}> に投稿されたメッセージをレシートプリンターに印刷します。
ボットのメッセージは印刷されません。印刷に成功すると ✅ が付きます。

**Slash Commands:**

- `/printer` - 印刷サービスの状態とキューの長さを表示
- `/clearqueue` - 印刷キューをクリア（管理者のみ）
- `/help` - このヘルプを表示
"#
    )
}

/// Show help information about the bot
#[poise::command(slash_command, rename = "help")]
pub async fn help(ctx: Context<'_>) -> Result<()> {
    let channel_id = ctx.data().forwarder.channel_id();
    ctx.say(help_text(channel_id)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_mentions_channel_and_commands() {
        let text = help_text(1400529692225703966);
        assert!(text.contains("<#1400529692225703966>"));
        assert!(text.contains("/printer"));
        assert!(text.contains("/clearqueue"));
    }
}
