//! Remix - 长文转推文
//!
//! 入口：初始化日志、加载配置与凭据、组装 Session 与收藏列表，
//! 从 stdin 读取正文生成一批候选并打印（剩余字数 + 分享链接），最后列出已保存的推文。

use std::io::Read;

use anyhow::Context;
use remix::{create_remix, observability};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let mut app = create_remix(None).context("Failed to start remix")?;

    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .context("Failed to read source text from stdin")?;

    let outcome = app
        .session
        .submit(source)
        .await
        .context("Nothing to remix")?
        .clone();
    tracing::info!(?outcome, "Generation finished");

    for candidate in app.session.candidates() {
        let budget = app
            .session
            .budget(candidate.id)
            .map(|b| b.remaining())
            .unwrap_or_default();
        println!("{}. {}", candidate.id + 1, candidate.content);
        println!("   remaining: {}", budget);
        if let Ok(url) = app.session.share(candidate.id) {
            println!("   share: {}", url);
        }
    }

    if let Err(e) = app.view.refresh().await {
        tracing::warn!("Could not load saved tweets: {}", e);
        return Ok(());
    }
    if app.view.is_empty() {
        println!("\nNo saved tweets yet");
    } else {
        println!("\nSaved tweets:");
        for post in app.view.items() {
            println!("- [{}] {}", post.created_at.format("%Y-%m-%d"), post.content);
        }
    }

    Ok(())
}
