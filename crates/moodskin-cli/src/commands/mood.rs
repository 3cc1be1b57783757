use anyhow::{Context as _, Result};
use colored::Colorize;
use moodskin_application::DetectOutcome;
use moodskin_core::theme::catalog;
use std::io::Read;

use super::context::Context;
use super::render;

pub async fn detect(ctx: &Context, text: Option<String>, stdin: bool) -> Result<()> {
    let text = if stdin {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read text from stdin")?;
        buf
    } else {
        text.unwrap_or_default()
    };

    match ctx.app.detect_text(&text).await? {
        DetectOutcome::Applied(state) => render::print_display(&state),
        DetectOutcome::Superseded => {
            println!("{}", "A newer detection replaced this one.".yellow());
        }
    }
    Ok(())
}

pub async fn reset(ctx: &Context) -> Result<()> {
    let state = ctx.app.reset().await?;
    render::print_display(&state);
    Ok(())
}

pub async fn show(ctx: &Context) -> Result<()> {
    render::print_display(&ctx.app.display().await);
    Ok(())
}

/// Lists every mood theme in canonical order.
pub fn themes() -> Result<()> {
    for (mood, theme) in catalog() {
        println!("{}", render::mood_label(Some(mood)).bold());
        render::print_theme(theme);
        println!();
    }
    Ok(())
}
