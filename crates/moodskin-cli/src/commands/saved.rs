use anyhow::Result;
use colored::Colorize;
use moodskin_core::saved::{EXPORT_FILE_NAME, SaveOutcome};
use moodskin_core::Notice;
use std::path::PathBuf;

use super::context::Context;
use super::render;

pub async fn list(ctx: &Context) -> Result<()> {
    let saved = ctx.app.saved().await;
    if saved.is_empty() {
        println!("{}", "No saved themes yet.".dimmed());
        return Ok(());
    }

    for (index, entry) in saved.entries().iter().enumerate() {
        println!(
            "{} {}",
            format!("[{index}]").cyan(),
            render::mood_label(Some(entry.mood)).bold()
        );
        render::print_theme(&entry.theme);
    }
    Ok(())
}

pub async fn save(ctx: &Context) -> Result<()> {
    match ctx.app.save_current().await? {
        SaveOutcome::Saved { index } => {
            let mood = ctx.app.display().await.mood;
            println!(
                "{} {} at [{}]",
                "Saved".green(),
                render::mood_label(mood),
                index
            );
        }
        SaveOutcome::AlreadySaved => println!("{}", Notice::AlreadySaved.message().yellow()),
    }
    Ok(())
}

pub async fn remove(ctx: &Context, index: usize) -> Result<()> {
    match ctx.app.remove_saved(index).await? {
        Some(entry) => println!(
            "{} {}",
            "Removed".green(),
            render::mood_label(Some(entry.mood))
        ),
        None => println!("{}", format!("No saved theme at [{index}].").yellow()),
    }
    Ok(())
}

pub async fn clear(ctx: &Context) -> Result<()> {
    ctx.app.clear_saved().await?;
    println!("{}", "Cleared saved themes.".green());
    Ok(())
}

pub async fn apply(ctx: &Context, index: usize) -> Result<()> {
    match ctx.app.apply_saved(index).await? {
        Some(state) => render::print_display(&state),
        None => println!("{}", format!("No saved theme at [{index}].").yellow()),
    }
    Ok(())
}

pub async fn export(ctx: &Context, out: Option<PathBuf>) -> Result<()> {
    let path = out.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
    let written = ctx.app.export_saved(&path).await?;
    println!("{} {}", "Exported to".green(), written.display());
    Ok(())
}
