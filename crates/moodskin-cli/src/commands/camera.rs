use anyhow::Result;
use colored::Colorize;
use moodskin_application::{SampleEvent, SampleOutcome};
use moodskin_core::Notice;
use tokio::sync::mpsc;

use super::context::Context;
use super::render;

fn print_outcome(outcome: &SampleOutcome) {
    match outcome {
        SampleOutcome::Applied(state) => render::print_display(state),
        SampleOutcome::NoFace => println!("{}", "No face detected.".dimmed()),
    }
}

fn print_failure(notice: Notice) {
    println!("{}", notice.message().red());
}

/// Samples the camera once, `ticks` times, or until Ctrl-C.
pub async fn run(ctx: &Context, ticks: Option<u64>, once: bool) -> Result<()> {
    ctx.app.start_camera().await?;

    if once {
        let result = ctx.app.sample_camera().await;
        ctx.app.stop_camera().await;
        print_outcome(&result?);
        return Ok(());
    }

    tracing::info!(
        interval_ms = ctx.config.camera.interval_ms,
        ticks = ?ticks,
        "Sampling camera; press Ctrl-C to stop"
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let sampler = ctx.app.spawn_camera_sampler(ticks, Some(tx))?;

    let token = sampler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    while let Some(event) = rx.recv().await {
        match event {
            SampleEvent::Sampled(outcome) => print_outcome(&outcome),
            SampleEvent::Failed(notice) => print_failure(notice),
        }
    }

    let samples = sampler.join().await;
    ctx.app.remember_display().await?;
    println!("{}", format!("Camera stopped after {samples} sample(s).").dimmed());
    Ok(())
}
