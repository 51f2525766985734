mod canvas;
mod config;
mod controls;
mod render;
mod svg;

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use formats::boundary::BoundaryCollection;
use formats::rainfall::{RainfallSchema, RainfallTable};
use formats::source::{load_boundaries, load_rainfall, LoadError};
use foundation::math::Viewport;
use foundation::time::Month;
use runtime::frame::Frame;
use scene::Controller;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Args, Command};
use crate::controls::{spawn_stdin_reader, ControlCommand};
use crate::render::draw_frame;
use crate::svg::SvgCanvas;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let schema = args.rainfall_schema()?;
    let config = args.controller_config().await?;
    let controller = Controller::new(config, Viewport::new(args.width, args.height));
    let client = reqwest::Client::new();

    match args.command.clone().unwrap_or_default() {
        Command::Run {
            out_dir,
            fps,
            max_frames,
        } => run(&args, &client, schema, controller, &out_dir, fps, max_frames).await,
        Command::Snapshot { out, year, month } => {
            snapshot(&args, &client, &schema, controller, &out, year, month.as_deref()).await
        }
    }
}

/// Spawns one load; the result arrives on the returned channel.
fn spawn_load<T, F>(fut: F) -> oneshot::Receiver<Result<T, LoadError>>
where
    T: Send + 'static,
    F: std::future::Future<Output = Result<T, LoadError>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = tx.send(fut.await);
    });
    rx
}

/// Non-blocking check of a pending load. `None` while still running.
fn poll_load<T>(
    pending: &mut Option<oneshot::Receiver<Result<T, LoadError>>>,
    what: &str,
) -> Option<Result<T, LoadError>> {
    let rx = pending.as_mut()?;
    match rx.try_recv() {
        Ok(result) => {
            *pending = None;
            Some(result)
        }
        Err(oneshot::error::TryRecvError::Empty) => None,
        Err(oneshot::error::TryRecvError::Closed) => {
            *pending = None;
            error!(what, "load task ended without a result");
            None
        }
    }
}

async fn run(
    args: &Args,
    client: &reqwest::Client,
    schema: RainfallSchema,
    mut controller: Controller,
    out_dir: &Path,
    fps: f64,
    max_frames: u64,
) -> Result<()> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut boundaries = {
        let (client, location) = (client.clone(), args.boundaries.clone());
        Some(spawn_load(async move { load_boundaries(&client, &location).await }))
    };
    let mut rainfall = {
        let (client, location) = (client.clone(), args.rainfall.clone());
        Some(spawn_load(async move { load_rainfall(&client, &location, &schema).await }))
    };

    let (tx, mut commands) = mpsc::unbounded_channel();
    let _stdin = spawn_stdin_reader(tx).context("starting stdin reader")?;

    let mut frame = Frame::first_at_fps(fps);
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(frame.dt_s));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut drawn_revision = None;
    let mut written = 0u64;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    info!(out_dir = %out_dir.display(), fps, "render loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
        }

        if let Some(result) = poll_load(&mut boundaries, "boundaries") {
            controller.on_boundaries(result);
        }
        if let Some(result) = poll_load(&mut rainfall, "rainfall") {
            controller.on_rainfall(result);
        }

        let mut quit = false;
        while let Ok(cmd) = commands.try_recv() {
            match cmd {
                ControlCommand::Year(year) => {
                    controller.select_year(year);
                }
                ControlCommand::Month(month) => controller.jump_to_month(month),
                ControlCommand::Resize { width, height } => controller.resize(width, height),
                ControlCommand::Pause(paused) => controller.set_paused(paused),
                ControlCommand::Quit => quit = true,
            }
        }
        if quit {
            info!("quit requested");
            break;
        }

        controller.tick(frame);

        if drawn_revision != Some(controller.revision()) {
            let path = out_dir.join(format!("frame-{:05}.svg", frame.index));
            write_svg(&path, draw_frame(&controller, SvgCanvas::new())).await?;
            drawn_revision = Some(controller.revision());
            written += 1;
        }

        frame = frame.next();
        if max_frames > 0 && frame.index >= max_frames {
            break;
        }
    }

    if !controller.tally().is_empty() {
        info!(misses = %controller.tally(), "unmatched regions");
    }
    info!(frames = frame.index, written, "render loop finished");
    Ok(())
}

async fn snapshot(
    args: &Args,
    client: &reqwest::Client,
    schema: &RainfallSchema,
    mut controller: Controller,
    out: &Path,
    year: Option<i32>,
    month: Option<&str>,
) -> Result<()> {
    let month = month
        .map(|m| Month::from_label(m).with_context(|| format!("unknown month {m:?}")))
        .transpose()?;

    let (boundaries, rainfall): (
        Result<BoundaryCollection, LoadError>,
        Result<RainfallTable, LoadError>,
    ) = tokio::join!(
        load_boundaries(client, &args.boundaries),
        load_rainfall(client, &args.rainfall, schema),
    );
    let rainfall_failed = rainfall.is_err();
    controller.on_boundaries(boundaries);
    controller.on_rainfall(rainfall);
    if rainfall_failed {
        warn!("rainfall unavailable; snapshot shows boundaries only");
    }

    if let Some(year) = year {
        if !controller.select_year(year) {
            bail!("year {year} is not in {}", args.rainfall);
        }
    }
    if let Some(month) = month {
        controller.jump_to_month(month);
    }

    write_svg(out, draw_frame(&controller, SvgCanvas::new())).await?;
    info!(
        out = %out.display(),
        regions = controller.ferns().len(),
        misses = %controller.tally(),
        "snapshot written"
    );
    Ok(())
}

async fn write_svg(path: &Path, svg: String) -> Result<()> {
    tokio::fs::write(path, svg)
        .await
        .with_context(|| format!("writing {}", path.display()))
}
