#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Room Crawl headlessly from a script.

mod ascii;
mod script;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use room_crawl_rendering::{Presenter, Scene, SpriteManifest};
use room_crawl_session::{Session, SessionConfig, SessionError, Snapshot};
use room_crawl_world::query;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{ascii::AsciiPresenter, script::Script};

/// Headless Room Crawl simulation driven by scripted input.
#[derive(Debug, Parser)]
#[command(name = "room-crawl", version)]
struct Args {
    /// TOML session configuration; built-in defaults when absent.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed overriding the configured one.
    #[arg(long)]
    seed: Option<u64>,
    /// Most ticks to simulate.
    #[arg(long, default_value_t = 200)]
    ticks: usize,
    /// Whitespace-separated intents, one per tick (`u d l r s . us u*3 <w+space>`).
    #[arg(long, default_value = "")]
    script: String,
    /// Sprite manifest whose asset paths are reported with `--json`.
    #[arg(long)]
    sprites: Option<PathBuf>,
    /// Print an ASCII frame after every tick.
    #[arg(long)]
    render: bool,
    /// Print the final snapshot as JSON.
    #[arg(long)]
    json: bool,
}

/// Final state printed with `--json`.
#[derive(Debug, Serialize)]
struct Report<'a> {
    snapshot: &'a Snapshot,
    halted: Option<String>,
    width: f32,
    height: f32,
    frame: Vec<FrameSprite>,
}

/// One sprite of the final frame with its asset.
#[derive(Debug, Serialize)]
struct FrameSprite {
    sprite: &'static str,
    asset: Option<PathBuf>,
    x: f32,
    y: f32,
    rotation: f32,
}

/// Entry point for the Room Crawl command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("room_crawl=info".parse()?))
        .init();

    let args = Args::parse();
    let stdout = io::stdout();
    run(&args, stdout.lock())
}

fn run(args: &Args, out: impl Write) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let script = Script::parse(&args.script).context("invalid --script")?;
    let sprites = match &args.sprites {
        Some(path) => SpriteManifest::load(path)?,
        None => SpriteManifest::default(),
    };

    let mut session = Session::new(&config).context("failed to start session")?;
    info!(
        seed = session.seed(),
        scripted = script.len(),
        ticks = args.ticks,
        "running"
    );

    let mut presenter = AsciiPresenter::new(out);
    for tick in 0..args.ticks {
        match session.step(script.intent(tick)) {
            Ok(_) => {}
            Err(SessionError::Halted(_)) => break,
            Err(error) => return Err(error).context("tick failed"),
        }
        if args.render {
            writeln!(presenter.writer(), "tick {}", session.ticks())?;
            presenter.present(&scene(&session)?)?;
        }
        if !session.is_running() {
            break;
        }
    }

    let snapshot = session.snapshot();
    info!(
        ticks = snapshot.tick,
        level = ?snapshot.room.map(|room| room.level.get()),
        halted = ?session.halt_reason(),
        "finished"
    );

    if args.json {
        let scene = scene(&session)?;
        let frame = scene
            .sprites
            .iter()
            .map(|sprite| FrameSprite {
                sprite: sprite.key.name(),
                asset: sprites.path(sprite.key).map(PathBuf::from),
                x: sprite.position.x,
                y: sprite.position.y,
                rotation: sprite.rotation_degrees,
            })
            .collect();
        let report = Report {
            snapshot: &snapshot,
            halted: session.halt_reason().map(|reason| reason.to_string()),
            width: scene.grid.width(),
            height: scene.grid.height(),
            frame,
        };
        let writer = presenter.writer();
        serde_json::to_writer_pretty(&mut *writer, &report)
            .context("failed to serialise snapshot")?;
        writeln!(writer)?;
    }
    Ok(())
}

fn scene(session: &Session) -> Result<Scene> {
    let world = session.world();
    let grid = query::grid(world).context("no room has been entered")?;
    Ok(Scene::from_view(grid, &query::actor_view(world))?)
}
