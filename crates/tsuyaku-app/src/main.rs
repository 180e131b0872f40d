use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tsuyaku_types::{Point, Rect};
use tsuyaku_ui::{InputEvent, PaneContent, Panel};

use self::controller::AppController;
use self::state::{AppState, FrameSource};

mod controller;
mod state;

#[cfg(test)]
mod tests;

#[derive(Parser, Debug)]
#[command(name = "tsuyaku", version, about = "Selection and screenshot translation overlay")]
struct Cli {
    /// JSON config file, re-read on every request (default: TSUYAKU_* environment)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Select a piece of text and translate it with DeepL and OpenAI
    Text {
        text: String,
    },
    /// Drag a region over a frame and translate it with OpenAI vision
    Screenshot(ScreenshotArgs),
}

#[derive(Args, Debug)]
struct ScreenshotArgs {
    /// PNG standing in for the visible viewport
    #[arg(long, conflicts_with = "screen")]
    image: Option<PathBuf>,

    /// Grab the primary monitor instead (requires the `screen` feature)
    #[arg(long)]
    screen: bool,

    #[arg(long)]
    x: f64,
    #[arg(long)]
    y: f64,
    #[arg(long)]
    width: f64,
    #[arg(long)]
    height: f64,

    /// Device pixel ratio of the viewport
    #[arg(long)]
    dpr: Option<f64>,
}

impl Command {
    /// Reject input the overlay would silently ignore
    fn validate(&self) -> anyhow::Result<()> {
        match self {
            Command::Text { text } if text.trim().is_empty() => {
                anyhow::bail!("Nothing to translate: the text is blank")
            }
            Command::Screenshot(args) => {
                let rect = Rect::new(args.x, args.y, args.width, args.height);
                if !rect.is_valid() {
                    anyhow::bail!("Invalid region {:?}", rect);
                }
                if args.image.is_none() && !args.screen {
                    anyhow::bail!("Pass --image <PNG> or --screen");
                }
                Ok(())
            }
            Command::Text { .. } => Ok(()),
        }
    }

    fn frame_source(&self) -> FrameSource {
        match self {
            Command::Text { .. } => FrameSource::None,
            Command::Screenshot(args) if args.screen => FrameSource::Screen,
            Command::Screenshot(args) => match &args.image {
                Some(path) => FrameSource::Image(path.clone()),
                None => FrameSource::None,
            },
        }
    }

    fn device_pixel_ratio(&self) -> f64 {
        match self {
            Command::Screenshot(ScreenshotArgs { dpr: Some(dpr), .. }) => *dpr,
            _ => 1.0,
        }
    }

    /// Input a user would produce for this command
    fn script(self) -> Vec<InputEvent> {
        match self {
            Command::Text { text } => vec![
                InputEvent::TextSelected {
                    text,
                    bounds: Rect::new(120.0, 320.0, 240.0, 20.0),
                },
                InputEvent::ActivateAffordance,
            ],
            Command::Screenshot(args) => vec![
                InputEvent::RegionDragged {
                    start: Point::new(args.x, args.y),
                    end: Point::new(args.x + args.width, args.y + args.height),
                },
                InputEvent::ActivateAffordance,
            ],
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(atty::is(atty::Stream::Stderr)).init();
    }
}

fn print_panel(panel: &Panel) {
    for pane in &panel.panes {
        println!("[{}]", pane.backend.name());
        match &pane.content {
            PaneContent::Loading => println!("(no answer)"),
            PaneContent::Text(text) | PaneContent::Markup(text) => println!("{text}"),
        }
        println!();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        // a missing .env is the normal case
        if !e.not_found() {
            eprintln!("Failed to load .env: {e}");
        }
    }

    let cli = Cli::parse();
    init_tracing(cli.log_json);
    cli.command.validate()?;

    let state = AppState::new(
        cli.config.as_deref(),
        cli.command.frame_source(),
        cli.command.device_pixel_ratio(),
    )
    .await
    .context("Failed to set up")?;

    let controller = AppController::new(state).await;
    let mut tasks = controller.spawn_tasks();

    let outcome = tokio::select! {
        panel = controller.drive(cli.command.script()) => Some(panel),
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
            None
        }
    };

    controller.shutdown().await;
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Task exited with error: {e}"),
            Err(e) => tracing::error!("Task panicked: {e}"),
        }
    }

    if let Some(panel) = outcome {
        print_panel(&panel?);
    }
    Ok(())
}
