//! glimpse — terminal front-end for the pixel-reveal data-collection game
//!
//! Drives a `SessionController` interactively: the player reveals pixels of a
//! masked digit image one at a time, updates a belief distribution over the
//! ten digit classes, writes down their reasoning, and the controller ships
//! each turn to the collection service.
//!
//! # Commands
//! - `pick <row> <col>`   — select the next pixel to reveal
//! - `w <digit> <value>`  — set one class's raw weight (renormalizes)
//! - `note <text>`        — reasoning for the pending reveal
//! - `go`                 — commit the pending turn
//! - `board` / `belief`   — show the grid / the current distribution
//! - `finish`             — open the finish gate (finish / skip / cancel)
//! - `quit`

use std::io::{self, BufRead, Write};

use clap::Parser;
use glimpse_core::{
    identity, GameSession, GlimpseConfig, HttpCollectorClient, Phase, SessionController,
    NUM_CLASSES,
};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser, Debug)]
#[command(author, version, about = "Pixel-reveal digit game client")]
struct Args {
    /// TOML config file; built-in defaults apply if the file is absent
    #[arg(short, long, default_value = "glimpse.toml")]
    config: String,

    /// Override the collection service base URL
    #[arg(long)]
    server: Option<String>,
}

// ============================================================================
// Rendering
// ============================================================================

const SHADES: &[u8] = b" .:-=+*#%@";

fn intensity_glyph(value: f32) -> char {
    let idx = (value.clamp(0.0, 1.0) * (SHADES.len() - 1) as f32).round() as usize;
    SHADES[idx] as char
}

fn print_board(session: &GameSession) {
    let side = session.grid.side();

    print!("    ");
    for col in 0..side {
        print!("{}", col % 10);
    }
    println!();

    for row in 0..side {
        print!("{:>3} ", row);
        for col in 0..side {
            let hidden = session.mask.is_hidden(row, col).unwrap_or(false);
            let glyph = if session.selected == Some((row, col)) {
                '?'
            } else if hidden {
                '·'
            } else {
                intensity_glyph(session.grid.intensity(row, col))
            };
            print!("{}", glyph);
        }
        println!();
    }
    println!(
        "turn {} | {} of {} pixels still hidden",
        session.turns(),
        session.mask.hidden_count(),
        session.grid.pixel_count()
    );
}

fn print_belief(session: &GameSession) {
    for class in 0..NUM_CLASSES {
        let weight = session.belief.weight(class);
        let bar = "#".repeat((weight * 40.0).round() as usize);
        println!("digit {}  {:>6.2}%  {}", class, weight * 100.0, bar);
    }
}

fn print_help() {
    println!("commands: pick <row> <col> | w <digit> <value> | note <text> | go");
    println!("          board | belief | finish | quit");
}

// ============================================================================
// Game loop
// ============================================================================

fn read_line(stdin: &io::Stdin) -> anyhow::Result<Option<String>> {
    print!("> ");
    io::stdout().flush()?;
    let mut line = String::new();
    if stdin.lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn show(session: Option<&GameSession>) {
    if let Some(session) = session {
        print_board(session);
    }
}

async fn finalize(controller: &mut SessionController, stdin: &io::Stdin) -> anyhow::Result<bool> {
    controller.request_finish()?;
    println!("finish = submit this game, skip = discard it, cancel = keep playing");

    loop {
        let line = match read_line(stdin)? {
            Some(line) => line,
            None => return Ok(false),
        };
        match line.as_str() {
            "finish" => match controller.confirm_finish().await {
                Ok(guess) => {
                    println!(
                        "Recorded, final guess {}. Finished games: {}. Next image:",
                        guess,
                        controller.finished_games()
                    );
                    show(controller.session());
                    return Ok(true);
                }
                // Submission failed: the session is intact, retry or cancel.
                Err(e) if controller.phase() == Phase::Finalizing => {
                    println!("! {} (still in the finish gate, try again or cancel)", e);
                }
                // The game was recorded but the next one could not start.
                Err(e) => return Err(e.into()),
            },
            "skip" => match controller.skip().await {
                Ok(()) => {
                    println!("Skipped. Next image:");
                    show(controller.session());
                    return Ok(true);
                }
                Err(e) => return Err(e.into()),
            },
            "cancel" => {
                controller.cancel_finish()?;
                return Ok(true);
            }
            _ => println!("finish, skip, or cancel"),
        }
    }
}

async fn run(mut controller: SessionController) -> anyhow::Result<()> {
    controller.start().await?;
    show(controller.session());
    print_help();

    let stdin = io::stdin();
    loop {
        let line = match read_line(&stdin)? {
            Some(line) => line,
            None => break,
        };
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, ' ');
        let command = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("").trim();

        let outcome = match command {
            "pick" => {
                let coords: Vec<usize> = rest
                    .split_whitespace()
                    .filter_map(|t| t.parse().ok())
                    .collect();
                match coords.as_slice() {
                    [row, col] => controller.select(*row, *col).map(|()| {
                        println!("pending reveal ({}, {})", row, col);
                    }),
                    _ => {
                        println!("usage: pick <row> <col>");
                        Ok(())
                    }
                }
            }
            "w" | "weight" => {
                let mut tokens = rest.split_whitespace();
                let class = tokens.next().and_then(|t| t.parse::<usize>().ok());
                let value = tokens.next().and_then(|t| t.parse::<f64>().ok());
                match (class, value) {
                    (Some(class), Some(value)) => {
                        controller.set_weight(class, value).map(|()| {
                            if let Some(session) = controller.session() {
                                print_belief(session);
                            }
                        })
                    }
                    _ => {
                        println!("usage: w <digit 0-9> <value 0-1>");
                        Ok(())
                    }
                }
            }
            "note" => controller.set_reasoning(rest),
            "go" => match controller.commit_turn().await {
                Ok(turn) => {
                    println!("turn {} committed", turn);
                    show(controller.session());
                    Ok(())
                }
                Err(e) => Err(e),
            },
            "board" => {
                show(controller.session());
                Ok(())
            }
            "belief" => {
                if let Some(session) = controller.session() {
                    print_belief(session);
                }
                Ok(())
            }
            "finish" => {
                if finalize(&mut controller, &stdin).await? {
                    Ok(())
                } else {
                    break;
                }
            }
            "quit" | "exit" => break,
            _ => {
                print_help();
                Ok(())
            }
        };

        // Rule violations are prompts, not crashes.
        if let Err(e) = outcome {
            println!("! {}", e);
        }
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let mut config = if std::path::Path::new(&args.config).exists() {
        match GlimpseConfig::load(&args.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config from {}: {}", args.config, e);
                std::process::exit(1);
            }
        }
    } else {
        GlimpseConfig::default()
    };
    if let Some(server) = args.server {
        config.collector.base_url = server;
    }

    let user_id = identity::load_or_create(&config.identity.path)?;
    tracing::debug!(user_id = %user_id, "Loaded client identity");

    let backend = HttpCollectorClient::new(&config.collector)?;
    let controller = SessionController::new(Box::new(backend), user_id);

    println!("glimpse — collection service at {}", config.collector.base_url);
    run(controller).await
}
