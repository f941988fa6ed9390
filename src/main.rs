//! Ponyracer CLI
//!
//! Command-line client for Ponyracer:
//! - List races and show one
//! - Bet, cancel bets, boost
//! - Register, log in and out, money history
//! - Follow a race live

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ponyracer::config::generate_default_config;
use ponyracer::utils::from_now;
use ponyracer::{
    Config, Credentials, HttpGateway, LiveRaceController, LiveRaceState, LoggingConfig,
    PonyId, Race, RaceGateway, RaceId, RaceStatus, RegistrationRequest, Session, StompGateway,
};

#[derive(Parser)]
#[command(name = "ponyracer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bet on ponies and watch them race")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the usual locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List races
    Races {
        /// Race status (pending, running, finished)
        #[arg(short, long, default_value = "pending")]
        status: RaceStatus,
    },

    /// Show one race
    Race {
        id: RaceId,
    },

    /// Bet on a pony
    Bet {
        race: RaceId,
        pony: PonyId,
    },

    /// Cancel the bet on a race
    CancelBet {
        race: RaceId,
    },

    /// Boost a running pony
    Boost {
        race: RaceId,
        pony: PonyId,
    },

    /// Create an account
    Register {
        #[arg(long)]
        login: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        birth_year: i32,
    },

    /// Log in and remember the user
    Login {
        #[arg(long)]
        login: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the logged-in user
    Logout,

    /// Show the money history
    History,

    /// Follow a race live; type a pony id and Enter to click it
    Live {
        race: RaceId,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let session = Session::restore(config.session.path())?;
    let gateway = Arc::new(HttpGateway::new((&config.api).into(), session.clone())?);

    match cli.command {
        Commands::Races { status } => {
            let races = gateway.list(status).await?;
            if races.is_empty() {
                println!("No {} races", status.as_str().to_lowercase());
            }
            for race in &races {
                print_race_line(race);
            }
        }

        Commands::Race { id } => {
            let race = gateway.get(&id).await?;
            print_race(&race);
        }

        Commands::Bet { race, pony } => {
            let race = gateway.place_bet(&race, &pony).await?;
            print_race(&race);
        }

        Commands::CancelBet { race } => {
            gateway.cancel_bet(&race).await?;
            println!("Bet cancelled on race {}", race);
        }

        Commands::Boost { race, pony } => {
            gateway.boost(&race, &pony).await?;
            println!("Pony {} boosted", pony);
        }

        Commands::Register {
            login,
            password,
            birth_year,
        } => {
            let user = gateway
                .register(&RegistrationRequest {
                    login,
                    password,
                    birth_year,
                })
                .await?;
            println!("Welcome {}!", user.login);
        }

        Commands::Login { login, password } => {
            let user = gateway.authenticate(&Credentials { login, password }).await?;
            println!(
                "Logged in as {} ({} coins)",
                user.login,
                user.money.unwrap_or_default()
            );
        }

        Commands::Logout => {
            session.logout()?;
            println!("Logged out");
        }

        Commands::History => {
            let history = gateway.score_history().await?;
            println!("{:<30} {:>10}", "INSTANT", "MONEY");
            for entry in history {
                println!("{:<30} {:>10}", entry.instant.to_rfc3339(), entry.money);
            }
        }

        Commands::Live { race } => {
            let stream = Arc::new(StompGateway::new(config.stream.url.clone()));
            follow_live(LiveRaceController::new(race, gateway, stream, config.live.boost())).await?;
        }

        Commands::Config { .. } => unreachable!("handled before connecting"),
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("ponyracer={}", config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn follow_live(live: LiveRaceController) -> anyhow::Result<()> {
    live.load().await?;
    tracing::debug!(race_id = %live.race_id(), "Following race");

    let mut changes = live.watch();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let state = changes.borrow_and_update().clone();
    print_live(&state);

    if !state.is_finished() {
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = changes.borrow_and_update().clone();
                    print_live(&state);
                    if state.is_finished() {
                        break;
                    }
                }
                line = lines.next_line(), if stdin_open => {
                    match line? {
                        Some(line) if line.trim().is_empty() => {}
                        Some(line) => {
                            let pony: PonyId = line.trim().parse()?;
                            if live.select_pony(&pony).await {
                                println!(">> boost requested for pony {}", pony);
                            }
                        }
                        None => stdin_open = false,
                    }
                }
            }
        }
    }

    live.unmount();
    Ok(())
}

fn print_race_line(race: &Race) {
    let bet = race
        .bet_pony_id
        .as_ref()
        .map(|id| format!("bet on {}", id))
        .unwrap_or_default();
    println!(
        "{:<6} {:<20} {:<18} {}",
        race.id,
        race.name,
        from_now(race.start_instant, Utc::now()),
        bet
    );
}

fn print_race(race: &Race) {
    println!("{} ({})", race.name, race.status.as_str().to_lowercase());
    println!("Starts {}", from_now(race.start_instant, Utc::now()));
    for pony in &race.ponies {
        let marker = if race.bet_pony_id.as_ref() == Some(&pony.id) { "*" } else { " " };
        println!(" {} {:<4} {:<20} {}", marker, pony.id, pony.name, pony.color);
    }
}

fn print_live(state: &LiveRaceState) {
    let Some(race) = &state.race else {
        return;
    };
    println!("== {} [{}]", race.name, state.phase());
    if let (Some(message), Some(variant)) = (&state.error_message, state.error_variant()) {
        println!("[{}] {}", variant, message);
    }

    let rows = state.pony_rows();
    if rows.is_empty() && state.is_finished() {
        println!("The race is over.");
    }
    for row in rows {
        let lane = " ".repeat((row.position.clamp(0.0, 100.0) / 5.0) as usize);
        println!(
            "{}{:<4} {:<20}{}{} {:>6.1} margin {}",
            if row.selected { "*" } else { " " },
            row.pony.id,
            row.pony.name,
            lane,
            if row.boosted { ">>" } else { "" },
            row.position,
            row.margin_left
        );
    }

    if let Some(outcome) = state.outcome() {
        println!("[{}] {}", outcome.variant(), outcome.message());
    }
}
