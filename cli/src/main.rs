use anyhow::Context;
use arena::api::{
    resolve_bracket, simulate_battle, simulate_battle_many, simulate_gauntlet, BattleConfig,
};
use arena::config::load_config;
use arena::content::{builtin_roster, builtin_rosters};
use arena::CombatTuning;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// Where the fighters come from. A roster file beats a built-in id.
#[derive(Args)]
struct RosterArgs {
    /// Built-in roster id
    #[arg(long, default_value = "even_match")]
    roster: String,
    /// Roster file (JSON or YAML)
    #[arg(long)]
    roster_file: Option<PathBuf>,
    /// RNG seed for determinism
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run one battle between the roster's first two fighters
    Battle {
        #[command(flatten)]
        roster: RosterArgs,
        /// Print the full report as JSON instead of the battle log
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run many battles and report win rates
    Simulate {
        #[command(flatten)]
        roster: RosterArgs,
        /// Number of battles
        #[arg(long, default_value_t = 1000)]
        samples: u32,
    },
    /// Winner stays on: run the whole roster through one arena
    Gauntlet {
        #[command(flatten)]
        roster: RosterArgs,
        /// Print the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Settle a single-elimination bracket on power alone
    Bracket {
        #[command(flatten)]
        roster: RosterArgs,
    },
    /// Serialize a built-in roster to JSON (stdout)
    RosterDump {
        /// Built-in roster id
        #[arg(long, default_value = "even_match")]
        id: String,
        /// Pretty-print JSON
        #[arg(long, default_value_t = true)]
        pretty: bool,
    },
    /// Print the combat tuning (defaults, or from --config)
    Tuning,
}

#[derive(Parser)]
#[command(name = "arena")]
#[command(about = "Arena combat simulator")]
struct Cli {
    /// Arena config file (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

fn battle_config(roster: RosterArgs, config: &Option<PathBuf>) -> BattleConfig {
    let path_string = |p: &PathBuf| p.to_string_lossy().into_owned();
    let cfg = BattleConfig {
        roster_path: roster.roster_file.as_ref().map(path_string),
        roster_id: Some(roster.roster),
        config_path: config.as_ref().map(path_string),
        seed: roster.seed,
        ..BattleConfig::default()
    };
    debug!(?cfg, "resolved battle config");
    cfg
}

fn main() -> anyhow::Result<()> {
    arena::logging::init("warn");
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Battle { roster, json } => {
            let report = simulate_battle(battle_config(roster, &cli.config))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for line in &report.log {
                    println!("{}", line);
                }
            }
        }
        Cmd::Simulate { roster, samples } => {
            let stats = simulate_battle_many(battle_config(roster, &cli.config), samples)?;
            let [first, second] = [&stats.fighters[0], &stats.fighters[1]];
            println!("roster:             {}", stats.roster);
            println!("battles:            {}", stats.samples);
            println!("first:              {} (power {})", first.name, first.power);
            println!("second:             {} (power {})", second.name, second.power);
            println!();
            println!(
                "win rate:           {:.1}% / {:.1}%",
                stats.first_win_rate() * 100.0,
                (1.0 - stats.first_win_rate()) * 100.0
            );
            println!("exchange odds:      {:.1}%", stats.exchange_odds * 100.0);
            println!("avg exchanges:      {:.2}", stats.avg_exchanges);
            println!("avg battle length:  {:.2} s", stats.avg_elapsed_ms / 1000.0);
        }
        Cmd::Gauntlet { roster, json } => {
            let report = simulate_gauntlet(battle_config(roster, &cli.config))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for round in &report.rounds {
                    println!(
                        "round {}: {} vs {} -> {} ({} hp left, {} exchanges)",
                        round.round,
                        round.champion,
                        round.challenger,
                        round.winner,
                        round.winner_hp,
                        round.exchanges
                    );
                }
                let s = report.champion_stats;
                println!(
                    "champion: {} (ATK {} DEF {} AGI {}, power {})",
                    report.champion_name,
                    s.attack,
                    s.defense,
                    s.agility,
                    s.power()
                );
            }
        }
        Cmd::Bracket { roster } => {
            let report = resolve_bracket(battle_config(roster, &cli.config))?;
            let name = |i: usize| report.entrants[i].name.as_str();
            for (n, round) in report.rounds.iter().enumerate() {
                println!("round {}", n + 1);
                for m in round {
                    match m.away {
                        Some(away) => println!("  {} vs {} -> {}", name(m.home), name(away), name(m.winner)),
                        None => println!("  {} (bye)", name(m.home)),
                    }
                }
            }
            println!(
                "champion: {} (power {})",
                report.champion.name, report.champion.power
            );
        }
        Cmd::RosterDump { id, pretty } => {
            let roster = builtin_roster(&id).with_context(|| {
                let known: Vec<&str> = builtin_rosters().keys().copied().collect();
                format!("roster '{}' not found; known rosters: {}", id, known.join(", "))
            })?;
            if pretty {
                println!("{}", serde_json::to_string_pretty(&roster)?);
            } else {
                println!("{}", serde_json::to_string(&roster)?);
            }
        }
        Cmd::Tuning => {
            let tuning = match cli.config.as_ref() {
                Some(path) => load_config(path)?.tuning,
                None => CombatTuning::default(),
            };
            println!("{}", tuning);
        }
    }
    Ok(())
}
