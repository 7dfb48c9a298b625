use arena::config::{load_config, Format};
use arena::content::parse_roster;
use arena::{
    win_probability, ArenaConfig, BattleManager, Combatant, CombatantId, Dice, FixedTicker, Side,
    StatSource,
};
use clap::Parser;
use encoding_rs::Encoding;
use std::{fs, path::PathBuf};

#[derive(Parser)]
#[command(name = "win-rates")]
#[command(about = "Monte Carlo sim: many battles between two point budgets")]
struct Args {
    /// Stat points of the first fighter
    #[arg(long, default_value_t = 50)]
    first: u32,

    /// Stat points of the second fighter
    #[arg(long, default_value_t = 50)]
    second: u32,

    /// Optional roster file (JSON or YAML); its first two fighters replace --first/--second
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Optional arena config file (JSON or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,
}

fn read_text_auto(path: &std::path::Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn read_sources(args: &Args) -> anyhow::Result<[StatSource; 2]> {
    let Some(path) = args.roster.as_ref() else {
        return Ok([
            StatSource::new("First", args.first),
            StatSource::new("Second", args.second),
        ]);
    };
    let text = read_text_auto(path)?;
    let roster = parse_roster(&text, Format::from_path(path))?;
    let mut fighters = roster.fighters.into_iter();
    match (fighters.next(), fighters.next()) {
        (Some(a), Some(b)) => Ok([a, b]),
        _ => anyhow::bail!("roster '{}' needs at least two fighters", roster.name),
    }
}

fn median(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let m = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[m]
    } else {
        (sorted[m - 1] + sorted[m]) / 2.0
    }
}

fn main() -> anyhow::Result<()> {
    arena::logging::init("warn");
    let args = Args::parse();

    let cfg = match args.config.as_ref() {
        Some(path) => load_config(path)?,
        None => ArenaConfig::default(),
    };
    let sources = read_sources(&args)?;

    let mut first_wins = 0u32;
    let mut exchanges_total = 0u64;
    let mut lengths: Vec<f64> = Vec::with_capacity(args.trials as usize);

    for i in 0..args.trials {
        let trial_seed = args.seed.wrapping_add(i as u64);
        let mut dice = Dice::from_seed(trial_seed);
        let fighters = sources
            .iter()
            .enumerate()
            .map(|(slot, source)| {
                Combatant::new(CombatantId::slot(slot), source, cfg.tuning, cfg.weights, &mut dice)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut manager = BattleManager::new(fighters, dice)?.with_config(&cfg);
        manager.setup_positions();
        let mut ticker = FixedTicker::new(cfg.tick_ms);
        let outcome = manager.battle(&mut ticker)?;

        if outcome.winner == Side::First {
            first_wins += 1;
        }
        exchanges_total += u64::from(outcome.exchanges);
        lengths.push(outcome.elapsed_ms);
    }

    lengths.sort_unstable_by(f64::total_cmp);
    let trials_f = f64::from(args.trials.max(1));
    let win_rate = f64::from(first_wins) / trials_f;
    let exchange_odds = win_probability(f64::from(sources[0].points), f64::from(sources[1].points));
    let avg_exchanges = exchanges_total as f64 / trials_f;
    let avg_length = lengths.iter().sum::<f64>() / trials_f;

    println!("win-rates results");
    println!("-----------------");
    println!("trials:             {}", args.trials);
    println!("first:              {} ({} points)", sources[0].name, sources[0].points);
    println!("second:             {} ({} points)", sources[1].name, sources[1].points);
    println!();
    println!("first win rate:     {:.1}%", win_rate * 100.0);
    println!("exchange odds:      {:.1}%", exchange_odds * 100.0);
    println!("avg exchanges:      {:.2}", avg_exchanges);
    println!("avg battle length:  {:.2} s", avg_length / 1000.0);
    println!("median length:      {:.2} s", median(&lengths) / 1000.0);

    Ok(())
}
