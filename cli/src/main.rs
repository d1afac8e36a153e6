use std::io::{self, BufRead, Write};
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use pairs_core::{
    CardFace, Coord2, GameConfig, LayoutGenerator, MISMATCH_DELAY, PairLayout, PlayEngine,
    RandomLayoutGenerator, RevealOutcome,
};

#[derive(Parser, Debug)]
#[command(version, about = "Pair-matching memory game", long_about = None)]
struct Args {
    /// Board side length, even and at least 2
    #[arg(short, long, default_value_t = 4)]
    size: u8,

    /// Force a seed instead of random
    #[arg(long)]
    seed: Option<u64>,

    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Command {
    Reveal(Coord2),
    New(Option<u8>),
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    match words.next()? {
        "quit" | "q" => Some(Command::Quit),
        "new" | "n" => {
            let size = match words.next() {
                Some(word) => Some(word.parse().ok()?),
                None => None,
            };
            Some(Command::New(size))
        }
        first => {
            let row = first.parse().ok()?;
            let col = words.next()?.parse().ok()?;
            if words.next().is_some() {
                return None;
            }
            Some(Command::Reveal((row, col)))
        }
    }
}

fn deal(size: u8, seed: Option<u64>) -> Result<PairLayout> {
    let config = GameConfig::new(size).context("unplayable board size")?;
    let seed = seed.unwrap_or_else(rand::random);
    log::info!("Dealing a {size}x{size} board with seed {seed}");
    Ok(RandomLayoutGenerator::new(seed).generate(config))
}

fn render(engine: &PlayEngine) {
    print!("    ");
    for col in 0..engine.size() {
        print!("{col:>5}");
    }
    println!();

    let faces = engine.faces();
    for (row, cards) in faces.rows().into_iter().enumerate() {
        print!("{row:>3} ");
        for &face in cards {
            let cell = match face {
                CardFace::Down => ".".to_string(),
                CardFace::Up(value) => format!("({value})"),
                CardFace::Solved(value) => format!("{value}"),
            };
            print!("{cell:>5}");
        }
        println!();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let mut engine = PlayEngine::new(deal(args.size, args.seed)?);

    println!("Reveal cards with `<row> <col>`; `new [size]` redeals; `quit` exits.");
    render(&engine);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let Some(command) = parse_command(&line) else {
            println!("Commands: `<row> <col>`, `new [size]`, `quit`");
            continue;
        };

        match command {
            Command::Quit => break,
            Command::New(size) => match deal(size.unwrap_or(args.size), None) {
                Ok(layout) => {
                    engine.reset(layout);
                    render(&engine);
                }
                Err(err) => println!("{err:#}"),
            },
            Command::Reveal(coords) => match engine.reveal(coords) {
                Err(err) => println!("{err}"),
                Ok(RevealOutcome::Mismatch(token)) => {
                    render(&engine);
                    thread::sleep(MISMATCH_DELAY);
                    engine.clear_mismatch(token);
                    render(&engine);
                }
                Ok(outcome) => {
                    if outcome.has_update() {
                        render(&engine);
                    }
                    if engine.is_won() {
                        println!(
                            "Solved all {} pairs in {} seconds! `new [size]` deals again.",
                            engine.pair_count(),
                            engine.elapsed_secs()
                        );
                    }
                }
            },
        }
    }

    Ok(())
}
