use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use tessera_grid::Viewport;

mod dump;
mod session;
mod worldgen;

use session::{Assets, Session, SessionConfig};

#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(about = "Resolve tile blend variants over a generated world and report what the render passes did")]
struct Args {
    /// Directory holding tiles.toml, worldgen.toml and blend/*.toml
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// World width in cells
    #[arg(short = 'W', long, default_value = "400")]
    width: usize,

    /// World height in cells
    #[arg(short = 'H', long, default_value = "200")]
    height: usize,

    /// World seed (random if not given)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Visible region as X,Y,W,H
    #[arg(long, value_parser = parse_view, default_value = "100,40,120,68")]
    view: Viewport,

    /// Render passes to run while edits stream in
    #[arg(long, default_value = "3")]
    passes: usize,

    /// Random edits submitted by a background producer
    #[arg(long, default_value = "0")]
    edits: usize,

    /// Print an ASCII map of the view after the last pass
    #[arg(long)]
    dump: bool,

    /// Also write debug-level logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Rows a tree or cactus scan may walk down its column
    #[arg(long, default_value = "100")]
    scan_limit: usize,
}

fn parse_view(s: &str) -> Result<Viewport, String> {
    let parts: Vec<i32> = s
        .split(',')
        .map(|p| p.trim().parse::<i32>().map_err(|e| format!("`{p}`: {e}")))
        .collect::<Result<_, _>>()?;
    match parts[..] {
        [x, y, w, h] if w > 0 && h > 0 => Ok(Viewport::new(x, y, w, h)),
        [_, _, _, _] => Err("view width and height must be positive".into()),
        _ => Err(format!("expected X,Y,W,H, got `{s}`")),
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match log_file {
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        }
        Some(path) => {
            CombinedLogger::init(vec![
                TermLogger::new(LevelFilter::Info, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
                WriteLogger::new(LevelFilter::Debug, Config::default(), File::create(path)?),
            ])?;
        }
    }
    Ok(())
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let assets = Assets::load(&args.assets)?;
    let cfg = SessionConfig {
        width: args.width,
        height: args.height,
        seed,
        view: args.view,
        scan_limit: args.scan_limit,
    };
    log::info!("seed {seed}, world {}x{}, view {:?}", cfg.width, cfg.height, cfg.view);
    let mut session = Session::new(&assets, &cfg);
    let report = session.run(args.passes, args.edits, seed);

    let last = report.last.stats;
    log::info!(
        "{} pass(es); last pass drew {} wall(s) and {} tile(s): {} cached, {} validated, {} computed, {} provisional",
        report.passes.len(),
        last.walls_drawn,
        last.tiles_drawn,
        last.cached,
        last.validated,
        last.computed,
        last.provisional
    );
    match report.settled_after {
        Some(n) => log::info!("view settled {n} pass(es) after the last edit"),
        None => log::warn!(
            "{} visible cell(s) still unresolved after {} settle pass(es)",
            report.unresolved_visible,
            Session::SETTLE_PASSES
        ),
    }

    if args.dump {
        let stdout = std::io::stdout();
        dump::write_dump(&mut stdout.lock(), session.registry(), session.grid(), session.view())?;
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = init_logging(args.log_file.as_deref()) {
        eprintln!("logging setup failed: {e}");
    }
    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
