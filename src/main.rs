use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser, ValueEnum};
use trackroute::cost::{EnergyPolicy, LeastTurnCost};
use trackroute::{Error, FileSource, RouteMode, Router, RouterOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
enum Mode {
    Shortest,
    LeastTurn,
    #[value(alias = "energy")]
    EnergyEfficient,
}

impl From<Mode> for RouteMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Shortest => RouteMode::Shortest,
            Mode::LeastTurn => RouteMode::LeastTurn,
            Mode::EnergyEfficient => RouteMode::EnergyEfficient,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Every meter costs the same amount of energy
    Uniform,

    /// Climbs cost extra energy, proportional to the squared elevation gain
    Climb,
}

#[derive(Parser)]
#[command(version, about)]
#[command(group(ArgGroup::new("from").required(true).args(["start", "start_near"])))]
#[command(group(ArgGroup::new("to").required(true).args(["end", "end_near"])))]
struct Cli {
    /// The path to the graph description (.json or .gpx, optionally .gz or .bz2 compressed)
    source: PathBuf,

    /// Cost model used to find the route
    #[arg(short, long, value_enum)]
    mode: Mode,

    /// Id of the start node
    #[arg(long)]
    start: Option<i64>,

    /// Start at the node closest to LAT,LON
    #[arg(long, value_name = "LAT,LON", value_parser = parse_position)]
    start_near: Option<(f64, f64)>,

    /// Id of the end node
    #[arg(long)]
    end: Option<i64>,

    /// End at the node closest to LAT,LON
    #[arg(long, value_name = "LAT,LON", value_parser = parse_position)]
    end_near: Option<(f64, f64)>,

    /// Maximum number of states expanded by the search
    #[arg(long, default_value_t = trackroute::DEFAULT_STEP_LIMIT)]
    step_limit: usize,

    /// How energy is derived from edges in the energy_efficient mode
    #[arg(long, value_enum, default_value_t = Policy::Uniform)]
    energy_policy: Policy,

    /// Energy per meter with the uniform energy policy
    #[arg(long, default_value_t = trackroute::cost::ENERGY_PENALTY_FACTOR)]
    energy_factor: f64,

    /// Weight of squared elevation gain with the climb energy policy
    #[arg(long, default_value_t = trackroute::cost::CLIMB_WEIGHT)]
    climb_weight: f64,

    /// Direction change, in degrees, above which a step counts as a turn
    #[arg(long, default_value_t = trackroute::cost::SHARP_TURN_THRESHOLD_DEG)]
    turn_threshold: f64,

    /// Extra cost of every turn in the least_turn mode
    #[arg(long, default_value_t = trackroute::cost::TURN_PENALTY)]
    turn_penalty: f64,

    /// Log more details to stderr (may be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> RouterOptions {
        RouterOptions {
            step_limit: self.step_limit,
            energy: match self.energy_policy {
                Policy::Uniform => EnergyPolicy::Uniform {
                    factor: self.energy_factor,
                },
                Policy::Climb => EnergyPolicy::ClimbSensitive {
                    weight: self.climb_weight,
                },
            },
            least_turn: LeastTurnCost {
                threshold_deg: self.turn_threshold,
                penalty: self.turn_penalty,
            },
        }
    }

    fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

fn parse_position(s: &str) -> Result<(f64, f64), String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {:?}", s))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("invalid latitude: {}", e))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("invalid longitude: {}", e))?;
    Ok((lat, lon))
}

pub fn main() -> ExitCode {
    let cli = Cli::parse();
    colog::default_builder().filter_level(cli.log_level()).init();

    match run(&cli) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            let json = serde_json::json!({
                "error": {
                    "code": e.kind().code(),
                    "message": e.to_string(),
                },
            });
            println!("{}", json);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String, Error> {
    let descriptor = cli
        .source
        .to_str()
        .ok_or_else(|| Error::Validation(format!("non UTF-8 path: {:?}", cli.source)))?;

    let router = Router::with_options(FileSource::default(), cli.options())?;

    let start = resolve_node(&router, descriptor, cli.start, cli.start_near)?;
    let end = resolve_node(&router, descriptor, cli.end, cli.end_near)?;

    let route = router.compute_route(descriptor, start, end, cli.mode.into())?;
    serde_json::to_string_pretty(&route).map_err(|e| Error::Internal(e.to_string()))
}

fn resolve_node(
    router: &Router<FileSource>,
    descriptor: &str,
    id: Option<i64>,
    near: Option<(f64, f64)>,
) -> Result<i64, Error> {
    match (id, near) {
        (Some(id), _) => Ok(id),
        (None, Some((lat, lon))) => {
            let node = router.nearest_node(descriptor, lat, lon)?;
            log::info!("snapped {}, {} to node {}", lat, lon, node.id);
            Ok(node.id)
        }
        (None, None) => Err(Error::Validation("missing node".to_string())),
    }
}
