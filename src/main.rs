mod config;
mod error;
mod identify;
mod predict;

use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::{Config, Settings};
use crate::error::SatidError;
use crate::identify::{
    parse_exposure_end, write_match, write_session_header, OutputFormat, SearchWindow,
    SeparationModel, Session, SkyTarget, TargetReader,
};

#[derive(Parser)]
#[command(name = "satid")]
#[command(about = "Identify the satellite that left a streak at a fixed RA/Dec")]
#[command(
    after_help = "If --ra and --dec are both omitted, \"ra,dec\" pairs (degrees) are read from stdin \
                  and the catalog is searched once per pair."
)]
struct Cli {
    /// Latitude of observer (degrees)
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Longitude of observer (degrees)
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,
    /// Altitude of observer (meters)
    #[arg(long, allow_negative_numbers = true)]
    alt: Option<f64>,
    /// Right ascension of the satellite track (degrees)
    #[arg(long, short = 'r', allow_negative_numbers = true)]
    ra: Option<f64>,
    /// Declination of the satellite track (degrees)
    #[arg(long, short = 'd', allow_negative_numbers = true)]
    dec: Option<f64>,
    /// Maximum angle at which results are still printed (degrees, default 1)
    #[arg(long)]
    angle: Option<f64>,
    /// Catalog in 3LE form (two-line elements with the name as line 0)
    #[arg(long)]
    tle: Option<PathBuf>,
    /// End time of exposure, e.g. "2000-01-01 12:00:00 -4" (last number is an hour offset)
    #[arg(long)]
    time: Option<String>,
    /// How far before the end time to search (default 10m)
    #[arg(long)]
    window_before: Option<String>,
    /// How far after the end time to search (default 5m)
    #[arg(long)]
    window_after: Option<String>,
    /// Geometry used to measure the separation
    #[arg(long, value_enum)]
    model: Option<SeparationModel>,
    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// YAML file with defaults for any of the above
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Command-line values take precedence over the config file.
    fn overlay(self, mut config: Config) -> Config {
        config.observer.latitude_deg = self.lat.or(config.observer.latitude_deg);
        config.observer.longitude_deg = self.lon.or(config.observer.longitude_deg);
        config.observer.altitude_m = self.alt.or(config.observer.altitude_m);
        config.target.ra_deg = self.ra.or(config.target.ra_deg);
        config.target.dec_deg = self.dec.or(config.target.dec_deg);
        config.max_angle_deg = self.angle.or(config.max_angle_deg);
        config.tle = self.tle.or(config.tle);
        config.time = self.time.or(config.time);
        config.window.before = self.window_before.or(config.window.before);
        config.window.after = self.window_after.or(config.window.after);
        config.model = self.model.or(config.model);
        config.format = self.format.or(config.format);
        config
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_usage() {
                eprintln!("Run with --help for usage");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SatidError> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let settings = cli.overlay(config).resolve()?;

    let end_of_exposure = parse_exposure_end(&settings.time)?;
    let window = settings.window.around(end_of_exposure);
    log::info!(
        "Searching {} min before to {} min after {} ({} model)",
        settings.window.before.num_minutes(),
        settings.window.after.num_minutes(),
        end_of_exposure,
        settings.model
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match settings.target {
        Some(target) => run_session(&settings, target, window, &mut out),
        None => {
            let mut count = 0;
            for target in TargetReader::new(io::stdin().lock()) {
                let target = target?;
                count += 1;
                write_session_header(&mut out, settings.format, &target)?;
                run_session(&settings, target, window, &mut out)?;
            }
            if count == 0 {
                return Err(SatidError::NoTargets);
            }
            Ok(())
        }
    }
}

fn run_session<W: Write>(
    settings: &Settings,
    target: SkyTarget,
    window: SearchWindow,
    out: &mut W,
) -> Result<(), SatidError> {
    let file = File::open(&settings.tle).map_err(|source| SatidError::Catalog {
        path: settings.tle.clone(),
        source,
    })?;

    let session = Session::new(
        settings.station,
        target,
        window,
        settings.max_angle_deg,
        settings.model,
    );

    let mut scan = session.scan(BufReader::new(file));
    for found in scan.by_ref() {
        write_match(out, settings.format, &found?)?;
    }
    out.flush()?;

    let stats = scan.stats();
    log::info!(
        "RA/Dec {:.4},{:.4}: {} candidates, {} matches, {} without minimum, {} skipped",
        target.ra_deg(),
        target.dec_deg(),
        stats.candidates,
        stats.matches,
        stats.no_minimum,
        stats.skipped
    );

    if stats.candidates == 0 {
        return Err(SatidError::EmptyCatalog(settings.tle.clone()));
    }
    Ok(())
}
