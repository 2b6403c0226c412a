// Copyright (c) 2024 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::SystemTime;

use canonical_error::{invalid_argument_error, CanonicalError};
use clap::Parser;
use log::{error, info};
use tracing_appender::non_blocking::NonBlockingBuilder;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, registry, EnvFilter};

use telescope_planner::constraints::{parse_time, SessionConstraints,
                                     SESSION_OPTIONS};
use telescope_planner::ephemeris::AstroPositionProvider;
use telescope_planner::location::{Location, LocationSource};
use telescope_planner::ongc_catalog::OngcCatalog;
use telescope_planner::session::Session;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about=None)]
struct Args {
    /// Observer latitude, degrees (north positive). Together with --long this
    /// overrides the default location.
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Observer longitude, degrees (east positive).
    #[arg(long, allow_hyphen_values = true)]
    long: Option<f64>,

    /// Observer altitude, meters.
    #[arg(long)]
    alt: Option<f64>,

    /// OpenNGC catalog file (semicolon separated CSV).
    #[arg(long, default_value = "NGC.csv")]
    catalog: String,

    /// Evaluation instant, RFC 3339. Defaults to now.
    #[arg(long)]
    at: Option<String>,

    /// Session option as name=value; may be repeated. See --list_options.
    #[arg(short, long = "option")]
    options: Vec<String>,

    /// Print the recognized session options and exit.
    #[arg(long)]
    list_options: bool,

    /// Report geometric rather than refracted altitudes.
    #[arg(long)]
    no_refraction: bool,

    /// Also list objects that are down now but rise during the session.
    #[arg(long)]
    rising: bool,

    /// Directory for the log file. No log file is written unless --log_file
    /// is given.
    #[arg(long, default_value = ".")]
    log_dir: String,

    #[arg(long)]
    log_file: Option<String>,
}

fn parse_options(options: &[String])
                 -> Result<SessionConstraints, CanonicalError> {
    let mut pairs = Vec::<(&str, &str)>::new();
    for option in options {
        let Some((name, value)) = option.split_once('=') else {
            return Err(invalid_argument_error(
                format!("Expected name=value, got {:?}", option).as_str(),
            ));
        };
        pairs.push((name.trim(), value));
    }
    SessionConstraints::from_options(pairs)
}

fn user_location(args: &Args) -> Result<Option<(Location, LocationSource)>,
                                        CanonicalError> {
    match (args.lat, args.long) {
        (Some(lat), Some(long)) => {
            if !(-90.0..=90.0).contains(&lat)
                || !(-180.0..=180.0).contains(&long)
            {
                return Err(invalid_argument_error(
                    format!("Invalid coordinates {} {}", lat, long).as_str(),
                ));
            }
            Ok(Some((Location::new(lat, long, args.alt),
                     LocationSource::UserSupplied)))
        }
        (None, None) => Ok(None),
        _ => Err(invalid_argument_error(
            "--lat and --long must be given together",
        )),
    }
}

fn run(args: &Args) -> Result<(), CanonicalError> {
    let constraints = parse_options(&args.options)?;
    let location = user_location(args)?;
    let now = match &args.at {
        Some(at) => parse_time(at)?,
        None => SystemTime::now(),
    };
    let position_provider = if args.no_refraction {
        AstroPositionProvider::without_refraction()
    } else {
        AstroPositionProvider::new()
    };
    let catalog = OngcCatalog::from_path(&args.catalog)?;

    let span = tracing::info_span!("session", catalog = %args.catalog);
    let _enter = span.enter();
    let session = Session::build(constraints, location, now,
                                 Arc::new(position_provider),
                                 Arc::new(catalog))?;
    print!("{}", session.report());

    if args.rising {
        let sets = [session.solar_objects(), session.deepspace_objects()];
        for observer in sets.iter().flat_map(|set| set.not_visible()) {
            if session.will_be_up(observer)? {
                println!("Rises during session: {}", observer);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if args.list_options {
        for (name, help) in SESSION_OPTIONS {
            println!("  {:<18} {}", name, help);
        }
        return ExitCode::SUCCESS;
    }

    // Set up logging.
    let (non_blocking_stdout, _guard1) = NonBlockingBuilder::default()
        .lossy(false)
        .finish(std::io::stdout());
    let mut _guard2 = None;
    let file_layer = args.log_file.as_ref().map(|log_file| {
        let file_appender =
            tracing_appender::rolling::never(&args.log_dir, log_file);
        let (non_blocking_file, guard) = NonBlockingBuilder::default()
            .lossy(false)
            .finish(file_appender);
        _guard2 = Some(guard);
        fmt::layer().with_ansi(false).with_writer(non_blocking_file)
    });
    registry()
        .with(EnvFilter::try_from_default_env()
              .unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(non_blocking_stdout))
        .with(file_layer)
        .init();

    info!("Using catalog {:?}", args.catalog);
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:?}: {}", e.code, e.message);
            ExitCode::FAILURE
        }
    }
}
