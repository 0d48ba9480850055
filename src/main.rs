use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use drawing::doc::{CodecError, decode_measurements, encode_measurements};
use drawing::{Action, DrawError, DrawingEngine, Measurement};
use fieldmap::config::AppConfig;
use fieldmap::services::boundary::{BoundaryError, BoundaryMonitor};
use fieldmap::services::trail::{BreadcrumbTrail, DEFAULT_MACHINE_WIDTH_FT};
use fieldmap::state::{AppState, StateError};
use geometry::units::{AreaUnit, DistanceUnit};
use geometry::{Coordinate, area, perimeter};
use serde_json::{Value, json};
use tiles::{CancelToken, DownloadError, DownloadEvent, DownloadQuality, DownloadRegion, TileKey};
use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error("drawing rejected input: {0}")]
    Draw(#[from] DrawError),
    #[error(transparent)]
    Boundary(#[from] BoundaryError),
    #[error("measurement file: {0}")]
    Codec(#[from] CodecError),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("coordinate {index} is out of range")]
    InvalidCoordinate { index: usize },
    #[error("tile {0} is outside the valid range")]
    InvalidTile(TileKey),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("progress task failed: {0}")]
    Task(String),
}

#[derive(Parser, Debug)]
#[command(name = "fieldmap", about = "Field measurement, boundary, and offline tile tools")]
struct Cli {
    #[arg(long, env = "TILE_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch every tile covering a circle into the cache.
    Download(DownloadArgs),
    /// Read one tile through the cache and write it to a file.
    Tile(TileArgs),
    /// Inspect or empty the tile cache.
    Cache(CacheCommand),
    /// Measure a JSON list of coordinates.
    Measure(MeasureArgs),
    /// List saved measurements, most recent first.
    List { store: PathBuf },
    /// Distance and zone from a position to a boundary polygon.
    Proximity(ProximityArgs),
    /// Area swept by an implement along a recorded track.
    Coverage(CoverageArgs),
}

#[derive(Args, Debug)]
struct DownloadArgs {
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    #[arg(long, help = "Radius in meters")]
    radius: f64,

    #[arg(long = "zoom", help = "Explicit zoom level; repeat for several")]
    zooms: Vec<u8>,

    #[arg(long, default_value = "standard", conflicts_with = "zooms")]
    quality: DownloadQuality,

    #[arg(long, default_value_t = false, help = "Print the estimate and exit")]
    estimate_only: bool,
}

#[derive(Args, Debug)]
struct TileArgs {
    z: u8,
    x: u32,
    y: u32,

    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct CacheCommand {
    #[command(subcommand)]
    command: CacheSubcommand,
}

#[derive(Subcommand, Debug)]
enum CacheSubcommand {
    Size,
    Clear,
}

#[derive(Args, Debug)]
struct MeasureArgs {
    #[arg(help = "JSON array of {latitude, longitude}")]
    path: PathBuf,

    #[arg(long, help = "Measurement file to append the result to")]
    store: Option<PathBuf>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct ProximityArgs {
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    boundary: PathBuf,
}

#[derive(Args, Debug)]
struct CoverageArgs {
    track: PathBuf,

    #[arg(long, default_value_t = DEFAULT_MACHINE_WIDTH_FT)]
    width_ft: f64,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = dir;
    }

    match cli.command {
        Command::Download(args) => run_download(config, args).await,
        Command::Tile(args) => run_tile(config, args).await,
        Command::Cache(cmd) => run_cache(config, cmd.command),
        Command::Measure(args) => run_measure(config, args),
        Command::List { store } => run_list(&store),
        Command::Proximity(args) => run_proximity(config, args),
        Command::Coverage(args) => run_coverage(args),
    }
}

async fn run_download(config: AppConfig, args: DownloadArgs) -> Result<(), CliError> {
    let center = Coordinate::new(args.lat, args.lon);
    let region = if args.zooms.is_empty() {
        DownloadRegion::with_quality(center, args.radius, args.quality)
    } else {
        DownloadRegion::new(center, args.radius, args.zooms)
    };
    region.validate().map_err(DownloadError::InvalidRegion)?;

    if args.estimate_only {
        return print_json(&json!({
            "tiles": region.estimate_tile_count(),
            "bytes": region.estimate_bytes(),
            "zoom_levels": region.zoom_levels,
        }));
    }

    let state = AppState::open(config)?;
    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("interrupted; cancelling download");
            on_interrupt.cancel();
        }
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        let mut last_tenth = None;
        while let Some(event) = rx.recv().await {
            if let DownloadEvent::Progress { completed, total } = event {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let tenth = (event.fraction() * 10.0) as u8;
                if last_tenth != Some(tenth) || completed == total {
                    eprintln!("downloaded {completed}/{total} tiles");
                    last_tenth = Some(tenth);
                }
            }
        }
    });

    let report = state.downloader.download(&region, tx, cancel).await?;
    printer.await.map_err(|e| CliError::Task(e.to_string()))?;
    print_json(&serde_json::to_value(&report)?)
}

async fn run_tile(config: AppConfig, args: TileArgs) -> Result<(), CliError> {
    let key = TileKey::new(args.z, args.x, args.y);
    if !key.is_valid() {
        return Err(CliError::InvalidTile(key));
    }

    let state = AppState::open(config)?;
    let bytes = state.downloader.load_tile(key).await?;
    std::fs::write(&args.out, &bytes).map_err(|source| CliError::Io { path: args.out.clone(), source })?;
    print_json(&json!({ "tile": key.to_string(), "bytes": bytes.len(), "out": args.out }))
}

fn run_cache(config: AppConfig, command: CacheSubcommand) -> Result<(), CliError> {
    let state = AppState::open(config)?;
    let cache = &state.cache;
    match command {
        CacheSubcommand::Size => print_json(&json!({
            "dir": cache.dir(),
            "tiles": cache.len(),
            "bytes": cache.current_size(),
            "budget_bytes": cache.config().budget_bytes,
        })),
        CacheSubcommand::Clear => {
            let tiles = cache.len();
            cache.clear();
            print_json(&json!({ "cleared_tiles": tiles }))
        }
    }
}

fn run_measure(config: AppConfig, args: MeasureArgs) -> Result<(), CliError> {
    let points = read_coordinates(&args.path)?;

    let mut engine = DrawingEngine::with_config(config.drawing);
    if let Some(store) = &args.store {
        if store.exists() {
            engine.load_snapshot(decode_measurements(&read_text(store)?)?);
        }
    }

    engine.start_measuring()?;
    for point in points {
        engine.add_point(point)?;
    }
    let Some(mut measurement) = engine.commit()?.into_iter().find_map(|action| match action {
        Action::MeasurementCommitted(m) => Some(m),
        _ => None,
    }) else {
        return Err(DrawError::NothingToCommit.into());
    };

    if let Some(name) = &args.name {
        measurement = measurement.renamed(name.as_str());
    }
    if let Some(notes) = &args.notes {
        measurement = measurement.with_notes(notes.as_str());
    }
    engine.apply_update(measurement.clone());

    if let Some(store) = &args.store {
        let encoded = encode_measurements(&engine.store.to_snapshot())?;
        std::fs::write(store, encoded).map_err(|source| CliError::Io { path: store.clone(), source })?;
    }

    let summary = measurement_summary(&measurement);
    print_json(&json!({ "measurement": measurement, "summary": summary }))
}

fn run_list(store: &Path) -> Result<(), CliError> {
    let mut engine = DrawingEngine::new();
    engine.load_snapshot(decode_measurements(&read_text(store)?)?);
    let rows: Vec<Value> = engine.store.sorted_by_recent().into_iter().map(measurement_summary).collect();
    print_json(&Value::Array(rows))
}

fn run_proximity(config: AppConfig, args: ProximityArgs) -> Result<(), CliError> {
    let position = Coordinate::new(args.lat, args.lon);
    if !position.is_valid() {
        return Err(CliError::InvalidCoordinate { index: 0 });
    }

    let boundary = read_coordinates(&args.boundary)?;
    let mut monitor = BoundaryMonitor::new(config.zones);
    let boundary_acres = area(&boundary);
    let boundary_perimeter = perimeter(&boundary, true);
    monitor.arm(boundary)?;

    let Some(reading) = monitor.evaluate(position) else {
        return Err(CliError::InvalidCoordinate { index: 0 });
    };
    print_json(&json!({
        "distance_feet": reading.distance_feet,
        "zone": reading.zone,
        "haptic": reading.haptic,
        "message": reading.message(),
        "boundary_acres": boundary_acres,
        "boundary_perimeter_feet": boundary_perimeter,
    }))
}

fn run_coverage(args: CoverageArgs) -> Result<(), CliError> {
    let mut trail = BreadcrumbTrail::new();
    for point in read_coordinates(&args.track)? {
        trail.record(point);
    }
    print_json(&json!({
        "points": trail.len(),
        "length_feet": trail.length_feet(),
        "width_feet": args.width_ft,
        "coverage_acres": trail.coverage_acres(args.width_ft),
    }))
}

fn measurement_summary(m: &Measurement) -> Value {
    json!({
        "id": m.id,
        "name": m.name,
        "kind": m.kind,
        "value": m.formatted_value(DistanceUnit::default(), AreaUnit::default()),
        "service_package": m.service_package,
        "estimate": m.estimate(),
        "created_at": m.created_at,
    })
}

fn read_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io { path: path.to_path_buf(), source })
}

fn read_coordinates(path: &Path) -> Result<Vec<Coordinate>, CliError> {
    let points: Vec<Coordinate> = serde_json::from_str(&read_text(path)?)?;
    if let Some(index) = points.iter().position(|c| !c.is_valid()) {
        return Err(CliError::InvalidCoordinate { index });
    }
    Ok(points)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
