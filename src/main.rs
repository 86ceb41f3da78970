//! CLI entry point for the mixer timeline tool.
//!
//! Provides subcommands for printing a business-day slot grid, building a
//! fleet idle-time report from a trip file, URL or the scheduling backend, and
//! sweeping a date range into per-day truck-wise tables.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use mixer_timeline::config::Settings;
use mixer_timeline::fetch::{ApiKey, BasicClient, HttpClient, fetch_bytes};
use mixer_timeline::infra::{FileSource, ScheduleApiClient};
use mixer_timeline::output::{gzip_file, print_json, print_pretty, write_json, write_slot_table};
use mixer_timeline::parser::parse_trips;
use mixer_timeline::report::{ReportFilter, RosterVehicle, build_report};
use mixer_timeline::services::trip_source::TripSource;
use mixer_timeline::timeline::{ClockFormat, Granularity, TimeWindow, VehicleType, slot_label};
use tracing::Instrument;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "mixer_timeline")]
#[command(about = "Idle-time and Gantt aggregation for transit mixers and pumps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Window options shared by every subcommand. Unset values fall back to the
/// environment settings.
#[derive(clap::Args)]
struct WindowArgs {
    /// Hour the business day starts at (0-23)
    #[arg(long)]
    start_hour: Option<u32>,

    /// Slot size: "hourly" or "four-hour"
    #[arg(short, long)]
    granularity: Option<Granularity>,

    /// Label format: "24h" or "12h"
    #[arg(long)]
    clock: Option<ClockFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the slot grid of a business day
    Slots {
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Build an idle-time report from a trip file, a URL or the backend
    Report {
        /// Path to file or URL to fetch; omit to query the configured backend
        #[arg(value_name = "FILE_OR_URL")]
        source: Option<String>,

        /// Business day to report (defaults to today for backend queries)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        #[command(flatten)]
        window: WindowArgs,

        /// Only report one kind of vehicle (TM, LP, BP)
        #[arg(long)]
        vehicle_type: Option<String>,

        /// Vehicle that must appear even without trips (repeatable)
        #[arg(long = "vehicle", value_name = "VEHICLE_ID")]
        roster: Vec<String>,

        /// Write the truck-wise table to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the full report to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Fetch every day in a range from the backend and write one table per day
    Sweep {
        /// First business day (inclusive)
        #[arg(long)]
        from: NaiveDate,

        /// Last business day (inclusive)
        #[arg(long)]
        to: NaiveDate,

        #[command(flatten)]
        window: WindowArgs,

        /// Directory for the per-day CSV files
        #[arg(short, long, default_value = "reports")]
        output_dir: String,

        /// Maximum number of days fetched at once
        #[arg(short, long, default_value_t = 4)]
        concurrency: usize,

        /// Gzip each table after writing it
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

/// Settings with command-line overrides applied.
#[derive(Clone)]
struct Resolved {
    settings: Settings,
    start_hour: u32,
    granularity: Granularity,
    clock: ClockFormat,
}

impl Resolved {
    fn new(settings: Settings, args: &WindowArgs) -> Self {
        Self {
            start_hour: args.start_hour.unwrap_or(settings.start_hour),
            granularity: args.granularity.unwrap_or(settings.granularity),
            clock: args.clock.unwrap_or(settings.clock),
            settings,
        }
    }

    fn window(&self, date: Option<NaiveDate>) -> Result<TimeWindow> {
        let window = TimeWindow::build(self.start_hour, self.granularity)?;
        Ok(match date {
            Some(date) => window.anchored_at(date),
            None => window,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/mixer_timeline.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("mixer_timeline.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("info")));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::try_from_env("RUST_LOG_JSON").unwrap_or_else(|_| EnvFilter::new("debug")),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Slots { window } => {
            let resolved = Resolved::new(settings, &window);
            let window = resolved.window(None)?;
            info!(
                start_hour = window.start_hour(),
                granularity = %window.granularity(),
                slots = window.slots().len(),
                "Slot grid"
            );
            for (index, slot) in window.slots().iter().enumerate() {
                info!(index, start = slot.start, end = slot.end, label = %slot_label(slot, resolved.clock), "Slot");
            }
        }
        Commands::Report {
            source,
            date,
            window,
            vehicle_type,
            roster,
            csv,
            json,
        } => {
            let resolved = Resolved::new(settings, &window);
            let filter = report_filter(vehicle_type.as_deref(), roster)?;

            let (bytes, date) = match source {
                Some(source) => (fetcher(&source, &resolved.settings).await?, date),
                None => {
                    let date = date.unwrap_or_else(|| Local::now().date_naive());
                    let client = ScheduleApiClient::from_settings(&resolved.settings)?;
                    (client.trips_for_date(date).await?, Some(date))
                }
            };

            let parsed = parse_trips(&bytes)?;
            let window = resolved.window(date)?;
            let report = build_report(parsed, &window, &filter);

            if !report.skipped_records.is_empty() {
                warn!(
                    skipped = report.skipped_records.len(),
                    "Some trip records could not be read"
                );
            }
            for vehicle in &report.vehicles {
                info!(
                    vehicle_id = %vehicle.vehicle_id,
                    vehicle_type = %vehicle.vehicle_type,
                    free_hours = vehicle.total_free_hours,
                    busy_hours = vehicle.total_busy_hours,
                    blocks = vehicle.grouped_tasks.len(),
                    "Vehicle"
                );
            }
            print_pretty(&report);

            match (&csv, &json) {
                (None, None) => print_json(&report)?,
                _ => {
                    if let Some(path) = &csv {
                        write_slot_table(path, &report, resolved.clock)?;
                        info!(path = %path.display(), "Slot table written");
                    }
                    if let Some(path) = &json {
                        write_json(path, &report)?;
                        info!(path = %path.display(), "Report written");
                    }
                }
            }
        }
        Commands::Sweep {
            from,
            to,
            window,
            output_dir,
            concurrency,
            gzip,
        } => {
            let resolved = Resolved::new(settings, &window);
            sweep(resolved, from, to, &output_dir, concurrency, gzip).await?;
        }
    }

    Ok(())
}

fn report_filter(vehicle_type: Option<&str>, roster: Vec<String>) -> Result<ReportFilter> {
    let vehicle_type = vehicle_type
        .map(|label| label.parse::<VehicleType>().context("--vehicle-type"))
        .transpose()?;

    Ok(ReportFilter {
        vehicle_type,
        roster: roster
            .into_iter()
            .map(|vehicle_id| RosterVehicle {
                vehicle_id,
                vehicle_type: vehicle_type.unwrap_or_default(),
            })
            .collect(),
    })
}

/// Loads a trip table from a local file path or fetches it over HTTP.
#[tracing::instrument(skip(settings), fields(source = %source))]
async fn fetcher(source: &str, settings: &Settings) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        let client = BasicClient::new()?;
        match settings.api_token.as_deref() {
            Some(token) => fetch_bytes(&ApiKey::bearer(client, token)?, source).await?,
            None => fetch_bytes(&client, source).await?,
        }
    } else {
        let date = Local::now().date_naive();
        FileSource::new(source).trips_for_date(date).await?
    };
    Ok(bytes)
}

/// Fetches every business day in `from..=to` from the backend concurrently
/// and writes `output_dir/date=YYYY-MM-DD.csv` for each.
#[tracing::instrument(skip_all, fields(%from, %to, output_dir = %output_dir, concurrency = concurrency))]
async fn sweep(
    resolved: Resolved,
    from: NaiveDate,
    to: NaiveDate,
    output_dir: &str,
    concurrency: usize,
    gzip: bool,
) -> Result<()> {
    if to < from {
        anyhow::bail!("--to ({to}) is before --from ({from})");
    }

    let client: Arc<ScheduleApiClient<Arc<dyn HttpClient>>> =
        Arc::new(ScheduleApiClient::from_settings(&resolved.settings)?);

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output directory {output_dir}"))?;

    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrency.max(1)));
    let dates: Vec<NaiveDate> = from.iter_days().take_while(|d| *d <= to).collect();
    info!(days = dates.len(), "Starting sweep");

    let mut tasks = vec![];

    for date in dates {
        let sem = semaphore.clone();
        let client = client.clone();
        let resolved = resolved.clone();
        let output_file = PathBuf::from(output_dir).join(format!("date={}.csv", date.format("%Y-%m-%d")));

        let day_span = tracing::info_span!("sweep_day", %date);

        let task = tokio::spawn(
            async move {
                let Ok(_permit) = sem.acquire().await else {
                    return false;
                };

                let bytes = match client.trips_for_date(date).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        error!(error = %e, "Trip fetch failed");
                        return false;
                    }
                };

                let parsed = match parse_trips(&bytes) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        error!(error = %e, "Trip payload could not be parsed");
                        return false;
                    }
                };

                let window = match resolved.window(Some(date)) {
                    Ok(window) => window,
                    Err(e) => {
                        error!(error = %e, "Invalid window");
                        return false;
                    }
                };

                let report = build_report(parsed, &window, &ReportFilter::default());
                if let Err(e) = write_slot_table(&output_file, &report, resolved.clock) {
                    error!(error = %e, "Failed to write slot table");
                    return false;
                }

                if gzip {
                    match gzip_file(&output_file) {
                        Ok(gz) => {
                            if let Err(e) = std::fs::remove_file(&output_file) {
                                warn!(error = %e, "Could not remove uncompressed table");
                            }
                            info!(path = %gz.display(), "Day processed");
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to gzip slot table");
                            return false;
                        }
                    }
                } else {
                    info!(path = %output_file.display(), "Day processed");
                }
                true
            }
            .instrument(day_span),
        );

        tasks.push(task);
    }

    let total = tasks.len();
    let mut failed = 0;
    for task in tasks {
        if !matches!(task.await, Ok(true)) {
            failed += 1;
        }
    }

    if failed == total {
        anyhow::bail!("all {total} days of the sweep failed");
    }
    if failed > 0 {
        warn!(failed, total, "Some days could not be processed");
    }
    info!(output_dir, "Finished sweep");
    Ok(())
}
