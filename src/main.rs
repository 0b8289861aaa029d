use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use stream_insights::{ParameterUpdate, PassOutput, Session, YearMode};
use tracing::{info, warn};

#[cfg(not(target_env = "msvc"))]
use jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Markdown summaries
    Text,
    /// One JSON document per pass, charts included
    Json,
}

/// Interactive insights over a popular-songs dataset
#[derive(Parser, Debug)]
#[clap(name = "stream-insights")]
#[clap(about = "Filter a songs dataset and print chart-ready aggregations")]
struct Args {
    /// Songs CSV file
    #[clap(value_name = "DATA", env = "STREAM_INSIGHTS_DATA")]
    data: PathBuf,

    /// Release-year threshold (defaults to the computed window start)
    #[clap(long)]
    year: Option<i32>,

    /// Minimum streams, in billions
    #[clap(long, value_name = "BILLIONS")]
    min_streams: Option<f64>,

    /// Minimum tempo, in BPM
    #[clap(long)]
    min_bpm: Option<f64>,

    /// How the year threshold restricts songs
    #[clap(long, value_enum)]
    year_mode: Option<YearMode>,

    #[clap(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Read one JSON parameter update per line and print a pass for each
    #[clap(long)]
    stdin: bool,
}

impl Args {
    fn initial_update(&self) -> ParameterUpdate {
        ParameterUpdate {
            year_threshold: self.year,
            stream_threshold: self.min_streams,
            tempo_threshold: self.min_bpm,
            year_mode: self.year_mode,
        }
    }
}

fn emit(out: &mut impl Write, format: OutputFormat, pass: &PassOutput) -> io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", pass.to_markdown()),
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, pass)?;
            writeln!(out)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let (mut session, summary) = Session::load_csv(&args.data)?;
    for err in summary.errors.iter().take(5) {
        warn!(row = err.row, column = %err.column, value = %err.value, "value treated as missing");
    }
    info!(
        defaults = ?session.defaults().params,
        bounds = ?session.defaults().bounds,
        "session ready"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let pass = session.apply(args.initial_update());
    emit(&mut out, args.format, &pass)?;

    if args.stdin {
        for line in io::stdin().lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let update: ParameterUpdate = match serde_json::from_str(&line) {
                Ok(update) => update,
                Err(e) => {
                    warn!(error = %e, "ignoring malformed parameter update");
                    continue;
                }
            };
            let pass = session.apply(update);
            emit(&mut out, args.format, &pass)?;
            out.flush()?;
        }
    }

    Ok(())
}
