//! # stream_insights
//!
//! `stream_insights` turns a table of popular songs into a fixed set of
//! chart-ready aggregations, recomputed whenever the user moves one of four
//! filter controls. It supports:
//!
//! - Memory-mapped CSV loading with quote-aware record scanning
//! - Type coercion at the load boundary (unparseable values become missing)
//! - Default filter thresholds derived from the data
//! - Eight aggregation queries with stable, first-seen tie breaking
//! - Chart tables exportable to Arrow, and JSON output through serde
//!
//! # Example
//!
//! ```rust,no_run
//! use stream_insights::{ParameterUpdate, PassOutput, Session, YearMode};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (mut session, summary) = Session::load_csv(Path::new("spotify-2023.csv"))?;
//!     println!("Loaded {} songs", summary.rows_processed);
//!
//!     // First pass runs with the computed defaults
//!     print!("{}", session.run_pass().to_markdown());
//!
//!     // Narrow to a single release year
//!     let output = session.apply(ParameterUpdate {
//!         year_mode: Some(YearMode::OnlyYear),
//!         year_threshold: Some(2022),
//!         ..Default::default()
//!     });
//!     if let PassOutput::Sections { sections } = &output {
//!         for s in sections {
//!             println!("{}: {} charts", s.section.id.heading(), s.section.charts.len());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

mod helpers;
pub mod processor;

pub use processor::{
    AggregateOp, AggregateResult, DataError, FilterPredicate, ParseError, ParseSummary, Value,
    column::{ChartTable, Column, ColumnType},
    filter::{FilteredView, filter},
    params::{
        Defaults, ParameterBounds, ParameterSet, ParameterUpdate, YearMode, compute_defaults,
    },
    pipeline::{PassOutput, RenderedSection, Session, run_pass},
    queries::{AggregationQuery, Chart, ChartKind, Insight, QUERIES, QueryId, Section},
    record::{Platform, SongField, SongRecord},
    report::{NO_DATA_NOTICE, render},
    song_table::SongTable,
};
