use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::processor::{
    DataError, ParseSummary,
    filter::filter,
    params::{Defaults, ParameterSet, ParameterUpdate, compute_defaults},
    queries::{QUERIES, Section},
    report::{NO_DATA_NOTICE, render},
    song_table::SongTable,
};

/// A query section together with its rendered Markdown summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSection {
    pub section: Section,
    pub text: String,
}

/// Result of one recompute pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassOutput {
    /// The filters left no rows; no query was run.
    NoData { notice: String },
    /// One section per query, in query order.
    Sections { sections: Vec<RenderedSection> },
}

impl PassOutput {
    pub fn is_no_data(&self) -> bool {
        matches!(self, PassOutput::NoData { .. })
    }

    pub fn sections(&self) -> &[RenderedSection] {
        match self {
            PassOutput::NoData { .. } => &[],
            PassOutput::Sections { sections } => sections,
        }
    }

    /// Markdown for the whole pass: the notice, or every section's text.
    pub fn to_markdown(&self) -> String {
        match self {
            PassOutput::NoData { notice } => format!("{notice}\n"),
            PassOutput::Sections { sections } => sections
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Filters `table` under `params` and runs every query over the result.
pub fn run_pass(table: &SongTable, params: &ParameterSet) -> PassOutput {
    let view = filter(table, params);

    if view.is_empty() {
        info!(?params, "no rows match the current filters");
        return PassOutput::NoData {
            notice: NO_DATA_NOTICE.to_string(),
        };
    }

    let sections = QUERIES
        .iter()
        .map(|query| {
            let section = query.run(&view, params);
            debug!(
                query = ?section.id,
                charts = section.charts.len(),
                "ran aggregation query"
            );
            let text = render(&section);
            RenderedSection { section, text }
        })
        .collect();

    PassOutput::Sections { sections }
}

/// Owns the loaded table and the current parameters.
///
/// Parameters start at the computed defaults; each [`Session::apply`] merges
/// an update and recomputes the whole pass.
#[derive(Debug)]
pub struct Session {
    table: SongTable,
    defaults: Defaults,
    params: ParameterSet,
}

impl Session {
    pub fn new(table: SongTable) -> Result<Self, DataError> {
        let defaults = compute_defaults(&table)?;
        Ok(Session {
            table,
            params: defaults.params,
            defaults,
        })
    }

    /// Loads a CSV file and derives the defaults from it.
    pub fn load_csv(path: &Path) -> Result<(Self, ParseSummary), DataError> {
        let mut table = SongTable::new();
        let summary = table.load_csv(path)?;
        Ok((Session::new(table)?, summary))
    }

    pub fn table(&self) -> &SongTable {
        &self.table
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Merges `update` into the current parameters and runs a pass.
    pub fn apply(&mut self, update: ParameterUpdate) -> PassOutput {
        self.params = update.apply_to(self.params);
        self.run_pass()
    }

    pub fn run_pass(&self) -> PassOutput {
        run_pass(&self.table, &self.params)
    }
}
