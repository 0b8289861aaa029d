use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::processor::{DataError, song_table::SongTable};

/// Share of songs, counted from the newest release year backward, that the
/// default year window must exceed.
pub const YEAR_SHARE_CUTOFF: f64 = 0.95;

/// Fraction of the largest stream count used as the default minimum.
pub const STREAM_DEFAULT_FRACTION: f64 = 0.1;

/// How the release-year threshold restricts rows
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum YearMode {
    /// No year restriction
    #[default]
    AllTime,
    /// Release year equals the threshold
    OnlyYear,
    /// Release year is at least the threshold
    FromYearOnward,
}

impl YearMode {
    pub fn label(&self) -> &'static str {
        match self {
            YearMode::AllTime => "All Time",
            YearMode::OnlyYear => "Only Selected Year",
            YearMode::FromYearOnward => "From Selected Year Onward",
        }
    }
}

/// The four user-adjustable filter parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub year_threshold: i32,
    /// Minimum streams, in billions
    pub stream_threshold: f64,
    /// Minimum tempo, in BPM
    pub tempo_threshold: f64,
    pub year_mode: YearMode,
}

/// Partial parameter change as delivered by an input widget. Absent fields
/// keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterUpdate {
    pub year_threshold: Option<i32>,
    pub stream_threshold: Option<f64>,
    pub tempo_threshold: Option<f64>,
    pub year_mode: Option<YearMode>,
}

impl ParameterUpdate {
    pub fn apply_to(&self, base: ParameterSet) -> ParameterSet {
        ParameterSet {
            year_threshold: self.year_threshold.unwrap_or(base.year_threshold),
            stream_threshold: self.stream_threshold.unwrap_or(base.stream_threshold),
            tempo_threshold: self.tempo_threshold.unwrap_or(base.tempo_threshold),
            year_mode: self.year_mode.unwrap_or(base.year_mode),
        }
    }
}

/// Slider ranges offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterBounds {
    pub min_year: i32,
    pub max_year: i32,
    pub max_streams_billion: f64,
    pub min_bpm: f64,
    pub max_bpm: f64,
}

/// Initial parameter values and ranges, derived once from the full table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Defaults {
    pub params: ParameterSet,
    pub bounds: ParameterBounds,
}

/// Derives the default slider positions from the whole table.
///
/// # Errors
/// [`DataError::Degenerate`] when no row has a release year, so no default
/// year window exists.
pub fn compute_defaults(table: &SongTable) -> Result<Defaults, DataError> {
    let year_threshold = default_year(table)?;
    let max_year = table
        .records()
        .iter()
        .filter_map(|r| r.released_year)
        .max()
        .unwrap_or(year_threshold);

    let max_streams_billion = max_of(table.records().iter().filter_map(|r| r.streams_billion));
    let min_bpm = min_of(table.records().iter().filter_map(|r| r.bpm));
    let max_bpm = max_of(table.records().iter().filter_map(|r| r.bpm));

    let params = ParameterSet {
        year_threshold,
        stream_threshold: max_streams_billion.unwrap_or(0.0) * STREAM_DEFAULT_FRACTION,
        tempo_threshold: min_bpm.unwrap_or(0.0),
        year_mode: YearMode::default(),
    };

    let bounds = ParameterBounds {
        min_year: year_threshold,
        max_year,
        max_streams_billion: max_streams_billion.unwrap_or(0.0),
        min_bpm: min_bpm.unwrap_or(0.0),
        max_bpm: max_bpm.unwrap_or(0.0),
    };

    debug!(?params, ?bounds, "computed default parameters");
    Ok(Defaults { params, bounds })
}

/// Earliest year at which the cumulative release share, walking back from
/// the newest year, exceeds [`YEAR_SHARE_CUTOFF`].
fn default_year(table: &SongTable) -> Result<i32, DataError> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for year in table.records().iter().filter_map(|r| r.released_year) {
        *counts.entry(year).or_default() += 1;
    }

    let total: usize = counts.values().sum();
    let mut cumulative = 0usize;
    // Integer counts keep the ratio exact: a share of exactly 0.95 does not
    // exceed the cutoff, so the walk continues to the next older year.
    for (&year, &count) in counts.iter().rev() {
        cumulative += count;
        if cumulative as f64 / total as f64 > YEAR_SHARE_CUTOFF {
            return Ok(year);
        }
    }

    Err(DataError::Degenerate(
        "no release year reaches the cumulative share cutoff".into(),
    ))
}

fn max_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
}

fn min_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.min(v))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::record::SongRecord;

    fn songs_per_year(counts: &[(i32, usize)]) -> SongTable {
        let mut records = Vec::new();
        for &(year, count) in counts {
            for i in 0..count {
                records.push(
                    SongRecord::new(format!("artist {i}"), format!("{year}-{i}"))
                        .with_release(year, 1)
                        .with_streams((i + 1) as f64 * 1e8)
                        .with_bpm(80.0 + i as f64),
                );
            }
        }
        SongTable::from_records(records)
    }

    #[test]
    fn test_default_year_crosses_cutoff() {
        let table = songs_per_year(&[(2023, 50), (2022, 30), (2021, 20)]);
        let defaults = compute_defaults(&table).unwrap();
        assert_eq!(defaults.params.year_threshold, 2021);
        assert_eq!(defaults.bounds.max_year, 2023);
    }

    #[test]
    fn test_default_year_stops_at_first_crossing() {
        // 96% of songs come from 2023 alone
        let table = songs_per_year(&[(2023, 96), (1999, 4)]);
        let defaults = compute_defaults(&table).unwrap();
        assert_eq!(defaults.params.year_threshold, 2023);
    }

    #[test]
    fn test_default_year_share_exactly_at_cutoff() {
        // 2023..2021 cover 19 of 20 songs, exactly 0.95
        let table = songs_per_year(&[(2023, 2), (2022, 4), (2021, 13), (2020, 1)]);
        let defaults = compute_defaults(&table).unwrap();
        assert_eq!(defaults.params.year_threshold, 2020);
    }

    #[test]
    fn test_stream_and_tempo_defaults() {
        let table = songs_per_year(&[(2023, 10)]);
        let defaults = compute_defaults(&table).unwrap();
        // max streams is 1e9 -> 1.0B
        assert!((defaults.params.stream_threshold - 0.1).abs() < 1e-12);
        assert_eq!(defaults.params.tempo_threshold, 80.0);
        assert_eq!(defaults.bounds.max_bpm, 89.0);
        assert_eq!(defaults.params.year_mode, YearMode::AllTime);
    }

    #[test]
    fn test_no_years_is_degenerate() {
        let table = SongTable::from_records(vec![SongRecord::new("A", "x").with_bpm(100.0)]);
        assert!(matches!(
            compute_defaults(&table),
            Err(DataError::Degenerate(_))
        ));
    }

    #[test]
    fn test_update_keeps_unset_fields() {
        let base = ParameterSet {
            year_threshold: 2020,
            stream_threshold: 0.5,
            tempo_threshold: 90.0,
            year_mode: YearMode::AllTime,
        };
        let update = ParameterUpdate {
            year_mode: Some(YearMode::OnlyYear),
            ..Default::default()
        };
        let next = update.apply_to(base);
        assert_eq!(next.year_mode, YearMode::OnlyYear);
        assert_eq!(next.year_threshold, 2020);
        assert_eq!(next.stream_threshold, 0.5);
    }

    #[test]
    fn test_update_from_json() {
        let update: ParameterUpdate =
            serde_json::from_str(r#"{"stream_threshold": 1.25, "year_mode": "from_year_onward"}"#)
                .unwrap();
        assert_eq!(update.stream_threshold, Some(1.25));
        assert_eq!(update.year_mode, Some(YearMode::FromYearOnward));
        assert_eq!(update.tempo_threshold, None);
    }
}
