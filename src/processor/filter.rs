use tracing::debug;

use crate::processor::{
    FilterPredicate, Value,
    params::{ParameterSet, YearMode},
    record::{SongField, SongRecord},
    song_table::SongTable,
};

/// Subset of a [`SongTable`] that satisfies one [`ParameterSet`].
///
/// Holds row indices in source order and borrows the table, so every query
/// run over the same view sees the same rows.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a SongTable,
    rows: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn table(&self) -> &'a SongTable {
        self.table
    }

    /// Row indices into the table, ascending
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Records in source order
    pub fn records(&self) -> impl Iterator<Item = &'a SongRecord> + '_ {
        let records = self.table.records();
        self.rows.iter().map(move |&i| &records[i])
    }
}

/// Release-year restriction for `mode`; `None` means no restriction.
pub fn year_predicate(mode: YearMode, year: i32) -> Option<FilterPredicate> {
    let year = Value::Int(year as i64);
    match mode {
        YearMode::AllTime => None,
        YearMode::OnlyYear => Some(FilterPredicate::Equals(year)),
        YearMode::FromYearOnward => Some(FilterPredicate::AtLeast(year)),
    }
}

/// Conjunction of field predicates a row must satisfy under `params`.
pub fn predicates(params: &ParameterSet) -> Vec<(SongField, FilterPredicate)> {
    let mut preds = vec![
        (
            SongField::StreamsBillion,
            FilterPredicate::AtLeast(Value::Float(params.stream_threshold)),
        ),
        (
            SongField::Bpm,
            FilterPredicate::AtLeast(Value::Float(params.tempo_threshold)),
        ),
    ];

    if let Some(pred) = year_predicate(params.year_mode, params.year_threshold) {
        preds.push((SongField::ReleasedYear, pred));
    }
    preds
}

pub fn matches(record: &SongRecord, preds: &[(SongField, FilterPredicate)]) -> bool {
    preds
        .iter()
        .all(|(field, pred)| pred.matches(field.value(record).as_ref()))
}

/// Full scan of `table` under `params`.
pub fn filter<'a>(table: &'a SongTable, params: &ParameterSet) -> FilteredView<'a> {
    let preds = predicates(params);
    let rows: Vec<usize> = table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| matches(r, &preds))
        .map(|(i, _)| i)
        .collect();

    debug!(
        kept = rows.len(),
        total = table.row_count(),
        mode = params.year_mode.label(),
        "filtered song table"
    );

    FilteredView { table, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SongTable {
        SongTable::from_records(vec![
            SongRecord::new("A", "a1")
                .with_release(2021, 3)
                .with_streams(2e9)
                .with_bpm(120.0),
            SongRecord::new("B", "b1")
                .with_release(2022, 6)
                .with_streams(5e8)
                .with_bpm(95.0),
            SongRecord::new("C", "c1")
                .with_release(2023, 1)
                .with_streams(1e9)
                .with_bpm(140.0),
            // missing streams never pass
            SongRecord::new("D", "d1").with_release(2023, 2).with_bpm(150.0),
        ])
    }

    fn params(mode: YearMode, year: i32, streams: f64, bpm: f64) -> ParameterSet {
        ParameterSet {
            year_threshold: year,
            stream_threshold: streams,
            tempo_threshold: bpm,
            year_mode: mode,
        }
    }

    #[test]
    fn test_all_time_ignores_year() {
        let table = table();
        let view = filter(&table, &params(YearMode::AllTime, 2099, 0.0, 0.0));
        assert_eq!(view.rows(), &[0, 1, 2]);
    }

    #[test]
    fn test_only_year_is_exact() {
        let table = table();
        let view = filter(&table, &params(YearMode::OnlyYear, 2022, 0.0, 0.0));
        assert_eq!(view.rows(), &[1]);
    }

    #[test]
    fn test_from_year_onward_is_inclusive() {
        let table = table();
        let view = filter(&table, &params(YearMode::FromYearOnward, 2022, 0.0, 0.0));
        assert_eq!(view.rows(), &[1, 2]);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let table = table();
        let view = filter(&table, &params(YearMode::AllTime, 0, 1.0, 120.0));
        assert_eq!(view.rows(), &[0, 2]);
        let names: Vec<&str> = view.records().map(|r| r.track.as_str()).collect();
        assert_eq!(names, vec!["a1", "c1"]);
    }

    #[test]
    fn test_threshold_above_max_is_empty() {
        let table = table();
        let view = filter(&table, &params(YearMode::AllTime, 0, 2.5, 0.0));
        assert!(view.is_empty());
    }
}
