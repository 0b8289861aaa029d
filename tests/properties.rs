use proptest::prelude::*;
use stream_insights::{ParameterSet, SongRecord, SongTable, YearMode, filter, run_pass};

fn arb_record() -> impl Strategy<Value = SongRecord> {
    (
        prop_oneof![Just("A"), Just("B"), Just("C"), Just("D")],
        proptest::option::of(2015i32..=2023),
        proptest::option::of(0.0f64..3.0),
        proptest::option::of(60.0f64..200.0),
        1u32..=12,
    )
        .prop_map(|(artist, year, streams_b, bpm, month)| {
            let mut r = SongRecord::new(artist, format!("{artist} song"));
            r.released_year = year;
            r.released_month = Some(month);
            if let Some(s) = streams_b {
                r = r.with_streams(s * 1e9);
            }
            r.bpm = bpm;
            r
        })
}

fn arb_table() -> impl Strategy<Value = SongTable> {
    prop::collection::vec(arb_record(), 0..40).prop_map(SongTable::from_records)
}

fn arb_mode() -> impl Strategy<Value = YearMode> {
    prop_oneof![
        Just(YearMode::AllTime),
        Just(YearMode::OnlyYear),
        Just(YearMode::FromYearOnward),
    ]
}

fn arb_params() -> impl Strategy<Value = ParameterSet> {
    (2014i32..=2024, 0.0f64..3.5, 50.0f64..210.0, arb_mode()).prop_map(
        |(year_threshold, stream_threshold, tempo_threshold, year_mode)| ParameterSet {
            year_threshold,
            stream_threshold,
            tempo_threshold,
            year_mode,
        },
    )
}

fn satisfies(r: &SongRecord, p: &ParameterSet) -> bool {
    let year_ok = match p.year_mode {
        YearMode::AllTime => true,
        YearMode::OnlyYear => r.released_year == Some(p.year_threshold),
        YearMode::FromYearOnward => r.released_year.is_some_and(|y| y >= p.year_threshold),
    };
    year_ok
        && r.streams_billion.is_some_and(|s| s >= p.stream_threshold)
        && r.bpm.is_some_and(|b| b >= p.tempo_threshold)
}

proptest! {
    #[test]
    fn filtered_rows_are_exactly_the_matching_rows(table in arb_table(), params in arb_params()) {
        let view = filter(&table, &params);
        let expected: Vec<usize> = table
            .records()
            .iter()
            .enumerate()
            .filter(|(_, r)| satisfies(r, &params))
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(view.rows(), expected.as_slice());
    }

    #[test]
    fn passes_are_idempotent(table in arb_table(), params in arb_params()) {
        prop_assert_eq!(run_pass(&table, &params), run_pass(&table, &params));
    }

    #[test]
    fn raising_stream_threshold_never_adds_rows(
        table in arb_table(),
        params in arb_params(),
        bump in 0.0f64..2.0,
    ) {
        let loose = filter(&table, &params);
        let strict_params = ParameterSet {
            stream_threshold: params.stream_threshold + bump,
            ..params
        };
        let strict = filter(&table, &strict_params);
        prop_assert!(strict.rows().iter().all(|i| loose.rows().contains(i)));
    }

    #[test]
    fn only_year_keeps_that_year(table in arb_table(), year in 2015i32..=2023) {
        let params = ParameterSet {
            year_threshold: year,
            stream_threshold: 0.0,
            tempo_threshold: 0.0,
            year_mode: YearMode::OnlyYear,
        };
        let view = filter(&table, &params);
        prop_assert!(view.records().all(|r| r.released_year == Some(year)));
    }

    #[test]
    fn empty_view_means_no_sections(table in arb_table(), params in arb_params()) {
        let empty = filter(&table, &params).is_empty();
        let output = run_pass(&table, &params);
        prop_assert_eq!(output.is_no_data(), empty);
        if !empty {
            prop_assert_eq!(output.sections().len(), 8);
        }
    }
}
