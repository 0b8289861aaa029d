use std::io::Write;

use stream_insights::{
    ChartKind, DataError, Insight, ParameterUpdate, PassOutput, QueryId, Session, YearMode,
};
use tempfile::NamedTempFile;

const HEADER: &str = "track_name,artist(s)_name ,released_year,released_month,\
in_spotify_playlists,streams,in_apple_playlists,in_deezer_playlists,bpm,key,mode,\
danceability_%,valence_%,energy_%";

fn write_csv(body: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    write!(tmp, "{}\n{}", HEADER, body).unwrap();
    tmp
}

fn sample() -> NamedTempFile {
    write_csv(
        "Flowers,Miley Cyrus,2023,1,12211,1316855716,300,\"1,234\",118,,Major,71,65,68\n\
         Kill Bill,SZA,2022,12,7612,1000000000,172,110,89,G#,Major,64,43,73\n\
         \"Cruel Summer\",Taylor Swift,2019,8,7858,800840817,116,\"2,001\",170,,Major,55,56,72\n\
         \"Anti-Hero\",Taylor Swift,2022,10,9082,999748277,56,208,97,E,Major,64,51,63\n\
         \"Ella Baila Sola\",\"Eslabon Armado, Peso Pluma\",2023,3,725,BPM110KeyAModeMajor,58,19,148,,Minor,67,83,76\n\
         Seven,\"Latto, Jung Kook\",2023,7,553,141381703,43,58,125,B,Major,80,89,83\n",
    )
}

#[test]
fn test_load_and_default_pass() {
    let tmp = sample();
    let (mut session, summary) = Session::load_csv(tmp.path()).unwrap();

    assert_eq!(summary.rows_processed, 6);
    assert_eq!(summary.skipped_rows, 0);
    // the corrupted stream count is the only reported value
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].column, "streams");

    let defaults = session.defaults().params;
    assert_eq!(defaults.year_mode, YearMode::AllTime);
    assert_eq!(defaults.year_threshold, 2019);

    let output = session.apply(ParameterUpdate {
        stream_threshold: Some(0.0),
        tempo_threshold: Some(0.0),
        ..Default::default()
    });
    let sections = output.sections();
    assert_eq!(sections.len(), 8);
    for (i, s) in sections.iter().enumerate() {
        assert_eq!(s.section.id.number(), i + 1);
    }

    // five rows carry streams; Taylor Swift's two songs outrank everyone
    match &sections[0].section.insight {
        Insight::TopArtists { leader, runners_up } => {
            assert_eq!(leader.as_ref().unwrap().name, "Taylor Swift");
            assert_eq!(runners_up[0], "Miley Cyrus");
        }
        other => panic!("unexpected insight {:?}", other),
    }
    assert_eq!(
        sections[0].section.charts[0].title,
        "Top Artists by Total Streams (All Time)"
    );
}

#[test]
fn test_grouping_separators_and_missing_keys() {
    let tmp = sample();
    let (session, _) = Session::load_csv(tmp.path()).unwrap();
    let records = session.table().records();

    assert_eq!(records[0].playlists.deezer, 1234.0);
    assert_eq!(records[2].playlists.deezer, 2001.0);
    assert_eq!(records[4].artist, "Eslabon Armado, Peso Pluma");
    assert_eq!(records[4].streams, None);
    assert_eq!(records[0].key, None);
}

#[test]
fn test_only_year_pass() {
    let tmp = sample();
    let (mut session, _) = Session::load_csv(tmp.path()).unwrap();

    let output = session.apply(ParameterUpdate {
        year_threshold: Some(2022),
        stream_threshold: Some(0.0),
        tempo_threshold: Some(0.0),
        year_mode: Some(YearMode::OnlyYear),
    });

    let sections = output.sections();
    let year = sections
        .iter()
        .find(|s| s.section.id == QueryId::ReleasesByYear)
        .unwrap();
    assert_eq!(
        year.section.insight,
        Insight::ReleasesByYear {
            peak: Some((2022, 2)),
            fewest: Some((2022, 2)),
        }
    );
    assert_eq!(year.section.charts[0].kind, ChartKind::Line);
    assert!(year.text.contains("Most releases: **2022** with **2** songs."));
}

#[test]
fn test_stream_threshold_above_max_is_no_data() {
    let tmp = sample();
    let (mut session, _) = Session::load_csv(tmp.path()).unwrap();

    let output = session.apply(ParameterUpdate {
        stream_threshold: Some(100.0),
        ..Default::default()
    });
    assert_eq!(
        output,
        PassOutput::NoData {
            notice: "No data available for the selected filters. Try adjusting the sliders."
                .to_string()
        }
    );
}

#[test]
fn test_missing_column_is_fatal() {
    let mut tmp = NamedTempFile::new().unwrap();
    write!(tmp, "track_name,streams\nFlowers,1316855716\n").unwrap();
    assert!(matches!(
        Session::load_csv(tmp.path()),
        Err(DataError::MissingColumn(_))
    ));
}

#[test]
fn test_json_output_carries_charts() {
    let tmp = sample();
    let (session, _) = Session::load_csv(tmp.path()).unwrap();
    let json = serde_json::to_value(session.run_pass()).unwrap();
    let first = &json["sections"][0]["section"];
    assert_eq!(first["id"], "top_artists");
    assert_eq!(first["charts"][0]["kind"], "bar");
    assert_eq!(first["insight"]["query"], "top_artists");
}
