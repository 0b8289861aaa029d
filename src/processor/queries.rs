use serde::Serialize;

use crate::processor::{
    AggregateOp, AggregateResult,
    aggregate::{arg_max, arg_min, group_by, mean, rank_descending},
    column::{ChartTable, Column},
    filter::FilteredView,
    params::ParameterSet,
    record::{Platform, SongField, SongRecord},
};

/// Rows kept by the top-artist and top-song rankings
pub const TOP_K: usize = 10;

/// Names listed after the leader in ranking summaries (ranks 2 through 5)
pub const RUNNERS_UP: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryId {
    TopArtists,
    TopSongs,
    StreamsVsTempo,
    ReleasesByYear,
    FeatureProfile,
    PlaylistPlacement,
    ReleasesByMonth,
    KeyAndMode,
}

impl QueryId {
    /// 1-based position in the pass output
    pub fn number(&self) -> usize {
        match self {
            QueryId::TopArtists => 1,
            QueryId::TopSongs => 2,
            QueryId::StreamsVsTempo => 3,
            QueryId::ReleasesByYear => 4,
            QueryId::FeatureProfile => 5,
            QueryId::PlaylistPlacement => 6,
            QueryId::ReleasesByMonth => 7,
            QueryId::KeyAndMode => 8,
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            QueryId::TopArtists => "Top Artists by Total Streams",
            QueryId::TopSongs => "Most Streamed Songs",
            QueryId::StreamsVsTempo => "How Does BPM Affect Streaming Popularity?",
            QueryId::ReleasesByYear => "Trends in Song Releases Over the Years",
            QueryId::FeatureProfile => "How Do Song Characteristics Relate to Popularity?",
            QueryId::PlaylistPlacement => "Do Playlist Placements Boost Song Streams?",
            QueryId::ReleasesByMonth => "What Are the Seasonal Trends in Song Releases?",
            QueryId::KeyAndMode => "What Are the Key & Mode Distributions of Popular Songs?",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Box,
    Pie,
}

/// Chart input: what to draw and the table to draw it from.
///
/// `x` and `y` name columns of `table`; a box plot has no `y`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub x: &'static str,
    pub y: Option<&'static str>,
    pub x_label: &'static str,
    pub y_label: Option<&'static str>,
    pub table: ChartTable,
}

/// A name with its score, e.g. an artist and their total streams
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked {
    pub name: String,
    pub value: f64,
}

/// Insight scalars computed alongside a query's charts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum Insight {
    TopArtists {
        leader: Option<Ranked>,
        runners_up: Vec<String>,
    },
    TopSongs {
        leader: Option<Ranked>,
        runners_up: Vec<String>,
    },
    StreamsVsTempo {
        mean_bpm: Option<f64>,
        fastest: Option<Ranked>,
    },
    ReleasesByYear {
        /// (year, songs) with the most releases
        peak: Option<(i32, i64)>,
        /// (year, songs) with the fewest releases
        fewest: Option<(i32, i64)>,
    },
    FeatureProfile {
        mean_energy: Option<f64>,
        mean_danceability: Option<f64>,
        mean_valence: Option<f64>,
    },
    PlaylistPlacement {
        top_platform: Option<(Platform, f64)>,
        mean_total: Option<f64>,
    },
    ReleasesByMonth {
        busiest_month: Option<(u32, i64)>,
        peak_stream_month: Option<(u32, f64)>,
    },
    KeyAndMode {
        key: Option<(String, i64)>,
        mode: Option<(String, i64)>,
    },
}

/// Output of one aggregation query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub id: QueryId,
    pub charts: Vec<Chart>,
    pub insight: Insight,
}

/// One named, pure aggregation over a filtered view.
pub trait AggregationQuery: Sync {
    fn id(&self) -> QueryId;

    /// Charts and insight scalars for `view`. `params` only feeds titles.
    fn run(&self, view: &FilteredView<'_>, params: &ParameterSet) -> Section;
}

/// The aggregation queries, in output order
pub static QUERIES: [&dyn AggregationQuery; 8] = [
    &TopArtists,
    &TopSongs,
    &StreamsVsTempo,
    &ReleasesByYear,
    &FeatureProfile,
    &PlaylistPlacement,
    &ReleasesByMonth,
    &KeyAndMode,
];

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn scored<K>(grouped: Vec<(K, AggregateResult)>) -> Vec<(K, f64)> {
    grouped.into_iter().map(|(k, v)| (k, v.as_f64())).collect()
}

fn titled(base: &str, params: &ParameterSet) -> String {
    format!("{} ({})", base, params.year_mode.label())
}

/// Table of `fields` for every row of the view
fn row_table(view: &FilteredView<'_>, fields: &[SongField]) -> ChartTable {
    fields.iter().fold(ChartTable::new(), |table, field| {
        let values = view.records().map(|r| field.numeric(r)).collect();
        table.with_column(field.column_name(), Column::Float64(values))
    })
}

fn scatter(view: &FilteredView<'_>, title: String, x: SongField, y: SongField) -> Chart {
    Chart {
        kind: ChartKind::Scatter,
        title,
        x: x.column_name(),
        y: Some(y.column_name()),
        x_label: x.label(),
        y_label: Some(y.label()),
        table: row_table(view, &[x, y]),
    }
}

pub struct TopArtists;

impl AggregationQuery for TopArtists {
    fn id(&self) -> QueryId {
        QueryId::TopArtists
    }

    fn run(&self, view: &FilteredView<'_>, params: &ParameterSet) -> Section {
        let grouped = group_by(
            view.records(),
            |r| non_empty(&r.artist),
            |r| r.streams_billion,
            AggregateOp::Sum,
        );
        let ranked = rank_descending(scored(grouped), TOP_K);

        let table = ChartTable::new()
            .with_column(
                "artist",
                Column::Str(ranked.iter().map(|(a, _)| a.clone()).collect()),
            )
            .with_column(
                "streams_billion",
                Column::Float64(ranked.iter().map(|(_, s)| Some(*s)).collect()),
            );

        let insight = Insight::TopArtists {
            leader: ranked.first().map(|(name, value)| Ranked {
                name: name.clone(),
                value: *value,
            }),
            runners_up: ranked
                .iter()
                .skip(1)
                .take(RUNNERS_UP)
                .map(|(a, _)| a.clone())
                .collect(),
        };

        Section {
            id: self.id(),
            charts: vec![Chart {
                kind: ChartKind::Bar,
                title: titled("Top Artists by Total Streams", params),
                x: "artist",
                y: Some("streams_billion"),
                x_label: "Artist",
                y_label: Some("Total Streams (B)"),
                table,
            }],
            insight,
        }
    }
}

pub struct TopSongs;

impl AggregationQuery for TopSongs {
    fn id(&self) -> QueryId {
        QueryId::TopSongs
    }

    fn run(&self, view: &FilteredView<'_>, params: &ParameterSet) -> Section {
        let entries: Vec<(&SongRecord, f64)> = view
            .records()
            .filter_map(|r| r.streams_billion.map(|s| (r, s)))
            .collect();
        let ranked = rank_descending(entries, TOP_K);

        let table = ChartTable::new()
            .with_column(
                "track",
                Column::Str(ranked.iter().map(|(r, _)| r.track.clone()).collect()),
            )
            .with_column(
                "artist",
                Column::Str(ranked.iter().map(|(r, _)| r.artist.clone()).collect()),
            )
            .with_column(
                "streams_billion",
                Column::Float64(ranked.iter().map(|(_, s)| Some(*s)).collect()),
            );

        let insight = Insight::TopSongs {
            leader: ranked.first().map(|(r, s)| Ranked {
                name: r.track.clone(),
                value: *s,
            }),
            runners_up: ranked
                .iter()
                .skip(1)
                .take(RUNNERS_UP)
                .map(|(r, _)| r.track.clone())
                .collect(),
        };

        Section {
            id: self.id(),
            charts: vec![Chart {
                kind: ChartKind::Bar,
                title: titled("Most Streamed Songs", params),
                x: "track",
                y: Some("streams_billion"),
                x_label: "Song",
                y_label: Some("Streams (B)"),
                table,
            }],
            insight,
        }
    }
}

pub struct StreamsVsTempo;

impl AggregationQuery for StreamsVsTempo {
    fn id(&self) -> QueryId {
        QueryId::StreamsVsTempo
    }

    fn run(&self, view: &FilteredView<'_>, params: &ParameterSet) -> Section {
        let mut chart = scatter(
            view,
            titled("Streams vs. BPM", params),
            SongField::Bpm,
            SongField::StreamsBillion,
        );
        chart.table = chart.table.with_column(
            "track",
            Column::Str(view.records().map(|r| r.track.clone()).collect()),
        );

        let tempos: Vec<(&SongRecord, f64)> = view
            .records()
            .filter_map(|r| r.bpm.map(|b| (r, b)))
            .collect();

        let insight = Insight::StreamsVsTempo {
            mean_bpm: mean(view.records().map(|r| r.bpm)),
            fastest: arg_max(&tempos).map(|(r, bpm)| Ranked {
                name: r.track.clone(),
                value: bpm,
            }),
        };

        Section {
            id: self.id(),
            charts: vec![chart],
            insight,
        }
    }
}

pub struct ReleasesByYear;

impl AggregationQuery for ReleasesByYear {
    fn id(&self) -> QueryId {
        QueryId::ReleasesByYear
    }

    fn run(&self, view: &FilteredView<'_>, params: &ParameterSet) -> Section {
        let mut per_year = scored(group_by(
            view.records(),
            |r| r.released_year,
            |_| None,
            AggregateOp::Count,
        ));
        per_year.sort_by_key(|(year, _)| *year);

        let table = ChartTable::new()
            .with_column(
                "released_year",
                Column::Int64(per_year.iter().map(|(y, _)| *y as i64).collect()),
            )
            .with_column(
                "songs",
                Column::Int64(per_year.iter().map(|(_, n)| *n as i64).collect()),
            );

        let insight = Insight::ReleasesByYear {
            peak: arg_max(&per_year).map(|(y, n)| (y, n as i64)),
            fewest: arg_min(&per_year).map(|(y, n)| (y, n as i64)),
        };

        Section {
            id: self.id(),
            charts: vec![Chart {
                kind: ChartKind::Line,
                title: titled("Songs Released by Year", params),
                x: "released_year",
                y: Some("songs"),
                x_label: "Year",
                y_label: Some("Number of Songs"),
                table,
            }],
            insight,
        }
    }
}

pub struct FeatureProfile;

impl AggregationQuery for FeatureProfile {
    fn id(&self) -> QueryId {
        QueryId::FeatureProfile
    }

    fn run(&self, view: &FilteredView<'_>, _params: &ParameterSet) -> Section {
        let energy = scatter(
            view,
            "Energy vs. Streams".to_string(),
            SongField::Energy,
            SongField::StreamsBillion,
        );
        let dance = scatter(
            view,
            "Danceability vs. Streams".to_string(),
            SongField::Danceability,
            SongField::StreamsBillion,
        );
        let valence = Chart {
            kind: ChartKind::Box,
            title: "Happiness (Valence) of Top-Streamed Songs".to_string(),
            x: SongField::Valence.column_name(),
            y: None,
            x_label: SongField::Valence.label(),
            y_label: None,
            table: row_table(view, &[SongField::Valence]),
        };

        let insight = Insight::FeatureProfile {
            mean_energy: mean(view.records().map(|r| r.energy)),
            mean_danceability: mean(view.records().map(|r| r.danceability)),
            mean_valence: mean(view.records().map(|r| r.valence)),
        };

        Section {
            id: self.id(),
            charts: vec![energy, dance, valence],
            insight,
        }
    }
}

pub struct PlaylistPlacement;

impl AggregationQuery for PlaylistPlacement {
    fn id(&self) -> QueryId {
        QueryId::PlaylistPlacement
    }

    fn run(&self, view: &FilteredView<'_>, _params: &ParameterSet) -> Section {
        let per_platform: Vec<(Platform, f64)> = Platform::ALL
            .iter()
            .map(|p| (*p, view.records().map(|r| p.count(&r.playlists)).sum()))
            .collect();

        let bar = Chart {
            kind: ChartKind::Bar,
            title: "Songs in Spotify vs. Apple vs. Deezer Playlists".to_string(),
            x: "platform",
            y: Some("playlists"),
            x_label: "Platform",
            y_label: Some("Total Playlist Count"),
            table: ChartTable::new()
                .with_column(
                    "platform",
                    Column::Str(
                        per_platform
                            .iter()
                            .map(|(p, _)| p.label().to_string())
                            .collect(),
                    ),
                )
                .with_column(
                    "playlists",
                    Column::Float64(per_platform.iter().map(|(_, n)| Some(*n)).collect()),
                ),
        };

        let spread = scatter(
            view,
            "Playlist Count vs. Streams".to_string(),
            SongField::TotalPlaylists,
            SongField::StreamsBillion,
        );

        let insight = Insight::PlaylistPlacement {
            top_platform: arg_max(&per_platform),
            mean_total: mean(view.records().map(|r| Some(r.playlists.total()))),
        };

        Section {
            id: self.id(),
            charts: vec![bar, spread],
            insight,
        }
    }
}

pub struct ReleasesByMonth;

impl AggregationQuery for ReleasesByMonth {
    fn id(&self) -> QueryId {
        QueryId::ReleasesByMonth
    }

    fn run(&self, view: &FilteredView<'_>, _params: &ParameterSet) -> Section {
        let mut counts = scored(group_by(
            view.records(),
            |r| r.released_month,
            |_| None,
            AggregateOp::Count,
        ));
        counts.sort_by_key(|(m, _)| *m);

        let mut streams = scored(group_by(
            view.records(),
            |r| r.released_month,
            |r| r.streams_billion,
            AggregateOp::Sum,
        ));
        streams.sort_by_key(|(m, _)| *m);

        let month_column = |rows: &[(u32, f64)]| {
            Column::Int64(rows.iter().map(|(m, _)| *m as i64).collect())
        };

        let releases = Chart {
            kind: ChartKind::Bar,
            title: "Number of Songs Released by Month".to_string(),
            x: "released_month",
            y: Some("songs"),
            x_label: "Month",
            y_label: Some("Songs Released"),
            table: ChartTable::new()
                .with_column("released_month", month_column(&counts))
                .with_column(
                    "songs",
                    Column::Int64(counts.iter().map(|(_, n)| *n as i64).collect()),
                ),
        };

        let trend = Chart {
            kind: ChartKind::Line,
            title: "Streams Trend by Month".to_string(),
            x: "released_month",
            y: Some("streams_billion"),
            x_label: "Month",
            y_label: Some("Total Streams (B)"),
            table: ChartTable::new()
                .with_column("released_month", month_column(&streams))
                .with_column(
                    "streams_billion",
                    Column::Float64(streams.iter().map(|(_, s)| Some(*s)).collect()),
                ),
        };

        let insight = Insight::ReleasesByMonth {
            busiest_month: arg_max(&counts).map(|(m, n)| (m, n as i64)),
            peak_stream_month: arg_max(&streams),
        };

        Section {
            id: self.id(),
            charts: vec![releases, trend],
            insight,
        }
    }
}

pub struct KeyAndMode;

impl KeyAndMode {
    /// Value counts, most common first; ties keep first-seen order.
    fn counts(
        view: &FilteredView<'_>,
        key: impl Fn(&&SongRecord) -> Option<String>,
    ) -> Vec<(String, f64)> {
        let grouped = group_by(view.records(), key, |_| None, AggregateOp::Count);
        rank_descending(scored(grouped), usize::MAX)
    }

    fn table(name: &str, counts: &[(String, f64)]) -> ChartTable {
        ChartTable::new()
            .with_column(
                name,
                Column::Str(counts.iter().map(|(k, _)| k.clone()).collect()),
            )
            .with_column(
                "songs",
                Column::Int64(counts.iter().map(|(_, n)| *n as i64).collect()),
            )
    }
}

impl AggregationQuery for KeyAndMode {
    fn id(&self) -> QueryId {
        QueryId::KeyAndMode
    }

    fn run(&self, view: &FilteredView<'_>, _params: &ParameterSet) -> Section {
        let keys = Self::counts(view, |r| r.key.clone());
        let modes = Self::counts(view, |r| r.mode.clone());

        let key_chart = Chart {
            kind: ChartKind::Bar,
            title: "Most Common Musical Keys".to_string(),
            x: "key",
            y: Some("songs"),
            x_label: "Musical Key",
            y_label: Some("Count"),
            table: Self::table("key", &keys),
        };

        let mode_chart = Chart {
            kind: ChartKind::Pie,
            title: "Major vs. Minor Mode Distribution".to_string(),
            x: "mode",
            y: Some("songs"),
            x_label: "Mode",
            y_label: None,
            table: Self::table("mode", &modes),
        };

        let insight = Insight::KeyAndMode {
            key: keys.first().map(|(k, n)| (k.clone(), *n as i64)),
            mode: modes.first().map(|(m, n)| (m.clone(), *n as i64)),
        };

        Section {
            id: self.id(),
            charts: vec![key_chart, mode_chart],
            insight,
        }
    }
}
