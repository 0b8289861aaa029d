use std::borrow::Cow;

use serde::Serialize;

use crate::{
    helpers::numeric::{Coerced, coerce_f64, coerce_i64, strip_grouping},
    processor::{DataError, ParseError, Value},
};

pub const ARTIST: &str = "artist(s)_name";
pub const TRACK: &str = "track_name";
pub const RELEASED_YEAR: &str = "released_year";
pub const RELEASED_MONTH: &str = "released_month";
pub const STREAMS: &str = "streams";
pub const BPM: &str = "bpm";
pub const KEY: &str = "key";
pub const MODE: &str = "mode";
pub const DANCEABILITY: &str = "danceability_%";
pub const VALENCE: &str = "valence_%";
pub const ENERGY: &str = "energy_%";
pub const SPOTIFY_PLAYLISTS: &str = "in_spotify_playlists";
pub const APPLE_PLAYLISTS: &str = "in_apple_playlists";
pub const DEEZER_PLAYLISTS: &str = "in_deezer_playlists";

/// Columns the loader insists on, matched after trimming header whitespace.
pub const REQUIRED_COLUMNS: [&str; 14] = [
    ARTIST,
    TRACK,
    RELEASED_YEAR,
    RELEASED_MONTH,
    STREAMS,
    BPM,
    KEY,
    MODE,
    DANCEABILITY,
    VALENCE,
    ENERGY,
    SPOTIFY_PLAYLISTS,
    APPLE_PLAYLISTS,
    DEEZER_PLAYLISTS,
];

/// Playlist inclusion counts. Missing source values are stored as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlaylistCounts {
    pub spotify: f64,
    pub apple: f64,
    pub deezer: f64,
}

impl PlaylistCounts {
    pub fn total(&self) -> f64 {
        self.spotify + self.apple + self.deezer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Platform {
    Spotify,
    Apple,
    Deezer,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Spotify, Platform::Apple, Platform::Deezer];

    pub fn label(&self) -> &'static str {
        match self {
            Platform::Spotify => "Spotify",
            Platform::Apple => "Apple Music",
            Platform::Deezer => "Deezer",
        }
    }

    pub fn count(&self, playlists: &PlaylistCounts) -> f64 {
        match self {
            Platform::Spotify => playlists.spotify,
            Platform::Apple => playlists.apple,
            Platform::Deezer => playlists.deezer,
        }
    }
}

/// One song, typed and cleaned at the load boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongRecord {
    pub artist: String,
    pub track: String,
    pub released_year: Option<i32>,
    pub released_month: Option<u32>,
    pub streams: Option<f64>,
    pub streams_billion: Option<f64>,
    pub bpm: Option<f64>,
    pub energy: Option<f64>,
    pub danceability: Option<f64>,
    pub valence: Option<f64>,
    pub playlists: PlaylistCounts,
    pub key: Option<String>,
    pub mode: Option<String>,
}

impl SongRecord {
    /// A record with every optional field missing and no playlist placements.
    pub fn new(artist: impl Into<String>, track: impl Into<String>) -> Self {
        SongRecord {
            artist: artist.into(),
            track: track.into(),
            released_year: None,
            released_month: None,
            streams: None,
            streams_billion: None,
            bpm: None,
            energy: None,
            danceability: None,
            valence: None,
            playlists: PlaylistCounts::default(),
            key: None,
            mode: None,
        }
    }

    pub fn with_release(mut self, year: i32, month: u32) -> Self {
        self.released_year = Some(year);
        self.released_month = Some(month);
        self
    }

    /// Sets the raw stream count; the billions rescale follows it.
    pub fn with_streams(mut self, streams: f64) -> Self {
        self.streams = Some(streams);
        self.streams_billion = Some(streams / 1e9);
        self
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = Some(bpm);
        self
    }

    pub fn with_features(mut self, energy: f64, danceability: f64, valence: f64) -> Self {
        self.energy = Some(energy);
        self.danceability = Some(danceability);
        self.valence = Some(valence);
        self
    }

    pub fn with_playlists(mut self, spotify: f64, apple: f64, deezer: f64) -> Self {
        self.playlists = PlaylistCounts {
            spotify,
            apple,
            deezer,
        };
        self
    }

    pub fn with_key_mode(mut self, key: &str, mode: &str) -> Self {
        self.key = Some(key.to_string());
        self.mode = Some(mode.to_string());
        self
    }
}

/// Typed accessor for the numeric attributes of a [`SongRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SongField {
    ReleasedYear,
    ReleasedMonth,
    Streams,
    StreamsBillion,
    Bpm,
    Energy,
    Danceability,
    Valence,
    TotalPlaylists,
}

impl SongField {
    pub fn value(&self, record: &SongRecord) -> Option<Value> {
        match self {
            SongField::ReleasedYear => record.released_year.map(|y| Value::Int(y as i64)),
            SongField::ReleasedMonth => record.released_month.map(|m| Value::Int(m as i64)),
            _ => self.numeric(record).map(Value::Float),
        }
    }

    pub fn numeric(&self, record: &SongRecord) -> Option<f64> {
        match self {
            SongField::ReleasedYear => record.released_year.map(f64::from),
            SongField::ReleasedMonth => record.released_month.map(f64::from),
            SongField::Streams => record.streams,
            SongField::StreamsBillion => record.streams_billion,
            SongField::Bpm => record.bpm,
            SongField::Energy => record.energy,
            SongField::Danceability => record.danceability,
            SongField::Valence => record.valence,
            SongField::TotalPlaylists => Some(record.playlists.total()),
        }
    }

    /// Column name used in chart tables
    pub fn column_name(&self) -> &'static str {
        match self {
            SongField::ReleasedYear => RELEASED_YEAR,
            SongField::ReleasedMonth => RELEASED_MONTH,
            SongField::Streams => STREAMS,
            SongField::StreamsBillion => "streams_billion",
            SongField::Bpm => BPM,
            SongField::Energy => ENERGY,
            SongField::Danceability => DANCEABILITY,
            SongField::Valence => VALENCE,
            SongField::TotalPlaylists => "total_playlists",
        }
    }

    /// Axis label
    pub fn label(&self) -> &'static str {
        match self {
            SongField::ReleasedYear => "Year",
            SongField::ReleasedMonth => "Month",
            SongField::Streams => "Streams",
            SongField::StreamsBillion => "Streams (B)",
            SongField::Bpm => "BPM (Tempo)",
            SongField::Energy => "Energy (%)",
            SongField::Danceability => "Danceability (%)",
            SongField::Valence => "Valence (%)",
            SongField::TotalPlaylists => "Total Playlist Count",
        }
    }
}

/// Positions of the required columns within a header row.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    positions: [usize; REQUIRED_COLUMNS.len()],
    width: usize,
}

impl ColumnMap {
    pub fn resolve(headers: &[String]) -> Result<Self, DataError> {
        let mut positions = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;
        }

        Ok(ColumnMap {
            positions,
            width: headers.len(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        REQUIRED_COLUMNS
            .iter()
            .position(|c| *c == name)
            .map(|slot| self.positions[slot])
    }
}

/// Cleans one raw row into a [`SongRecord`], noting every non-empty value
/// that had to be coerced to missing.
pub fn coerce_row(
    fields: &[Cow<'_, [u8]>],
    columns: &ColumnMap,
    line: usize,
) -> (SongRecord, Vec<ParseError>) {
    let mut cleaner = RowCleaner {
        fields,
        columns,
        line,
        notes: Vec::new(),
    };

    let streams = cleaner.float(STREAMS);
    let record = SongRecord {
        artist: cleaner.text(ARTIST),
        track: cleaner.text(TRACK),
        released_year: cleaner
            .integer(RELEASED_YEAR)
            .and_then(|y| i32::try_from(y).ok()),
        released_month: cleaner
            .integer(RELEASED_MONTH)
            .and_then(|m| u32::try_from(m).ok()),
        streams,
        streams_billion: streams.map(|s| s / 1e9),
        bpm: cleaner.float(BPM),
        energy: cleaner.float(ENERGY),
        danceability: cleaner.float(DANCEABILITY),
        valence: cleaner.float(VALENCE),
        playlists: PlaylistCounts {
            spotify: cleaner.playlist(SPOTIFY_PLAYLISTS),
            apple: cleaner.playlist(APPLE_PLAYLISTS),
            deezer: cleaner.playlist(DEEZER_PLAYLISTS),
        },
        key: cleaner.category(KEY),
        mode: cleaner.category(MODE),
    };

    (record, cleaner.notes)
}

struct RowCleaner<'r, 'a> {
    fields: &'r [Cow<'a, [u8]>],
    columns: &'r ColumnMap,
    line: usize,
    notes: Vec<ParseError>,
}

impl<'r> RowCleaner<'r, '_> {
    fn raw(&self, name: &str) -> &'r [u8] {
        let fields = self.fields;
        match self.columns.index_of(name).and_then(|i| fields.get(i)) {
            Some(field) => field,
            None => &[],
        }
    }

    fn note(&mut self, name: &str, bytes: &[u8]) {
        self.notes.push(ParseError {
            row: self.line,
            column: name.to_string(),
            value: String::from_utf8_lossy(bytes).to_string(),
        });
    }

    fn checked<T>(&mut self, name: &str, bytes: &[u8], coerced: Coerced<T>) -> Option<T> {
        if matches!(coerced, Coerced::Invalid) {
            self.note(name, bytes);
        }
        coerced.value()
    }

    fn float(&mut self, name: &str) -> Option<f64> {
        let bytes = self.raw(name);
        self.checked(name, bytes, coerce_f64(bytes))
    }

    fn integer(&mut self, name: &str) -> Option<i64> {
        let bytes = self.raw(name);
        self.checked(name, bytes, coerce_i64(bytes))
    }

    /// Grouping separators are stripped and missing counts become 0.
    fn playlist(&mut self, name: &str) -> f64 {
        let bytes = self.raw(name);
        let coerced = coerce_f64(&strip_grouping(bytes));
        self.checked(name, bytes, coerced).unwrap_or(0.0)
    }

    fn text(&self, name: &str) -> String {
        String::from_utf8_lossy(self.raw(name)).to_string()
    }

    fn category(&self, name: &str) -> Option<String> {
        let value = self.text(name);
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn row(values: [&'static str; 14]) -> Vec<Cow<'static, [u8]>> {
        values.iter().map(|v| Cow::Borrowed(v.as_bytes())).collect()
    }

    #[test]
    fn test_resolve_reports_missing_column() {
        let mut h = headers();
        h.retain(|c| c != BPM);
        match ColumnMap::resolve(&h) {
            Err(DataError::MissingColumn(name)) => assert_eq!(name, BPM),
            other => panic!("Expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_coerce_row_cleans_values() {
        let columns = ColumnMap::resolve(&headers()).unwrap();
        let fields = row([
            "Artist", "Song", "2022", "7", "1500000000", "120", "C#", "Major", "70", "40",
            "80", "553", "n/a", "1,234",
        ]);

        let (record, notes) = coerce_row(&fields, &columns, 2);
        assert_eq!(record.released_year, Some(2022));
        assert_eq!(record.released_month, Some(7));
        assert_eq!(record.streams_billion, Some(1.5));
        assert_eq!(record.bpm, Some(120.0));
        assert_eq!(record.playlists.deezer, 1234.0);
        assert_eq!(record.playlists.apple, 0.0);
        assert_eq!(record.playlists.total(), 553.0 + 1234.0);
        assert_eq!(record.key.as_deref(), Some("C#"));

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].column, APPLE_PLAYLISTS);
        assert_eq!(notes[0].row, 2);
    }

    #[test]
    fn test_unparseable_streams_become_missing() {
        let columns = ColumnMap::resolve(&headers()).unwrap();
        let fields = row([
            "Artist", "Song", "2022", "7", "BPM110KeyAModeMajor", "", "", "", "", "", "", "",
            "", "",
        ]);

        let (record, notes) = coerce_row(&fields, &columns, 5);
        assert_eq!(record.streams, None);
        assert_eq!(record.streams_billion, None);
        assert_eq!(record.bpm, None);
        assert_eq!(record.key, None);
        assert_eq!(record.playlists, PlaylistCounts::default());
        // blanks are missing without being reported
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].column, STREAMS);
    }
}
