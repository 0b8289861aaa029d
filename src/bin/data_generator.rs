use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use rand::Rng;

const KEYS: [&str; 11] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "B"];
const MODES: [&str; 2] = ["Major", "Minor"];

/// Writes a synthetic songs CSV with the columns the loader expects
#[derive(Parser, Debug)]
#[clap(name = "data_generator")]
struct Args {
    /// Output path
    #[clap(long, default_value = "data/songs.csv")]
    out: PathBuf,

    /// Number of songs
    #[clap(long, default_value = "100000")]
    rows: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let file = File::create(&args.out)?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "track_name,artist(s)_name,released_year,released_month,in_spotify_playlists,\
         streams,in_apple_playlists,in_deezer_playlists,bpm,key,mode,\
         danceability_%,valence_%,energy_%"
    )?;

    let mut rng = rand::rng();
    for i in 0..args.rows {
        // skew toward recent years like real chart data
        let released_year = 2023 - (rng.random_range(0.0f64..1.0).powi(4) * 50.0) as i32;
        let released_month = rng.random_range(1..=12);
        let streams: u64 = rng.random_range(1_000_000..3_700_000_000);
        let deezer: u32 = rng.random_range(0..15_000);
        // a key is missing for roughly one song in ten
        let key = if rng.random_bool(0.1) {
            ""
        } else {
            KEYS[rng.random_range(0..KEYS.len())]
        };

        writeln!(
            writer,
            "Song {i},\"Artist {}, Guest {}\",{},{},{},{},{},\"{}\",{},{},{},{},{},{}",
            rng.random_range(0..2_000),
            rng.random_range(0..50),
            released_year,
            released_month,
            rng.random_range(0..60_000),
            streams,
            rng.random_range(0..700),
            with_grouping(deezer),
            rng.random_range(60..=210),
            key,
            MODES[rng.random_range(0..MODES.len())],
            rng.random_range(20..=98),
            rng.random_range(3..=98),
            rng.random_range(10..=97),
        )?;
    }
    writer.flush()?;

    println!("Sample CSV generated: {}", args.out.display());
    Ok(())
}

fn with_grouping(n: u32) -> String {
    if n >= 1000 {
        format!("{},{:03}", n / 1000, n % 1000)
    } else {
        n.to_string()
    }
}
