use std::fmt;

use crate::{
    helpers::numeric::format_thousands,
    processor::queries::{Insight, Ranked, Section},
};

pub const NO_DATA_NOTICE: &str =
    "No data available for the selected filters. Try adjusting the sliders.";

const MISSING: &str = "n/a";

/// Shown in place of an empty track or artist name
const UNNAMED: &str = "(untitled)";

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn billions(v: f64) -> String {
    format!("{:.2}B", v)
}

fn rounded(v: Option<f64>) -> String {
    v.map_or_else(|| MISSING.to_string(), |v| format!("{:.0}", v))
}

fn percent(v: Option<f64>) -> String {
    v.map_or_else(|| MISSING.to_string(), |v| format!("{:.2}%", v))
}

fn name(s: &str) -> &str {
    if s.trim().is_empty() { UNNAMED } else { s }
}

fn month_name(m: u32) -> String {
    m.checked_sub(1)
        .and_then(|i| MONTHS.get(i as usize))
        .map_or_else(|| format!("month {m}"), |name| name.to_string())
}

/// Markdown view of one section's insight scalars
struct Report<'a>(&'a Section);

impl Report<'_> {
    fn ranking(
        f: &mut fmt::Formatter<'_>,
        what: &str,
        leader: &Option<Ranked>,
        runners_up: &[String],
    ) -> fmt::Result {
        match leader {
            Some(r) => writeln!(
                f,
                "- **{}** leads the {} with **{}** streams.",
                name(&r.name),
                what,
                billions(r.value)
            )?,
            None => writeln!(f, "- No {} to rank.", what)?,
        }
        if !runners_up.is_empty() {
            let names: Vec<&str> = runners_up.iter().map(|s| name(s)).collect();
            writeln!(f, "- Followed by: {}.", names.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let section = self.0;
        writeln!(f, "### {}. {}", section.id.number(), section.id.heading())?;

        match &section.insight {
            Insight::TopArtists { leader, runners_up } => {
                Self::ranking(f, "artists", leader, runners_up)?
            }
            Insight::TopSongs { leader, runners_up } => {
                Self::ranking(f, "songs", leader, runners_up)?
            }
            Insight::StreamsVsTempo { mean_bpm, fastest } => {
                writeln!(f, "- Average BPM: **{}**.", rounded(*mean_bpm))?;
                if let Some(r) = fastest {
                    writeln!(
                        f,
                        "- Fastest song: **{}** at **{:.0} BPM**.",
                        name(&r.name),
                        r.value
                    )?;
                }
            }
            Insight::ReleasesByYear { peak, fewest } => {
                if let Some((year, n)) = peak {
                    writeln!(f, "- Most releases: **{}** with **{}** songs.", year, n)?;
                }
                if let Some((year, n)) = fewest {
                    writeln!(f, "- Fewest releases: **{}** with **{}** songs.", year, n)?;
                }
            }
            Insight::FeatureProfile {
                mean_energy,
                mean_danceability,
                mean_valence,
            } => {
                writeln!(f, "- Average energy: **{}**.", percent(*mean_energy))?;
                writeln!(
                    f,
                    "- Average danceability: **{}**.",
                    percent(*mean_danceability)
                )?;
                writeln!(f, "- Average valence: **{}**.", percent(*mean_valence))?;
            }
            Insight::PlaylistPlacement {
                top_platform,
                mean_total,
            } => {
                if let Some((platform, total)) = top_platform {
                    writeln!(
                        f,
                        "- **{}** carries the most placements: **{}**.",
                        platform.label(),
                        format_thousands(*total)
                    )?;
                }
                writeln!(
                    f,
                    "- Average playlists per song: **{}**.",
                    mean_total.map_or_else(|| MISSING.to_string(), format_thousands)
                )?;
            }
            Insight::ReleasesByMonth {
                busiest_month,
                peak_stream_month,
            } => {
                if let Some((m, n)) = busiest_month {
                    writeln!(
                        f,
                        "- Busiest release month: **{}** with **{}** songs.",
                        month_name(*m),
                        n
                    )?;
                }
                if let Some((m, s)) = peak_stream_month {
                    writeln!(
                        f,
                        "- Most streamed month: **{}** with **{}** streams.",
                        month_name(*m),
                        billions(*s)
                    )?;
                }
            }
            Insight::KeyAndMode { key, mode } => {
                if let Some((k, n)) = key {
                    writeln!(f, "- Most common key: **{}** ({} songs).", k, n)?;
                }
                if let Some((m, n)) = mode {
                    writeln!(f, "- Most common mode: **{}** ({} songs).", m, n)?;
                }
            }
        }

        Ok(())
    }
}

/// Markdown summary of one section's insight scalars.
pub fn render(section: &Section) -> String {
    Report(section).to_string()
}
