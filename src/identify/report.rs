use std::io::{self, Write};

use serde::Deserialize;

use crate::identify::SkyTarget;
use crate::predict::Match;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutputFormat {
    /// Four human-readable lines per match
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Announce a new target direction. Text output only.
pub fn write_session_header<W: Write>(
    out: &mut W,
    format: OutputFormat,
    target: &SkyTarget,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(
            out,
            " -- RA/Dec -- {:.6},{:.6}",
            target.ra_deg(),
            target.dec_deg()
        ),
        OutputFormat::Json => Ok(()),
    }
}

pub fn write_match<W: Write>(out: &mut W, format: OutputFormat, found: &Match) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "Sat: {} ({})", found.satellite, found.norad_id)?;
            writeln!(out, "Angle: {:.6}", found.angle_deg)?;
            writeln!(out, "Range/Alt: {:.6} {:.6}", found.range_km, found.altitude_km)?;
            writeln!(out, "Time: {}:{:.6}", found.timestamp, found.fractional_seconds)
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, found)?;
            writeln!(out)
        }
    }
}
