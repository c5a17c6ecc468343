use std::io::BufRead;

use sgp4::{Constants, Elements};

use crate::predict::PredictError;

/// Raw text of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TleRecord {
    pub name: Option<String>,
    pub line1: String,
    pub line2: String,
}

impl TleRecord {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.line1)
    }
}

/// A propagatable orbit built from one catalog entry.
pub struct Candidate {
    pub name: String,
    pub norad_id: u32,
    pub elements: Elements,
    pub constants: Constants,
}

impl Candidate {
    pub fn from_record(record: &TleRecord) -> Result<Self, PredictError> {
        let invalid = |message: String| PredictError::InvalidTle {
            entry: record.display_name().to_string(),
            message,
        };

        let elements = Elements::from_tle(
            record.name.clone(),
            record.line1.trim_end().as_bytes(),
            record.line2.trim_end().as_bytes(),
        )
        .map_err(|e| invalid(e.to_string()))?;

        let constants = Constants::from_elements(&elements).map_err(|e| invalid(e.to_string()))?;

        let name = record
            .name
            .as_deref()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("NORAD {}", elements.norad_id));

        Ok(Self {
            name,
            norad_id: elements.norad_id as u32,
            elements,
            constants,
        })
    }
}

/// Strip any run of trailing carriage returns and line feeds.
pub fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

/// Lazily reads catalog entries from a line-oriented source.
///
/// Entries are three lines (name, line 1, line 2); a `1 `/`2 ` pair with no
/// name line is accepted as well. Blank lines are skipped. An incomplete
/// trailing entry ends the stream.
pub struct TleReader<R> {
    source: R,
    failed: bool,
}

impl<R: BufRead> TleReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            failed: false,
        }
    }

    fn next_line(&mut self) -> std::io::Result<Option<String>> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.source.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            let line = strip_line_ending(&buf);
            if !line.trim().is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }

    fn read_record(&mut self) -> Result<Option<TleRecord>, PredictError> {
        let Some(first) = self.next_line()? else {
            return Ok(None);
        };
        let Some(second) = self.next_line()? else {
            return Ok(None);
        };

        if first.starts_with("1 ") && second.starts_with("2 ") {
            return Ok(Some(TleRecord {
                name: None,
                line1: first,
                line2: second,
            }));
        }

        let Some(third) = self.next_line()? else {
            return Ok(None);
        };
        Ok(Some(TleRecord {
            name: Some(first),
            line1: second,
            line2: third,
        }))
    }
}

impl<R: BufRead> Iterator for TleReader<R> {
    type Item = Result<TleRecord, PredictError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let record = self.read_record();
        if record.is_err() {
            self.failed = true;
        }
        record.transpose()
    }
}
