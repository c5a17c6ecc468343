use std::io::{self, BufRead};

use crate::identify::SkyTarget;

/// Reads `ra,dec` pairs (degrees), one per line.
///
/// Blank lines are skipped. The first line that does not parse ends the
/// stream.
pub struct TargetReader<R> {
    source: R,
    done: bool,
}

impl<R: BufRead> TargetReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            done: false,
        }
    }
}

pub fn parse_target(line: &str) -> Option<SkyTarget> {
    let (ra, dec) = line.split_once(',')?;
    let ra: f64 = ra.trim().parse().ok()?;
    let dec: f64 = dec.trim().parse().ok()?;
    if !ra.is_finite() || !dec.is_finite() {
        return None;
    }
    Some(SkyTarget::from_degrees(ra, dec))
}

impl<R: BufRead> Iterator for TargetReader<R> {
    type Item = io::Result<SkyTarget>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        while !self.done {
            line.clear();
            match self.source.read_line(&mut line) {
                Ok(0) => self.done = true,
                Ok(_) if line.trim().is_empty() => {}
                Ok(_) => match parse_target(&line) {
                    Some(target) => return Some(Ok(target)),
                    None => {
                        log::debug!("Stopping at unparsable target line {:?}", line.trim());
                        self.done = true;
                    }
                },
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}
