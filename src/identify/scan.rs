use std::io::BufRead;

use crate::identify::{minimize, SearchWindow, SeparationModel, SkyTarget, DEFAULT_TOLERANCE_DAYS};
use crate::predict::{
    Candidate, GroundStation, Match, PredictError, Separation, TleReader, TleRecord,
};

/// Read-only context shared by every candidate of one target direction.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub station: GroundStation,
    pub target: SkyTarget,
    pub window: SearchWindow,
    pub max_angle_deg: f64,
    pub model: SeparationModel,
    pub tolerance: f64,
}

/// Result of searching one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The search left the window without settling on a minimum.
    NoMinimum,
    /// Closest approach found, but not close enough to report.
    AboveThreshold(Separation),
    Match(Match),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub candidates: usize,
    pub matches: usize,
    pub no_minimum: usize,
    pub skipped: usize,
}

impl Session {
    pub fn new(
        station: GroundStation,
        target: SkyTarget,
        window: SearchWindow,
        max_angle_deg: f64,
        model: SeparationModel,
    ) -> Self {
        Self {
            station,
            target,
            window,
            max_angle_deg,
            model,
            tolerance: DEFAULT_TOLERANCE_DAYS,
        }
    }

    pub fn separation(&self, candidate: &Candidate, jd: f64) -> Result<Separation, PredictError> {
        self.model
            .separation(&self.station, &self.target, candidate, jd)
    }

    /// Find the closest approach of `candidate` to the target within the window.
    pub fn evaluate(&self, candidate: &Candidate) -> Result<Outcome, PredictError> {
        let found = minimize(&self.window, self.tolerance, |jd| {
            self.separation(candidate, jd).map(|s| s.angle_deg)
        })?;

        let Some(jd) = found else {
            log::debug!("{}: no closest approach inside the window", candidate.name);
            return Ok(Outcome::NoMinimum);
        };

        let separation = self.separation(candidate, jd)?;
        if separation.angle_deg < self.max_angle_deg {
            Ok(Outcome::Match(Match::new(candidate, &separation, jd)?))
        } else {
            Ok(Outcome::AboveThreshold(separation))
        }
    }

    /// Lazily search every entry of a catalog stream.
    pub fn scan<R: BufRead>(&self, source: R) -> Scan<'_, R> {
        Scan {
            session: self,
            reader: TleReader::new(source),
            stats: ScanStats::default(),
        }
    }
}

/// Iterator over the matches of one catalog pass.
///
/// Entries that fail to parse or propagate are logged and skipped. Only a
/// read error on the source itself is yielded as an `Err`, after which the
/// scan ends.
pub struct Scan<'a, R> {
    session: &'a Session,
    reader: TleReader<R>,
    stats: ScanStats,
}

impl<R> Scan<'_, R> {
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    fn tally(
        &mut self,
        record: &TleRecord,
        outcome: Result<Outcome, PredictError>,
    ) -> Option<Match> {
        match outcome {
            Ok(Outcome::Match(found)) => {
                self.stats.matches += 1;
                return Some(found);
            }
            Ok(Outcome::NoMinimum) => self.stats.no_minimum += 1,
            Ok(Outcome::AboveThreshold(separation)) => log::debug!(
                "{}: closest approach {:.3} deg at {:.0} km is above threshold",
                record.display_name(),
                separation.angle_deg,
                separation.range_km
            ),
            Err(e) => {
                log::warn!("Skipping {}: {}", record.display_name(), e);
                self.stats.skipped += 1;
            }
        }
        None
    }
}

impl<R: BufRead> Iterator for Scan<'_, R> {
    type Item = Result<Match, PredictError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.reader.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            };
            self.stats.candidates += 1;

            let outcome =
                Candidate::from_record(&record).and_then(|candidate| self.session.evaluate(&candidate));

            if let Some(found) = self.tally(&record, outcome) {
                return Some(Ok(found));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identify::WindowPolicy;
    use crate::predict::{observe, teme_to_ecef_position, to_julian};
    use chrono::{Duration, TimeZone, Utc};
    use std::io::Cursor;

    const ISS_LINE1: &str = "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    fn station() -> GroundStation {
        GroundStation::new(40.0, -75.0, 100.0)
    }

    fn window() -> SearchWindow {
        let policy = WindowPolicy {
            before: Duration::minutes(1),
            after: Duration::minutes(1),
        };
        policy.around(Utc.with_ymd_and_hms(2008, 9, 20, 13, 0, 0).unwrap())
    }

    fn iss_catalog() -> String {
        format!("ISS (ZARYA)\n{}\n{}\n", ISS_LINE1, ISS_LINE2)
    }

    // Molniya-type debris, and the same entry with its mean motion collapsed
    // so that sgp4 rejects the perturbed eccentricity at epoch.
    const MOLNIYA_LINE1: &str = "1 26975U 78066F   06174.85818871  .00000620  00000-0  10000-3 0  6809";
    const MOLNIYA_LINE2: &str = "2 26975  68.4714 236.1303 5602877 123.7484 302.5767  2.05657553 67521";
    const DIVERGING_LINE1: &str = "1 33334U 78066F   06174.85818871  .00000620  00000-0  10000-3 0  6806";
    const DIVERGING_LINE2: &str = "2 33334  68.4714 236.1303 5602877 123.7484 302.5767  0.00001000 67521";

    fn candidate(name: &str, line1: &str, line2: &str) -> Candidate {
        Candidate::from_record(&TleRecord {
            name: Some(name.to_string()),
            line1: line1.to_string(),
            line2: line2.to_string(),
        })
        .unwrap()
    }

    fn iss() -> Candidate {
        candidate("ISS (ZARYA)", ISS_LINE1, ISS_LINE2)
    }

    /// Target direction along the ISS line of sight at the window midpoint.
    fn iss_direction_at_midpoint() -> [f64; 3] {
        let observation = observe(&station(), &iss(), window().midpoint()).unwrap();
        observation.line_of_sight()
    }

    fn target_from(unit: [f64; 3]) -> SkyTarget {
        SkyTarget::from_radians(unit[1].atan2(unit[0]), unit[2].asin())
    }

    fn session(target: SkyTarget) -> Session {
        Session::new(station(), target, window(), 1.0, SeparationModel::Direct)
    }

    fn collect(session: &Session, catalog: &str) -> (Vec<Match>, ScanStats) {
        let mut scan = session.scan(Cursor::new(catalog.to_string()));
        let matches = scan.by_ref().collect::<Result<Vec<_>, _>>().unwrap();
        (matches, scan.stats())
    }

    #[test]
    fn reports_candidate_crossing_the_target() {
        let session = session(target_from(iss_direction_at_midpoint()));
        let (matches, stats) = collect(&session, &iss_catalog());

        assert_eq!(matches.len(), 1);
        let found = &matches[0];
        assert_eq!(found.satellite, "ISS (ZARYA)");
        assert_eq!(found.norad_id, 25544);
        assert!(found.angle_deg < 1e-3, "angle was {}", found.angle_deg);
        assert!(
            (to_julian(found.time) - window().midpoint()).abs() < 1e-6,
            "found {} expected {}",
            to_julian(found.time),
            window().midpoint()
        );
        assert!(found.range_km > 0.0);
        assert!(found.altitude_km > 300.0 && found.altitude_km < 450.0);
        assert!((0.0..1.0).contains(&found.fractional_seconds));
        assert_eq!(
            stats,
            ScanStats {
                candidates: 1,
                matches: 1,
                no_minimum: 0,
                skipped: 0,
            }
        );
    }

    #[test]
    fn ignores_candidate_far_from_the_target() {
        let u = iss_direction_at_midpoint();
        let session = session(target_from([-u[0], -u[1], -u[2]]));
        let (matches, stats) = collect(&session, &iss_catalog());

        assert!(matches.is_empty());
        assert_eq!(stats.candidates, 1);
        assert_eq!(stats.matches, 0);
    }

    #[test]
    fn threshold_is_strict() {
        let mut session = session(target_from(iss_direction_at_midpoint()));
        session.max_angle_deg = 0.0;
        let (matches, _) = collect(&session, &iss_catalog());
        assert!(matches.is_empty());
    }

    #[test]
    fn skips_broken_entries_and_keeps_scanning() {
        let session = session(target_from(iss_direction_at_midpoint()));
        let catalog = format!("BROKEN\n1 garbage\n2 garbage\n{}", iss_catalog());
        let (matches, stats) = collect(&session, &catalog);

        assert_eq!(matches.len(), 1);
        assert_eq!(stats.candidates, 2);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn refracted_model_matches_candidate_above_the_horizon() {
        // Stand five degrees of latitude south of the ISS ground point at the
        // window midpoint, so the pass is well above the horizon.
        let jd = window().midpoint();
        let reference = observe(&station(), &iss(), jd).unwrap();
        let ground = teme_to_ecef_position(reference.satellite_teme_km, reference.sidereal_rad);
        let latitude = ground[2].atan2(ground[0].hypot(ground[1])).to_degrees();
        let longitude = ground[1].atan2(ground[0]).to_degrees();
        let station = GroundStation::new(latitude - 5.0, longitude, 100.0);

        let observation = observe(&station, &iss(), jd).unwrap();
        let elevation = observation.look.elevation_rad.to_degrees();
        assert!(elevation > 10.0 && elevation < 80.0, "elevation was {}", elevation);

        let target = target_from(observation.line_of_sight());
        let direct = SeparationModel::Direct.angle_deg(&station, &target, &observation);
        let refracted = SeparationModel::Refracted.angle_deg(&station, &target, &observation);
        assert!(direct < 1e-6, "direct angle was {}", direct);
        assert!(
            refracted > 0.005 && refracted < 0.2,
            "refracted angle was {}",
            refracted
        );

        let session = Session::new(station, target, window(), 0.5, SeparationModel::Refracted);
        let (matches, stats) = collect(&session, &iss_catalog());

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].norad_id, 25544);
        assert!(matches[0].angle_deg <= refracted + 1e-6, "angle was {}", matches[0].angle_deg);
        assert!((to_julian(matches[0].time) - jd).abs() < 1.0 / 1440.0);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn skips_candidate_that_fails_to_propagate() {
        let molniya = candidate("MOLNIYA DEB", MOLNIYA_LINE1, MOLNIYA_LINE2);
        let diverging = candidate("DIVERGING", DIVERGING_LINE1, DIVERGING_LINE2);

        let policy = WindowPolicy {
            before: Duration::minutes(1),
            after: Duration::minutes(1),
        };
        let window = policy.around(molniya.elements.datetime.and_utc());
        let station = station();
        let target = target_from(
            observe(&station, &molniya, window.midpoint())
                .unwrap()
                .line_of_sight(),
        );
        let session = Session::new(station, target, window, 1.0, SeparationModel::Direct);

        assert!(matches!(
            session.evaluate(&diverging),
            Err(PredictError::Propagation(_))
        ));

        let catalog = format!(
            "DIVERGING\n{}\n{}\nMOLNIYA DEB\n{}\n{}\n",
            DIVERGING_LINE1, DIVERGING_LINE2, MOLNIYA_LINE1, MOLNIYA_LINE2
        );
        let (matches, stats) = collect(&session, &catalog);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].norad_id, 26975);
        assert_eq!(
            stats,
            ScanStats {
                candidates: 2,
                matches: 1,
                no_minimum: 0,
                skipped: 1,
            }
        );
    }

    #[test]
    fn repeated_scans_agree() {
        let session = session(target_from(iss_direction_at_midpoint()));
        let catalog = format!("{}{}", iss_catalog(), iss_catalog());
        let (first, _) = collect(&session, &catalog);
        let (second, _) = collect(&session, &catalog);
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_catalog_yields_nothing() {
        let session = session(SkyTarget::from_degrees(0.0, 0.0));
        let (matches, stats) = collect(&session, "\n\n");
        assert!(matches.is_empty());
        assert_eq!(stats, ScanStats::default());
    }

    #[test]
    fn evaluate_reports_bail_out_for_monotonic_track() {
        // A target the ISS moves steadily towards: the closest approach lies
        // after the window closes.
        let w = window();
        let station = station();
        let later = to_julian(Utc.with_ymd_and_hms(2008, 9, 20, 13, 0, 0).unwrap())
            + 3.0 / 1440.0;
        let ahead = observe(&station, &iss(), later).unwrap().line_of_sight();
        let session = Session::new(station, target_from(ahead), w, 1.0, SeparationModel::Direct);

        assert_eq!(session.evaluate(&iss()).unwrap(), Outcome::NoMinimum);
    }
}
