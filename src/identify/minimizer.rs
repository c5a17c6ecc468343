use crate::identify::SearchWindow;

/// (√5 − 1) / 2
const GOLDEN_RATIO: f64 = 0.618_033_988_749_894_9;

/// Interval width at which the search stops, in days (under a millisecond).
pub const DEFAULT_TOLERANCE_DAYS: f64 = 1e-8;

const MAX_ITERATIONS: usize = 500;

/// Golden-section search for the time minimising `objective` over `window`.
///
/// The bracket is widened by an eighth of the window span on each side. If
/// the bracket midpoint drifts further from the window centre than half the
/// window span, the search gives up and returns `Ok(None)`: the minimum lies
/// outside the window. The objective is assumed unimodal over the window.
///
/// `window` may run backwards; all arithmetic works on the directed pair.
/// The first error returned by `objective` aborts the search.
pub fn minimize<F, E>(
    window: &SearchWindow,
    tolerance: f64,
    mut objective: F,
) -> Result<Option<f64>, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let bail_center = window.midpoint();
    let bail_radius = window.half_span();

    let margin = (window.end - window.begin) / 8.0;
    let mut a = window.begin - margin;
    let mut b = window.end + margin;

    let mut c = b - GOLDEN_RATIO * (b - a);
    let mut d = a + GOLDEN_RATIO * (b - a);
    let mut fc = objective(c)?;
    let mut fd = objective(d)?;

    for _ in 0..MAX_ITERATIONS {
        if (b - a).abs() <= tolerance {
            break;
        }
        if ((a + b) / 2.0 - bail_center).abs() > bail_radius {
            return Ok(None);
        }

        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - GOLDEN_RATIO * (b - a);
            fc = objective(c)?;
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + GOLDEN_RATIO * (b - a);
            fd = objective(d)?;
        }
    }

    Ok(Some((a + b) / 2.0))
}
