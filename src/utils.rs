//! Assorted numeric helpers shared by the model and the decoder.

/// Default tolerance for the sum-to-one checks on every distribution.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Smallest state count at which a trellis row is computed in parallel
/// (only meaningful with the `parallel` feature).
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Natural log of a probability, with `ln(0) = -inf` marking "unreachable".
#[inline]
pub fn ln_prob(p: f64) -> f64 {
    if p == 0.0 {
        f64::NEG_INFINITY
    } else {
        p.ln()
    }
}

/// Relative slack, in units of `f64::EPSILON`, within which two log scores
/// count as tied.
const TIE_ULPS: f64 = 4.0;

/// Whether log score `cand` beats `best` by more than rounding noise.
///
/// Products that are equal in linear space can differ by an ulp or two once
/// they become sums of logs (`ln 0.3 + ln 0.8` vs `ln 0.4 + ln 0.6`). Those
/// count as ties, so the earlier candidate keeps its place. Anything beats
/// `-inf` except `-inf`.
#[inline]
pub fn beats(cand: f64, best: f64) -> bool {
    if best == f64::NEG_INFINITY {
        return cand > best;
    }
    cand > best + TIE_ULPS * f64::EPSILON * best.abs().max(1.0)
}

/// Index and value of the maximum, keeping the first occurrence on ties.
///
/// Scans in order, seeded with the first element, and moves on only when
/// [`beats`] says so; a slice of all `-inf` yields index 0. Returns `None`
/// for an empty slice.
#[inline]
pub fn argmax_first(values: &[f64]) -> Option<(usize, f64)> {
    let mut iter = values.iter().copied().enumerate();
    let (mut best_i, mut best) = iter.next()?;
    for (i, v) in iter {
        if beats(v, best) {
            best = v;
            best_i = i;
        }
    }
    Some((best_i, best))
}

#[cfg(test)]
mod tests {
    use super::{argmax_first, beats, ln_prob};

    #[test]
    fn zero_maps_to_negative_infinity() {
        assert_eq!(ln_prob(0.0), f64::NEG_INFINITY);
        assert_eq!(ln_prob(1.0), 0.0);
        assert!((ln_prob(0.5) - 0.5f64.ln()).abs() < 1e-15);
    }

    #[test]
    fn argmax_keeps_first_tie() {
        assert_eq!(argmax_first(&[1.0, 3.0, 3.0, 2.0]), Some((1, 3.0)));
        assert_eq!(argmax_first(&[-1.0, -1.0]), Some((0, -1.0)));
        assert_eq!(argmax_first(&[]), None);
    }

    #[test]
    fn log_rounding_is_a_tie() {
        let a = 0.3f64.ln() + 0.8f64.ln();
        let b = 0.4f64.ln() + 0.6f64.ln();
        assert!(!beats(b, a) && !beats(a, b));
        assert_eq!(argmax_first(&[a, b]).map(|(i, _)| i), Some(0));
        assert_eq!(argmax_first(&[b, a]).map(|(i, _)| i), Some(0));

        assert!(beats(-1.0, -1.0001));
        assert!(beats(-1e9, f64::NEG_INFINITY));
        assert!(!beats(f64::NEG_INFINITY, f64::NEG_INFINITY));
        assert!(!beats(f64::NEG_INFINITY, -3.0));
    }

    #[test]
    fn all_unreachable_picks_index_zero() {
        let v = [f64::NEG_INFINITY; 3];
        assert_eq!(argmax_first(&v), Some((0, f64::NEG_INFINITY)));
    }
}
