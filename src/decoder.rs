//! Viterbi decoder.
//!
//! Dynamic programming over the trellis, in the log domain:
//! 1. Initialization: `δ[0][s] = ln π[s] + ln b[s][o0]`.
//! 2. Recursion: `δ[t][s] = max_p (δ[t-1][p] + ln a[p][s] + ln b[s][ot])`,
//!    recording the winning `p` as backpointer.
//! 3. Termination: pick the best final state and walk the backpointers.
//!
//! Predecessors are scanned in declared state order and a later state only
//! takes over when it wins by more than log rounding noise (see
//! [`beats`](crate::utils::beats)), so on equal scores the first state wins,
//! both for predecessors and for the final state. With the `parallel` feature, large rows are split across states;
//! each state still scans its predecessors sequentially, which keeps the
//! result bit-identical to the serial run.

use crate::error::{DecodeError, Result};
use crate::model::HmmModel;
use crate::trellis::{Backpointers, Domain, Trellis};
use crate::utils::{argmax_first, beats, DEFAULT_PARALLEL_THRESHOLD};
use crate::vocab::Symbol;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::HashSet;

/// Outcome of one decode: the most probable state path and its trellis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Decoding<S, O> {
    path: Vec<S>,
    state_indices: Vec<usize>,
    log_probability: f64,
    trellis: Trellis<S, O>,
}

impl<S, O> Decoding<S, O> {
    /// Most probable state sequence, one state per observation.
    pub fn path(&self) -> &[S] {
        &self.path
    }

    /// The same path as indices into the declared state order.
    pub fn state_indices(&self) -> &[usize] {
        &self.state_indices
    }

    /// Natural log of the joint probability of the path and the observations.
    /// `-inf` when no path can produce the observations.
    pub fn log_probability(&self) -> f64 {
        self.log_probability
    }

    /// Joint probability in the linear domain; may underflow to 0.0.
    pub fn probability(&self) -> f64 {
        self.log_probability.exp()
    }

    /// Log-domain trellis the path was derived from.
    pub fn trellis(&self) -> &Trellis<S, O> {
        &self.trellis
    }

    pub fn into_parts(self) -> (Vec<S>, Trellis<S, O>) {
        (self.path, self.trellis)
    }
}

/// Viterbi decoder configuration.
///
/// ```
/// use hmm_viterbi::{Decoder, HmmModel};
///
/// let model = HmmModel::from_dense(
///     vec![0, 1],
///     vec![0, 1],
///     vec![0.6, 0.4],
///     vec![vec![0.7, 0.3], vec![0.4, 0.6]],
///     vec![vec![0.5, 0.5], vec![0.1, 0.9]],
/// )
/// .unwrap();
/// let decoding = Decoder::default().decode(&model, &[0, 1, 1, 0]).unwrap();
/// assert_eq!(decoding.path(), &[0, 0, 0, 0]);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Decoder {
    parallel_threshold: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_parallel_threshold(DEFAULT_PARALLEL_THRESHOLD)
    }

    /// Rows with at least `threshold` states are filled in parallel when the
    /// `parallel` feature is enabled. A threshold of 0 behaves like 1.
    pub fn with_parallel_threshold(threshold: usize) -> Self {
        Self {
            parallel_threshold: threshold.max(1),
        }
    }

    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Decode the most probable state path for `observations`.
    ///
    /// # Errors
    /// `EmptyInput` for an empty sequence; `UnknownObservation` for a symbol
    /// outside the model's alphabet. Both are reported before any work starts.
    pub fn decode<S: Symbol, O: Symbol>(
        &self,
        model: &HmmModel<S, O>,
        observations: &[O],
    ) -> Result<Decoding<S, O>> {
        if observations.is_empty() {
            return Err(DecodeError::EmptyInput("observation sequence is empty"));
        }
        let symbols = model.symbol_indices(observations)?;

        let n = model.n_states();
        let m = model.n_symbols();
        let steps = symbols.len();

        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("viterbi_decode", states = n, steps);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let log_pi = model.log_initial();
        let log_b = model.log_emission();
        let mut values = vec![f64::NEG_INFINITY; steps * n];
        let mut back = Backpointers::new(steps, n);

        {
            #[cfg(feature = "tracing")]
            let _init = tracing::trace_span!("initialize").entered();
            let o0 = symbols[0];
            for (s, v) in values[..n].iter_mut().enumerate() {
                *v = log_pi[s] + log_b[s * m + o0];
            }
        }

        {
            #[cfg(feature = "tracing")]
            let _rec = tracing::trace_span!("recursion").entered();
            for (t, &sym) in symbols.iter().enumerate().skip(1) {
                let (done, rest) = values.split_at_mut(t * n);
                let prev = &done[(t - 1) * n..];
                let row = Row {
                    prev,
                    log_a: model.log_transition(),
                    emit: log_b,
                    n,
                    m,
                    sym,
                };
                self.fill_row(&row, &mut rest[..n], back.row_mut(t));
            }
        }

        #[cfg(feature = "tracing")]
        let _term = tracing::trace_span!("termination").entered();
        let last = &values[(steps - 1) * n..];
        let (best_state, log_probability) =
            argmax_first(last).unwrap_or((0, f64::NEG_INFINITY));
        let state_indices = back.walk(best_state);
        let states = model.states();
        let path = state_indices.iter().map(|&s| states[s].clone()).collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(log_probability, best_state, "decoded");

        Ok(Decoding {
            path,
            state_indices,
            log_probability,
            trellis: Trellis::new(states.to_vec(), observations.to_vec(), values, Domain::Log),
        })
    }

    #[cfg(feature = "parallel")]
    fn fill_row(&self, row: &Row<'_>, out: &mut [f64], back: &mut [usize]) {
        if row.n < self.parallel_threshold {
            return fill_row_serial(row, out, back);
        }
        out.par_iter_mut()
            .zip(back.par_iter_mut())
            .enumerate()
            .for_each(|(s_to, (val, bp))| {
                let (arg, best) = row.best_predecessor(s_to);
                *val = best;
                *bp = arg;
            });
    }

    #[cfg(not(feature = "parallel"))]
    fn fill_row(&self, row: &Row<'_>, out: &mut [f64], back: &mut [usize]) {
        fill_row_serial(row, out, back)
    }
}

/// Inputs for computing one trellis row from the completed previous row.
struct Row<'a> {
    prev: &'a [f64],
    log_a: &'a [f64],
    emit: &'a [f64],
    n: usize,
    m: usize,
    sym: usize,
}

impl Row<'_> {
    /// Best predecessor of `s_to` and the resulting score; first index wins ties.
    #[inline]
    fn best_predecessor(&self, s_to: usize) -> (usize, f64) {
        let emit = self.emit[s_to * self.m + self.sym];
        let mut best = f64::NEG_INFINITY;
        let mut arg = 0;
        for (s_from, &p) in self.prev.iter().enumerate() {
            let cand = p + self.log_a[s_from * self.n + s_to] + emit;
            if beats(cand, best) {
                best = cand;
                arg = s_from;
            }
        }
        (arg, best)
    }
}

fn fill_row_serial(row: &Row<'_>, out: &mut [f64], back: &mut [usize]) {
    for (s_to, (val, bp)) in out.iter_mut().zip(back.iter_mut()).enumerate() {
        let (arg, best) = row.best_predecessor(s_to);
        *val = best;
        *bp = arg;
    }
}

/// Decode straight from mapping-shaped distributions.
///
/// Builds a validated [`HmmModel`] over `states` (in the given order) and
/// runs the default [`Decoder`]. The returned trellis is in the log domain.
///
/// ```
/// let decoding = hmm_viterbi::decode(
///     &[0, 1, 1, 0],
///     &[0, 1],
///     [(0, 0.6), (1, 0.4)],
///     [(0, [(0, 0.7), (1, 0.3)]), (1, [(0, 0.4), (1, 0.6)])],
///     [(0, [(0, 0.5), (1, 0.5)]), (1, [(0, 0.1), (1, 0.9)])],
/// )
/// .unwrap();
/// assert_eq!(decoding.path(), &[0, 0, 0, 0]);
/// ```
///
/// # Errors
/// `EmptyInput` if `observations` or `states` is empty, `UnknownObservation`
/// for an observed symbol missing from any state's emission row,
/// `InvalidModel` for a malformed distribution.
pub fn decode<S, O, I, T, TR, E, ER>(
    observations: &[O],
    states: &[S],
    initial: I,
    transition: T,
    emission: E,
) -> Result<Decoding<S, O>>
where
    S: Symbol,
    O: Symbol,
    I: IntoIterator<Item = (S, f64)>,
    T: IntoIterator<Item = (S, TR)>,
    TR: IntoIterator<Item = (S, f64)>,
    E: IntoIterator<Item = (S, ER)>,
    ER: IntoIterator<Item = (O, f64)>,
{
    if observations.is_empty() {
        return Err(DecodeError::EmptyInput("observation sequence is empty"));
    }
    if states.is_empty() {
        return Err(DecodeError::EmptyInput("state set is empty"));
    }
    let emission: Vec<(S, Vec<(O, f64)>)> = emission
        .into_iter()
        .map(|(state, row)| (state, row.into_iter().collect()))
        .collect();
    check_emission_coverage(observations, &emission)?;
    let model = HmmModel::builder(states.iter().cloned())
        .with_initial(initial)
        .with_transition(transition)
        .with_emission(emission)
        .build()?;
    Decoder::default().decode(&model, observations)
}

/// Every observed symbol needs an emission entry in every row.
///
/// Gaps in symbols the sequence never uses are left to model validation,
/// which reports them as `InvalidModel`.
fn check_emission_coverage<S, O: Symbol>(
    observations: &[O],
    emission: &[(S, Vec<(O, f64)>)],
) -> Result<()> {
    let rows: Vec<HashSet<&O>> = emission
        .iter()
        .map(|(_, row)| row.iter().map(|(o, _)| o).collect())
        .collect();
    for (position, o) in observations.iter().enumerate() {
        if rows.iter().any(|row| !row.contains(o)) {
            return Err(DecodeError::UnknownObservation {
                position,
                observation: format!("{o:?}"),
            });
        }
    }
    Ok(())
}
