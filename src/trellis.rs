//! Trellis and backpointer storage.
//!
//! A [`Trellis`] is the T×N table of best-path scores produced by one decode,
//! labelled with the states (columns) and observations (rows) it was computed
//! for, so a plotting or reporting collaborator can draw it without access to
//! the model.
//!
//! [`Backpointers`] is the matching T×N arena of predecessor indices. It never
//! leaves the decoder; a single backward walk turns it into the decoded path.

use crate::utils::argmax_first;
use std::fmt;

/// Numeric domain of the values stored in a [`Trellis`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Domain {
    /// Plain probabilities in [0,1].
    Linear,
    /// Natural logarithms of probabilities; `-inf` marks an unreachable cell.
    Log,
}

/// T×N table of best-path scores.
///
/// Cell `(t, s)` holds the highest probability of any state path of length
/// `t + 1` that ends in state `s` and explains `observations[..=t]`, in the
/// domain reported by [`Trellis::domain`]. The decoder always returns
/// [`Domain::Log`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Trellis<S, O> {
    states: Vec<S>,
    observations: Vec<O>,
    /// row-major [t * n + s]
    values: Vec<f64>,
    domain: Domain,
}

impl<S, O> Trellis<S, O> {
    pub(crate) fn new(
        states: Vec<S>,
        observations: Vec<O>,
        values: Vec<f64>,
        domain: Domain,
    ) -> Self {
        debug_assert_eq!(values.len(), states.len() * observations.len());
        Self {
            states,
            observations,
            values,
            domain,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Column labels, in declared state order.
    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// Row labels: the decoded observation sequence.
    pub fn observations(&self) -> &[O] {
        &self.observations
    }

    /// Number of time steps T.
    pub fn steps(&self) -> usize {
        self.observations.len()
    }

    /// Number of states N.
    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    /// Value at time `t` for the state with index `state`.
    pub fn value(&self, t: usize, state: usize) -> Option<f64> {
        if t >= self.steps() || state >= self.n_states() {
            return None;
        }
        Some(self.values[t * self.n_states() + state])
    }

    /// All state values at time `t`.
    ///
    /// # Panics
    /// Panics if `t >= self.steps()`.
    pub fn row(&self, t: usize) -> &[f64] {
        let n = self.n_states();
        &self.values[t * n..(t + 1) * n]
    }

    /// Rows in time order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.n_states())
    }

    /// Flat row-major view, `[t * n + s]`.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl<S: Clone, O: Clone> Trellis<S, O> {
    /// Copy of this trellis in [`Domain::Linear`].
    ///
    /// Long sequences underflow to 0.0 here; the log-domain original keeps
    /// the full range.
    pub fn to_linear(&self) -> Self {
        let values = match self.domain {
            Domain::Linear => self.values.clone(),
            Domain::Log => self.values.iter().map(|v| v.exp()).collect(),
        };
        Self::new(self.states.clone(), self.observations.clone(), values, Domain::Linear)
    }

    /// Per time step, the state with the highest value at that step
    /// (first in declared order on ties).
    ///
    /// This is what a trellis plot marks column by column. It is not the
    /// decoded path in general: the decoded path is the best *connected*
    /// sequence.
    pub fn column_argmax(&self) -> Vec<S> {
        self.rows()
            .filter_map(argmax_first)
            .map(|(s, _)| self.states[s].clone())
            .collect()
    }
}

impl<S: fmt::Debug, O: fmt::Debug> fmt::Display for Trellis<S, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell: usize = 12;
        let state_labels: Vec<String> = self.states.iter().map(|s| format!("{s:?}")).collect();
        let obs_labels: Vec<String> = self
            .observations
            .iter()
            .map(|o| format!("{o:?}"))
            .collect();
        let label_w = state_labels
            .iter()
            .map(String::len)
            .chain(std::iter::once("state".len()))
            .max()
            .unwrap_or(0);

        write!(f, "{:<label_w$}", "state")?;
        for label in &obs_labels {
            write!(f, " {label:>cell$}")?;
        }
        writeln!(f)?;

        let n = self.n_states();
        for (s, label) in state_labels.iter().enumerate() {
            write!(f, "{label:<label_w$}")?;
            for t in 0..self.steps() {
                write!(f, " {:>cell$.4}", self.values[t * n + s])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// T×N arena of predecessor indices.
#[derive(Clone, Debug)]
pub(crate) struct Backpointers {
    n_states: usize,
    /// row-major [t * n + s]; row 0 is unused
    data: Vec<usize>,
}

impl Backpointers {
    pub(crate) fn new(steps: usize, n_states: usize) -> Self {
        Self {
            n_states,
            data: vec![0; steps * n_states],
        }
    }

    #[inline]
    pub(crate) fn row_mut(&mut self, t: usize) -> &mut [usize] {
        let n = self.n_states;
        &mut self.data[t * n..(t + 1) * n]
    }

    #[inline]
    pub(crate) fn get(&self, t: usize, state: usize) -> usize {
        self.data[t * self.n_states + state]
    }

    /// State indices of the path ending in `last` at the final step.
    pub(crate) fn walk(&self, last: usize) -> Vec<usize> {
        let steps = if self.n_states == 0 {
            0
        } else {
            self.data.len() / self.n_states
        };
        let mut path = Vec::with_capacity(steps);
        if steps == 0 {
            return path;
        }
        let mut s = last;
        path.push(s);
        for t in (1..steps).rev() {
            s = self.get(t, s);
            path.push(s);
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trellis<char, u8> {
        Trellis::new(
            vec!['a', 'b'],
            vec![0, 1, 0],
            vec![0.3, 0.04, 0.105, 0.081, 0.03, 0.04],
            Domain::Linear,
        )
    }

    #[test]
    fn shape_and_access() {
        let tr = sample();
        assert_eq!(tr.steps(), 3);
        assert_eq!(tr.n_states(), 2);
        assert_eq!(tr.row(1), &[0.105, 0.081]);
        assert_eq!(tr.value(2, 1), Some(0.04));
        assert_eq!(tr.value(3, 0), None);
        assert_eq!(tr.value(0, 2), None);
        assert_eq!(tr.rows().count(), 3);
    }

    #[test]
    fn column_argmax_is_per_step() {
        assert_eq!(sample().column_argmax(), vec!['a', 'a', 'b']);
    }

    #[test]
    fn log_to_linear() {
        let tr = Trellis::new(
            vec![0u8],
            vec![0u8, 0],
            vec![0.5f64.ln(), f64::NEG_INFINITY],
            Domain::Log,
        );
        let lin = tr.to_linear();
        assert_eq!(lin.domain(), Domain::Linear);
        assert!((lin.row(0)[0] - 0.5).abs() < 1e-15);
        assert_eq!(lin.row(1)[0], 0.0);
        assert_eq!(lin.to_linear(), lin);
    }

    #[test]
    fn display_lays_out_states_as_rows() {
        let text = sample().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("state"));
        assert!(lines[1].starts_with("'a'"));
        assert!(lines[1].contains("0.3000"));
        assert!(lines[2].contains("0.0810"));
    }

    #[test]
    fn backpointer_walk() {
        let mut bp = Backpointers::new(3, 2);
        bp.row_mut(1).copy_from_slice(&[0, 0]);
        bp.row_mut(2).copy_from_slice(&[1, 0]);
        assert_eq!(bp.walk(0), vec![0, 1, 0]);
        assert_eq!(bp.walk(1), vec![0, 0, 1]);
    }

    #[test]
    fn single_step_walk() {
        let bp = Backpointers::new(1, 4);
        assert_eq!(bp.walk(3), vec![3]);
    }
}
