//! Validated, dense hidden Markov model.
//!
//! An [`HmmModel`] is immutable once built. Every distribution is checked at
//! construction time (values in [0,1], rows summing to one within the
//! configured tolerance), then stored twice: as given, for the accessors, and
//! as natural logs in row-major arrays, for the decoder.
//!
//! Models are usually assembled from mappings through
//! [`HmmModel::builder`], or from ready-made matrices through
//! [`HmmModel::from_dense`].

use crate::builder::HmmModelBuilder;
use crate::error::{DecodeError, Result};
use crate::utils::{ln_prob, DEFAULT_TOLERANCE};
use crate::vocab::{Symbol, Vocabulary};

/// Discrete HMM over states `S` and observation symbols `O`.
#[derive(Clone, Debug)]
pub struct HmmModel<S, O> {
    states: Vocabulary<S>,
    alphabet: Vocabulary<O>,
    /// initial probabilities [s]
    initial: Vec<f64>,
    /// transition probabilities [from * n + to]
    transition: Vec<f64>,
    /// emission probabilities [s * m + symbol]
    emission: Vec<f64>,
    log_initial: Vec<f64>,
    log_transition: Vec<f64>,
    log_emission: Vec<f64>,
    tolerance: f64,
}

impl<S: Symbol, O: Symbol> HmmModel<S, O> {
    /// Start assembling a model over `states`, in their declared order.
    pub fn builder<I>(states: I) -> HmmModelBuilder<S, O>
    where
        I: IntoIterator<Item = S>,
    {
        HmmModelBuilder::new(states)
    }

    /// Build from matrices whose rows and columns follow the order of
    /// `states` and `alphabet`.
    ///
    /// `transition[from][to]` and `emission[state][symbol]`. Uses the default
    /// tolerance; go through [`HmmModel::builder`] to change it.
    ///
    /// # Errors
    /// `EmptyInput` for an empty state set, `InvalidModel` for mismatched
    /// dimensions, duplicate identifiers or invalid distributions.
    pub fn from_dense(
        states: Vec<S>,
        alphabet: Vec<O>,
        initial: Vec<f64>,
        transition: Vec<Vec<f64>>,
        emission: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if states.is_empty() {
            return Err(DecodeError::EmptyInput("state set is empty"));
        }
        let states = Vocabulary::new(states)?;
        let alphabet = Vocabulary::new(alphabet)?;
        let n = states.len();
        let m = alphabet.len();

        if initial.len() != n {
            return Err(DecodeError::invalid_model(format!(
                "initial distribution has {} entries for {n} states",
                initial.len()
            )));
        }
        if transition.len() != n || transition.iter().any(|row| row.len() != n) {
            return Err(DecodeError::invalid_model(format!(
                "transition matrix must be {n}x{n}"
            )));
        }
        if emission.len() != n || emission.iter().any(|row| row.len() != m) {
            return Err(DecodeError::invalid_model(format!(
                "emission matrix must be {n}x{m}"
            )));
        }

        Self::from_parts(
            states,
            alphabet,
            initial,
            transition.concat(),
            emission.concat(),
            DEFAULT_TOLERANCE,
        )
    }

    /// Validate flattened tables and derive the log-domain copies.
    pub(crate) fn from_parts(
        states: Vocabulary<S>,
        alphabet: Vocabulary<O>,
        initial: Vec<f64>,
        transition: Vec<f64>,
        emission: Vec<f64>,
        tolerance: f64,
    ) -> Result<Self> {
        if states.is_empty() {
            return Err(DecodeError::EmptyInput("state set is empty"));
        }
        if alphabet.is_empty() {
            return Err(DecodeError::invalid_model("emission alphabet is empty"));
        }
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(DecodeError::invalid_model(format!(
                "tolerance must be a finite non-negative number, got {tolerance}"
            )));
        }
        let n = states.len();
        let m = alphabet.len();
        debug_assert_eq!(initial.len(), n);
        debug_assert_eq!(transition.len(), n * n);
        debug_assert_eq!(emission.len(), n * m);

        check_distribution(&initial, tolerance, || "initial distribution".to_string())?;
        for (s, row) in transition.chunks_exact(n).enumerate() {
            check_distribution(row, tolerance, || {
                format!("transition row for state {:?}", states.as_slice()[s])
            })?;
        }
        for (s, row) in emission.chunks_exact(m).enumerate() {
            check_distribution(row, tolerance, || {
                format!("emission row for state {:?}", states.as_slice()[s])
            })?;
        }

        let log_initial = initial.iter().map(|&p| ln_prob(p)).collect();
        let log_transition = transition.iter().map(|&p| ln_prob(p)).collect();
        let log_emission = emission.iter().map(|&p| ln_prob(p)).collect();

        Ok(Self {
            states,
            alphabet,
            initial,
            transition,
            emission,
            log_initial,
            log_transition,
            log_emission,
            tolerance,
        })
    }

    /// States in declared order.
    pub fn states(&self) -> &[S] {
        self.states.as_slice()
    }

    /// Observation symbols known to the emission distribution.
    ///
    /// For models from [`HmmModel::builder`] the order follows the emission
    /// rows as given; see [`HmmModelBuilder::with_emission`].
    pub fn alphabet(&self) -> &[O] {
        self.alphabet.as_slice()
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    pub fn n_symbols(&self) -> usize {
        self.alphabet.len()
    }

    /// Tolerance the distributions were validated against.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Index of `state` in the declared order.
    pub fn state_index(&self, state: &S) -> Option<usize> {
        self.states.index_of(state)
    }

    pub fn initial(&self, state: &S) -> Option<f64> {
        let s = self.states.index_of(state)?;
        Some(self.initial[s])
    }

    pub fn transition(&self, from: &S, to: &S) -> Option<f64> {
        let f = self.states.index_of(from)?;
        let t = self.states.index_of(to)?;
        Some(self.transition[f * self.n_states() + t])
    }

    pub fn emission(&self, state: &S, observation: &O) -> Option<f64> {
        let s = self.states.index_of(state)?;
        let o = self.alphabet.index_of(observation)?;
        Some(self.emission[s * self.n_symbols() + o])
    }

    /// Map an observation sequence onto alphabet indices.
    ///
    /// # Errors
    /// `UnknownObservation` for the first element outside the alphabet.
    pub fn symbol_indices(&self, observations: &[O]) -> Result<Vec<usize>> {
        observations
            .iter()
            .enumerate()
            .map(|(position, o)| {
                self.alphabet
                    .index_of(o)
                    .ok_or_else(|| DecodeError::UnknownObservation {
                        position,
                        observation: format!("{o:?}"),
                    })
            })
            .collect()
    }

    /// Log-probability of emitting `observations` along `path`:
    /// `ln π[s0] + ln b[s0][o0] + Σ (ln a[s(t-1)][s(t)] + ln b[s(t)][o(t)])`.
    ///
    /// Returns `-inf` for a path the model cannot produce.
    ///
    /// # Errors
    /// `EmptyInput` for an empty sequence, `InvalidPath` for a length mismatch
    /// or an undeclared state, `UnknownObservation` for an unknown symbol.
    pub fn path_log_probability(&self, observations: &[O], path: &[S]) -> Result<f64> {
        if observations.is_empty() {
            return Err(DecodeError::EmptyInput("observation sequence is empty"));
        }
        if path.len() != observations.len() {
            return Err(DecodeError::InvalidPath(format!(
                "path has {} states for {} observations",
                path.len(),
                observations.len()
            )));
        }
        let symbols = self.symbol_indices(observations)?;
        let indices = path
            .iter()
            .map(|s| {
                self.states.index_of(s).ok_or_else(|| {
                    DecodeError::InvalidPath(format!("{s:?} is not a declared state"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let n = self.n_states();
        let m = self.n_symbols();
        let first = indices[0];
        let mut score = self.log_initial[first] + self.log_emission[first * m + symbols[0]];
        for t in 1..indices.len() {
            let (prev, cur) = (indices[t - 1], indices[t]);
            score = score
                + self.log_transition[prev * n + cur]
                + self.log_emission[cur * m + symbols[t]];
        }
        Ok(score)
    }

    #[inline]
    pub(crate) fn log_initial(&self) -> &[f64] {
        &self.log_initial
    }

    #[inline]
    pub(crate) fn log_transition(&self) -> &[f64] {
        &self.log_transition
    }

    #[inline]
    pub(crate) fn log_emission(&self) -> &[f64] {
        &self.log_emission
    }
}

/// Every value finite and in [0,1], total within `tolerance` of one.
fn check_distribution(row: &[f64], tolerance: f64, what: impl Fn() -> String) -> Result<()> {
    if let Some(&p) = row.iter().find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0) {
        return Err(DecodeError::invalid_model(format!(
            "{} contains {p}, outside [0, 1]",
            what()
        )));
    }
    let sum: f64 = row.iter().sum();
    if (sum - 1.0).abs() > tolerance {
        return Err(DecodeError::invalid_model(format!(
            "{} sums to {sum}, expected 1",
            what()
        )));
    }
    Ok(())
}
