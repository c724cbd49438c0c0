//! Builders for models and decoders.
//!
//! [`HmmModelBuilder`] accepts distributions shaped as mappings (anything
//! iterable as `(key, probability)` pairs, nested for transition and
//! emission) and turns them into the dense tables of an [`HmmModel`].
//! [`DecoderBuilder`] configures a [`Decoder`].

use crate::decoder::Decoder;
use crate::error::{DecodeError, Result};
use crate::model::HmmModel;
use crate::utils::{DEFAULT_PARALLEL_THRESHOLD, DEFAULT_TOLERANCE};
use crate::vocab::{Symbol, Vocabulary};

/// Mapping-based construction of an [`HmmModel`].
///
/// ```
/// use hmm_viterbi::HmmModel;
///
/// let model = HmmModel::builder(["healthy", "fever"])
///     .with_initial([("healthy", 0.6), ("fever", 0.4)])
///     .with_transition([
///         ("healthy", vec![("healthy", 0.7), ("fever", 0.3)]),
///         ("fever", vec![("healthy", 0.4), ("fever", 0.6)]),
///     ])
///     .with_emission([
///         ("healthy", vec![("normal", 0.5), ("cold", 0.4), ("dizzy", 0.1)]),
///         ("fever", vec![("normal", 0.1), ("cold", 0.3), ("dizzy", 0.6)]),
///     ])
///     .build()
///     .unwrap();
/// assert_eq!(model.alphabet(), &["normal", "cold", "dizzy"]);
/// ```
pub struct HmmModelBuilder<S, O> {
    states: Vec<S>,
    initial: Vec<(S, f64)>,
    transition: Vec<(S, Vec<(S, f64)>)>,
    emission: Vec<(S, Vec<(O, f64)>)>,
    tolerance: f64,
}

impl<S: Symbol, O: Symbol> HmmModelBuilder<S, O> {
    pub fn new<I>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        Self {
            states: states.into_iter().collect(),
            initial: Vec::new(),
            transition: Vec::new(),
            emission: Vec::new(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_initial<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
    {
        self.initial = entries.into_iter().collect();
        self
    }

    /// Rows keyed by source state; each row maps destination state to probability.
    pub fn with_transition<I, R>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = (S, R)>,
        R: IntoIterator<Item = (S, f64)>,
    {
        self.transition = rows
            .into_iter()
            .map(|(from, row)| (from, row.into_iter().collect()))
            .collect();
        self
    }

    /// Rows keyed by state; each row maps observation symbol to probability.
    ///
    /// The alphabet is the union of all row keys, ordered by first appearance
    /// when rows are visited in declared state order. That order is only
    /// reproducible when each row iterates in a fixed order (`Vec`, array,
    /// `BTreeMap`); rows taken from a `HashMap` give an alphabet order that
    /// can change from run to run. Decoding results do not depend on it.
    pub fn with_emission<I, R>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = (S, R)>,
        R: IntoIterator<Item = (O, f64)>,
    {
        self.emission = rows
            .into_iter()
            .map(|(state, row)| (state, row.into_iter().collect()))
            .collect();
        self
    }

    /// Allowed deviation from one when checking row sums.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Validate everything and produce the dense model.
    ///
    /// # Errors
    /// `EmptyInput` for an empty state set; `InvalidModel` for a duplicate,
    /// undeclared or missing key, or any distribution that fails validation.
    pub fn build(self) -> Result<HmmModel<S, O>> {
        if self.states.is_empty() {
            return Err(DecodeError::EmptyInput("state set is empty"));
        }
        let states = Vocabulary::new(self.states)?;
        let n = states.len();

        let initial = place_entries(&states, self.initial, "initial distribution")?;

        let transition_rows = place_rows(&states, self.transition, "transition")?;
        let mut transition = Vec::with_capacity(n * n);
        for (s, row) in transition_rows.into_iter().enumerate() {
            let what = format!("transition row for state {:?}", states.as_slice()[s]);
            transition.extend(place_entries(&states, row, &what)?);
        }

        let emission_rows = place_rows(&states, self.emission, "emission")?;
        let mut alphabet = Vocabulary::empty();
        for row in &emission_rows {
            for (o, _) in row {
                alphabet.intern(o);
            }
        }
        let mut emission = Vec::with_capacity(n * alphabet.len());
        for (s, row) in emission_rows.into_iter().enumerate() {
            let what = format!("emission row for state {:?}", states.as_slice()[s]);
            emission.extend(place_entries(&alphabet, row, &what)?);
        }

        HmmModel::from_parts(states, alphabet, initial, transition, emission, self.tolerance)
    }
}

/// Order keyed rows by state index; every state needs exactly one row.
fn place_rows<S: Symbol, R>(
    states: &Vocabulary<S>,
    rows: Vec<(S, R)>,
    table: &str,
) -> Result<Vec<R>> {
    let mut slots: Vec<Option<R>> = (0..states.len()).map(|_| None).collect();
    for (state, row) in rows {
        let idx = states.index_of(&state).ok_or_else(|| {
            DecodeError::invalid_model(format!("{table} row for undeclared state {state:?}"))
        })?;
        if slots[idx].replace(row).is_some() {
            return Err(DecodeError::invalid_model(format!(
                "{table} row for state {state:?} is given more than once"
            )));
        }
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(s, row)| {
            row.ok_or_else(|| {
                DecodeError::invalid_model(format!(
                    "{table} has no row for state {:?}",
                    states.as_slice()[s]
                ))
            })
        })
        .collect()
}

/// Lay `(key, p)` pairs out in `keys` order; every key needs exactly one entry.
fn place_entries<K: Symbol>(
    keys: &Vocabulary<K>,
    entries: Vec<(K, f64)>,
    what: &str,
) -> Result<Vec<f64>> {
    let mut slots = vec![None; keys.len()];
    for (key, p) in entries {
        let idx = keys.index_of(&key).ok_or_else(|| {
            DecodeError::invalid_model(format!("{what} has an entry for unknown key {key:?}"))
        })?;
        if slots[idx].replace(p).is_some() {
            return Err(DecodeError::invalid_model(format!(
                "{what} has more than one entry for {key:?}"
            )));
        }
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            p.ok_or_else(|| {
                DecodeError::invalid_model(format!(
                    "{what} has no entry for {:?}",
                    keys.as_slice()[i]
                ))
            })
        })
        .collect()
}

/// Configures a [`Decoder`].
pub struct DecoderBuilder {
    parallel_threshold: Option<usize>,
}

impl DecoderBuilder {
    pub fn new() -> Self {
        Self {
            parallel_threshold: None,
        }
    }

    /// Minimum number of states for which a trellis row is filled in
    /// parallel. Has no effect without the `parallel` feature.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = Some(threshold);
        self
    }

    pub fn build(self) -> Decoder {
        match self.parallel_threshold {
            Some(t) => Decoder::with_parallel_threshold(t),
            None => Decoder::with_parallel_threshold(DEFAULT_PARALLEL_THRESHOLD),
        }
    }
}

impl Default for DecoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
