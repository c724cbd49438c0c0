//! Viterbi decoding for discrete hidden Markov models.
//!
//! Given a model (initial, transition and emission distributions over finite
//! state and observation sets) and an observation sequence, this crate finds
//! the single most probable hidden state sequence and hands back the trellis
//! it was derived from, labelled for inspection or plotting.
//!
//! ## Core idea
//! 1. Describe the model with [`HmmModel::builder`] (mapping-shaped input) or
//!    [`HmmModel::from_dense`] (matrices). All validation happens here.
//! 2. Run a [`Decoder`]; it fills a T×N trellis in the log domain and records
//!    a backpointer per cell.
//! 3. Read the path, its log-probability and the [`Trellis`] off the
//!    returned [`Decoding`].
//!
//! Work is O(T·N²) time and O(T·N) space. Ties are broken by declared state
//! order, so results are deterministic, with or without the `parallel`
//! feature.
//!
//! ## Quick start
//! ```
//! use hmm_viterbi::{Decoder, Domain, HmmModel};
//!
//! let model = HmmModel::builder(['A', 'B'])
//!     .with_initial([('A', 0.6), ('B', 0.4)])
//!     .with_transition([
//!         ('A', vec![('A', 0.7), ('B', 0.3)]),
//!         ('B', vec![('A', 0.4), ('B', 0.6)]),
//!     ])
//!     .with_emission([
//!         ('A', vec![(0u8, 0.5), (1, 0.5)]),
//!         ('B', vec![(0u8, 0.1), (1, 0.9)]),
//!     ])
//!     .build()
//!     .unwrap();
//!
//! let decoding = Decoder::default().decode(&model, &[0, 1, 1, 0]).unwrap();
//! assert_eq!(decoding.path(), &['A', 'A', 'A', 'A']);
//! assert_eq!(decoding.trellis().domain(), Domain::Log);
//! ```
//!
//! ## Cargo features
//! - `parallel`: fill wide trellis rows with rayon.
//! - `tracing`: spans around each decode stage.
//! - `serde`: `Serialize` for [`Decoding`], [`Trellis`] and [`Domain`].

pub mod builder;
pub mod decoder;
pub mod error;
pub mod model;
pub mod trellis;
pub mod utils;
pub mod vocab;

pub use crate::builder::{DecoderBuilder, HmmModelBuilder};
pub use crate::decoder::{decode, Decoder, Decoding};
pub use crate::error::{DecodeError, Result};
pub use crate::model::HmmModel;
pub use crate::trellis::{Domain, Trellis};
pub use crate::vocab::{Symbol, Vocabulary};
