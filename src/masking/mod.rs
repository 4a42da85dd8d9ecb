//! Deterministic selection of which clips to hide.
//!
//! [`MaskingStrategy`] is a closed set of rules mapping a sequence length to a
//! set of indices. Declarative [`MaskingSpec`]s expand into concrete
//! strategies through [`expand`]; the expansion order is stable because it
//! determines run names.

pub mod error;
pub mod strategy;
pub mod sweep;


pub use error::{MaskingError, MaskingResult};
pub use strategy::{
    ContiguousMasking, MaskOutcome, MaskingStrategy, PartitionMasking, RandomMasking,
    partition_bounds,
};
pub use sweep::{FloatSweep, IntSweep, MaskingSpec, expand};
