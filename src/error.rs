//! Errors returned by the computation core.
//!
//! Every failure is local to the message being handled: the network handler logs it
//! and drops the offending fragment. Nothing in the core panics on bad input.

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Threshold is zero or larger than the number of shares.
    #[error("invalid share parameters: k = {k} must be in 1..={n}")]
    Nk { n: u64, k: u64 },

    /// Secret does not lie in `[0, P)`.
    #[error("secret is outside the finite field")]
    FiniteField,

    /// Arithmetic between two fragments of the same parity.
    #[error("order fragments have the same parity")]
    OrderComputation,

    /// Arithmetic between fragments whose share keys differ.
    #[error("order fragments have different share keys")]
    OrderFragmentation,

    /// Delta fragments that belong to different order pairs.
    #[error("delta fragments reference different order pairs")]
    DeltaFragmentation,

    #[error("cannot reconstruct from an empty slice")]
    EmptySlice,

    /// Two shares evaluated at the same point in one interpolation.
    #[error("duplicate share key {0}")]
    DuplicateShareKey(u64),

    #[error("invalid configuration: {0}")]
    Config(String),
}
