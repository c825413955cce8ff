//! Epoch parameters: field prime, share count `N` and threshold `K`.
//!
//! Loaded from env by the binary (`EPOCH`, `SHARE_COUNT`, `THRESHOLD`, `PRIME`); tests
//! build it directly with [`EpochConfig::new`].

use crate::error::{Error, Result};
use crate::field::Prime;

/// Parameters fixed for the lifetime of one epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpochConfig {
    pub epoch: u64,
    /// Number of darknodes in the pool (`N`).
    pub share_count: u64,
    /// Fragments needed to reconstruct a delta (`K`).
    pub threshold: u64,
    pub prime: Prime,
}

/// Two-thirds threshold used by default: `(n + 1) * 2 / 3`.
pub fn default_threshold(n: u64) -> u64 {
    (n + 1) * 2 / 3
}

impl EpochConfig {
    pub fn new(epoch: u64, share_count: u64, threshold: u64, prime: Prime) -> Result<Self> {
        if threshold == 0 || threshold > share_count {
            return Err(Error::Nk {
                n: share_count,
                k: threshold,
            });
        }
        Ok(Self {
            epoch,
            share_count,
            threshold,
            prime,
        })
    }

    /// `N` darknodes with the default two-thirds threshold and prime.
    pub fn with_share_count(epoch: u64, share_count: u64) -> Result<Self> {
        Self::new(epoch, share_count, default_threshold(share_count), Prime::default())
    }

    /// Load from env. Unset variables fall back to defaults: `EPOCH=0`, `SHARE_COUNT=5`,
    /// `THRESHOLD=(N+1)*2/3`, `PRIME` = RFC 3526 1536-bit prime.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`EpochConfig::from_env`] with a custom variable source. For tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let epoch = parse_u64(&lookup, "EPOCH")?.unwrap_or(0);
        let share_count = parse_u64(&lookup, "SHARE_COUNT")?.unwrap_or(5);
        let threshold = parse_u64(&lookup, "THRESHOLD")?.unwrap_or_else(|| default_threshold(share_count));
        let prime = match lookup("PRIME") {
            Some(s) if !s.trim().is_empty() => s.parse()?,
            _ => Prime::default(),
        };
        Self::new(epoch, share_count, threshold, prime)
    }
}

fn parse_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} must be an unsigned integer, got {:?}", key, s))),
    }
}
