//! Shamir secret sharing over [`Prime`].
//!
//! [`encode`] splits a secret into `n` shares evaluated at `x = 1..=n` on a random
//! polynomial of degree `k - 1`; [`decode`] recovers the constant term from any `k` of
//! them by Lagrange interpolation at `x = 0`.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::{Error, Result};
use crate::field::Prime;

/// One point `(key, value)` on a sharing polynomial.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Share {
    pub key: u64,
    #[serde(with = "crate::field::biguint_string")]
    pub value: BigUint,
}

impl Share {
    pub fn new(key: u64, value: BigUint) -> Self {
        Self { key, value }
    }

    /// Big-endian key followed by the length-prefixed big-endian value.
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let value = self.value.to_bytes_be();
        let mut out = Vec::with_capacity(16 + value.len());
        out.extend_from_slice(&self.key.to_be_bytes());
        out.extend_from_slice(&(value.len() as u64).to_be_bytes());
        out.extend_from_slice(&value);
        out
    }
}

/// Splits `secret` into `n` shares, any `k` of which reconstruct it.
/// Coefficients come from the operating system's CSPRNG.
pub fn encode(secret: &BigUint, n: u64, k: u64, prime: &Prime) -> Result<Vec<Share>> {
    encode_with_rng(&mut OsRng, secret, n, k, prime)
}

/// Like [`encode`], drawing coefficients from `rng`.
pub fn encode_with_rng<R>(
    rng: &mut R,
    secret: &BigUint,
    n: u64,
    k: u64,
    prime: &Prime,
) -> Result<Vec<Share>>
where
    R: RngCore + CryptoRng + ?Sized,
{
    if k == 0 || n < k {
        return Err(Error::Nk { n, k });
    }
    if !prime.contains(secret) {
        return Err(Error::FiniteField);
    }

    let mut coefficients = Vec::with_capacity(k as usize);
    coefficients.push(secret.clone());
    for _ in 1..k {
        coefficients.push(prime.random_element(rng));
    }

    let shares = (1..=n)
        .map(|x| Share::new(x, evaluate(&coefficients, x, prime)))
        .collect();
    Ok(shares)
}

/// Horner evaluation of `coefficients` (constant term first) at `x`.
fn evaluate(coefficients: &[BigUint], x: u64, prime: &Prime) -> BigUint {
    let x = BigUint::from(x);
    coefficients
        .iter()
        .rev()
        .fold(BigUint::zero(), |acc, c| prime.add(&prime.mul(&acc, &x), c))
}

/// Reconstructs the secret from `shares` by Lagrange interpolation at zero.
///
/// Every share passed in is used. Shares from different polynomials decode to a
/// meaningless value without any error; keeping them apart is the caller's job.
pub fn decode(shares: &[Share], prime: &Prime) -> Result<BigUint> {
    if shares.is_empty() {
        return Err(Error::EmptySlice);
    }

    let mut secret = BigUint::zero();
    for (i, share) in shares.iter().enumerate() {
        let xi = BigUint::from(share.key);
        let mut numerator = BigUint::one();
        let mut denominator = BigUint::one();
        for (j, other) in shares.iter().enumerate() {
            if i == j {
                continue;
            }
            if other.key == share.key {
                return Err(Error::DuplicateShareKey(share.key));
            }
            let xj = BigUint::from(other.key);
            // l_i(0) = prod x_j / (x_j - x_i)
            numerator = prime.mul(&numerator, &xj);
            denominator = prime.mul(&denominator, &prime.sub(&xj, &xi));
        }
        let inverse = prime
            .inverse(&denominator)
            .ok_or(Error::DuplicateShareKey(share.key))?;
        let basis = prime.mul(&numerator, &inverse);
        secret = prime.add(&secret, &prime.mul(&share.value, &basis));
    }
    Ok(secret)
}
