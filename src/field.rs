//! Arithmetic in the prime field `Z/PZ`.
//!
//! All secret values and shares live in `[0, P)`. [`Prime`] owns the modulus and
//! normalizes every result back into that range, so subtraction never leaves a
//! "negative" intermediate behind.

use std::fmt;
use std::str::FromStr;

use num_bigint::{BigUint, RandBigInt};
use num_traits::Zero;
use rand::Rng;

use crate::error::{Error, Result};

/// RFC 3526 MODP group 5 prime (1536 bits).
const RFC3526_1536_HEX: &str = "\
FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A0879\
8E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B\
0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA4836\
1C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804\
F1746C08CA237327FFFFFFFFFFFFFFFF";

/// Public field modulus shared by every participant in a pool.
///
/// The modulus is assumed prime; only `P > 2` is checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prime(BigUint);

impl Prime {
    pub fn new(modulus: BigUint) -> Result<Self> {
        if modulus <= BigUint::from(2u32) {
            return Err(Error::Config("prime must be greater than 2".into()));
        }
        Ok(Self(modulus))
    }

    pub fn modulus(&self) -> &BigUint {
        &self.0
    }

    /// `P / 2`. Values above it are read as negative numbers.
    pub fn zero_threshold(&self) -> BigUint {
        &self.0 >> 1u32
    }

    /// True if `value` lies in `[0, P)`.
    pub fn contains(&self, value: &BigUint) -> bool {
        value < &self.0
    }

    pub fn reduce(&self, value: &BigUint) -> BigUint {
        value % &self.0
    }

    pub fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.0
    }

    /// `(a - b) mod P`, normalized into `[0, P)`.
    pub fn sub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        let a = self.reduce(a);
        let b = self.reduce(b);
        if a >= b {
            a - b
        } else {
            &self.0 - b + a
        }
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.0
    }

    /// Multiplicative inverse via Fermat's little theorem. `None` for zero.
    pub fn inverse(&self, a: &BigUint) -> Option<BigUint> {
        let a = self.reduce(a);
        if a.is_zero() {
            return None;
        }
        let exponent = &self.0 - 2u32;
        Some(a.modpow(&exponent, &self.0))
    }

    /// Uniformly random element of `[0, P)`.
    pub fn random_element<R: Rng + ?Sized>(&self, rng: &mut R) -> BigUint {
        rng.gen_biguint_below(&self.0)
    }
}

impl Default for Prime {
    fn default() -> Self {
        let modulus = BigUint::parse_bytes(RFC3526_1536_HEX.as_bytes(), 16)
            .expect("RFC 3526 prime is valid hex");
        Self(modulus)
    }
}

impl FromStr for Prime {
    type Err = Error;

    /// Parses a decimal or `0x`-prefixed hexadecimal modulus.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16),
            None => BigUint::parse_bytes(s.as_bytes(), 10),
        };
        let modulus = parsed.ok_or_else(|| Error::Config(format!("cannot parse prime {:?}", s)))?;
        Self::new(modulus)
    }
}

impl fmt::Display for Prime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Serde helpers: field elements travel as decimal strings.
pub(crate) mod biguint_string {
    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &BigUint, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<BigUint, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| de::Error::custom(format!("invalid field element {:?}", s)))
    }
}
