//! Core identifiers and enums shared by orders, fragments and deltas.
//!
//! Every identifier is a 32-byte Keccak-256 digest wrapped in its own newtype, so an
//! [`OrderId`] can never be confused with a [`DeltaId`] as a map key.

use std::fmt;
use std::str::FromStr;

use sha3::{Digest, Keccak256};

macro_rules! digest_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = hex::FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut out = [0u8; 32];
                hex::decode_to_slice(s.trim_start_matches("0x"), &mut out)?;
                Ok(Self(out))
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(&self.to_string())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(d)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

digest_id!(
    /// Content hash of an [`crate::Order`].
    OrderId
);
digest_id!(
    /// Hash of an order fragment's parent id and shares.
    OrderFragmentId
);
digest_id!(
    /// Hash of the buy and sell fragment ids that produced a delta fragment.
    DeltaFragmentId
);
digest_id!(
    /// Hash of the buy and sell order ids; shared by every fragment of one delta.
    DeltaId
);

impl DeltaFragmentId {
    pub fn from_fragments(buy: &OrderFragmentId, sell: &OrderFragmentId) -> Self {
        Self(keccak256(&[buy.0.as_slice(), sell.0.as_slice()]))
    }
}

impl DeltaId {
    pub fn from_orders(buy: &OrderId, sell: &OrderId) -> Self {
        Self(keccak256(&[buy.0.as_slice(), sell.0.as_slice()]))
    }
}

/// Keccak-256 over the concatenation of `parts`.
pub(crate) fn keccak256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Order type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum OrderType {
    Limit,
    /// Executes at the midpoint of the best bid and offer.
    MidpointIbbo,
}

impl OrderType {
    pub(crate) fn tag(self) -> u8 {
        match self {
            OrderType::Limit => 1,
            OrderType::MidpointIbbo => 2,
        }
    }
}

/// Buy or sell side of an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum OrderParity {
    Buy,
    Sell,
}

impl OrderParity {
    pub(crate) fn tag(self) -> u8 {
        match self {
            OrderParity::Buy => 0,
            OrderParity::Sell => 1,
        }
    }
}

/// Currency code. Codes are secret-shared like every other numeric order field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CurrencyCode(pub u32);

impl CurrencyCode {
    pub const BTC: CurrencyCode = CurrencyCode(0);
    pub const ETH: CurrencyCode = CurrencyCode(1);
    pub const DGX: CurrencyCode = CurrencyCode(256);
    pub const REN: CurrencyCode = CurrencyCode(65536);
}
