//! Delta fragments (secret-shared buy minus sell) and reconstructed deltas.
//!
//! A [`DeltaFragment`] is what one darknode computes for one buy/sell fragment pair.
//! Once `k` fragments for the same order pair are collected, [`Delta::new`] interpolates
//! the public differences and [`Delta::is_match`] decides whether the orders cross.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{Error, Result};
use crate::field::Prime;
use crate::order_fragment::OrderFragment;
use crate::sss::{self, Share};
use crate::types::{DeltaFragmentId, DeltaId, OrderFragmentId, OrderId};

/// Per-pair computation result held by one darknode.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeltaFragment {
    pub id: DeltaFragmentId,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub buy_order_fragment_id: OrderFragmentId,
    pub sell_order_fragment_id: OrderFragmentId,
    pub fst_code_share: Share,
    pub snd_code_share: Share,
    pub price_share: Share,
    pub max_volume_share: Share,
    pub min_volume_share: Share,
}

impl DeltaFragment {
    pub(crate) fn new(
        buy: &OrderFragment,
        sell: &OrderFragment,
        fst_code_share: Share,
        snd_code_share: Share,
        price_share: Share,
        max_volume_share: Share,
        min_volume_share: Share,
    ) -> Self {
        Self {
            id: DeltaFragmentId::from_fragments(&buy.id, &sell.id),
            buy_order_id: buy.order_id,
            sell_order_id: sell.order_id,
            buy_order_fragment_id: buy.id,
            sell_order_fragment_id: sell.id,
            fst_code_share,
            snd_code_share,
            price_share,
            max_volume_share,
            min_volume_share,
        }
    }

    /// Id of the delta this fragment helps reconstruct.
    pub fn delta_id(&self) -> DeltaId {
        DeltaId::from_orders(&self.buy_order_id, &self.sell_order_id)
    }

    /// True if both fragments belong to the same buy/sell order pair.
    pub fn is_compatible(&self, other: &DeltaFragment) -> bool {
        self.buy_order_id == other.buy_order_id && self.sell_order_id == other.sell_order_id
    }
}

/// Public result of subtracting a sell order from a buy order, field by field, mod P.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Delta {
    pub id: DeltaId,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    #[serde(with = "crate::field::biguint_string")]
    pub fst_code: BigUint,
    #[serde(with = "crate::field::biguint_string")]
    pub snd_code: BigUint,
    #[serde(with = "crate::field::biguint_string")]
    pub price: BigUint,
    #[serde(with = "crate::field::biguint_string")]
    pub max_volume: BigUint,
    #[serde(with = "crate::field::biguint_string")]
    pub min_volume: BigUint,
}

impl Delta {
    /// Interpolates every field from `fragments`. All of them must share one order pair.
    pub fn new(fragments: &[DeltaFragment], prime: &Prime) -> Result<Self> {
        let first = fragments.first().ok_or(Error::EmptySlice)?;
        if !fragments.iter().all(|f| f.is_compatible(first)) {
            return Err(Error::DeltaFragmentation);
        }

        Ok(Self {
            id: first.delta_id(),
            buy_order_id: first.buy_order_id,
            sell_order_id: first.sell_order_id,
            fst_code: interpolate(fragments, prime, |f| &f.fst_code_share)?,
            snd_code: interpolate(fragments, prime, |f| &f.snd_code_share)?,
            price: interpolate(fragments, prime, |f| &f.price_share)?,
            max_volume: interpolate(fragments, prime, |f| &f.max_volume_share)?,
            min_volume: interpolate(fragments, prime, |f| &f.min_volume_share)?,
        })
    }

    /// Currency codes are equal and every other difference is non-negative.
    ///
    /// Values above `P / 2` are negatives that wrapped around the modulus.
    pub fn is_match(&self, prime: &Prime) -> bool {
        let zero_threshold = prime.zero_threshold();
        self.fst_code.is_zero()
            && self.snd_code.is_zero()
            && self.price <= zero_threshold
            && self.max_volume <= zero_threshold
            && self.min_volume <= zero_threshold
    }
}

fn interpolate<F>(fragments: &[DeltaFragment], prime: &Prime, select: F) -> Result<BigUint>
where
    F: Fn(&DeltaFragment) -> &Share,
{
    let shares: Vec<Share> = fragments.iter().map(|f| select(f).clone()).collect();
    sss::decode(&shares, prime)
}
