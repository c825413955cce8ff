//! One darknode's share of an order, and the pairwise arithmetic between fragments.

use num_bigint::BigUint;

use crate::delta::DeltaFragment;
use crate::error::{Error, Result};
use crate::field::Prime;
use crate::sss::Share;
use crate::types::{keccak256, OrderFragmentId, OrderId, OrderParity, OrderType};

/// Secret-shared form of an [`crate::Order`]. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OrderFragment {
    pub id: OrderFragmentId,
    pub order_id: OrderId,
    pub order_type: OrderType,
    pub parity: OrderParity,
    pub fst_code_share: Share,
    pub snd_code_share: Share,
    pub price_share: Share,
    pub max_volume_share: Share,
    pub min_volume_share: Share,
}

impl OrderFragment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_id: OrderId,
        order_type: OrderType,
        parity: OrderParity,
        fst_code_share: Share,
        snd_code_share: Share,
        price_share: Share,
        max_volume_share: Share,
        min_volume_share: Share,
    ) -> Self {
        let mut fragment = Self {
            id: OrderFragmentId([0; 32]),
            order_id,
            order_type,
            parity,
            fst_code_share,
            snd_code_share,
            price_share,
            max_volume_share,
            min_volume_share,
        };
        fragment.id = fragment.content_id();
        fragment
    }

    /// Keccak-256 over the parent order id and the serialized shares.
    pub fn content_id(&self) -> OrderFragmentId {
        let shares: Vec<Vec<u8>> = self.shares().iter().map(|s| s.to_bytes()).collect();
        let mut parts: Vec<&[u8]> = Vec::with_capacity(6);
        parts.push(self.order_id.as_bytes());
        parts.extend(shares.iter().map(Vec::as_slice));
        OrderFragmentId(keccak256(&parts))
    }

    /// True if the declared id matches the fragment's content.
    pub fn verify_id(&self) -> bool {
        self.id == self.content_id()
    }

    fn shares(&self) -> [&Share; 5] {
        [
            &self.fst_code_share,
            &self.snd_code_share,
            &self.price_share,
            &self.max_volume_share,
            &self.min_volume_share,
        ]
    }

    /// Ok if the fragments have opposite parity and identical share keys.
    pub fn is_compatible(&self, other: &OrderFragment) -> Result<()> {
        if self.parity == other.parity {
            return Err(Error::OrderComputation);
        }
        let keys_match = self
            .shares()
            .iter()
            .zip(other.shares().iter())
            .all(|(a, b)| a.key == b.key);
        if !keys_match {
            return Err(Error::OrderFragmentation);
        }
        Ok(())
    }

    /// Buy shares minus sell shares, whichever side `self` is.
    pub fn sub(&self, other: &OrderFragment, prime: &Prime) -> Result<DeltaFragment> {
        self.combine(other, |a, b| prime.sub(a, b))
    }

    /// Buy shares plus sell shares, whichever side `self` is.
    pub fn add(&self, other: &OrderFragment, prime: &Prime) -> Result<DeltaFragment> {
        self.combine(other, |a, b| prime.add(a, b))
    }

    fn combine<F>(&self, other: &OrderFragment, op: F) -> Result<DeltaFragment>
    where
        F: Fn(&BigUint, &BigUint) -> BigUint,
    {
        self.is_compatible(other)?;
        let (buy, sell) = match self.parity {
            OrderParity::Buy => (self, other),
            OrderParity::Sell => (other, self),
        };
        let apply = |lhs: &Share, rhs: &Share| Share::new(lhs.key, op(&lhs.value, &rhs.value));
        Ok(DeltaFragment::new(
            buy,
            sell,
            apply(&buy.fst_code_share, &sell.fst_code_share),
            apply(&buy.snd_code_share, &sell.snd_code_share),
            apply(&buy.price_share, &sell.price_share),
            apply(&buy.max_volume_share, &sell.max_volume_share),
            apply(&buy.min_volume_share, &sell.min_volume_share),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Order;
    use crate::sss;
    use crate::types::CurrencyCode;

    fn order(parity: OrderParity, price: u64) -> Order {
        Order::new(
            OrderType::Limit,
            parity,
            None,
            CurrencyCode::BTC,
            CurrencyCode::ETH,
            price,
            1000,
            100,
            7,
        )
    }

    #[test]
    fn sibling_fragments_are_compatible() {
        let prime = Prime::default();
        let buys = order(OrderParity::Buy, 10).split(5, 3, &prime).unwrap();
        let sells = order(OrderParity::Sell, 10).split(5, 3, &prime).unwrap();
        for (b, s) in buys.iter().zip(sells.iter()) {
            assert!(b.is_compatible(s).is_ok());
            assert!(s.is_compatible(b).is_ok());
        }
    }

    #[test]
    fn same_parity_is_computation_error() {
        let prime = Prime::default();
        let a = order(OrderParity::Buy, 10).split(3, 2, &prime).unwrap();
        let b = order(OrderParity::Buy, 11).split(3, 2, &prime).unwrap();
        assert_eq!(a[0].is_compatible(&b[0]).unwrap_err(), Error::OrderComputation);
        assert_eq!(a[0].sub(&b[0], &prime).unwrap_err(), Error::OrderComputation);
        assert_eq!(a[0].add(&b[0], &prime).unwrap_err(), Error::OrderComputation);
    }

    #[test]
    fn different_keys_is_fragmentation_error() {
        let prime = Prime::default();
        let buys = order(OrderParity::Buy, 10).split(5, 3, &prime).unwrap();
        let sells = order(OrderParity::Sell, 10).split(5, 3, &prime).unwrap();
        assert_eq!(buys[0].is_compatible(&sells[1]).unwrap_err(), Error::OrderFragmentation);
    }

    #[test]
    fn different_splits_are_incompatible() {
        let prime = Prime::default();
        let buys = order(OrderParity::Buy, 10).split(3, 2, &prime).unwrap();
        let sells = order(OrderParity::Sell, 10).split(6, 4, &prime).unwrap();
        // fragment 0 of the first split vs fragment 3 of the second
        assert_eq!(buys[0].is_compatible(&sells[3]).unwrap_err(), Error::OrderFragmentation);
    }

    #[test]
    fn same_index_of_different_splits_is_compatible() {
        let prime = Prime::default();
        let buys = order(OrderParity::Buy, 10).split(3, 2, &prime).unwrap();
        let sells = order(OrderParity::Sell, 10).split(6, 4, &prime).unwrap();
        // keys are always 1..=n, so only the evaluation point is compared
        assert!(buys[1].is_compatible(&sells[1]).is_ok());
        let delta = buys[1].sub(&sells[1], &prime).unwrap();
        assert_eq!(delta.price_share.key, 2);
    }

    #[test]
    fn sub_is_parity_normalized() {
        let prime = Prime::default();
        let buys = order(OrderParity::Buy, 10).split(5, 3, &prime).unwrap();
        let sells = order(OrderParity::Sell, 12).split(5, 3, &prime).unwrap();
        for (b, s) in buys.iter().zip(sells.iter()) {
            let lhs = b.sub(s, &prime).unwrap();
            let rhs = s.sub(b, &prime).unwrap();
            assert_eq!(lhs, rhs);
            assert_eq!(lhs.buy_order_fragment_id, b.id);
            assert_eq!(lhs.sell_order_fragment_id, s.id);
        }
    }

    #[test]
    fn sub_then_decode_gives_difference_mod_p() {
        let prime = Prime::default();
        let buys = order(OrderParity::Buy, 10).split(5, 3, &prime).unwrap();
        let sells = order(OrderParity::Sell, 12).split(5, 3, &prime).unwrap();
        let shares: Vec<Share> = buys
            .iter()
            .zip(sells.iter())
            .take(3)
            .map(|(b, s)| b.sub(s, &prime).unwrap().price_share)
            .collect();
        let expected = prime.modulus() - 2u32;
        assert_eq!(sss::decode(&shares, &prime).unwrap(), expected);
    }

    #[test]
    fn add_then_decode_gives_sum() {
        let prime = Prime::default();
        let buys = order(OrderParity::Buy, 10).split(4, 2, &prime).unwrap();
        let sells = order(OrderParity::Sell, 12).split(4, 2, &prime).unwrap();
        let shares: Vec<Share> = buys
            .iter()
            .zip(sells.iter())
            .skip(2)
            .map(|(b, s)| s.add(b, &prime).unwrap().max_volume_share)
            .collect();
        assert_eq!(sss::decode(&shares, &prime).unwrap(), BigUint::from(2000u32));
    }

    #[test]
    fn verify_id_detects_tampering() {
        let prime = Prime::default();
        let mut f = order(OrderParity::Buy, 10).split(3, 2, &prime).unwrap().remove(0);
        assert!(f.verify_id());
        f.price_share.value += 1u32;
        assert!(!f.verify_id());
    }
}
