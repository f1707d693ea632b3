use alloy::primitives::{Address, TxHash, U256};
use fastnum::UD256;

use super::ChainId;
use crate::num;

/// Decoded ERC-20 token transfer.
///
/// Produced once by the ingest engine and never mutated afterwards.
#[derive(Clone, derive_more::Debug, PartialEq, Eq)]
pub struct Transfer {
    chain_id: ChainId,
    tx_hash: TxHash,
    block_number: u64,
    block_timestamp: Option<u64>,
    from: Address,
    to: Address,
    #[debug("{amount}")]
    amount: U256,
    observed_at_millis: u64,
}

impl Transfer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chain_id: ChainId,
        tx_hash: TxHash,
        block_number: u64,
        block_timestamp: Option<u64>,
        from: Address,
        to: Address,
        amount: U256,
        observed_at_millis: u64,
    ) -> Self {
        Self {
            chain_id,
            tx_hash,
            block_number,
            block_timestamp,
            from,
            to,
            amount,
            observed_at_millis,
        }
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Hash of the transaction that emitted the transfer.
    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Timestamp of the block, `None` if the provider did not report it.
    pub fn block_timestamp(&self) -> Option<u64> {
        self.block_timestamp
    }

    pub fn from(&self) -> Address {
        self.from
    }

    pub fn to(&self) -> Address {
        self.to
    }

    /// Amount in the token's smallest units.
    pub fn amount(&self) -> U256 {
        self.amount
    }

    /// Amount in the token's smallest units as a decimal string.
    pub fn amount_raw(&self) -> String {
        self.amount.to_string()
    }

    /// Amount in whole token units.
    pub fn display_amount(&self, converter: num::Converter) -> UD256 {
        converter.from_unsigned(self.amount)
    }

    /// Wall-clock time the transfer was accepted by the ingest engine.
    pub fn observed_at_millis(&self) -> u64 {
        self.observed_at_millis
    }

    /// Whether the transfer moves at least `min_amount` smallest units.
    pub fn meets_threshold(&self, min_amount: U256) -> bool {
        self.amount >= min_amount
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, b256};
    use fastnum::udec256;

    use super::*;

    fn transfer(amount: u64) -> Transfer {
        Transfer::new(
            8453,
            b256!("0x47de82c4aa40baa30cabac4a74568488a8c74ded85a4e905f1ceaad4f29945e3"),
            100,
            None,
            address!("0x1111111111111111111111111111111111111111"),
            address!("0x2222222222222222222222222222222222222222"),
            U256::from(amount),
            1_700_000_000_000,
        )
    }

    #[test]
    fn test_amount_formats() {
        let t = transfer(1_234_567_890);
        assert_eq!(t.amount_raw(), "1234567890");
        assert_eq!(
            t.display_amount(num::Converter::new(6)),
            udec256!(1234.56789)
        );
    }

    #[test]
    fn test_threshold() {
        let t = transfer(1_000_000);
        assert!(t.meets_threshold(U256::ZERO));
        assert!(t.meets_threshold(U256::from(1_000_000)));
        assert!(!t.meets_threshold(U256::from(1_000_001)));
    }
}
