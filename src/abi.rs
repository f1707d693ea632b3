use alloy::primitives::{B256, Log};
use alloy_sol_types::SolEvent;

use crate::error::RadarError;

#[allow(clippy::too_many_arguments)]
pub mod erc20 {
    alloy::sol!(
        /// Minimal ERC-20 interface covering the events the radar decodes.
        #[derive(Debug, PartialEq, Eq)]
        interface IERC20 {
            event Transfer(address indexed from, address indexed to, uint256 value);
        }
    );
}

pub use erc20::IERC20::Transfer as TransferEvent;

/// keccak256("Transfer(address,address,uint256)")
pub const TRANSFER_TOPIC: B256 = TransferEvent::SIGNATURE_HASH;

/// Decodes an ERC-20 `Transfer` log into sender, recipient and raw amount.
///
/// Logs with another signature, missing indexed topics or a malformed
/// data payload yield [`RadarError::Decode`].
pub fn decode_transfer(log: &Log) -> Result<TransferEvent, RadarError> {
    if log.topics().first() != Some(&TRANSFER_TOPIC) {
        return Err(RadarError::Decode(format!(
            "unexpected event signature in log of {}",
            log.address
        )));
    }
    Ok(TransferEvent::decode_log(log)?.data)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Bytes, LogData, U256, address, b256};

    use super::*;

    #[test]
    fn test_transfer_topic() {
        assert_eq!(
            TRANSFER_TOPIC,
            b256!("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
        );
    }

    #[test]
    fn test_decode_transfer() {
        let token = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
        let event = TransferEvent {
            from: address!("0x1111111111111111111111111111111111111111"),
            to: address!("0x2222222222222222222222222222222222222222"),
            value: U256::from(42_000_000u64),
        };
        let log = Log {
            address: token,
            data: event.encode_log_data(),
        };

        assert_eq!(decode_transfer(&log).unwrap(), event);
    }

    #[test]
    fn test_decode_rejects_malformed_logs() {
        let token = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

        // Approval(address,address,uint256)
        let approval = Log {
            address: token,
            data: LogData::new_unchecked(
                vec![b256!(
                    "0x8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925"
                )],
                Bytes::new(),
            ),
        };
        assert!(matches!(
            decode_transfer(&approval),
            Err(RadarError::Decode(_))
        ));

        let missing_topics = Log {
            address: token,
            data: LogData::new_unchecked(vec![TRANSFER_TOPIC], Bytes::from(vec![0u8; 32])),
        };
        assert!(matches!(
            decode_transfer(&missing_topics),
            Err(RadarError::Decode(_))
        ));

        let empty = Log {
            address: token,
            data: LogData::default(),
        };
        assert!(matches!(decode_transfer(&empty), Err(RadarError::Decode(_))));
    }
}
