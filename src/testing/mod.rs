//! In-memory testing utilities.
//!
//! [`MockSource`] is a scripted [`LogSource`]: tests queue the heights and
//! log query results it should return, then inspect which block ranges the
//! ingest loop asked for.
//!
//! [`raw_transfer`] and friends build the logs such a source returns.

use std::{collections::VecDeque, time::Duration};

use alloy::primitives::{Address, B256, Bytes, Log, LogData, TxHash, U256};
use alloy_sol_types::SolEvent;
use tokio::sync::Mutex;

use crate::{
    Chain,
    abi::{TRANSFER_TOPIC, TransferEvent},
    error::RadarError,
    source::LogSource,
    types::{LogsResponse, RawLog},
};

/// Scripted [`LogSource`].
///
/// Height checks pop the next scripted height; once the script runs out
/// the last successfully returned height is repeated. Log queries pop the
/// next scripted response; once those run out an empty response covering
/// the requested range up to the height known when the query started is
/// returned. Queries can be slowed down with [`MockSource::with_query_delay`].
#[derive(Debug, Default)]
pub struct MockSource {
    heights: Mutex<VecDeque<Result<u64, RadarError>>>,
    responses: Mutex<VecDeque<Result<LogsResponse, RadarError>>>,
    last_height: Mutex<Option<u64>>,
    height_calls: Mutex<usize>,
    queries: Mutex<Vec<(u64, u64)>>,
    query_delay: Duration,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source that reports the given heights, in order.
    pub fn with_heights(heights: impl IntoIterator<Item = u64>) -> Self {
        Self {
            heights: Mutex::new(heights.into_iter().map(Ok).collect()),
            ..Default::default()
        }
    }

    /// Makes every log query take `delay` to complete.
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    pub async fn push_height(&self, height: u64) {
        self.heights.lock().await.push_back(Ok(height));
    }

    pub async fn push_height_error(&self, error: RadarError) {
        self.heights.lock().await.push_back(Err(error));
    }

    pub async fn push_response(&self, response: LogsResponse) {
        self.responses.lock().await.push_back(Ok(response));
    }

    pub async fn push_query_error(&self, error: RadarError) {
        self.responses.lock().await.push_back(Err(error));
    }

    /// Block ranges of all log queries so far, in order.
    pub async fn queries(&self) -> Vec<(u64, u64)> {
        self.queries.lock().await.clone()
    }

    pub async fn height_calls(&self) -> usize {
        *self.height_calls.lock().await
    }
}

impl LogSource for MockSource {
    async fn get_height(&self, _chain: &Chain) -> Result<u64, RadarError> {
        *self.height_calls.lock().await += 1;

        let next = self.heights.lock().await.pop_front();
        let mut last = self.last_height.lock().await;
        match next {
            Some(Ok(height)) => {
                *last = Some(height);
                Ok(height)
            }
            Some(Err(e)) => Err(e),
            None => last.ok_or(RadarError::NullResp),
        }
    }

    async fn query_logs(
        &self,
        _chain: &Chain,
        from_block: u64,
        to_block: u64,
    ) -> Result<LogsResponse, RadarError> {
        self.queries.lock().await.push((from_block, to_block));
        let height = self.last_height.lock().await.unwrap_or(to_block);
        if !self.query_delay.is_zero() {
            tokio::time::sleep(self.query_delay).await;
        }

        if let Some(response) = self.responses.lock().await.pop_front() {
            return response;
        }
        Ok(LogsResponse::empty(to_block.min(height) + 1, height))
    }
}

/// Deterministic transaction hash for test number `n`.
pub fn tx(n: u64) -> TxHash {
    B256::from(U256::from(n))
}

/// ERC-20 `Transfer` log emitted by `token`.
pub fn transfer_log(token: Address, from: Address, to: Address, value: U256) -> Log {
    Log {
        address: token,
        data: TransferEvent { from, to, value }.encode_log_data(),
    }
}

/// Transfer of the chain's token, as returned by a [`LogSource`].
pub fn raw_transfer(
    chain: &Chain,
    tx_hash: TxHash,
    block: u64,
    from: Address,
    to: Address,
    value: U256,
) -> RawLog {
    RawLog::new(
        tx_hash,
        block,
        0,
        None,
        transfer_log(chain.token(), from, to, value),
    )
}

/// Log with the `Transfer` signature but without the indexed parties.
pub fn malformed_transfer(chain: &Chain, tx_hash: TxHash, block: u64) -> RawLog {
    RawLog::new(
        tx_hash,
        block,
        0,
        None,
        Log {
            address: chain.token(),
            data: LogData::new_unchecked(vec![TRANSFER_TOPIC], Bytes::new()),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_height_script_repeats_last() {
        let source = MockSource::with_heights([5, 7]);
        source.push_height_error(RadarError::Transport("down".into())).await;
        let chain = Chain::base();

        assert_eq!(source.get_height(&chain).await, Ok(5));
        assert_eq!(source.get_height(&chain).await, Ok(7));
        assert!(source.get_height(&chain).await.is_err());
        assert_eq!(source.get_height(&chain).await, Ok(7));
        assert_eq!(source.height_calls().await, 4);
    }

    #[tokio::test]
    async fn test_unscripted_height_fails() {
        let source = MockSource::new();
        assert_eq!(
            source.get_height(&Chain::base()).await,
            Err(RadarError::NullResp)
        );
    }

    #[tokio::test]
    async fn test_default_response_is_clamped() {
        let source = MockSource::with_heights([100]);
        let chain = Chain::base();
        source.get_height(&chain).await.unwrap();

        let response = source.query_logs(&chain, 90, 10_090).await.unwrap();
        assert_eq!(response, LogsResponse::empty(101, 100));
        assert_eq!(source.queries().await, vec![(90, 10_090)]);
    }

    #[test]
    fn test_builders_decode() {
        let chain = Chain::base();
        let raw = raw_transfer(&chain, tx(1), 10, Address::ZERO, Address::ZERO, U256::from(3));
        assert_eq!(raw.log().address, chain.token());
        assert_eq!(crate::abi::decode_transfer(raw.log()).unwrap().value, U256::from(3));

        let bad = malformed_transfer(&chain, tx(2), 10);
        assert!(crate::abi::decode_transfer(bad.log()).is_err());
    }
}
