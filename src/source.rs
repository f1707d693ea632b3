use std::{future::Future, sync::Arc};

use alloy::{providers::Provider, rpc::types::Filter};
use tracing::warn;

use crate::{
    Chain,
    abi::TRANSFER_TOPIC,
    error::RadarError,
    types::{LogsResponse, RawLog},
};

/// Upstream chain-indexing service.
///
/// `get_height` is expected to be cheap and is called on every poll tick,
/// `query_logs` is the heavy call and is only issued when the height moves.
pub trait LogSource: Send + Sync {
    /// Most recent block number known to the provider.
    fn get_height(&self, chain: &Chain) -> impl Future<Output = Result<u64, RadarError>> + Send;

    /// `Transfer` logs of the chain's token in `from_block..=to_block`.
    ///
    /// The provider may cover less than requested, the returned
    /// [`LogsResponse::next_block`] tells where to continue from.
    fn query_logs(
        &self,
        chain: &Chain,
        from_block: u64,
        to_block: u64,
    ) -> impl Future<Output = Result<LogsResponse, RadarError>> + Send;
}

impl<T: LogSource> LogSource for Arc<T> {
    fn get_height(&self, chain: &Chain) -> impl Future<Output = Result<u64, RadarError>> + Send {
        (**self).get_height(chain)
    }

    fn query_logs(
        &self,
        chain: &Chain,
        from_block: u64,
        to_block: u64,
    ) -> impl Future<Output = Result<LogsResponse, RadarError>> + Send {
        (**self).query_logs(chain, from_block, to_block)
    }
}

/// [`LogSource`] over plain JSON-RPC (`eth_blockNumber` / `eth_getLogs`).
///
/// JSON-RPC has no continuation cursor, so the requested range is clamped
/// to the current head and the continuation is the block right after it.
///
/// It is recommended to setup provider with
/// [`alloy::transports::layers::RetryBackoffLayer`].
#[derive(Clone, Debug)]
pub struct RpcSource<P> {
    provider: P,
}

impl<P> RpcSource<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: Provider + Send + Sync> LogSource for RpcSource<P> {
    async fn get_height(&self, _chain: &Chain) -> Result<u64, RadarError> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn query_logs(
        &self,
        chain: &Chain,
        from_block: u64,
        to_block: u64,
    ) -> Result<LogsResponse, RadarError> {
        let head = self.provider.get_block_number().await?;
        if from_block > head {
            return Ok(LogsResponse::empty(from_block, head));
        }
        let to_block = to_block.min(head);

        let filter = Filter::new()
            .address(chain.token())
            .event_signature(TRANSFER_TOPIC)
            .from_block(from_block)
            .to_block(to_block);
        let logs = self.provider.get_logs(&filter).await?;

        let logs = logs
            .into_iter()
            .filter(|log| !log.removed)
            .filter_map(|log| {
                let (Some(tx_hash), Some(block_number)) = (log.transaction_hash, log.block_number)
                else {
                    // Pending logs carry no transaction context to deduplicate on
                    warn!(
                        chain = %chain.name(),
                        tx_hash = ?log.transaction_hash,
                        block_number = ?log.block_number,
                        "Skipping log without transaction context"
                    );
                    return None;
                };
                Some(RawLog::new(
                    tx_hash,
                    block_number,
                    log.log_index.unwrap_or_default(),
                    log.block_timestamp,
                    log.inner,
                ))
            })
            .collect();

        Ok(LogsResponse::new(logs, to_block + 1, head))
    }
}
