//! Fee ledger: swap fees recorded in per-second buckets and summed on read.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use ibc_tickets_backend::KeyValueBackend;
use ibc_tickets_core::{pool_fee_pattern, CodecError, Coin, Coins, PoolFeeKey, ValidationError};
use tracing::{debug, warn};

use crate::bounded::BoundedBackend;
use crate::config::{Expiry, StoreConfig};
use crate::error::{Result, TicketStoreError};

pub(crate) struct FeeLedger<B: ?Sized> {
    backend: BoundedBackend<B>,
    config: StoreConfig,
}

impl<B: KeyValueBackend + ?Sized> FeeLedger<B> {
    pub(crate) fn new(backend: BoundedBackend<B>, config: StoreConfig) -> Self {
        Self { backend, config }
    }

    /// Record a fee in the bucket for the current second.
    pub(crate) async fn record_swap_fee(&self, pool_id: &str, amount: &str, denom: &str) -> Result<PoolFeeKey> {
        self.record_swap_fee_at(pool_id, amount, denom, unix_now()).await
    }

    /// Record a fee in the bucket for `timestamp`, merging with what is there.
    pub(crate) async fn record_swap_fee_at(
        &self,
        pool_id: &str,
        amount: &str,
        denom: &str,
        timestamp: u64,
    ) -> Result<PoolFeeKey> {
        check_pool_id(pool_id)?;
        let coin = Coin::from_parts(amount, denom)?;
        let key = PoolFeeKey::new(pool_id, timestamp);
        let bucket = key.to_string();

        let mut coins = match self.backend.get(&bucket).await? {
            Some(existing) => decode_coins(&bucket, &existing)?,
            None => Coins::new(),
        };
        coins.add(coin)?;

        self.backend
            .set(&bucket, Bytes::from(coins.to_string()), self.config.ttl(Expiry::POOL))
            .await?;
        debug!(%bucket, %coins, "recorded swap fee");

        Ok(key)
    }

    /// Sum every live bucket of a pool.
    ///
    /// Not a snapshot: buckets written or expiring during the scan may or may
    /// not be counted.
    pub(crate) async fn swap_fees(&self, pool_id: &str) -> Result<Coins> {
        check_pool_id(pool_id)?;
        let buckets = self.backend.scan_all(&pool_fee_pattern(pool_id)).await?;

        let mut total = Coins::new();
        for bucket in buckets {
            let Some(value) = self.backend.get(&bucket).await? else {
                debug!(%bucket, "fee bucket expired during scan");
                continue;
            };
            total.merge(decode_coins(&bucket, &value)?)?;
        }

        Ok(total)
    }
}

fn check_pool_id(pool_id: &str) -> std::result::Result<(), ValidationError> {
    if pool_id.is_empty() {
        return Err(ValidationError::EmptyComponent("pool_id"));
    }
    for forbidden in ['/', '*', '?', '[', '\\'] {
        if pool_id.contains(forbidden) {
            return Err(ValidationError::ForbiddenChar {
                component: "pool_id",
                forbidden,
                value: pool_id.to_string(),
            });
        }
    }
    Ok(())
}

fn decode_coins(bucket: &str, value: &[u8]) -> Result<Coins> {
    let decode_error = |source: CodecError| TicketStoreError::Decode {
        key: bucket.to_string(),
        source,
    };

    let text = std::str::from_utf8(value).map_err(|e| decode_error(CodecError::Malformed(e.to_string())))?;
    Coins::parse(text).map_err(|e| {
        warn!(bucket, value = text, "undecodable fee bucket");
        decode_error(CodecError::Malformed(e.to_string()))
    })
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
