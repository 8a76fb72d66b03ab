//! Owner index: one unordered set per owner holding its outstanding origin keys.

use std::collections::BTreeMap;

use ibc_tickets_backend::KeyValueBackend;
use ibc_tickets_core::{OriginKey, OwnerId};
use tracing::debug;

use crate::bounded::BoundedBackend;
use crate::error::Result;

pub(crate) struct OwnerIndex<B: ?Sized> {
    backend: BoundedBackend<B>,
}

impl<B: KeyValueBackend + ?Sized> OwnerIndex<B> {
    pub(crate) fn new(backend: BoundedBackend<B>) -> Self {
        Self { backend }
    }

    pub(crate) async fn add(&self, owner: &OwnerId, key: &OriginKey) -> Result<()> {
        let added = self.backend.set_add(owner.as_str(), &key.to_string()).await?;
        if !added {
            debug!(%owner, %key, "key already indexed");
        }
        Ok(())
    }

    pub(crate) async fn remove(&self, owner: &OwnerId, key: &OriginKey) -> Result<()> {
        let removed = self.backend.set_remove(owner.as_str(), &key.to_string()).await?;
        if !removed {
            debug!(%owner, %key, "key was not indexed");
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn contains(&self, owner: &OwnerId, key: &OriginKey) -> Result<bool> {
        let key = key.to_string();
        Ok(self
            .backend
            .set_members(owner.as_str())
            .await?
            .iter()
            .any(|member| *member == key))
    }

    /// Outstanding keys grouped by chain, tx hashes sorted.
    ///
    /// A member that is not a well-formed origin key fails the whole call.
    pub(crate) async fn by_chain(&self, owner: &OwnerId) -> Result<BTreeMap<String, Vec<String>>> {
        let members = self.backend.set_members(owner.as_str()).await?;

        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for member in members {
            let key = OriginKey::parse(&member)?;
            grouped
                .entry(key.chain().to_string())
                .or_default()
                .push(key.tx_hash().to_string());
        }
        for hashes in grouped.values_mut() {
            hashes.sort();
        }

        Ok(grouped)
    }
}
