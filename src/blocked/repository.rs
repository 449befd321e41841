use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::blocked::{Availability, BlockedPeriod, NewBlockedPeriod};
use crate::ids::generate_id;
use crate::kv::{decode_list, KvError, KvStore};
use crate::rooms::RoomId;

/// Storage key holding the serialized list of blocks
pub const BLOCKED_STORAGE_KEY: &str = "ohana_blocked";

/// Store of blocked periods
///
/// The whole list lives under one key and every write replaces it
/// (read-modify-write, last writer wins). Reads fail open to an empty list
/// and write failures are logged, never returned. A write whose read fails
/// is dropped, so an unreadable list is never replaced.
#[derive(Clone)]
pub struct BlockedPeriodRepository {
    kv: Arc<dyn KvStore>,
}

impl BlockedPeriodRepository {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Read the stored list, surfacing backend failures
    async fn load(&self) -> Result<Vec<BlockedPeriod>, KvError> {
        let raw = self.kv.get(BLOCKED_STORAGE_KEY).await?;
        Ok(decode_list(BLOCKED_STORAGE_KEY, raw))
    }

    /// Replace the stored list, logging instead of failing
    async fn persist(&self, list: &[BlockedPeriod]) {
        let encoded = match serde_json::to_string(list) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode blocked periods: {}", e);
                return;
            }
        };
        if let Err(e) = self.kv.set(BLOCKED_STORAGE_KEY, &encoded).await {
            warn!(
                "Failed to persist {} blocked periods to {}: {}",
                list.len(),
                self.kv.backend(),
                e
            );
        }
    }

    /// All current blocks; empty when the backend cannot be read
    pub async fn list(&self) -> Vec<BlockedPeriod> {
        match self.load().await {
            Ok(list) => list,
            Err(e) => {
                warn!("Blocked periods unavailable, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Append a block and persist the list
    ///
    /// The returned period is not guaranteed to be persisted.
    pub async fn add(&self, new: NewBlockedPeriod) -> BlockedPeriod {
        let period = BlockedPeriod {
            id: generate_id("blk"),
            room_id: new.room_id,
            check_in: new.check_in,
            check_out: new.check_out,
            note: new.note,
            session_id: new.session_id,
        };

        let mut list = match self.load().await {
            Ok(list) => list,
            Err(e) => {
                warn!(
                    "Blocked periods unreadable, block {} for room {} not persisted: {}",
                    period.id, period.room_id, e
                );
                return period;
            }
        };
        list.push(period.clone());
        self.persist(&list).await;

        info!(
            "Blocked room {} from {} to {} ({})",
            period.room_id, period.check_in, period.check_out, period.id
        );
        period
    }

    /// Remove a block by id; false when it was not present
    pub async fn remove(&self, id: &str) -> bool {
        let list = match self.load().await {
            Ok(list) => list,
            Err(e) => {
                warn!("Blocked periods unreadable, cannot remove {}: {}", id, e);
                return false;
            }
        };
        let before = list.len();
        let filtered: Vec<BlockedPeriod> = list.into_iter().filter(|b| b.id != id).collect();
        if filtered.len() == before {
            debug!("Blocked period {} not found for removal", id);
            return false;
        }
        self.persist(&filtered).await;
        info!("Removed blocked period {}", id);
        true
    }

    /// Whether any stored block of `room` intersects the stay
    pub async fn is_overlapping(&self, room: RoomId, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.list()
            .await
            .iter()
            .any(|b| b.blocks(room, check_in, check_out))
    }

    /// Typed availability, distinguishing an unreadable store
    pub async fn check_availability(
        &self,
        room: RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Availability {
        match self.load().await {
            Ok(list) if list.iter().any(|b| b.blocks(room, check_in, check_out)) => {
                Availability::Blocked
            }
            Ok(_) => Availability::Available,
            Err(e) => {
                warn!("Availability unknown for room {}: {}", room, e);
                Availability::Unknown
            }
        }
    }

    /// The block created for a payment session, if any
    pub async fn find_by_session(&self, session_id: &str) -> Result<Option<BlockedPeriod>, KvError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|b| b.session_id.as_deref() == Some(session_id)))
    }
}
