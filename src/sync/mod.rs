//! Outbox for marker writes to the remote store
//!
//! Marker mutations are applied to the in-memory layer first and then queued
//! here. The store collaborator takes the queued writes, performs them, and
//! reports failures back by op id. A failure is surfaced to the user but never
//! rolls back the local mutation: the local list stays the source of truth for
//! the session.

use crate::error::AnnotationError;
use crate::models::serde_helpers::MAX_SAFE_INTEGER;
use crate::models::{Marker, MarkerId};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// A remote write
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SyncOp {
    /// Create or merge the marker document
    Upsert { marker: Marker },
    /// Delete the marker document
    Delete { id: MarkerId },
}

impl SyncOp {
    pub fn marker_id(&self) -> &MarkerId {
        match self {
            SyncOp::Upsert { marker } => &marker.id,
            SyncOp::Delete { id } => id,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, SyncOp::Delete { .. })
    }
}

/// A queued write, addressed by op id for failure reports
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PendingWrite {
    pub op_id: u64,
    pub project_id: String,
    #[serde(flatten)]
    pub op: SyncOp,
}

/// Check marker fields before anything is queued
///
/// The store rejects non-integral or out-of-range numbers, so a marker that
/// fails here is never sent.
pub fn validate_marker(marker: &Marker) -> Result<(), AnnotationError> {
    let in_range = |n: usize| (n as u64) <= MAX_SAFE_INTEGER;
    if !(in_range(marker.block_index) && in_range(marker.start) && in_range(marker.end)) {
        return Err(AnnotationError::Validation(format!(
            "marker {} has out-of-range indices",
            marker.id
        )));
    }
    if marker.start > marker.end {
        return Err(AnnotationError::Validation(format!(
            "marker {} has start {} after end {}",
            marker.id, marker.start, marker.end
        )));
    }
    Ok(())
}

/// Queue of writes waiting for the store, plus writes taken but not settled
#[derive(Clone, Debug, Default)]
pub struct Outbox {
    queue: VecDeque<PendingWrite>,
    in_flight: HashMap<u64, SyncOp>,
    next_op_id: u64,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an upsert; `updated_at` on the queued copy is stamped with `now`
    pub fn enqueue_upsert(&mut self, project_id: &str, marker: &Marker, now: i64) -> Result<u64, AnnotationError> {
        validate_marker(marker)?;
        let mut marker = marker.clone();
        marker.updated_at = now;
        Ok(self.push(project_id, SyncOp::Upsert { marker }))
    }

    pub fn enqueue_delete(&mut self, project_id: &str, id: &MarkerId) -> u64 {
        self.push(project_id, SyncOp::Delete { id: id.clone() })
    }

    fn push(&mut self, project_id: &str, op: SyncOp) -> u64 {
        self.next_op_id += 1;
        let op_id = self.next_op_id;
        log::debug!("outbox #{}: {} {}", op_id, if op.is_delete() { "delete" } else { "upsert" }, op.marker_id());
        self.queue.push_back(PendingWrite {
            op_id,
            project_id: project_id.to_string(),
            op,
        });
        op_id
    }

    /// Hand all queued writes to the store collaborator
    pub fn take_pending(&mut self) -> Vec<PendingWrite> {
        let taken: Vec<PendingWrite> = self.queue.drain(..).collect();
        for write in &taken {
            self.in_flight.insert(write.op_id, write.op.clone());
        }
        taken
    }

    /// Settle a write that succeeded
    pub fn acknowledge(&mut self, op_id: u64) -> bool {
        self.in_flight.remove(&op_id).is_some()
    }

    /// Settle a write that failed; returns the failed op, if it was known
    pub fn report_failure(&mut self, op_id: u64, reason: &str) -> Option<SyncOp> {
        let op = self.in_flight.remove(&op_id)?;
        log::warn!("outbox #{} failed for {}: {}", op_id, op.marker_id(), reason);
        Some(op)
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    /// Drop queued and in-flight writes (project switch, logout)
    pub fn clear(&mut self) {
        self.queue.clear();
        self.in_flight.clear();
    }
}
