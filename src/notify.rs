//! User-visible notifications
//!
//! The session queues transient messages (overlap conflicts, validation and
//! sync failures); the toast collaborator drains them after each call.

use crate::config::Messages;
use crate::error::AnnotationError;
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Info,
    Warning,
    Error,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    /// Localized notification for an annotation error
    pub fn from_error(err: &AnnotationError, messages: &Messages) -> Self {
        match err {
            AnnotationError::Overlap { .. } => Self::warning(&messages.overlap_conflict),
            AnnotationError::Validation(_) => Self::error(&messages.invalid_marker),
            AnnotationError::MarkerNotFound(_) => Self::warning(&messages.marker_not_found),
            AnnotationError::CollectionNotFound(_) => Self::warning(&messages.collection_not_found),
            AnnotationError::NoActiveCollection => Self::warning(&messages.no_active_collection),
            AnnotationError::Persistence { deleted: true, .. } => Self::error(&messages.marker_delete_failed),
            AnnotationError::Persistence { .. } => Self::error(&messages.marker_save_failed),
        }
    }
}

/// FIFO of pending notifications
#[derive(Clone, Debug, Default)]
pub struct NotificationQueue {
    queue: VecDeque<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        log::info!("notify {:?}: {}", notification.kind, notification.message);
        self.queue.push_back(notification);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take everything queued so far, oldest first
    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MarkerId;

    #[test]
    fn test_error_mapping_uses_messages() {
        let messages = Messages::default();
        let err = AnnotationError::Overlap {
            block_index: 0,
            start: 1,
            end: 2,
            existing: MarkerId::new("m_1").unwrap(),
        };

        let n = Notification::from_error(&err, &messages);
        assert_eq!(n.kind, NotificationKind::Warning);
        assert_eq!(n.message, messages.overlap_conflict);
    }

    #[test]
    fn test_drain_empties_queue_in_order() {
        let mut queue = NotificationQueue::new();
        queue.push(Notification::info("a"));
        queue.push(Notification::error("b"));

        let drained = queue.drain();
        assert_eq!(drained.iter().map(|n| n.message.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(queue.is_empty());
    }
}
