//! Types shared by the container-group and resource-group modules.

use std::collections::BTreeMap;

/// Resource tags, serialized in key order.
pub type Tags = BTreeMap<String, String>;

/// What a delete request achieved at the time the call returned.
///
/// Deletion is asynchronous on the service side: `Accepted` means ARM queued
/// the delete, and a subsequent read may still see the resource briefly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// 200: the resource was deleted.
    Deleted,
    /// 202: deletion was accepted and continues in the background.
    Accepted,
    /// 204 or 404: nothing existed to delete.
    AlreadyAbsent,
}

impl DeleteOutcome {
    /// Map a delete response status, or `None` when the status is a failure.
    pub(crate) fn from_status(status: u16) -> Option<Self> {
        match status {
            200 => Some(Self::Deleted),
            202 => Some(Self::Accepted),
            204 | 404 => Some(Self::AlreadyAbsent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_outcome_from_status() {
        assert_eq!(DeleteOutcome::from_status(200), Some(DeleteOutcome::Deleted));
        assert_eq!(DeleteOutcome::from_status(202), Some(DeleteOutcome::Accepted));
        assert_eq!(DeleteOutcome::from_status(204), Some(DeleteOutcome::AlreadyAbsent));
        assert_eq!(DeleteOutcome::from_status(404), Some(DeleteOutcome::AlreadyAbsent));
        assert_eq!(DeleteOutcome::from_status(409), None);
        assert_eq!(DeleteOutcome::from_status(500), None);
    }
}
