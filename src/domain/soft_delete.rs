//! Soft-delete bookkeeping shared by every parking record

use chrono::{DateTime, Utc};

/// Deletion flag plus the moment the record was retired.
///
/// Records are never physically removed by normal operations; a retired
/// record simply stops matching "active" lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoftDelete {
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SoftDelete {
    pub fn active() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    pub fn retire(&mut self, at: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
    }
}
