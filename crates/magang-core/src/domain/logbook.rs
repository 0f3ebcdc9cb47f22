// ============================================================================
// Magang Core - Logbook Entry Entity
// File: crates/magang-core/src/domain/logbook.rs
// Description: Daily activity record and its approval status
// ============================================================================

use chrono::NaiveDate;
use magang_shared::{Lifecycle, Timestamps};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ConflictError, ValidationError};

/// Approval status of a logbook entry.
///
/// Any status may be set from any other by an authorised reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogbookStatus {
    #[serde(alias = "menunggu")]
    Pending,
    #[serde(alias = "disetujui")]
    Approved,
    #[serde(alias = "ditolak")]
    Rejected,
}

impl LogbookStatus {
    pub const ALL: [LogbookStatus; 3] = [
        LogbookStatus::Pending,
        LogbookStatus::Approved,
        LogbookStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogbookStatus::Pending => "pending",
            LogbookStatus::Approved => "approved",
            LogbookStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" | "menunggu" => Some(LogbookStatus::Pending),
            "approved" | "disetujui" => Some(LogbookStatus::Approved),
            "rejected" | "ditolak" => Some(LogbookStatus::Rejected),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::from_str(s.trim()).ok_or_else(|| ValidationError::InvalidStatus(s.to_string()))
    }
}

impl Default for LogbookStatus {
    fn default() -> Self {
        LogbookStatus::Pending
    }
}

/// Attendance marker for the logged day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Hadir,
    Izin,
    Sakit,
}

impl Attendance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attendance::Hadir => "hadir",
            Attendance::Izin => "izin",
            Attendance::Sakit => "sakit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hadir" | "present" => Some(Attendance::Hadir),
            "izin" | "excused" => Some(Attendance::Izin),
            "sakit" | "sick" => Some(Attendance::Sakit),
            _ => None,
        }
    }
}

/// Which entries a listing may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogbookScope {
    All,
    Owner(Uuid),
    /// Entries of participants with an active placement under this supervisor.
    Supervisor(Uuid),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: LogbookStatus, n: i64) {
        match status {
            LogbookStatus::Pending => self.pending += n,
            LogbookStatus::Approved => self.approved += n,
            LogbookStatus::Rejected => self.rejected += n,
        }
    }
}

/// Logbook entry entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogbookEntry {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub activity_date: NaiveDate,

    #[validate(length(min = 1, max = 5000, message = "Activity description must be 1-5000 characters"))]
    pub description: String,

    pub evidence: Option<String>,
    pub attendance: Option<Attendance>,
    pub status: LogbookStatus,

    pub lifecycle: Lifecycle,
    pub timestamps: Timestamps,
}

impl LogbookEntry {
    /// New entries always start `Pending`.
    pub fn new(
        participant_id: Uuid,
        activity_date: NaiveDate,
        description: String,
        evidence: Option<String>,
        attendance: Option<Attendance>,
    ) -> Result<Self, validator::ValidationErrors> {
        let entry = Self {
            id: Uuid::new_v4(),
            participant_id,
            activity_date,
            description: description.trim().to_string(),
            evidence,
            attendance,
            status: LogbookStatus::Pending,
            lifecycle: Lifecycle::Active,
            timestamps: Timestamps::now(),
        };

        entry.validate()?;
        Ok(entry)
    }

    pub fn is_owned_by(&self, user_id: &Uuid) -> bool {
        self.participant_id == *user_id
    }

    pub fn set_status(&mut self, status: LogbookStatus) {
        self.status = status;
        self.timestamps.touch();
    }

    /// Content can only change while the entry awaits review.
    pub fn ensure_editable(&self) -> Result<(), ConflictError> {
        match self.status {
            LogbookStatus::Pending => Ok(()),
            _ => Err(ConflictError::EntryLocked(self.id)),
        }
    }

    /// Returns the replaced evidence reference, if any.
    pub fn edit(
        &mut self,
        activity_date: Option<NaiveDate>,
        description: Option<String>,
        attendance: Option<Attendance>,
        evidence: Option<String>,
    ) -> Result<Option<String>, ConflictError> {
        self.ensure_editable()?;

        if let Some(date) = activity_date {
            self.activity_date = date;
        }
        if let Some(text) = description {
            self.description = text.trim().to_string();
        }
        if attendance.is_some() {
            self.attendance = attendance;
        }
        let replaced = match evidence {
            Some(reference) => self.evidence.replace(reference),
            None => None,
        };
        self.timestamps.touch();
        Ok(replaced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> LogbookEntry {
        LogbookEntry::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            "lab session".into(),
            None,
            Some(Attendance::Hadir),
        )
        .unwrap()
    }

    #[test]
    fn test_new_entry_is_pending() {
        assert_eq!(entry().status, LogbookStatus::Pending);
    }

    #[test]
    fn test_blank_description_rejected() {
        let result = LogbookEntry::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            "   ".into(),
            None,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(LogbookStatus::parse("approved"), Ok(LogbookStatus::Approved));
        assert_eq!(LogbookStatus::parse("ditolak"), Ok(LogbookStatus::Rejected));
        assert_eq!(LogbookStatus::parse(" pending "), Ok(LogbookStatus::Pending));
        assert_eq!(
            LogbookStatus::parse("selesai"),
            Err(ValidationError::InvalidStatus("selesai".into()))
        );
    }

    #[test]
    fn test_status_is_freely_reassignable() {
        let mut e = entry();
        for from in LogbookStatus::ALL {
            for to in LogbookStatus::ALL {
                e.set_status(from);
                e.set_status(to);
                assert_eq!(e.status, to);
            }
        }
    }

    #[test]
    fn test_edit_locked_after_review() {
        let mut e = entry();
        let replaced = e
            .edit(None, Some("revisi".into()), None, Some("/uploads/a.png".into()))
            .unwrap();
        assert_eq!(replaced, None);
        assert_eq!(e.description, "revisi");

        e.set_status(LogbookStatus::Approved);
        assert_eq!(
            e.edit(None, Some("lagi".into()), None, None),
            Err(ConflictError::EntryLocked(e.id))
        );
        assert_eq!(e.description, "revisi");
    }

    #[test]
    fn test_status_counts() {
        let mut counts = StatusCounts::default();
        counts.add(LogbookStatus::Pending, 2);
        counts.add(LogbookStatus::Rejected, 1);
        assert_eq!(counts, StatusCounts { pending: 2, approved: 0, rejected: 1 });
    }
}
