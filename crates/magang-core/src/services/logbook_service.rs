// ============================================================================
// Magang Core - Logbook Service
// File: crates/magang-core/src/services/logbook_service.rs
// ============================================================================
//! Logbook submission, review status and visibility
//!
//! Entries start `pending`. Admins and the owner's current supervisor may set
//! any of the three statuses at any time; the owner may edit content only
//! while the entry is still pending.

use std::sync::Arc;
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::authorization::{ensure_owner, require, Operation};
use crate::domain::{
    Attendance, FileUpload, Identity, LogbookEntry, LogbookScope, LogbookStatus, Role, UploadKind,
    UploadPolicy,
};
use crate::error::{AuthzError, DomainError, ValidationError};
use crate::repositories::{FileStorage, LogbookRepository, UserRepository};
use crate::services::PlacementService;

#[derive(Debug, Clone)]
pub struct SubmitLogbook {
    pub activity_date: NaiveDate,
    pub description: String,
    pub attendance: Option<Attendance>,
    pub evidence: Option<FileUpload>,
}

#[derive(Debug, Clone, Default)]
pub struct EditLogbook {
    pub activity_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub attendance: Option<Attendance>,
    pub evidence: Option<FileUpload>,
}

pub struct LogbookService {
    entries: Arc<dyn LogbookRepository>,
    users: Arc<dyn UserRepository>,
    placements: Arc<PlacementService>,
    storage: Arc<dyn FileStorage>,
    policy: UploadPolicy,
}

impl LogbookService {
    pub fn new(
        entries: Arc<dyn LogbookRepository>,
        users: Arc<dyn UserRepository>,
        placements: Arc<PlacementService>,
        storage: Arc<dyn FileStorage>,
        policy: UploadPolicy,
    ) -> Self {
        Self { entries, users, placements, storage, policy }
    }

    pub async fn submit(&self, caller: &Identity, input: SubmitLogbook) -> Result<LogbookEntry, DomainError> {
        require(caller, Operation::SubmitLogbook)?;
        if input.description.trim().is_empty() {
            return Err(ValidationError::MissingField("kegiatan".into()).into());
        }
        let extension = match &input.evidence {
            Some(upload) => Some(self.policy.check(UploadKind::Evidence, upload)?),
            None => None,
        };

        let owner = self
            .users
            .find_by_id(&caller.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", &caller.user_id))?;
        if !owner.can_submit_reports() {
            warn!("Participant {} submitted a logbook entry while locked", owner.id);
            return Err(AuthzError::Forbidden("account is locked until a placement is assigned".into()).into());
        }

        let evidence = match (input.evidence, extension) {
            (Some(upload), Some(ext)) => {
                Some(self.storage.store(UploadKind::Evidence, &ext, upload.bytes).await?)
            }
            _ => None,
        };

        let entry = match LogbookEntry::new(
            owner.id,
            input.activity_date,
            input.description,
            evidence.clone(),
            input.attendance,
        ) {
            Ok(entry) => entry,
            Err(e) => {
                self.discard(evidence.as_deref()).await;
                return Err(e.into());
            }
        };

        match self.entries.create(&entry).await {
            Ok(created) => {
                info!("Logbook entry {} submitted by {}", created.id, owner.id);
                Ok(created)
            }
            Err(e) => {
                self.discard(evidence.as_deref()).await;
                Err(e)
            }
        }
    }

    pub async fn list_mine(&self, caller: &Identity) -> Result<Vec<LogbookEntry>, DomainError> {
        require(caller, Operation::ReadOwnLogbook)?;
        self.entries.list(LogbookScope::Owner(caller.user_id)).await
    }

    /// Entries of every participant currently placed under the caller.
    pub async fn list_supervised(&self, caller: &Identity) -> Result<Vec<LogbookEntry>, DomainError> {
        require(caller, Operation::ReadSupervisedLogbook)?;
        self.entries.list(LogbookScope::Supervisor(caller.user_id)).await
    }

    pub async fn list_all(&self, caller: &Identity) -> Result<Vec<LogbookEntry>, DomainError> {
        require(caller, Operation::ReadAllLogbook)?;
        self.entries.list(LogbookScope::All).await
    }

    pub async fn get(&self, caller: &Identity, id: &Uuid) -> Result<LogbookEntry, DomainError> {
        require(caller, Operation::ReadLogbookEntry)?;
        let entry = self.find(id).await?;

        let visible = match caller.role {
            Role::Admin => true,
            Role::Participant => entry.is_owned_by(&caller.user_id),
            Role::Supervisor => self.supervises(caller, &entry).await?,
        };
        if !visible {
            return Err(AuthzError::Forbidden("entry is not visible to this user".into()).into());
        }
        Ok(entry)
    }

    pub async fn update_content(
        &self,
        caller: &Identity,
        id: &Uuid,
        input: EditLogbook,
    ) -> Result<LogbookEntry, DomainError> {
        require(caller, Operation::EditOwnLogbook)?;
        if matches!(&input.description, Some(text) if text.trim().is_empty()) {
            return Err(ValidationError::MissingField("kegiatan".into()).into());
        }
        let extension = match &input.evidence {
            Some(upload) => Some(self.policy.check(UploadKind::Evidence, upload)?),
            None => None,
        };

        let mut entry = self.find(id).await?;
        ensure_owner(caller, &entry.participant_id)?;
        entry.ensure_editable()?;

        let evidence = match (input.evidence, extension) {
            (Some(upload), Some(ext)) => {
                Some(self.storage.store(UploadKind::Evidence, &ext, upload.bytes).await?)
            }
            _ => None,
        };

        let replaced = match entry.edit(input.activity_date, input.description, input.attendance, evidence.clone()) {
            Ok(replaced) => replaced,
            Err(e) => {
                self.discard(evidence.as_deref()).await;
                return Err(e.into());
            }
        };

        let updated = match self.entries.update_content(&entry).await {
            Ok(updated) => updated,
            Err(e) => {
                self.discard(evidence.as_deref()).await;
                return Err(e);
            }
        };
        self.discard(replaced.as_deref()).await;

        info!("Logbook entry {} edited by owner", updated.id);
        Ok(updated)
    }

    /// Admin or the owner's current supervisor may set any status.
    pub async fn update_status(
        &self,
        caller: &Identity,
        id: &Uuid,
        status: &str,
    ) -> Result<LogbookEntry, DomainError> {
        require(caller, Operation::SetLogbookStatus)?;
        let status = LogbookStatus::parse(status)?;

        let mut entry = self.find(id).await?;
        if caller.role == Role::Supervisor && !self.supervises(caller, &entry).await? {
            warn!(
                "Supervisor {} tried to review entry {} of an unsupervised participant",
                caller.user_id, entry.id
            );
            return Err(AuthzError::Forbidden("participant is not supervised by this user".into()).into());
        }

        let previous = entry.status;
        entry.set_status(status);
        let updated = self.entries.set_status(&entry).await?;

        info!(
            "Logbook entry {} status {} -> {} by {}",
            updated.id,
            previous.as_str(),
            updated.status.as_str(),
            caller.user_id
        );
        Ok(updated)
    }

    /// Admins delete any entry, participants only their own.
    pub async fn remove(&self, caller: &Identity, id: &Uuid) -> Result<(), DomainError> {
        require(caller, Operation::DeleteLogbook)?;
        let entry = self.find(id).await?;
        if caller.role == Role::Participant {
            ensure_owner(caller, &entry.participant_id)?;
        }

        self.entries.soft_delete(id, Utc::now()).await?;
        info!("Logbook entry {} deleted by {}", id, caller.user_id);
        Ok(())
    }

    async fn supervises(&self, caller: &Identity, entry: &LogbookEntry) -> Result<bool, DomainError> {
        Ok(self.placements.resolve_supervisor(&entry.participant_id).await? == Some(caller.user_id))
    }

    async fn find(&self, id: &Uuid) -> Result<LogbookEntry, DomainError> {
        self.entries
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("logbook entry", id))
    }

    async fn discard(&self, reference: Option<&str>) {
        if let Some(reference) = reference {
            if let Err(e) = self.storage.remove(reference).await {
                warn!("Failed to remove stored file {}: {}", reference, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Company, User};
    use crate::error::ConflictError;
    use crate::services::PlacementInput;
    use crate::testing::{identity_of, InMemoryStore};

    struct Fixture {
        store: Arc<InMemoryStore>,
        placements: Arc<PlacementService>,
        logbook: LogbookService,
        admin: Identity,
        company: Company,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let admin = identity_of(&store.seed_user(Role::Admin, "admin"));
        let company = store.seed_company("PT Nusantara");
        let placements = Arc::new(PlacementService::new(store.clone(), store.clone(), store.clone()));
        let logbook = LogbookService::new(
            store.clone(),
            store.clone(),
            placements.clone(),
            store.clone(),
            UploadPolicy::new(5 * 1024 * 1024),
        );
        Fixture { store, placements, logbook, admin, company }
    }

    impl Fixture {
        async fn place(&self, participant: &User, supervisor: &User) -> Uuid {
            self.placements
                .create(&self.admin, PlacementInput {
                    participant_id: participant.id,
                    supervisor_id: supervisor.id,
                    company_id: self.company.id,
                })
                .await
                .unwrap()
                .id
        }
    }

    fn submission(date: (i32, u32, u32), text: &str) -> SubmitLogbook {
        SubmitLogbook {
            activity_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            description: text.into(),
            attendance: Some(Attendance::Hadir),
            evidence: None,
        }
    }

    #[tokio::test]
    async fn test_submit_review_flow() {
        let f = fixture();
        let amara = f.store.seed_user(Role::Participant, "amara");
        let budi = f.store.seed_user(Role::Supervisor, "budi");
        f.place(&amara, &budi).await;
        let me = identity_of(&amara);

        let entry = f.logbook.submit(&me, submission((2024, 5, 1), "lab session")).await.unwrap();
        assert_eq!(entry.status, LogbookStatus::Pending);

        let mine = f.logbook.list_mine(&me).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].status, LogbookStatus::Pending);

        f.logbook.update_status(&f.admin, &entry.id, "approved").await.unwrap();
        let mine = f.logbook.list_mine(&me).await.unwrap();
        assert_eq!(mine[0].status, LogbookStatus::Approved);

        // Reviewers may move an entry back to pending.
        let reset = f.logbook.update_status(&identity_of(&budi), &entry.id, "pending").await.unwrap();
        assert_eq!(reset.status, LogbookStatus::Pending);
    }

    #[tokio::test]
    async fn test_locked_participant_cannot_submit() {
        let f = fixture();
        let me = identity_of(&f.store.seed_user(Role::Participant, "amara"));
        let err = f.logbook.submit(&me, submission((2024, 5, 1), "lab")).await.unwrap_err();
        assert!(matches!(err, DomainError::Authz(AuthzError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_invalid_status_rejected() {
        let f = fixture();
        let amara = f.store.seed_user(Role::Participant, "amara");
        let entry = f.store.seed_entry(&amara, (2024, 5, 1), "lab");

        let err = f.logbook.update_status(&f.admin, &entry.id, "selesai").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(ValidationError::InvalidStatus(_))));
        assert_eq!(f.store.entry(&entry.id).status, LogbookStatus::Pending);
    }

    #[tokio::test]
    async fn test_supervisor_reviews_only_supervised_entries() {
        let f = fixture();
        let amara = f.store.seed_user(Role::Participant, "amara");
        let budi = f.store.seed_user(Role::Supervisor, "budi");
        let sari = f.store.seed_user(Role::Supervisor, "sari");
        f.place(&amara, &budi).await;
        let entry = f.store.seed_entry(&amara, (2024, 5, 1), "lab");

        let err = f.logbook.update_status(&identity_of(&sari), &entry.id, "approved").await.unwrap_err();
        assert!(matches!(err, DomainError::Authz(AuthzError::Forbidden(_))));
        assert!(f.logbook.get(&identity_of(&sari), &entry.id).await.is_err());

        let approved = f.logbook.update_status(&identity_of(&budi), &entry.id, "disetujui").await.unwrap();
        assert_eq!(approved.status, LogbookStatus::Approved);
    }

    #[tokio::test]
    async fn test_supervisor_sees_exactly_supervised_entries() {
        let f = fixture();
        let budi = f.store.seed_user(Role::Supervisor, "budi");
        let sari = f.store.seed_user(Role::Supervisor, "sari");
        let amara = f.store.seed_user(Role::Participant, "amara");
        let bayu = f.store.seed_user(Role::Participant, "bayu");
        let citra = f.store.seed_user(Role::Participant, "citra");
        f.place(&amara, &budi).await;
        f.place(&bayu, &sari).await;
        let citra_placement = f.place(&citra, &budi).await;

        let a1 = f.store.seed_entry(&amara, (2024, 5, 1), "a1");
        let a2 = f.store.seed_entry(&amara, (2024, 5, 3), "a2");
        f.store.seed_entry(&bayu, (2024, 5, 2), "b1");
        f.store.seed_entry(&citra, (2024, 5, 2), "c1");

        f.placements.remove(&f.admin, &citra_placement).await.unwrap();

        let seen = f.logbook.list_supervised(&identity_of(&budi)).await.unwrap();
        let ids: Vec<Uuid> = seen.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a2.id, a1.id]);
    }

    #[tokio::test]
    async fn test_participant_cannot_touch_others_entries() {
        let f = fixture();
        let amara = f.store.seed_user(Role::Participant, "amara");
        let bayu = f.store.seed_user(Role::Participant, "bayu");
        let entry = f.store.seed_entry(&amara, (2024, 5, 1), "lab");
        let intruder = identity_of(&bayu);

        let err = f.logbook.remove(&intruder, &entry.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Authz(AuthzError::Forbidden(_))));

        let edit = EditLogbook { description: Some("diubah".into()), ..Default::default() };
        let err = f.logbook.update_content(&intruder, &entry.id, edit).await.unwrap_err();
        assert!(matches!(err, DomainError::Authz(AuthzError::Forbidden(_))));
        assert_eq!(f.store.entry(&entry.id).description, "lab");

        f.logbook.remove(&f.admin, &entry.id).await.unwrap();
        assert!(f.store.entry(&entry.id).lifecycle.is_deleted());
        assert!(f.logbook.list_mine(&identity_of(&amara)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_owner_edits_until_reviewed() {
        let f = fixture();
        let amara = f.store.seed_user(Role::Participant, "amara");
        let me = identity_of(&amara);
        let entry = f.store.seed_entry(&amara, (2024, 5, 1), "lab");

        let edited = f
            .logbook
            .update_content(&me, &entry.id, EditLogbook {
                description: Some("lab jaringan".into()),
                evidence: Some(FileUpload { file_name: "bukti.pdf".into(), bytes: vec![7; 16] }),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(edited.description, "lab jaringan");
        assert_eq!(f.store.files(), vec![edited.evidence.clone().unwrap()]);

        f.logbook.update_status(&f.admin, &entry.id, "rejected").await.unwrap();
        let err = f
            .logbook
            .update_content(&me, &entry.id, EditLogbook { description: Some("x".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ConflictError::EntryLocked(_))));
    }

    /// Commits a reviewer's approval just before the owner's edit lands.
    struct ReviewedDuringEdit {
        inner: Arc<InMemoryStore>,
    }

    #[async_trait::async_trait]
    impl LogbookRepository for ReviewedDuringEdit {
        async fn find_by_id(&self, id: &Uuid) -> Result<Option<LogbookEntry>, DomainError> {
            LogbookRepository::find_by_id(&*self.inner, id).await
        }
        async fn list(&self, scope: LogbookScope) -> Result<Vec<LogbookEntry>, DomainError> {
            LogbookRepository::list(&*self.inner, scope).await
        }
        async fn create(&self, entry: &LogbookEntry) -> Result<LogbookEntry, DomainError> {
            LogbookRepository::create(&*self.inner, entry).await
        }
        async fn update_content(&self, entry: &LogbookEntry) -> Result<LogbookEntry, DomainError> {
            let mut reviewed = self.inner.entry(&entry.id);
            reviewed.set_status(LogbookStatus::Approved);
            self.inner.set_status(&reviewed).await?;
            self.inner.update_content(entry).await
        }
        async fn set_status(&self, entry: &LogbookEntry) -> Result<LogbookEntry, DomainError> {
            self.inner.set_status(entry).await
        }
        async fn soft_delete(&self, id: &Uuid, at: chrono::DateTime<Utc>) -> Result<(), DomainError> {
            LogbookRepository::soft_delete(&*self.inner, id, at).await
        }
        async fn count_by_status(&self, scope: LogbookScope) -> Result<crate::domain::StatusCounts, DomainError> {
            self.inner.count_by_status(scope).await
        }
    }

    #[tokio::test]
    async fn test_edit_does_not_overwrite_concurrent_review() {
        let f = fixture();
        let amara = f.store.seed_user(Role::Participant, "amara");
        let entry = f.store.seed_entry(&amara, (2024, 5, 1), "lab");
        let logbook = LogbookService::new(
            Arc::new(ReviewedDuringEdit { inner: f.store.clone() }),
            f.store.clone(),
            f.placements.clone(),
            f.store.clone(),
            UploadPolicy::new(5 * 1024 * 1024),
        );

        let err = logbook
            .update_content(&identity_of(&amara), &entry.id, EditLogbook {
                description: Some("rewritten".into()),
                evidence: Some(FileUpload { file_name: "bukti.png".into(), bytes: vec![1; 16] }),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ConflictError::EntryLocked(_))));

        let stored = f.store.entry(&entry.id);
        assert_eq!(stored.status, LogbookStatus::Approved);
        assert_eq!(stored.description, "lab");
        assert!(f.store.files().is_empty());
    }

    #[tokio::test]
    async fn test_status_change_keeps_content() {
        let f = fixture();
        let amara = f.store.seed_user(Role::Participant, "amara");
        let entry = f.store.seed_entry(&amara, (2024, 5, 1), "lab");

        f.logbook.update_status(&f.admin, &entry.id, "rejected").await.unwrap();
        let stored = f.store.entry(&entry.id);
        assert_eq!(stored.status, LogbookStatus::Rejected);
        assert_eq!(stored.description, "lab");
    }

    #[tokio::test]
    async fn test_evidence_validated_before_storage() {
        let f = fixture();
        let amara = f.store.seed_user(Role::Participant, "amara");
        let budi = f.store.seed_user(Role::Supervisor, "budi");
        f.place(&amara, &budi).await;
        let me = identity_of(&amara);

        let mut too_big = submission((2024, 5, 1), "lab");
        too_big.evidence = Some(FileUpload { file_name: "a.jpg".into(), bytes: vec![0; 5 * 1024 * 1024 + 1] });
        let err = f.logbook.submit(&me, too_big).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(ValidationError::FileTooLarge { .. })));

        let mut with_photo = submission((2024, 5, 1), "lab");
        with_photo.evidence = Some(FileUpload { file_name: "a.jpg".into(), bytes: vec![0; 64] });
        let entry = f.logbook.submit(&me, with_photo).await.unwrap();
        assert!(entry.evidence.as_deref().unwrap().ends_with(".jpg"));
        assert_eq!(f.store.files().len(), 1);
    }

    #[tokio::test]
    async fn test_supervisor_cannot_delete() {
        let f = fixture();
        let amara = f.store.seed_user(Role::Participant, "amara");
        let budi = f.store.seed_user(Role::Supervisor, "budi");
        f.place(&amara, &budi).await;
        let entry = f.store.seed_entry(&amara, (2024, 5, 1), "lab");

        assert!(f.logbook.remove(&identity_of(&budi), &entry.id).await.is_err());
        assert!(f.store.entry(&entry.id).lifecycle.is_active());
    }
}
