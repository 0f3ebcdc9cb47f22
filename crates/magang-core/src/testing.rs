//! In-memory repositories for service tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{
    AccountStatus, Company, Enrollment, Identity, LogbookEntry, LogbookScope, Placement, Role, StatusCounts,
    UploadKind, User,
};
use crate::error::{ConflictError, DomainError, ValidationError};
use crate::repositories::{
    CompanyRepository, FileStorage, LogbookRepository, PlacementRepository, UserRepository,
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    companies: HashMap<Uuid, Company>,
    placements: HashMap<Uuid, Placement>,
    entries: HashMap<Uuid, LogbookEntry>,
    files: Vec<String>,
}

impl State {
    fn active_placement_of(&self, participant_id: &Uuid) -> Option<&Placement> {
        self.placements
            .values()
            .find(|p| p.is_active() && p.participant_id == *participant_id)
    }

    fn release(&mut self, participant_id: &Uuid) {
        if let Some(user) = self.users.get_mut(participant_id) {
            user.status = AccountStatus::Locked;
            user.company_id = None;
        }
    }

    fn activate(&mut self, participant_id: &Uuid, company_id: Uuid) {
        if let Some(user) = self.users.get_mut(participant_id) {
            user.status = AccountStatus::Active;
            user.company_id = Some(company_id);
        }
    }

    fn ensure_live_company(&self, company_id: &Uuid) -> Result<(), DomainError> {
        match self.companies.get(company_id) {
            Some(company) if company.lifecycle.is_active() => Ok(()),
            _ => Err(DomainError::not_found("company", company_id)),
        }
    }

    fn in_scope(&self, entry: &LogbookEntry, scope: LogbookScope) -> bool {
        if entry.lifecycle.is_deleted() {
            return false;
        }
        match scope {
            LogbookScope::All => true,
            LogbookScope::Owner(owner) => entry.participant_id == owner,
            LogbookScope::Supervisor(supervisor) => self
                .active_placement_of(&entry.participant_id)
                .map(|p| p.supervisor_id == supervisor)
                .unwrap_or(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn seed_user(&self, role: Role, username: &str) -> User {
        self.seed_user_with_hash(role, username, "$2b$10$not.a.real.hash")
    }

    pub fn seed_user_with_hash(&self, role: Role, username: &str, hash: &str) -> User {
        let user = User::new(
            format!("{} lengkap", username),
            username.to_string(),
            hash.to_string(),
            role,
            Enrollment::default(),
        )
        .unwrap();
        self.lock().users.insert(user.id, user.clone());
        user
    }

    pub fn seed_company(&self, name: &str) -> Company {
        let company = Company::new(name.to_string(), None, None).unwrap();
        self.lock().companies.insert(company.id, company.clone());
        company
    }

    pub fn seed_entry(&self, owner: &User, date: (i32, u32, u32), text: &str) -> LogbookEntry {
        let entry = LogbookEntry::new(
            owner.id,
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            text.to_string(),
            None,
            None,
        )
        .unwrap();
        self.lock().entries.insert(entry.id, entry.clone());
        entry
    }

    /// Raw row, deleted or not.
    pub fn user(&self, id: &Uuid) -> User {
        self.lock().users.get(id).cloned().unwrap()
    }

    pub fn placement(&self, id: &Uuid) -> Placement {
        self.lock().placements.get(id).cloned().unwrap()
    }

    pub fn entry(&self, id: &Uuid) -> LogbookEntry {
        self.lock().entries.get(id).cloned().unwrap()
    }

    pub fn files(&self) -> Vec<String> {
        self.lock().files.clone()
    }
}

pub fn identity_of(user: &User) -> Identity {
    Identity::new(user.id, user.role, user.full_name.clone())
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.lock().users.get(id).filter(|u| !u.is_deleted()).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| !u.is_deleted() && u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, DomainError> {
        let mut users: Vec<User> = self
            .lock()
            .users
            .values()
            .filter(|u| !u.is_deleted() && role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(users)
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        let mut state = self.lock();
        if state
            .users
            .values()
            .any(|u| !u.is_deleted() && u.username.eq_ignore_ascii_case(&user.username))
        {
            return Err(ValidationError::DuplicateUsername(user.username.clone()).into());
        }
        state.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut state = self.lock();
        if state.users.values().any(|u| {
            u.id != user.id && !u.is_deleted() && u.username.eq_ignore_ascii_case(&user.username)
        }) {
            return Err(ValidationError::DuplicateUsername(user.username.clone()).into());
        }
        let stored = state
            .users
            .get_mut(&user.id)
            .filter(|u| !u.is_deleted())
            .ok_or_else(|| DomainError::not_found("user", &user.id))?;
        let (status, company_id) = (stored.status, stored.company_id);
        *stored = User { status, company_id, ..user.clone() };
        Ok(stored.clone())
    }

    async fn record_login(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(user) = self.lock().users.get_mut(id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn soft_delete(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut state = self.lock();
        let affected: Vec<(Uuid, Uuid)> = state
            .placements
            .values()
            .filter(|p| p.is_active() && (p.participant_id == *id || p.supervisor_id == *id))
            .map(|p| (p.id, p.participant_id))
            .collect();
        for (placement_id, participant_id) in affected {
            if let Some(p) = state.placements.get_mut(&placement_id) {
                p.lifecycle.delete(at);
            }
            state.release(&participant_id);
        }
        if let Some(user) = state.users.get_mut(id) {
            user.lifecycle.delete(at);
        }
        Ok(())
    }

    async fn count_by_role(&self) -> Result<Vec<(Role, i64)>, DomainError> {
        let state = self.lock();
        Ok(Role::ALL
            .iter()
            .map(|role| {
                let n = state
                    .users
                    .values()
                    .filter(|u| !u.is_deleted() && u.role == *role)
                    .count() as i64;
                (*role, n)
            })
            .collect())
    }
}

#[async_trait]
impl CompanyRepository for InMemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Company>, DomainError> {
        Ok(self.lock().companies.get(id).filter(|c| c.lifecycle.is_active()).cloned())
    }

    async fn list(&self) -> Result<Vec<Company>, DomainError> {
        let mut companies: Vec<Company> = self
            .lock()
            .companies
            .values()
            .filter(|c| c.lifecycle.is_active())
            .cloned()
            .collect();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }

    async fn create(&self, company: &Company) -> Result<Company, DomainError> {
        self.lock().companies.insert(company.id, company.clone());
        Ok(company.clone())
    }

    async fn update(&self, company: &Company) -> Result<Company, DomainError> {
        self.lock().companies.insert(company.id, company.clone());
        Ok(company.clone())
    }

    async fn soft_delete(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut state = self.lock();
        if state.placements.values().any(|p| p.is_active() && p.company_id == *id) {
            return Err(ConflictError::CompanyInUse(*id).into());
        }
        let company = state
            .companies
            .get_mut(id)
            .filter(|c| c.lifecycle.is_active())
            .ok_or_else(|| DomainError::not_found("company", id))?;
        company.lifecycle.delete(at);
        Ok(())
    }

    async fn count(&self) -> Result<i64, DomainError> {
        Ok(self.lock().companies.values().filter(|c| c.lifecycle.is_active()).count() as i64)
    }
}

#[async_trait]
impl PlacementRepository for InMemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Placement>, DomainError> {
        Ok(self.lock().placements.get(id).filter(|p| p.is_active()).cloned())
    }

    async fn find_active_by_participant(&self, participant_id: &Uuid) -> Result<Option<Placement>, DomainError> {
        Ok(self.lock().active_placement_of(participant_id).cloned())
    }

    async fn list(&self, supervisor_id: Option<Uuid>) -> Result<Vec<Placement>, DomainError> {
        Ok(self
            .lock()
            .placements
            .values()
            .filter(|p| p.is_active() && supervisor_id.map_or(true, |s| p.supervisor_id == s))
            .cloned()
            .collect())
    }

    async fn create(&self, placement: &Placement) -> Result<Placement, DomainError> {
        let mut state = self.lock();
        state.ensure_live_company(&placement.company_id)?;
        if state.active_placement_of(&placement.participant_id).is_some() {
            return Err(ConflictError::AlreadyPlaced(placement.participant_id).into());
        }
        state.placements.insert(placement.id, placement.clone());
        state.activate(&placement.participant_id, placement.company_id);
        Ok(placement.clone())
    }

    async fn update(&self, placement: &Placement) -> Result<Placement, DomainError> {
        let mut state = self.lock();
        let previous = state
            .placements
            .get(&placement.id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("placement", &placement.id))?;
        state.ensure_live_company(&placement.company_id)?;
        if previous.participant_id != placement.participant_id {
            if state.active_placement_of(&placement.participant_id).is_some() {
                return Err(ConflictError::AlreadyPlaced(placement.participant_id).into());
            }
            state.release(&previous.participant_id);
        }
        state.placements.insert(placement.id, placement.clone());
        state.activate(&placement.participant_id, placement.company_id);
        Ok(placement.clone())
    }

    async fn remove(&self, id: &Uuid, at: DateTime<Utc>) -> Result<Placement, DomainError> {
        let mut state = self.lock();
        let placement = {
            let placement = state
                .placements
                .get_mut(id)
                .filter(|p| p.is_active())
                .ok_or_else(|| DomainError::not_found("placement", id))?;
            placement.lifecycle.delete(at);
            placement.clone()
        };
        state.release(&placement.participant_id);
        Ok(placement)
    }

    async fn count_active(&self) -> Result<i64, DomainError> {
        Ok(self.lock().placements.values().filter(|p| p.is_active()).count() as i64)
    }
}

#[async_trait]
impl LogbookRepository for InMemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<LogbookEntry>, DomainError> {
        Ok(self.lock().entries.get(id).filter(|e| e.lifecycle.is_active()).cloned())
    }

    async fn list(&self, scope: LogbookScope) -> Result<Vec<LogbookEntry>, DomainError> {
        let state = self.lock();
        let mut entries: Vec<LogbookEntry> = state
            .entries
            .values()
            .filter(|e| state.in_scope(e, scope))
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            b.activity_date
                .cmp(&a.activity_date)
                .then(b.timestamps.created_at.cmp(&a.timestamps.created_at))
        });
        Ok(entries)
    }

    async fn create(&self, entry: &LogbookEntry) -> Result<LogbookEntry, DomainError> {
        self.lock().entries.insert(entry.id, entry.clone());
        Ok(entry.clone())
    }

    async fn update_content(&self, entry: &LogbookEntry) -> Result<LogbookEntry, DomainError> {
        let mut state = self.lock();
        let stored = state
            .entries
            .get_mut(&entry.id)
            .filter(|e| e.lifecycle.is_active())
            .ok_or_else(|| DomainError::not_found("logbook entry", &entry.id))?;
        stored.ensure_editable()?;
        stored.activity_date = entry.activity_date;
        stored.description = entry.description.clone();
        stored.evidence = entry.evidence.clone();
        stored.attendance = entry.attendance;
        stored.timestamps.updated_at = entry.timestamps.updated_at;
        Ok(stored.clone())
    }

    async fn set_status(&self, entry: &LogbookEntry) -> Result<LogbookEntry, DomainError> {
        let mut state = self.lock();
        let stored = state
            .entries
            .get_mut(&entry.id)
            .filter(|e| e.lifecycle.is_active())
            .ok_or_else(|| DomainError::not_found("logbook entry", &entry.id))?;
        stored.status = entry.status;
        stored.timestamps.updated_at = entry.timestamps.updated_at;
        Ok(stored.clone())
    }

    async fn soft_delete(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(entry) = self.lock().entries.get_mut(id) {
            entry.lifecycle.delete(at);
        }
        Ok(())
    }

    async fn count_by_status(&self, scope: LogbookScope) -> Result<StatusCounts, DomainError> {
        let state = self.lock();
        let mut counts = StatusCounts::default();
        for entry in state.entries.values().filter(|e| state.in_scope(e, scope)) {
            counts.add(entry.status, 1);
        }
        Ok(counts)
    }
}

#[async_trait]
impl FileStorage for InMemoryStore {
    async fn store(&self, kind: UploadKind, extension: &str, _bytes: Vec<u8>) -> Result<String, DomainError> {
        let reference = format!("/uploads/{}/{}.{}", kind.folder(), Uuid::new_v4(), extension);
        self.lock().files.push(reference.clone());
        Ok(reference)
    }

    async fn remove(&self, reference: &str) -> Result<(), DomainError> {
        self.lock().files.retain(|f| f != reference);
        Ok(())
    }
}
