//! In-memory [`RegistrationStore`] for handler tests.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{RegistrationStore, StoreError};
use crate::databases::auth::pending::PendingRegistration;
use crate::databases::users::user::{NewUser, User};
use crate::otp::Channel;

#[derive(Default)]
struct MockState {
    users: Vec<User>,
    pending: HashMap<String, PendingRegistration>,
}

impl MockState {
    fn holds(&self, email: &str, phone_number: &str) -> bool {
        self.users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email) || u.phone_number == phone_number)
    }
}

#[derive(Clone, Default)]
pub struct MockRegistrationStore {
    state: Arc<Mutex<MockState>>,
    unavailable: Arc<AtomicBool>,
}

impl MockRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        let store = Self::new();
        store.lock().users = users;
        store
    }

    /// Makes every subsequent call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    pub fn pending(&self, temp_id: &str) -> Option<PendingRegistration> {
        self.lock().pending.get(temp_id).cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

impl RegistrationStore for MockRegistrationStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.check()?;
        Ok(self.users())
    }

    async fn user_exists(&self, email: &str, phone_number: &str) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self.lock().holds(email, phone_number))
    }

    async fn create_pending(&self, pending: PendingRegistration) -> Result<(), StoreError> {
        self.check()?;
        self.lock().pending.insert(pending.temp_id.clone(), pending);
        Ok(())
    }

    async fn find_pending(&self, temp_id: &str) -> Result<Option<PendingRegistration>, StoreError> {
        self.check()?;
        Ok(self.pending(temp_id))
    }

    async fn set_code(
        &self,
        temp_id: &str,
        channel: Channel,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.check()?;
        match self.lock().pending.get_mut(temp_id) {
            Some(pending) => {
                pending.set_code(channel, code_hash, expires_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reserve_attempt(&self, temp_id: &str, max_attempts: i32) -> Result<Option<i32>, StoreError> {
        self.check()?;
        Ok(self
            .lock()
            .pending
            .get_mut(temp_id)
            .filter(|pending| pending.attempts < max_attempts)
            .map(|pending| {
                pending.attempts += 1;
                pending.attempts
            }))
    }

    async fn discard_pending(&self, temp_id: &str) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self.lock().pending.remove(temp_id).is_some())
    }

    async fn complete_registration(&self, temp_id: &str, user: NewUser) -> Result<Option<User>, StoreError> {
        self.check()?;
        let mut state = self.lock();
        if !state.pending.contains_key(temp_id) {
            return Ok(None);
        }
        if state.holds(&user.email, &user.phone_number) {
            return Err(StoreError::Conflict);
        }
        state.pending.remove(temp_id);

        let id = state.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User {
            id,
            email: user.email,
            name: user.name,
            phone_number: user.phone_number,
            vehicle_number: user.vehicle_number,
            payment_done: false,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Asha".to_string(),
            email: email.to_string(),
            phone_number: "9800000000".to_string(),
            vehicle_number: "BA 2 PA 1234".to_string(),
        }
    }

    #[tokio::test]
    async fn complete_registration_consumes_pending_once() {
        let store = MockRegistrationStore::new();
        let pending = PendingRegistration::new("a@example.com", "9800000000");
        let temp_id = pending.temp_id.clone();
        store.create_pending(pending).await.unwrap();

        let first = store
            .complete_registration(&temp_id, new_user("a@example.com"))
            .await
            .unwrap();
        let second = store
            .complete_registration(&temp_id, new_user("a@example.com"))
            .await
            .unwrap();

        assert_eq!(first.map(|u| u.id), Some(1));
        assert!(second.is_none());
        assert_eq!(store.users().len(), 1);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MockRegistrationStore::new();
        store.set_unavailable(true);

        assert!(matches!(store.list_users().await, Err(StoreError::Unavailable(_))));
        assert!(store.find_pending("signup-x").await.is_err());
    }

    #[tokio::test]
    async fn attempts_stop_at_the_limit() {
        let store = MockRegistrationStore::new();
        let pending = PendingRegistration::new("a@example.com", "9800000000");
        let temp_id = pending.temp_id.clone();
        store.create_pending(pending).await.unwrap();

        assert_eq!(store.reserve_attempt(&temp_id, 2).await.unwrap(), Some(1));
        assert_eq!(store.reserve_attempt(&temp_id, 2).await.unwrap(), Some(2));
        assert_eq!(store.reserve_attempt(&temp_id, 2).await.unwrap(), None);
        assert_eq!(store.pending(&temp_id).unwrap().attempts, 2);
        assert_eq!(store.reserve_attempt("missing", 2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn concurrent_attempts_never_exceed_the_limit() {
        let store = MockRegistrationStore::new();
        let pending = PendingRegistration::new("a@example.com", "9800000000");
        let temp_id = pending.temp_id.clone();
        store.create_pending(pending).await.unwrap();

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let store = store.clone();
                let temp_id = temp_id.clone();
                tokio::spawn(async move { store.reserve_attempt(&temp_id, 5).await.unwrap() })
            })
            .collect();

        let mut granted = 0;
        for task in tasks {
            if task.await.unwrap().is_some() {
                granted += 1;
            }
        }
        assert_eq!(granted, 5);
        assert_eq!(store.pending(&temp_id).unwrap().attempts, 5);
    }

    #[tokio::test]
    async fn completion_conflicts_with_existing_user_and_keeps_pending() {
        let store = MockRegistrationStore::new();
        let first = PendingRegistration::new("a@example.com", "9800000000");
        let second = PendingRegistration::new("a@example.com", "9811111111");
        let (first_id, second_id) = (first.temp_id.clone(), second.temp_id.clone());
        store.create_pending(first).await.unwrap();
        store.create_pending(second).await.unwrap();

        store.complete_registration(&first_id, new_user("a@example.com")).await.unwrap();
        let mut duplicate = new_user("A@Example.com");
        duplicate.phone_number = "9811111111".to_string();
        let result = store.complete_registration(&second_id, duplicate).await;

        assert!(matches!(result, Err(StoreError::Conflict)));
        assert!(store.pending(&second_id).is_some());
        assert_eq!(store.users().len(), 1);
    }

    #[tokio::test]
    async fn discard_removes_pending() {
        let store = MockRegistrationStore::new();
        let pending = PendingRegistration::new("a@example.com", "9800000000");
        let temp_id = pending.temp_id.clone();
        store.create_pending(pending).await.unwrap();

        assert!(store.discard_pending(&temp_id).await.unwrap());
        assert!(!store.discard_pending(&temp_id).await.unwrap());
        assert_eq!(store.pending_count(), 0);
    }
}
