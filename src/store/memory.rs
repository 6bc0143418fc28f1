use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{AnquetteRepository, Schema, StoreError, StoreResult, UserRepository};
use crate::anquettes::dto::{Anquette, AnquetteRequest};
use crate::users::dto::{User, UserRequest};

#[derive(Default)]
struct Tables {
    users: HashMap<i64, User>,
    anquettes: HashMap<i64, Anquette>,
    last_user_id: i64,
    last_anquette_id: i64,
}

impl Tables {
    fn tg_id_taken(&self, tg_id: i64, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.tg_id == tg_id && Some(u.id) != except)
    }
}

/// Process-local store. Each operation is one critical section; nothing is
/// atomic across operations. Ids are never reused.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_tg_id(tg_id: i64) -> StoreError {
    StoreError::ConstraintViolation(format!("users.tg_id {tg_id} already exists"))
}

#[async_trait]
impl Schema for MemoryStore {
    async fn create_schema(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, u: &UserRequest) -> StoreResult<i64> {
        let mut t = self.tables.lock().await;
        if t.tg_id_taken(u.tg_id, None) {
            return Err(duplicate_tg_id(u.tg_id));
        }
        t.last_user_id += 1;
        let id = t.last_user_id;
        t.users.insert(id, u.clone().into_user(id));
        Ok(id)
    }

    async fn get_user(&self, id: i64) -> StoreResult<User> {
        let t = self.tables.lock().await;
        t.users.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_user(&self, id: i64, u: &UserRequest) -> StoreResult<()> {
        let mut t = self.tables.lock().await;
        if !t.users.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if t.tg_id_taken(u.tg_id, Some(id)) {
            return Err(duplicate_tg_id(u.tg_id));
        }
        t.users.insert(id, u.clone().into_user(id));
        Ok(())
    }
}

#[async_trait]
impl AnquetteRepository for MemoryStore {
    async fn insert_anquette(&self, a: &AnquetteRequest) -> StoreResult<i64> {
        let mut t = self.tables.lock().await;
        t.last_anquette_id += 1;
        let id = t.last_anquette_id;
        t.anquettes.insert(id, a.clone().into_anquette(id));
        Ok(id)
    }

    async fn get_anquette(&self, id: i64) -> StoreResult<Anquette> {
        let t = self.tables.lock().await;
        t.anquettes.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_anquette(&self, id: i64, a: &AnquetteRequest) -> StoreResult<()> {
        let mut t = self.tables.lock().await;
        match t.anquettes.get_mut(&id) {
            Some(slot) => {
                *slot = a.clone().into_anquette(id);
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete_anquette(&self, id: i64) -> StoreResult<()> {
        let mut t = self.tables.lock().await;
        t.anquettes
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::contract;

    #[tokio::test]
    async fn user_round_trip() {
        contract::user_round_trip(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn duplicate_tg_id_is_a_constraint_violation() {
        contract::duplicate_tg_id_is_a_constraint_violation(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn update_user_replaces_all_fields() {
        contract::update_user_replaces_all_fields(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn update_user_with_identical_values_succeeds() {
        contract::update_user_with_identical_values_succeeds(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn update_user_onto_taken_tg_id_is_rejected() {
        contract::update_user_onto_taken_tg_id_is_rejected(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        contract::missing_ids_are_not_found(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn anquette_lifecycle() {
        contract::anquette_lifecycle(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        contract::ids_are_not_reused_after_delete(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn create_schema_is_idempotent() {
        contract::create_schema_is_idempotent(&MemoryStore::new()).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_get_distinct_ids() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.insert_user(&contract::user(i, "u")).await })
            })
            .collect();

        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap().unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 32);
    }
}
