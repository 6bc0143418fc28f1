use std::sync::Arc;

use tracing::{info, instrument};

use super::dto::{Anquette, AnquetteRequest};
use crate::error::{ServiceError, ServiceResult};
use crate::store::AnquetteRepository;

const RESOURCE: &str = "anquette";

/// Minimum description length, counted in characters rather than bytes.
pub const MIN_DESCRIPTION_CHARS: usize = 50;

pub(crate) fn validate(req: &AnquetteRequest) -> ServiceResult<()> {
    let len = req.description.chars().count();
    if len < MIN_DESCRIPTION_CHARS {
        return Err(ServiceError::ValidationFailed(format!(
            "description must be at least {MIN_DESCRIPTION_CHARS} characters, got {len}"
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct AnquetteService {
    repo: Arc<dyn AnquetteRepository>,
}

impl AnquetteService {
    pub fn new(repo: Arc<dyn AnquetteRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, req))]
    pub async fn create_anquette(&self, req: &AnquetteRequest) -> ServiceResult<i64> {
        validate(req)?;
        let id = self
            .repo
            .insert_anquette(req)
            .await
            .map_err(|e| ServiceError::from_store(RESOURCE, "insert anquette", e))?;
        info!(id, "anquette created");
        Ok(id)
    }

    pub async fn get_anquette(&self, id: i64) -> ServiceResult<Anquette> {
        self.repo
            .get_anquette(id)
            .await
            .map_err(|e| ServiceError::from_store(RESOURCE, "get anquette", e))
    }

    #[instrument(skip(self, req))]
    pub async fn update_anquette(&self, id: i64, req: &AnquetteRequest) -> ServiceResult<()> {
        validate(req)?;
        self.repo
            .update_anquette(id, req)
            .await
            .map_err(|e| ServiceError::from_store(RESOURCE, "update anquette", e))
    }

    #[instrument(skip(self))]
    pub async fn delete_anquette(&self, id: i64) -> ServiceResult<()> {
        self.repo
            .delete_anquette(id)
            .await
            .map_err(|e| ServiceError::from_store(RESOURCE, "delete anquette", e))?;
        info!(id, "anquette deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::store::{MemoryStore, StoreError, StoreResult};

    const LONG: &str = "This description is comfortably longer than fifty characters.";

    fn req(description: &str) -> AnquetteRequest {
        AnquetteRequest {
            name: "GetTest".into(),
            age: 27,
            city: Some("Kazan".into()),
            gender: Some("m".into()),
            preferences: Some("music".into()),
            description: description.into(),
        }
    }

    /// Counts every call and fails all of them.
    #[derive(Default)]
    struct CountingRepo {
        calls: AtomicUsize,
    }

    impl CountingRepo {
        fn hit<T>(&self) -> StoreResult<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }
    }

    #[async_trait]
    impl AnquetteRepository for CountingRepo {
        async fn insert_anquette(&self, _a: &AnquetteRequest) -> StoreResult<i64> {
            self.hit()
        }
        async fn get_anquette(&self, _id: i64) -> StoreResult<Anquette> {
            self.hit()
        }
        async fn update_anquette(&self, _id: i64, _a: &AnquetteRequest) -> StoreResult<()> {
            self.hit()
        }
        async fn delete_anquette(&self, _id: i64) -> StoreResult<()> {
            self.hit()
        }
    }

    #[test]
    fn description_length_counts_characters_not_bytes() {
        // 49 two-byte characters: 98 bytes but still too short.
        let cyrillic = "ж".repeat(49);
        assert!(validate(&req(&cyrillic)).is_err());
        assert!(validate(&req(&"ж".repeat(50))).is_ok());
        assert!(validate(&req(&"a".repeat(50))).is_ok());
    }

    #[tokio::test]
    async fn short_description_never_reaches_the_store() {
        let repo = Arc::new(CountingRepo::default());
        let svc = AnquetteService::new(repo.clone());

        let err = svc.create_anquette(&req("Too short")).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationFailed(_)));
        let err = svc.update_anquette(1, &req("Too short")).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationFailed(_)));

        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_create_consumes_no_id() {
        let svc = AnquetteService::new(Arc::new(MemoryStore::new()));
        assert!(svc.create_anquette(&req("short")).await.is_err());
        assert_eq!(svc.create_anquette(&req(LONG)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn create_then_get_returns_same_record() {
        let svc = AnquetteService::new(Arc::new(MemoryStore::new()));
        let id = svc.create_anquette(&req(LONG)).await.unwrap();
        assert_eq!(svc.get_anquette(id).await.unwrap(), req(LONG).into_anquette(id));
    }

    #[tokio::test]
    async fn update_replaces_rather_than_merges() {
        let svc = AnquetteService::new(Arc::new(MemoryStore::new()));
        let id = svc.create_anquette(&req(LONG)).await.unwrap();

        let replacement = AnquetteRequest {
            name: "Updated".into(),
            age: 40,
            city: None,
            gender: None,
            preferences: None,
            description: "A brand new description that is also long enough to pass.".into(),
        };
        svc.update_anquette(id, &replacement).await.unwrap();
        assert_eq!(svc.get_anquette(id).await.unwrap(), replacement.into_anquette(id));
    }

    #[tokio::test]
    async fn delete_twice_is_not_found_the_second_time() {
        let svc = AnquetteService::new(Arc::new(MemoryStore::new()));
        let id = svc.create_anquette(&req(LONG)).await.unwrap();
        svc.delete_anquette(id).await.unwrap();
        assert!(matches!(
            svc.delete_anquette(id).await,
            Err(ServiceError::NotFound("anquette"))
        ));
    }

    #[tokio::test]
    async fn store_failures_are_internal() {
        let svc = AnquetteService::new(Arc::new(CountingRepo::default()));
        assert!(matches!(svc.get_anquette(1).await, Err(ServiceError::Internal { .. })));
        assert!(matches!(svc.delete_anquette(1).await, Err(ServiceError::Internal { .. })));
        assert!(matches!(
            svc.create_anquette(&req(LONG)).await,
            Err(ServiceError::Internal { .. })
        ));
    }
}
