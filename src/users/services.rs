use std::sync::Arc;

use tracing::{info, instrument};

use super::dto::{User, UserRequest};
use crate::error::{ServiceError, ServiceResult};
use crate::store::{StoreError, UserRepository};

const RESOURCE: &str = "user";

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, req), fields(tg_id = req.tg_id))]
    pub async fn create_user(&self, req: &UserRequest) -> ServiceResult<i64> {
        let id = self
            .repo
            .insert_user(req)
            .await
            .map_err(|e| write_error(e, "insert user"))?;
        info!(id, "user created");
        Ok(id)
    }

    pub async fn get_user(&self, id: i64) -> ServiceResult<User> {
        self.repo
            .get_user(id)
            .await
            .map_err(|e| ServiceError::from_store(RESOURCE, "get user", e))
    }

    #[instrument(skip(self, req), fields(tg_id = req.tg_id))]
    pub async fn update_user(&self, id: i64, req: &UserRequest) -> ServiceResult<()> {
        self.repo
            .update_user(id, req)
            .await
            .map_err(|e| write_error(e, "update user"))
    }
}

/// A duplicate `tg_id` is the caller's fault, so it surfaces as a conflict.
fn write_error(e: StoreError, context: &'static str) -> ServiceError {
    match e {
        StoreError::ConstraintViolation(_) => {
            ServiceError::Conflict("user with this tg_id already exists".into())
        }
        other => ServiceError::from_store(RESOURCE, context, other),
    }
}
