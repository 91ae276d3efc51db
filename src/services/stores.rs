use crate::{
    auth::AuthService,
    db::DbPool,
    entities::{
        stores,
        users::{self, StaffRole},
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStoreInput {
    #[validate(length(min = 1, max = 255))]
    pub store_name: String,
    #[validate(length(min = 1, max = 500))]
    pub location: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStaffUserInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    pub role: StaffRole,
}

/// Thin admin glue: stores, staff accounts and the one-time staff-to-store
/// assignment the rest of the workflow scopes on.
#[derive(Clone)]
pub struct StoreService {
    db_pool: Arc<DbPool>,
    auth: Arc<AuthService>,
}

impl StoreService {
    pub fn new(db_pool: Arc<DbPool>, auth: Arc<AuthService>) -> Self {
        Self { db_pool, auth }
    }

    #[instrument(skip(self, input))]
    pub async fn create_store(&self, input: CreateStoreInput) -> Result<stores::Model, ServiceError> {
        input.validate()?;
        let now = Utc::now();
        let store = stores::ActiveModel {
            store_name: Set(input.store_name),
            location: Set(input.location),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;
        info!(store_id = store.id, "store created");
        Ok(store)
    }

    #[instrument(skip(self, input))]
    pub async fn create_staff_user(
        &self,
        input: CreateStaffUserInput,
    ) -> Result<users::Model, ServiceError> {
        input.validate()?;
        let now = Utc::now();
        let password_hash = self.auth.hash_password(&input.password)?;
        let user = users::ActiveModel {
            name: Set(input.name),
            email: Set(input.email.to_lowercase()),
            password_hash: Set(password_hash),
            phone_number: Set(input.phone_number),
            role: Set(input.role),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;
        Ok(user)
    }

    /// Binds a manager to a store. The binding is one-time: reassignment of
    /// either side fails with Conflict.
    #[instrument(skip(self))]
    pub async fn assign_manager(
        &self,
        store_id: i32,
        user_id: i32,
    ) -> Result<stores::Model, ServiceError> {
        self.assign(store_id, user_id, StaffRole::Manager).await
    }

    /// Binds a pharmacist to a store, with the same one-time rule.
    #[instrument(skip(self))]
    pub async fn assign_pharmacist(
        &self,
        store_id: i32,
        user_id: i32,
    ) -> Result<stores::Model, ServiceError> {
        self.assign(store_id, user_id, StaffRole::Pharmacist).await
    }

    async fn assign(
        &self,
        store_id: i32,
        user_id: i32,
        role: StaffRole,
    ) -> Result<stores::Model, ServiceError> {
        let store = stores::Entity::find_by_id(store_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store {} not found", store_id)))?;
        let user = users::Entity::find_by_id(user_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;
        if user.role != role {
            return Err(ServiceError::ValidationError(format!(
                "User {} does not hold the {} role",
                user_id, role
            )));
        }

        let occupied = match role {
            StaffRole::Manager => store.manager_user_id.is_some(),
            StaffRole::Pharmacist => store.pharmacist_user_id.is_some(),
            StaffRole::Admin => {
                return Err(ServiceError::ValidationError(
                    "Admins are not assigned to stores".to_string(),
                ))
            }
        };
        if occupied {
            return Err(ServiceError::Conflict(format!(
                "Store {} already has a {}",
                store_id, role
            )));
        }
        if self.store_for_user(user_id).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "User {} is already assigned to a store",
                user_id
            )));
        }

        let mut active: stores::ActiveModel = store.into();
        match role {
            StaffRole::Manager => active.manager_user_id = Set(Some(user_id)),
            StaffRole::Pharmacist => active.pharmacist_user_id = Set(Some(user_id)),
            StaffRole::Admin => unreachable!(),
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_stores(&self) -> Result<Vec<stores::Model>, ServiceError> {
        Ok(stores::Entity::find()
            .order_by_asc(stores::Column::Id)
            .all(&*self.db_pool)
            .await?)
    }

    /// The store a staff user is bound to, if any. Resolved at login so the
    /// binding travels inside the token.
    pub async fn store_for_user(&self, user_id: i32) -> Result<Option<stores::Model>, ServiceError> {
        Ok(stores::Entity::find()
            .filter(
                Condition::any()
                    .add(stores::Column::ManagerUserId.eq(user_id))
                    .add(stores::Column::PharmacistUserId.eq(user_id)),
            )
            .one(&*self.db_pool)
            .await?)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<users::Model>, ServiceError> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .one(&*self.db_pool)
            .await?)
    }
}
