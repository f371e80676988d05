//! # Tenant Repository
//!
//! Lookup and registration of tenants. Ingestion only ever resolves by
//! shop domain; creation exists for seeding and tests.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::tenant::{
    ActiveModel as TenantActiveModel, Column, Entity as Tenant, Model as TenantModel,
};

/// Request data for registering a new tenant
#[derive(Debug, Clone)]
pub struct CreateTenantRequest {
    pub name: String,
    pub shop_domain: String,
    pub webhook_secret: Option<String>,
}

/// Repository for Tenant database operations
pub struct TenantRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TenantRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves a tenant by its shop domain. Domains are unique.
    pub async fn find_by_domain(
        &self,
        shop_domain: &str,
    ) -> Result<Option<TenantModel>, RepositoryError> {
        let tenant = Tenant::find()
            .filter(Column::ShopDomain.eq(shop_domain))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(tenant)
    }

    /// Registers a new tenant.
    pub async fn create_tenant(
        &self,
        request: CreateTenantRequest,
    ) -> Result<TenantModel, RepositoryError> {
        let tenant = TenantActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            shop_domain: Set(request.shop_domain),
            webhook_secret: Set(request.webhook_secret),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };

        let result = tenant
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(result)
    }
}
