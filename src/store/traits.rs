//! `BusinessStore` trait: single async interface for onboarding persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::business::model::{Business, BusinessCategory, BusinessPatch};
use crate::error::DatabaseError;

/// A user who owns businesses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Search filter for business listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessFilter {
    pub category: Option<BusinessCategory>,
    /// Case-insensitive substring of the city or the state.
    pub location: Option<String>,
}

/// Backend-agnostic persistence for owners and businesses.
#[async_trait]
pub trait BusinessStore: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Owners ──────────────────────────────────────────────────────

    async fn create_owner(&self, name: &str, email: Option<&str>) -> Result<Owner, DatabaseError>;

    /// Earliest registered owner, used when a request names none.
    async fn first_owner_id(&self) -> Result<Option<String>, DatabaseError>;

    // ── Businesses ──────────────────────────────────────────────────

    /// Insert a new business with a generated id. The patch must carry a name.
    async fn create_business(
        &self,
        owner_id: &str,
        patch: &BusinessPatch,
    ) -> Result<Business, DatabaseError>;

    /// Apply the fields present in `patch`; absent fields are left unchanged.
    async fn update_business(
        &self,
        id: &str,
        patch: &BusinessPatch,
    ) -> Result<Business, DatabaseError>;

    async fn get_business(&self, id: &str) -> Result<Option<Business>, DatabaseError>;

    async fn list_businesses(&self, filter: &BusinessFilter)
    -> Result<Vec<Business>, DatabaseError>;

    /// Update the record `id` when it exists, otherwise create a new one.
    ///
    /// An unknown id does not become the new record's id; a fresh one is
    /// generated.
    async fn upsert_business(
        &self,
        id: Option<&str>,
        owner_id: &str,
        patch: &BusinessPatch,
    ) -> Result<Business, DatabaseError> {
        if let Some(id) = id {
            if self.get_business(id).await?.is_some() {
                return self.update_business(id, patch).await;
            }
        }
        self.create_business(owner_id, patch).await
    }
}
