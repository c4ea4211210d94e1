//! libSQL backend: async `BusinessStore` implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::business::model::{Business, BusinessCategory, BusinessPatch};
use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{BusinessFilter, BusinessStore, Owner};

/// Column order used by every business SELECT; see `row_to_business`.
const BUSINESS_COLUMNS: &str = "id, owner_id, name, description, category, phone, email, \
     address, city, state, postal_code, country, service_radius, operating_hours_start, \
     operating_hours_end, capacity, profile_image, certifications, promotional_text, \
     years_in_business, created_at, updated_at";

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

fn opt_int(n: Option<i64>) -> libsql::Value {
    match n {
        Some(n) => libsql::Value::Integer(n),
        None => libsql::Value::Null,
    }
}

fn opt_category(c: Option<BusinessCategory>) -> libsql::Value {
    opt_text(c.map(|c| c.as_storage()))
}

/// Map a libsql Row to a Business. Column order matches BUSINESS_COLUMNS.
fn row_to_business(row: &libsql::Row) -> Result<Business, libsql::Error> {
    let category: Option<String> = row.get(4).ok();
    let created_str: String = row.get(20)?;
    let updated_str: String = row.get(21)?;

    Ok(Business {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3).ok(),
        category: category.as_deref().and_then(BusinessCategory::from_label),
        phone: row.get(5).ok(),
        email: row.get(6).ok(),
        address: row.get(7).ok(),
        city: row.get(8).ok(),
        state: row.get(9).ok(),
        postal_code: row.get(10).ok(),
        country: row.get(11).ok(),
        service_radius: row.get(12).ok(),
        operating_hours_start: row.get(13).ok(),
        operating_hours_end: row.get(14).ok(),
        capacity: row.get(15).ok(),
        profile_image: row.get(16).ok(),
        certifications: row.get(17).ok(),
        promotional_text: row.get(18).ok(),
        years_in_business: row.get(19).ok(),
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

#[async_trait]
impl BusinessStore for LibSqlStore {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Owners ──────────────────────────────────────────────────────

    async fn create_owner(&self, name: &str, email: Option<&str>) -> Result<Owner, DatabaseError> {
        let owner = Owner {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.map(str::to_string),
            created_at: Utc::now(),
        };

        self.conn()
            .execute(
                "INSERT INTO owners (id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    owner.id.as_str(),
                    owner.name.as_str(),
                    opt_text(email),
                    owner.created_at.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("create_owner: {e}")))?;

        info!(owner_id = %owner.id, "Owner created");
        Ok(owner)
    }

    async fn first_owner_id(&self) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id FROM owners ORDER BY created_at ASC, rowid ASC LIMIT 1",
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("first_owner_id: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<String>(0)
                .map(Some)
                .map_err(|e| DatabaseError::Query(format!("first_owner_id: {e}"))),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("first_owner_id: {e}"))),
        }
    }

    // ── Businesses ──────────────────────────────────────────────────

    async fn create_business(
        &self,
        owner_id: &str,
        patch: &BusinessPatch,
    ) -> Result<Business, DatabaseError> {
        let name = patch
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| DatabaseError::Constraint("Business name is required".into()))?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        self.conn()
            .execute(
                "INSERT INTO businesses (id, owner_id, name, description, category, phone, email, address, city, state, postal_code, country, service_radius, operating_hours_start, operating_hours_end, capacity, profile_image, certifications, promotional_text, years_in_business, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)",
                params![
                    id.as_str(),
                    owner_id,
                    name,
                    opt_text(patch.description.as_deref()),
                    opt_category(patch.category),
                    opt_text(patch.phone.as_deref()),
                    opt_text(patch.email.as_deref()),
                    opt_text(patch.address.as_deref()),
                    opt_text(patch.city.as_deref()),
                    opt_text(patch.state.as_deref()),
                    opt_text(patch.postal_code.as_deref()),
                    opt_text(patch.country.as_deref()),
                    opt_int(patch.service_radius),
                    opt_text(patch.operating_hours_start.as_deref()),
                    opt_text(patch.operating_hours_end.as_deref()),
                    opt_int(patch.capacity),
                    opt_text(patch.profile_image.as_deref()),
                    opt_text(patch.certifications.as_deref()),
                    opt_text(patch.promotional_text.as_deref()),
                    opt_int(patch.years_in_business),
                    now.as_str(),
                    now.as_str()
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("create_business: {e}")))?;

        info!(business_id = %id, owner_id, "Business created");

        self.get_business(&id).await?.ok_or(DatabaseError::NotFound {
            entity: "business".into(),
            id,
        })
    }

    async fn update_business(
        &self,
        id: &str,
        patch: &BusinessPatch,
    ) -> Result<Business, DatabaseError> {
        let now = Utc::now().to_rfc3339();

        // NULL parameters keep the stored value.
        let count = self
            .conn()
            .execute(
                "UPDATE businesses SET
                    name = COALESCE(?2, name),
                    description = COALESCE(?3, description),
                    category = COALESCE(?4, category),
                    phone = COALESCE(?5, phone),
                    email = COALESCE(?6, email),
                    address = COALESCE(?7, address),
                    city = COALESCE(?8, city),
                    state = COALESCE(?9, state),
                    postal_code = COALESCE(?10, postal_code),
                    country = COALESCE(?11, country),
                    service_radius = COALESCE(?12, service_radius),
                    operating_hours_start = COALESCE(?13, operating_hours_start),
                    operating_hours_end = COALESCE(?14, operating_hours_end),
                    capacity = COALESCE(?15, capacity),
                    profile_image = COALESCE(?16, profile_image),
                    certifications = COALESCE(?17, certifications),
                    promotional_text = COALESCE(?18, promotional_text),
                    years_in_business = COALESCE(?19, years_in_business),
                    updated_at = ?20
                 WHERE id = ?1",
                params![
                    id,
                    opt_text(patch.name.as_deref().filter(|n| !n.trim().is_empty())),
                    opt_text(patch.description.as_deref()),
                    opt_category(patch.category),
                    opt_text(patch.phone.as_deref()),
                    opt_text(patch.email.as_deref()),
                    opt_text(patch.address.as_deref()),
                    opt_text(patch.city.as_deref()),
                    opt_text(patch.state.as_deref()),
                    opt_text(patch.postal_code.as_deref()),
                    opt_text(patch.country.as_deref()),
                    opt_int(patch.service_radius),
                    opt_text(patch.operating_hours_start.as_deref()),
                    opt_text(patch.operating_hours_end.as_deref()),
                    opt_int(patch.capacity),
                    opt_text(patch.profile_image.as_deref()),
                    opt_text(patch.certifications.as_deref()),
                    opt_text(patch.promotional_text.as_deref()),
                    opt_int(patch.years_in_business),
                    now.as_str()
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("update_business: {e}")))?;

        if count == 0 {
            return Err(DatabaseError::NotFound {
                entity: "business".into(),
                id: id.to_string(),
            });
        }
        debug!(business_id = %id, "Business updated");

        self.get_business(id).await?.ok_or_else(|| DatabaseError::NotFound {
            entity: "business".into(),
            id: id.to_string(),
        })
    }

    async fn get_business(&self, id: &str) -> Result<Option<Business>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {BUSINESS_COLUMNS} FROM businesses WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_business: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_business(&row)
                .map(Some)
                .map_err(|e| DatabaseError::Query(format!("get_business row: {e}"))),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_business: {e}"))),
        }
    }

    async fn list_businesses(
        &self,
        filter: &BusinessFilter,
    ) -> Result<Vec<Business>, DatabaseError> {
        let location = filter
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| format!("%{l}%"));

        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {BUSINESS_COLUMNS} FROM businesses
                     WHERE (?1 IS NULL OR category = ?1)
                       AND (?2 IS NULL OR city LIKE ?2 COLLATE NOCASE OR state LIKE ?2 COLLATE NOCASE)
                     ORDER BY created_at ASC, rowid ASC"
                ),
                params![opt_category(filter.category), opt_text(location.as_deref())],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_businesses: {e}")))?;

        let mut businesses = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_businesses: {e}")))?
        {
            businesses.push(
                row_to_business(&row)
                    .map_err(|e| DatabaseError::Query(format!("list_businesses row: {e}")))?,
            );
        }
        Ok(businesses)
    }
}
