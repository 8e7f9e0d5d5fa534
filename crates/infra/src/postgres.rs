//! Postgres-backed assignment store and user profile lookup.
//!
//! Expected schema (column names; soft-deleted rows carry `deleted_at`):
//!
//! | table              | columns                                                    |
//! |--------------------|------------------------------------------------------------|
//! | `users`            | `user_id`, `email`, `nickname`, `deleted_at`               |
//! | `user_roles`       | `user_id`, `role_id`                                       |
//! | `roles`            | `id`, `role_label`, `role_name`, `deleted_at`              |
//! | `role_permissions` | `role_id`, `permission_id`                                 |
//! | `permissions`      | `id`, `permission_name`, `permission_type`, `path`, `route`, `route_file`, `parent_id`, `level`, `sort`, `icon`, `method`, `created_at`, `updated_at`, `deleted_at` |
//!
//! A `parent_id` of `0` or NULL marks a top-level permission.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | PoolClosed / PoolTimedOut / Io / Tls | `Unavailable` |
//! | ColumnDecode / Decode / ColumnNotFound | `Decode` |
//! | Database / anything else | `Query` |

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use std::sync::Arc;
use tracing::instrument;

use rolegate_auth::{
    AssignmentStore, FlatAssignmentRecord, PermissionType, SortDirection, StoreError, User,
};
use rolegate_core::{PermissionId, RoleId, UserId};

const SELECT_ASSIGNMENTS: &str = r#"
    SELECT
        u.user_id,
        r.id AS role_id,
        r.role_label,
        r.role_name,
        p.id AS permission_id,
        p.permission_type,
        p.permission_name,
        p.route,
        p.route_file,
        p.level,
        p.sort,
        p.parent_id,
        p.path,
        p.icon,
        p.method,
        p.created_at,
        p.updated_at
    FROM users u
    JOIN user_roles ur ON ur.user_id = u.user_id
    JOIN roles r ON r.id = ur.role_id AND r.deleted_at IS NULL
    JOIN role_permissions rp ON rp.role_id = r.id
    JOIN permissions p ON p.id = rp.permission_id AND p.deleted_at IS NULL
    WHERE u.user_id = $1
      AND u.deleted_at IS NULL
      AND ($2::text IS NULL OR lower(p.permission_type) = $2)
"#;

/// One row per live role of the user; a user with no roles yields one row
/// with a NULL `role_id`.
const SELECT_USER: &str = r#"
    SELECT
        u.user_id,
        u.email,
        u.nickname,
        r.id AS role_id
    FROM users u
    LEFT JOIN user_roles ur ON ur.user_id = u.user_id
    LEFT JOIN roles r ON r.id = ur.role_id AND r.deleted_at IS NULL
    WHERE u.user_id = $1
      AND u.deleted_at IS NULL
    ORDER BY r.id ASC
"#;

/// Full query text for a given sort hint. Direction comes from a closed enum,
/// never from caller text.
fn assignments_query(sort_hint: Option<SortDirection>) -> String {
    let order = match sort_hint {
        Some(SortDirection::Asc) => "ORDER BY p.sort ASC, p.id ASC",
        Some(SortDirection::Desc) => "ORDER BY p.sort DESC, p.id ASC",
        None => "ORDER BY r.id ASC, p.id ASC",
    };
    format!("{SELECT_ASSIGNMENTS}    {order}")
}

/// Postgres-backed [`AssignmentStore`]: one join query per call.
#[derive(Debug, Clone)]
pub struct PgAssignmentStore {
    pool: Arc<PgPool>,
}

impl PgAssignmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }
}

#[async_trait::async_trait]
impl AssignmentStore for PgAssignmentStore {
    #[instrument(
        skip(self, user_id, permission_type),
        fields(
            user_id = %user_id,
            permission_type = ?permission_type,
            row_count = tracing::field::Empty
        ),
        err
    )]
    async fn fetch_assignments(
        &self,
        user_id: &UserId,
        permission_type: Option<&PermissionType>,
        sort_hint: Option<SortDirection>,
    ) -> Result<Vec<FlatAssignmentRecord>, StoreError> {
        let query = assignments_query(sort_hint);
        let rows = sqlx::query(&query)
            .bind(user_id.as_str())
            .bind(permission_type.map(|t| t.as_str().to_lowercase()))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_assignments", e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let row = AssignmentRow::from_row(&row)
                .map_err(|e| map_sqlx_error("fetch_assignments", e))?;
            records.push(row.into_record()?);
        }

        tracing::Span::current().record("row_count", records.len());
        Ok(records)
    }

    #[instrument(skip(self, user_id), fields(user_id = %user_id), err)]
    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, StoreError> {
        let rows = sqlx::query(SELECT_USER)
            .bind(user_id.as_str())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?;

        let rows = rows
            .iter()
            .map(|row| UserRow::from_row(row))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("find_user", e))?;

        user_from_rows(rows)
    }
}

/// Map SQLx errors onto the store's failure taxonomy.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool unavailable in {operation}: {err}"))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => StoreError::Unavailable(format!("tls error in {operation}: {e}")),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Decode(format!("failed to decode row in {operation}: {err}"))
        }
        sqlx::Error::Database(db_err) => {
            StoreError::Query(format!("database error in {operation}: {}", db_err.message()))
        }
        _ => StoreError::Query(format!("sqlx error in {operation}: {err}")),
    }
}

struct AssignmentRow {
    user_id: String,
    role_id: i64,
    role_label: String,
    role_name: String,
    permission_id: i64,
    permission_type: String,
    permission_name: String,
    route: Option<String>,
    route_file: Option<String>,
    level: i32,
    sort: Option<String>,
    parent_id: Option<i64>,
    path: Option<String>,
    icon: Option<String>,
    method: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for AssignmentRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(AssignmentRow {
            user_id: row.try_get("user_id")?,
            role_id: row.try_get("role_id")?,
            role_label: row.try_get("role_label")?,
            role_name: row.try_get("role_name")?,
            permission_id: row.try_get("permission_id")?,
            permission_type: row.try_get("permission_type")?,
            permission_name: row.try_get("permission_name")?,
            route: row.try_get("route")?,
            route_file: row.try_get("route_file")?,
            level: row.try_get("level")?,
            sort: row.try_get("sort")?,
            parent_id: row.try_get("parent_id")?,
            path: row.try_get("path")?,
            icon: row.try_get("icon")?,
            method: row.try_get("method")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

struct UserRow {
    user_id: String,
    email: Option<String>,
    nickname: Option<String>,
    role_id: Option<i64>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for UserRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            user_id: row.try_get("user_id")?,
            email: row.try_get("email")?,
            nickname: row.try_get("nickname")?,
            role_id: row.try_get("role_id")?,
        })
    }
}

/// Fold the per-role rows of one user back into a [`User`].
fn user_from_rows(rows: Vec<UserRow>) -> Result<Option<User>, StoreError> {
    let mut rows = rows.into_iter();
    let Some(first) = rows.next() else {
        return Ok(None);
    };

    let mut role_ids = Vec::new();
    for raw in std::iter::once(first.role_id).chain(rows.map(|r| r.role_id)).flatten() {
        role_ids.push(RoleId::new(to_id("role_id", raw)?));
    }

    let id = UserId::new(first.user_id).map_err(|e| StoreError::Decode(e.to_string()))?;
    let user = User::new(
        id,
        first.email.unwrap_or_default(),
        first.nickname.unwrap_or_default(),
    );
    Ok(Some(user.with_roles(role_ids)))
}

fn to_id(column: &str, raw: i64) -> Result<u64, StoreError> {
    u64::try_from(raw).map_err(|_| StoreError::Decode(format!("negative {column}: {raw}")))
}

/// `0` and NULL both mean "no parent".
fn parent_from_column(raw: Option<i64>) -> Result<Option<PermissionId>, StoreError> {
    match raw {
        None | Some(0) => Ok(None),
        Some(id) => Ok(Some(PermissionId::new(to_id("parent_id", id)?))),
    }
}

impl AssignmentRow {
    fn into_record(self) -> Result<FlatAssignmentRecord, StoreError> {
        Ok(FlatAssignmentRecord {
            user_id: UserId::new(self.user_id).map_err(|e| StoreError::Decode(e.to_string()))?,
            role_id: RoleId::new(to_id("role_id", self.role_id)?),
            role_label: self.role_label,
            role_name: self.role_name,
            permission_id: PermissionId::new(to_id("permission_id", self.permission_id)?),
            permission_type: PermissionType::parse(&self.permission_type),
            permission_name: self.permission_name,
            route: self.route.unwrap_or_default(),
            route_file: self.route_file.unwrap_or_default(),
            level: self.level,
            sort: self.sort.unwrap_or_default(),
            parent_id: parent_from_column(self.parent_id)?,
            path: self.path.unwrap_or_default(),
            icon: self.icon.unwrap_or_default(),
            method: self.method.unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> AssignmentRow {
        AssignmentRow {
            user_id: "u-1".to_string(),
            role_id: 1,
            role_label: "user".to_string(),
            role_name: "User".to_string(),
            permission_id: 7,
            permission_type: "API".to_string(),
            permission_name: "default".to_string(),
            route: None,
            route_file: None,
            level: 1,
            sort: None,
            parent_id: Some(0),
            path: Some("auth_0".to_string()),
            icon: None,
            method: Some("all".to_string()),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn row_maps_to_record() {
        let record = row().into_record().unwrap();
        assert_eq!(record.permission_type, PermissionType::Api);
        assert_eq!(record.permission_id, PermissionId::new(7));
        assert_eq!(record.parent_id, None);
        assert_eq!(record.path, "auth_0");
        assert_eq!(record.sort, "");
    }

    #[test]
    fn parent_zero_and_null_mean_top_level() {
        assert_eq!(parent_from_column(None), Ok(None));
        assert_eq!(parent_from_column(Some(0)), Ok(None));
        assert_eq!(parent_from_column(Some(5)), Ok(Some(PermissionId::new(5))));
        assert!(matches!(parent_from_column(Some(-1)), Err(StoreError::Decode(_))));
    }

    #[test]
    fn blank_user_id_is_a_decode_error() {
        let mut bad = row();
        bad.user_id = "  ".to_string();
        assert!(matches!(bad.into_record(), Err(StoreError::Decode(_))));
    }

    fn user_row(role_id: Option<i64>) -> UserRow {
        UserRow {
            user_id: "u-1".to_string(),
            email: Some("U1@Example.com".to_string()),
            nickname: Some("alan".to_string()),
            role_id,
        }
    }

    #[test]
    fn user_rows_fold_into_one_profile() {
        let user = user_from_rows(vec![user_row(Some(1)), user_row(Some(2))])
            .unwrap()
            .unwrap();
        assert_eq!(user.id.as_str(), "u-1");
        assert_eq!(user.email, "u1@example.com");
        assert_eq!(user.display_name, "alan");
        assert_eq!(user.role_ids, vec![RoleId::new(1), RoleId::new(2)]);
    }

    #[test]
    fn user_without_roles_still_has_a_profile() {
        let user = user_from_rows(vec![user_row(None)]).unwrap().unwrap();
        assert!(user.role_ids.is_empty());
        assert_eq!(user_from_rows(Vec::new()), Ok(None));
    }

    #[test]
    fn query_order_follows_hint() {
        assert!(assignments_query(Some(SortDirection::Asc)).contains("p.sort ASC"));
        assert!(assignments_query(Some(SortDirection::Desc)).contains("p.sort DESC"));
        assert!(assignments_query(None).contains("ORDER BY r.id"));
    }

    #[test]
    fn sqlx_errors_map_to_store_errors() {
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::PoolClosed),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::ColumnNotFound("sort".into())),
            StoreError::Decode(_)
        ));
        assert!(matches!(
            map_sqlx_error("op", sqlx::Error::RowNotFound),
            StoreError::Query(_)
        ));
    }
}
