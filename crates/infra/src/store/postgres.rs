//! Postgres-backed role graph and account stores.
//!
//! Reads the account/role tables owned by the CRUD service:
//!
//! | table | columns used |
//! |-------|--------------|
//! | `users` | `user_id`, `correo`, `estado`, `rol_id` |
//! | `roles` | `rol_id`, `nombre_rol` |
//! | `permisos` | `permiso_id`, `nombre_permiso` |
//! | `rol_permisos` | `rol_id`, `permiso_id` |
//! | `rol_hierarchy` | `rol_padre_id` (inheriting role), `rol_hijo_id` (inherited role) |
//!
//! Schema and migrations are owned elsewhere; these stores only read.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | `Io`, `Tls`, `PoolTimedOut`, `PoolClosed`, `WorkerCrashed` | `Unavailable` |
//! | `Database` with SQLSTATE class `08`, `53300`, `57P01`–`57P03` | `Unavailable` |
//! | anything else (decode failures, other database errors) | `Backend` |

use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use nutritrack_auth::{Account, AccountStatus, AccountStore, IdentityKey, Permission, RoleGraphStore, RoleNode, StoreError};
use nutritrack_core::{AccountId, PermissionId, RoleId};

/// Postgres-backed role graph.
///
/// A role fetch is two round-trips: the role row joined with its permissions,
/// then its inherited-role keys.
#[derive(Debug, Clone)]
pub struct PostgresRoleGraph {
    pool: Arc<PgPool>,
}

impl PostgresRoleGraph {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    pub fn from_shared(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RoleGraphStore for PostgresRoleGraph {
    #[instrument(skip(self), fields(role_id = %id), err)]
    async fn get_role(&self, id: RoleId) -> Result<Option<RoleNode>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                r.rol_id,
                r.nombre_rol,
                p.permiso_id,
                p.nombre_permiso
            FROM roles r
            LEFT JOIN rol_permisos rp ON rp.rol_id = r.rol_id
            LEFT JOIN permisos p ON p.permiso_id = rp.permiso_id
            WHERE r.rol_id = $1
            "#,
        )
        .bind(id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_role", e))?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };

        let name: String = first
            .try_get("nombre_rol")
            .map_err(|e| map_sqlx_error("get_role", e))?;
        let mut role = RoleNode::new(id, name);

        for row in &rows {
            if let Some(permission) = permission_from_row(row)? {
                role = role.with_permission(permission);
            }
        }

        let parents: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT rol_hijo_id
            FROM rol_hierarchy
            WHERE rol_padre_id = $1
            "#,
        )
        .bind(id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_role_inherits", e))?;

        for parent in parents {
            role = role.inheriting(parent);
        }

        Ok(Some(role))
    }
}

fn permission_from_row(row: &PgRow) -> Result<Option<Permission>, StoreError> {
    let id: Option<i32> = row
        .try_get("permiso_id")
        .map_err(|e| map_sqlx_error("get_role", e))?;
    let name: Option<String> = row
        .try_get("nombre_permiso")
        .map_err(|e| map_sqlx_error("get_role", e))?;

    // LEFT JOIN: a role without permissions yields one row of NULLs.
    Ok(match (id, name) {
        (Some(id), Some(name)) => Some(Permission::new(PermissionId::new(id), name)),
        _ => None,
    })
}

/// Postgres-backed account store (lookup by `correo`).
#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: Arc<PgPool>,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    pub fn from_shared(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self), fields(identity = %identity), err)]
    async fn get_account(&self, identity: &IdentityKey) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                user_id,
                correo,
                estado,
                rol_id
            FROM users
            WHERE correo = $1
            "#,
        )
        .bind(identity.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_account", e))?;

        row.map(|row| account_from_row(identity, &row)).transpose()
    }
}

fn account_from_row(identity: &IdentityKey, row: &PgRow) -> Result<Account, StoreError> {
    let decode = |e| map_sqlx_error("get_account", e);

    let user_id: i64 = row.try_get("user_id").map_err(decode)?;
    let estado: Option<i32> = row.try_get("estado").map_err(decode)?;
    let rol_id: Option<i32> = row.try_get("rol_id").map_err(decode)?;

    let Some(rol_id) = rol_id else {
        return Err(StoreError::backend(format!("account {user_id} has no base role")));
    };

    Ok(Account {
        id: AccountId::new(user_id),
        identity: identity.clone(),
        // NULL status is not active.
        status: estado.map(AccountStatus::from_code).unwrap_or(AccountStatus::Inactive),
        base_role: RoleId::new(rol_id),
    })
}

/// Map SQLx errors to `StoreError`.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    let unavailable = match &err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|code| is_connection_sqlstate(code.as_ref()))
            .unwrap_or(false),
        _ => false,
    };

    if unavailable {
        StoreError::unavailable(format!("{operation}: {err}"))
    } else {
        StoreError::backend(format!("{operation}: {err}"))
    }
}

fn is_connection_sqlstate(code: &str) -> bool {
    // 08xxx connection exception, 53300 too_many_connections,
    // 57P01..57P03 admin/crash shutdown, cannot_connect_now.
    code.starts_with("08") || matches!(code, "53300" | "57P01" | "57P02" | "57P03")
}
