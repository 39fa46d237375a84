//! Database Connection Pool and Postgres Store
//!
//! PostgreSQL connection pooling with deadpool-postgres and a
//! [`ContentStore`] implementation over plain tables. Partial updates run
//! as read-modify-write inside a transaction with the row locked, so the
//! same patch logic as the in-memory store applies.

use async_trait::async_trait;
use chrono::Utc;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolError, RecyclingMethod, Runtime};
use snipspace_core::{
    ContentCounts, DomainError, EntityIdType, EntityType, Note, NoteId, OwnerId, Prompt,
    PromptId, Snippet, SnippetId, SnipspaceError, SnipspaceResult, Space, SpaceId, StorageError,
    Timestamp,
};
use snipspace_storage::{ContentStore, NoteUpdate, SnippetUpdate, SpaceUpdate};
use std::time::Duration;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Wait timeout when the pool is exhausted
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "snipspace".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("SNIPSPACE_DB_HOST").unwrap_or(defaults.host),
            port: std::env::var("SNIPSPACE_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            dbname: std::env::var("SNIPSPACE_DB_NAME").unwrap_or(defaults.dbname),
            user: std::env::var("SNIPSPACE_DB_USER").unwrap_or(defaults.user),
            password: std::env::var("SNIPSPACE_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("SNIPSPACE_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_size),
            timeout: defaults.timeout,
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_config = deadpool_postgres::PoolConfig::new(self.max_size);
        pool_config.timeouts.wait = Some(self.timeout);
        cfg.pool = Some(pool_config);

        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS spaces (
    space_id    UUID PRIMARY KEY,
    owner_id    TEXT NOT NULL,
    name        TEXT NOT NULL,
    description TEXT,
    icon        TEXT,
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS spaces_owner_idx ON spaces (owner_id);

CREATE TABLE IF NOT EXISTS snippets (
    snippet_id  UUID PRIMARY KEY,
    owner_id    TEXT NOT NULL,
    space_id    UUID REFERENCES spaces (space_id) ON DELETE RESTRICT,
    title       TEXT NOT NULL,
    code        TEXT NOT NULL,
    language    TEXT NOT NULL,
    description TEXT,
    tags        TEXT[] NOT NULL DEFAULT '{}',
    project     TEXT,
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS snippets_owner_idx ON snippets (owner_id);
CREATE INDEX IF NOT EXISTS snippets_owner_space_idx ON snippets (owner_id, space_id);
CREATE INDEX IF NOT EXISTS snippets_owner_language_idx ON snippets (owner_id, language);
CREATE INDEX IF NOT EXISTS snippets_owner_project_idx ON snippets (owner_id, project);

CREATE TABLE IF NOT EXISTS notes (
    note_id     UUID PRIMARY KEY,
    owner_id    TEXT NOT NULL,
    space_id    UUID REFERENCES spaces (space_id) ON DELETE SET NULL,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    description TEXT,
    tags        TEXT[] NOT NULL DEFAULT '{}',
    project     TEXT,
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS notes_owner_idx ON notes (owner_id);
CREATE INDEX IF NOT EXISTS notes_owner_space_idx ON notes (owner_id, space_id);
CREATE INDEX IF NOT EXISTS notes_owner_project_idx ON notes (owner_id, project);

CREATE TABLE IF NOT EXISTS prompts (
    prompt_id   UUID PRIMARY KEY,
    owner_id    TEXT NOT NULL,
    space_id    UUID REFERENCES spaces (space_id) ON DELETE SET NULL,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    description TEXT,
    tags        TEXT[] NOT NULL DEFAULT '{}',
    project     TEXT,
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS prompts_owner_idx ON prompts (owner_id);
CREATE INDEX IF NOT EXISTS prompts_owner_space_idx ON prompts (owner_id, space_id);
CREATE INDEX IF NOT EXISTS prompts_owner_project_idx ON prompts (owner_id, project);
"#;

const COUNT_SPACE_SNIPPETS: &str = "SELECT COUNT(*) FROM snippets WHERE space_id = $1";

const SPACE_COLUMNS: &str = "space_id, owner_id, name, description, icon, created_at, updated_at";

const SNIPPET_COLUMNS: &str = "snippet_id, owner_id, space_id, title, code, language, \
                               description, tags, project, created_at, updated_at";

/// Notes and prompts live in separate tables of identical shape.
#[derive(Debug, Clone, Copy)]
struct TextTable {
    table: &'static str,
    id_column: &'static str,
    entity: EntityType,
}

const NOTES: TextTable = TextTable {
    table: "notes",
    id_column: "note_id",
    entity: EntityType::Note,
};

const PROMPTS: TextTable = TextTable {
    table: "prompts",
    id_column: "prompt_id",
    entity: EntityType::Prompt,
};

impl TextTable {
    fn columns(&self) -> String {
        format!(
            "{}, owner_id, space_id, title, content, description, tags, project, created_at, updated_at",
            self.id_column
        )
    }
}

// ============================================================================
// ROW MAPPING
// ============================================================================

fn backend(err: impl std::fmt::Display) -> SnipspaceError {
    SnipspaceError::Storage(StorageError::Backend {
        reason: err.to_string(),
    })
}

fn pool_error(err: PoolError) -> SnipspaceError {
    let storage = match err {
        PoolError::Timeout(_) => StorageError::PoolExhausted,
        PoolError::Closed => StorageError::Unavailable {
            reason: "connection pool is closed".to_string(),
        },
        other => StorageError::Backend {
            reason: other.to_string(),
        },
    };
    SnipspaceError::Storage(storage)
}

/// A content row whose space reference fails the foreign key points at a
/// space that no longer exists.
fn missing_space(err: &tokio_postgres::Error, space_id: Option<SpaceId>) -> Option<SnipspaceError> {
    match space_id {
        Some(space_id) if err.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) => {
            Some(not_found(EntityType::Space, space_id.as_uuid()))
        }
        _ => None,
    }
}

fn insert_error(
    entity_type: EntityType,
    space_id: Option<SpaceId>,
    err: tokio_postgres::Error,
) -> SnipspaceError {
    if let Some(missing) = missing_space(&err, space_id) {
        return missing;
    }
    let reason = if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        "already exists".to_string()
    } else {
        err.to_string()
    };
    SnipspaceError::Storage(StorageError::InsertFailed { entity_type, reason })
}

fn update_error(
    entity_type: EntityType,
    id: Uuid,
    space_id: Option<SpaceId>,
    err: tokio_postgres::Error,
) -> SnipspaceError {
    missing_space(&err, space_id).unwrap_or_else(|| {
        SnipspaceError::Storage(StorageError::UpdateFailed {
            entity_type,
            id,
            reason: err.to_string(),
        })
    })
}

fn space_not_empty(space_id: Uuid, snippets: u64) -> SnipspaceError {
    SnipspaceError::Domain(DomainError::SpaceNotEmpty { space_id, snippets })
}

fn not_found(entity_type: EntityType, id: Uuid) -> SnipspaceError {
    SnipspaceError::Storage(StorageError::NotFound { entity_type, id })
}

fn space_from_row(row: &Row) -> SnipspaceResult<Space> {
    Ok(Space {
        space_id: SpaceId::new(row.try_get("space_id").map_err(backend)?),
        owner_id: OwnerId::new(row.try_get::<_, String>("owner_id").map_err(backend)?),
        name: row.try_get("name").map_err(backend)?,
        description: row.try_get("description").map_err(backend)?,
        icon: row.try_get("icon").map_err(backend)?,
        created_at: row.try_get("created_at").map_err(backend)?,
        updated_at: row.try_get("updated_at").map_err(backend)?,
    })
}

fn snippet_from_row(row: &Row) -> SnipspaceResult<Snippet> {
    Ok(Snippet {
        snippet_id: SnippetId::new(row.try_get("snippet_id").map_err(backend)?),
        owner_id: OwnerId::new(row.try_get::<_, String>("owner_id").map_err(backend)?),
        space_id: row
            .try_get::<_, Option<Uuid>>("space_id")
            .map_err(backend)?
            .map(SpaceId::new),
        title: row.try_get("title").map_err(backend)?,
        code: row.try_get("code").map_err(backend)?,
        language: row.try_get("language").map_err(backend)?,
        description: row.try_get("description").map_err(backend)?,
        tags: row.try_get("tags").map_err(backend)?,
        project: row.try_get("project").map_err(backend)?,
        created_at: row.try_get("created_at").map_err(backend)?,
        updated_at: row.try_get("updated_at").map_err(backend)?,
    })
}

/// Column values shared by notes and prompts.
struct TextRow {
    id: Uuid,
    owner_id: OwnerId,
    space_id: Option<SpaceId>,
    title: String,
    content: String,
    description: Option<String>,
    tags: Vec<String>,
    project: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl TextRow {
    fn read(row: &Row, table: TextTable) -> SnipspaceResult<Self> {
        Ok(Self {
            id: row.try_get(table.id_column).map_err(backend)?,
            owner_id: OwnerId::new(row.try_get::<_, String>("owner_id").map_err(backend)?),
            space_id: row
                .try_get::<_, Option<Uuid>>("space_id")
                .map_err(backend)?
                .map(SpaceId::new),
            title: row.try_get("title").map_err(backend)?,
            content: row.try_get("content").map_err(backend)?,
            description: row.try_get("description").map_err(backend)?,
            tags: row.try_get("tags").map_err(backend)?,
            project: row.try_get("project").map_err(backend)?,
            created_at: row.try_get("created_at").map_err(backend)?,
            updated_at: row.try_get("updated_at").map_err(backend)?,
        })
    }
}

macro_rules! text_row_conversions {
    ($record:ident, $id:ident => $id_field:ident) => {
        impl From<TextRow> for $record {
            fn from(row: TextRow) -> Self {
                $record {
                    $id_field: $id::new(row.id),
                    owner_id: row.owner_id,
                    space_id: row.space_id,
                    title: row.title,
                    content: row.content,
                    description: row.description,
                    tags: row.tags,
                    project: row.project,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
            }
        }

        impl From<&$record> for TextRow {
            fn from(record: &$record) -> Self {
                TextRow {
                    id: record.$id_field.as_uuid(),
                    owner_id: record.owner_id.clone(),
                    space_id: record.space_id,
                    title: record.title.clone(),
                    content: record.content.clone(),
                    description: record.description.clone(),
                    tags: record.tags.clone(),
                    project: record.project.clone(),
                    created_at: record.created_at,
                    updated_at: record.updated_at,
                }
            }
        }
    };
}

text_row_conversions!(Note, NoteId => note_id);
text_row_conversions!(Prompt, PromptId => prompt_id);

fn uuid_of(space_id: Option<SpaceId>) -> Option<Uuid> {
    space_id.map(|id| id.as_uuid())
}

// ============================================================================
// POSTGRES STORE
// ============================================================================

/// [`ContentStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a store from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        Ok(Self::new(config.create_pool()?))
    }

    async fn conn(&self) -> SnipspaceResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(pool_error)
    }

    /// Create tables and indexes if they do not exist.
    pub async fn migrate(&self) -> SnipspaceResult<()> {
        let conn = self.conn().await?;
        conn.batch_execute(SCHEMA).await.map_err(backend)?;
        tracing::info!("Database schema ready");
        Ok(())
    }

    async fn delete_by_id(
        &self,
        table: &str,
        id_column: &str,
        entity_type: EntityType,
        id: Uuid,
    ) -> SnipspaceResult<()> {
        let conn = self.conn().await?;
        let sql = format!("DELETE FROM {} WHERE {} = $1", table, id_column);
        let deleted = conn.execute(sql.as_str(), &[&id]).await.map_err(|e| {
            SnipspaceError::Storage(StorageError::DeleteFailed {
                entity_type,
                id,
                reason: e.to_string(),
            })
        })?;
        if deleted == 0 {
            return Err(not_found(entity_type, id));
        }
        Ok(())
    }

    // ========================================================================
    // NOTE / PROMPT TABLE ACCESS
    // ========================================================================

    async fn text_insert(&self, table: TextTable, row: TextRow) -> SnipspaceResult<()> {
        let conn = self.conn().await?;
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            table.table,
            table.columns()
        );
        let space_id = uuid_of(row.space_id);
        let owner = row.owner_id.as_str();
        let params: [&(dyn ToSql + Sync); 10] = [
            &row.id,
            &owner,
            &space_id,
            &row.title,
            &row.content,
            &row.description,
            &row.tags,
            &row.project,
            &row.created_at,
            &row.updated_at,
        ];
        conn.execute(sql.as_str(), &params)
            .await
            .map_err(|e| insert_error(table.entity, row.space_id, e))?;
        Ok(())
    }

    async fn text_get(&self, table: TextTable, id: Uuid) -> SnipspaceResult<Option<TextRow>> {
        let conn = self.conn().await?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            table.columns(),
            table.table,
            table.id_column
        );
        let row = conn.query_opt(sql.as_str(), &[&id]).await.map_err(backend)?;
        row.map(|r| TextRow::read(&r, table)).transpose()
    }

    async fn text_list(
        &self,
        table: TextTable,
        owner: &OwnerId,
        space_id: Option<SpaceId>,
    ) -> SnipspaceResult<Vec<TextRow>> {
        let conn = self.conn().await?;
        let sql = format!(
            "SELECT {} FROM {} WHERE owner_id = $1 AND ($2::uuid IS NULL OR space_id = $2)",
            table.columns(),
            table.table
        );
        let space_id = uuid_of(space_id);
        let rows = conn
            .query(sql.as_str(), &[&owner.as_str(), &space_id])
            .await
            .map_err(backend)?;
        rows.iter().map(|r| TextRow::read(r, table)).collect()
    }

    /// Lock the row, apply `patch` to the decoded record and write it back.
    async fn text_update<R, F>(&self, table: TextTable, id: Uuid, patch: F) -> SnipspaceResult<R>
    where
        R: From<TextRow> + Send,
        for<'a> &'a R: Into<TextRow>,
        F: FnOnce(&mut R) + Send,
    {
        let mut conn = self.conn().await?;
        let tx = conn.transaction().await.map_err(backend)?;

        let select = format!(
            "SELECT {} FROM {} WHERE {} = $1 FOR UPDATE",
            table.columns(),
            table.table,
            table.id_column
        );
        let row = tx
            .query_opt(select.as_str(), &[&id])
            .await
            .map_err(backend)?
            .ok_or_else(|| not_found(table.entity, id))?;

        let mut record = R::from(TextRow::read(&row, table)?);
        patch(&mut record);
        let updated: TextRow = (&record).into();

        let update = format!(
            "UPDATE {} SET space_id = $2, title = $3, content = $4, description = $5, \
             tags = $6, project = $7, updated_at = $8 WHERE {} = $1",
            table.table, table.id_column
        );
        let space_id = uuid_of(updated.space_id);
        tx.execute(
            update.as_str(),
            &[
                &id,
                &space_id,
                &updated.title,
                &updated.content,
                &updated.description,
                &updated.tags,
                &updated.project,
                &updated.updated_at,
            ],
        )
        .await
        .map_err(|e| update_error(table.entity, id, updated.space_id, e))?;

        tx.commit().await.map_err(backend)?;
        Ok(record)
    }

    /// Run one `UPDATE ... SET space_id` per content table in a transaction.
    async fn reassign_space(
        &self,
        filter: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> SnipspaceResult<ContentCounts> {
        let mut conn = self.conn().await?;
        let tx = conn.transaction().await.map_err(backend)?;

        let mut counts = ContentCounts::default();
        for (table, slot) in [
            ("snippets", &mut counts.snippets),
            ("notes", &mut counts.notes),
            ("prompts", &mut counts.prompts),
        ] {
            let sql = format!("UPDATE {} SET {}", table, filter);
            *slot = tx.execute(sql.as_str(), params).await.map_err(backend)?;
        }

        tx.commit().await.map_err(backend)?;
        Ok(counts)
    }
}

#[async_trait]
impl ContentStore for PgStore {
    // ========================================================================
    // SPACE OPERATIONS
    // ========================================================================

    async fn space_insert(&self, space: &Space) -> SnipspaceResult<()> {
        let conn = self.conn().await?;
        let sql = format!(
            "INSERT INTO spaces ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            SPACE_COLUMNS
        );
        conn.execute(
            sql.as_str(),
            &[
                &space.space_id.as_uuid(),
                &space.owner_id.as_str(),
                &space.name,
                &space.description,
                &space.icon,
                &space.created_at,
                &space.updated_at,
            ],
        )
        .await
        .map_err(|e| insert_error(EntityType::Space, None, e))?;
        Ok(())
    }

    async fn space_get(&self, id: SpaceId) -> SnipspaceResult<Option<Space>> {
        let conn = self.conn().await?;
        let sql = format!("SELECT {} FROM spaces WHERE space_id = $1", SPACE_COLUMNS);
        let row = conn
            .query_opt(sql.as_str(), &[&id.as_uuid()])
            .await
            .map_err(backend)?;
        row.as_ref().map(space_from_row).transpose()
    }

    async fn space_update(&self, id: SpaceId, update: SpaceUpdate) -> SnipspaceResult<Space> {
        let mut conn = self.conn().await?;
        let tx = conn.transaction().await.map_err(backend)?;

        let select = format!(
            "SELECT {} FROM spaces WHERE space_id = $1 FOR UPDATE",
            SPACE_COLUMNS
        );
        let row = tx
            .query_opt(select.as_str(), &[&id.as_uuid()])
            .await
            .map_err(backend)?
            .ok_or_else(|| not_found(EntityType::Space, id.as_uuid()))?;

        let mut space = space_from_row(&row)?;
        update.apply_to(&mut space, Utc::now());

        tx.execute(
            "UPDATE spaces SET name = $2, description = $3, icon = $4, updated_at = $5 \
             WHERE space_id = $1",
            &[
                &id.as_uuid(),
                &space.name,
                &space.description,
                &space.icon,
                &space.updated_at,
            ],
        )
        .await
        .map_err(|e| {
            SnipspaceError::Storage(StorageError::UpdateFailed {
                entity_type: EntityType::Space,
                id: id.as_uuid(),
                reason: e.to_string(),
            })
        })?;

        tx.commit().await.map_err(backend)?;
        Ok(space)
    }

    async fn space_delete(&self, id: SpaceId) -> SnipspaceResult<ContentCounts> {
        let space_id = id.as_uuid();
        let mut conn = self.conn().await?;
        let tx = conn.transaction().await.map_err(backend)?;

        // Inserts referencing the space wait on this row lock.
        tx.query_opt(
            "SELECT space_id FROM spaces WHERE space_id = $1 FOR UPDATE",
            &[&space_id],
        )
        .await
        .map_err(backend)?
        .ok_or_else(|| not_found(EntityType::Space, space_id))?;

        let row = tx
            .query_one(COUNT_SPACE_SNIPPETS, &[&space_id])
            .await
            .map_err(backend)?;
        let snippets: i64 = row.try_get(0).map_err(backend)?;
        if snippets > 0 {
            return Err(space_not_empty(space_id, snippets as u64));
        }

        let now = Utc::now();
        let mut detached = ContentCounts::default();
        for (table, slot) in [("notes", &mut detached.notes), ("prompts", &mut detached.prompts)] {
            let sql = format!(
                "UPDATE {} SET space_id = NULL, updated_at = $2 WHERE space_id = $1",
                table
            );
            *slot = tx
                .execute(sql.as_str(), &[&space_id, &now])
                .await
                .map_err(backend)?;
        }

        let deleted = tx
            .execute("DELETE FROM spaces WHERE space_id = $1", &[&space_id])
            .await;
        match deleted {
            Ok(_) => {
                tx.commit().await.map_err(backend)?;
                Ok(detached)
            }
            Err(e) if e.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) => {
                drop(tx);
                let row = conn
                    .query_one(COUNT_SPACE_SNIPPETS, &[&space_id])
                    .await
                    .map_err(backend)?;
                let snippets: i64 = row.try_get(0).map_err(backend)?;
                Err(space_not_empty(space_id, snippets.max(1) as u64))
            }
            Err(e) => Err(SnipspaceError::Storage(StorageError::DeleteFailed {
                entity_type: EntityType::Space,
                id: space_id,
                reason: e.to_string(),
            })),
        }
    }

    async fn space_list_by_owner(&self, owner: &OwnerId) -> SnipspaceResult<Vec<Space>> {
        let conn = self.conn().await?;
        let sql = format!("SELECT {} FROM spaces WHERE owner_id = $1", SPACE_COLUMNS);
        let rows = conn
            .query(sql.as_str(), &[&owner.as_str()])
            .await
            .map_err(backend)?;
        rows.iter().map(space_from_row).collect()
    }

    // ========================================================================
    // SNIPPET OPERATIONS
    // ========================================================================

    async fn snippet_insert(&self, snippet: &Snippet) -> SnipspaceResult<()> {
        let conn = self.conn().await?;
        let sql = format!(
            "INSERT INTO snippets ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            SNIPPET_COLUMNS
        );
        conn.execute(
            sql.as_str(),
            &[
                &snippet.snippet_id.as_uuid(),
                &snippet.owner_id.as_str(),
                &uuid_of(snippet.space_id),
                &snippet.title,
                &snippet.code,
                &snippet.language,
                &snippet.description,
                &snippet.tags,
                &snippet.project,
                &snippet.created_at,
                &snippet.updated_at,
            ],
        )
        .await
        .map_err(|e| insert_error(EntityType::Snippet, snippet.space_id, e))?;
        Ok(())
    }

    async fn snippet_get(&self, id: SnippetId) -> SnipspaceResult<Option<Snippet>> {
        let conn = self.conn().await?;
        let sql = format!("SELECT {} FROM snippets WHERE snippet_id = $1", SNIPPET_COLUMNS);
        let row = conn
            .query_opt(sql.as_str(), &[&id.as_uuid()])
            .await
            .map_err(backend)?;
        row.as_ref().map(snippet_from_row).transpose()
    }

    async fn snippet_update(
        &self,
        id: SnippetId,
        update: SnippetUpdate,
    ) -> SnipspaceResult<Snippet> {
        let mut conn = self.conn().await?;
        let tx = conn.transaction().await.map_err(backend)?;

        let select = format!(
            "SELECT {} FROM snippets WHERE snippet_id = $1 FOR UPDATE",
            SNIPPET_COLUMNS
        );
        let row = tx
            .query_opt(select.as_str(), &[&id.as_uuid()])
            .await
            .map_err(backend)?
            .ok_or_else(|| not_found(EntityType::Snippet, id.as_uuid()))?;

        let mut snippet = snippet_from_row(&row)?;
        update.apply_to(&mut snippet, Utc::now());

        tx.execute(
            "UPDATE snippets SET space_id = $2, title = $3, code = $4, language = $5, \
             description = $6, tags = $7, project = $8, updated_at = $9 WHERE snippet_id = $1",
            &[
                &id.as_uuid(),
                &uuid_of(snippet.space_id),
                &snippet.title,
                &snippet.code,
                &snippet.language,
                &snippet.description,
                &snippet.tags,
                &snippet.project,
                &snippet.updated_at,
            ],
        )
        .await
        .map_err(|e| update_error(EntityType::Snippet, id.as_uuid(), snippet.space_id, e))?;

        tx.commit().await.map_err(backend)?;
        Ok(snippet)
    }

    async fn snippet_delete(&self, id: SnippetId) -> SnipspaceResult<()> {
        self.delete_by_id("snippets", "snippet_id", EntityType::Snippet, id.as_uuid())
            .await
    }

    async fn snippet_list_by_owner(
        &self,
        owner: &OwnerId,
        space_id: Option<SpaceId>,
    ) -> SnipspaceResult<Vec<Snippet>> {
        let conn = self.conn().await?;
        let sql = format!(
            "SELECT {} FROM snippets WHERE owner_id = $1 AND ($2::uuid IS NULL OR space_id = $2)",
            SNIPPET_COLUMNS
        );
        let rows = conn
            .query(sql.as_str(), &[&owner.as_str(), &uuid_of(space_id)])
            .await
            .map_err(backend)?;
        rows.iter().map(snippet_from_row).collect()
    }

    // ========================================================================
    // NOTE OPERATIONS
    // ========================================================================

    async fn note_insert(&self, note: &Note) -> SnipspaceResult<()> {
        self.text_insert(NOTES, note.into()).await
    }

    async fn note_get(&self, id: NoteId) -> SnipspaceResult<Option<Note>> {
        Ok(self.text_get(NOTES, id.as_uuid()).await?.map(Note::from))
    }

    async fn note_update(&self, id: NoteId, update: NoteUpdate) -> SnipspaceResult<Note> {
        self.text_update(NOTES, id.as_uuid(), |note: &mut Note| {
            update.apply_to_note(note, Utc::now())
        })
        .await
    }

    async fn note_delete(&self, id: NoteId) -> SnipspaceResult<()> {
        self.delete_by_id(NOTES.table, NOTES.id_column, NOTES.entity, id.as_uuid())
            .await
    }

    async fn note_list_by_owner(
        &self,
        owner: &OwnerId,
        space_id: Option<SpaceId>,
    ) -> SnipspaceResult<Vec<Note>> {
        let rows = self.text_list(NOTES, owner, space_id).await?;
        Ok(rows.into_iter().map(Note::from).collect())
    }

    // ========================================================================
    // PROMPT OPERATIONS
    // ========================================================================

    async fn prompt_insert(&self, prompt: &Prompt) -> SnipspaceResult<()> {
        self.text_insert(PROMPTS, prompt.into()).await
    }

    async fn prompt_get(&self, id: PromptId) -> SnipspaceResult<Option<Prompt>> {
        Ok(self.text_get(PROMPTS, id.as_uuid()).await?.map(Prompt::from))
    }

    async fn prompt_update(&self, id: PromptId, update: NoteUpdate) -> SnipspaceResult<Prompt> {
        self.text_update(PROMPTS, id.as_uuid(), |prompt: &mut Prompt| {
            update.apply_to_prompt(prompt, Utc::now())
        })
        .await
    }

    async fn prompt_delete(&self, id: PromptId) -> SnipspaceResult<()> {
        self.delete_by_id(PROMPTS.table, PROMPTS.id_column, PROMPTS.entity, id.as_uuid())
            .await
    }

    async fn prompt_list_by_owner(
        &self,
        owner: &OwnerId,
        space_id: Option<SpaceId>,
    ) -> SnipspaceResult<Vec<Prompt>> {
        let rows = self.text_list(PROMPTS, owner, space_id).await?;
        Ok(rows.into_iter().map(Prompt::from).collect())
    }

    // ========================================================================
    // SPACE MEMBERSHIP
    // ========================================================================

    async fn space_content_counts(&self, space_id: SpaceId) -> SnipspaceResult<ContentCounts> {
        let conn = self.conn().await?;
        let row = conn
            .query_one(
                "SELECT \
                    (SELECT COUNT(*) FROM snippets WHERE space_id = $1) AS snippets, \
                    (SELECT COUNT(*) FROM notes WHERE space_id = $1) AS notes, \
                    (SELECT COUNT(*) FROM prompts WHERE space_id = $1) AS prompts",
                &[&space_id.as_uuid()],
            )
            .await
            .map_err(backend)?;

        let count = |column: &str| -> SnipspaceResult<u64> {
            let value: i64 = row.try_get(column).map_err(backend)?;
            Ok(value.max(0) as u64)
        };

        Ok(ContentCounts {
            snippets: count("snippets")?,
            notes: count("notes")?,
            prompts: count("prompts")?,
        })
    }

    async fn assign_orphans(
        &self,
        owner: &OwnerId,
        space_id: SpaceId,
    ) -> SnipspaceResult<ContentCounts> {
        let now = Utc::now();
        self.reassign_space(
            "space_id = $2, updated_at = $3 WHERE owner_id = $1 AND space_id IS NULL",
            &[&owner.as_str(), &space_id.as_uuid(), &now],
        )
        .await
    }

    async fn ping(&self) -> SnipspaceResult<()> {
        let conn = self.conn().await?;
        conn.query_one("SELECT 1", &[]).await.map_err(backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_default() {
        let config = DbConfig::default();
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "snipspace");
        assert_eq!(config.max_size, 16);
    }

    #[test]
    fn test_pool_errors_are_classified() {
        let timeout = pool_error(PoolError::Timeout(deadpool_postgres::TimeoutType::Wait));
        assert_eq!(timeout, SnipspaceError::Storage(StorageError::PoolExhausted));

        let closed = pool_error(PoolError::Closed);
        assert!(matches!(
            closed,
            SnipspaceError::Storage(StorageError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_text_table_columns_start_with_id() {
        assert!(NOTES.columns().starts_with("note_id, owner_id"));
        assert!(PROMPTS.columns().starts_with("prompt_id, owner_id"));
    }

    #[test]
    fn test_schema_declares_owner_indexes() {
        for index in [
            "snippets_owner_space_idx",
            "snippets_owner_language_idx",
            "notes_owner_project_idx",
            "prompts_owner_idx",
        ] {
            assert!(SCHEMA.contains(index), "missing {}", index);
        }
    }
}
