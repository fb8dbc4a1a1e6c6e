//! Schema initialization for the `coins` table.
//!
//! Every start inspects the live table, classifies it into one of the
//! historical [`SchemaShape`]s and builds an explicit [`MigrationPlan`] for
//! it. The plan runs inside a single transaction, so a failing step leaves
//! the schema exactly as it was. Running the plan on an up-to-date schema
//! only re-applies the quantity normalization, which is a no-op.
//!
//! Schema history:
//! - v0: `coins` without any quantity column;
//! - v1: quantity kept as a 0/1 flag in `exists_flag`;
//! - v2: quantity counter `exists_count` (>= 1) and the identity constraint.

use std::fmt;

use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const COINS_TABLE: &str = "coins";
pub const SCHEMA_VERSION: i64 = 2;

const COUNTER_COLUMN: &str = "exists_count";
const LEGACY_FLAG_COLUMN: &str = "exists_flag";
const IDENTITY_COLUMNS: [&str; 3] = ["country", "denomination", "year"];

/// First SQLite release with `ALTER TABLE ... RENAME COLUMN`.
const RENAME_COLUMN_SINCE: (u32, u32, u32) = (3, 25, 0);

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS coins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    country TEXT NOT NULL,
    denomination TEXT NOT NULL,
    year INTEGER NOT NULL,
    exists_count INTEGER NOT NULL DEFAULT 0,
    UNIQUE(country, denomination, year)
)
"#;
const RENAME_FLAG_SQL: &str = "ALTER TABLE coins RENAME COLUMN exists_flag TO exists_count";
const ADD_COUNTER_SQL: &str =
    "ALTER TABLE coins ADD COLUMN exists_count INTEGER NOT NULL DEFAULT 0";
// Without RENAME COLUMN the table is rebuilt under the current layout and the
// flag values carried over; `ALTER TABLE ... RENAME TO` predates 3.25.
const REBUILD_CREATE_SQL: &str = r#"
CREATE TABLE coins_rebuild (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    country TEXT NOT NULL,
    denomination TEXT NOT NULL,
    year INTEGER NOT NULL,
    exists_count INTEGER NOT NULL DEFAULT 0,
    UNIQUE(country, denomination, year)
)
"#;
const REBUILD_COPY_SQL: &str = r#"
INSERT INTO coins_rebuild (id, country, denomination, year, exists_count)
SELECT id, country, denomination, year, COALESCE(exists_flag, 0) FROM coins
"#;
const REBUILD_DROP_SQL: &str = "DROP TABLE coins";
const REBUILD_RENAME_SQL: &str = "ALTER TABLE coins_rebuild RENAME TO coins";
const CREATE_IDENTITY_INDEX_SQL: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS coins_identity ON coins(country, denomination, year)";
const NORMALIZE_SQL: &str =
    "UPDATE coins SET exists_count = 1 WHERE exists_count IS NULL OR exists_count < 1";
const STAMP_VERSION_SQL: &str = "PRAGMA user_version = 2";

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to inspect the coin schema: {0}")]
    Inspect(#[source] sqlx::Error),
    #[error("migration step '{step}' failed: {source}")]
    Step {
        step: MigrationStep,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to commit the coin schema migration: {0}")]
    Commit(#[source] sqlx::Error),
}

/// Historical layouts the `coins` table can be found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaShape {
    Absent,
    Current,
    LegacyFlag,
    MissingCounter,
}

impl SchemaShape {
    pub fn classify<S: AsRef<str>>(columns: &[S]) -> Self {
        let has = |name: &str| columns.iter().any(|column| column.as_ref() == name);

        if columns.is_empty() {
            Self::Absent
        } else if has(COUNTER_COLUMN) {
            Self::Current
        } else if has(LEGACY_FLAG_COLUMN) {
            Self::LegacyFlag
        } else {
            Self::MissingCounter
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStep {
    CreateTable,
    RenameFlagColumn,
    /// Fallback for stores without `RENAME COLUMN`; drops `exists_flag`.
    RebuildTable,
    AddCounterColumn,
    CreateIdentityIndex,
    NormalizeQuantities,
    StampVersion,
}

impl MigrationStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateTable => "create-table",
            Self::RenameFlagColumn => "rename-flag-column",
            Self::RebuildTable => "rebuild-table",
            Self::AddCounterColumn => "add-counter-column",
            Self::CreateIdentityIndex => "create-identity-index",
            Self::NormalizeQuantities => "normalize-quantities",
            Self::StampVersion => "stamp-version",
        }
    }

    fn statements(&self) -> &'static [&'static str] {
        match self {
            Self::CreateTable => &[CREATE_TABLE_SQL],
            Self::RenameFlagColumn => &[RENAME_FLAG_SQL],
            Self::RebuildTable => &[
                REBUILD_CREATE_SQL,
                REBUILD_COPY_SQL,
                REBUILD_DROP_SQL,
                REBUILD_RENAME_SQL,
            ],
            Self::AddCounterColumn => &[ADD_COUNTER_SQL],
            Self::CreateIdentityIndex => &[CREATE_IDENTITY_INDEX_SQL],
            Self::NormalizeQuantities => &[NORMALIZE_SQL],
            Self::StampVersion => &[STAMP_VERSION_SQL],
        }
    }
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the live store looks like before migrating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaInspection {
    pub shape: SchemaShape,
    pub has_identity_index: bool,
    pub sqlite_version: String,
    pub user_version: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    shape: SchemaShape,
    steps: Vec<MigrationStep>,
}

impl MigrationPlan {
    pub fn for_inspection(inspection: &SchemaInspection) -> Self {
        let mut steps = Vec::new();

        match inspection.shape {
            SchemaShape::Absent => steps.push(MigrationStep::CreateTable),
            SchemaShape::Current => {}
            SchemaShape::LegacyFlag => {
                if supports_rename_column(&inspection.sqlite_version) {
                    steps.push(MigrationStep::RenameFlagColumn);
                } else {
                    steps.push(MigrationStep::RebuildTable);
                }
            }
            SchemaShape::MissingCounter => steps.push(MigrationStep::AddCounterColumn),
        }

        // A created or rebuilt table already carries the UNIQUE constraint.
        let recreated = steps
            .iter()
            .any(|step| matches!(step, MigrationStep::CreateTable | MigrationStep::RebuildTable));
        if !recreated && !inspection.has_identity_index {
            steps.push(MigrationStep::CreateIdentityIndex);
        }

        steps.push(MigrationStep::NormalizeQuantities);

        if inspection.user_version != SCHEMA_VERSION {
            steps.push(MigrationStep::StampVersion);
        }

        Self {
            shape: inspection.shape,
            steps,
        }
    }

    pub fn shape(&self) -> SchemaShape {
        self.shape
    }

    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }
}

impl fmt::Display for MigrationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "schema shape: {:?}", self.shape)?;
        for (index, step) in self.steps.iter().enumerate() {
            writeln!(f, "  {}. {}", index + 1, step)?;
        }
        Ok(())
    }
}

/// Inspects the store without changing it.
pub async fn plan(pool: &SqlitePool) -> Result<MigrationPlan, MigrationError> {
    let mut conn = pool.acquire().await.map_err(MigrationError::Inspect)?;
    let inspection = inspect(&mut conn).await?;
    Ok(MigrationPlan::for_inspection(&inspection))
}

/// Brings the `coins` table to the current schema. Returns the plan that was applied.
pub async fn run(pool: &SqlitePool) -> Result<MigrationPlan, MigrationError> {
    let mut tx = pool.begin().await.map_err(MigrationError::Inspect)?;

    let inspection = inspect(&mut tx).await?;
    let plan = MigrationPlan::for_inspection(&inspection);

    info!(
        shape = ?plan.shape(),
        sqlite_version = %inspection.sqlite_version,
        from_version = inspection.user_version,
        to_version = SCHEMA_VERSION,
        "migrating coin schema"
    );

    apply_steps(&mut tx, &plan).await?;
    tx.commit().await.map_err(MigrationError::Commit)?;
    info!(steps = plan.steps().len(), "coin schema is current");

    Ok(plan)
}

/// Applies an already built plan in one transaction, without re-inspecting.
pub async fn apply(pool: &SqlitePool, plan: &MigrationPlan) -> Result<(), MigrationError> {
    let mut tx = pool.begin().await.map_err(MigrationError::Inspect)?;
    apply_steps(&mut tx, plan).await?;
    tx.commit().await.map_err(MigrationError::Commit)
}

async fn apply_steps(
    conn: &mut SqliteConnection,
    plan: &MigrationPlan,
) -> Result<(), MigrationError> {
    for step in plan.steps() {
        if *step == MigrationStep::RebuildTable {
            warn!("store cannot rename columns, rebuilding the coins table");
        }

        for sql in step.statements() {
            let result = sqlx::query(*sql)
                .execute(&mut *conn)
                .await
                .map_err(|source| MigrationError::Step {
                    step: *step,
                    source,
                })?;
            debug!(step = %step, rows = result.rows_affected(), "migration statement applied");
        }
    }

    Ok(())
}

pub async fn inspect(conn: &mut SqliteConnection) -> Result<SchemaInspection, MigrationError> {
    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info(?1)")
        .bind(COINS_TABLE)
        .fetch_all(&mut *conn)
        .await
        .map_err(MigrationError::Inspect)?;

    let shape = SchemaShape::classify(&columns);
    let has_identity_index = if shape == SchemaShape::Absent {
        false
    } else {
        has_identity_index(conn).await?
    };

    let sqlite_version: String = sqlx::query_scalar("SELECT sqlite_version()")
        .fetch_one(&mut *conn)
        .await
        .map_err(MigrationError::Inspect)?;

    let user_version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(&mut *conn)
        .await
        .map_err(MigrationError::Inspect)?;

    Ok(SchemaInspection {
        shape,
        has_identity_index,
        sqlite_version,
        user_version,
    })
}

/// True when some unique index (including the one backing a table-level
/// `UNIQUE` constraint) covers exactly the identity columns.
async fn has_identity_index(conn: &mut SqliteConnection) -> Result<bool, MigrationError> {
    let unique_indexes: Vec<String> =
        sqlx::query_scalar(r#"SELECT name FROM pragma_index_list(?1) WHERE "unique" = 1"#)
            .bind(COINS_TABLE)
            .fetch_all(&mut *conn)
            .await
            .map_err(MigrationError::Inspect)?;

    for index in unique_indexes {
        let columns: Vec<Option<String>> =
            sqlx::query_scalar("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")
                .bind(&index)
                .fetch_all(&mut *conn)
                .await
                .map_err(MigrationError::Inspect)?;

        let mut columns: Vec<String> = columns.into_iter().flatten().collect();
        columns.sort();
        if columns == IDENTITY_COLUMNS {
            return Ok(true);
        }
    }

    Ok(false)
}

fn supports_rename_column(sqlite_version: &str) -> bool {
    parse_version(sqlite_version).is_some_and(|version| version >= RENAME_COLUMN_SINCE)
}

fn parse_version(raw: &str) -> Option<(u32, u32, u32)> {
    let mut parts = raw.trim().split('.').map(|part| part.parse::<u32>().ok());
    let major = parts.next()??;
    let minor = parts.next().flatten().unwrap_or(0);
    let patch = parts.next().flatten().unwrap_or(0);
    Some((major, minor, patch))
}
