//! Storage layer for the security roadmap.
//!
//! This module provides `SQLite`-based persistence so that roadmap changes
//! made by separate CLI invocations accumulate.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::roadmap::{Initiative, Milestone, Roadmap};

/// Persistent roadmap store.
#[derive(Debug)]
pub struct RoadmapStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl RoadmapStore {
    /// Open or create a roadmap database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening roadmap database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        info!("Roadmap database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the store holds no initiatives.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_empty(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM initiatives", [], |row| row.get(0))?;
        Ok(count == 0)
    }

    /// Replace the stored roadmap with `roadmap` in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn save(&mut self, roadmap: &Roadmap) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM milestones", [])?;
        tx.execute("DELETE FROM initiatives", [])?;

        {
            let mut insert = tx.prepare(
                r"
                INSERT INTO initiatives
                    (id, name, description, priority, status, target_quarter,
                     dependencies, created, completed_date)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ",
            )?;
            for initiative in roadmap.initiatives() {
                insert.execute(params![
                    initiative.id,
                    initiative.name,
                    initiative.description,
                    initiative.priority.to_string(),
                    initiative.status.to_string(),
                    initiative.target_quarter,
                    serde_json::to_string(&initiative.dependencies)?,
                    initiative.created.to_rfc3339(),
                    initiative.completed_date.map(|d| d.to_rfc3339()),
                ])?;
            }

            let mut insert = tx.prepare(
                r"
                INSERT INTO milestones (id, initiative_id, milestone, due_date, completed)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )?;
            for milestone in roadmap.milestones() {
                insert.execute(params![
                    milestone.id,
                    milestone.initiative_id,
                    milestone.milestone,
                    milestone.due_date,
                    milestone.completed,
                ])?;
            }
        }

        tx.commit()?;
        debug!(
            initiatives = roadmap.initiatives().len(),
            milestones = roadmap.milestones().len(),
            "Roadmap saved"
        );
        Ok(())
    }

    /// Load the stored roadmap in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or a stored value is corrupt.
    pub fn load(&self) -> Result<Roadmap> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, name, description, priority, status, target_quarter,
                   dependencies, created, completed_date
            FROM initiatives ORDER BY seq
            ",
        )?;
        let rows = stmt
            .query_map([], StoredInitiative::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let initiatives = rows
            .into_iter()
            .map(StoredInitiative::into_initiative)
            .collect::<Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare(
            r"
            SELECT id, initiative_id, milestone, due_date, completed
            FROM milestones ORDER BY seq
            ",
        )?;
        let milestones = stmt
            .query_map([], |row| {
                Ok(Milestone {
                    id: row.get(0)?,
                    initiative_id: row.get(1)?,
                    milestone: row.get(2)?,
                    due_date: row.get(3)?,
                    completed: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Roadmap::from_parts(initiatives, milestones))
    }
}

/// Raw initiative columns before parsing.
struct StoredInitiative {
    id: String,
    name: String,
    description: String,
    priority: String,
    status: String,
    target_quarter: Option<String>,
    dependencies: String,
    created: String,
    completed_date: Option<String>,
}

impl StoredInitiative {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            priority: row.get(3)?,
            status: row.get(4)?,
            target_quarter: row.get(5)?,
            dependencies: row.get(6)?,
            created: row.get(7)?,
            completed_date: row.get(8)?,
        })
    }

    fn into_initiative(self) -> Result<Initiative> {
        Ok(Initiative {
            priority: self.priority.parse()?,
            status: self.status.parse()?,
            dependencies: serde_json::from_str(&self.dependencies)?,
            created: parse_timestamp(&self.created)?,
            completed_date: self
                .completed_date
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            id: self.id,
            name: self.name,
            description: self.description,
            target_quarter: self.target_quarter,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::internal(format!("corrupt timestamp '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roadmap::{NewInitiative, Priority, Status};

    #[test]
    fn test_open_in_memory_is_empty() {
        let store = RoadmapStore::open_in_memory().unwrap();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.path(), Path::new(":memory:"));
        assert!(store.load().unwrap().initiatives().is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut store = RoadmapStore::open_in_memory().unwrap();

        let mut roadmap = Roadmap::default_roadmap();
        roadmap
            .add_initiative(
                NewInitiative::new("Secrets vault", "Move secrets to a vault")
                    .priority(Priority::Critical)
                    .depends_on("I-001"),
            )
            .unwrap();
        roadmap.update_status("I-001", Status::Completed);
        roadmap
            .add_milestone("I-002", "Template adopted", Some("Q1".to_string()))
            .unwrap();
        roadmap.complete_milestone("M-001");

        store.save(&roadmap).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, roadmap);
        assert!(!store.is_empty().unwrap());
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let mut store = RoadmapStore::open_in_memory().unwrap();
        store.save(&Roadmap::default_roadmap()).unwrap();

        let mut smaller = Roadmap::new();
        smaller
            .add_initiative(NewInitiative::new("Only", "one"))
            .unwrap();
        store.save(&smaller).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.initiatives().len(), 1);
        assert_eq!(loaded.initiatives()[0].name, "Only");
    }

    #[test]
    fn test_ids_continue_after_reload() {
        let mut store = RoadmapStore::open_in_memory().unwrap();
        store.save(&Roadmap::default_roadmap()).unwrap();

        let mut loaded = store.load().unwrap();
        let id = loaded
            .add_initiative(NewInitiative::new("Next", "after reload"))
            .unwrap();
        assert_eq!(id, "I-006");
    }

    #[test]
    fn test_open_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/roadmap.db");

        {
            let mut store = RoadmapStore::open(&path).unwrap();
            store.save(&Roadmap::default_roadmap()).unwrap();
        }

        let store = RoadmapStore::open(&path).unwrap();
        assert_eq!(store.load().unwrap().initiatives().len(), 5);
    }

    #[test]
    fn test_corrupt_status_is_reported() {
        let mut store = RoadmapStore::open_in_memory().unwrap();
        store.save(&Roadmap::default_roadmap()).unwrap();
        store
            .conn
            .execute("UPDATE initiatives SET status = 'Unknown' WHERE id = 'I-001'", [])
            .unwrap();

        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("status"));
    }
}
