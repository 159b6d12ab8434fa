//! `SQLite` table definitions for the roadmap store.
//!
//! Applied through [`super::migrations`].

/// SQL statement to create the initiatives table.
///
/// `seq` preserves creation order; `id` is the public `I-NNN` identifier.
pub const CREATE_INITIATIVES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS initiatives (
    seq INTEGER PRIMARY KEY,
    id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    priority TEXT NOT NULL,
    status TEXT NOT NULL,
    target_quarter TEXT,
    dependencies TEXT NOT NULL DEFAULT '[]',
    created TEXT NOT NULL,
    completed_date TEXT
)
";

/// SQL statement to create the milestones table.
pub const CREATE_MILESTONES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS milestones (
    seq INTEGER PRIMARY KEY,
    id TEXT NOT NULL UNIQUE,
    initiative_id TEXT NOT NULL REFERENCES initiatives(id),
    milestone TEXT NOT NULL,
    due_date TEXT,
    completed INTEGER NOT NULL DEFAULT 0
)
";

/// SQL statement to create an index on `initiative_id` for per-initiative lookups.
pub const CREATE_MILESTONE_INITIATIVE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_milestones_initiative ON milestones(initiative_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initiatives_table_contains_required_columns() {
        assert!(CREATE_INITIATIVES_TABLE.contains("id TEXT NOT NULL UNIQUE"));
        assert!(CREATE_INITIATIVES_TABLE.contains("priority TEXT NOT NULL"));
        assert!(CREATE_INITIATIVES_TABLE.contains("status TEXT NOT NULL"));
        assert!(CREATE_INITIATIVES_TABLE.contains("completed_date TEXT"));
    }

    #[test]
    fn test_milestones_reference_initiatives() {
        assert!(CREATE_MILESTONES_TABLE.contains("REFERENCES initiatives(id)"));
    }
}
