use anyhow::{bail, Context, Result};
use rusqlite::Connection;

/// Value written to `col.ver`. Anki upgrades anything from 11 on import.
pub const SCHEMA_VERSION: i64 = 11;

/// Create the collection tables in an empty database.
///
/// Everything runs in one transaction; a database that already has tables is
/// refused rather than patched.
pub fn initialize_schema(conn: &mut Connection) -> Result<()> {
    let existing: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
            [],
            |row| row.get(0),
        )
        .context("failed to inspect collection image")?;

    if existing > 0 {
        bail!("collection image already has {existing} tables");
    }

    let tx = conn
        .transaction()
        .context("failed to open schema transaction")?;
    tx.execute_batch(include_str!("schemas/collection_v11.sql"))
        .context("failed to execute collection_v11.sql")?;
    tx.commit().context("failed to commit collection schema")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_tables_once() {
        let mut conn = Connection::open_in_memory().expect("open");
        initialize_schema(&mut conn).expect("first init");

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .expect("prepare")
            .query_map([], |row| row.get(0))
            .expect("query")
            .collect::<Result<_, _>>()
            .expect("rows");
        assert_eq!(tables, ["cards", "col", "graves", "notes", "revlog"]);

        assert!(initialize_schema(&mut conn).is_err());
    }
}
