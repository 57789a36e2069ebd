//! Versioned schema migrations, tracked in a `_migrations` table.

use rusqlite::Connection;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// Applied in order, each at most once.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_companies_table",
        sql: include_str!("sql/001_create_companies.sql"),
    },
    Migration {
        version: 2,
        description: "create_jobs_table",
        sql: include_str!("sql/002_create_jobs.sql"),
    },
];

pub(crate) fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |row| row.get(0),
    )?;

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        tracing::info!(
            version = migration.version,
            description = migration.description,
            "applying migration"
        );
        conn.execute_batch(migration.sql)?;
        conn.execute(
            "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
            rusqlite::params![migration.version, migration.description],
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(conn: &Connection) -> u32 {
        conn.query_row("SELECT COUNT(*) FROM _migrations", [], |row| row.get(0))
            .expect("count migrations")
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().expect("open");
        run_all(&conn).expect("first run");
        run_all(&conn).expect("second run");
        assert_eq!(applied(&conn), MIGRATIONS.len() as u32);
    }

    #[test]
    fn job_slugs_are_unique_per_company() {
        let conn = Connection::open_in_memory().expect("open");
        run_all(&conn).expect("migrate");
        conn.execute_batch(
            "INSERT INTO companies (id, slug, name, theme, created_at) VALUES ('c1', 'a', 'A', '{}', 'now');
             INSERT INTO companies (id, slug, name, theme, created_at) VALUES ('c2', 'b', 'B', '{}', 'now');
             INSERT INTO jobs (id, company_id, title, location, job_type, department, job_slug, created_at)
                 VALUES ('j1', 'c1', 't', 'l', 'full-time', 'd', 'swe-1', 'now');
             INSERT INTO jobs (id, company_id, title, location, job_type, department, job_slug, created_at)
                 VALUES ('j2', 'c2', 't', 'l', 'full-time', 'd', 'swe-1', 'now');",
        )
        .expect("same slug under different companies");

        let duplicate = conn.execute(
            "INSERT INTO jobs (id, company_id, title, location, job_type, department, job_slug, created_at)
                 VALUES ('j3', 'c1', 't', 'l', 'full-time', 'd', 'swe-1', 'now')",
            [],
        );
        assert!(duplicate.is_err());
    }
}
