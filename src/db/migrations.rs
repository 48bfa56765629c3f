use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS completions (
            date          TEXT NOT NULL,
            prayer        TEXT NOT NULL CHECK(prayer IN ('fajr','zuhr','asr','maghrib','isha')),
            completed_at  TEXT NOT NULL,
            PRIMARY KEY (date, prayer)
        );

        CREATE INDEX IF NOT EXISTS idx_completions_date ON completions(date);
    ",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM completions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_prayer_column_rejects_unknown_names() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO completions (date, prayer, completed_at)
             VALUES ('2025-01-01', 'witr', '')",
            [],
        );
        assert!(result.is_err());
    }
}
