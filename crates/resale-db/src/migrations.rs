use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE admins (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                username        TEXT NOT NULL UNIQUE,
                hashed_password TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE gadgets (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                name                TEXT NOT NULL,
                gadget_type         TEXT NOT NULL
                    CHECK (gadget_type IN ('phone', 'laptop', 'other')),
                condition           TEXT NOT NULL
                    CHECK (condition IN ('new', 'used', 'open_box')),
                description         TEXT NOT NULL,
                seller_price        REAL NOT NULL,
                listing_price       REAL,
                seller_contact_info TEXT NOT NULL,
                photo_url           TEXT NOT NULL,
                status              TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'available', 'sold', 'deleted')),
                created_at          TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX idx_gadgets_status
                ON gadgets(status, created_at);

            CREATE TABLE questions (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                listing_id   INTEGER REFERENCES gadgets(id),
                question     TEXT NOT NULL,
                contact_info TEXT NOT NULL,
                created_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE TABLE gadget_requests (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                gadget_details TEXT NOT NULL,
                contact_info   TEXT NOT NULL,
                is_resolved    INTEGER NOT NULL DEFAULT 0,
                created_at     TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            -- Singleton row, id is pinned to 1
            CREATE TABLE settings (
                id              INTEGER PRIMARY KEY CHECK (id = 1),
                whatsapp_number TEXT
            );

            INSERT INTO settings (id, whatsapp_number) VALUES (1, NULL);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
