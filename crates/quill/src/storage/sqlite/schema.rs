//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O. Flat items store an empty string in `sk`.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    collection TEXT NOT NULL,
    pk TEXT NOT NULL,
    sk TEXT NOT NULL DEFAULT '',
    body TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (collection, pk, sk)
);
"#;

pub const SELECT_ITEM: &str = r#"
SELECT body
FROM items
WHERE collection = ?1 AND pk = ?2 AND sk = ?3
"#;

pub const INSERT_ITEM: &str = r#"
INSERT INTO items (collection, pk, sk, body, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub const UPSERT_ITEM: &str = r#"
INSERT INTO items (collection, pk, sk, body, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (collection, pk, sk) DO UPDATE SET
    body = excluded.body,
    updated_at = excluded.updated_at
"#;

pub const UPDATE_ITEM_BODY: &str = r#"
UPDATE items
SET body = ?4, updated_at = ?5
WHERE collection = ?1 AND pk = ?2 AND sk = ?3
"#;

pub const DELETE_ITEM: &str = r#"
DELETE FROM items
WHERE collection = ?1 AND pk = ?2 AND sk = ?3
"#;

/// Rows after the cursor `(?2, ?3)`, optionally restricted to partitions
/// starting with `?4`.
pub const SCAN_ITEMS: &str = r#"
SELECT pk, sk, body
FROM items
WHERE collection = ?1
  AND (?2 IS NULL OR pk > ?2 OR (pk = ?2 AND sk > ?3))
  AND (?4 IS NULL OR substr(pk, 1, length(?4)) = ?4)
ORDER BY pk, sk
LIMIT ?5
"#;

/// Rows of partition `?2` after sort key `?3`, with an optional exact sort
/// key `?4` or sort prefix `?5`.
pub const QUERY_ITEMS: &str = r#"
SELECT pk, sk, body
FROM items
WHERE collection = ?1
  AND pk = ?2
  AND (?3 IS NULL OR sk > ?3)
  AND (?4 IS NULL OR sk = ?4)
  AND (?5 IS NULL OR substr(sk, 1, length(?5)) = ?5)
ORDER BY sk
LIMIT ?6
"#;
