use rusqlite::Connection;

use crate::error::Result;

/// Initialise the record-store schema in `conn`.
///
/// Creates all four tables (idempotent) plus the indexes the hot queries
/// need: schedule entries by run_at for the upcoming-posts view, posts by
/// persona for per-account listings.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS personas (
            id                TEXT    NOT NULL PRIMARY KEY,
            name              TEXT    NOT NULL,
            background        TEXT    NOT NULL,
            goals             TEXT    NOT NULL,   -- JSON array of strings
            tone              TEXT    NOT NULL,
            life_story        TEXT,
            audience          TEXT,               -- JSON AudienceTargeting or NULL
            growth_intensity  REAL    NOT NULL DEFAULT 0.5,
            posting_frequency TEXT,               -- JSON PostingFrequency or NULL
            active            INTEGER NOT NULL DEFAULT 1,
            created_at        TEXT    NOT NULL,
            updated_at        TEXT    NOT NULL
        ) STRICT;

        CREATE TABLE IF NOT EXISTS sponsors (
            id             TEXT    NOT NULL PRIMARY KEY,
            company_name   TEXT    NOT NULL,
            product_name   TEXT,
            product_blurb  TEXT,
            targeting_tags TEXT    NOT NULL DEFAULT '[]',  -- JSON array
            active         INTEGER NOT NULL DEFAULT 1,
            created_at     TEXT    NOT NULL,
            updated_at     TEXT    NOT NULL
        ) STRICT;

        CREATE TABLE IF NOT EXISTS posts (
            id                TEXT    NOT NULL PRIMARY KEY,
            persona_id        TEXT    NOT NULL REFERENCES personas(id),
            sponsor_id        TEXT    REFERENCES sponsors(id),
            content_type      TEXT    NOT NULL,
            scheduled_time    TEXT    NOT NULL,   -- ISO-8601
            generation_prompt TEXT,               -- JSON GenerationPrompt or NULL
            caption           TEXT,
            hashtags          TEXT,               -- JSON array or NULL
            status            TEXT    NOT NULL DEFAULT 'pending',
            external_media_id TEXT,               -- set on successful publish
            created_at        TEXT    NOT NULL,
            updated_at        TEXT    NOT NULL
        ) STRICT;

        CREATE TABLE IF NOT EXISTS schedule_entries (
            id         TEXT    NOT NULL PRIMARY KEY,
            post_id    TEXT    NOT NULL REFERENCES posts(id),
            run_at     TEXT    NOT NULL,   -- ISO-8601
            active     INTEGER NOT NULL DEFAULT 1,
            job_handle TEXT,               -- timer registration id or NULL
            created_at TEXT    NOT NULL,
            updated_at TEXT    NOT NULL
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_posts_persona ON posts (persona_id);
        CREATE INDEX IF NOT EXISTS idx_entries_run_at ON schedule_entries (run_at);
        CREATE INDEX IF NOT EXISTS idx_entries_post ON schedule_entries (post_id);
        ",
    )?;
    Ok(())
}
