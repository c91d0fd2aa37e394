use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use limelight_core::{ContentType, GenerationPrompt, Persona, PersonaId};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use tracing::info;
use uuid::Uuid;

use crate::db::init_db;
use crate::error::{Result, StoreError};
use crate::types::{NewPersona, NewPost, Post, PostStatus, ScheduleEntry, Sponsor};

/// Shared handle over the record store.
///
/// Wraps its SQLite connection in a Mutex so planning tasks and fire
/// callbacks can mutate state without conflicting; clones share the same
/// connection.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open a store over `conn`, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // --- personas ----------------------------------------------------------

    pub fn create_persona(&self, new: NewPersona) -> Result<Persona> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let id = PersonaId::new();
        let goals = serde_json::to_string(&new.goals)?;
        let audience = new
            .audience
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let frequency = new
            .posting_frequency
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            "INSERT INTO personas
             (id, name, background, goals, tone, life_story, audience,
              growth_intensity, posting_frequency, active, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,1,?10,?10)",
            rusqlite::params![
                id.as_str(),
                new.name,
                new.background,
                goals,
                new.tone,
                new.life_story,
                audience,
                new.growth_intensity,
                frequency,
                now,
            ],
        )?;
        info!(persona_id = %id, name = %new.name, "persona created");

        Ok(Persona {
            id,
            name: new.name,
            background: new.background,
            goals: new.goals,
            tone: new.tone,
            life_story: new.life_story,
            audience: new.audience,
            growth_intensity: new.growth_intensity,
            posting_frequency: new.posting_frequency,
            active: true,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub fn persona(&self, id: &PersonaId) -> Result<Option<Persona>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, background, goals, tone, life_story, audience,
                    growth_intensity, posting_frequency, active, created_at, updated_at
             FROM personas WHERE id = ?1",
        )?;
        let persona = stmt
            .query_row([id.as_str()], persona_from_row)
            .map(Some)
            .or_else(not_found_to_none)?;
        Ok(persona)
    }

    /// Persist every mutable field of an existing persona.
    pub fn update_persona(&self, persona: &Persona) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let goals = serde_json::to_string(&persona.goals)?;
        let audience = persona
            .audience
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let frequency = persona
            .posting_frequency
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let n = conn.execute(
            "UPDATE personas SET name=?1, background=?2, goals=?3, tone=?4,
               life_story=?5, audience=?6, growth_intensity=?7,
               posting_frequency=?8, active=?9, updated_at=?10
             WHERE id=?11",
            rusqlite::params![
                persona.name,
                persona.background,
                goals,
                persona.tone,
                persona.life_story,
                audience,
                persona.growth_intensity,
                frequency,
                persona.active,
                now,
                persona.id.as_str(),
            ],
        )?;
        if n == 0 {
            return Err(StoreError::NotFound {
                kind: "persona",
                id: persona.id.to_string(),
            });
        }
        Ok(())
    }

    pub fn list_personas(&self) -> Result<Vec<Persona>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, background, goals, tone, life_story, audience,
                    growth_intensity, posting_frequency, active, created_at, updated_at
             FROM personas ORDER BY created_at",
        )?;
        let personas = stmt
            .query_map([], persona_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(personas)
    }

    // --- sponsors ----------------------------------------------------------

    pub fn create_sponsor(
        &self,
        company_name: &str,
        product_name: Option<&str>,
        product_blurb: Option<&str>,
        targeting_tags: &[String],
    ) -> Result<Sponsor> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let id = Uuid::new_v4().to_string();
        let tags = serde_json::to_string(targeting_tags)?;

        conn.execute(
            "INSERT INTO sponsors
             (id, company_name, product_name, product_blurb, targeting_tags,
              active, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,1,?6,?6)",
            rusqlite::params![id, company_name, product_name, product_blurb, tags, now],
        )?;
        info!(sponsor_id = %id, company = %company_name, "sponsor created");

        Ok(Sponsor {
            id,
            company_name: company_name.to_string(),
            product_name: product_name.map(String::from),
            product_blurb: product_blurb.map(String::from),
            targeting_tags: targeting_tags.to_vec(),
            active: true,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub fn sponsor(&self, id: &str) -> Result<Option<Sponsor>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, company_name, product_name, product_blurb, targeting_tags,
                    active, created_at, updated_at
             FROM sponsors WHERE id = ?1",
        )?;
        let sponsor = stmt
            .query_row([id], sponsor_from_row)
            .map(Some)
            .or_else(not_found_to_none)?;
        Ok(sponsor)
    }

    pub fn list_sponsors(&self) -> Result<Vec<Sponsor>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, company_name, product_name, product_blurb, targeting_tags,
                    active, created_at, updated_at
             FROM sponsors ORDER BY created_at",
        )?;
        let sponsors = stmt
            .query_map([], sponsor_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(sponsors)
    }

    // --- posts + schedule entries ------------------------------------------

    /// Create a post and its schedule entry in one transaction.
    ///
    /// The pair is committed together or not at all — a post without its
    /// entry (or the reverse) is never readable.
    pub fn create_post_with_entry(
        &self,
        new: NewPost,
        run_at: DateTime<Utc>,
    ) -> Result<(Post, ScheduleEntry)> {
        let mut conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let post_id = Uuid::new_v4().to_string();
        let entry_id = Uuid::new_v4().to_string();
        let prompt = new
            .generation_prompt
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let hashtags = serde_json::to_string(&new.hashtags)?;

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO posts
             (id, persona_id, sponsor_id, content_type, scheduled_time,
              generation_prompt, caption, hashtags, status, external_media_id,
              created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,'pending',NULL,?9,?9)",
            rusqlite::params![
                post_id,
                new.persona_id.as_str(),
                new.sponsor_id,
                new.content_type.to_string(),
                new.scheduled_time.to_rfc3339(),
                prompt,
                new.caption,
                hashtags,
                now,
            ],
        )?;
        tx.execute(
            "INSERT INTO schedule_entries
             (id, post_id, run_at, active, job_handle, created_at, updated_at)
             VALUES (?1,?2,?3,1,NULL,?4,?4)",
            rusqlite::params![entry_id, post_id, run_at.to_rfc3339(), now],
        )?;
        tx.commit()?;

        info!(post_id = %post_id, entry_id = %entry_id, run_at = %run_at, "post scheduled");

        Ok((
            Post {
                id: post_id.clone(),
                persona_id: new.persona_id,
                sponsor_id: new.sponsor_id,
                content_type: new.content_type,
                scheduled_time: new.scheduled_time,
                generation_prompt: new.generation_prompt,
                caption: new.caption,
                hashtags: new.hashtags,
                status: PostStatus::Pending,
                external_media_id: None,
                created_at: now.clone(),
                updated_at: now.clone(),
            },
            ScheduleEntry {
                id: entry_id,
                post_id,
                run_at,
                active: true,
                job_handle: None,
                created_at: now.clone(),
                updated_at: now,
            },
        ))
    }

    pub fn post(&self, id: &str) -> Result<Option<Post>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, persona_id, sponsor_id, content_type, scheduled_time,
                    generation_prompt, caption, hashtags, status,
                    external_media_id, created_at, updated_at
             FROM posts WHERE id = ?1",
        )?;
        let post = stmt
            .query_row([id], post_from_row)
            .map(Some)
            .or_else(not_found_to_none)?;
        Ok(post)
    }

    pub fn entry(&self, id: &str) -> Result<Option<ScheduleEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, post_id, run_at, active, job_handle, created_at, updated_at
             FROM schedule_entries WHERE id = ?1",
        )?;
        let entry = stmt
            .query_row([id], entry_from_row)
            .map(Some)
            .or_else(not_found_to_none)?;
        Ok(entry)
    }

    /// Record the timer handle the scheduler returned for an entry.
    pub fn set_entry_job_handle(&self, entry_id: &str, handle: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let n = conn.execute(
            "UPDATE schedule_entries SET job_handle=?1, updated_at=?2 WHERE id=?3",
            rusqlite::params![handle, now, entry_id],
        )?;
        if n == 0 {
            return Err(StoreError::NotFound {
                kind: "schedule entry",
                id: entry_id.to_string(),
            });
        }
        Ok(())
    }

    /// Deactivate an entry so it never fires. Returns whether the entry was
    /// still active — deactivating twice is a no-op, not an error.
    pub fn deactivate_entry(&self, entry_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let n = conn.execute(
            "UPDATE schedule_entries SET active=0, updated_at=?1
             WHERE id=?2 AND active=1",
            rusqlite::params![now, entry_id],
        )?;
        Ok(n > 0)
    }

    /// Guarded status transition: applies only when the post is currently in
    /// `from`. Returns whether the update took effect.
    ///
    /// This compare-and-set is the idempotency guard behind at-most-once
    /// firing — a duplicate fire observes the moved status and backs off.
    pub fn transition_post(&self, post_id: &str, from: PostStatus, to: PostStatus) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let n = conn.execute(
            "UPDATE posts SET status=?1, updated_at=?2 WHERE id=?3 AND status=?4",
            rusqlite::params![to.to_string(), now, post_id, from.to_string()],
        )?;
        Ok(n > 0)
    }

    /// Mark a processing post as posted and record the platform media id.
    pub fn record_publish(&self, post_id: &str, media_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        let n = conn.execute(
            "UPDATE posts SET status='posted', external_media_id=?1, updated_at=?2
             WHERE id=?3 AND status='processing'",
            rusqlite::params![media_id, now, post_id],
        )?;
        Ok(n > 0)
    }

    /// Active entries whose post is still pending, ordered by fire time.
    /// This is the set a restarted scheduler re-registers.
    pub fn pending_entries(&self) -> Result<Vec<ScheduleEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT e.id, e.post_id, e.run_at, e.active, e.job_handle,
                    e.created_at, e.updated_at
             FROM schedule_entries e
             JOIN posts p ON p.id = e.post_id
             WHERE e.active = 1 AND p.status = 'pending'
             ORDER BY e.run_at",
        )?;
        let entries = stmt
            .query_map([], entry_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(entries)
    }

    /// Joined Post + ScheduleEntry view for a persona, ordered by fire time.
    /// With `include_past` false, entries whose run_at has elapsed are
    /// filtered out.
    pub fn posts_for_persona(
        &self,
        persona_id: &PersonaId,
        include_past: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<(Post, ScheduleEntry)>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT p.id, p.persona_id, p.sponsor_id, p.content_type, p.scheduled_time,
                    p.generation_prompt, p.caption, p.hashtags, p.status,
                    p.external_media_id, p.created_at, p.updated_at,
                    e.id, e.post_id, e.run_at, e.active, e.job_handle,
                    e.created_at, e.updated_at
             FROM posts p
             JOIN schedule_entries e ON e.post_id = p.id
             WHERE p.persona_id = ?1 AND (?2 OR e.run_at >= ?3)
             ORDER BY e.run_at",
        )?;
        let rows = stmt
            .query_map(
                rusqlite::params![persona_id.as_str(), include_past, now.to_rfc3339()],
                |row| {
                    let post = post_from_row(row)?;
                    let entry = entry_from_offset(row, 12)?;
                    Ok((post, entry))
                },
            )?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }
}

// --- row mapping -----------------------------------------------------------

fn not_found_to_none<T>(e: rusqlite::Error) -> Result<Option<T>> {
    match e {
        rusqlite::Error::QueryReturnedNoRows => Ok(None),
        other => Err(other.into()),
    }
}

fn conversion_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn parse_ts(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e))
}

fn persona_from_row(row: &Row<'_>) -> rusqlite::Result<Persona> {
    let goals_json: String = row.get(3)?;
    let audience_json: Option<String> = row.get(6)?;
    let frequency_json: Option<String> = row.get(8)?;
    Ok(Persona {
        id: PersonaId::from(row.get::<_, String>(0)?),
        name: row.get(1)?,
        background: row.get(2)?,
        goals: serde_json::from_str(&goals_json).map_err(|e| conversion_err(3, e))?,
        tone: row.get(4)?,
        life_story: row.get(5)?,
        audience: audience_json
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| conversion_err(6, e))?,
        growth_intensity: row.get(7)?,
        posting_frequency: frequency_json
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| conversion_err(8, e))?,
        active: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn sponsor_from_row(row: &Row<'_>) -> rusqlite::Result<Sponsor> {
    let tags_json: String = row.get(4)?;
    Ok(Sponsor {
        id: row.get(0)?,
        company_name: row.get(1)?,
        product_name: row.get(2)?,
        product_blurb: row.get(3)?,
        targeting_tags: serde_json::from_str(&tags_json).map_err(|e| conversion_err(4, e))?,
        active: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    let content_type: String = row.get(3)?;
    let scheduled: String = row.get(4)?;
    let prompt_json: Option<String> = row.get(5)?;
    let hashtags_json: Option<String> = row.get(7)?;
    let status: String = row.get(8)?;
    Ok(Post {
        id: row.get(0)?,
        persona_id: PersonaId::from(row.get::<_, String>(1)?),
        sponsor_id: row.get(2)?,
        content_type: content_type
            .parse::<ContentType>()
            .map_err(|e| conversion_err(3, std::io::Error::other(e)))?,
        scheduled_time: parse_ts(4, &scheduled)?,
        generation_prompt: prompt_json
            .map(|s| serde_json::from_str::<GenerationPrompt>(&s))
            .transpose()
            .map_err(|e| conversion_err(5, e))?,
        caption: row.get(6)?,
        hashtags: hashtags_json
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| conversion_err(7, e))?
            .unwrap_or_default(),
        status: status
            .parse::<PostStatus>()
            .map_err(|e| conversion_err(8, std::io::Error::other(e)))?,
        external_media_id: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<ScheduleEntry> {
    entry_from_offset(row, 0)
}

fn entry_from_offset(row: &Row<'_>, base: usize) -> rusqlite::Result<ScheduleEntry> {
    let run_at: String = row.get(base + 2)?;
    Ok(ScheduleEntry {
        id: row.get(base)?,
        post_id: row.get(base + 1)?,
        run_at: parse_ts(base + 2, &run_at)?,
        active: row.get(base + 3)?,
        job_handle: row.get(base + 4)?,
        created_at: row.get(base + 5)?,
        updated_at: row.get(base + 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn open_store() -> Store {
        Store::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn seed_persona(store: &Store) -> Persona {
        store
            .create_persona(NewPersona {
                name: "Emma".into(),
                background: "wellness advocate".into(),
                goals: vec!["inspire balance".into()],
                tone: "casual".into(),
                growth_intensity: 0.5,
                ..Default::default()
            })
            .unwrap()
    }

    fn new_post(persona: &Persona, at: DateTime<Utc>) -> NewPost {
        NewPost {
            persona_id: persona.id.clone(),
            sponsor_id: None,
            content_type: ContentType::Story,
            scheduled_time: at,
            generation_prompt: Some(GenerationPrompt::Scene {
                description: "morning run".into(),
                intention: "I want to start the day moving".into(),
            }),
            caption: Some("up early".into()),
            hashtags: vec!["lifestyle".into()],
        }
    }

    #[test]
    fn post_and_entry_created_together() {
        let store = open_store();
        let persona = seed_persona(&store);
        let at = Utc::now() + Duration::hours(2);

        let (post, entry) = store.create_post_with_entry(new_post(&persona, at), at).unwrap();
        assert_eq!(entry.post_id, post.id);
        assert_eq!(entry.run_at, post.scheduled_time);
        assert!(entry.active);

        let read_post = store.post(&post.id).unwrap().unwrap();
        let read_entry = store.entry(&entry.id).unwrap().unwrap();
        assert_eq!(read_post.status, PostStatus::Pending);
        assert_eq!(read_entry.post_id, post.id);
        assert_eq!(
            read_post.generation_prompt,
            Some(GenerationPrompt::Scene {
                description: "morning run".into(),
                intention: "I want to start the day moving".into(),
            })
        );
    }

    #[test]
    fn transition_is_compare_and_set() {
        let store = open_store();
        let persona = seed_persona(&store);
        let at = Utc::now() + Duration::hours(1);
        let (post, _) = store.create_post_with_entry(new_post(&persona, at), at).unwrap();

        assert!(store
            .transition_post(&post.id, PostStatus::Pending, PostStatus::Processing)
            .unwrap());
        // second claim loses the race
        assert!(!store
            .transition_post(&post.id, PostStatus::Pending, PostStatus::Processing)
            .unwrap());

        assert!(store.record_publish(&post.id, "media-1").unwrap());
        let read = store.post(&post.id).unwrap().unwrap();
        assert_eq!(read.status, PostStatus::Posted);
        assert_eq!(read.external_media_id.as_deref(), Some("media-1"));

        // terminal: no further transition applies
        assert!(!store
            .transition_post(&post.id, PostStatus::Processing, PostStatus::Failed)
            .unwrap());
    }

    #[test]
    fn deactivate_entry_is_idempotent() {
        let store = open_store();
        let persona = seed_persona(&store);
        let at = Utc::now() + Duration::hours(1);
        let (_, entry) = store.create_post_with_entry(new_post(&persona, at), at).unwrap();

        assert!(store.deactivate_entry(&entry.id).unwrap());
        assert!(!store.deactivate_entry(&entry.id).unwrap());
        assert!(!store.entry(&entry.id).unwrap().unwrap().active);
    }

    #[test]
    fn posts_for_persona_filters_elapsed_entries() {
        let store = open_store();
        let persona = seed_persona(&store);
        let now = Utc::now();
        let past = now - Duration::hours(3);
        let future = now + Duration::hours(3);
        store.create_post_with_entry(new_post(&persona, past), past).unwrap();
        store.create_post_with_entry(new_post(&persona, future), future).unwrap();

        let upcoming = store.posts_for_persona(&persona.id, false, now).unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].1.run_at, future);

        let all = store.posts_for_persona(&persona.id, true, now).unwrap();
        assert_eq!(all.len(), 2);
        // ordered by run_at ascending
        assert!(all[0].1.run_at < all[1].1.run_at);
    }

    #[test]
    fn pending_entries_excludes_inactive_and_completed() {
        let store = open_store();
        let persona = seed_persona(&store);
        let now = Utc::now();

        let (_, keep) = store
            .create_post_with_entry(new_post(&persona, now + Duration::hours(1)), now + Duration::hours(1))
            .unwrap();
        let (_, cancelled) = store
            .create_post_with_entry(new_post(&persona, now + Duration::hours(2)), now + Duration::hours(2))
            .unwrap();
        store.deactivate_entry(&cancelled.id).unwrap();
        let (posted, _) = store
            .create_post_with_entry(new_post(&persona, now + Duration::hours(3)), now + Duration::hours(3))
            .unwrap();
        store
            .transition_post(&posted.id, PostStatus::Pending, PostStatus::Processing)
            .unwrap();
        store.record_publish(&posted.id, "media-1").unwrap();

        let pending = store.pending_entries().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, keep.id);
    }

    #[test]
    fn missing_rows_read_as_none() {
        let store = open_store();
        assert!(store.post("nope").unwrap().is_none());
        assert!(store.entry("nope").unwrap().is_none());
        assert!(store.persona(&PersonaId::from("nope")).unwrap().is_none());
    }
}
