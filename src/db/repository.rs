use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{GeneratedContent, NewNewsItem, NewsItem};

use super::schema::SCHEMA;
use super::ContentStore;

const ITEM_COLUMNS: &str = "id, title, subtitle, raw_draft, hook, body, faqs, image_url, source_url, created_at";

#[derive(Clone)]
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Item operations

    pub async fn insert_item(&self, item: NewNewsItem) -> Result<i64> {
        let created_at = item.created_at.unwrap_or_else(Utc::now).to_rfc3339();
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO news_items (title, subtitle, raw_draft, image_url, source_url, created_at)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                    params![
                        item.title,
                        item.subtitle,
                        item.raw_draft,
                        item.image_url,
                        item.source_url,
                        created_at,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        Ok(id)
    }

    /// Load a JSON array of drafts, as produced by the upstream feed.
    pub async fn import_drafts(&self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read drafts from {}", path.display()))?;
        let drafts: Vec<NewNewsItem> = serde_json::from_str(&content)?;

        let mut imported = 0;
        for draft in drafts {
            if draft.title.trim().is_empty() {
                tracing::warn!("Skipping draft without a title");
                continue;
            }
            self.insert_item(draft).await?;
            imported += 1;
        }
        Ok(imported)
    }

    #[allow(dead_code)]
    pub async fn get_item(&self, id: i64) -> Result<Option<NewsItem>> {
        let item = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ITEM_COLUMNS} FROM news_items WHERE id = ?1"
                ))?;
                let item = stmt.query_row(params![id], item_from_row).optional()?;
                Ok(item)
            })
            .await?;
        Ok(item)
    }

    pub async fn get_all_items_sorted(&self) -> Result<Vec<NewsItem>> {
        let items = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ITEM_COLUMNS} FROM news_items ORDER BY julianday(created_at) DESC, id DESC"
                ))?;
                let items = stmt
                    .query_map([], item_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(items)
            })
            .await?;
        Ok(items)
    }

    pub async fn next_pending_item(&self) -> Result<Option<NewsItem>> {
        let item = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!(
                    r#"SELECT {ITEM_COLUMNS} FROM news_items
                       WHERE (body IS NULL OR TRIM(body) = '') AND raw_draft IS NOT NULL
                       ORDER BY julianday(created_at) ASC, id ASC
                       LIMIT 1"#
                ))?;
                let item = stmt.query_row([], item_from_row).optional()?;
                Ok(item)
            })
            .await?;
        Ok(item)
    }

    pub async fn update_content(&self, id: i64, content: GeneratedContent) -> Result<()> {
        let updated = self
            .conn
            .call(move |conn| {
                let updated = conn.execute(
                    "UPDATE news_items SET hook = ?1, body = ?2, faqs = ?3 WHERE id = ?4",
                    params![content.hook, content.body, content.faqs, id],
                )?;
                Ok(updated)
            })
            .await?;

        if updated == 0 {
            return Err(AppError::ItemNotFound(id));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for Repository {
    async fn list_items(&self) -> Result<Vec<NewsItem>> {
        self.get_all_items_sorted().await
    }

    async fn next_pending_item(&self) -> Result<Option<NewsItem>> {
        Repository::next_pending_item(self).await
    }

    async fn update_content(&self, id: i64, content: &GeneratedContent) -> Result<()> {
        Repository::update_content(self, id, content.clone()).await
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Rows written by other tools may use SQLite's datetime('now') format
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn item_from_row(row: &Row) -> rusqlite::Result<NewsItem> {
    Ok(NewsItem {
        id: row.get(0)?,
        title: row.get(1)?,
        subtitle: row.get(2)?,
        raw_draft: row.get(3)?,
        hook: row.get(4)?,
        body: row.get(5)?,
        faqs: row.get(6)?,
        image_url: row.get(7)?,
        source_url: row.get(8)?,
        created_at: row
            .get::<_, String>(9)
            .ok()
            .and_then(|s| parse_datetime(&s))
            .unwrap_or_else(Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    async fn open_repo() -> (TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("newsdesk.db");
        let repo = Repository::new(path.to_str().unwrap()).await.unwrap();
        (dir, repo)
    }

    fn draft(title: &str, raw: Option<&str>, minute: u32) -> NewNewsItem {
        NewNewsItem {
            title: title.to_string(),
            raw_draft: raw.map(str::to_string),
            created_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, minute, 0).unwrap()),
            ..Default::default()
        }
    }

    fn content(tag: &str) -> GeneratedContent {
        GeneratedContent {
            hook: format!("{tag} hook"),
            body: format!("{tag} body"),
            faqs: format!("{tag} faqs"),
        }
    }

    #[tokio::test]
    async fn lists_items_newest_first() {
        let (_dir, repo) = open_repo().await;
        repo.insert_item(draft("older", Some("a"), 1)).await.unwrap();
        repo.insert_item(draft("newer", Some("b"), 2)).await.unwrap();

        let items = repo.get_all_items_sorted().await.unwrap();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older"]);
        assert_eq!(
            items[1].created_at,
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 1, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn next_pending_is_oldest_eligible() {
        let (_dir, repo) = open_repo().await;
        repo.insert_item(draft("no draft", None, 0)).await.unwrap();
        let b = repo.insert_item(draft("B", Some("b"), 2)).await.unwrap();
        let a = repo.insert_item(draft("A", Some("a"), 1)).await.unwrap();

        let next = repo.next_pending_item().await.unwrap().unwrap();
        assert_eq!(next.id, a);

        repo.update_content(a, content("a")).await.unwrap();
        let next = repo.next_pending_item().await.unwrap().unwrap();
        assert_eq!(next.id, b);

        repo.update_content(b, content("b")).await.unwrap();
        assert!(repo.next_pending_item().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_body_stays_in_queue() {
        let (_dir, repo) = open_repo().await;
        let id = repo.insert_item(draft("A", Some("a"), 1)).await.unwrap();
        repo.update_content(
            id,
            GeneratedContent {
                hook: "h".to_string(),
                body: "   ".to_string(),
                faqs: String::new(),
            },
        )
        .await
        .unwrap();

        let next = repo.next_pending_item().await.unwrap().unwrap();
        assert_eq!(next.id, id);
    }

    #[tokio::test]
    async fn update_overwrites_without_appending() {
        let (_dir, repo) = open_repo().await;
        let id = repo.insert_item(draft("A", Some("a"), 1)).await.unwrap();

        repo.update_content(id, content("first")).await.unwrap();
        repo.update_content(id, content("second")).await.unwrap();
        let once = repo.get_item(id).await.unwrap().unwrap();
        repo.update_content(id, content("second")).await.unwrap();
        let twice = repo.get_item(id).await.unwrap().unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.hook.as_deref(), Some("second hook"));
        assert_eq!(twice.body.as_deref(), Some("second body"));
        assert_eq!(twice.faqs.as_deref(), Some("second faqs"));
        assert_eq!(twice.raw_draft.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn update_is_keyed_by_id_not_title() {
        let (_dir, repo) = open_repo().await;
        let first = repo.insert_item(draft("Same title", Some("a"), 1)).await.unwrap();
        let second = repo.insert_item(draft("Same title", Some("b"), 2)).await.unwrap();

        repo.update_content(second, content("only")).await.unwrap();

        assert!(repo.get_item(first).await.unwrap().unwrap().body.is_none());
        assert!(repo.get_item(second).await.unwrap().unwrap().is_ready());
    }

    #[tokio::test]
    async fn imports_drafts_from_json() {
        let (dir, repo) = open_repo().await;
        let path = dir.path().join("drafts.json");
        std::fs::write(
            &path,
            r#"[
                {"title": "Ponte cai em SP", "raw_draft": "A ponte caiu.", "source_url": "https://example.com/a"},
                {"title": "   ", "raw_draft": "ignored"},
                {"title": "Sem rascunho"}
            ]"#,
        )
        .unwrap();

        assert_eq!(repo.import_drafts(&path).await.unwrap(), 2);

        let items = repo.get_all_items_sorted().await.unwrap();
        assert_eq!(items.len(), 2);
        let next = repo.next_pending_item().await.unwrap().unwrap();
        assert_eq!(next.title, "Ponte cai em SP");
        assert_eq!(next.source_url.as_deref(), Some("https://example.com/a"));
    }

    #[tokio::test]
    async fn malformed_import_is_rejected() {
        let (dir, repo) = open_repo().await;
        let path = dir.path().join("drafts.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = repo.import_drafts(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
        assert!(repo.get_all_items_sorted().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn queue_orders_by_instant_across_timestamp_formats() {
        let (_dir, repo) = open_repo().await;
        let older = repo
            .insert_item(draft("older 09:00", Some("a"), 0))
            .await
            .unwrap();
        // Written by another tool with SQLite's datetime('now') layout
        let newer = repo
            .conn
            .call(|conn| {
                conn.execute(
                    "INSERT INTO news_items (title, raw_draft, created_at)
                     VALUES ('newer 23:00', 'b', '2026-03-01 23:00:00')",
                    [],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .unwrap();

        let next = repo.next_pending_item().await.unwrap().unwrap();
        assert_eq!(next.id, older);

        let items = repo.get_all_items_sorted().await.unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![newer, older]);
        assert_eq!(
            items[0].created_at,
            Utc.with_ymd_and_hms(2026, 3, 1, 23, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn missing_import_file_names_the_path() {
        let (dir, repo) = open_repo().await;
        let path = dir.path().join("absent.json");

        let err = repo.import_drafts(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Other(_)));
        assert!(err.to_string().contains("absent.json"));
    }

    #[tokio::test]
    async fn update_of_missing_item_fails() {
        let (_dir, repo) = open_repo().await;
        let err = repo.update_content(42, content("x")).await.unwrap_err();
        assert!(matches!(err, AppError::ItemNotFound(42)));
    }
}
