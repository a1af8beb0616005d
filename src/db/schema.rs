pub const SCHEMA: &str = r#"
-- news_items table
CREATE TABLE IF NOT EXISTS news_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    subtitle TEXT,
    raw_draft TEXT,
    hook TEXT,
    body TEXT,
    faqs TEXT,
    image_url TEXT,
    source_url TEXT,
    created_at TEXT NOT NULL
);

-- created_at mixes RFC3339 and SQLite datetime text, so order on julianday()
DROP INDEX IF EXISTS idx_news_items_created_at;
DROP INDEX IF EXISTS idx_news_items_pending;
CREATE INDEX IF NOT EXISTS idx_news_items_created ON news_items(julianday(created_at), id);
CREATE INDEX IF NOT EXISTS idx_news_items_queue ON news_items(julianday(created_at), id)
    WHERE (body IS NULL OR TRIM(body) = '') AND raw_draft IS NOT NULL;
"#;
