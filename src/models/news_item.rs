use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub raw_draft: Option<String>,
    pub hook: Option<String>,
    pub body: Option<String>,
    pub faqs: Option<String>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewsItem {
    /// An item is ready once it carries a non-blank body.
    pub fn is_ready(&self) -> bool {
        self.body
            .as_deref()
            .is_some_and(|body| !body.trim().is_empty())
    }

    /// Whether the autopilot may pick this item up: still pending and
    /// with a raw draft to write from.
    pub fn is_eligible(&self) -> bool {
        !self.is_ready() && self.raw_draft.is_some()
    }

    /// Short title preview for log lines.
    pub fn title_preview(&self, max_chars: usize) -> String {
        if self.title.chars().count() <= max_chars {
            return self.title.clone();
        }
        let truncated: String = self.title.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewNewsItem {
    pub title: String,
    pub subtitle: Option<String>,
    pub raw_draft: Option<String>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Output of the content generator, written over `hook`, `body` and `faqs`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub hook: String,
    #[serde(rename = "content")]
    pub body: String,
    pub faqs: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemFilter {
    #[default]
    Pending,
    Ready,
}

impl ItemFilter {
    pub fn cycle(self) -> Self {
        match self {
            ItemFilter::Pending => ItemFilter::Ready,
            ItemFilter::Ready => ItemFilter::Pending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemFilter::Pending => "Pending",
            ItemFilter::Ready => "Ready",
        }
    }

    pub fn matches(self, item: &NewsItem) -> bool {
        match self {
            ItemFilter::Pending => !item.is_ready(),
            ItemFilter::Ready => item.is_ready(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(raw_draft: Option<&str>, body: Option<&str>) -> NewsItem {
        NewsItem {
            id: 1,
            title: "Ponte cai em SP".to_string(),
            subtitle: None,
            raw_draft: raw_draft.map(str::to_string),
            hook: None,
            body: body.map(str::to_string),
            faqs: None,
            image_url: None,
            source_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn blank_body_is_not_ready() {
        assert!(!item(Some("draft"), None).is_ready());
        assert!(!item(Some("draft"), Some("   \n\t")).is_ready());
        assert!(item(Some("draft"), Some("Full story")).is_ready());
    }

    #[test]
    fn eligibility_requires_pending_and_draft() {
        assert!(item(Some("draft"), None).is_eligible());
        assert!(item(Some("draft"), Some("  ")).is_eligible());
        assert!(!item(None, None).is_eligible());
        assert!(!item(Some("draft"), Some("Full story")).is_eligible());
    }

    #[test]
    fn filter_splits_pending_and_ready() {
        let pending = item(Some("draft"), None);
        let ready = item(Some("draft"), Some("Full story"));

        assert!(ItemFilter::Pending.matches(&pending));
        assert!(!ItemFilter::Pending.matches(&ready));
        assert!(ItemFilter::Ready.matches(&ready));
        assert_eq!(ItemFilter::Pending.cycle(), ItemFilter::Ready);
        assert_eq!(ItemFilter::Ready.cycle(), ItemFilter::Pending);
    }

    #[test]
    fn title_preview_truncates_on_char_boundary() {
        let mut long = item(None, None);
        long.title = "Ação: ponte desaba e interdita a marginal por horas".to_string();

        let preview = long.title_preview(10);
        assert_eq!(preview, "Ação: pont...");
        assert_eq!(item(None, None).title_preview(30), "Ponte cai em SP");
    }

    #[test]
    fn generated_content_reads_generator_field_names() {
        let parsed: GeneratedContent =
            serde_json::from_str(r#"{"hook":"h","content":"b","faqs":"f"}"#).unwrap();
        assert_eq!(parsed.body, "b");
    }
}
