use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::ai::{ContentGenerator, GeminiGenerator};
use crate::autopilot::{Autopilot, SharedActivityLog};
use crate::config::Config;
use crate::db::Repository;
use crate::error::Result;
use crate::models::{GeneratedContent, ItemFilter, NewsItem};
use crate::tui::{AppAction, InputMode};

// Message for completed on-demand generation
pub struct GenerationResult {
    pub item_id: i64,
    pub result: std::result::Result<GeneratedContent, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditField {
    #[default]
    Hook,
    Body,
    Faqs,
}

impl EditField {
    pub fn next(self) -> Self {
        match self {
            EditField::Hook => EditField::Body,
            EditField::Body => EditField::Faqs,
            EditField::Faqs => EditField::Hook,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EditField::Hook => "Hook",
            EditField::Body => "Article",
            EditField::Faqs => "FAQ",
        }
    }
}

pub struct App {
    // Data
    pub items: Vec<NewsItem>,

    // UI State
    pub selected_index: usize,
    pub filter: ItemFilter,
    pub show_help: bool,
    pub search_active: bool,
    pub search_query: String,
    pub notification: Option<String>,

    // Editor
    pub editing_item_id: Option<i64>,
    pub edited_hook: String,
    pub edited_body: String,
    pub edited_faqs: String,
    pub edit_active: bool,
    pub edit_field: EditField,

    // Async state
    pub is_generating: bool,
    generation_rx: mpsc::Receiver<GenerationResult>,
    generation_tx: mpsc::Sender<GenerationResult>,
    items_rx: Option<watch::Receiver<Vec<NewsItem>>>,

    // Services
    pub repository: Repository,
    generator: Option<Arc<dyn ContentGenerator>>,
    pub model_name: Option<String>,
    pub autopilot: Option<Autopilot>,
    pub activity_log: SharedActivityLog,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;

        let generator = match &config.gemini_api_key {
            Some(key) => Some(GeminiGenerator::new(
                key.clone(),
                config.gemini_model.clone(),
            )?),
            None => None,
        };
        let model_name = generator.as_ref().map(|g| g.model_version().to_string());
        let generator = generator.map(|g| Arc::new(g) as Arc<dyn ContentGenerator>);

        let mut app = Self::with_services(
            repository,
            generator,
            SharedActivityLog::new(config.activity_log_capacity),
            config.autopilot_interval(),
        )
        .await?;
        app.model_name = model_name;
        Ok(app)
    }

    pub async fn with_services(
        repository: Repository,
        generator: Option<Arc<dyn ContentGenerator>>,
        activity_log: SharedActivityLog,
        autopilot_interval: std::time::Duration,
    ) -> Result<Self> {
        let items = repository.get_all_items_sorted().await?;

        let autopilot = generator.as_ref().map(|generator| {
            Autopilot::new(
                Arc::new(repository.clone()),
                Arc::clone(generator),
                activity_log.clone(),
                autopilot_interval,
            )
        });
        let items_rx = autopilot.as_ref().map(Autopilot::subscribe);

        let (generation_tx, generation_rx) = mpsc::channel(1);

        Ok(Self {
            items,
            selected_index: 0,
            filter: ItemFilter::Pending,
            show_help: false,
            search_active: false,
            search_query: String::new(),
            notification: None,
            editing_item_id: None,
            edited_hook: String::new(),
            edited_body: String::new(),
            edited_faqs: String::new(),
            edit_active: false,
            edit_field: EditField::Hook,
            is_generating: false,
            generation_rx,
            generation_tx,
            items_rx,
            repository,
            generator,
            model_name: None,
            autopilot,
            activity_log,
        })
    }

    pub fn input_mode(&self) -> InputMode {
        if self.notification.is_some() {
            InputMode::Notification
        } else if self.show_help {
            InputMode::Help
        } else if self.search_active {
            InputMode::Search
        } else if self.edit_active {
            InputMode::Edit
        } else {
            InputMode::Normal
        }
    }

    pub fn filtered_items(&self) -> Vec<&NewsItem> {
        let query = self.search_query.to_lowercase();
        self.items
            .iter()
            .filter(|item| self.filter.matches(item))
            .filter(|item| item.title.to_lowercase().contains(&query))
            .collect()
    }

    pub fn highlighted_item(&self) -> Option<&NewsItem> {
        let items = self.filtered_items();
        items.get(self.selected_index).copied()
    }

    /// The item whose copy is loaded in the editor.
    pub fn editing_item(&self) -> Option<&NewsItem> {
        let id = self.editing_item_id?;
        self.items.iter().find(|item| item.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_ready()).count()
    }

    pub fn autopilot_running(&self) -> bool {
        self.autopilot.as_ref().is_some_and(Autopilot::is_running)
    }

    pub async fn handle_action(&mut self, action: AppAction) -> Result<bool> {
        match action {
            AppAction::Quit => return Ok(true),

            AppAction::MoveUp => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }

            AppAction::MoveDown => {
                let len = self.filtered_items().len();
                if len > 0 && self.selected_index < len - 1 {
                    self.selected_index += 1;
                }
            }

            AppAction::MoveToTop => {
                self.selected_index = 0;
            }

            AppAction::MoveToBottom => {
                self.selected_index = self.filtered_items().len().saturating_sub(1);
            }

            AppAction::SelectItem => {
                self.select_highlighted();
            }

            AppAction::GenerateContent => {
                self.generate_content();
            }

            AppAction::Publish => {
                self.publish().await;
            }

            AppAction::ToggleAutopilot => {
                self.toggle_autopilot();
            }

            AppAction::CycleFilter => {
                self.filter = self.filter.cycle();
                self.selected_index = 0;
            }

            AppAction::ReloadItems => {
                if let Err(e) = self.reload_items().await {
                    self.notification = Some(format!("Failed to load news items: {e}"));
                }
            }

            AppAction::ShowHelp => {
                self.show_help = true;
            }

            AppAction::HideHelp => {
                self.show_help = false;
            }

            AppAction::DismissNotification => {
                self.notification = None;
            }

            AppAction::StartSearch => {
                self.search_active = true;
            }

            AppAction::SearchChar(c) => {
                self.search_query.push(c);
                self.selected_index = 0;
            }

            AppAction::SearchBackspace => {
                self.search_query.pop();
                self.selected_index = 0;
            }

            AppAction::SearchConfirm => {
                self.search_active = false;
            }

            AppAction::SearchCancel => {
                self.search_active = false;
                self.search_query.clear();
                self.selected_index = 0;
            }

            AppAction::StartEditing => {
                if self.editing_item_id.is_some() {
                    self.edit_active = true;
                }
            }

            AppAction::EditChar(c) => {
                self.focused_buffer().push(c);
            }

            AppAction::EditNewline => {
                self.focused_buffer().push('\n');
            }

            AppAction::EditBackspace => {
                self.focused_buffer().pop();
            }

            AppAction::EditNextField => {
                self.edit_field = self.edit_field.next();
            }

            AppAction::StopEditing => {
                self.edit_active = false;
            }
        }

        Ok(false)
    }

    fn focused_buffer(&mut self) -> &mut String {
        match self.edit_field {
            EditField::Hook => &mut self.edited_hook,
            EditField::Body => &mut self.edited_body,
            EditField::Faqs => &mut self.edited_faqs,
        }
    }

    fn select_highlighted(&mut self) {
        let Some(item) = self.highlighted_item() else {
            return;
        };

        let id = item.id;
        let hook = item.hook.clone().unwrap_or_default();
        let body = item.body.clone().unwrap_or_default();
        let faqs = item.faqs.clone().unwrap_or_default();

        self.editing_item_id = Some(id);
        self.edited_hook = hook;
        self.edited_body = body;
        self.edited_faqs = faqs;
        self.edit_field = EditField::Hook;
        self.edit_active = false;
    }

    fn generate_content(&mut self) {
        let Some(generator) = self.generator.clone() else {
            self.notification = Some(no_api_key_message());
            return;
        };

        if self.is_generating {
            return;
        }

        let Some(item) = self.editing_item() else {
            return;
        };

        let item_id = item.id;
        let title = item.title.clone();
        let raw_draft = item.raw_draft.clone().unwrap_or_default();

        self.is_generating = true;

        // Spawn background task for generation
        let tx = self.generation_tx.clone();

        tokio::spawn(async move {
            let result = generator
                .generate(&title, &raw_draft)
                .await
                .map_err(|e| e.to_string());

            let _ = tx.send(GenerationResult { item_id, result }).await;
        });
    }

    /// Poll for completed generation results (non-blocking)
    pub fn poll_generation_result(&mut self) {
        let Ok(result) = self.generation_rx.try_recv() else {
            return;
        };
        self.is_generating = false;

        // The editor may have moved on to another item meanwhile
        if self.editing_item_id != Some(result.item_id) {
            return;
        }

        match result.result {
            Ok(content) => {
                self.edited_hook = content.hook;
                self.edited_body = content.body;
                self.edited_faqs = content.faqs;
            }
            Err(e) => {
                tracing::error!("Failed to generate content: {}", e);
                self.notification = Some(format!("Editorial error: {e}"));
            }
        }
    }

    /// Pick up the item list republished by the autopilot.
    pub fn poll_item_updates(&mut self) {
        let Some(rx) = self.items_rx.as_mut() else {
            return;
        };
        if rx.has_changed().unwrap_or(false) {
            self.items = rx.borrow_and_update().clone();
            self.clamp_selection();
        }
    }

    async fn publish(&mut self) {
        if self.is_generating {
            return;
        }

        let Some(item) = self.editing_item() else {
            return;
        };

        let id = item.id;
        let title = item.title.clone();
        let content = GeneratedContent {
            hook: self.edited_hook.clone(),
            body: self.edited_body.clone(),
            faqs: self.edited_faqs.clone(),
        };

        if let Err(e) = self.repository.update_content(id, content).await {
            tracing::error!("Failed to publish item {}: {}", id, e);
            self.notification = Some(format!("Failed to publish: {e}"));
            return;
        }

        tracing::info!(id, "published item");
        self.edit_active = false;

        // The write has landed; a failed reload only leaves the list stale
        match self.reload_items().await {
            Ok(()) => self.notification = Some(format!("Published: {title}")),
            Err(e) => {
                tracing::warn!("Failed to reload items after publish: {}", e);
                self.notification = Some(format!(
                    "Published: {title}\n\nFailed to reload news items: {e}"
                ));
            }
        }
    }

    fn toggle_autopilot(&mut self) {
        match self.autopilot.as_mut() {
            Some(autopilot) => {
                autopilot.toggle();
            }
            None => {
                self.notification = Some(no_api_key_message());
            }
        }
    }

    async fn reload_items(&mut self) -> Result<()> {
        self.items = self.repository.get_all_items_sorted().await?;
        self.clamp_selection();
        Ok(())
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered_items().len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }
}

fn no_api_key_message() -> String {
    format!(
        "Gemini API key not configured.\n\nSet GEMINI_API_KEY or add it to:\n{}\n\nExample:\ngemini_api_key = \"AIza...\"",
        Config::config_path().display()
    )
}
