mod news_item;

pub use news_item::{GeneratedContent, ItemFilter, NewNewsItem, NewsItem};
