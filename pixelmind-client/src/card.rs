//! Проекция для отображения: общая карточка для постов ленты и изображений
//! discover.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{DiscoverImage, Post};

const SHORT_TITLE_MAX: usize = 60;
const DISCOVER_FALLBACK: &str = "Unsplash image";
const DISCOVER_TAG: &str = "unsplash";

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("url pattern must compile"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Карточка поста в том виде, в каком её рисует любой `View`.
pub struct PostCard {
    /// Идентификатор поста; у изображений discover его нет.
    pub id: Option<i64>,
    /// Заголовок.
    pub title: String,
    /// URL изображения.
    pub image: String,
    /// Альтернативный текст.
    pub alt: String,
    /// Описание.
    pub description: Option<String>,
    /// Внешняя ссылка.
    pub url: Option<String>,
    /// Теги.
    pub tags: Vec<String>,
    /// Автор.
    pub author: String,
    /// Дата публикации.
    pub posted_at: Option<String>,
}

impl PostCard {
    /// Дата публикации в формате `"24 October 2025"`.
    ///
    /// Понимает RFC 3339 и ISO-8601 без часового пояса; остальное
    /// возвращает как есть.
    pub fn display_date(&self) -> Option<String> {
        self.posted_at.as_deref().map(format_date)
    }

    /// `true`, если у карточки есть изображение.
    pub fn has_image(&self) -> bool {
        !self.image.trim().is_empty()
    }
}

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        Self {
            id: Some(post.id),
            title: post.title.clone(),
            image: post.image.clone(),
            alt: post.alt.clone().unwrap_or_else(|| post.title.clone()),
            description: post.description.clone(),
            url: post.url.clone(),
            tags: post.tags.clone(),
            author: post.author.clone(),
            posted_at: post.posted_at.clone(),
        }
    }
}

impl DiscoverImage {
    /// Проецирует изображение в карточку ленты с синтетической датой `now`.
    pub fn to_card(&self, now: DateTime<Utc>) -> PostCard {
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(DISCOVER_FALLBACK)
            .to_string();

        PostCard {
            id: None,
            title: short_title(&description),
            image: self.image_url.clone(),
            alt: description.clone(),
            description: Some(description),
            url: Some(self.full_url.clone()),
            tags: vec![DISCOVER_TAG.to_string()],
            author: format!("{} (Unsplash)", self.author),
            posted_at: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

/// Короткий заголовок из длинного описания.
pub fn short_title(text: &str) -> String {
    let without_urls = URL_PATTERN.replace_all(text, "");
    let head = without_urls
        .split(['(', ')', '-', '|', '•', '·'])
        .next()
        .unwrap_or_default()
        .trim();

    let title = if head.chars().count() > SHORT_TITLE_MAX {
        let cut: String = head.chars().take(SHORT_TITLE_MAX - 3).collect();
        format!("{}...", cut.trim())
    } else {
        head.to_string()
    };

    if title.is_empty() {
        DISCOVER_FALLBACK.to_string()
    } else {
        title
    }
}

fn format_date(raw: &str) -> String {
    const FORMAT: &str = "%-d %B %Y";

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(FORMAT).to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format(FORMAT).to_string();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return parsed.format(FORMAT).to_string();
    }
    raw.to_string()
}
