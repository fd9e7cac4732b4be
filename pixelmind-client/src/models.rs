use serde::{Deserialize, Serialize};

/// Идентичность по умолчанию, когда пользователь не выбран.
pub const ANONYMOUS: &str = "anon";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Публичная модель поста ленты.
pub struct Post {
    /// Идентификатор поста (назначает сервер).
    pub id: i64,
    /// Заголовок.
    pub title: String,
    /// URL изображения.
    pub image: String,
    /// Описание.
    pub description: Option<String>,
    /// Внешняя ссылка.
    pub url: Option<String>,
    /// Теги в порядке добавления.
    pub tags: Vec<String>,
    /// Владелец поста (выставляется сервером из `X-User`).
    pub author: String,
    /// Альтернативный текст изображения.
    pub alt: Option<String>,
    /// Дата публикации в том виде, в каком её вернул сервер.
    pub posted_at: Option<String>,
}

impl Post {
    /// Совпадает ли владелец поста с текущей идентичностью.
    ///
    /// Проверка только для отображения кнопок редактирования, не для защиты.
    pub fn is_owned_by(&self, identity: &str) -> bool {
        self.author.trim() == identity.trim()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Данные для создания поста.
pub struct NewPost {
    /// Заголовок (обязателен).
    pub title: String,
    /// URL изображения (обязателен).
    pub image: String,
    /// Описание.
    pub description: Option<String>,
    /// Внешняя ссылка.
    pub url: Option<String>,
    /// Теги.
    pub tags: Vec<String>,
    /// Альтернативный текст; если не задан, используется заголовок.
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Частичное обновление поста: отправляются только заданные поля.
pub struct PostPatch {
    /// Новый заголовок.
    pub title: Option<String>,
    /// Новый URL изображения.
    pub image: Option<String>,
    /// Новое описание.
    pub description: Option<String>,
    /// Новая внешняя ссылка.
    pub url: Option<String>,
    /// Новый список тегов.
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Изображение из discover (Unsplash через backend), только для чтения.
pub struct DiscoverImage {
    /// Идентификатор во внешнем сервисе.
    pub id: String,
    /// Автор фотографии.
    pub author: String,
    /// Описание.
    pub description: Option<String>,
    /// URL превью.
    pub image_url: String,
    /// URL полной версии.
    pub full_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Ответ health-эндпоинта backend.
pub struct HealthStatus {
    /// Сервис отвечает.
    pub ok: bool,
    /// Количество постов в хранилище.
    pub count: u64,
}
