use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info, warn};

use super::LoadStatus;
use crate::api::PostsApi;
use crate::error::StorageError;
use crate::identity::Identity;
use crate::models::Post;
use crate::outcome::Outcome;
use crate::storage::{FEED_CACHE_KEY, FEED_LAST_FETCH_KEY, KeyValueStore};
use crate::view::View;

/// Размер страницы ленты.
pub const PAGE_SIZE: u32 = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Фаза последней загрузки страницы.
pub enum FeedPhase {
    /// Загрузок ещё не было.
    #[default]
    Idle,
    /// Запрос отправлен.
    Loading,
    /// Страница загружена.
    Loaded,
    /// Последняя загрузка не удалась.
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Состояние ленты, которое видит `View`.
pub struct FeedState {
    /// Текущая страница (с нуля).
    pub page: u32,
    /// Посты текущей страницы.
    pub posts: Vec<Post>,
    /// Строка статуса.
    pub status: String,
    /// Фаза загрузки.
    pub phase: FeedPhase,
}

/// Лента постов с постраничной загрузкой.
pub struct FeedController<A> {
    api: Arc<A>,
    identity: Identity,
    storage: Arc<dyn KeyValueStore>,
    view: Arc<dyn View>,
    state: Mutex<FeedState>,
    latest_request: AtomicU64,
}

impl<A: PostsApi> FeedController<A> {
    /// Создаёт ленту на нулевой странице. Загрузку нужно запустить явно.
    pub fn new(
        api: Arc<A>,
        identity: Identity,
        storage: Arc<dyn KeyValueStore>,
        view: Arc<dyn View>,
    ) -> Self {
        Self {
            api,
            identity,
            storage,
            view,
            state: Mutex::new(FeedState::default()),
            latest_request: AtomicU64::new(0),
        }
    }

    /// Снимок текущего состояния.
    pub fn snapshot(&self) -> FeedState {
        self.lock().clone()
    }

    /// Текущая страница.
    pub fn page(&self) -> u32 {
        self.lock().page
    }

    /// Посты текущей страницы.
    pub fn posts(&self) -> Vec<Post> {
        self.lock().posts.clone()
    }

    /// Может ли текущий пользователь редактировать и удалять пост.
    pub fn can_edit(&self, post: &Post) -> bool {
        post.is_owned_by(&self.identity.current())
    }

    /// Время последней успешной загрузки, сохранённое в долговременном
    /// хранилище.
    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        let raw = self.storage.get(FEED_LAST_FETCH_KEY).ok().flatten()?;
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// Загружает страницу `page`: `skip = page * 9`, `limit = 9`.
    ///
    /// При ошибке прежние посты остаются на экране. Ответ, обогнанный
    /// более поздним запросом, отбрасывается.
    pub async fn load(&self, page: u32) -> LoadStatus {
        let request_id = self.latest_request.fetch_add(1, Ordering::AcqRel) + 1;
        let loading_message = if self.has_cache() {
            "loading new posts since last visit..."
        } else {
            "loading posts..."
        };
        self.update(|state| {
            state.page = page;
            state.phase = FeedPhase::Loading;
            state.status = loading_message.to_string();
        });

        let skip = u64::from(page) * u64::from(PAGE_SIZE);
        let result = self.api.list_posts(skip, PAGE_SIZE).await;

        if self.latest_request.load(Ordering::Acquire) != request_id {
            debug!(page, request_id, "dropping stale feed response");
            return LoadStatus::Stale;
        }

        self.apply_load(page, Outcome::from_result("list_posts", result))
    }

    /// Следующая страница. Верхней границы нет: пустая страница допустима.
    pub async fn next(&self) -> LoadStatus {
        let page = self.page().saturating_add(1);
        self.load(page).await
    }

    /// Предыдущая страница; на нулевой странице ничего не делает.
    pub async fn prev(&self) -> Option<LoadStatus> {
        let current = self.page();
        if current == 0 {
            return None;
        }
        Some(self.load(current - 1).await)
    }

    /// Перезагружает текущую страницу.
    pub async fn reload(&self) -> LoadStatus {
        let page = self.page();
        self.load(page).await
    }

    /// Удаляет пост от имени текущего пользователя и перезагружает страницу
    /// при успехе.
    pub async fn delete(&self, id: i64) -> Outcome<()> {
        self.set_status("deleting post...");

        let user = self.identity.current();
        let outcome = Outcome::from_result("delete_post", self.api.delete_post(id, &user).await);

        match &outcome {
            Outcome::Ok(()) => {
                info!(id, user = %user, "post deleted");
                self.set_status("post deleted");
                self.reload().await;
            }
            Outcome::Forbidden => {
                self.set_status("you do not have permission to delete this post")
            }
            Outcome::NotFound => self.set_status("post not found"),
            Outcome::Failed => self.set_status("could not delete post"),
        }
        outcome
    }

    fn apply_load(&self, page: u32, outcome: Outcome<Vec<Post>>) -> LoadStatus {
        match outcome {
            Outcome::Ok(posts) => {
                let count = posts.len();
                if let Err(err) = self.persist(&posts) {
                    warn!(error = %err, "failed to cache feed page");
                }
                self.update(|state| {
                    state.posts = posts;
                    state.phase = FeedPhase::Loaded;
                    state.status = format!("page {} ({count} posts)", u64::from(page) + 1);
                });
                LoadStatus::Loaded(count)
            }
            Outcome::Forbidden | Outcome::NotFound | Outcome::Failed => {
                self.update(|state| {
                    state.phase = FeedPhase::Failed;
                    state.status = "could not load posts".to_string();
                });
                LoadStatus::Failed
            }
        }
    }

    fn has_cache(&self) -> bool {
        let present = |key: &str| matches!(self.storage.get(key), Ok(Some(_)));
        present(FEED_CACHE_KEY) && present(FEED_LAST_FETCH_KEY)
    }

    fn persist(&self, posts: &[Post]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(posts)?;
        self.storage.set(FEED_CACHE_KEY, &raw)?;
        self.storage.set(
            FEED_LAST_FETCH_KEY,
            &Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;
        Ok(())
    }

    fn set_status(&self, status: &str) {
        self.update(|state| state.status = status.to_string());
    }

    fn update(&self, apply: impl FnOnce(&mut FeedState)) {
        let mut state = self.lock();
        apply(&mut state);
        self.view.render_feed(&state);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
