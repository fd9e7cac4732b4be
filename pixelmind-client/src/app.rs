use std::sync::Arc;

use crate::api::PostsApi;
use crate::controllers::{LoadStatus, SubmitStatus};
use crate::controllers::discover::DiscoverController;
use crate::controllers::feed::FeedController;
use crate::controllers::forms::{CreatePostController, UpdatePostController};
use crate::controllers::search::SearchController;
use crate::error::StorageError;
use crate::identity::Identity;
use crate::outcome::Outcome;
use crate::storage::KeyValueStore;
use crate::view::View;

/// Все контроллеры одного экрана и связи между ними.
///
/// Формы только сообщают об успехе; перезагрузку текущей страницы ленты
/// выполняет приложение.
pub struct PixelMindApp<A> {
    identity: Identity,
    /// Лента.
    pub feed: FeedController<A>,
    /// Discover.
    pub discover: DiscoverController<A>,
    /// Форма создания.
    pub create: CreatePostController<A>,
    /// Форма редактирования.
    pub update: UpdatePostController<A>,
    /// Поиск по id.
    pub search: SearchController<A>,
}

impl<A: PostsApi> PixelMindApp<A> {
    /// Собирает контроллеры над общим API, идентичностью и представлением.
    pub fn new(
        api: Arc<A>,
        identity: Identity,
        storage: Arc<dyn KeyValueStore>,
        view: Arc<dyn View>,
    ) -> Self {
        Self {
            feed: FeedController::new(api.clone(), identity.clone(), storage, view.clone()),
            discover: DiscoverController::new(api.clone(), view.clone()),
            create: CreatePostController::new(api.clone(), identity.clone(), view.clone()),
            update: UpdatePostController::new(api.clone(), identity.clone(), view.clone()),
            search: SearchController::new(api, view),
            identity,
        }
    }

    /// Контекст текущего пользователя.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Отправляет форму создания; при успехе перезагружает ленту.
    pub async fn submit_create(&self) -> SubmitStatus {
        let status = self.create.submit().await;
        if matches!(status, SubmitStatus::Saved(_)) {
            self.feed.reload().await;
        }
        status
    }

    /// Отправляет форму редактирования; при успехе перезагружает ленту.
    pub async fn submit_update(&self) -> SubmitStatus {
        let status = self.update.submit().await;
        if matches!(status, SubmitStatus::Saved(_)) {
            self.feed.reload().await;
        }
        status
    }

    /// Выбирает пост текущей страницы для редактирования.
    ///
    /// Возвращает `false`, если поста нет на странице или он чужой.
    pub fn start_edit(&self, id: i64) -> bool {
        let posts = self.feed.posts();
        match posts.iter().find(|post| post.id == id) {
            Some(post) if self.feed.can_edit(post) => {
                self.update.start_editing(post);
                true
            }
            _ => false,
        }
    }

    /// Удаляет пост через ленту; если он редактировался, сбрасывает форму.
    pub async fn delete_post(&self, id: i64) -> Outcome<()> {
        let outcome = self.feed.delete(id).await;
        if outcome.is_ok() && self.update.editing_id() == Some(id) {
            self.update.cancel();
        }
        outcome
    }

    /// Меняет пользователя. Лента перерисовывается, чтобы обновить
    /// доступность редактирования.
    pub async fn switch_user(&self, name: &str) -> Result<String, StorageError> {
        let current = self.identity.set(name)?;
        self.feed.reload().await;
        Ok(current)
    }

    /// Первичная загрузка ленты и discover.
    pub async fn start(&self) -> (LoadStatus, LoadStatus) {
        tokio::join!(self.feed.load(0), self.discover.load_first())
    }
}
