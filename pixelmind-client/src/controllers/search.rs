use std::sync::{Arc, Mutex};

use crate::api::PostsApi;
use crate::models::Post;
use crate::outcome::Outcome;
use crate::view::View;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Состояние панели поиска по id.
pub struct SearchState {
    /// Найденный пост.
    pub result: Option<Post>,
    /// Строка статуса.
    pub status: String,
}

/// Поиск одного поста по идентификатору.
pub struct SearchController<A> {
    api: Arc<A>,
    view: Arc<dyn View>,
    state: Mutex<SearchState>,
}

impl<A: PostsApi> SearchController<A> {
    /// Пустая панель поиска.
    pub fn new(api: Arc<A>, view: Arc<dyn View>) -> Self {
        Self {
            api,
            view,
            state: Mutex::new(SearchState::default()),
        }
    }

    /// Снимок состояния.
    pub fn snapshot(&self) -> SearchState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Разбирает ввод пользователя и ищет пост.
    ///
    /// Пустой ввод игнорируется, нечисловой отклоняется без запроса.
    pub async fn search(&self, raw_id: &str) -> Option<Outcome<Post>> {
        let raw_id = raw_id.trim();
        if raw_id.is_empty() {
            return None;
        }
        let Ok(id) = raw_id.parse::<i64>() else {
            self.update(|state| state.status = "enter a numeric post id".to_string());
            return None;
        };
        Some(self.search_by_id(id).await)
    }

    /// Ищет пост по идентификатору и заменяет показанный результат.
    pub async fn search_by_id(&self, id: i64) -> Outcome<Post> {
        self.update(|state| state.status = "searching post...".to_string());

        let outcome = Outcome::from_result("get_post", self.api.get_post(id).await);
        match &outcome {
            Outcome::Ok(post) => self.update(|state| {
                state.result = Some(post.clone());
                state.status = "post loaded".to_string();
            }),
            Outcome::NotFound => self.update(|state| {
                state.result = None;
                state.status = "post not found".to_string();
            }),
            Outcome::Forbidden | Outcome::Failed => {
                self.update(|state| state.status = "could not fetch post".to_string())
            }
        }
        outcome
    }

    fn update(&self, apply: impl FnOnce(&mut SearchState)) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        apply(&mut state);
        self.view.render_search(&state);
    }
}
