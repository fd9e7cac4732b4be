//! Граница между состоянием контроллеров и представлением.

use crate::controllers::discover::DiscoverState;
use crate::controllers::feed::FeedState;
use crate::controllers::forms::{FormKind, FormState};
use crate::controllers::search::SearchState;

/// Слой отрисовки. Контроллеры вызывают его после каждого изменения
/// состояния; реализация не должна обращаться к контроллерам обратно.
pub trait View: Send + Sync {
    /// Лента: страница, посты, статус.
    fn render_feed(&self, state: &FeedState);
    /// Discover: накопленные карточки, счётчик, статус.
    fn render_discover(&self, state: &DiscoverState);
    /// Поиск по id.
    fn render_search(&self, state: &SearchState);
    /// Форма создания или редактирования.
    fn render_form(&self, kind: FormKind, state: &FormState);
}

#[derive(Debug, Default, Clone, Copy)]
/// Представление, которое ничего не рисует.
pub struct NoopView;

impl View for NoopView {
    fn render_feed(&self, _state: &FeedState) {}
    fn render_discover(&self, _state: &DiscoverState) {}
    fn render_search(&self, _state: &SearchState) {}
    fn render_form(&self, _kind: FormKind, _state: &FormState) {}
}
