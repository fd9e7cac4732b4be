//! Клиентская библиотека PixelMind: лента постов, discover, формы и поиск
//! поверх REST API backend.
//!
//! Состоит из двух слоёв:
//! - `HttpClient` (`reqwest`) реализует `PostsApi` и переводит HTTP-статусы
//!   в `PixelMindError`;
//! - контроллеры держат состояние экранов, сворачивают ошибки в `Outcome`
//!   и отдают состояние в подключаемый `View`.
//!
//! Текущий пользователь передаётся контроллерам через `Identity` и уходит на
//! сервер в заголовке `X-User`. Это подпись, а не авторизация.
#![warn(missing_docs)]

mod api;
mod app;
mod card;
mod controllers;
mod error;
mod http_client;
mod identity;
mod models;
mod outcome;
mod storage;
mod view;

#[cfg(test)]
mod test_support;

pub use api::PostsApi;
pub use app::PixelMindApp;
pub use card::{PostCard, short_title};
pub use controllers::discover::{DISCOVER_CHUNK, DISCOVER_MAX, DiscoverController, DiscoverState};
pub use controllers::feed::{FeedController, FeedPhase, FeedState, PAGE_SIZE};
pub use controllers::forms::{
    CreatePostController, FormFields, FormKind, FormState, UpdatePostController, parse_tags,
};
pub use controllers::search::{SearchController, SearchState};
pub use controllers::{LoadStatus, SubmitStatus};
pub use error::{PixelMindError, PixelMindResult, StorageError};
pub use http_client::HttpClient;
pub use identity::Identity;
pub use models::{ANONYMOUS, DiscoverImage, HealthStatus, NewPost, Post, PostPatch};
pub use outcome::Outcome;
pub use storage::{
    CURRENT_USER_KEY, FEED_CACHE_KEY, FEED_LAST_FETCH_KEY, FileStore, KeyValueStore, MemoryStore,
};
pub use view::{NoopView, View};
