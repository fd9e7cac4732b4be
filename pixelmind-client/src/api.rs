use async_trait::async_trait;

use crate::error::PixelMindResult;
use crate::models::{DiscoverImage, HealthStatus, NewPost, Post, PostPatch};

/// Операции backend, которыми пользуются контроллеры.
///
/// Каждый вызов соответствует ровно одному запросу, без повторов.
#[async_trait]
pub trait PostsApi: Send + Sync {
    /// `GET /api/posts?skip=&limit=`.
    async fn list_posts(&self, skip: u64, limit: u32) -> PixelMindResult<Vec<Post>>;

    /// `GET /api/posts/{id}`.
    async fn get_post(&self, id: i64) -> PixelMindResult<Post>;

    /// `POST /api/posts` с заголовком `X-User`.
    async fn create_post(&self, post: &NewPost, user: &str) -> PixelMindResult<Post>;

    /// `PUT /api/posts/{id}` с частичным телом и заголовком `X-User`.
    async fn update_post(&self, id: i64, patch: &PostPatch, user: &str) -> PixelMindResult<Post>;

    /// `DELETE /api/posts/{id}` с заголовком `X-User`.
    async fn delete_post(&self, id: i64, user: &str) -> PixelMindResult<()>;

    /// `GET /api/discover?count=`.
    async fn discover(&self, count: u32) -> PixelMindResult<Vec<DiscoverImage>>;

    /// `GET /`.
    async fn health(&self) -> PixelMindResult<HealthStatus>;
}
