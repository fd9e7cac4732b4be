use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, error};

use crate::api::PostsApi;
use crate::error::{PixelMindError, PixelMindResult};
use crate::models::{DiscoverImage, HealthStatus, NewPost, Post, PostPatch};

const USER_HEADER: &str = "X-User";

#[derive(Debug, Serialize)]
struct CreatePostRequestDto<'a> {
    titulo: &'a str,
    imagen: &'a str,
    descripcion: Option<&'a str>,
    url: Option<&'a str>,
    tags: &'a [String],
    alt: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdatePostRequestDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    titulo: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    imagen: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    descripcion: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
}

#[derive(Debug, Deserialize)]
struct PostDto {
    id: i64,
    titulo: String,
    #[serde(default)]
    imagen: String,
    descripcion: Option<String>,
    url: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    usuario: String,
    alt: Option<String>,
    fecha_alta: Option<String>,
    fecha: Option<String>,
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiscoverImageDto {
    id: String,
    autor: String,
    descripcion: Option<String>,
    url_imagen: String,
    url_full: String,
}

#[derive(Debug, Deserialize)]
struct HealthDto {
    ok: bool,
    #[serde(default)]
    count: u64,
}

#[derive(Serialize)]
struct ListPostsQuery {
    skip: u64,
    limit: u32,
}

#[derive(Serialize)]
struct DiscoverQuery {
    count: u32,
}

impl From<PostDto> for Post {
    fn from(value: PostDto) -> Self {
        let posted_at = value.fecha_alta.or(value.fecha).or(value.timestamp);
        Self {
            id: value.id,
            title: value.titulo,
            image: value.imagen,
            description: value.descripcion,
            url: value.url,
            tags: value.tags.unwrap_or_default(),
            author: value.usuario,
            alt: value.alt,
            posted_at,
        }
    }
}

impl From<DiscoverImageDto> for DiscoverImage {
    fn from(value: DiscoverImageDto) -> Self {
        Self {
            id: value.id,
            author: value.autor,
            description: value.descripcion,
            image_url: value.url_imagen,
            full_url: value.url_full,
        }
    }
}

impl<'a> From<&'a NewPost> for CreatePostRequestDto<'a> {
    fn from(value: &'a NewPost) -> Self {
        Self {
            titulo: &value.title,
            imagen: &value.image,
            descripcion: value.description.as_deref(),
            url: value.url.as_deref(),
            tags: &value.tags,
            alt: value.alt.as_deref().unwrap_or(&value.title),
        }
    }
}

impl<'a> From<&'a PostPatch> for UpdatePostRequestDto<'a> {
    fn from(value: &'a PostPatch) -> Self {
        Self {
            titulo: value.title.as_deref(),
            imagen: value.image.as_deref(),
            descripcion: value.description.as_deref(),
            url: value.url.as_deref(),
            tags: value.tags.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
/// HTTP-клиент для REST API PixelMind.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Таймаут установки соединения по умолчанию.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Таймаут всего запроса по умолчанию.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

    /// Создаёт клиент с таймаутами по умолчанию.
    pub fn new(base_url: impl Into<String>) -> PixelMindResult<Self> {
        Self::with_timeouts(
            base_url,
            Self::DEFAULT_CONNECT_TIMEOUT,
            Self::DEFAULT_REQUEST_TIMEOUT,
        )
    }

    /// Создаёт клиент с явными таймаутами.
    pub fn with_timeouts(
        base_url: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> PixelMindResult<Self> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(PixelMindError::InvalidRequest(
                "base url must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;

        Ok(Self { base_url, client })
    }

    /// Базовый URL сервера.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, user: Option<&str>) -> RequestBuilder {
        let url = self.endpoint(path);
        debug!(%method, %url, "sending request");

        let request = self.client.request(method, url);
        match user {
            Some(user) => request.header(USER_HEADER, user),
            None => request,
        }
    }

    async fn decode_error(response: reqwest::Response) -> PixelMindError {
        let status = response.status();
        let body = response.text().await.ok();

        error!(
            status = status.as_u16(),
            body = body.as_deref().unwrap_or_default(),
            "backend returned an error"
        );
        PixelMindError::from_http_status(status, body)
    }

    async fn send(request: RequestBuilder) -> PixelMindResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(PixelMindError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn send_for_json<TRes>(request: RequestBuilder) -> PixelMindResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        Self::send(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(PixelMindError::from_reqwest)
    }
}

#[async_trait]
impl PostsApi for HttpClient {
    async fn list_posts(&self, skip: u64, limit: u32) -> PixelMindResult<Vec<Post>> {
        let request = self
            .request(Method::GET, "/api/posts", None)
            .query(&ListPostsQuery { skip, limit });

        let dtos: Vec<PostDto> = Self::send_for_json(request).await?;
        Ok(dtos.into_iter().map(Post::from).collect())
    }

    async fn get_post(&self, id: i64) -> PixelMindResult<Post> {
        let request = self.request(Method::GET, &format!("/api/posts/{id}"), None);
        let dto: PostDto = Self::send_for_json(request).await?;
        Ok(dto.into())
    }

    async fn create_post(&self, post: &NewPost, user: &str) -> PixelMindResult<Post> {
        let payload = CreatePostRequestDto::from(post);
        let request = self
            .request(Method::POST, "/api/posts", Some(user))
            .json(&payload);

        let dto: PostDto = Self::send_for_json(request).await?;
        Ok(dto.into())
    }

    async fn update_post(&self, id: i64, patch: &PostPatch, user: &str) -> PixelMindResult<Post> {
        let payload = UpdatePostRequestDto::from(patch);
        let request = self
            .request(Method::PUT, &format!("/api/posts/{id}"), Some(user))
            .json(&payload);

        let dto: PostDto = Self::send_for_json(request).await?;
        Ok(dto.into())
    }

    async fn delete_post(&self, id: i64, user: &str) -> PixelMindResult<()> {
        let request = self.request(Method::DELETE, &format!("/api/posts/{id}"), Some(user));
        Self::send(request).await?;
        Ok(())
    }

    async fn discover(&self, count: u32) -> PixelMindResult<Vec<DiscoverImage>> {
        let request = self
            .request(Method::GET, "/api/discover", None)
            .query(&DiscoverQuery { count });

        let dtos: Vec<DiscoverImageDto> = Self::send_for_json(request).await?;
        Ok(dtos.into_iter().map(DiscoverImage::from).collect())
    }

    async fn health(&self) -> PixelMindResult<HealthStatus> {
        let request = self.request(Method::GET, "/", None);
        let dto: HealthDto = Self::send_for_json(request).await?;
        Ok(HealthStatus {
            ok: dto.ok,
            count: dto.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_slashes() {
        let client = HttpClient::new("http://localhost:8000/").expect("client must build");
        let full = client.endpoint("/api/posts");
        assert_eq!(full, "http://localhost:8000/api/posts");
    }

    #[test]
    fn blank_base_url_is_rejected() {
        let result = HttpClient::new("   ");
        assert!(matches!(result, Err(PixelMindError::InvalidRequest(_))));
    }

    #[test]
    fn post_dto_prefers_fecha_alta_over_other_dates() {
        let raw = r#"{
            "id": 1,
            "usuario": "admin",
            "fecha_alta": "2025-10-24T00:00:00",
            "fecha": "2020-01-01",
            "titulo": "Atardecer en la ciudad",
            "imagen": "img-seed/city-sunset.jpg",
            "tags": ["ciudad", "atardecer", "paisaje"]
        }"#;

        let post = Post::from(serde_json::from_str::<PostDto>(raw).expect("valid post json"));
        assert_eq!(post.posted_at.as_deref(), Some("2025-10-24T00:00:00"));
        assert_eq!(post.author, "admin");
        assert_eq!(post.tags, vec!["ciudad", "atardecer", "paisaje"]);
    }

    #[test]
    fn post_dto_falls_back_to_timestamp_and_null_tags() {
        let raw = r#"{
            "id": 2,
            "usuario": "tania",
            "timestamp": "2025-10-22T00:00:00Z",
            "titulo": "Setup",
            "imagen": "x.jpg",
            "tags": null
        }"#;

        let post = Post::from(serde_json::from_str::<PostDto>(raw).expect("valid post json"));
        assert_eq!(post.posted_at.as_deref(), Some("2025-10-22T00:00:00Z"));
        assert!(post.tags.is_empty());
    }

    #[test]
    fn create_payload_defaults_alt_to_title() {
        let post = NewPost {
            title: "Café y estudio".to_string(),
            image: "img-seed/coffee-study.jpg".to_string(),
            tags: vec!["estudio".to_string()],
            ..NewPost::default()
        };

        let json = serde_json::to_value(CreatePostRequestDto::from(&post)).expect("serializable");
        assert_eq!(json["alt"], "Café y estudio");
        assert_eq!(json["descripcion"], serde_json::Value::Null);
        assert_eq!(json["tags"][0], "estudio");
    }

    #[test]
    fn update_payload_contains_only_present_fields() {
        let patch = PostPatch {
            title: Some("nuevo".to_string()),
            ..PostPatch::default()
        };

        let json = serde_json::to_value(UpdatePostRequestDto::from(&patch)).expect("serializable");
        let object = json.as_object().expect("object payload");
        assert_eq!(object.len(), 1);
        assert_eq!(object["titulo"], "nuevo");
    }
}
