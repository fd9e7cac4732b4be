//! Фейки для тестов контроллеров.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::PostsApi;
use crate::controllers::discover::DiscoverState;
use crate::controllers::feed::FeedState;
use crate::controllers::forms::{FormKind, FormState};
use crate::controllers::search::SearchState;
use crate::error::{PixelMindError, PixelMindResult};
use crate::identity::Identity;
use crate::models::{DiscoverImage, HealthStatus, NewPost, Post, PostPatch};
use crate::storage::MemoryStore;
use crate::view::View;

#[derive(Debug, Clone)]
pub(crate) enum Reply<T> {
    Ok(T),
    Forbidden,
    NotFound,
    Fail,
}

impl<T> Reply<T> {
    fn into_result(self) -> PixelMindResult<T> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Forbidden => Err(PixelMindError::Forbidden),
            Self::NotFound => Err(PixelMindError::NotFound),
            Self::Fail => Err(PixelMindError::Status {
                status: 500,
                message: "internal error".to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeApi {
    pub(crate) list_calls: Mutex<Vec<(u64, u32)>>,
    pub(crate) list_replies: Mutex<VecDeque<Reply<Vec<Post>>>>,
    pub(crate) list_gates: Mutex<VecDeque<Arc<Notify>>>,

    pub(crate) get_calls: Mutex<Vec<i64>>,
    pub(crate) get_reply: Mutex<Option<Reply<Post>>>,

    pub(crate) create_calls: Mutex<Vec<(NewPost, String)>>,
    pub(crate) create_reply: Mutex<Option<Reply<Post>>>,

    pub(crate) update_calls: Mutex<Vec<(i64, PostPatch, String)>>,
    pub(crate) update_reply: Mutex<Option<Reply<Post>>>,

    pub(crate) delete_calls: Mutex<Vec<(i64, String)>>,
    pub(crate) delete_reply: Mutex<Option<Reply<()>>>,

    pub(crate) discover_calls: Mutex<Vec<u32>>,
    pub(crate) discover_replies: Mutex<VecDeque<Reply<Vec<DiscoverImage>>>>,
    pub(crate) discover_gates: Mutex<VecDeque<Arc<Notify>>>,
}

impl FakeApi {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push_list(&self, reply: Reply<Vec<Post>>) {
        self.list_replies
            .lock()
            .expect("list_replies mutex poisoned")
            .push_back(reply);
    }

    pub(crate) fn push_discover(&self, reply: Reply<Vec<DiscoverImage>>) {
        self.discover_replies
            .lock()
            .expect("discover_replies mutex poisoned")
            .push_back(reply);
    }

    pub(crate) fn gate_next_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.list_gates
            .lock()
            .expect("list_gates mutex poisoned")
            .push_back(gate.clone());
        gate
    }

    pub(crate) fn gate_next_discover(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.discover_gates
            .lock()
            .expect("discover_gates mutex poisoned")
            .push_back(gate.clone());
        gate
    }

    pub(crate) fn set_get(&self, reply: Reply<Post>) {
        *self.get_reply.lock().expect("get_reply mutex poisoned") = Some(reply);
    }

    pub(crate) fn set_create(&self, reply: Reply<Post>) {
        *self.create_reply.lock().expect("create_reply mutex poisoned") = Some(reply);
    }

    pub(crate) fn set_update(&self, reply: Reply<Post>) {
        *self.update_reply.lock().expect("update_reply mutex poisoned") = Some(reply);
    }

    pub(crate) fn set_delete(&self, reply: Reply<()>) {
        *self.delete_reply.lock().expect("delete_reply mutex poisoned") = Some(reply);
    }

    pub(crate) fn list_calls(&self) -> Vec<(u64, u32)> {
        self.list_calls.lock().expect("list_calls mutex poisoned").clone()
    }

    pub(crate) fn discover_calls(&self) -> Vec<u32> {
        self.discover_calls
            .lock()
            .expect("discover_calls mutex poisoned")
            .clone()
    }

    pub(crate) fn create_calls(&self) -> Vec<(NewPost, String)> {
        self.create_calls
            .lock()
            .expect("create_calls mutex poisoned")
            .clone()
    }

    pub(crate) fn update_calls(&self) -> Vec<(i64, PostPatch, String)> {
        self.update_calls
            .lock()
            .expect("update_calls mutex poisoned")
            .clone()
    }

    pub(crate) fn delete_calls(&self) -> Vec<(i64, String)> {
        self.delete_calls
            .lock()
            .expect("delete_calls mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl PostsApi for FakeApi {
    async fn list_posts(&self, skip: u64, limit: u32) -> PixelMindResult<Vec<Post>> {
        self.list_calls
            .lock()
            .expect("list_calls mutex poisoned")
            .push((skip, limit));
        let gate = self
            .list_gates
            .lock()
            .expect("list_gates mutex poisoned")
            .pop_front();
        let reply = self
            .list_replies
            .lock()
            .expect("list_replies mutex poisoned")
            .pop_front();

        if let Some(gate) = gate {
            gate.notified().await;
        }

        match reply {
            Some(reply) => reply.into_result(),
            None => Ok(page_of(skip, limit, "admin")),
        }
    }

    async fn get_post(&self, id: i64) -> PixelMindResult<Post> {
        self.get_calls
            .lock()
            .expect("get_calls mutex poisoned")
            .push(id);
        let reply = self
            .get_reply
            .lock()
            .expect("get_reply mutex poisoned")
            .clone();
        reply.unwrap_or(Reply::NotFound).into_result()
    }

    async fn create_post(&self, post: &NewPost, user: &str) -> PixelMindResult<Post> {
        self.create_calls
            .lock()
            .expect("create_calls mutex poisoned")
            .push((post.clone(), user.to_string()));
        let reply = self
            .create_reply
            .lock()
            .expect("create_reply mutex poisoned")
            .clone();
        match reply {
            Some(reply) => reply.into_result(),
            None => {
                let mut created = sample_post(100, user);
                created.title = post.title.clone();
                created.image = post.image.clone();
                created.tags = post.tags.clone();
                Ok(created)
            }
        }
    }

    async fn update_post(&self, id: i64, patch: &PostPatch, user: &str) -> PixelMindResult<Post> {
        self.update_calls
            .lock()
            .expect("update_calls mutex poisoned")
            .push((id, patch.clone(), user.to_string()));
        let reply = self
            .update_reply
            .lock()
            .expect("update_reply mutex poisoned")
            .clone();
        reply
            .unwrap_or_else(|| Reply::Ok(sample_post(id, user)))
            .into_result()
    }

    async fn delete_post(&self, id: i64, user: &str) -> PixelMindResult<()> {
        self.delete_calls
            .lock()
            .expect("delete_calls mutex poisoned")
            .push((id, user.to_string()));
        let reply = self
            .delete_reply
            .lock()
            .expect("delete_reply mutex poisoned")
            .clone();
        reply.unwrap_or(Reply::Ok(())).into_result()
    }

    async fn discover(&self, count: u32) -> PixelMindResult<Vec<DiscoverImage>> {
        self.discover_calls
            .lock()
            .expect("discover_calls mutex poisoned")
            .push(count);
        let gate = self
            .discover_gates
            .lock()
            .expect("discover_gates mutex poisoned")
            .pop_front();
        let reply = self
            .discover_replies
            .lock()
            .expect("discover_replies mutex poisoned")
            .pop_front();

        if let Some(gate) = gate {
            gate.notified().await;
        }

        match reply {
            Some(reply) => reply.into_result(),
            None => Ok(images(count as usize)),
        }
    }

    async fn health(&self) -> PixelMindResult<HealthStatus> {
        Ok(HealthStatus { ok: true, count: 0 })
    }
}

#[derive(Default)]
pub(crate) struct RecordingView {
    pub(crate) feed: Mutex<Vec<FeedState>>,
    pub(crate) discover: Mutex<Vec<DiscoverState>>,
    pub(crate) search: Mutex<Vec<SearchState>>,
    pub(crate) forms: Mutex<Vec<(FormKind, FormState)>>,
}

impl RecordingView {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn feed_statuses(&self) -> Vec<String> {
        self.feed
            .lock()
            .expect("feed mutex poisoned")
            .iter()
            .map(|state| state.status.clone())
            .collect()
    }

    pub(crate) fn form_statuses(&self, kind: FormKind) -> Vec<String> {
        self.forms
            .lock()
            .expect("forms mutex poisoned")
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, state)| state.status.clone())
            .collect()
    }
}

impl View for RecordingView {
    fn render_feed(&self, state: &FeedState) {
        self.feed
            .lock()
            .expect("feed mutex poisoned")
            .push(state.clone());
    }

    fn render_discover(&self, state: &DiscoverState) {
        self.discover
            .lock()
            .expect("discover mutex poisoned")
            .push(state.clone());
    }

    fn render_search(&self, state: &SearchState) {
        self.search
            .lock()
            .expect("search mutex poisoned")
            .push(state.clone());
    }

    fn render_form(&self, kind: FormKind, state: &FormState) {
        self.forms
            .lock()
            .expect("forms mutex poisoned")
            .push((kind, state.clone()));
    }
}

pub(crate) fn identity(name: &str) -> Identity {
    let identity = Identity::new(Arc::new(MemoryStore::new()));
    identity.set(name).expect("memory store never fails");
    identity
}

pub(crate) fn sample_post(id: i64, author: &str) -> Post {
    Post {
        id,
        title: format!("post {id}"),
        image: format!("img-seed/{id}.jpg"),
        description: Some(format!("description {id}")),
        url: None,
        tags: vec!["seed".to_string()],
        author: author.to_string(),
        alt: None,
        posted_at: Some("2025-10-24T00:00:00".to_string()),
    }
}

pub(crate) fn page_of(skip: u64, limit: u32, author: &str) -> Vec<Post> {
    (skip..skip + u64::from(limit))
        .map(|i| sample_post(i64::try_from(i + 1).expect("post id fits i64"), author))
        .collect()
}

pub(crate) fn images(count: usize) -> Vec<DiscoverImage> {
    (0..count)
        .map(|i| DiscoverImage {
            id: format!("img-{i}"),
            author: "Jane".to_string(),
            description: Some(format!("Picture {i}")),
            image_url: format!("https://images.example/{i}.jpg"),
            full_url: format!("https://images.example/{i}-full.jpg"),
        })
        .collect()
}
