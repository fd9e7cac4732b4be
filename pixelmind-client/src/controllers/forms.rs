use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use tracing::info;

use super::{InFlight, SubmitStatus};
use crate::api::PostsApi;
use crate::identity::Identity;
use crate::models::{NewPost, Post, PostPatch};
use crate::outcome::Outcome;
use crate::view::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Какая форма отрисовывается.
pub enum FormKind {
    /// Создание поста.
    Create,
    /// Редактирование поста.
    Update,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Поля формы в том виде, в каком их ввёл пользователь.
pub struct FormFields {
    /// Заголовок.
    pub title: String,
    /// URL изображения.
    pub image: String,
    /// Внешняя ссылка.
    pub url: String,
    /// Описание.
    pub description: String,
    /// Теги через запятую.
    pub tags: String,
}

impl FormFields {
    /// Заполняет поля из существующего поста.
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            image: post.image.clone(),
            url: post.url.clone().unwrap_or_default(),
            description: post.description.clone().unwrap_or_default(),
            tags: post.tags.join(", "),
        }
    }

    /// Проверяет обязательные поля и собирает тело запроса на создание.
    pub fn to_new_post(&self) -> Result<NewPost, &'static str> {
        let title = self.title.trim();
        let image = self.image.trim();
        if title.is_empty() || image.is_empty() {
            return Err("title and image URL are required");
        }

        Ok(NewPost {
            title: title.to_string(),
            image: image.to_string(),
            description: non_empty(&self.description),
            url: non_empty(&self.url),
            tags: parse_tags(&self.tags),
            alt: Some(title.to_string()),
        })
    }

    /// Частичное тело обновления: попадают только непустые поля.
    ///
    /// Пустое поле означает «не менять», поэтому очистить поле через
    /// форму нельзя.
    pub fn to_patch(&self) -> PostPatch {
        PostPatch {
            title: non_empty(&self.title),
            image: non_empty(&self.image),
            description: non_empty(&self.description),
            url: non_empty(&self.url),
            tags: non_empty(&self.tags).map(|raw| parse_tags(&raw)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Состояние формы, которое видит `View`.
pub struct FormState {
    /// Поля.
    pub fields: FormFields,
    /// Редактируемый пост (только для формы обновления).
    pub editing: Option<i64>,
    /// Строка статуса.
    pub status: String,
    /// Идёт отправка.
    pub saving: bool,
}

/// Разбирает строку тегов: разделитель `,`, пробелы обрезаются, пустые
/// элементы отбрасываются, порядок сохраняется.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

struct FormCell {
    kind: FormKind,
    view: Arc<dyn View>,
    state: Mutex<FormState>,
    in_flight: AtomicBool,
}

impl FormCell {
    fn new(kind: FormKind, view: Arc<dyn View>) -> Self {
        Self {
            kind,
            view,
            state: Mutex::new(FormState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    fn snapshot(&self) -> FormState {
        self.lock().clone()
    }

    fn update(&self, apply: impl FnOnce(&mut FormState)) {
        let mut state = self.lock();
        apply(&mut state);
        self.view.render_form(self.kind, &state);
    }

    fn set_status(&self, status: &str) {
        self.update(|state| state.status = status.to_string());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Форма создания поста.
pub struct CreatePostController<A> {
    api: Arc<A>,
    identity: Identity,
    cell: FormCell,
}

impl<A: PostsApi> CreatePostController<A> {
    /// Пустая форма.
    pub fn new(api: Arc<A>, identity: Identity, view: Arc<dyn View>) -> Self {
        Self {
            api,
            identity,
            cell: FormCell::new(FormKind::Create, view),
        }
    }

    /// Снимок состояния формы.
    pub fn snapshot(&self) -> FormState {
        self.cell.snapshot()
    }

    /// Заменяет поля формы.
    pub fn set_fields(&self, fields: FormFields) {
        self.cell.update(|state| state.fields = fields);
    }

    /// Проверяет поля и отправляет пост. При успехе поля очищаются;
    /// перезагрузку ленты выполняет вызывающая сторона.
    pub async fn submit(&self) -> SubmitStatus {
        let Some(_in_flight) = InFlight::acquire(&self.cell.in_flight) else {
            return SubmitStatus::Busy;
        };

        let new_post = match self.cell.snapshot().fields.to_new_post() {
            Ok(new_post) => new_post,
            Err(message) => {
                self.cell.set_status(message);
                return SubmitStatus::Rejected;
            }
        };

        self.cell.update(|state| {
            state.saving = true;
            state.status = "saving post...".to_string();
        });

        let user = self.identity.current();
        let result = self.api.create_post(&new_post, &user).await;

        match Outcome::from_result("create_post", result) {
            Outcome::Ok(post) => {
                info!(id = post.id, user = %user, "post created");
                self.cell.update(|state| {
                    state.fields = FormFields::default();
                    state.saving = false;
                    state.status = "post saved".to_string();
                });
                SubmitStatus::Saved(post)
            }
            Outcome::Forbidden | Outcome::NotFound | Outcome::Failed => {
                self.cell.update(|state| {
                    state.saving = false;
                    state.status = "could not save post".to_string();
                });
                SubmitStatus::Failed
            }
        }
    }
}

/// Форма редактирования поста, выбранного в ленте.
pub struct UpdatePostController<A> {
    api: Arc<A>,
    identity: Identity,
    cell: FormCell,
}

impl<A: PostsApi> UpdatePostController<A> {
    /// Форма без выбранного поста.
    pub fn new(api: Arc<A>, identity: Identity, view: Arc<dyn View>) -> Self {
        Self {
            api,
            identity,
            cell: FormCell::new(FormKind::Update, view),
        }
    }

    /// Снимок состояния формы.
    pub fn snapshot(&self) -> FormState {
        self.cell.snapshot()
    }

    /// Идентификатор редактируемого поста.
    pub fn editing_id(&self) -> Option<i64> {
        self.cell.lock().editing
    }

    /// Выбирает пост для редактирования и заполняет поля из него.
    pub fn start_editing(&self, post: &Post) {
        self.cell.update(|state| {
            state.editing = Some(post.id);
            state.fields = FormFields::from_post(post);
            state.status = format!("editing post #{}", post.id);
        });
    }

    /// Заменяет поля формы, не меняя выбранный пост.
    pub fn set_fields(&self, fields: FormFields) {
        self.cell.update(|state| state.fields = fields);
    }

    /// Сбрасывает выбор и поля.
    pub fn cancel(&self) {
        self.cell.update(|state| {
            state.editing = None;
            state.fields = FormFields::default();
            state.status = "edit cancelled".to_string();
        });
    }

    /// Отправляет частичное обновление выбранного поста.
    ///
    /// На 403/404 форма не меняется, чтобы пользователь мог исправить ввод.
    pub async fn submit(&self) -> SubmitStatus {
        let Some(_in_flight) = InFlight::acquire(&self.cell.in_flight) else {
            return SubmitStatus::Busy;
        };

        let FormState {
            fields, editing, ..
        } = self.cell.snapshot();
        let Some(id) = editing else {
            self.cell.set_status("select a post to edit first");
            return SubmitStatus::Rejected;
        };
        let patch = fields.to_patch();

        self.cell.update(|state| {
            state.saving = true;
            state.status = "updating post...".to_string();
        });

        let user = self.identity.current();
        let result = self.api.update_post(id, &patch, &user).await;

        let (status, message) = match Outcome::from_result("update_post", result) {
            Outcome::Ok(post) => {
                info!(id, user = %user, "post updated");
                self.cell.update(|state| {
                    state.editing = None;
                    state.fields = FormFields::default();
                    state.saving = false;
                    state.status = "post updated".to_string();
                });
                return SubmitStatus::Saved(post);
            }
            Outcome::Forbidden => (
                SubmitStatus::Forbidden,
                "you do not have permission to modify this post",
            ),
            Outcome::NotFound => (SubmitStatus::NotFound, "post not found"),
            Outcome::Failed => (SubmitStatus::Failed, "could not update post"),
        };

        self.cell.update(|state| {
            state.saving = false;
            state.status = message.to_string();
        });
        status
    }
}
