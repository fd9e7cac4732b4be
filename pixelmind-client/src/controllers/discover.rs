use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::debug;

use super::{InFlight, LoadStatus};
use crate::api::PostsApi;
use crate::card::PostCard;
use crate::models::DiscoverImage;
use crate::outcome::Outcome;
use crate::view::View;

/// Максимум изображений за один цикл discover.
pub const DISCOVER_MAX: u32 = 27;
/// Сколько изображений запрашивается за раз.
pub const DISCOVER_CHUNK: u32 = 9;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Состояние discover, которое видит `View`.
pub struct DiscoverState {
    /// Накопленные карточки.
    pub items: Vec<PostCard>,
    /// Сколько изображений загружено в текущем цикле.
    pub loaded: u32,
    /// Строка статуса.
    pub status: String,
    /// Идёт загрузка.
    pub loading: bool,
}

impl DiscoverState {
    /// Можно ли догрузить ещё изображения.
    pub fn can_load_more(&self) -> bool {
        self.loaded < DISCOVER_MAX
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadMode {
    Replace,
    Append,
}

/// Лента discover: первая порция, догрузка до лимита и перезагрузка.
pub struct DiscoverController<A> {
    api: Arc<A>,
    view: Arc<dyn View>,
    state: Mutex<DiscoverState>,
    in_flight: AtomicBool,
}

impl<A: PostsApi> DiscoverController<A> {
    /// Пустой discover; первую порцию нужно запросить через `load_first`.
    pub fn new(api: Arc<A>, view: Arc<dyn View>) -> Self {
        Self {
            api,
            view,
            state: Mutex::new(DiscoverState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Снимок текущего состояния.
    pub fn snapshot(&self) -> DiscoverState {
        self.lock().clone()
    }

    /// Сколько изображений загружено.
    pub fn loaded(&self) -> u32 {
        self.lock().loaded
    }

    /// Можно ли догрузить ещё изображения.
    pub fn can_load_more(&self) -> bool {
        self.lock().can_load_more()
    }

    /// Первая порция: заменяет показанные карточки.
    pub async fn load_first(&self) -> LoadStatus {
        self.load(LoadMode::Replace).await
    }

    /// Следующая порция `min(9, 27 - loaded)`, добавляется в конец.
    pub async fn load_more(&self) -> LoadStatus {
        self.load(LoadMode::Append).await
    }

    /// Сбрасывает карточки и счётчик, затем загружает первую порцию.
    pub async fn reload(&self) -> LoadStatus {
        let Some(in_flight) = InFlight::acquire(&self.in_flight) else {
            debug!("discover reload while a load is in progress");
            return LoadStatus::Busy;
        };
        self.update(|state| {
            state.items.clear();
            state.loaded = 0;
        });
        self.run(in_flight, LoadMode::Replace).await
    }

    async fn load(&self, mode: LoadMode) -> LoadStatus {
        let Some(in_flight) = InFlight::acquire(&self.in_flight) else {
            debug!(?mode, "discover load already in progress");
            return LoadStatus::Busy;
        };
        self.run(in_flight, mode).await
    }

    /// Флаг `in_flight` уже взят вызывающей стороной и держится до конца загрузки.
    async fn run(&self, _in_flight: InFlight<'_>, mode: LoadMode) -> LoadStatus {
        let count = match mode {
            LoadMode::Replace => DISCOVER_CHUNK,
            LoadMode::Append => {
                let loaded = self.loaded();
                if loaded >= DISCOVER_MAX {
                    self.update(|state| state.status = "all images loaded".to_string());
                    return LoadStatus::Exhausted;
                }
                DISCOVER_CHUNK.min(DISCOVER_MAX - loaded)
            }
        };

        self.update(|state| {
            if mode == LoadMode::Replace {
                state.loaded = 0;
            }
            state.loading = true;
            state.status = "loading images...".to_string();
        });

        let result = self.api.discover(count).await;
        let status = self.apply(mode, count, Outcome::from_result("discover", result));

        self.update(|state| state.loading = false);
        status
    }

    fn apply(
        &self,
        mode: LoadMode,
        requested: u32,
        outcome: Outcome<Vec<DiscoverImage>>,
    ) -> LoadStatus {
        let Outcome::Ok(mut images) = outcome else {
            self.update(|state| state.status = "could not load images".to_string());
            return LoadStatus::Failed;
        };

        if images.len() > requested as usize {
            debug!(
                requested,
                returned = images.len(),
                "discover returned more images than requested"
            );
            images.truncate(requested as usize);
        }

        let now = Utc::now();
        let cards: Vec<PostCard> = images.iter().map(|image| image.to_card(now)).collect();
        let count = cards.len();

        self.update(|state| {
            match mode {
                LoadMode::Replace => {
                    state.items = cards;
                    state.loaded = count as u32;
                }
                LoadMode::Append => {
                    state.items.extend(cards);
                    state.loaded = (state.loaded + count as u32).min(DISCOVER_MAX);
                }
            }
            state.status = format!("loaded {} images (max {DISCOVER_MAX})", state.loaded);
        });
        LoadStatus::Loaded(count)
    }

    fn update(&self, apply: impl FnOnce(&mut DiscoverState)) {
        let mut state = self.lock();
        apply(&mut state);
        self.view.render_discover(&state);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DiscoverState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
