use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::error::StorageError;
use crate::models::ANONYMOUS;
use crate::storage::{CURRENT_USER_KEY, KeyValueStore};

#[derive(Clone)]
/// Контекст текущего пользователя.
///
/// Передаётся в каждый контроллер при создании. Значение хранится в
/// сессионном хранилище, изменения рассылаются подписчикам через
/// `watch`-канал.
pub struct Identity {
    store: Arc<dyn KeyValueStore>,
    tx: Arc<watch::Sender<String>>,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("current", &*self.tx.borrow())
            .finish()
    }
}

impl Identity {
    /// Читает идентичность из сессионного хранилища.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let initial = match store.get(CURRENT_USER_KEY) {
            Ok(raw) => normalize(raw.as_deref()),
            Err(err) => {
                warn!(error = %err, "failed to read current user, falling back to anon");
                ANONYMOUS.to_string()
            }
        };
        let (tx, _rx) = watch::channel(initial);

        Self {
            store,
            tx: Arc::new(tx),
        }
    }

    /// Текущий пользователь; `"anon"`, если не задан.
    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    /// `true`, если пользователь не выбран.
    pub fn is_anonymous(&self) -> bool {
        *self.tx.borrow() == ANONYMOUS
    }

    /// Единственная точка изменения идентичности.
    ///
    /// Пустая строка (после trim) очищает значение и возвращает `"anon"`.
    pub fn set(&self, name: &str) -> Result<String, StorageError> {
        let name = name.trim();
        if name.is_empty() {
            self.store.remove(CURRENT_USER_KEY)?;
        } else {
            self.store.set(CURRENT_USER_KEY, name)?;
        }

        let current = normalize(Some(name));
        self.tx.send_replace(current.clone());
        Ok(current)
    }

    /// Подписка на изменения идентичности.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

fn normalize(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => ANONYMOUS.to_string(),
    }
}
