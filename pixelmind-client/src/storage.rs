//! Хранилища ключ/значение: долговременное (кэш ленты) и сессионное
//! (текущий пользователь).

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::StorageError;

/// Ключ сериализованной последней загруженной страницы ленты.
pub const FEED_CACHE_KEY: &str = "feed_cache_posts";
/// Ключ времени последней успешной загрузки ленты (RFC 3339).
pub const FEED_LAST_FETCH_KEY: &str = "feed_last_fetch";
/// Ключ текущей идентичности в сессионном хранилище.
pub const CURRENT_USER_KEY: &str = "current_user";

/// Простое строковое хранилище.
pub trait KeyValueStore: Send + Sync {
    /// Возвращает значение или `None`, если ключа нет.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Записывает значение.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Удаляет ключ; отсутствие ключа не ошибка.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
/// Хранилище в памяти процесса.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Пустое хранилище.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Хранилище на диске: один файл на ключ внутри каталога.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Хранилище в каталоге `dir`; каталог создаётся при первой записи.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
