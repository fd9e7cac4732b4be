//! Контроллеры: состояние экранов и реакция на итоги запросов.

pub(crate) mod discover;
pub(crate) mod feed;
pub(crate) mod forms;
pub(crate) mod search;

use std::sync::atomic::{AtomicBool, Ordering};

use crate::models::Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Итог операции загрузки списка.
pub enum LoadStatus {
    /// Загружено `n` элементов.
    Loaded(usize),
    /// Запрос завершился ошибкой, прежние данные сохранены.
    Failed,
    /// Другая загрузка этого контроллера ещё выполняется; вызов проигнорирован.
    Busy,
    /// Ответ пришёл после более нового запроса и отброшен.
    Stale,
    /// Достигнут лимит, запрос не отправлялся.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Итог отправки формы.
pub enum SubmitStatus {
    /// Сервер принял изменения.
    Saved(Post),
    /// Локальная проверка не прошла, запрос не отправлялся.
    Rejected,
    /// Предыдущая отправка ещё выполняется.
    Busy,
    /// HTTP 403.
    Forbidden,
    /// HTTP 404.
    NotFound,
    /// Любая другая ошибка.
    Failed,
}

/// Флаг «запрос в полёте». Сбрасывается при drop, в том числе если
/// future был отменён.
pub(crate) struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
