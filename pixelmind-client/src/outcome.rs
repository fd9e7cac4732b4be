use tracing::error;

use crate::error::{PixelMindError, PixelMindResult};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Тегированный итог обращения к API, который потребляют контроллеры.
///
/// Ошибки транспорта и сервера не выходят за границу контроллера:
/// они сворачиваются в `Failed`, а подробности пишутся в лог.
pub enum Outcome<T> {
    /// Запрос выполнен успешно.
    Ok(T),
    /// HTTP 403.
    Forbidden,
    /// HTTP 404.
    NotFound,
    /// Любая другая ошибка (не-2xx, сеть, декодирование).
    Failed,
}

impl<T> Outcome<T> {
    /// Сворачивает результат вызова API в `Outcome`, логируя причину сбоя.
    pub fn from_result(operation: &'static str, result: PixelMindResult<T>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(PixelMindError::Forbidden) => Self::Forbidden,
            Err(PixelMindError::NotFound) => Self::NotFound,
            Err(err) => {
                error!(operation, error = %err, "request failed");
                Self::Failed
            }
        }
    }

    /// `true`, если запрос выполнен успешно.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}
