use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `pixelmind-client`.
pub enum PixelMindError {
    /// Ошибка HTTP-транспорта (`reqwest`): сеть, таймаут, декодирование.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Сервер запретил операцию (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Запрошенный ресурс не найден (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Любой другой не-2xx ответ. `message` предназначен только для логов.
    #[error("unexpected http status {status}: {message}")]
    Status {
        /// Код ответа.
        status: u16,
        /// Тело ответа сервера.
        message: String,
    },

    /// Некорректный запрос, собранный на стороне клиента.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Результат операций `pixelmind-client`.
pub type PixelMindResult<T> = Result<T, PixelMindError>;

impl PixelMindError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        match status {
            reqwest::StatusCode::FORBIDDEN => Self::Forbidden,
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            _ => {
                let message = message
                    .filter(|body| !body.trim().is_empty())
                    .unwrap_or_else(|| format!("http status {status}"));
                Self::Status {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }
}

#[derive(Debug, Error)]
/// Ошибки хранилищ ключ/значение.
pub enum StorageError {
    /// Ошибка файловой системы.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// Не удалось сериализовать значение.
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Недопустимый ключ (пустой или содержит разделитель пути).
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_403_maps_to_forbidden() {
        let err = PixelMindError::from_http_status(reqwest::StatusCode::FORBIDDEN, None);
        assert!(matches!(err, PixelMindError::Forbidden));
    }

    #[test]
    fn status_404_maps_to_not_found() {
        let err = PixelMindError::from_http_status(
            reqwest::StatusCode::NOT_FOUND,
            Some("Post no encontrado".to_string()),
        );
        assert!(matches!(err, PixelMindError::NotFound));
    }

    #[test]
    fn other_status_keeps_server_body() {
        let err = PixelMindError::from_http_status(
            reqwest::StatusCode::BAD_REQUEST,
            Some("El título es obligatorio".to_string()),
        );
        match err {
            PixelMindError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "El título es obligatorio");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn blank_body_falls_back_to_status_text() {
        let err = PixelMindError::from_http_status(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            Some("  ".to_string()),
        );
        match err {
            PixelMindError::Status { message, .. } => assert!(message.contains("500")),
            other => panic!("expected Status, got {other:?}"),
        }
    }
}
