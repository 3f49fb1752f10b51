//! Типы ошибок удалённого API

use thiserror::Error;
use vpnd_core::SelectError;

/// Ошибки обращения к API
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Запрос не дошёл до сервера или соединение оборвалось
    #[error("Сетевая ошибка: {0}")]
    Network(String),

    /// Превышено время ожидания
    #[error("Превышено время ожидания ответа API")]
    Timeout,

    /// Сервер ответил не 2xx
    #[error("API вернул статус {status}: {body}")]
    Status {
        /// HTTP статус
        status: u16,
        /// Тело ответа
        body: String,
    },

    /// Тело ответа не разобрано
    #[error("Ошибка разбора ответа: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

impl From<ApiError> for SelectError {
    fn from(e: ApiError) -> Self {
        SelectError::Api(e.to_string())
    }
}

/// Псевдоним для Result с ApiError
pub type Result<T> = std::result::Result<T, ApiError>;
