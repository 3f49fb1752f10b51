//! # VPND API (vpnd-api)
//!
//! Граница с удалённым API серверов:
//! - рекомендации (ранжированный список под фильтр и координаты)
//! - отдельный сервер по ID
//! - полный список серверов и стран для кеша
//! - insights (геоданные пользователя)
//!
//! Трейт [`ServersApi`] является швом для тестов: демон работает с `Arc<dyn ServersApi>`,
//! а в тестах подставляется реализация в памяти.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod http;

use async_trait::async_trait;
use vpnd_core::{Country, Insights, Server, ServersFilter};

// Re-экспорт основных типов
pub use error::{ApiError, Result};
pub use http::HttpServersApi;

/// Ответ API вместе с хешем содержимого
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    /// Данные
    pub data: T,
    /// Хеш содержимого (заголовок `x-digest` или BLAKE3 тела)
    pub hash: String,
}

/// Удалённое API серверов
#[async_trait]
pub trait ServersApi: Send + Sync {
    /// Ранжированные рекомендации под фильтр и координаты пользователя
    async fn recommended_servers(
        &self,
        filter: &ServersFilter,
        longitude: f64,
        latitude: f64,
    ) -> Result<Vec<Server>>;

    /// Сервер по ID
    async fn server(&self, id: i64) -> Result<Server>;

    /// Полный список серверов
    async fn servers(&self) -> Result<Fetched<Vec<Server>>>;

    /// Страны с городами
    async fn servers_countries(&self) -> Result<Fetched<Vec<Country>>>;

    /// Геоданные пользователя
    async fn insights(&self) -> Result<Insights>;
}
