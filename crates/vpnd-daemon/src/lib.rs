//! # VPND Daemon Library
//!
//! Демон выбора сервера VPN.
//!
//! Предоставляет API для:
//! - Фонового обновления кеша серверов и стран
//! - Выбора сервера по селектору пользователя
//! - Списков доступных стран, городов и групп

pub mod config;
pub mod data_manager;
pub mod listing;
pub mod refresh;
pub mod selection;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::DaemonConfig;
pub use data_manager::{CountryData, DataManager, ServersData};
pub use listing::ListingFilter;
pub use refresh::{RefreshJob, RefreshOutcome};
pub use selection::{SelectionRequest, ServerSelector};

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;
use vpnd_api::{HttpServersApi, ServersApi};
use vpnd_core::Server;

/// Демон: конфигурация, хранилище, обновление кеша и выбор сервера
pub struct Daemon {
    /// Конфигурация
    config: Arc<DaemonConfig>,
    /// Хранилище снимков
    data: Arc<DataManager>,
    /// Задача обновления кеша
    job: Arc<RefreshJob>,
    /// Выбор сервера
    selector: ServerSelector,
}

impl Daemon {
    /// Создать демона с HTTP клиентом API
    pub async fn new(config: DaemonConfig) -> anyhow::Result<Self> {
        let api = HttpServersApi::new(
            &config.api.base_url,
            config.request_timeout(),
            &config.api.user_agent,
        )?;
        Ok(Self::with_api(config, Arc::new(api)).await)
    }

    /// Создать демона с произвольной реализацией API
    pub async fn with_api(config: DaemonConfig, api: Arc<dyn ServersApi>) -> Self {
        let data = match &config.cache.cache_dir {
            Some(dir) => Arc::new(DataManager::with_storage(dir).await),
            None => Arc::new(DataManager::in_memory()),
        };

        let job = Arc::new(RefreshJob::new(
            Arc::clone(&api),
            Arc::clone(&data),
            config.servers_ttl(),
            config.countries_ttl(),
        ));

        let selector = ServerSelector::new(
            api,
            Arc::clone(&data),
            config.request_timeout(),
            config.selection.recommendation_limit,
        );

        Self {
            config: Arc::new(config),
            data,
            job,
            selector,
        }
    }

    /// Конфигурация
    pub fn config(&self) -> &DaemonConfig {
        &self.config
    }

    /// Хранилище снимков
    pub fn data(&self) -> &Arc<DataManager> {
        &self.data
    }

    /// Задача обновления кеша
    pub fn refresh_job(&self) -> &Arc<RefreshJob> {
        &self.job
    }

    /// Выбор сервера
    pub fn selector(&self) -> &ServerSelector {
        &self.selector
    }

    /// Запустить периодическое обновление кеша
    pub fn start_refresh(&self) -> JoinHandle<()> {
        info!(
            "Обновление кеша каждые {} сек",
            self.config.cache.refresh_interval_secs
        );
        Arc::clone(&self.job).spawn(self.config.refresh_interval())
    }

    /// Запрос выбора с настройками по умолчанию из конфигурации
    pub fn request(&self, selector: &str, group_flag: &str) -> SelectionRequest {
        SelectionRequest {
            selector: selector.to_string(),
            group_flag: group_flag.to_string(),
            technology: self.config.selection.technology,
            protocol: self.config.selection.protocol,
            obfuscated: self.config.selection.obfuscate,
            allow_virtual: self.config.selection.allow_virtual_servers,
        }
    }

    /// Фильтр списков по настройкам из конфигурации
    pub fn listing_filter(&self) -> anyhow::Result<ListingFilter> {
        Ok(ListingFilter {
            technology: self.config.server_technology()?,
            obfuscated: self.config.selection.obfuscate,
            allow_virtual: self.config.selection.allow_virtual_servers,
        })
    }

    /// Снимок серверов для списков
    pub async fn servers(&self) -> Arc<ServersData> {
        self.data.servers_data().await
    }

    /// Доступные страны
    pub async fn available_countries(&self) -> anyhow::Result<Vec<String>> {
        let filter = self.listing_filter()?;
        Ok(listing::available_countries(&self.servers().await.servers, &filter))
    }

    /// Доступные города страны
    pub async fn available_cities(&self, country: &str) -> anyhow::Result<Vec<String>> {
        let filter = self.listing_filter()?;
        Ok(listing::available_cities(
            &self.servers().await.servers,
            &filter,
            country,
        ))
    }

    /// Доступные группы
    pub async fn available_groups(&self) -> anyhow::Result<Vec<String>> {
        let filter = self.listing_filter()?;
        Ok(listing::available_groups(&self.servers().await.servers, &filter))
    }

    /// Выбрать один сервер
    pub async fn pick_server(&self, request: &SelectionRequest) -> vpnd_core::Result<(Server, bool)> {
        self.selector.pick_server(request).await
    }
}
