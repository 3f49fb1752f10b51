//! Фоновое обновление кеша
//!
//! Задача по расписанию (раз в час) или по запросу:
//! - обновляет геоданные пользователя
//! - загружает полный список серверов, ранжирует его и публикует снимок
//! - загружает список стран по собственному сроку годности

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use vpnd_api::ServersApi;
use vpnd_core::rank::{rank_servers, seeded_rng};
use vpnd_core::Insights;

use crate::data_manager::DataManager;

/// Результат одного обновления
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Снимок ещё годен, обновление пропущено
    Skipped,
    /// Опубликован новый снимок
    Updated {
        /// Количество записей
        count: usize,
        /// Содержимое не изменилось с прошлого снимка
        unchanged: bool,
    },
}

/// Задача обновления кеша
pub struct RefreshJob {
    /// Удалённое API
    api: Arc<dyn ServersApi>,
    /// Хранилище снимков
    data: Arc<DataManager>,
    /// Срок годности снимка серверов
    servers_ttl: Duration,
    /// Срок годности списка стран
    countries_ttl: Duration,
}

impl RefreshJob {
    /// Создать задачу
    pub fn new(
        api: Arc<dyn ServersApi>,
        data: Arc<DataManager>,
        servers_ttl: Duration,
        countries_ttl: Duration,
    ) -> Self {
        Self {
            api,
            data,
            servers_ttl,
            countries_ttl,
        }
    }

    /// Обновить геоданные; при ошибке остаются последние известные
    pub async fn refresh_insights(&self) -> Insights {
        match self.api.insights().await {
            Ok(insights) => {
                debug!(
                    "Геоданные: {} ({:.3}, {:.3})",
                    insights.country_code, insights.latitude, insights.longitude
                );
                self.data.set_insights(insights.clone()).await;
                insights
            }
            Err(e) => {
                warn!("Не удалось обновить геоданные: {}", e);
                self.data.insights().await
            }
        }
    }

    /// Обновить снимок серверов
    pub async fn refresh_servers(&self, force: bool) -> anyhow::Result<RefreshOutcome> {
        let current = self.data.servers_data().await;
        if !force && current.is_valid(self.servers_ttl) {
            debug!("Снимок серверов ещё годен, обновление пропущено");
            return Ok(RefreshOutcome::Skipped);
        }

        let insights = self.refresh_insights().await;
        let fetched = self.api.servers().await?;
        if fetched.data.is_empty() {
            anyhow::bail!("API вернуло пустой список серверов, снимок не заменён");
        }
        let unchanged = !current.hash.is_empty() && current.hash == fetched.hash;
        if unchanged {
            debug!("Содержимое списка серверов не изменилось, пересчитываем штрафы");
        }

        // CPU работа, не на потоках обработки запросов
        let ranked = tokio::task::spawn_blocking(move || {
            let mut rng = seeded_rng();
            rank_servers(fetched.data, &insights, &mut rng)
        })
        .await?;

        let count = ranked.len();
        self.data
            .set_servers_data(Utc::now(), ranked, fetched.hash)
            .await?;

        info!("Кеш серверов обновлён: {} серверов", count);
        Ok(RefreshOutcome::Updated { count, unchanged })
    }

    /// Обновить список стран
    pub async fn refresh_countries(&self, force: bool) -> anyhow::Result<RefreshOutcome> {
        let current = self.data.country_data().await;
        if !force && current.is_valid(self.countries_ttl) {
            debug!("Список стран ещё годен, обновление пропущено");
            return Ok(RefreshOutcome::Skipped);
        }

        let fetched = self.api.servers_countries().await?;
        if fetched.data.is_empty() {
            anyhow::bail!("API вернуло пустой список стран, снимок не заменён");
        }
        let unchanged = !current.hash.is_empty() && current.hash == fetched.hash;
        let count = fetched.data.len();

        self.data
            .set_country_data(Utc::now(), fetched.data, fetched.hash)
            .await?;

        info!("Список стран обновлён: {} стран", count);
        Ok(RefreshOutcome::Updated { count, unchanged })
    }

    /// Один цикл: страны, затем серверы; ошибки логируются
    pub async fn run_once(&self, force: bool) {
        if let Err(e) = self.refresh_countries(force).await {
            error!("Ошибка обновления списка стран: {}", e);
        }
        if let Err(e) = self.refresh_servers(force).await {
            error!("Ошибка обновления кеша серверов: {}", e);
        }
    }

    /// Запустить периодическое обновление в отдельной задаче
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.run_once(false).await;
            }
        })
    }
}
