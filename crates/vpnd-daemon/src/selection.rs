//! Выбор сервера: разрешение селектора, получение кандидатов, выбор
//!
//! Сначала удалённый путь (рекомендации API или сервер по ID), при любой его
//! ошибке используется локальный кеш с эквивалентным фильтром. Ошибки ввода
//! возвращаются сразу, без fallback.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use vpnd_api::{ApiError, ServersApi};
use vpnd_core::filter::{apply_virtual_policy, local_candidates, pick_one, LocalQuery};
use vpnd_core::group::resolve_group;
use vpnd_core::rank::seeded_rng;
use vpnd_core::target::resolve_target;
use vpnd_core::{
    Country, Protocol, ResolvedTarget, Result, SelectError, Server, ServerGroup, ServerTechnology,
    ServersFilter, VpnTechnology,
};

use crate::data_manager::DataManager;

/// Запрос пользователя на выбор сервера
#[derive(Debug, Clone, Default)]
pub struct SelectionRequest {
    /// Селектор (страна, город, hostname, группа)
    pub selector: String,
    /// Явный флаг группы
    pub group_flag: String,
    /// Технология
    pub technology: VpnTechnology,
    /// Протокол
    pub protocol: Protocol,
    /// Обфускация
    pub obfuscated: bool,
    /// Разрешены ли виртуальные локации
    pub allow_virtual: bool,
}

/// Кандидаты и источник, из которого они получены
#[derive(Debug, Clone)]
pub struct Candidates {
    /// Серверы в порядке предпочтения
    pub servers: Vec<Server>,
    /// Получены ли они от удалённого API
    pub was_remote: bool,
}

/// Выбор сервера
pub struct ServerSelector {
    /// Удалённое API
    api: Arc<dyn ServersApi>,
    /// Хранилище снимков
    data: Arc<DataManager>,
    /// Предельное время одного удалённого вызова
    timeout: Duration,
    /// Лимит рекомендаций при выборе одного сервера
    recommendation_limit: usize,
}

impl ServerSelector {
    /// Создать селектор
    pub fn new(
        api: Arc<dyn ServersApi>,
        data: Arc<DataManager>,
        timeout: Duration,
        recommendation_limit: usize,
    ) -> Self {
        Self {
            api,
            data,
            timeout,
            recommendation_limit,
        }
    }

    /// Выбрать один сервер
    ///
    /// Среди нескольких кандидатов выбор случайный: клиенты, одновременно
    /// разрешающие популярный селектор, расходятся по разным серверам.
    pub async fn pick_server(&self, request: &SelectionRequest) -> Result<(Server, bool)> {
        let candidates = self.retrieve(request, self.recommendation_limit).await?;
        let server = pick_one(candidates.servers, &mut seeded_rng())?;

        info!(
            "Выбран сервер {} (штраф {:.4}, {})",
            server.hostname,
            server.penalty,
            if candidates.was_remote { "API" } else { "кеш" }
        );
        Ok((server, candidates.was_remote))
    }

    /// Получить до `count` кандидатов без случайного выбора
    pub async fn get_servers(
        &self,
        request: &SelectionRequest,
        count: usize,
    ) -> Result<(Vec<Server>, bool)> {
        let count = count.max(1);
        let mut candidates = self.retrieve(request, count).await?;
        candidates.servers.truncate(count);
        Ok((candidates.servers, candidates.was_remote))
    }

    /// Не более `limit` кандидатов после политики виртуальных серверов
    pub async fn retrieve(&self, request: &SelectionRequest, limit: usize) -> Result<Candidates> {
        let group = resolve_group(&request.group_flag, &request.selector)?;
        let technology =
            ServerTechnology::resolve(request.technology, request.protocol, request.obfuscated)?;
        let group_flag_set = !request.group_flag.trim().is_empty();

        // Пустой селектор и группа из селектора разрешаются без списка стран
        let needs_countries =
            !request.selector.trim().is_empty() && !(group.is_defined() && !group_flag_set);
        let countries = if needs_countries {
            self.countries().await
        } else {
            Vec::new()
        };

        let target = {
            let snapshot = self.data.servers_data().await;
            resolve_target(
                &countries,
                &request.selector,
                group,
                &snapshot.servers,
                group_flag_set,
            )
        };

        let remote = match target {
            Ok(target) => {
                debug!("Селектор '{}' разрешён в {}", request.selector, target);
                self.remote(target, group, technology, request.obfuscated, limit)
                    .await
            }
            Err(e) if e.is_input_error() => return Err(e),
            Err(e) => Err(e),
        };

        let (servers, was_remote) = match remote {
            Ok(servers) => (servers, true),
            Err(e) => {
                warn!("Удалённый выбор не удался, используем кеш: {}", e);
                let local = self.local(request, group, technology, limit).await;
                if local.is_empty() {
                    return Err(e);
                }
                (local, false)
            }
        };

        let servers = apply_virtual_policy(servers, request.allow_virtual)?;
        Ok(Candidates {
            servers,
            was_remote,
        })
    }

    /// Удалённый путь
    async fn remote(
        &self,
        target: ResolvedTarget,
        group: ServerGroup,
        technology: ServerTechnology,
        obfuscated: bool,
        limit: usize,
    ) -> Result<Vec<Server>> {
        if let ResolvedTarget::ByName(id) = target {
            let server = self.call(self.api.server(id)).await?;
            if !server.supports(technology) || server.is_obfuscated() != obfuscated {
                return Err(SelectError::ServerUnavailable { id });
            }
            return Ok(vec![server]);
        }

        let filter = ServersFilter::new(group, technology, target, limit);
        let insights = self.data.insights().await;
        let servers = self
            .call(
                self.api
                    .recommended_servers(&filter, insights.longitude, insights.latitude),
            )
            .await?;

        if servers.is_empty() {
            return Err(SelectError::EmptyRecommendation);
        }
        Ok(servers)
    }

    /// Локальный путь: снимок перечитывается, он мог обновиться
    async fn local(
        &self,
        request: &SelectionRequest,
        group: ServerGroup,
        technology: ServerTechnology,
        limit: usize,
    ) -> Vec<Server> {
        let snapshot = self.data.servers_data().await;
        let query = LocalQuery {
            tag: &request.selector,
            group,
            technology,
            obfuscated: request.obfuscated,
        };

        let mut servers = local_candidates(&snapshot.servers, &query);
        servers.truncate(limit);
        servers
    }

    /// Список стран; пустой кеш заполняется запросом к API
    async fn countries(&self) -> Vec<Country> {
        let cached = self.data.country_data().await;
        if !cached.countries.is_empty() {
            return cached.countries.clone();
        }

        match self.call(self.api.servers_countries()).await {
            Ok(fetched) => {
                let countries = fetched.data.clone();
                if let Err(e) = self
                    .data
                    .set_country_data(chrono::Utc::now(), fetched.data, fetched.hash)
                    .await
                {
                    warn!("Не удалось сохранить список стран: {}", e);
                }
                countries
            }
            Err(e) => {
                warn!("Не удалось загрузить список стран: {}", e);
                Vec::new()
            }
        }
    }

    /// Удалённый вызов с предельным временем
    async fn call<T>(
        &self,
        request: impl Future<Output = vpnd_api::Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result.map_err(SelectError::from),
            Err(_) => Err(ApiError::Timeout.into()),
        }
    }
}
