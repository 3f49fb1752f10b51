//! HTTP клиент API серверов

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use vpnd_core::{Country, Insights, ResolvedTarget, Server, ServerGroup, ServersFilter};

use crate::error::{ApiError, Result};
use crate::{Fetched, ServersApi};

/// Заголовок с хешем содержимого
pub const DIGEST_HEADER: &str = "x-digest";

/// Лимит для запроса полного списка серверов
const ALL_SERVERS_LIMIT: usize = 1 << 30;

/// HTTP реализация [`ServersApi`]
pub struct HttpServersApi {
    client: Client,
    base_url: String,
}

impl HttpServersApi {
    /// Создать клиент
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Response> {
        let url = self.url(path);
        debug!("GET {} {:?}", url, query);

        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Запрос {} завершился ошибкой: {} - {}", path, status, body);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T> {
        let response = self.get(path, query).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_hashed<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Fetched<T>> {
        let response = self.get(path, query).await?;
        let digest = response
            .headers()
            .get(DIGEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?;
        let hash = digest.unwrap_or_else(|| content_hash(&bytes));
        let data = serde_json::from_slice(&bytes)?;

        Ok(Fetched { data, hash })
    }
}

/// BLAKE3 хеш тела ответа в hex
pub fn content_hash(body: &[u8]) -> String {
    hex::encode(blake3::hash(body).as_bytes())
}

/// Параметры запроса рекомендаций
pub fn recommendation_query(
    filter: &ServersFilter,
    longitude: f64,
    latitude: f64,
) -> Vec<(String, String)> {
    let mut query = vec![
        ("limit".to_string(), filter.limit.to_string()),
        (
            "filters[servers_technologies][id]".to_string(),
            filter.technology.id().to_string(),
        ),
    ];

    if filter.group != ServerGroup::Undefined {
        query.push((
            "filters[servers_groups][id]".to_string(),
            filter.group.id().to_string(),
        ));
    }

    match filter.target {
        ResolvedTarget::ByCountry(id) => {
            query.push(("filters[country_id]".to_string(), id.to_string()));
        }
        ResolvedTarget::ByCity(id) => {
            query.push(("filters[country_city_id]".to_string(), id.to_string()));
        }
        ResolvedTarget::Unknown | ResolvedTarget::BySpeed(_) | ResolvedTarget::ByName(_) => {}
    }

    query.push(("coordinates[longitude]".to_string(), longitude.to_string()));
    query.push(("coordinates[latitude]".to_string(), latitude.to_string()));

    query
}

#[async_trait]
impl ServersApi for HttpServersApi {
    async fn recommended_servers(
        &self,
        filter: &ServersFilter,
        longitude: f64,
        latitude: f64,
    ) -> Result<Vec<Server>> {
        let query = recommendation_query(filter, longitude, latitude);
        self.get_json("/v1/servers/recommendations", &query).await
    }

    async fn server(&self, id: i64) -> Result<Server> {
        self.get_json(&format!("/v1/servers/{}", id), &[]).await
    }

    async fn servers(&self) -> Result<Fetched<Vec<Server>>> {
        let query = [("limit".to_string(), ALL_SERVERS_LIMIT.to_string())];
        self.get_hashed("/v1/servers", &query).await
    }

    async fn servers_countries(&self) -> Result<Fetched<Vec<Country>>> {
        self.get_hashed("/v1/servers/countries", &[]).await
    }

    async fn insights(&self) -> Result<Insights> {
        self.get_json("/v1/helpers/ips/insights", &[]).await
    }
}
