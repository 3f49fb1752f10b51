//! API в памяти и конструкторы данных для тестов демона

use async_trait::async_trait;
use std::sync::Mutex;
use vpnd_api::http::content_hash;
use vpnd_api::{ApiError, Fetched, ServersApi};
use vpnd_core::models::{
    City, Group, GroupType, Location, LocationCountry, Pivot, ServerStatus, Technology,
};
use vpnd_core::{Country, Insights, Server, ServerGroup, ServerTechnology, ServersFilter};

/// Состояние поддельного API
#[derive(Debug)]
pub struct FakeState {
    pub servers: Vec<Server>,
    pub countries: Vec<Country>,
    pub recommended: Vec<Server>,
    pub insights: Insights,
    pub last_filter: Option<ServersFilter>,
    pub servers_calls: usize,
    pub countries_calls: usize,
    pub server_calls: usize,
    pub recommended_calls: usize,
    /// Все вызовы завершаются сетевой ошибкой
    pub offline: bool,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            countries: Vec::new(),
            recommended: Vec::new(),
            insights: Insights {
                longitude: 13.4,
                latitude: 52.5,
                country_code: "DE".to_string(),
            },
            last_filter: None,
            servers_calls: 0,
            countries_calls: 0,
            server_calls: 0,
            recommended_calls: 0,
            offline: false,
        }
    }
}

/// API в памяти
#[derive(Debug, Default)]
pub struct FakeApi {
    pub state: Mutex<FakeState>,
}

fn offline() -> ApiError {
    ApiError::Network("connection refused".to_string())
}

#[async_trait]
impl ServersApi for FakeApi {
    async fn recommended_servers(
        &self,
        filter: &ServersFilter,
        _longitude: f64,
        _latitude: f64,
    ) -> vpnd_api::Result<Vec<Server>> {
        let mut state = self.state.lock().unwrap();
        state.recommended_calls += 1;
        state.last_filter = Some(*filter);
        if state.offline {
            return Err(offline());
        }
        Ok(state.recommended.clone())
    }

    async fn server(&self, id: i64) -> vpnd_api::Result<Server> {
        let mut state = self.state.lock().unwrap();
        state.server_calls += 1;
        if state.offline {
            return Err(offline());
        }
        state
            .servers
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                body: String::new(),
            })
    }

    async fn servers(&self) -> vpnd_api::Result<Fetched<Vec<Server>>> {
        let mut state = self.state.lock().unwrap();
        state.servers_calls += 1;
        if state.offline {
            return Err(offline());
        }
        let body = serde_json::to_vec(&state.servers)?;
        Ok(Fetched {
            data: state.servers.clone(),
            hash: content_hash(&body),
        })
    }

    async fn servers_countries(&self) -> vpnd_api::Result<Fetched<Vec<Country>>> {
        let mut state = self.state.lock().unwrap();
        state.countries_calls += 1;
        if state.offline {
            return Err(offline());
        }
        let body = serde_json::to_vec(&state.countries)?;
        Ok(Fetched {
            data: state.countries.clone(),
            hash: content_hash(&body),
        })
    }

    async fn insights(&self) -> vpnd_api::Result<Insights> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(offline());
        }
        Ok(state.insights.clone())
    }
}

/// Германия с Берлином и Франкфуртом
pub fn germany() -> Country {
    Country {
        id: 81,
        name: "Germany".to_string(),
        code: "DE".to_string(),
        cities: vec![
            City {
                id: 2181,
                name: "Berlin".to_string(),
                latitude: 52.5,
                longitude: 13.4,
                hub_score: None,
            },
            City {
                id: 2215,
                name: "Frankfurt".to_string(),
                latitude: 50.1,
                longitude: 8.6,
                hub_score: None,
            },
        ],
    }
}

/// Великобритания (ISO код `GB`) с Лондоном
pub fn united_kingdom() -> Country {
    Country {
        id: 227,
        name: "United Kingdom".to_string(),
        code: "GB".to_string(),
        cities: vec![City {
            id: 4114,
            name: "London".to_string(),
            latitude: 51.5,
            longitude: -0.1,
            hub_score: None,
        }],
    }
}

/// Онлайн сервер `{prefix}.example.com` с WireGuard в группе Standard
pub fn online_server(id: i64, prefix: &str, country: &Country, load: i64) -> Server {
    let city = country.cities[0].clone();
    let technology = ServerTechnology::WireguardUdp;
    let group = ServerGroup::StandardVpnServers;

    Server {
        id,
        name: format!("{} #{}", country.name, id),
        hostname: format!("{}.example.com", prefix),
        created_at: "2020-01-01 00:00:00".to_string(),
        load,
        status: ServerStatus::Online,
        locations: vec![Location {
            latitude: city.latitude,
            longitude: city.longitude,
            country: LocationCountry {
                id: country.id,
                name: country.name.clone(),
                code: country.code.clone(),
                city,
            },
        }],
        technologies: vec![Technology {
            id: technology.id(),
            name: technology.to_string(),
            pivot: Pivot {
                status: ServerStatus::Online,
            },
        }],
        groups: vec![Group {
            id: group.id(),
            title: group.title().to_string(),
            kind: GroupType::default(),
        }],
        specifications: Vec::new(),
        distance: 0.0,
        timestamp: 0,
        penalty: 0.0,
        partial_penalty: 0.0,
        keys: Vec::new(),
    }
}
