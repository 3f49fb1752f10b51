//! Хранилище снимков серверов, стран и геоданных
//!
//! Снимок заменяется целиком: читатели получают `Arc` на прежний или на новый
//! полный снимок, но никогда на частично записанный.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use vpnd_core::{Country, Insights, Server};

/// Файл снимка серверов
const SERVERS_FILE: &str = "servers.json";

/// Файл снимка стран
const COUNTRIES_FILE: &str = "countries.json";

/// Снимок серверов
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServersData {
    /// Время публикации
    pub updated_at: Option<DateTime<Utc>>,
    /// Серверы, отсортированные по штрафу
    pub servers: Vec<Server>,
    /// Хеш содержимого ответа API
    pub hash: String,
}

/// Снимок стран
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CountryData {
    /// Время публикации
    pub updated_at: Option<DateTime<Utc>>,
    /// Страны с городами
    pub countries: Vec<Country>,
    /// Хеш содержимого ответа API
    pub hash: String,
}

/// Не истёк ли срок годности снимка
fn is_fresh(updated_at: Option<DateTime<Utc>>, ttl: Duration) -> bool {
    let Some(updated_at) = updated_at else {
        return false;
    };
    let Ok(ttl) = chrono::Duration::from_std(ttl) else {
        return false;
    };
    Utc::now() - updated_at < ttl
}

impl ServersData {
    /// Снимок не пуст и не старше `ttl`
    pub fn is_valid(&self, ttl: Duration) -> bool {
        !self.servers.is_empty() && is_fresh(self.updated_at, ttl)
    }
}

impl CountryData {
    /// Снимок не пуст и не старше `ttl`
    pub fn is_valid(&self, ttl: Duration) -> bool {
        !self.countries.is_empty() && is_fresh(self.updated_at, ttl)
    }
}

/// Хранилище снимков
pub struct DataManager {
    /// Снимок серверов
    servers: RwLock<Arc<ServersData>>,
    /// Снимок стран
    countries: RwLock<Arc<CountryData>>,
    /// Последние известные геоданные пользователя
    insights: RwLock<Insights>,
    /// Каталог для сохранения снимков
    storage_dir: Option<PathBuf>,
}

impl DataManager {
    /// Хранилище только в памяти
    pub fn in_memory() -> Self {
        Self {
            servers: RwLock::new(Arc::new(ServersData::default())),
            countries: RwLock::new(Arc::new(CountryData::default())),
            insights: RwLock::new(Insights::default()),
            storage_dir: None,
        }
    }

    /// Хранилище с сохранением в каталог; существующие снимки загружаются
    ///
    /// Повреждённый файл не мешает старту: снимок остаётся пустым.
    pub async fn with_storage(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let servers: ServersData = load_snapshot(&dir.join(SERVERS_FILE)).await;
        let countries: CountryData = load_snapshot(&dir.join(COUNTRIES_FILE)).await;

        info!(
            "Загружен кеш из {}: {} серверов, {} стран",
            dir.display(),
            servers.servers.len(),
            countries.countries.len()
        );

        Self {
            servers: RwLock::new(Arc::new(servers)),
            countries: RwLock::new(Arc::new(countries)),
            insights: RwLock::new(Insights::default()),
            storage_dir: Some(dir),
        }
    }

    /// Текущий снимок серверов
    pub async fn servers_data(&self) -> Arc<ServersData> {
        Arc::clone(&*self.servers.read().await)
    }

    /// Опубликовать новый снимок серверов
    ///
    /// Снимок в памяти заменяется сразу; ошибка возвращается только если его
    /// не удалось сохранить на диск.
    pub async fn set_servers_data(
        &self,
        updated_at: DateTime<Utc>,
        servers: Vec<Server>,
        hash: String,
    ) -> anyhow::Result<()> {
        let data = Arc::new(ServersData {
            updated_at: Some(updated_at),
            servers,
            hash,
        });

        *self.servers.write().await = Arc::clone(&data);
        debug!("Опубликован снимок серверов: {}", data.servers.len());

        self.persist(SERVERS_FILE, data.as_ref()).await
    }

    /// Текущий снимок стран
    pub async fn country_data(&self) -> Arc<CountryData> {
        Arc::clone(&*self.countries.read().await)
    }

    /// Опубликовать новый снимок стран
    pub async fn set_country_data(
        &self,
        updated_at: DateTime<Utc>,
        countries: Vec<Country>,
        hash: String,
    ) -> anyhow::Result<()> {
        let data = Arc::new(CountryData {
            updated_at: Some(updated_at),
            countries,
            hash,
        });

        *self.countries.write().await = Arc::clone(&data);
        debug!("Опубликован снимок стран: {}", data.countries.len());

        self.persist(COUNTRIES_FILE, data.as_ref()).await
    }

    /// Последние известные геоданные
    pub async fn insights(&self) -> Insights {
        self.insights.read().await.clone()
    }

    /// Обновить геоданные
    pub async fn set_insights(&self, insights: Insights) {
        *self.insights.write().await = insights;
    }

    /// Атомарно записать снимок: временный файл, затем rename
    async fn persist<T: Serialize>(&self, file: &str, data: &T) -> anyhow::Result<()> {
        let Some(dir) = &self.storage_dir else {
            return Ok(());
        };

        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(file);
        let tmp = dir.join(format!("{}.tmp", file));
        let content = serde_json::to_vec(data)?;

        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

impl Default for DataManager {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Прочитать снимок с диска; отсутствующий или повреждённый файл даёт пустой снимок
async fn load_snapshot<T: DeserializeOwned + Default>(path: &Path) -> T {
    let content = match tokio::fs::read(path).await {
        Ok(content) => content,
        Err(e) => {
            debug!("Снимок {} не прочитан: {}", path.display(), e);
            return T::default();
        }
    };

    match serde_json::from_slice(&content) {
        Ok(data) => data,
        Err(e) => {
            warn!("Снимок {} повреждён: {}", path.display(), e);
            T::default()
        }
    }
}
