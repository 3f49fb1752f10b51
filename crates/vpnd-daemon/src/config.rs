//! Конфигурация демона
//!
//! Этот модуль отвечает за загрузку и валидацию конфигурации демона.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vpnd_core::{Protocol, ServerTechnology, VpnTechnology};

/// Конфигурация демона
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DaemonConfig {
    /// Настройки API
    #[serde(default)]
    pub api: ApiConfig,

    /// Настройки кеша серверов
    #[serde(default)]
    pub cache: CacheConfig,

    /// Настройки выбора сервера
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Настройки логирования
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Настройки API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Базовый URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Таймаут запроса (секунды)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Настройки кеша
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Каталог для снимков (не задан: кеш только в памяти)
    #[serde(default = "default_cache_dir")]
    pub cache_dir: Option<PathBuf>,

    /// Срок годности снимка серверов (секунды)
    #[serde(default = "default_servers_ttl")]
    pub servers_ttl_secs: u64,

    /// Срок годности списка стран (секунды)
    #[serde(default = "default_countries_ttl")]
    pub countries_ttl_secs: u64,

    /// Период фонового обновления (секунды)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

/// Настройки выбора сервера по умолчанию
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Технология
    #[serde(default)]
    pub technology: VpnTechnology,

    /// Протокол
    #[serde(default)]
    pub protocol: Protocol,

    /// Обфускация
    #[serde(default)]
    pub obfuscate: bool,

    /// Разрешены ли виртуальные локации
    #[serde(default = "default_allow_virtual")]
    pub allow_virtual_servers: bool,

    /// Сколько рекомендаций запрашивать при выборе одного сервера
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,
}

/// Настройки логирования
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Уровень логирования (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Значения по умолчанию
fn default_base_url() -> String {
    "https://api.example.com".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("vpnd/{}", env!("CARGO_PKG_VERSION"))
}

fn default_cache_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        Some(PathBuf::from("C:\\ProgramData\\vpnd"))
    }
    #[cfg(not(windows))]
    {
        Some(PathBuf::from("/var/lib/vpnd"))
    }
}

fn default_servers_ttl() -> u64 {
    60 * 60
}

fn default_countries_ttl() -> u64 {
    24 * 60 * 60
}

fn default_refresh_interval() -> u64 {
    60 * 60
}

fn default_allow_virtual() -> bool {
    true
}

fn default_recommendation_limit() -> usize {
    vpnd_core::filter::DEFAULT_RECOMMENDATION_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            servers_ttl_secs: default_servers_ttl(),
            countries_ttl_secs: default_countries_ttl(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            technology: VpnTechnology::default(),
            protocol: Protocol::default(),
            obfuscate: false,
            allow_virtual_servers: default_allow_virtual(),
            recommendation_limit: default_recommendation_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Загрузить конфигурацию из TOML файла
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Сохранить конфигурацию в TOML файл
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), anyhow::Error> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Валидация конфигурации
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.api.base_url.trim().is_empty() {
            anyhow::bail!("Базовый URL API не может быть пустым");
        }

        if self.api.request_timeout_secs == 0 {
            anyhow::bail!("Таймаут запроса не может быть 0");
        }

        if self.cache.servers_ttl_secs == 0 || self.cache.countries_ttl_secs == 0 {
            anyhow::bail!("Срок годности кеша не может быть 0");
        }

        if self.cache.refresh_interval_secs == 0 {
            anyhow::bail!("Период обновления кеша не может быть 0");
        }

        if self.selection.recommendation_limit == 0 {
            anyhow::bail!("Лимит рекомендаций не может быть 0");
        }

        // Комбинация технологии по умолчанию должна существовать
        self.server_technology()?;

        Ok(())
    }

    /// Возможность сервера для настроек по умолчанию
    pub fn server_technology(&self) -> Result<ServerTechnology, anyhow::Error> {
        Ok(ServerTechnology::resolve(
            self.selection.technology,
            self.selection.protocol,
            self.selection.obfuscate,
        )?)
    }

    /// Таймаут запроса к API
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    /// Срок годности снимка серверов
    pub fn servers_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.servers_ttl_secs)
    }

    /// Срок годности списка стран
    pub fn countries_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.countries_ttl_secs)
    }

    /// Период фонового обновления
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.cache.refresh_interval_secs)
    }
}
