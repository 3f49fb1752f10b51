//! Разрешение селектора пользователя в конкретную цель
//!
//! Порядок строгий и одинаков для удалённого и локального пути:
//! группа из селектора → страна → город → "страна город" → hostname →
//! проверка шаблона тега.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SelectError};
use crate::group::ServerGroup;
use crate::keys::replace_leading_code;
use crate::models::{Country, Server};
use crate::text::normalize;

/// Результат разрешения селектора
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolvedTarget {
    /// Селектор не задан
    Unknown,
    /// Только группа, без уточнения локации
    BySpeed(ServerGroup),
    /// Страна (ID)
    ByCountry(i64),
    /// Город (ID)
    ByCity(i64),
    /// Конкретный сервер (ID)
    ByName(i64),
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedTarget::Unknown => write!(f, "unknown"),
            ResolvedTarget::BySpeed(group) => write!(f, "group:{}", group),
            ResolvedTarget::ByCountry(id) => write!(f, "country:{}", id),
            ResolvedTarget::ByCity(id) => write!(f, "city:{}", id),
            ResolvedTarget::ByName(id) => write!(f, "server:{}", id),
        }
    }
}

/// Две латинские буквы и 2-4 цифры (`de1234`)
fn server_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z]{2}[0-9]{2,4}$").expect("валидный шаблон тега"))
}

/// Похож ли селектор на тег сервера
pub fn looks_like_server_tag(selector: &str) -> bool {
    server_tag_pattern().is_match(selector)
}

/// Нормализованный селектор для сравнения с именами стран
///
/// Ведущий код `uk` приводится к ISO `gb`: `uk` → `gb`, `uk london` → `gb_london`.
pub fn selector_key(selector: &str) -> String {
    replace_leading_code(normalize(selector), "uk", "gb")
}

/// Разрешить селектор в цель
///
/// `group_flag_set`: группа пришла из явного флага, а не из селектора.
/// Список стран должен быть уже загружен; ленивую загрузку делает вызывающая
/// сторона.
pub fn resolve_target(
    countries: &[Country],
    selector: &str,
    group: ServerGroup,
    servers: &[Server],
    group_flag_set: bool,
) -> Result<ResolvedTarget> {
    if selector.trim().is_empty() {
        return Ok(ResolvedTarget::Unknown);
    }

    // Селектор сам является группой: страну и город искать не нужно
    if group.is_defined() && !group_flag_set {
        return Ok(ResolvedTarget::BySpeed(group));
    }

    let key = selector_key(selector);

    for country in countries {
        let country_name = normalize(&country.name);
        let country_code = country.code.to_lowercase();

        if key == country_code || key == country_name {
            debug!("Селектор '{}' → страна {} ({})", selector, country.name, country.id);
            return Ok(ResolvedTarget::ByCountry(country.id));
        }

        for city in &country.cities {
            let city_name = normalize(&city.name);
            if key == city_name
                || key == format!("{}_{}", country_name, city_name)
                || key == format!("{}_{}", country_code, city_name)
            {
                debug!("Селектор '{}' → город {} ({})", selector, city.name, city.id);
                return Ok(ResolvedTarget::ByCity(city.id));
            }
        }
    }

    if let Some(server) = servers.iter().find(|s| s.hostname_prefix() == key) {
        debug!("Селектор '{}' → сервер {}", selector, server.hostname);
        return Ok(ResolvedTarget::ByName(server.id));
    }

    if looks_like_server_tag(&key) {
        // Сервер мог появиться после последнего обновления кеша
        Err(SelectError::Unresolved(selector.to_string()))
    } else {
        Err(SelectError::TagDoesNotExist(selector.to_string()))
    }
}
