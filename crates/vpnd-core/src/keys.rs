//! Ключи поиска сервера
//!
//! Ключи строятся при обновлении кеша и используются локальным фильтром:
//! селектор пользователя совпадает с сервером, если он есть среди ключей.

use crate::models::Server;
use crate::text::normalize;

/// Код страны в том виде, в каком его вводит пользователь (`gb` → `uk`)
pub fn display_country_code(code: &str) -> String {
    let code = code.to_lowercase();
    if code == "gb" {
        "uk".to_string()
    } else {
        code
    }
}

/// Заменить код страны `from` на `to`, если ключ целиком равен коду или
/// начинается с него (`gb_london` → `uk_london`)
pub fn replace_leading_code(key: String, from: &str, to: &str) -> String {
    if key == from {
        return to.to_string();
    }
    match key.strip_prefix(from).and_then(|rest| rest.strip_prefix('_')) {
        Some(rest) => format!("{}_{}", to, rest),
        None => key,
    }
}

/// Селектор в форме ключа: ведущий `gb` приводится к `uk`, как в ключах
pub fn tag_key(selector: &str) -> String {
    replace_leading_code(normalize(selector), "gb", "uk")
}

/// Построить ключи сервера
///
/// Страна, код страны, "страна город", "код город", город, префикс hostname
/// и названия всех групп; без повторов.
pub fn build_keys(server: &Server) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let mut push = |key: String| {
        if !key.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    };

    for location in &server.locations {
        let country = normalize(&location.country.name);
        let code = display_country_code(&location.country.code);
        let city = normalize(&location.country.city.name);

        push(country.clone());
        push(code.clone());
        push(format!("{}_{}", country, city));
        push(format!("{}_{}", code, city));
        push(city);
    }

    push(server.hostname_prefix().to_lowercase());

    for title in server.group_titles() {
        push(title);
    }

    keys
}
