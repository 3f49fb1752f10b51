//! Двухпроходное ранжирование снимка серверов
//!
//! Проход 1 считает расстояние, время создания, ключи и глобальные границы.
//! Проход 2 считает штрафы по этим границам. Штраф сервера имеет смысл только
//! внутри того цикла обновления, который посчитал его границы.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::geo;
use crate::keys::build_keys;
use crate::models::{Insights, Server};
use crate::penalty::{penalty, Bounds, PenaltyInput, MAX_JITTER};

/// Формат `created_at` в API
const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Границы, посчитанные в первом проходе
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankBounds {
    /// Границы расстояния
    pub distance: Bounds,
    /// Границы времени создания
    pub age: Bounds,
}

/// Локальный генератор, засеянный текущим временем
///
/// Генератор создаётся на каждый вызов и не разделяется между запросами.
pub fn seeded_rng() -> StdRng {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    StdRng::seed_from_u64(nanos)
}

/// Разобрать `created_at` в Unix секунды
pub fn parse_created_at(value: &str) -> Option<i64> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, CREATED_AT_FORMAT) {
        return Some(Utc.from_utc_datetime(&naive).timestamp());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.timestamp())
}

/// Проход 1: производные поля и глобальные границы
pub fn compute_bounds(servers: &mut [Server], insights: &Insights) -> RankBounds {
    let mut bounds = RankBounds {
        distance: Bounds::empty(),
        age: Bounds::empty(),
    };

    for server in servers.iter_mut() {
        if let Some(location) = server.location() {
            server.distance = geo::distance(
                insights.latitude,
                insights.longitude,
                location.latitude,
                location.longitude,
            );
            bounds.distance.observe(server.distance);
        }

        match parse_created_at(&server.created_at) {
            Some(timestamp) => {
                server.timestamp = timestamp;
                bounds.age.observe(timestamp as f64);
            }
            None => {
                warn!(
                    "Некорректная дата создания сервера {}: '{}'",
                    server.hostname, server.created_at
                );
                server.timestamp = 0;
            }
        }

        server.keys = build_keys(server);
    }

    bounds
}

/// Проход 2: штрафы по готовым границам
pub fn assign_penalties<R: Rng>(
    servers: &mut [Server],
    insights: &Insights,
    bounds: &RankBounds,
    rng: &mut R,
) {
    for server in servers.iter_mut() {
        let server_country = server.country_code();
        let hub_score = server
            .location()
            .and_then(|l| l.country.city.hub_score);

        let input = PenaltyInput {
            distance: server.distance,
            timestamp: server.timestamp as f64,
            load: server.load as f64,
            obfuscated: server.is_obfuscated(),
            user_country: &insights.country_code,
            server_country: &server_country,
            hub_score,
        };

        let jitter = rng.gen_range(0.0..MAX_JITTER);
        let result = penalty(&input, &bounds.distance, &bounds.age, jitter);

        server.penalty = result.total;
        server.partial_penalty = result.partial;
    }
}

/// Полное ранжирование: оба прохода и стабильная сортировка по штрафу
///
/// Серверы без локаций отбрасываются.
pub fn rank_servers<R: Rng>(mut servers: Vec<Server>, insights: &Insights, rng: &mut R) -> Vec<Server> {
    let before = servers.len();
    servers.retain(|s| !s.locations.is_empty());
    if servers.len() != before {
        warn!("Отброшено {} серверов без локации", before - servers.len());
    }

    let bounds = compute_bounds(&mut servers, insights);
    debug!(
        "Границы: расстояние [{:.0}, {:.0}] м, создание [{}, {}]",
        bounds.distance.min, bounds.distance.max, bounds.age.min, bounds.age.max
    );

    assign_penalties(&mut servers, insights, &bounds, rng);

    // sort_by стабильна: равные штрафы сохраняют порядок API
    servers.sort_by(|a, b| a.penalty.total_cmp(&b.penalty));
    servers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::*;
    use crate::technology::ServerTechnology;

    fn insights() -> Insights {
        Insights {
            longitude: 13.4,
            latitude: 52.5,
            country_code: "DE".to_string(),
        }
    }

    #[test]
    fn test_parse_created_at() {
        assert_eq!(parse_created_at("1970-01-01 00:01:00"), Some(60));
        assert_eq!(parse_created_at("2020-01-01T00:00:00Z"), Some(1_577_836_800));
        assert_eq!(parse_created_at("yesterday"), None);
    }

    #[test]
    fn test_rank_by_load() {
        let de = country(81, "Germany", "DE", vec![city(1, "Berlin", 52.5, 13.4)]);
        let loads = [90, 10, 30];
        let servers: Vec<Server> = loads
            .iter()
            .enumerate()
            .map(|(i, load)| {
                let mut s = server(i as i64, &format!("de{}.example.com", i + 10), &de, &de.cities[0]);
                s.load = *load;
                s
            })
            .collect();

        let ranked = rank_servers(servers, &insights(), &mut StdRng::seed_from_u64(7));
        let order: Vec<i64> = ranked.iter().map(|s| s.load).collect();
        assert_eq!(order, vec![10, 30, 90]);
    }

    #[test]
    fn test_bounds_cover_whole_set() {
        let de = country(81, "Germany", "DE", vec![city(1, "Berlin", 52.5, 13.4)]);
        let nl = country(153, "Netherlands", "NL", vec![city(2, "Amsterdam", 52.37, 4.89)]);

        let mut near = server(1, "de10.example.com", &de, &de.cities[0]);
        near.created_at = "2018-01-01 00:00:00".to_string();
        let mut far = server(2, "nl10.example.com", &nl, &nl.cities[0]);
        far.created_at = "2022-01-01 00:00:00".to_string();
        let mut broken = server(3, "nl11.example.com", &nl, &nl.cities[0]);
        broken.created_at = "n/a".to_string();

        let mut servers = vec![near, far, broken];
        let bounds = compute_bounds(&mut servers, &insights());

        assert!(bounds.distance.min < 1_000.0);
        assert!((bounds.distance.max - servers[1].distance).abs() < 1e-6);
        assert_eq!(bounds.age.min, servers[0].timestamp as f64);
        assert_eq!(bounds.age.max, servers[1].timestamp as f64);
        assert_eq!(servers[2].timestamp, 0);
        assert!(servers[0].has_key("de10"));
    }

    #[test]
    fn test_single_server_has_finite_penalty() {
        let de = country(81, "Germany", "DE", vec![city(1, "Berlin", 52.5, 13.4)]);
        let mut s = server(1, "de10.example.com", &de, &de.cities[0]);
        s.technologies.push(technology(ServerTechnology::OpenvpnUdpObfuscated));

        let ranked = rank_servers(vec![s], &insights(), &mut seeded_rng());
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].penalty.is_finite());
        assert!(ranked[0].partial_penalty >= 1.0);
        assert!(ranked[0].partial_penalty < 1.0 + MAX_JITTER);
    }

    #[test]
    fn test_servers_without_location_dropped() {
        let de = country(81, "Germany", "DE", vec![city(1, "Berlin", 52.5, 13.4)]);
        let mut orphan = server(2, "de11.example.com", &de, &de.cities[0]);
        orphan.locations.clear();

        let ranked = rank_servers(
            vec![server(1, "de10.example.com", &de, &de.cities[0]), orphan],
            &insights(),
            &mut seeded_rng(),
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, 1);
    }
}
