//! Модель данных: серверы, страны, города, группы
//!
//! Формат соответствует JSON удалённого API. Производные поля сервера
//! (`distance`, `timestamp`, `penalty`, `partial_penalty`, `keys`) в ответе
//! API отсутствуют и заполняются целиком при каждом обновлении кеша.

use serde::{Deserialize, Serialize};

use crate::group::ServerGroup;
use crate::technology::ServerTechnology;
use crate::text::normalize;

/// Статус сервера или технологии на сервере
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// Работает
    Online,
    /// Выключен
    Offline,
    /// На обслуживании
    Maintenance,
    /// Неизвестный статус
    #[default]
    #[serde(other)]
    Unknown,
}

/// Город
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// ID города
    pub id: i64,
    /// Название
    pub name: String,
    /// Широта (градусы)
    #[serde(default)]
    pub latitude: f64,
    /// Долгота (градусы)
    #[serde(default)]
    pub longitude: f64,
    /// Оценка хаба (чем выше, тем сильнее скидка штрафа)
    #[serde(default)]
    pub hub_score: Option<f64>,
}

/// Страна со списком городов (ответ `servers/countries`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    /// ID страны
    pub id: i64,
    /// Название
    pub name: String,
    /// ISO код (`DE`, `GB`, ...)
    pub code: String,
    /// Города
    #[serde(default)]
    pub cities: Vec<City>,
}

/// Страна внутри локации сервера (с одним городом)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCountry {
    /// ID страны
    pub id: i64,
    /// Название
    pub name: String,
    /// ISO код
    pub code: String,
    /// Город размещения сервера
    pub city: City,
}

/// Локация сервера
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Страна и город
    pub country: LocationCountry,
    /// Широта (градусы)
    #[serde(default)]
    pub latitude: f64,
    /// Долгота (градусы)
    #[serde(default)]
    pub longitude: f64,
}

/// Статус технологии на конкретном сервере
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Pivot {
    /// Статус
    #[serde(default)]
    pub status: ServerStatus,
}

/// Технология, заявленная сервером
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    /// ID технологии
    pub id: i64,
    /// Отображаемое имя
    #[serde(default)]
    pub name: String,
    /// Статус технологии на сервере
    #[serde(default)]
    pub pivot: Pivot,
}

/// Тип группы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GroupType {
    /// Идентификатор типа (`regions`, `legacy_group_category`, ...)
    #[serde(default)]
    pub identifier: String,
}

/// Группа, в которую входит сервер
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// ID группы
    pub id: i64,
    /// Название (`P2P`, `Double VPN`, ...)
    pub title: String,
    /// Тип группы
    #[serde(default, rename = "type")]
    pub kind: GroupType,
}

/// Значение спецификации
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificationValue {
    /// Значение
    pub value: String,
}

/// Спецификация сервера (например, `virtual`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    /// Идентификатор спецификации
    pub identifier: String,
    /// Значения
    #[serde(default)]
    pub values: Vec<SpecificationValue>,
}

/// Сервер VPN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// ID сервера
    pub id: i64,
    /// Отображаемое имя
    pub name: String,
    /// Hostname (`de1234.example.com`)
    pub hostname: String,
    /// Дата создания (`2019-06-13 14:42:29`)
    #[serde(default)]
    pub created_at: String,
    /// Нагрузка, 0-100
    #[serde(default)]
    pub load: i64,
    /// Статус
    #[serde(default)]
    pub status: ServerStatus,
    /// Локации
    #[serde(default)]
    pub locations: Vec<Location>,
    /// Технологии
    #[serde(default)]
    pub technologies: Vec<Technology>,
    /// Группы
    #[serde(default)]
    pub groups: Vec<Group>,
    /// Спецификации
    #[serde(default)]
    pub specifications: Vec<Specification>,

    /// Расстояние до пользователя (метры)
    #[serde(default)]
    pub distance: f64,
    /// Время создания (Unix секунды)
    #[serde(default)]
    pub timestamp: i64,
    /// Итоговый штраф (меньше лучше)
    #[serde(default)]
    pub penalty: f64,
    /// Штраф без учёта нагрузки
    #[serde(default)]
    pub partial_penalty: f64,
    /// Ключи поиска в нижнем регистре
    #[serde(default)]
    pub keys: Vec<String>,
}

impl Server {
    /// Первая локация сервера
    pub fn location(&self) -> Option<&Location> {
        self.locations.first()
    }

    /// ISO код страны сервера в нижнем регистре
    pub fn country_code(&self) -> String {
        self.location()
            .map(|l| l.country.code.to_lowercase())
            .unwrap_or_default()
    }

    /// Часть hostname до первой точки
    pub fn hostname_prefix(&self) -> &str {
        self.hostname.split('.').next().unwrap_or_default()
    }

    /// Входит ли сервер в группу
    pub fn belongs_to(&self, group: ServerGroup) -> bool {
        self.groups.iter().any(|g| g.id == group.id())
    }

    /// Поддерживает ли сервер технологию прямо сейчас
    pub fn supports(&self, technology: ServerTechnology) -> bool {
        self.status == ServerStatus::Online
            && self
                .technologies
                .iter()
                .any(|t| t.id == technology.id() && t.pivot.status == ServerStatus::Online)
    }

    /// Есть ли у сервера обфусцированная технология
    pub fn is_obfuscated(&self) -> bool {
        self.technologies.iter().any(|t| {
            ServerTechnology::from_id(t.id)
                .map(ServerTechnology::is_obfuscated)
                .unwrap_or(false)
        })
    }

    /// Виртуальная ли локация (спецификация `virtual` = `true`)
    pub fn is_virtual(&self) -> bool {
        self.specifications.iter().any(|spec| {
            spec.identifier == "virtual" && spec.values.iter().any(|v| v.value == "true")
        })
    }

    /// Есть ли у сервера ключ поиска
    pub fn has_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Нормализованные названия групп сервера
    pub fn group_titles(&self) -> impl Iterator<Item = String> + '_ {
        self.groups.iter().map(|g| normalize(&g.title))
    }
}

/// Геоданные пользователя (ответ `insights`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Insights {
    /// Долгота (градусы)
    #[serde(default)]
    pub longitude: f64,
    /// Широта (градусы)
    #[serde(default)]
    pub latitude: f64,
    /// ISO код страны пользователя
    #[serde(default)]
    pub country_code: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Конструкторы тестовых серверов и стран

    use super::*;

    /// Страна с городами
    pub fn country(id: i64, name: &str, code: &str, cities: Vec<City>) -> Country {
        Country {
            id,
            name: name.to_string(),
            code: code.to_string(),
            cities,
        }
    }

    /// Город
    pub fn city(id: i64, name: &str, latitude: f64, longitude: f64) -> City {
        City {
            id,
            name: name.to_string(),
            latitude,
            longitude,
            hub_score: None,
        }
    }

    /// Онлайн сервер с WireGuard в группе Standard
    pub fn server(id: i64, hostname: &str, country: &Country, city: &City) -> Server {
        Server {
            id,
            name: hostname.to_string(),
            hostname: hostname.to_string(),
            created_at: "2020-01-01 00:00:00".to_string(),
            load: 10,
            status: ServerStatus::Online,
            locations: vec![Location {
                country: LocationCountry {
                    id: country.id,
                    name: country.name.clone(),
                    code: country.code.clone(),
                    city: city.clone(),
                },
                latitude: city.latitude,
                longitude: city.longitude,
            }],
            technologies: vec![technology(ServerTechnology::WireguardUdp)],
            groups: vec![group(ServerGroup::StandardVpnServers)],
            specifications: Vec::new(),
            distance: 0.0,
            timestamp: 0,
            penalty: 0.0,
            partial_penalty: 0.0,
            keys: Vec::new(),
        }
    }

    /// Онлайн технология
    pub fn technology(technology: ServerTechnology) -> Technology {
        Technology {
            id: technology.id(),
            name: technology.to_string(),
            pivot: Pivot {
                status: ServerStatus::Online,
            },
        }
    }

    /// Группа с каноническим названием
    pub fn group(group: ServerGroup) -> Group {
        Group {
            id: group.id(),
            title: group.title().to_string(),
            kind: GroupType::default(),
        }
    }

    /// Спецификация виртуальной локации
    pub fn virtual_spec() -> Specification {
        Specification {
            identifier: "virtual".to_string(),
            values: vec![SpecificationValue {
                value: "true".to_string(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    const SERVER_JSON: &str = r#"{
        "id": 929912,
        "name": "Germany #1234",
        "hostname": "de1234.example.com",
        "created_at": "2019-06-13 14:42:29",
        "load": 17,
        "status": "online",
        "locations": [{
            "latitude": 50.116667,
            "longitude": 8.683333,
            "country": {
                "id": 81, "name": "Germany", "code": "DE",
                "city": {"id": 2215, "name": "Frankfurt", "latitude": 50.116667, "longitude": 8.683333, "hub_score": 0.2}
            }
        }],
        "technologies": [
            {"id": 35, "name": "Wireguard", "pivot": {"status": "online"}},
            {"id": 5, "name": "OpenVPN TCP", "pivot": {"status": "maintenance"}}
        ],
        "groups": [{"id": 15, "title": "P2P", "type": {"identifier": "legacy_group_category"}}],
        "specifications": [{"identifier": "virtual", "values": [{"value": "false"}]}]
    }"#;

    #[test]
    fn test_deserialize_api_server() {
        let server: Server = serde_json::from_str(SERVER_JSON).unwrap();

        assert_eq!(server.id, 929912);
        assert_eq!(server.country_code(), "de");
        assert_eq!(server.hostname_prefix(), "de1234");
        assert_eq!(server.location().unwrap().country.city.hub_score, Some(0.2));
        assert!(server.belongs_to(ServerGroup::P2p));
        assert!(!server.is_virtual());
        assert!(server.keys.is_empty());
    }

    #[test]
    fn test_supports_requires_online_pivot() {
        let server: Server = serde_json::from_str(SERVER_JSON).unwrap();

        assert!(server.supports(ServerTechnology::WireguardUdp));
        assert!(!server.supports(ServerTechnology::OpenvpnTcp));
        assert!(!server.supports(ServerTechnology::OpenvpnUdp));
    }

    #[test]
    fn test_offline_server_supports_nothing() {
        let mut server: Server = serde_json::from_str(SERVER_JSON).unwrap();
        server.status = ServerStatus::Offline;
        assert!(!server.supports(ServerTechnology::WireguardUdp));
    }

    #[test]
    fn test_unknown_status() {
        let status: ServerStatus = serde_json::from_str("\"retired\"").unwrap();
        assert_eq!(status, ServerStatus::Unknown);
    }

    #[test]
    fn test_obfuscated_and_virtual() {
        let de = country(81, "Germany", "DE", vec![city(1, "Berlin", 52.5, 13.4)]);
        let mut server = server(1, "de1.example.com", &de, &de.cities[0]);
        assert!(!server.is_obfuscated());

        server
            .technologies
            .push(technology(ServerTechnology::OpenvpnTcpObfuscated));
        server.specifications.push(virtual_spec());

        assert!(server.is_obfuscated());
        assert!(server.is_virtual());
    }
}
