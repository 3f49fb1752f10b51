//! Группы серверов и разрешение имени группы
//!
//! Имя группы может прийти двумя путями: явным флагом (`--group p2p`) или
//! самим селектором (`connect p2p`). Указать группу обоими путями сразу
//! нельзя.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectError};
use crate::text::normalize;

/// Группа серверов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerGroup {
    /// Группа не задана
    #[default]
    Undefined,
    /// Double VPN
    DoubleVpn,
    /// Onion Over VPN
    OnionOverVpn,
    /// Ultra fast TV
    UltraFastTv,
    /// Anti DDoS
    AntiDdos,
    /// Dedicated IP
    DedicatedIp,
    /// Обычные серверы
    StandardVpnServers,
    /// Netflix USA
    NetflixUsa,
    /// P2P
    P2p,
    /// Обфусцированные серверы
    Obfuscated,
    /// Европа
    Europe,
    /// Америка
    TheAmericas,
    /// Азиатско-Тихоокеанский регион
    AsiaPacific,
    /// Африка, Ближний Восток и Индия
    AfricaTheMiddleEastAndIndia,
}

/// Все определённые группы (без `Undefined`)
pub const ALL_GROUPS: [ServerGroup; 13] = [
    ServerGroup::DoubleVpn,
    ServerGroup::OnionOverVpn,
    ServerGroup::UltraFastTv,
    ServerGroup::AntiDdos,
    ServerGroup::DedicatedIp,
    ServerGroup::StandardVpnServers,
    ServerGroup::NetflixUsa,
    ServerGroup::P2p,
    ServerGroup::Obfuscated,
    ServerGroup::Europe,
    ServerGroup::TheAmericas,
    ServerGroup::AsiaPacific,
    ServerGroup::AfricaTheMiddleEastAndIndia,
];

impl ServerGroup {
    /// ID группы в API
    pub fn id(self) -> i64 {
        match self {
            ServerGroup::Undefined => 0,
            ServerGroup::DoubleVpn => 1,
            ServerGroup::OnionOverVpn => 3,
            ServerGroup::UltraFastTv => 5,
            ServerGroup::AntiDdos => 7,
            ServerGroup::DedicatedIp => 9,
            ServerGroup::StandardVpnServers => 11,
            ServerGroup::NetflixUsa => 13,
            ServerGroup::P2p => 15,
            ServerGroup::Obfuscated => 17,
            ServerGroup::Europe => 19,
            ServerGroup::TheAmericas => 21,
            ServerGroup::AsiaPacific => 23,
            ServerGroup::AfricaTheMiddleEastAndIndia => 25,
        }
    }

    /// Группа по ID из API
    pub fn from_id(id: i64) -> Option<Self> {
        ALL_GROUPS.iter().copied().find(|g| g.id() == id)
    }

    /// Название группы в том виде, в каком его отдаёт API
    pub fn title(self) -> &'static str {
        match self {
            ServerGroup::Undefined => "",
            ServerGroup::DoubleVpn => "Double VPN",
            ServerGroup::OnionOverVpn => "Onion Over VPN",
            ServerGroup::UltraFastTv => "Ultra fast TV",
            ServerGroup::AntiDdos => "Anti DDoS",
            ServerGroup::DedicatedIp => "Dedicated IP",
            ServerGroup::StandardVpnServers => "Standard VPN servers",
            ServerGroup::NetflixUsa => "Netflix USA",
            ServerGroup::P2p => "P2P",
            ServerGroup::Obfuscated => "Obfuscated Servers",
            ServerGroup::Europe => "Europe",
            ServerGroup::TheAmericas => "The Americas",
            ServerGroup::AsiaPacific => "Asia Pacific",
            ServerGroup::AfricaTheMiddleEastAndIndia => "Africa, the Middle East and India",
        }
    }

    /// Определена ли группа
    pub fn is_defined(self) -> bool {
        self != ServerGroup::Undefined
    }

    /// Найти группу по имени: регистр, пробелы и пунктуация не важны
    ///
    /// Пустая строка или неизвестное имя дают `Undefined`.
    pub fn parse(name: &str) -> Self {
        let key = normalize(name);
        if key.is_empty() {
            return ServerGroup::Undefined;
        }

        ALL_GROUPS
            .iter()
            .copied()
            .find(|g| normalize(g.title()) == key)
            .unwrap_or(ServerGroup::Undefined)
    }
}

impl fmt::Display for ServerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&normalize(self.title()))
    }
}

/// Разрешить группу из флага и из селектора
///
/// - обе строки дают определённую группу → `DoubleGroupSpecified`;
/// - непустой флаг не распознан → `GroupDoesNotExist`;
/// - иначе возвращается группа из флага, а при её отсутствии из селектора.
pub fn resolve_group(flag: &str, selector: &str) -> Result<ServerGroup> {
    let flag_group = ServerGroup::parse(flag);
    let selector_group = ServerGroup::parse(selector);

    if flag_group.is_defined() && selector_group.is_defined() {
        return Err(SelectError::DoubleGroupSpecified);
    }

    if !flag.trim().is_empty() && !flag_group.is_defined() {
        return Err(SelectError::GroupDoesNotExist(flag.to_string()));
    }

    if flag_group.is_defined() {
        Ok(flag_group)
    } else {
        Ok(selector_group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_group_empty() {
        assert_eq!(resolve_group("", "").unwrap(), ServerGroup::Undefined);
    }

    #[test]
    fn test_resolve_group_double() {
        assert_eq!(
            resolve_group("p2p", "p2p"),
            Err(SelectError::DoubleGroupSpecified)
        );
        assert_eq!(
            resolve_group("p2p", "double_vpn"),
            Err(SelectError::DoubleGroupSpecified)
        );
    }

    #[test]
    fn test_resolve_group_unknown_flag() {
        assert!(matches!(
            resolve_group("quantum_vpn", ""),
            Err(SelectError::GroupDoesNotExist(name)) if name == "quantum_vpn"
        ));
    }

    #[test]
    fn test_resolve_group_sources() {
        assert_eq!(resolve_group("P2P", "de").unwrap(), ServerGroup::P2p);
        assert_eq!(resolve_group("", "Double VPN").unwrap(), ServerGroup::DoubleVpn);
        assert_eq!(resolve_group("", "germany").unwrap(), ServerGroup::Undefined);
    }

    #[test]
    fn test_parse_normalizes() {
        assert_eq!(ServerGroup::parse("obfuscated_servers"), ServerGroup::Obfuscated);
        assert_eq!(ServerGroup::parse("Obfuscated Servers"), ServerGroup::Obfuscated);
        assert_eq!(
            ServerGroup::parse("africa_the_middle_east_and_india"),
            ServerGroup::AfricaTheMiddleEastAndIndia
        );
        assert_eq!(ServerGroup::parse("   "), ServerGroup::Undefined);
    }

    #[test]
    fn test_ids_round_trip() {
        for group in ALL_GROUPS {
            assert_eq!(ServerGroup::from_id(group.id()), Some(group));
        }
        assert_eq!(ServerGroup::from_id(0), None);
    }
}
