//! Технологии VPN и возможности серверов
//!
//! Пользователь выбирает технологию, протокол и флаг обфускации; сервер
//! заявляет конкретные возможности (`ServerTechnology`) с ID из API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SelectError};

/// Технология, выбранная пользователем
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VpnTechnology {
    /// WireGuard
    #[default]
    Wireguard,
    /// OpenVPN
    Openvpn,
}

/// Транспортный протокол
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// UDP
    #[default]
    Udp,
    /// TCP
    Tcp,
}

/// Возможность сервера с ID из API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerTechnology {
    /// OpenVPN UDP
    OpenvpnUdp,
    /// OpenVPN TCP
    OpenvpnTcp,
    /// OpenVPN UDP с обфускацией
    OpenvpnUdpObfuscated,
    /// OpenVPN TCP с обфускацией
    OpenvpnTcpObfuscated,
    /// WireGuard (только UDP)
    WireguardUdp,
}

impl ServerTechnology {
    /// Сопоставить выбор пользователя с возможностью сервера
    ///
    /// WireGuard работает только по UDP и не имеет обфусцированного варианта.
    pub fn resolve(technology: VpnTechnology, protocol: Protocol, obfuscated: bool) -> Result<Self> {
        match (technology, protocol, obfuscated) {
            (VpnTechnology::Wireguard, Protocol::Udp, false) => Ok(ServerTechnology::WireguardUdp),
            (VpnTechnology::Openvpn, Protocol::Udp, false) => Ok(ServerTechnology::OpenvpnUdp),
            (VpnTechnology::Openvpn, Protocol::Tcp, false) => Ok(ServerTechnology::OpenvpnTcp),
            (VpnTechnology::Openvpn, Protocol::Udp, true) => {
                Ok(ServerTechnology::OpenvpnUdpObfuscated)
            }
            (VpnTechnology::Openvpn, Protocol::Tcp, true) => {
                Ok(ServerTechnology::OpenvpnTcpObfuscated)
            }
            _ => Err(SelectError::UnsupportedTechnology {
                technology: technology.to_string(),
                protocol: protocol.to_string(),
                obfuscated,
            }),
        }
    }

    /// ID в API
    pub fn id(self) -> i64 {
        match self {
            ServerTechnology::OpenvpnUdp => 3,
            ServerTechnology::OpenvpnTcp => 5,
            ServerTechnology::OpenvpnUdpObfuscated => 15,
            ServerTechnology::OpenvpnTcpObfuscated => 17,
            ServerTechnology::WireguardUdp => 35,
        }
    }

    /// Возможность по ID из API
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            3 => Some(ServerTechnology::OpenvpnUdp),
            5 => Some(ServerTechnology::OpenvpnTcp),
            15 => Some(ServerTechnology::OpenvpnUdpObfuscated),
            17 => Some(ServerTechnology::OpenvpnTcpObfuscated),
            35 => Some(ServerTechnology::WireguardUdp),
            _ => None,
        }
    }

    /// Обфусцированный ли вариант
    pub fn is_obfuscated(self) -> bool {
        matches!(
            self,
            ServerTechnology::OpenvpnUdpObfuscated | ServerTechnology::OpenvpnTcpObfuscated
        )
    }
}

impl fmt::Display for ServerTechnology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerTechnology::OpenvpnUdp => "openvpn_udp",
            ServerTechnology::OpenvpnTcp => "openvpn_tcp",
            ServerTechnology::OpenvpnUdpObfuscated => "openvpn_xor_udp",
            ServerTechnology::OpenvpnTcpObfuscated => "openvpn_xor_tcp",
            ServerTechnology::WireguardUdp => "wireguard_udp",
        };
        f.write_str(name)
    }
}

impl fmt::Display for VpnTechnology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VpnTechnology::Wireguard => f.write_str("wireguard"),
            VpnTechnology::Openvpn => f.write_str("openvpn"),
        }
    }
}

impl FromStr for VpnTechnology {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wireguard" | "nordlynx" => Ok(VpnTechnology::Wireguard),
            "openvpn" => Ok(VpnTechnology::Openvpn),
            unknown => Err(format!("Неизвестная технология: {}", unknown)),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Udp => f.write_str("udp"),
            Protocol::Tcp => f.write_str("tcp"),
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "udp" => Ok(Protocol::Udp),
            "tcp" => Ok(Protocol::Tcp),
            unknown => Err(format!("Неизвестный протокол: {}", unknown)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_supported() {
        assert_eq!(
            ServerTechnology::resolve(VpnTechnology::Wireguard, Protocol::Udp, false).unwrap(),
            ServerTechnology::WireguardUdp
        );
        assert_eq!(
            ServerTechnology::resolve(VpnTechnology::Openvpn, Protocol::Tcp, true).unwrap(),
            ServerTechnology::OpenvpnTcpObfuscated
        );
    }

    #[test]
    fn test_resolve_unsupported() {
        assert!(matches!(
            ServerTechnology::resolve(VpnTechnology::Wireguard, Protocol::Tcp, false),
            Err(SelectError::UnsupportedTechnology { .. })
        ));
        assert!(matches!(
            ServerTechnology::resolve(VpnTechnology::Wireguard, Protocol::Udp, true),
            Err(SelectError::UnsupportedTechnology { obfuscated: true, .. })
        ));
    }

    #[test]
    fn test_obfuscated_flag() {
        assert!(ServerTechnology::OpenvpnUdpObfuscated.is_obfuscated());
        assert!(!ServerTechnology::WireguardUdp.is_obfuscated());
        assert_eq!(ServerTechnology::from_id(35), Some(ServerTechnology::WireguardUdp));
        assert_eq!(ServerTechnology::from_id(1), None);
    }

    #[test]
    fn test_parse_from_str() {
        assert_eq!("WireGuard".parse::<VpnTechnology>().unwrap(), VpnTechnology::Wireguard);
        assert_eq!("openvpn".parse::<VpnTechnology>().unwrap(), VpnTechnology::Openvpn);
        assert!("ikev2".parse::<VpnTechnology>().is_err());
        assert_eq!("TCP".parse::<Protocol>().unwrap(), Protocol::Tcp);
        assert!("sctp".parse::<Protocol>().is_err());
    }
}
