//! # VPND Core (vpnd-core)
//!
//! Ядро выбора сервера VPN-демона: превращает свободный ввод пользователя
//! ("de", "germany berlin", "p2p", "de1234") в конкретный сервер.
//!
//! ## Возможности
//!
//! - **Разрешение групп**: имя группы из флага или из селектора → [`ServerGroup`]
//! - **Разрешение цели**: страна / город / hostname → [`ResolvedTarget`]
//! - **Штрафы**: многофакторная оценка сервера (расстояние, нагрузка,
//!   свежесть обфусцированных серверов, хабы, jitter)
//! - **Ранжирование**: двухпроходный расчёт глобальных границ и штрафов
//! - **Локальная фильтрация**: предикат, эквивалентный удалённому фильтру,
//!   политика виртуальных серверов и случайный выбор среди кандидатов
//!
//! ## Структура
//!
//! - [`models`]: Серверы, страны, города, группы, insights
//! - [`group`]: Таблица групп и `resolve_group`
//! - [`technology`]: Технологии, протоколы и возможности серверов
//! - [`target`]: `resolve_target` и [`ResolvedTarget`]
//! - [`penalty`]: Функции штрафов
//! - [`geo`]: Расстояние по сфере
//! - [`keys`]: Ключи поиска сервера
//! - [`rank`]: Двухпроходное ранжирование снимка
//! - [`filter`]: Фильтр для API, локальный предикат, выбор кандидата
//! - [`text`]: Нормализация строк
//! - [`error`]: Типы ошибок
//!
//! ## Пример использования
//!
//! ```rust,no_run
//! use vpnd_core::{group::resolve_group, target::resolve_target, ResolvedTarget};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let countries = Vec::new();
//! let servers = Vec::new();
//!
//! let group = resolve_group("", "p2p")?;
//! let target = resolve_target(&countries, "p2p", group, &servers, false)?;
//! assert!(matches!(target, ResolvedTarget::BySpeed(_)));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod filter;
pub mod geo;
pub mod group;
pub mod keys;
pub mod models;
pub mod penalty;
pub mod rank;
pub mod target;
pub mod technology;
pub mod text;

// Re-экспорт основных типов для удобства
pub use error::{Result, SelectError};
pub use filter::ServersFilter;
pub use group::ServerGroup;
pub use models::{City, Country, Insights, Server};
pub use target::ResolvedTarget;
pub use technology::{Protocol, ServerTechnology, VpnTechnology};

/// Версия библиотеки
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
