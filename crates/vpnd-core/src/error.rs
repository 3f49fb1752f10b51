//! Типы ошибок выбора сервера
//!
//! Ошибки делятся на классы: ошибки ввода (никогда не приводят к fallback),
//! ошибки доступности (приводят к fallback на локальный кеш), ошибки политики
//! и транзитные ошибки удалённого API.

use thiserror::Error;

/// Основной тип ошибок выбора сервера
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectError {
    /// Группа указана и в селекторе, и во флаге
    #[error("Группа серверов указана дважды: в селекторе и через флаг")]
    DoubleGroupSpecified,

    /// Имя группы во флаге не распознано
    #[error("Группа серверов не существует: {0}")]
    GroupDoesNotExist(String),

    /// Селектор не похож ни на страну, ни на город, ни на тег сервера
    #[error("Тег сервера не существует: {0}")]
    TagDoesNotExist(String),

    /// Селектор похож на тег сервера, но в кеше такого сервера нет
    #[error("Не удалось разрешить селектор: {0}")]
    Unresolved(String),

    /// Сервер не поддерживает запрошенную технологию
    #[error("Сервер {id} недоступен для выбранной технологии")]
    ServerUnavailable {
        /// ID сервера
        id: i64,
    },

    /// API рекомендаций вернул пустой список
    #[error("API рекомендаций вернул пустой список серверов")]
    EmptyRecommendation,

    /// Комбинация технологии, протокола и обфускации не существует
    #[error("Неподдерживаемая комбинация: {technology}/{protocol}, обфускация={obfuscated}")]
    UnsupportedTechnology {
        /// Технология
        technology: String,
        /// Протокол
        protocol: String,
        /// Запрошена ли обфускация
        obfuscated: bool,
    },

    /// Все кандидаты виртуальные, а виртуальные серверы запрещены
    #[error("Подходят только виртуальные серверы, а они запрещены настройками")]
    VirtualServerSelected,

    /// Кандидатов нет
    #[error("Нет подходящих серверов")]
    NoServers,

    /// Ошибка удалённого API
    #[error("Ошибка API: {0}")]
    Api(String),
}

impl SelectError {
    /// Ошибка ввода пользователя: не ретраится и не приводит к fallback
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SelectError::DoubleGroupSpecified
                | SelectError::GroupDoesNotExist(_)
                | SelectError::TagDoesNotExist(_)
        )
    }
}

/// Псевдоним для Result с ошибкой выбора сервера
pub type Result<T> = std::result::Result<T, SelectError>;
