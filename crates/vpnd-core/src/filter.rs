//! Фильтрация кандидатов
//!
//! - [`ServersFilter`]: запрос к API рекомендаций
//! - [`local_candidates`]: эквивалентный предикат для локального кеша
//! - [`apply_virtual_policy`]: политика виртуальных серверов
//! - [`pick_one`]: случайный выбор среди оставшихся кандидатов

use rand::Rng;

use crate::error::{Result, SelectError};
use crate::group::ServerGroup;
use crate::keys::tag_key;
use crate::models::Server;
use crate::target::ResolvedTarget;
use crate::technology::ServerTechnology;

/// Лимит рекомендаций при выборе одного сервера
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 20;

/// Запрос к API рекомендаций
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServersFilter {
    /// Группа
    pub group: ServerGroup,
    /// Возможность сервера
    pub technology: ServerTechnology,
    /// Цель
    pub target: ResolvedTarget,
    /// Сколько серверов вернуть
    pub limit: usize,
}

impl ServersFilter {
    /// Собрать фильтр
    ///
    /// Без группы и с обфускацией подставляется группа `Obfuscated`, иначе
    /// API вернёт и необфусцированные серверы.
    pub fn new(
        group: ServerGroup,
        technology: ServerTechnology,
        target: ResolvedTarget,
        limit: usize,
    ) -> Self {
        let group = if !group.is_defined() && technology.is_obfuscated() {
            ServerGroup::Obfuscated
        } else {
            group
        };

        Self {
            group,
            technology,
            target,
            limit,
        }
    }
}

/// Параметры локального предиката
#[derive(Debug, Clone, Copy)]
pub struct LocalQuery<'a> {
    /// Селектор пользователя (пустой, если не задан)
    pub tag: &'a str,
    /// Группа
    pub group: ServerGroup,
    /// Возможность сервера
    pub technology: ServerTechnology,
    /// Запрошена ли обфускация
    pub obfuscated: bool,
}

/// Предикат локального кеша, эквивалентный удалённому фильтру
pub fn matches_local(server: &Server, query: &LocalQuery<'_>, tag: &str) -> bool {
    let by_selection = match (tag.is_empty(), query.group.is_defined()) {
        (false, true) => server.belongs_to(query.group) && server.has_key(tag),
        (true, true) => server.belongs_to(query.group),
        (false, false) => server.has_key(tag),
        (true, false) => {
            let default_group = if query.obfuscated {
                ServerGroup::Obfuscated
            } else {
                ServerGroup::StandardVpnServers
            };
            server.belongs_to(default_group)
        }
    };

    by_selection && server.supports(query.technology) && server.is_obfuscated() == query.obfuscated
}

/// Отфильтровать снимок кеша; порядок (по штрафу) сохраняется
pub fn local_candidates(servers: &[Server], query: &LocalQuery<'_>) -> Vec<Server> {
    let tag = if query.tag.trim().is_empty() {
        String::new()
    } else {
        tag_key(query.tag)
    };

    servers
        .iter()
        .filter(|s| matches_local(s, query, &tag))
        .cloned()
        .collect()
}

/// Применить политику виртуальных серверов
///
/// Если виртуальные запрещены и фильтр опустошил непустой список, это
/// `VirtualServerSelected`, а не пустой результат.
pub fn apply_virtual_policy(servers: Vec<Server>, allow_virtual: bool) -> Result<Vec<Server>> {
    if allow_virtual || servers.is_empty() {
        return Ok(servers);
    }

    let physical: Vec<Server> = servers.into_iter().filter(|s| !s.is_virtual()).collect();
    if physical.is_empty() {
        return Err(SelectError::VirtualServerSelected);
    }

    Ok(physical)
}

/// Выбрать один сервер случайно среди кандидатов
pub fn pick_one<R: Rng>(mut candidates: Vec<Server>, rng: &mut R) -> Result<Server> {
    match candidates.len() {
        0 => Err(SelectError::NoServers),
        1 => Ok(candidates.remove(0)),
        len => {
            let index = rng.gen_range(0..len);
            Ok(candidates.swap_remove(index))
        }
    }
}
