//! Списки стран, городов и групп для пользователя
//!
//! Строятся по снимку кеша с учётом технологии, обфускации и политики
//! виртуальных серверов. Имена в snake case, отсортированы, без повторов.

use std::collections::BTreeSet;
use vpnd_core::keys::display_country_code;
use vpnd_core::text::normalize;
use vpnd_core::{Server, ServerTechnology};

/// Параметры списков
#[derive(Debug, Clone, Copy)]
pub struct ListingFilter {
    /// Возможность сервера
    pub technology: ServerTechnology,
    /// Обфускация
    pub obfuscated: bool,
    /// Разрешены ли виртуальные локации
    pub allow_virtual: bool,
}

impl ListingFilter {
    fn accepts(&self, server: &Server) -> bool {
        server.supports(self.technology)
            && server.is_obfuscated() == self.obfuscated
            && (self.allow_virtual || !server.is_virtual())
    }
}

fn available<'a>(servers: &'a [Server], filter: &'a ListingFilter) -> impl Iterator<Item = &'a Server> {
    servers.iter().filter(move |s| filter.accepts(s))
}

/// Страны, в которых есть подходящие серверы
pub fn available_countries(servers: &[Server], filter: &ListingFilter) -> Vec<String> {
    let names: BTreeSet<String> = available(servers, filter)
        .flat_map(|s| s.locations.iter())
        .map(|l| normalize(&l.country.name))
        .filter(|name| !name.is_empty())
        .collect();

    names.into_iter().collect()
}

/// Города страны; страна задаётся именем или кодом (`uk` и `gb` равнозначны)
pub fn available_cities(servers: &[Server], filter: &ListingFilter, country: &str) -> Vec<String> {
    let key = display_country_code(&normalize(country));

    let names: BTreeSet<String> = available(servers, filter)
        .flat_map(|s| s.locations.iter())
        .filter(|l| {
            normalize(&l.country.name) == key || display_country_code(&l.country.code) == key
        })
        .map(|l| normalize(&l.country.city.name))
        .filter(|name| !name.is_empty())
        .collect();

    names.into_iter().collect()
}

/// Группы, в которых есть подходящие серверы
pub fn available_groups(servers: &[Server], filter: &ListingFilter) -> Vec<String> {
    let names: BTreeSet<String> = available(servers, filter)
        .flat_map(|s| s.group_titles())
        .filter(|name| !name.is_empty())
        .collect();

    names.into_iter().collect()
}
