//! Нормализация строк для сравнения селекторов
//!
//! Все имена (страны, города, группы, селектор пользователя) приводятся к
//! единой форме: нижний регистр, без диакритики, слова через `_`.

/// Привести строку к snake_case без диакритики
///
/// Пробелы, `-` и `_` становятся разделителем `_`, прочая пунктуация
/// отбрасывается, повторные разделители схлопываются.
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_separator = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_separator = true;
            continue;
        }

        let folded = fold_diacritic(ch);
        if folded.is_empty() && !ch.is_alphanumeric() {
            continue;
        }

        if pending_separator && !out.is_empty() {
            out.push('_');
        }
        pending_separator = false;

        if folded.is_empty() {
            out.push(ch);
        } else {
            out.push_str(folded);
        }
    }

    out
}

/// Латинская замена для символа с диакритикой (пустая строка, если замены нет)
fn fold_diacritic(ch: char) -> &'static str {
    match ch {
        'a'..='z' | '0'..='9' => "",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' | 'ľ' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' | 'ș' => "s",
        'ß' => "ss",
        'ť' | 'ţ' | 'ț' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_spaces_and_case() {
        assert_eq!(normalize("United States"), "united_states");
        assert_eq!(normalize("  New   York "), "new_york");
        assert_eq!(normalize("de1234"), "de1234");
    }

    #[test]
    fn test_normalize_punctuation() {
        assert_eq!(
            normalize("Africa, the Middle East and India"),
            "africa_the_middle_east_and_india"
        );
        assert_eq!(normalize("St. Louis"), "st_louis");
        assert_eq!(normalize("Bosnia-Herzegovina"), "bosnia_herzegovina");
        assert_eq!(normalize("double_vpn"), "double_vpn");
    }

    #[test]
    fn test_normalize_diacritics() {
        assert_eq!(normalize("Zürich"), "zurich");
        assert_eq!(normalize("São Paulo"), "sao_paulo");
        assert_eq!(normalize("Curaçao"), "curacao");
        assert_eq!(normalize("Côte d'Ivoire"), "cote_divoire");
    }
}
