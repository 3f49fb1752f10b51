//! Функции штрафа сервера
//!
//! Штраф: чем меньше, тем лучше. Гео-, хаб-, обфускационная составляющие и
//! jitter складываются до нагрузки и различают серверы с похожей нагрузкой;
//! нагрузка добавляется последней и при насыщении перекрывает всё остальное.

/// Вес расстояния
pub const ALPHA: f64 = 0.7;
/// Степень расстояния
pub const W: f64 = 0.5;
/// Вес свежести обфусцированного сервера
pub const BETA: f64 = -0.15;
/// Базовый штраф обфусцированного сервера
pub const LAMBDA: f64 = 1.0;
/// Степень свежести
pub const FI: f64 = 7.0;
/// Верхняя граница jitter (не включительно)
pub const MAX_JITTER: f64 = 0.001;

/// Глобальные min/max одной величины за цикл обновления
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Минимум
    pub min: f64,
    /// Максимум
    pub max: f64,
}

impl Bounds {
    /// Пустые границы (ни одного наблюдения)
    pub fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Учесть значение
    pub fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Положение значения внутри границ, от 0 до 1
    ///
    /// При `max <= min` (один сервер, все равноудалены, нет наблюдений)
    /// отношение считается равным 0.
    pub fn ratio(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if !span.is_finite() || span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Исходные данные сервера для расчёта штрафа
#[derive(Debug, Clone, Copy)]
pub struct PenaltyInput<'a> {
    /// Расстояние до пользователя (метры)
    pub distance: f64,
    /// Время создания сервера (Unix секунды)
    pub timestamp: f64,
    /// Нагрузка 0-100
    pub load: f64,
    /// Обфусцированный ли сервер
    pub obfuscated: bool,
    /// Страна пользователя
    pub user_country: &'a str,
    /// Страна сервера
    pub server_country: &'a str,
    /// Оценка хаба города
    pub hub_score: Option<f64>,
}

/// Рассчитанный штраф
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penalty {
    /// Итоговый штраф
    pub total: f64,
    /// Штраф без нагрузки
    pub partial: f64,
}

/// Штраф за расстояние: `ALPHA * ratio^W`
pub fn distance_penalty(distance: f64, bounds: &Bounds) -> f64 {
    ALPHA * bounds.ratio(distance).powf(W)
}

/// Штраф за нагрузку: `(load/10)^(load/10)`
pub fn load_penalty(load: f64) -> f64 {
    let x = load / 10.0;
    x.powf(x)
}

/// Штраф обфусцированного сервера по относительной свежести
pub fn obfuscation_penalty(obfuscated: bool, timestamp: f64, bounds: &Bounds) -> f64 {
    if !obfuscated {
        return 0.0;
    }
    BETA * bounds.ratio(timestamp).powf(FI) + LAMBDA
}

/// 0 для страны пользователя, 1 для остальных
pub fn country_penalty(user_country: &str, server_country: &str) -> f64 {
    if user_country.eq_ignore_ascii_case(server_country) {
        0.0
    } else {
        1.0
    }
}

/// Полный штраф сервера
///
/// `jitter` из [0, MAX_JITTER) разводит одинаковые серверы между клиентами.
pub fn penalty(input: &PenaltyInput<'_>, distance: &Bounds, age: &Bounds, jitter: f64) -> Penalty {
    let hub = input.hub_score.unwrap_or(0.0);

    let partial = distance_penalty(input.distance, distance)
        + jitter
        + obfuscation_penalty(input.obfuscated, input.timestamp, age)
        - country_penalty(input.user_country, input.server_country) * hub;

    Penalty {
        total: partial + load_penalty(input.load),
        partial,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min: f64, max: f64) -> Bounds {
        Bounds { min, max }
    }

    fn input(load: f64) -> PenaltyInput<'static> {
        PenaltyInput {
            distance: 100_000.0,
            timestamp: 1_600_000_000.0,
            load,
            obfuscated: false,
            user_country: "de",
            server_country: "de",
            hub_score: None,
        }
    }

    #[test]
    fn test_load_penalty_values() {
        assert!((load_penalty(10.0) - 1.0).abs() < 1e-9);
        let full = load_penalty(100.0);
        assert!((full - 10_000_000_000.0).abs() / 10_000_000_000.0 < 1e-9);
        assert!(load_penalty(90.0) > load_penalty(10.0) * 1e8);
    }

    #[test]
    fn test_distance_penalty_monotonic() {
        let b = bounds(1_000.0, 9_000_000.0);
        let mut previous = distance_penalty(b.min, &b);
        assert_eq!(previous, 0.0);

        let mut d = b.min;
        while d <= b.max {
            let current = distance_penalty(d, &b);
            assert!(current >= previous);
            previous = current;
            d += 250_000.0;
        }
        assert!((distance_penalty(b.max, &b) - ALPHA).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_bounds_are_zero() {
        let single = bounds(500.0, 500.0);
        assert_eq!(distance_penalty(500.0, &single), 0.0);
        assert_eq!(obfuscation_penalty(true, 500.0, &single), LAMBDA);
        assert_eq!(Bounds::empty().ratio(1.0), 0.0);
    }

    #[test]
    fn test_obfuscation_penalty() {
        let b = bounds(0.0, 100.0);
        assert_eq!(obfuscation_penalty(false, 100.0, &b), 0.0);
        assert!((obfuscation_penalty(true, 0.0, &b) - 1.0).abs() < 1e-12);
        assert!((obfuscation_penalty(true, 100.0, &b) - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_hub_discount_only_abroad() {
        let d = bounds(0.0, 1_000_000.0);
        let a = bounds(0.0, 1.0);

        let mut abroad = input(10.0);
        abroad.server_country = "nl";
        abroad.hub_score = Some(0.3);
        let mut home = abroad;
        home.server_country = "de";

        let abroad_penalty = penalty(&abroad, &d, &a, 0.0);
        let home_penalty = penalty(&home, &d, &a, 0.0);

        assert!((home_penalty.partial - abroad_penalty.partial - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_load_orders_equal_servers() {
        let d = bounds(0.0, 1_000_000.0);
        let a = bounds(0.0, 1.0);

        let p10 = penalty(&input(10.0), &d, &a, 0.0009);
        let p30 = penalty(&input(30.0), &d, &a, 0.0);
        let p90 = penalty(&input(90.0), &d, &a, 0.0005);

        assert!(p10.total < p30.total);
        assert!(p30.total < p90.total);
        assert!((p10.total - p10.partial - 1.0).abs() < 1e-12);
    }
}
