//! Расстояние между точками на сфере

/// Радиус Земли (метры)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Расстояние по сферической теореме косинусов, координаты в градусах
///
/// Аргумент `acos` ограничивается отрезком [-1, 1]: для совпадающих и
/// противоположных точек ошибка округления выводит его за границы.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let cos_angle = phi1.sin() * phi2.sin() + phi1.cos() * phi2.cos() * delta_lambda.cos();

    cos_angle.clamp(-1.0, 1.0).acos() * EARTH_RADIUS_M
}
