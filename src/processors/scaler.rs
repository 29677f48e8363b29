use crate::models::remark::Remark;

/// 16-point compass plus calm: (Japanese label, English abbreviation, archive code).
pub const COMPASS_POINTS: [(&str, &str, u8); 17] = [
    ("静穏", "Calm", 0),
    ("北北東", "NNE", 1),
    ("北東", "NE", 2),
    ("東北東", "ENE", 3),
    ("東", "E", 4),
    ("東南東", "ESE", 5),
    ("南東", "SE", 6),
    ("南南東", "SSE", 7),
    ("南", "S", 8),
    ("南南西", "SSW", 9),
    ("南西", "SW", 10),
    ("西南西", "WSW", 11),
    ("西", "W", 12),
    ("西北西", "WNW", 13),
    ("北西", "NW", 14),
    ("北北西", "NNW", 15),
    ("北", "N", 16),
];

/// Physical value to fixed-point integer, rounding half away from zero.
pub fn scale(value: f64, factor: f64) -> i32 {
    (value * factor).round() as i32
}

pub fn unscale(value: i32, factor: f64) -> f64 {
    f64::from(value) / factor
}

pub fn direction_code(label: &str) -> Option<u8> {
    let label = label.trim();
    COMPASS_POINTS
        .iter()
        .find(|(jp, en, _)| *jp == label || en.eq_ignore_ascii_case(label))
        .map(|(_, _, code)| *code)
}

/// Compass label to code; unknown text yields code 0 with remark "not observed".
pub fn compass_code(label: &str, remark: Remark) -> (u8, Remark) {
    match direction_code(label) {
        Some(code) => (code, remark),
        None => (0, Remark::NotObserved),
    }
}

pub fn direction_label(code: u8) -> Option<&'static str> {
    COMPASS_POINTS
        .iter()
        .find(|(_, _, c)| *c == code)
        .map(|(jp, _, _)| *jp)
}

/// Direction code to vector angle in degrees, `(-90 - 22.5 d) mod 360`.
pub fn direction_bearing(code: f64) -> f64 {
    (-90.0 - code * 22.5).rem_euclid(360.0)
}
