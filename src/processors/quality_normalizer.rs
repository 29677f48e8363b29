use crate::models::remark::Remark;
use crate::models::signal::RawSignal;

const MISSING_MARKERS: [&str; 2] = ["///", "×"];
const NO_PHENOMENON_MARKER: &str = "--";
const ESTIMATED_MARKERS: [char; 3] = [')', ']', '#'];

/// Why a signal degraded to "missing" during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalIssue {
    Unparseable(String),
    EmptyValue,
}

impl std::fmt::Display for SignalIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalIssue::Unparseable(token) => write!(f, "unparseable value '{}'", token),
            SignalIssue::EmptyValue => write!(f, "value missing for a reported observation"),
        }
    }
}

/// Numeric value in source units paired with its canonical remark.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub value: Option<f64>,
    pub remark: Remark,
    pub issue: Option<SignalIssue>,
}

impl Normalized {
    fn new(value: Option<f64>, remark: Remark) -> Self {
        Self {
            value,
            remark,
            issue: None,
        }
    }

    fn degraded(issue: SignalIssue) -> Self {
        Self {
            value: None,
            remark: Remark::Missing,
            issue: Some(issue),
        }
    }
}

/// Text token with quality markers removed, paired with its canonical remark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub token: Option<String>,
    pub remark: Remark,
}

/// Normalizes a raw signal carrying a numeric quantity.
pub fn normalize(signal: &RawSignal) -> Normalized {
    match signal {
        RawSignal::Symbol(token) => normalize_symbol(token),
        RawSignal::Numeric {
            value,
            quality,
            phenomenon_absent,
        } => normalize_numeric(
            value.as_deref(),
            quality.as_deref(),
            phenomenon_absent.as_deref(),
        ),
    }
}

/// Normalizes a raw signal carrying a text quantity such as a compass label.
pub fn normalize_text(signal: &RawSignal) -> NormalizedText {
    match signal {
        RawSignal::Symbol(token) => {
            let (cleaned, remark) = strip_symbol_markers(token);
            NormalizedText {
                token: cleaned,
                remark,
            }
        }
        RawSignal::Numeric {
            value,
            quality,
            phenomenon_absent,
        } => {
            let remark = numeric_remark(quality.as_deref(), phenomenon_absent.as_deref());
            let token = value
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty() && !remark.is_absent())
                .map(str::to_string);
            NormalizedText { token, remark }
        }
    }
}

/// Symbol-tagged token: markers embedded in the literal value.
pub fn normalize_symbol(token: &str) -> Normalized {
    let (cleaned, remark) = strip_symbol_markers(token);

    match (cleaned, remark) {
        (_, Remark::NoPhenomenon) => Normalized::new(Some(0.0), Remark::NoPhenomenon),
        (None, remark) => Normalized::new(None, remark),
        (Some(text), remark) => match parse_number(&text) {
            Some(value) => Normalized::new(Some(value), remark),
            None => Normalized::degraded(SignalIssue::Unparseable(token.trim().to_string())),
        },
    }
}

/// Numeric quality code plus optional phenomenon-absent flag.
pub fn normalize_numeric(
    value: Option<&str>,
    quality: Option<&str>,
    phenomenon_absent: Option<&str>,
) -> Normalized {
    let remark = numeric_remark(quality, phenomenon_absent);

    match remark {
        Remark::NoPhenomenon => Normalized::new(Some(0.0), remark),
        Remark::Missing | Remark::NotObserved => Normalized::new(None, remark),
        _ => {
            let text = value.map(str::trim).unwrap_or("");
            if text.is_empty() || text == NO_PHENOMENON_MARKER {
                return Normalized::degraded(SignalIssue::EmptyValue);
            }
            match parse_number(text) {
                Some(v) => Normalized::new(Some(v), remark),
                None => Normalized::degraded(SignalIssue::Unparseable(text.to_string())),
            }
        }
    }
}

/// Maps a numeric quality code to a remark; unknown codes degrade to "not observed".
pub fn numeric_remark(quality: Option<&str>, phenomenon_absent: Option<&str>) -> Remark {
    let quality = quality.and_then(|q| q.trim().parse::<i64>().ok());
    let phenomenon_absent = phenomenon_absent
        .and_then(|p| p.trim().parse::<i64>().ok())
        .map_or(false, |p| p == 1);

    match quality {
        Some(8) if phenomenon_absent => Remark::NoPhenomenon,
        Some(8) => Remark::Normal,
        Some(5) | Some(4) | Some(2) => Remark::Estimated,
        Some(1) => Remark::Missing,
        Some(0) => Remark::NotObserved,
        _ => Remark::NotObserved,
    }
}

fn strip_symbol_markers(token: &str) -> (Option<String>, Remark) {
    let trimmed = token.trim();

    if trimmed.is_empty() {
        return (None, Remark::NotObserved);
    }
    if MISSING_MARKERS.contains(&trimmed) {
        return (None, Remark::Missing);
    }
    if trimmed == NO_PHENOMENON_MARKER {
        return (None, Remark::NoPhenomenon);
    }

    let remark = if trimmed.contains(&ESTIMATED_MARKERS[..]) {
        Remark::Estimated
    } else {
        Remark::Normal
    };

    let cleaned: String = trimmed
        .chars()
        .filter(|c| !ESTIMATED_MARKERS.contains(c))
        .collect::<String>()
        .trim()
        .to_string();

    if cleaned.is_empty() {
        return (None, Remark::Missing);
    }

    (Some(cleaned), remark)
}

fn parse_number(text: &str) -> Option<f64> {
    text.replace('−', "-")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
