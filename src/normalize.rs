use crate::types::DocType;
use regex::Regex;
use std::sync::LazyLock;

static NON_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").unwrap());

const CPF_LEN: usize = 11;
const CNPJ_LEN: usize = 14;
const MASK_MARKER: &str = "MASCAR";

/// Strips every non-digit character. `None` when the input is missing, blank,
/// or contains no digits at all.
pub fn clean_digits(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    let digits = NON_DIGIT_RE.replace_all(trimmed, "");
    if digits.is_empty() {
        None
    } else {
        Some(digits.into_owned())
    }
}

/// Masked documents ("***.456.789-**", "CPF MASCARADO") are never counted.
pub fn is_masked(raw: &str) -> bool {
    raw.contains('*') || raw.to_uppercase().contains(MASK_MARKER)
}

/// Classifies a raw document string by digit count alone; no check digits
/// are verified.
pub fn detect_doc_type(raw: Option<&str>) -> DocType {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return DocType::Unknown;
    };
    if is_masked(raw) {
        return DocType::Unknown;
    }
    match clean_digits(Some(raw)).map(|d| d.len()) {
        Some(CPF_LEN) => DocType::Cpf,
        Some(CNPJ_LEN) => DocType::Cnpj,
        _ => DocType::Unknown,
    }
}

/// Normalized document: digits only, or the trimmed raw text when no digit
/// survives cleaning.
pub fn normalize_document(raw: Option<&str>) -> Option<String> {
    clean_digits(raw).or_else(|| raw.map(|r| r.trim().to_string()))
}
