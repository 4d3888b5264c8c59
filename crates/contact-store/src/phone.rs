//! Phone number normalization

/// Bring a stored number into international form.
///
/// Separators are removed, an existing `+` prefix is kept, a leading `00`
/// becomes `+`, a single trunk `0` is dropped, and anything else gets
/// `default_prefix`. The result always starts with `+`, so normalizing twice
/// gives the same number.
pub fn normalize_phone(raw: &str, default_prefix: &str) -> String {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')' | '\t'))
        .collect();

    if compact.starts_with('+') {
        return compact;
    }
    if let Some(rest) = compact.strip_prefix("00") {
        return format!("+{rest}");
    }

    let local = compact.strip_prefix('0').unwrap_or(&compact);
    format!("{}{}", prefix_with_plus(default_prefix), local)
}

fn prefix_with_plus(prefix: &str) -> String {
    let digits = prefix.trim().trim_start_matches('+');
    format!("+{digits}")
}
