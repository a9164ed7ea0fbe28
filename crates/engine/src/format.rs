//! Display policy for survey readings: missing computes as `0` and renders
//! as `N/A`.

/// Placeholder rendered for missing readings.
pub const MISSING: &str = "N/A";

const STRUCTURE_ABBREVIATIONS: [(&str, &str); 6] = [
    ("SVUP", "Small Vehicle Under Pass"),
    ("VUP", "Vehicle Under Pass"),
    ("LVUP", "Large Vehicle Under Pass"),
    ("PUP", "Pedestrian Under Pass"),
    ("CUP", "Cattle Under Pass"),
    ("AUP", "Animal Under Pass"),
];

/// Reads a missing or non-finite value as `0`.
pub fn or_zero(value: Option<f64>) -> f64 {
    value.filter(|value| value.is_finite()).unwrap_or(0.0)
}

/// Formats a reading with `precision` decimals, or [`MISSING`].
///
/// # Example
/// ```
/// use engine::format::display;
///
/// assert_eq!(display(Some(4.567), 1), "4.6");
/// assert_eq!(display(None, 1), "N/A");
/// ```
pub fn display(value: Option<f64>, precision: usize) -> String {
    match value.filter(|value| value.is_finite()) {
        Some(value) => format!("{value:.precision$}"),
        None => MISSING.to_owned(),
    }
}

/// Converts a `[0, 1]` score to percent, missing as `0`.
pub fn percent(score: Option<f64>) -> f64 {
    or_zero(score) * 100.0
}

pub fn display_percent(score: Option<f64>, precision: usize) -> String {
    format!("{:.precision$}%", percent(score))
}

/// Signed distance of a reading from its limit: `+x.x` above, `-x.x` below.
///
/// # Example
/// ```
/// use engine::format::display_difference;
///
/// assert_eq!(display_difference(Some(2400.0), Some(2000.0)), "+400.0");
/// assert_eq!(display_difference(Some(3.0), None), "N/A");
/// ```
pub fn display_difference(measured: Option<f64>, limit: Option<f64>) -> String {
    let (Some(measured), Some(limit)) = (
        measured.filter(|value| value.is_finite()),
        limit.filter(|value| value.is_finite()),
    ) else {
        return MISSING.to_owned();
    };

    let difference = measured - limit;
    if difference > 0.0 {
        format!("+{:.1}", difference.abs())
    } else if difference < 0.0 {
        format!("-{:.1}", difference.abs())
    } else {
        "0.0".to_owned()
    }
}

/// Appends the full name to known under-pass abbreviations.
///
/// Matching is whole-word and case-insensitive; the abbreviation is written
/// back in upper case.
///
/// # Example
/// ```
/// use engine::format::expand_structure_abbreviations;
///
/// assert_eq!(
///     expand_structure_abbreviations("Minor bridge, vup"),
///     "Minor bridge, VUP (Vehicle Under Pass)"
/// );
/// ```
pub fn expand_structure_abbreviations(structure: &str) -> String {
    let mut expanded = String::with_capacity(structure.len());
    let mut word = String::new();
    for ch in structure.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            word.push(ch);
            continue;
        }
        push_word(&mut expanded, &word);
        word.clear();
        expanded.push(ch);
    }
    push_word(&mut expanded, &word);
    expanded
}

fn push_word(out: &mut String, word: &str) {
    let known = STRUCTURE_ABBREVIATIONS
        .iter()
        .find(|(abbreviation, _)| abbreviation.eq_ignore_ascii_case(word));
    match known {
        Some((abbreviation, full_form)) => {
            out.push_str(abbreviation);
            out.push_str(" (");
            out.push_str(full_form);
            out.push(')');
        }
        None => out.push_str(word),
    }
}
