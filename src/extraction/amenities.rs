use super::normalize::normalize;
use super::rules::{APPLIANCES, EQUIPMENT_LABEL, INFLECTION_VOWELS};

/// Scan free text for appliance terms and render them as
/// `"Wyposażenie: a, b, c"`. Inflected variants of one term collapse to the
/// first variant found. Empty when nothing matches.
pub fn match_amenities(text: &str) -> String {
    let text_lower = normalize(text).to_lowercase();
    if text_lower.is_empty() { return String::new(); }

    let mut found: Vec<&str> = Vec::new();
    let mut seen_stems: Vec<&str> = Vec::new();
    for term in APPLIANCES.iter().copied() {
        if !text_lower.contains(term) { continue; }
        let stem = stem(term);
        if seen_stems.contains(&stem) { continue; }
        seen_stems.push(stem);
        found.push(term);
    }

    if found.is_empty() { return String::new(); }
    found.sort_unstable();
    format!("{}: {}", EQUIPMENT_LABEL, found.join(", "))
}

fn stem(term: &str) -> &str {
    term.strip_suffix(INFLECTION_VOWELS).unwrap_or(term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inflected_duplicate_collapses() {
        let got = match_amenities("lodówka, lodówkę, zmywarka");
        assert_eq!(got, "Wyposażenie: lodówka, zmywarka");
    }

    #[test]
    fn accusative_only_is_still_found() {
        let got = match_amenities("Zostawiamy pralkę i KLIMATYZACJE w salonie");
        assert_eq!(got, "Wyposażenie: klimatyzacje, pralkę");
    }

    #[test]
    fn sorted_and_labelled() {
        let got = match_amenities("Internet światłowodowy, piekarnik, wifi");
        assert_eq!(got, "Wyposażenie: internet, piekarnik, wifi");
    }

    #[test]
    fn nothing_matches() {
        assert_eq!(match_amenities("Przestronne mieszkanie z balkonem"), "");
        assert_eq!(match_amenities(""), "");
    }
}
