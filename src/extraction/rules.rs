//! Process-wide lookup tables: selectors, keyword priorities, regex patterns
//! and the appliance vocabulary. Order inside every table is significant.

use std::sync::LazyLock;

use regex::Regex;

pub const GROUND_FLOOR: &str = "parter";
pub const YES: &str = "tak";

// --- selectors ---

pub const SUMMARY_CONTAINER: &str = ".offer-header-container";
pub const SUMMARY_CITY: &str = ".offer-header__city";
pub const SUMMARY_STREET: &str = ".offer-header__street";
pub const SUMMARY_ROWS: &str = ".offer-summary__item div[role=\"row\"]";
pub const SUMMARY_VALUE: &str = ".offer-summary__value";
pub const DESCRIPTION_CONTAINER: &str = ".offer-description";
pub const DESCRIPTION_TEXT: &str = ".offer-description__text";
pub const DESCRIPTION_ITEMS: &str = ".offer-description__summary li";
pub const STRUCTURED_PAYLOADS: &str = "script[type=\"application/ld+json\"]";

/// Which summary value a row carries, decided by its label.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SummaryLabel { PricePerSqm, Floor, YearBuilt }

/// Row labels are tested in this order; a row belongs to the first label it mentions.
pub const SUMMARY_LABELS: &[(SummaryLabel, &[&str])] = &[
    (SummaryLabel::PricePerSqm, &["Cena za m²", "Cena za m2"]),
    (SummaryLabel::Floor, &["Piętro"]),
    (SummaryLabel::YearBuilt, &["Rok budowy"]),
];

// --- keyword rules ---

/// A value that applies when any one group of keywords is fully present.
#[derive(Debug)]
pub struct KeywordRule {
    pub value: &'static str,
    pub any_of: &'static [&'static [&'static str]],
}

impl KeywordRule {
    pub fn matches(&self, text_lower: &str) -> bool {
        self.any_of.iter().any(|all| all.iter().all(|kw| text_lower.contains(kw)))
    }
}

/// First matching rule wins.
pub fn first_match(rules: &[KeywordRule], text_lower: &str) -> Option<&'static str> {
    rules.iter().find(|r| r.matches(text_lower)).map(|r| r.value)
}

pub const BUILDING_TYPE_ITEM_RULES: &[KeywordRule] = &[
    KeywordRule { value: "kamienica", any_of: &[&["kamienica"]] },
    KeywordRule { value: "blok", any_of: &[&["blok"]] },
    KeywordRule { value: "apartamentowiec", any_of: &[&["apartamentowiec"]] },
    KeywordRule { value: "dom", any_of: &[&["dom", "budyn"]] },
];

// whole-page priority differs from the list priority; an elevator implies a block
pub const BUILDING_TYPE_PAGE_RULES: &[KeywordRule] = &[
    KeywordRule { value: "apartamentowiec", any_of: &[&["apartamentowiec"]] },
    KeywordRule { value: "kamienica", any_of: &[&["kamienica"]] },
    KeywordRule { value: "blok", any_of: &[&["blok"], &["winda"]] },
];

pub const BASEMENT_RULES: &[KeywordRule] = &[
    KeywordRule { value: YES, any_of: &[&["piwnica"]] },
];

pub const PARKING_RULES: &[KeywordRule] = &[
    KeywordRule { value: YES, any_of: &[&["miejsce parkingowe"], &["parking"], &["garaż"]] },
];

pub const KITCHEN_RULES: &[KeywordRule] = &[
    KeywordRule { value: "osobna", any_of: &[&["osobna kuchnia"], &["oddzielna kuchnia"]] },
    KeywordRule { value: "aneks", any_of: &[&["aneks kuchenny"]] },
    KeywordRule { value: "aneks", any_of: &[&["aneks", "kuchni"], &["aneks", "salon"]] },
];

pub const WINDOW_RULES: &[KeywordRule] = &[
    KeywordRule { value: "plastikowe", any_of: &[&["okna plastikowe"], &["pvc"], &["pcv"]] },
    KeywordRule { value: "drewniane", any_of: &[&["okna drewniane"]] },
];

// "własność" alone is too generic: it needs the land-register mention or a
// separate-ownership phrase before the cooperative variants get a chance
pub const OWNERSHIP_RULES: &[KeywordRule] = &[
    KeywordRule { value: "własność", any_of: &[&["odrębna własność"], &["własność", "księga"]] },
    KeywordRule { value: "spółdzielcze własnościowe", any_of: &[&["spółdzielcze własnościowe"]] },
    KeywordRule { value: "spółdzielcze lokatorskie", any_of: &[&["spółdzielcze lokatorskie"]] },
    KeywordRule { value: "własność", any_of: &[&["własnościowe", "mieszkanie"]] },
];

// --- floors ---

/// A list item is only read for a floor when it mentions one of these.
pub const FLOOR_ITEM_TRIGGERS: &[&str] = &["piętro", "piętrze"];

// --- equipment ---

pub const EQUIPMENT_LABEL: &str = "Wyposażenie";
pub const EQUIPMENT_MARKER: &str = "wyposażenie:";

/// Appliance vocabulary including inflected variants; scan order decides
/// which variant survives deduplication.
pub const APPLIANCES: &[&str] = &[
    "lodówka", "lodowka", "lodówkę",
    "zmywarka", "zmywarkę",
    "pralka", "pralkę",
    "suszarka", "suszarkę",
    "piekarnik",
    "kuchenka", "kuchenkę",
    "mikrofalówka", "mikrofalowka",
    "telewizor", "tv",
    "klimatyzacja", "klimatyzacje",
    "internet",
    "wifi", "wi-fi",
];

/// Stripped from the end of a vocabulary entry before comparing for duplicates.
pub const INFLECTION_VOWELS: &[char] = &['a', 'ą', 'e', 'ę', 'i', 'o', 'u', 'y'];

// --- regex tables ---

pub struct Patterns {
    pub floor_item: Regex,
    pub floor_page: Vec<Regex>,
    pub year_item: Vec<Regex>,
    pub year_page: Vec<Regex>,
    pub first_digits: Regex,
    pub first_year: Regex,
    pub floor_of_total: Regex,
    pub total_floors_item: Vec<Regex>,
    pub total_floors_page: Vec<Regex>,
}

fn compile(src: &str) -> Regex {
    Regex::new(src).expect("built-in pattern must compile")
}

fn compile_all(srcs: &[&str]) -> Vec<Regex> {
    srcs.iter().map(|s| compile(s)).collect()
}

pub static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns {
    floor_item: compile(r"(\d+)\s*(?:piętro|piętrze)"),
    floor_page: compile_all(&[
        r"na\s+(\d+)\s+piętrze",
        r"(\d+)\s*\.\s*piętro",
        r"piętro[:\s]+(\d+)",
        r"(\d+)\s+piętro",
        r"(\d+)\s+z\s+\d+",
    ]),
    year_item: compile_all(&[
        r"\b(19\d{2}|20\d{2})\s*rok",
        r"rok budowy[:\s]+(19\d{2}|20\d{2})",
    ]),
    year_page: compile_all(&[
        r"rok budowy[:\s]+(19\d{2}|20\d{2})",
        r"z\s+(19\d{2}|20\d{2})\s+roku",
        r"budynek\s+z\s+(19\d{2}|20\d{2})",
        r"\b(19\d{2}|20\d{2})\s+rok\b",
    ]),
    first_digits: compile(r"\d+"),
    first_year: compile(r"\b(\d{4})\b"),
    floor_of_total: compile(r"(\d+)\s*(?:/|z)\s*(\d+)"),
    total_floors_item: compile_all(&[
        r"(\d+)\s*-?\s*piętrow",
        r"z\s+(\d+)\s+pięter",
    ]),
    total_floors_page: compile_all(&[
        r"\d+\s+z\s+(\d+)",
        r"budynek\s+(\d+)\s*-?\s*piętrow",
    ]),
});

/// First capture group of the first pattern that matches.
pub fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn building_type_item_priority() {
        let got = first_match(BUILDING_TYPE_ITEM_RULES, "blok, dawniej kamienica");
        assert_eq!(got, Some("kamienica"));
        assert_eq!(first_match(BUILDING_TYPE_ITEM_RULES, "dom wolnostojący"), None);
        assert_eq!(first_match(BUILDING_TYPE_ITEM_RULES, "dom, budynek murowany"), Some("dom"));
    }

    #[test]
    fn ownership_generic_case_needs_land_register() {
        assert_eq!(first_match(OWNERSHIP_RULES, "własność"), None);
        assert_eq!(first_match(OWNERSHIP_RULES, "własność, księga wieczysta"), Some("własność"));
        assert_eq!(
            first_match(OWNERSHIP_RULES, "spółdzielcze własnościowe prawo"),
            Some("spółdzielcze własnościowe")
        );
        assert_eq!(first_match(OWNERSHIP_RULES, "mieszkanie własnościowe"), Some("własność"));
    }

    #[test]
    fn kitchen_annex_needs_context() {
        assert_eq!(first_match(KITCHEN_RULES, "aneks"), None);
        assert_eq!(first_match(KITCHEN_RULES, "salon z aneksem"), Some("aneks"));
        assert_eq!(first_match(KITCHEN_RULES, "oddzielna kuchnia"), Some("osobna"));
    }

    #[test]
    fn patterns_compile_and_capture() {
        let p = &*PATTERNS;
        assert_eq!(first_capture(&p.floor_page, "mieszkanie 4 z 10").as_deref(), Some("4"));
        assert_eq!(first_capture(&p.year_page, "budynek z 1975 roku").as_deref(), Some("1975"));
        assert_eq!(first_capture(&p.total_floors_item, "blok 4-piętrowy").as_deref(), Some("4"));
    }
}
