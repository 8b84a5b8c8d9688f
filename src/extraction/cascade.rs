//! Field cascades: an ordered list of independent strategies per field.
//! The first strategy returning a value commits it; later ones never run
//! for that field.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::warn;

use super::{ExtractConfig, ExtractError};
use super::amenities::match_amenities;
use super::evidence::Evidence;
use super::normalize::{normalize, normalize_opt};
use super::record::{DetailsRecord, Field};
use super::rules::{self, first_capture, first_match, KeywordRule, SummaryLabel, GROUND_FLOOR, PATTERNS};

/// Where a strategy looks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source { Summary, Description, ListItems, PageText, Payloads }

pub type Resolve = fn(&Evidence<'_>, &ExtractConfig) -> Option<String>;

pub struct Strategy {
    pub name: &'static str,
    pub source: Source,
    pub resolve: Resolve,
}

pub struct Cascade {
    pub field: Field,
    pub strategies: &'static [Strategy],
}

/// Which strategy produced a committed field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub field: &'static str,
    pub strategy: &'static str,
    pub source: Source,
}

const fn s(name: &'static str, source: Source, resolve: Resolve) -> Strategy {
    Strategy { name, source, resolve }
}

/// Cascades in evaluation order.
pub const CASCADES: &[Cascade] = &[
    Cascade { field: Field::CityDistrict, strategies: &[s("header_city", Source::Summary, header_city)] },
    Cascade { field: Field::FullAddress, strategies: &[s("header_street", Source::Summary, header_street)] },
    Cascade { field: Field::PricePerSqmDetailed, strategies: &[s("summary_price", Source::Summary, summary_price)] },
    Cascade {
        field: Field::Floor,
        strategies: &[
            s("summary_floor", Source::Summary, summary_floor),
            s("item_floor", Source::ListItems, item_floor),
            s("page_floor", Source::PageText, page_floor),
        ],
    },
    Cascade {
        field: Field::TotalFloors,
        strategies: &[
            s("summary_total_floors", Source::Summary, summary_total_floors),
            s("item_total_floors", Source::ListItems, item_total_floors),
            s("page_total_floors", Source::PageText, page_total_floors),
        ],
    },
    Cascade {
        field: Field::YearBuilt,
        strategies: &[
            s("summary_year", Source::Summary, summary_year),
            s("item_year", Source::ListItems, item_year),
            s("page_year", Source::PageText, page_year),
        ],
    },
    Cascade { field: Field::DescriptionText, strategies: &[s("description_text", Source::Description, description_text)] },
    Cascade {
        field: Field::BuildingType,
        strategies: &[
            s("item_building_type", Source::ListItems, item_building_type),
            s("page_building_type", Source::PageText, page_building_type),
        ],
    },
    Cascade { field: Field::HasBasement, strategies: &[s("item_basement", Source::ListItems, item_basement)] },
    Cascade { field: Field::HasParking, strategies: &[s("item_parking", Source::ListItems, item_parking)] },
    Cascade { field: Field::KitchenType, strategies: &[s("item_kitchen", Source::ListItems, item_kitchen)] },
    Cascade { field: Field::WindowType, strategies: &[s("item_windows", Source::ListItems, item_windows)] },
    Cascade { field: Field::OwnershipType, strategies: &[s("item_ownership", Source::ListItems, item_ownership)] },
    Cascade {
        field: Field::Equipment,
        strategies: &[
            s("item_equipment", Source::ListItems, item_equipment),
            s("description_amenities", Source::Description, description_amenities),
        ],
    },
    Cascade { field: Field::Latitude, strategies: &[s("payload_latitude", Source::Payloads, payload_latitude)] },
    Cascade { field: Field::Longitude, strategies: &[s("payload_longitude", Source::Payloads, payload_longitude)] },
];

/// Run `cascades` in order against `ev`, committing into `record`.
/// Fields already set in `record` are left alone.
pub fn resolve_with(
    cascades: &[Cascade],
    ev: &Evidence<'_>,
    cfg: &ExtractConfig,
    record: &mut DetailsRecord,
    issues: &mut Vec<ExtractError>,
) -> Vec<Commit> {
    let mut trace = Vec::new();
    for cascade in cascades {
        if let Some(commit) = resolve_field(cascade, ev, cfg, record, issues) {
            trace.push(commit);
        }
    }
    trace
}

/// A strategy that panics counts as no match; the failure is pushed to
/// `issues` and the next strategy runs.
pub fn resolve_field(
    cascade: &Cascade,
    ev: &Evidence<'_>,
    cfg: &ExtractConfig,
    record: &mut DetailsRecord,
    issues: &mut Vec<ExtractError>,
) -> Option<Commit> {
    for strategy in cascade.strategies {
        if record.is_set(cascade.field) { return None; }
        let found = match panic::catch_unwind(AssertUnwindSafe(|| (strategy.resolve)(ev, cfg))) {
            Ok(found) => found,
            Err(payload) => {
                let e = ExtractError::Strategy {
                    field: cascade.field.column(),
                    strategy: strategy.name,
                    reason: panic_reason(payload.as_ref()),
                };
                warn!(error = %e, "strategy skipped");
                issues.push(e);
                continue;
            }
        };
        let Some(value) = found else { continue };
        if record.commit(cascade.field, value) {
            return Some(Commit { field: cascade.field.column(), strategy: strategy.name, source: strategy.source });
        }
    }
    None
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() { return s.to_string(); }
    if let Some(s) = payload.downcast_ref::<String>() { return s.clone(); }
    "panicked".to_string()
}

// --- helpers ---

fn items_lower<'e>(ev: &'e Evidence<'_>) -> impl Iterator<Item = (&'e str, String)> + 'e {
    ev.description
        .iter()
        .flat_map(|d| d.items.iter())
        .map(|raw| (raw.as_str(), raw.to_lowercase()))
}

/// First list item (document order) matching a keyword table.
fn item_keyword(ev: &Evidence<'_>, table: &[KeywordRule]) -> Option<String> {
    items_lower(ev).find_map(|(_, lower)| first_match(table, &lower)).map(str::to_string)
}

fn summary_value<'e>(ev: &'e Evidence<'_>, kind: SummaryLabel) -> impl Iterator<Item = &'e str> + 'e {
    ev.summary.iter().flat_map(move |s| s.values(kind))
}

pub fn plausible_year(candidate: &str, cfg: &ExtractConfig) -> Option<String> {
    if candidate.len() != 4 { return None; }
    let year: u16 = candidate.parse().ok()?;
    (cfg.year_min..=cfg.year_max).contains(&year).then(|| candidate.to_string())
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

// --- summary container ---

fn header_city(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    non_empty(&normalize_opt(ev.summary.as_ref()?.city.as_deref()))
}

fn header_street(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    non_empty(&normalize_opt(ev.summary.as_ref()?.street.as_deref()))
}

fn summary_price(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    summary_value(ev, SummaryLabel::PricePerSqm).find_map(non_empty)
}

fn summary_floor(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    summary_value(ev, SummaryLabel::Floor).find_map(|v| {
        let lower = v.to_lowercase();
        if lower.contains(GROUND_FLOOR) { return Some(GROUND_FLOOR.to_string()); }
        PATTERNS.first_digits.find(&lower).map(|m| m.as_str().to_string())
    })
}

fn summary_total_floors(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    summary_value(ev, SummaryLabel::Floor).find_map(|v| {
        PATTERNS.floor_of_total.captures(&v.to_lowercase()).and_then(|c| c.get(2)).map(|m| m.as_str().to_string())
    })
}

fn summary_year(ev: &Evidence<'_>, cfg: &ExtractConfig) -> Option<String> {
    summary_value(ev, SummaryLabel::YearBuilt).find_map(|v| {
        let caps = PATTERNS.first_year.captures(v)?;
        plausible_year(caps.get(1)?.as_str(), cfg)
    })
}

// --- description list items ---

fn item_floor(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    items_lower(ev).find_map(|(_, lower)| {
        if !rules::FLOOR_ITEM_TRIGGERS.iter().any(|t| lower.contains(t)) { return None; }
        if let Some(c) = PATTERNS.floor_item.captures(&lower) {
            return c.get(1).map(|m| m.as_str().to_string());
        }
        lower.contains(GROUND_FLOOR).then(|| GROUND_FLOOR.to_string())
    })
}

fn item_total_floors(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    items_lower(ev).find_map(|(_, lower)| first_capture(&PATTERNS.total_floors_item, &lower))
}

fn item_year(ev: &Evidence<'_>, cfg: &ExtractConfig) -> Option<String> {
    items_lower(ev).find_map(|(_, lower)| {
        PATTERNS.year_item.iter().find_map(|re| {
            let caps = re.captures(&lower)?;
            plausible_year(caps.get(1)?.as_str(), cfg)
        })
    })
}

fn item_building_type(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    item_keyword(ev, rules::BUILDING_TYPE_ITEM_RULES)
}

fn item_basement(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    item_keyword(ev, rules::BASEMENT_RULES)
}

fn item_parking(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    item_keyword(ev, rules::PARKING_RULES)
}

fn item_kitchen(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    item_keyword(ev, rules::KITCHEN_RULES)
}

fn item_windows(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    item_keyword(ev, rules::WINDOW_RULES)
}

fn item_ownership(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    item_keyword(ev, rules::OWNERSHIP_RULES)
}

fn item_equipment(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    items_lower(ev).find_map(|(raw, _)| explicit_equipment(raw))
}

/// The `wyposażenie: ...` fragment of an item, with its original casing.
fn explicit_equipment(raw: &str) -> Option<String> {
    let start = find_caseless(raw, rules::EQUIPMENT_MARKER)?;
    non_empty(&normalize(&raw[start..]))
}

/// Byte offset in `haystack` where `needle_lower` starts, comparing the
/// lowercase expansion of each char.
fn find_caseless(haystack: &str, needle_lower: &str) -> Option<usize> {
    haystack.char_indices().map(|(i, _)| i).find(|&i| {
        let mut lowered = haystack[i..].chars().flat_map(char::to_lowercase);
        needle_lower.chars().all(|n| lowered.next() == Some(n))
    })
}

// --- description prose ---

fn description_text(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    non_empty(&normalize_opt(ev.description.as_ref()?.text.as_deref()))
}

fn description_amenities(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    let text = ev.description.as_ref()?.text.as_deref()?;
    non_empty(&match_amenities(text))
}

// --- whole page ---

fn page_floor(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    if ev.page_text_lower.contains(GROUND_FLOOR) { return Some(GROUND_FLOOR.to_string()); }
    first_capture(&PATTERNS.floor_page, ev.page_text_lower)
}

fn page_total_floors(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    first_capture(&PATTERNS.total_floors_page, ev.page_text_lower)
}

fn page_year(ev: &Evidence<'_>, cfg: &ExtractConfig) -> Option<String> {
    PATTERNS.year_page.iter().find_map(|re| {
        let caps = re.captures(ev.page_text_lower)?;
        plausible_year(caps.get(1)?.as_str(), cfg)
    })
}

fn page_building_type(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    first_match(rules::BUILDING_TYPE_PAGE_RULES, ev.page_text_lower).map(str::to_string)
}

// --- structured payloads ---

fn payload_latitude(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    non_empty(&ev.geo.0)
}

fn payload_longitude(ev: &Evidence<'_>, _: &ExtractConfig) -> Option<String> {
    non_empty(&ev.geo.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::evidence::{Description, Summary, SummaryRow};

    fn items(list: &[&str]) -> Option<Description> {
        Some(Description { text: None, items: list.iter().map(|s| s.to_string()).collect() })
    }

    fn resolve(ev: &Evidence<'_>) -> DetailsRecord {
        let mut rec = DetailsRecord::default();
        resolve_with(CASCADES, ev, &ExtractConfig::default(), &mut rec, &mut Vec::new());
        rec
    }

    #[test]
    fn one_item_feeds_several_fields() {
        let ev = Evidence {
            description: items(&["Mieszkanie na 3 piętrze, rok budowy 1998, piwnica, miejsce parkingowe"]),
            ..Default::default()
        };
        let rec = resolve(&ev);
        assert_eq!(rec.floor, "3");
        assert_eq!(rec.year_built, "1998");
        assert_eq!(rec.has_basement, "tak");
        assert_eq!(rec.has_parking, "tak");
    }

    #[test]
    fn first_matching_item_wins() {
        let ev = Evidence {
            description: items(&["2 piętro", "5 piętro", "kamienica", "blok"]),
            ..Default::default()
        };
        let rec = resolve(&ev);
        assert_eq!(rec.floor, "2");
        assert_eq!(rec.building_type, "kamienica");
    }

    #[test]
    fn summary_beats_later_sources() {
        let ev = Evidence {
            summary: Some(Summary {
                rows: vec![SummaryRow { label: "Piętro parter".into(), value: Some("parter".into()) }],
                ..Default::default()
            }),
            description: items(&["4 piętro"]),
            page_text_lower: "mieszkanie na 7 piętrze",
            ..Default::default()
        };
        let mut rec = DetailsRecord::default();
        let trace = resolve_with(CASCADES, &ev, &ExtractConfig::default(), &mut rec, &mut Vec::new());
        assert_eq!(rec.floor, "parter");
        assert!(trace.iter().any(|c| c.field == "floor" && c.strategy == "summary_floor"));
    }

    #[test]
    fn page_fallback_floor_of_total() {
        let ev = Evidence { page_text_lower: "mieszkanie 4 z 10, winda", ..Default::default() };
        let rec = resolve(&ev);
        assert_eq!(rec.floor, "4");
        assert_eq!(rec.total_floors, "10");
        assert_eq!(rec.building_type, "blok");
    }

    #[test]
    fn implausible_years_are_skipped() {
        let cfg = ExtractConfig::default();
        assert_eq!(plausible_year("1899", &cfg), None);
        assert_eq!(plausible_year("2031", &cfg), None);
        assert_eq!(plausible_year("2030", &cfg).as_deref(), Some("2030"));

        let ev = Evidence {
            description: items(&["2095 rok oddania"]),
            page_text_lower: "rok budowy: 2099, budynek z 1962 roku",
            ..Default::default()
        };
        assert_eq!(resolve(&ev).year_built, "1962");
    }

    #[test]
    fn preset_field_is_not_overwritten() {
        let ev = Evidence { description: items(&["3 piętro"]), ..Default::default() };
        let mut rec = DetailsRecord::default();
        rec.commit(Field::Floor, "1");
        let trace = resolve_with(CASCADES, &ev, &ExtractConfig::default(), &mut rec, &mut Vec::new());
        assert_eq!(rec.floor, "1");
        assert!(trace.iter().all(|c| c.field != "floor"));
    }

    #[test]
    fn explicit_equipment_beats_amenity_scan() {
        let ev = Evidence {
            description: Some(Description {
                text: Some("W kuchni lodówka i zmywarka.".into()),
                items: vec!["Wyposażenie: Pralka, Lodówka".into()],
            }),
            ..Default::default()
        };
        assert_eq!(resolve(&ev).equipment, "Wyposażenie: Pralka, Lodówka");

        let ev = Evidence {
            description: Some(Description { text: Some("W kuchni lodówka i zmywarka.".into()), items: vec![] }),
            ..Default::default()
        };
        assert_eq!(resolve(&ev).equipment, "Wyposażenie: lodówka, zmywarka");
    }

    #[test]
    fn header_lines_are_normalized_and_blank_is_unresolved() {
        let ev = Evidence {
            summary: Some(Summary { city: Some(" Łódź,\u{00A0} Bałuty ".into()), street: Some(" \n ".into()), rows: vec![] }),
            ..Default::default()
        };
        let rec = resolve(&ev);
        assert_eq!(rec.city_district, "Łódź, Bałuty");
        assert_eq!(rec.full_address, "");
    }

    #[test]
    fn equipment_fragment_survives_expanding_lowercase() {
        // 'İ' lowercases to two chars
        assert_eq!(explicit_equipment("İİ WYPOSAŻENIE: Pralka").as_deref(), Some("WYPOSAŻENIE: Pralka"));
        assert_eq!(explicit_equipment("Balkon, wyposażenie: lodówka").as_deref(), Some("wyposażenie: lodówka"));
        assert_eq!(explicit_equipment("Balkon"), None);
    }

    #[test]
    fn ground_floor_in_item_needs_floor_word() {
        let ev = Evidence { description: items(&["parter"]), ..Default::default() };
        // item scan ignores it, page text is empty
        assert_eq!(resolve(&ev).floor, "");

        let ev = Evidence { description: items(&["parter, piętro wysokie"]), ..Default::default() };
        assert_eq!(resolve(&ev).floor, "parter");
    }

    fn broken(_: &Evidence<'_>, _: &ExtractConfig) -> Option<String> { panic!("selector drifted") }

    #[test]
    fn failing_strategy_falls_through_to_next() {
        const FLOOR: Cascade = Cascade {
            field: Field::Floor,
            strategies: &[s("broken", Source::Summary, broken), s("item_floor", Source::ListItems, item_floor)],
        };
        let ev = Evidence { description: items(&["2 piętro"]), ..Default::default() };
        let mut rec = DetailsRecord::default();
        let mut issues = Vec::new();

        let commit = resolve_field(&FLOOR, &ev, &ExtractConfig::default(), &mut rec, &mut issues);
        assert_eq!(rec.floor, "2");
        assert_eq!(commit.map(|c| c.strategy), Some("item_floor"));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].to_string(), "broken failed for floor: selector drifted");
    }

    #[test]
    fn every_field_has_a_cascade() {
        for field in Field::ALL {
            assert!(CASCADES.iter().any(|c| c.field == field), "no cascade for {:?}", field);
        }
    }
}
