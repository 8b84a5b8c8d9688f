use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Serialize;

use crate::table::Table;

const PRICE_ASK_MARKER: &str = "zapytaj";

#[derive(Clone, Copy, Debug)]
pub struct CleanOptions {
    pub min_fields: usize,
    pub remove_price_ask: bool,
}

impl Default for CleanOptions {
    fn default() -> Self { Self { min_fields: 5, remove_price_ask: false } }
}

/// Rows removed by each step, in step order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CleanStats {
    pub initial: usize,
    pub sparse: usize,
    pub no_location: usize,
    pub price_ask: usize,
    pub duplicates: usize,
    pub kept: usize,
}

impl CleanStats {
    pub fn removed(&self) -> usize { self.initial - self.kept }
}

fn blank(cell: &str) -> bool { cell.trim().is_empty() }

/// Apply the cleaning steps in order. The header row is preserved as is.
pub fn clean_table(table: &Table, opts: &CleanOptions) -> Result<(Table, CleanStats)> {
    let mut required = vec!["locality", "street", "url"];
    if opts.remove_price_ask { required.push("price_total_zl"); }
    let missing: Vec<&str> = required.into_iter().filter(|c| table.column(c).is_none()).collect();
    if !missing.is_empty() {
        bail!("input is missing required column(s): {}", missing.join(", "));
    }

    let mut stats = CleanStats { initial: table.len(), ..Default::default() };
    let mut rows: Vec<&Vec<String>> = table.rows.iter().collect();

    let before = rows.len();
    rows.retain(|r| r.iter().filter(|c| !blank(c)).count() >= opts.min_fields);
    stats.sparse = before - rows.len();

    let before = rows.len();
    rows.retain(|r| !blank(table.cell(r, "locality")) && !blank(table.cell(r, "street")));
    stats.no_location = before - rows.len();

    if opts.remove_price_ask {
        let before = rows.len();
        rows.retain(|r| !table.cell(r, "price_total_zl").to_lowercase().contains(PRICE_ASK_MARKER));
        stats.price_ask = before - rows.len();
    }

    // rows without a url are never duplicates of each other
    let before = rows.len();
    let mut seen: HashSet<&str> = HashSet::new();
    rows.retain(|r| {
        let url = table.cell(r, "url").trim();
        url.is_empty() || seen.insert(url)
    });
    stats.duplicates = before - rows.len();

    stats.kept = rows.len();
    let mut out = Table::new(table.headers.iter().cloned());
    out.rows = rows.into_iter().cloned().collect();
    Ok((out, stats))
}

/// `<dir>/<stem without "_detailed">_cleaned.csv`
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().map(|s| s.to_string_lossy().replace("_detailed", "")).unwrap_or_default();
    input.with_file_name(format!("{stem}_cleaned.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
locality,street,rooms,area,price_total_zl,url
Łódź,Piotrkowska,3,54,450000,https://x/1
Łódź,,2,40,300000,https://x/2
Kraków,Długa,,,,https://x/3
Gdańsk,Mariacka,2,38,Zapytaj o cenę,https://x/4
Łódź,Piotrkowska,3,54,450000,https://x/1
Poznań,Półwiejska,4,80,900000,
Poznań,Święty Marcin,1,25,250000,
";

    fn table() -> Table { Table::from_reader(CSV.as_bytes()).unwrap() }

    #[test]
    fn steps_apply_in_order() {
        let (out, stats) = clean_table(&table(), &CleanOptions::default()).unwrap();
        assert_eq!(stats.initial, 7);
        assert_eq!(stats.sparse, 1);
        assert_eq!(stats.no_location, 1);
        assert_eq!(stats.price_ask, 0);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.kept, 4);
        assert_eq!(stats.removed(), 3);
        let streets: Vec<&str> = out.rows.iter().map(|r| out.cell(r, "street")).collect();
        assert_eq!(streets, vec!["Piotrkowska", "Mariacka", "Półwiejska", "Święty Marcin"]);
        assert_eq!(out.headers, table().headers);
    }

    #[test]
    fn price_ask_rows_removed_when_asked() {
        let opts = CleanOptions { remove_price_ask: true, ..Default::default() };
        let (out, stats) = clean_table(&table(), &opts).unwrap();
        assert_eq!(stats.price_ask, 1);
        assert!(out.rows.iter().all(|r| out.cell(r, "locality") != "Gdańsk"));
    }

    #[test]
    fn min_fields_threshold_is_inclusive() {
        let opts = CleanOptions { min_fields: 6, ..Default::default() };
        let (_, stats) = clean_table(&table(), &opts).unwrap();
        assert_eq!(stats.sparse, 4);
        assert_eq!(stats.no_location, 0);
    }

    #[test]
    fn missing_columns_are_an_error() {
        let t = Table::from_reader("locality,url\nŁódź,https://x/1\n".as_bytes()).unwrap();
        let err = clean_table(&t, &CleanOptions::default()).unwrap_err();
        assert!(err.to_string().contains("street"));
    }

    #[test]
    fn output_path_drops_detailed_suffix() {
        assert_eq!(default_output_path(Path::new("data/ogloszenia_lodz_detailed.csv")), PathBuf::from("data/ogloszenia_lodz_cleaned.csv"));
        assert_eq!(default_output_path(Path::new("warszawa.csv")), PathBuf::from("warszawa_cleaned.csv"));
    }
}
