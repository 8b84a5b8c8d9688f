use crate::extraction::Field;
use crate::table::Table;

/// Summary columns scraped before detail extraction.
pub const BASE_COLUMNS: [&str; 11] = [
    "locality",
    "street",
    "rooms",
    "area",
    "price_total_zl",
    "price_sqm_zl",
    "owner_type",
    "date_posted",
    "photo_count",
    "url",
    "image_url",
];

/// On-disk column order of the detailed dataset: base columns, then details.
pub const HEADERS: [&str; 27] = [
    "locality",
    "street",
    "rooms",
    "area",
    "price_total_zl",
    "price_sqm_zl",
    "owner_type",
    "date_posted",
    "photo_count",
    "url",
    "image_url",
    "city_district",
    "full_address",
    "floor",
    "total_floors",
    "year_built",
    "building_type",
    "price_per_sqm_detailed",
    "description_text",
    "has_basement",
    "has_parking",
    "kitchen_type",
    "window_type",
    "ownership_type",
    "equipment",
    "latitude",
    "longitude",
];

/// One input row, reduced to the base columns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BaseRow {
    values: [String; 11],
}

impl BaseRow {
    /// Missing keys become empty strings.
    pub fn from_lookup<'a>(get: impl Fn(&str) -> Option<&'a str>) -> Self {
        Self { values: std::array::from_fn(|i| get(BASE_COLUMNS[i]).unwrap_or("").to_string()) }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::from_lookup(|k| pairs.iter().find(|(name, _)| *name == k).map(|(_, v)| *v))
    }

    pub fn get(&self, column: &str) -> &str {
        BASE_COLUMNS.iter().position(|c| *c == column).map(|i| self.values[i].as_str()).unwrap_or("")
    }

    pub fn url(&self) -> &str { self.get("url") }

    pub fn values(&self) -> &[String; 11] { &self.values }
}

/// Base rows of a table, in table order.
pub fn base_rows(table: &Table) -> Vec<BaseRow> {
    table
        .rows
        .iter()
        .map(|row| BaseRow::from_lookup(|k| table.column(k).and_then(|i| row.get(i)).map(String::as_str)))
        .collect()
}

/// A finished output row: exactly one cell per entry of [`HEADERS`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombinedRow {
    cells: Vec<String>,
}

impl CombinedRow {
    pub(super) fn from_cells(cells: Vec<String>) -> Self {
        debug_assert_eq!(cells.len(), HEADERS.len());
        Self { cells }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        HEADERS.iter().position(|h| *h == column).map(|i| self.cells[i].as_str())
    }

    pub fn len(&self) -> usize { self.cells.len() }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        HEADERS.iter().copied().zip(self.cells.iter().map(String::as_str))
    }

    pub fn into_cells(self) -> Vec<String> { self.cells }
}

pub fn to_table(rows: Vec<CombinedRow>) -> Table {
    let mut table = Table::new(HEADERS);
    table.rows = rows.into_iter().map(CombinedRow::into_cells).collect();
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_base_then_details() {
        let expected: Vec<&str> = BASE_COLUMNS
            .iter()
            .copied()
            .chain(Field::ALL.iter().map(|f| f.column()))
            .collect();
        assert_eq!(HEADERS.to_vec(), expected);
    }

    #[test]
    fn base_rows_from_table_ignore_extra_columns() {
        let csv = "url,street,extra,locality\nhttps://a/1,Długa,?,Gdańsk\n";
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        let rows = base_rows(&table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("locality"), "Gdańsk");
        assert_eq!(rows[0].get("street"), "Długa");
        assert_eq!(rows[0].url(), "https://a/1");
        assert_eq!(rows[0].get("rooms"), "");
        assert_eq!(rows[0].get("extra"), "");
    }
}
