use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// A CSV file addressed by header name. Short records are padded with empty
/// cells, so every row has one cell per header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self { headers: headers.into_iter().map(Into::into).collect(), rows: Vec::new() }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("read csv {}", path.display()))
    }

    pub fn from_reader<R: Read>(r: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(r);
        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let mut rows = Vec::new();
        for rec in rdr.records() {
            let rec = rec?;
            rows.push((0..headers.len()).map(|i| rec.get(i).unwrap_or("").to_string()).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
        self.to_writer(file).with_context(|| format!("write csv {}", path.display()))
    }

    pub fn to_writer<W: Write>(&self, w: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(w);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell of `row` under `name`; empty when the column does not exist.
    pub fn cell<'a>(&self, row: &'a [String], name: &str) -> &'a str {
        self.column(name).and_then(|i| row.get(i)).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_records() {
        let csv = "locality,street,url\nŁódź,Piotrkowska\nKraków,Długa,https://x/1\n";
        let t = Table::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(t.headers, vec!["locality", "street", "url"]);
        assert_eq!(t.rows[0], vec!["Łódź", "Piotrkowska", ""]);
        assert_eq!(t.cell(&t.rows[1], "url"), "https://x/1");
        assert_eq!(t.cell(&t.rows[1], "missing"), "");
    }

    #[test]
    fn writes_quoted_cells() {
        let mut t = Table::new(["a", "b"]);
        t.rows.push(vec!["x, y".into(), "z".into()]);
        let mut buf = Vec::new();
        t.to_writer(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a,b\n\"x, y\",z\n");
    }
}
