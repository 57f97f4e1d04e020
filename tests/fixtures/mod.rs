//! Test fixtures for generating valid manifest XLSX files in memory.
//!
//! Provides a builder for creating small manifest workbooks
//! programmatically, useful for testing the decode + parse pipeline with
//! known inputs.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

/// Default manifest header row.
pub const HEADER: [&str; 6] = ["Photo", "Size", "Order ID", "Name", "Color", "Article"];

/// Builder for manifest workbooks with the fixed six-column layout.
#[derive(Debug, Clone)]
pub struct ManifestXlsxBuilder {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    inline_strings: bool,
    numeric_cells: bool,
}

impl Default for ManifestXlsxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestXlsxBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: HEADER.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
            inline_strings: false,
            numeric_cells: false,
        }
    }

    /// Replace the header row.
    #[must_use]
    pub fn header(mut self, cols: &[&str]) -> Self {
        self.header = cols.iter().map(ToString::to_string).collect();
        self
    }

    /// Append a data row (up to six columns, short rows are fine).
    #[must_use]
    pub fn row(mut self, cells: &[&str]) -> Self {
        self.rows.push(cells.iter().map(ToString::to_string).collect());
        self
    }

    /// Append a completely blank row (emitted as a gap in row numbering).
    #[must_use]
    pub fn blank_row(mut self) -> Self {
        self.rows.push(Vec::new());
        self
    }

    /// Emit strings as inline `<is>` runs instead of shared strings.
    #[must_use]
    pub fn inline_strings(mut self) -> Self {
        self.inline_strings = true;
        self
    }

    /// Emit numeric-looking values as plain number cells (no `t` attr),
    /// the way spreadsheet exports store size codes like 140.
    #[must_use]
    pub fn numeric_cells(mut self) -> Self {
        self.numeric_cells = true;
        self
    }

    /// Build the workbook bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut shared: Vec<String> = Vec::new();
        let sheet_xml = self.sheet_xml(&mut shared);

        let cursor = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(cursor);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let _ = zip.start_file("[Content_Types].xml", options);
        let _ = zip.write_all(content_types().as_bytes());

        let _ = zip.start_file("_rels/.rels", options);
        let _ = zip.write_all(root_rels().as_bytes());

        let _ = zip.start_file("xl/workbook.xml", options);
        let _ = zip.write_all(workbook_xml().as_bytes());

        let _ = zip.start_file("xl/_rels/workbook.xml.rels", options);
        let _ = zip.write_all(workbook_rels().as_bytes());

        if !shared.is_empty() {
            let _ = zip.start_file("xl/sharedStrings.xml", options);
            let _ = zip.write_all(shared_strings_xml(&shared).as_bytes());
        }

        let _ = zip.start_file("xl/worksheets/sheet1.xml", options);
        let _ = zip.write_all(sheet_xml.as_bytes());

        let cursor = zip.finish().expect("zip finish");
        cursor.into_inner()
    }

    fn sheet_xml(&self, shared: &mut Vec<String>) -> String {
        let mut body = String::new();

        let mut all_rows: Vec<&Vec<String>> = vec![&self.header];
        all_rows.extend(self.rows.iter());

        for (row_idx, cells) in all_rows.iter().enumerate() {
            if cells.is_empty() {
                continue; // leaves a gap in row numbering
            }
            let row_num = row_idx + 1;
            body.push_str(&format!(r#"<row r="{row_num}">"#));
            for (col_idx, value) in cells.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let cell_ref = format!("{}{row_num}", col_letter(col_idx));
                body.push_str(&self.cell_xml(&cell_ref, value, shared));
            }
            body.push_str("</row>");
        }

        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
                "<sheetData>{}</sheetData></worksheet>"
            ),
            body
        )
    }

    fn cell_xml(&self, cell_ref: &str, value: &str, shared: &mut Vec<String>) -> String {
        if self.numeric_cells && value.parse::<f64>().is_ok() {
            return format!(r#"<c r="{cell_ref}"><v>{value}</v></c>"#);
        }
        if self.inline_strings {
            return format!(
                r#"<c r="{cell_ref}" t="inlineStr"><is><t>{}</t></is></c>"#,
                escape_xml(value)
            );
        }
        let idx = match shared.iter().position(|s| s == value) {
            Some(i) => i,
            None => {
                shared.push(value.to_string());
                shared.len() - 1
            }
        };
        format!(r#"<c r="{cell_ref}" t="s"><v>{idx}</v></c>"#)
    }
}

/// Build a manifest workbook from data rows using the default header.
#[must_use]
pub fn manifest_with_rows(rows: &[&[&str]]) -> Vec<u8> {
    let mut builder = ManifestXlsxBuilder::new();
    for row in rows {
        builder = builder.row(row);
    }
    builder.build()
}

fn col_letter(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ascii column letters")
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn content_types() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
        "</Types>"
    )
    .to_string()
}

fn root_rels() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
        "</Relationships>"
    )
    .to_string()
}

fn workbook_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        r#"<sheets><sheet name="Manifest" sheetId="1" r:id="rId1"/></sheets></workbook>"#
    )
    .to_string()
}

fn workbook_rels() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
        r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
        "</Relationships>"
    )
    .to_string()
}

fn shared_strings_xml(strings: &[String]) -> String {
    let mut body = String::new();
    for s in strings {
        body.push_str(&format!("<si><t>{}</t></si>", escape_xml(s)));
    }
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{1}</sst>"#
        ),
        strings.len(),
        body
    )
}
