//! Minimal XLSX decode for manifest loading.
//!
//! Extracts the first sheet of a workbook as a dense row grid of strings.
//! Only what a manifest needs is consulted: workbook relationships to find
//! the first sheet part, shared strings, and the sheet's cell values
//! (cached formula results are taken as text). Styles, merged cells, and
//! every other workbook feature are ignored.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufReader, Cursor, Read, Seek};
use zip::ZipArchive;

use crate::error::{PrintmatchError, Result};

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone)]
enum CellTypeTag {
    Shared,
    Inline,
    Bool,
    Text,
}

fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"inlineStr" => CellTypeTag::Inline,
        b"b" => CellTypeTag::Bool,
        _ => CellTypeTag::Text,
    }
}

/// Parse a cell reference like "B3" into 0-indexed (col, row).
fn parse_cell_ref(ref_bytes: &[u8]) -> Option<(usize, usize)> {
    let mut col: usize = 0;
    let mut row: usize = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for &b in ref_bytes {
        if b == b'$' {
            continue;
        }
        if b.is_ascii_alphabetic() {
            let upper = if b.is_ascii_lowercase() { b - 32 } else { b };
            col = col * 26 + usize::from(upper - b'A') + 1;
            saw_col = true;
        } else if b.is_ascii_digit() {
            row = row * 10 + usize::from(b - b'0');
            saw_row = true;
        } else {
            return None;
        }
    }

    if !saw_col || !saw_row {
        return None;
    }

    Some((col.saturating_sub(1), row.saturating_sub(1)))
}

/// Read a manifest workbook and return its first sheet as a row grid.
///
/// Rows and cells keep their source positions; gaps left by sparse sheets
/// are filled with empty strings so the fixed column contract holds.
///
/// # Errors
///
/// Any structural failure (bad archive, missing sheet part, malformed XML)
/// is fatal to the load; no partial grid is produced.
pub(crate) fn read_first_sheet(data: &[u8]) -> Result<Vec<Vec<String>>> {
    let cursor = Cursor::new(data);
    let mut archive = ZipArchive::new(cursor)
        .map_err(|e| PrintmatchError::Parse(format!("not a readable workbook: {e}")))?;

    let relationships = parse_workbook_relationships(&mut archive);
    let sheet_path = first_sheet_path(&mut archive, &relationships)?;
    let shared_strings = parse_shared_strings(&mut archive);

    read_sheet_rows(&mut archive, &sheet_path, &shared_strings)
}

/// Map relationship ids to worksheet part paths from the workbook rels.
fn parse_workbook_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Ok(file) = archive.by_name("xl/_rels/workbook.xml.rels") else {
        return map; // optional; fall back to the conventional sheet path
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e) | Event::Start(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = String::new();
                let mut target = String::new();
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => {
                            id = String::from_utf8_lossy(&attr.value).into_owned();
                        }
                        b"Target" => {
                            target = String::from_utf8_lossy(&attr.value).into_owned();
                        }
                        _ => {}
                    }
                }
                if !id.is_empty() && !target.is_empty() {
                    // Targets are relative to xl/ unless absolute
                    let path = target
                        .strip_prefix('/')
                        .map(ToString::to_string)
                        .unwrap_or_else(|| format!("xl/{target}"));
                    map.insert(id, path);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    map
}

/// Locate the first sheet's part path from xl/workbook.xml.
///
/// Only the first sheet is ever consulted; additional sheets in the
/// manifest workbook are ignored by contract.
fn first_sheet_path<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    relationships: &HashMap<String, String>,
) -> Result<String> {
    let file = archive
        .by_name("xl/workbook.xml")
        .map_err(|_| PrintmatchError::Parse("workbook.xml missing".to_string()))?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e) | Event::Start(ref e))
                if e.local_name().as_ref() == b"sheet" =>
            {
                let mut r_id = String::new();
                for attr in e.attributes().flatten() {
                    // r:id attribute (namespace prefixed)
                    let key = attr.key.as_ref();
                    if key.ends_with(b":id") || key == b"id" {
                        r_id = String::from_utf8_lossy(&attr.value).into_owned();
                    }
                }
                let path = relationships
                    .get(&r_id)
                    .cloned()
                    .unwrap_or_else(|| "xl/worksheets/sheet1.xml".to_string());
                return Ok(path);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Err(PrintmatchError::Parse(
        "workbook has no sheets".to_string(),
    ))
}

/// Parse xl/sharedStrings.xml into an indexable string table.
///
/// Rich-text runs inside one `<si>` are concatenated.
fn parse_shared_strings<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Vec<String> {
    let Ok(file) = archive.by_name("xl/sharedStrings.xml") else {
        return Vec::new(); // optional part
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si => {
                    in_t = true;
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_t => {
                if let Ok(text) = e.unescape() {
                    current.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(current.clone());
                    in_si = false;
                }
                b"t" => {
                    in_t = false;
                }
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    strings
}

/// Place a value into the grid, padding any gaps with empty strings.
fn set_cell(grid: &mut Vec<Vec<String>>, row: usize, col: usize, value: String) {
    while grid.len() <= row {
        grid.push(Vec::new());
    }
    if let Some(cells) = grid.get_mut(row) {
        while cells.len() <= col {
            cells.push(String::new());
        }
        if let Some(slot) = cells.get_mut(col) {
            *slot = value;
        }
    }
}

/// Stream one worksheet part into a dense row grid.
fn read_sheet_rows<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sheet_path: &str,
    shared_strings: &[String],
) -> Result<Vec<Vec<String>>> {
    let file = archive
        .by_name(sheet_path)
        .map_err(|_| PrintmatchError::Parse(format!("worksheet part {sheet_path} missing")))?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut grid: Vec<Vec<String>> = Vec::new();
    let mut buf = Vec::new();

    // Running positions for cells that omit their `r` reference
    let mut next_row: usize = 0;
    let mut next_col: usize = 0;

    let mut cell_pos: Option<(usize, usize)> = None;
    let mut cell_tag = CellTypeTag::Text;
    let mut pending = String::new();
    let mut in_value = false;
    let mut in_inline = false;
    let mut in_inline_t = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(ref event @ (Event::Start(_) | Event::Empty(_))) => {
                let (Event::Start(ref e) | Event::Empty(ref e)) = event else {
                    continue;
                };
                let is_start = matches!(event, Event::Start(_));

                match e.local_name().as_ref() {
                    b"row" => {
                        let mut row = next_row;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"r" {
                                if let Some(r) = parse_usize_bytes(&attr.value) {
                                    row = r.saturating_sub(1); // 1-based in the file
                                }
                            }
                        }
                        next_row = row + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        let mut pos = (next_col, next_row.saturating_sub(1));
                        let mut tag = CellTypeTag::Text;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    if let Some(p) = parse_cell_ref(&attr.value) {
                                        pos = p;
                                    }
                                }
                                b"t" => {
                                    tag = parse_cell_type_tag(&attr.value);
                                }
                                _ => {}
                            }
                        }
                        next_col = pos.0 + 1;
                        if is_start {
                            cell_pos = Some(pos);
                            cell_tag = tag;
                            pending.clear();
                        }
                        // Empty <c/> carries no value; only advance the cursor
                    }
                    b"v" if cell_pos.is_some() => {
                        in_value = true;
                    }
                    b"is" if cell_pos.is_some() => {
                        in_inline = true;
                    }
                    b"t" if in_inline => {
                        in_inline_t = true;
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) if in_value || in_inline_t => {
                if let Ok(text) = e.unescape() {
                    pending.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"v" => {
                    in_value = false;
                }
                b"t" if in_inline => {
                    in_inline_t = false;
                }
                b"is" => {
                    in_inline = false;
                }
                b"c" => {
                    if let Some((col, row)) = cell_pos.take() {
                        let value = finish_cell_value(cell_tag, &pending, shared_strings);
                        if !value.is_empty() {
                            set_cell(&mut grid, row, col, value);
                        }
                    }
                    pending.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(grid)
}

/// Resolve a finished cell's display text from its type tag and raw value.
fn finish_cell_value(tag: CellTypeTag, raw: &str, shared_strings: &[String]) -> String {
    match tag {
        CellTypeTag::Shared => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|idx| shared_strings.get(idx).cloned())
            .unwrap_or_default(),
        CellTypeTag::Bool => {
            if raw.trim() == "1" {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        CellTypeTag::Inline | CellTypeTag::Text => raw.to_string(),
    }
}

fn parse_usize_bytes(value: &[u8]) -> Option<usize> {
    let mut num: usize = 0;
    let mut seen = false;
    for &b in value {
        if !b.is_ascii_digit() {
            return None;
        }
        seen = true;
        num = num.saturating_mul(10).saturating_add(usize::from(b - b'0'));
    }
    seen.then_some(num)
}
