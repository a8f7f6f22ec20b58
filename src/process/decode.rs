use crate::table::{Cell, Table};

/// Percent-decode every cell of one column in place.
///
/// Tolerant by design: a column that is not present is a no-op, and a cell
/// that cannot be decoded keeps its original value. `+` is left alone; GA
/// path columns are percent-encoded, not form-encoded.
pub fn decode_column(table: &mut Table, column: &str) {
    table.map_column(column, |cell| match cell.as_str() {
        Some(s) => Cell::Text(percent_decode(s)),
        None => cell.clone(),
    });
}

/// Decode `%XX` sequences to bytes, passing invalid sequences through
/// unchanged, then re-validate as UTF-8 with lossy replacement.
pub fn percent_decode(s: &str) -> String {
    if !s.contains('%') {
        return s.to_string();
    }
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
