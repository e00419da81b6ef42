//! CSV export of card records.
//!
//! Fields containing a comma, quote, or line break are quoted with embedded
//! quotes doubled; rows end in CRLF (RFC 4180).

use crate::models::CardRecord;

pub const CSV_HEADER: [&str; 6] = [
    "Name",
    "Oracle Text",
    "Mana Cost",
    "Type Line",
    "Set Name",
    "Status",
];

/// Builds a CSV document from `(requested name, cached record)` rows.
///
/// Names without a record are exported with empty fields and a `not found` status.
pub fn cards_to_csv<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<CardRecord>)>,
{
    let mut out = String::new();
    write_row(&mut out, &CSV_HEADER);

    for (name, record) in rows {
        match record {
            Some(card) => write_row(
                &mut out,
                &[
                    card.name(),
                    card.oracle_text(),
                    card.mana_cost(),
                    card.type_line(),
                    card.set_name(),
                    card.status().as_str(),
                ],
            ),
            None => write_row(&mut out, &[name, "", "", "", "", "not found"]),
        }
    }

    out
}

fn write_row(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_field(out, field);
    }
    out.push_str("\r\n");
}

fn write_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
