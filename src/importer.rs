//! Delimited-text roster parser.
//!
//! Turns comma/semicolon/tab-delimited text into [`Participant`] records.
//! The parser is driver-agnostic: the text may come from a local file, a
//! fetched URL, or stdin; acquisition lives in [`crate::source`].

use crate::model::{DeliveryStatus, Participant};
use crate::phone;

/// Candidate delimiters probed during auto-detection, in tie-break order.
const DELIMITERS: [char; 3] = [',', ';', '\t'];

/// Positional layout of the canonical export: a leading id/timestamp column,
/// then name, then phone.
const NAME_COLUMN: usize = 1;
const PHONE_COLUMN: usize = 2;
const MIN_COLUMNS: usize = 3;

/// How the first row of the input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRow {
    /// Every row is data, addressed positionally.
    None,
    /// First row is a header to discard; data rows addressed positionally.
    Skip,
    /// First row is a header matched against the column aliases.
    Named,
}

/// Accepted header spellings for each logical column.
#[derive(Debug, Clone)]
pub struct ColumnAliases {
    pub name: Vec<String>,
    pub phone: Vec<String>,
    pub activity: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        Self {
            name: owned(&["name", "nombre"]),
            phone: owned(&["phone", "telefono", "teléfono", "movil", "móvil"]),
            activity: owned(&["activity", "actividad"]),
        }
    }
}

/// Importer configuration.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Field delimiter; `None` auto-detects from the first non-empty line.
    pub delimiter: Option<char>,
    pub header: HeaderRow,
    pub aliases: ColumnAliases,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            header: HeaderRow::Skip,
            aliases: ColumnAliases::default(),
        }
    }
}

/// Resolved column indices for one parse run.
#[derive(Debug, Clone)]
struct Columns {
    name: usize,
    phone: usize,
    activity: Option<usize>,
    min_len: usize,
}

impl Columns {
    fn positional() -> Self {
        Self {
            name: NAME_COLUMN,
            phone: PHONE_COLUMN,
            activity: None,
            min_len: MIN_COLUMNS,
        }
    }

    /// Resolve indices from a header row. Returns `None` unless both a name
    /// and a phone column are found.
    fn from_header(header: &[String], aliases: &ColumnAliases) -> Option<Self> {
        let find = |wanted: &[String]| {
            header.iter().position(|cell| {
                let cell = cell.trim().to_lowercase();
                wanted.iter().any(|alias| alias.to_lowercase() == cell)
            })
        };

        let name = find(&aliases.name)?;
        let phone = find(&aliases.phone)?;
        let activity = find(&aliases.activity);
        // The activity column is optional per row; only name and phone decide
        // whether a row is long enough.
        let min_len = name.max(phone) + 1;
        Some(Self {
            name,
            phone,
            activity,
            min_len,
        })
    }
}

/// Parse delimited text into participant records, in source row order.
///
/// Rows with too few columns, or with an empty name or phone after
/// trimming/normalization, are dropped. Surviving records get `pending`
/// status when the normalized phone is a valid mobile number and `error`
/// otherwise; the `activity` field stays blank unless a named activity
/// column supplied one (the roster stamp overwrites it either way).
pub fn parse_participants(text: &str, opts: &ParseOptions) -> Vec<Participant> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let Some(first) = lines.first() else {
        return Vec::new();
    };

    let delimiter = opts.delimiter.unwrap_or_else(|| detect_delimiter(first));

    let (columns, data_start) = match opts.header {
        HeaderRow::None => (Columns::positional(), 0),
        HeaderRow::Skip => (Columns::positional(), 1),
        HeaderRow::Named => match Columns::from_header(&split_row(first, delimiter), &opts.aliases)
        {
            Some(cols) => (cols, 1),
            // Unrecognized header: treat the input as the canonical export,
            // whose first row is junk.
            None => (Columns::positional(), 1),
        },
    };

    lines[data_start..]
        .iter()
        .filter_map(|line| to_participant(&split_row(line, delimiter), &columns))
        .collect()
}

/// Pick the most frequent candidate delimiter in a sample line; comma wins
/// ties and empty lines.
fn detect_delimiter(line: &str) -> char {
    let mut best = (',', 0);
    for d in DELIMITERS {
        let count = line.matches(d).count();
        if count > best.1 {
            best = (d, count);
        }
    }
    best.0
}

/// Split one row on the delimiter, honoring double-quoted fields.
///
/// A field starting with `"` runs to the closing quote and may contain the
/// delimiter; `""` inside quotes is a literal quote.
fn split_row(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else if c == '"' && field.is_empty() {
            in_quotes = true;
        } else if c == delimiter {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
    }
    fields.push(field);
    fields
}

fn to_participant(fields: &[String], columns: &Columns) -> Option<Participant> {
    if fields.len() < columns.min_len {
        return None;
    }

    // Commas are the canonical field delimiter and must not leak into the
    // display name.
    let name = fields[columns.name].replace(',', "");
    let name = name.trim();
    let phone = phone::normalize(fields[columns.phone].trim());
    if name.is_empty() || phone.is_empty() {
        return None;
    }

    let status = if phone::is_valid(&phone) {
        DeliveryStatus::Pending
    } else {
        DeliveryStatus::Error
    };
    let activity = columns
        .activity
        .and_then(|i| fields.get(i))
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    Some(Participant {
        name: name.to_string(),
        phone,
        activity,
        status,
    })
}
