//! CSV ingestion for the daily ticket export.
//!
//! Tolerates a UTF-8 byte-order mark, sniffs the delimiter from the header
//! line, scrubs quoting artifacts out of column names, and removes duplicate
//! rows by the composite dedup key when the three key columns are present.
//! Anything short of an unparseable table degrades to a warning carried in
//! the [`LoadReport`].

use std::collections::HashSet;

use crate::error::CoreError;
use crate::schema::{columns, IncidenceStatus, ReviewState, Ticket};

/// Delimiters considered by the sniffer, in tie-break precedence order.
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Outcome of one ingest: row counts plus non-fatal warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Rows surviving ingest (after dedup, when applied).
    pub rows: usize,
    /// Rows dropped by the composite-key dedup.
    pub duplicates_removed: usize,
    /// Whether the dedup key could be built from the header.
    pub dedup_applied: bool,
    pub warnings: Vec<String>,
}

/// The normalized in-memory table for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketTable {
    pub tickets: Vec<Ticket>,
    pub report: LoadReport,
    /// Whether the source carried a load-timestamp column at all.
    pub has_load_timestamp: bool,
}

/// Parses raw CSV bytes into a [`TicketTable`].
///
/// Hard-required columns are the reviewer, review state, and subject id; a
/// missing one is a [`CoreError::MissingColumn`]. The dedup-key trio is only
/// soft-required: when incomplete, dedup is skipped with a warning.
pub fn load_table(bytes: &[u8]) -> Result<TicketTable, CoreError> {
    let text = decode_input(bytes);
    let delimiter = sniff_delimiter(&text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|err| CoreError::Parse(format!("header row: {err}")))?;
    let names: Vec<String> = headers.iter().map(clean_header).collect();
    let map = ColumnMap::resolve(&names)?;

    let mut report = LoadReport::default();
    let mut tickets = Vec::new();
    for (row_index, record) in reader.records().enumerate() {
        let record =
            record.map_err(|err| CoreError::Parse(format!("row {}: {err}", row_index + 2)))?;
        tickets.push(map.ticket_from(&record));
    }

    if map.has_dedup_key() {
        let before = tickets.len();
        let mut seen = HashSet::new();
        tickets.retain(|ticket: &Ticket| seen.insert(ticket.dedup_key()));
        report.duplicates_removed = before - tickets.len();
        report.dedup_applied = true;
    } else {
        report.warnings.push(format!(
            "cannot build the dedup key ({}, {}, {}): duplicate removal skipped",
            columns::RECORD_ID,
            columns::REVIEW_STATE,
            columns::INCIDENCE_TYPE,
        ));
    }
    report.rows = tickets.len();

    Ok(TicketTable {
        tickets,
        report,
        has_load_timestamp: map.load_timestamp.is_some(),
    })
}

/// Strips an optional UTF-8 BOM and decodes the rest leniently.
fn decode_input(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Picks the candidate delimiter occurring most often in the header line.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    let mut best = b',';
    let mut best_count = 0usize;
    for candidate in CANDIDATE_DELIMITERS {
        let count = header.bytes().filter(|b| *b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Trims whitespace and strips quoting / BOM artifacts from a column name.
fn clean_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('"')
        .replace('\u{feff}', "")
        .trim()
        .to_string()
}

/// Header positions resolved once per ingest.
struct ColumnMap {
    reviewer: usize,
    review_state: usize,
    subject_id: usize,
    record_id: Option<usize>,
    incidence_type: Option<usize>,
    incidence_status: Option<usize>,
    load_timestamp: Option<usize>,
}

impl ColumnMap {
    fn resolve(names: &[String]) -> Result<Self, CoreError> {
        let find = |name: &str| names.iter().position(|h| h == name);
        let require = |name: &'static str| find(name).ok_or(CoreError::MissingColumn(name));
        Ok(Self {
            reviewer: require(columns::REVIEWER)?,
            review_state: require(columns::REVIEW_STATE)?,
            subject_id: require(columns::SUBJECT_ID)?,
            record_id: find(columns::RECORD_ID),
            incidence_type: find(columns::INCIDENCE_TYPE),
            incidence_status: find(columns::INCIDENCE_STATUS),
            load_timestamp: find(columns::LOAD_TIMESTAMP),
        })
    }

    fn has_dedup_key(&self) -> bool {
        self.record_id.is_some() && self.incidence_type.is_some()
    }

    fn ticket_from(&self, record: &csv::StringRecord) -> Ticket {
        let field = |index: usize| record.get(index).unwrap_or("").trim();
        let optional = |index: Option<usize>| index.map(field).unwrap_or("");

        let reviewer = field(self.reviewer);
        let load_timestamp = optional(self.load_timestamp);
        Ticket {
            record_id: optional(self.record_id).to_string(),
            subject_id: field(self.subject_id).to_string(),
            reviewer: if reviewer.is_empty() {
                None
            } else {
                Some(reviewer.to_string())
            },
            review_state: ReviewState::parse(field(self.review_state)),
            incidence_type: optional(self.incidence_type).to_string(),
            incidence_status: self
                .incidence_status
                .and_then(|index| IncidenceStatus::parse(field(index))),
            load_timestamp: if load_timestamp.is_empty() {
                None
            } else {
                Some(load_timestamp.to_string())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = "\
id_revision,estado_nombre,tipo_incidencia,rut_docente,revisor,estado_incidencia,fecha_carga_bucket
1,pendiente_de_revision,audio,11111111-1,,,1700000000
2,sin_incidencias,video,22222222-2,ana.perez@iie.cl,Aprobado,1700000001
";

    fn load(text: &str) -> TicketTable {
        match load_table(text.as_bytes()) {
            Ok(table) => table,
            Err(err) => panic!("load failed: {err}"),
        }
    }

    #[test]
    fn loads_comma_delimited_rows() {
        let table = load(BASIC);
        assert_eq!(table.tickets.len(), 2);
        assert_eq!(table.report.rows, 2);
        assert!(table.report.dedup_applied);
        assert!(table.has_load_timestamp);

        let first = &table.tickets[0];
        assert_eq!(first.subject_id, "11111111-1");
        assert_eq!(first.reviewer, None);
        assert_eq!(first.review_state, ReviewState::Pending);
        assert_eq!(first.incidence_status, None);
        assert_eq!(first.load_timestamp.as_deref(), Some("1700000000"));

        let second = &table.tickets[1];
        assert_eq!(second.reviewer.as_deref(), Some("ana.perez@iie.cl"));
        assert_eq!(second.incidence_status, Some(IncidenceStatus::Approved));
    }

    #[test]
    fn strips_bom_and_quoted_headers() {
        let text = "\u{feff}\"id_revision\",\"estado_nombre\",\"tipo_incidencia\",\"rut_docente\",\"revisor\"\n1,pendiente_de_revision,audio,11111111-1,\n";
        let table = load(text);
        assert_eq!(table.tickets.len(), 1);
        assert_eq!(table.tickets[0].record_id, "1");
    }

    #[test]
    fn sniffs_semicolon_delimiter() {
        let text = "id_revision;estado_nombre;tipo_incidencia;rut_docente;revisor\n1;pendiente_de_revision;audio;11111111-1;\n";
        let table = load(text);
        assert_eq!(table.tickets.len(), 1);
        assert_eq!(table.tickets[0].review_state, ReviewState::Pending);
    }

    #[test]
    fn removes_duplicates_by_composite_key() {
        let text = "\
id_revision,estado_nombre,tipo_incidencia,rut_docente,revisor
1,pendiente_de_revision,audio,11111111-1,
1,pendiente_de_revision,audio,99999999-9,
1,pendiente_de_revision,video,11111111-1,
";
        let table = load(text);
        // Second row shares the key with the first; third differs by type.
        assert_eq!(table.tickets.len(), 2);
        assert_eq!(table.report.duplicates_removed, 1);
        assert!(table.report.dedup_applied);
    }

    #[test]
    fn missing_key_column_skips_dedup_with_warning() {
        let text = "\
estado_nombre,rut_docente,revisor
pendiente_de_revision,11111111-1,
pendiente_de_revision,11111111-1,
";
        let table = load(text);
        assert_eq!(table.tickets.len(), 2);
        assert!(!table.report.dedup_applied);
        assert_eq!(table.report.duplicates_removed, 0);
        assert_eq!(table.report.warnings.len(), 1);
        assert!(table.report.warnings[0].contains("duplicate removal skipped"));
    }

    #[test]
    fn missing_required_column_is_a_named_error() {
        let text = "id_revision,estado_nombre,tipo_incidencia\n1,pendiente_de_revision,audio\n";
        match load_table(text.as_bytes()) {
            Err(CoreError::MissingColumn(name)) => assert_eq!(name, columns::SUBJECT_ID),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn ragged_row_is_a_parse_error() {
        let text = "id_revision,estado_nombre,tipo_incidencia,rut_docente,revisor\n1,pendiente_de_revision\n";
        assert!(matches!(
            load_table(text.as_bytes()),
            Err(CoreError::Parse(_))
        ));
    }

    #[test]
    fn blank_reviewer_and_timestamp_become_none() {
        let text = "id_revision,estado_nombre,tipo_incidencia,rut_docente,revisor,fecha_carga_bucket\n1,en_revision,audio,11111111-1,  ,  \n";
        let table = load(text);
        assert_eq!(table.tickets[0].reviewer, None);
        assert_eq!(table.tickets[0].load_timestamp, None);
    }
}
