//! Typed record schema for the daily review export.
//!
//! The upload is a loosely-typed CSV; this module pins down the columns revq
//! actually reads and the enumerations hiding inside them. Column access is
//! resolved once at ingest time against [`columns`] so a missing column is a
//! named error instead of a per-row lookup failure.

use serde::Serialize;

/// Column names as they appear in the daily export.
pub mod columns {
    /// Reviewer email; blank for unassigned tickets.
    pub const REVIEWER: &str = "revisor";
    /// Review state (see [`super::ReviewState`]).
    pub const REVIEW_STATE: &str = "estado_nombre";
    /// Incidence outcome (see [`super::IncidenceStatus`]).
    pub const INCIDENCE_STATUS: &str = "estado_incidencia";
    /// Free-text incidence type.
    pub const INCIDENCE_TYPE: &str = "tipo_incidencia";
    /// Unique subject (docent) identifier.
    pub const SUBJECT_ID: &str = "rut_docente";
    /// Review record identifier.
    pub const RECORD_ID: &str = "id_revision";
    /// Loosely-typed load timestamp; format unconstrained.
    pub const LOAD_TIMESTAMP: &str = "fecha_carga_bucket";
}

/// Review state of a ticket.
///
/// Unknown states are preserved verbatim in `Other` so the dedup key stays
/// faithful to the source data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ReviewState {
    Pending,
    InReview,
    NoIncidents,
    IncidentsToReview,
    Other(String),
}

impl ReviewState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "pendiente_de_revision" => Self::Pending,
            "en_revision" => Self::InReview,
            "sin_incidencias" => Self::NoIncidents,
            "con_incidencias_a_revisar" => Self::IncidentsToReview,
            other => Self::Other(other.to_string()),
        }
    }

    /// The state as spelled in the export.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pendiente_de_revision",
            Self::InReview => "en_revision",
            Self::NoIncidents => "sin_incidencias",
            Self::IncidentsToReview => "con_incidencias_a_revisar",
            Self::Other(raw) => raw.as_str(),
        }
    }

    /// A review counts as done once it has a verdict either way.
    pub fn is_reviewed(&self) -> bool {
        matches!(self, Self::NoIncidents | Self::IncidentsToReview)
    }
}

/// Outcome recorded against a reviewed incidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IncidenceStatus {
    Approved,
    NotApproved,
}

impl IncidenceStatus {
    /// Parses the export spelling; anything else (including blank) is absent.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Aprobado" => Some(Self::Approved),
            "No Aprobado" => Some(Self::NotApproved),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "Aprobado",
            Self::NotApproved => "No Aprobado",
        }
    }
}

/// One row of the uploaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub record_id: String,
    pub subject_id: String,
    pub reviewer: Option<String>,
    pub review_state: ReviewState,
    pub incidence_type: String,
    pub incidence_status: Option<IncidenceStatus>,
    pub load_timestamp: Option<String>,
}

impl Ticket {
    /// Composite dedup key: record id + review state + incidence type,
    /// concatenated exactly as the source strings.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}{}{}",
            self.record_id,
            self.review_state.as_str(),
            self.incidence_type
        )
    }
}
