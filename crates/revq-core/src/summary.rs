//! By-subject distribution counters for the dashboard.

use std::collections::HashSet;

use serde::Serialize;

use crate::loader::TicketTable;
use crate::schema::ReviewState;

/// How many distinct subjects sit in each stage of review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub reviewed: usize,
    pub in_review: usize,
    pub pending: usize,
}

impl Distribution {
    pub fn total(self) -> usize {
        self.reviewed + self.in_review + self.pending
    }
}

/// Counts subjects (first occurrence wins) per review stage.
pub fn video_distribution(table: &TicketTable) -> Distribution {
    let mut seen = HashSet::new();
    let mut distribution = Distribution::default();
    for ticket in &table.tickets {
        if !seen.insert(ticket.subject_id.as_str()) {
            continue;
        }
        if ticket.review_state.is_reviewed() {
            distribution.reviewed += 1;
        } else if ticket.review_state == ReviewState::InReview {
            distribution.in_review += 1;
        } else if ticket.review_state == ReviewState::Pending {
            distribution.pending += 1;
        }
    }
    distribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_table;

    #[test]
    fn counts_each_subject_once() {
        let text = "\
id_revision,estado_nombre,tipo_incidencia,rut_docente,revisor
1,sin_incidencias,audio,s1,a@iie.cl
2,con_incidencias_a_revisar,video,s1,a@iie.cl
3,en_revision,audio,s2,b@iie.cl
4,pendiente_de_revision,audio,s3,
5,pendiente_de_revision,audio,s4,
";
        let table = match load_table(text.as_bytes()) {
            Ok(table) => table,
            Err(err) => panic!("load failed: {err}"),
        };
        let distribution = video_distribution(&table);
        assert_eq!(distribution.reviewed, 1);
        assert_eq!(distribution.in_review, 1);
        assert_eq!(distribution.pending, 2);
        assert_eq!(distribution.total(), 4);
    }

    #[test]
    fn unknown_states_are_not_counted() {
        let text = "\
id_revision,estado_nombre,tipo_incidencia,rut_docente,revisor
1,archivado,audio,s1,
";
        let table = match load_table(text.as_bytes()) {
            Ok(table) => table,
            Err(err) => panic!("load failed: {err}"),
        };
        assert_eq!(video_distribution(&table).total(), 0);
    }
}
