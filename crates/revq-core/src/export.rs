//! Assignment-log export.
//!
//! The downstream intake expects a semicolon-delimited CSV with the two
//! columns `id_revisor` and `rut_docente`, one row per committed assignment
//! in commit order.

use crate::allocator::Assignment;
use crate::error::CoreError;

/// Serializes the assignment log to CSV bytes.
pub fn write_assignments(log: &[Assignment]) -> Result<Vec<u8>, CoreError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer
        .write_record(["id_revisor", "rut_docente"])
        .map_err(|err| CoreError::Write(err.to_string()))?;
    for assignment in log {
        writer
            .write_record([assignment.reviewer.as_str(), assignment.subject_id.as_str()])
            .map_err(|err| CoreError::Write(err.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|err| CoreError::Write(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(reviewer: &str, subject: &str) -> Assignment {
        Assignment {
            reviewer: reviewer.to_string(),
            subject_id: subject.to_string(),
        }
    }

    #[test]
    fn writes_semicolon_rows_in_commit_order() {
        let log = [pair("a@iie.cl", "s1"), pair("b@iie.cl", "s2")];
        let bytes = match write_assignments(&log) {
            Ok(bytes) => bytes,
            Err(err) => panic!("write failed: {err}"),
        };
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(
            text,
            "id_revisor;rut_docente\na@iie.cl;s1\nb@iie.cl;s2\n"
        );
    }

    #[test]
    fn empty_log_writes_header_only() {
        let bytes = match write_assignments(&[]) {
            Ok(bytes) => bytes,
            Err(err) => panic!("write failed: {err}"),
        };
        assert_eq!(String::from_utf8_lossy(&bytes), "id_revisor;rut_docente\n");
    }
}
