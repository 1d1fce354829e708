//! Shared mock backend and fixtures for CLI unit tests.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::CliBackend;

#[derive(Default)]
pub struct MockCliBackend {
    files: HashMap<String, Vec<u8>>,
    written: RefCell<Vec<(String, Vec<u8>)>>,
}

impl MockCliBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(path: &str, contents: String) -> Self {
        let mut backend = Self::new();
        backend.files.insert(path.to_string(), contents.into_bytes());
        backend
    }

    pub fn written(&self) -> Vec<(String, Vec<u8>)> {
        self.written.borrow().clone()
    }
}

impl CliBackend for MockCliBackend {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| format!("read {path}: no such file"))
    }

    fn write_file(&self, path: &str, bytes: &[u8]) -> Result<(), String> {
        self.written
            .borrow_mut()
            .push((path.to_string(), bytes.to_vec()));
        Ok(())
    }
}

/// A small report exercising every command: mixed states, outcomes, types,
/// reviewers from the default seed roster, and epoch-second timestamps.
pub fn report_fixture() -> String {
    "\
id_revision,estado_nombre,tipo_incidencia,rut_docente,revisor,estado_incidencia,fecha_carga_bucket
1,pendiente_de_revision,audio,s1,,,1700000300
2,pendiente_de_revision,video,s2,,,1700000100
3,pendiente_de_revision,audio,s3,antonia.cutino@iie.cl,,1700000200
4,sin_incidencias,audio,s4,antonia.cutino@iie.cl,Aprobado,1700000400
5,sin_incidencias,video,s5,antonia.rios@iie.cl,No Aprobado,1700000500
6,con_incidencias_a_revisar,audio,s6,antonia.rios@iie.cl,Aprobado,1700000600
7,en_revision,video,s7,claudia.sanjuan@iie.cl,,1700000700
"
    .to_string()
}

/// A report whose only content is unassigned pending subjects.
pub fn pending_fixture(subjects: &[&str]) -> String {
    let mut text = String::from(
        "id_revision,estado_nombre,tipo_incidencia,rut_docente,revisor,fecha_carga_bucket\n",
    );
    for (index, subject) in subjects.iter().enumerate() {
        text.push_str(&format!(
            "{},pendiente_de_revision,audio,{subject},,170000{:04}\n",
            index + 1,
            index
        ));
    }
    text
}
