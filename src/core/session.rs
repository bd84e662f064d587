use crate::domain::model::ExportArtifact;

/// Holder for the last computed export artifact: initialized empty, cleared
/// when a new batch starts, set once after the batch completes. The artifact
/// stays available for download until the next upload replaces it.
#[derive(Default)]
pub struct Session {
    export: Option<ExportArtifact>,
}

impl Session {
    pub fn clear(&mut self) {
        self.export = None;
    }

    pub fn set_export(&mut self, artifact: ExportArtifact) {
        self.export = Some(artifact);
    }

    pub fn export(&self) -> Option<&ExportArtifact> {
        self.export.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_lifecycle() {
        let mut session = Session::default();
        assert!(session.export().is_none());

        session.set_export(ExportArtifact::xlsx("updated_data.xlsx", vec![1, 2, 3]));
        assert_eq!(session.export().unwrap().bytes, vec![1, 2, 3]);

        session.clear();
        assert!(session.export().is_none());
    }
}
