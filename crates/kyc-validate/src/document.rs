use kyc_types::{DocumentFile, Verdict};
use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;

/// Acceptance rules for uploaded documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentPolicy {
    /// Accepted MIME types, compared exactly.
    pub allowed_mime_types: Vec<String>,
    /// Largest accepted file, in bytes (inclusive).
    pub max_bytes: u64,
}

impl Default for DocumentPolicy {
    fn default() -> Self {
        Self {
            allowed_mime_types: vec![
                "image/jpeg".into(),
                "image/png".into(),
                "application/pdf".into(),
            ],
            max_bytes: 5 * MIB,
        }
    }
}

impl DocumentPolicy {
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            ..Default::default()
        }
    }

    /// Check presence, then type, then size. Each failure has its own message.
    pub fn validate(&self, file: Option<&DocumentFile>) -> Verdict {
        let Some(file) = file else {
            return Verdict::invalid("File is required");
        };

        if !self.allowed_mime_types.iter().any(|m| *m == file.mime_type) {
            tracing::debug!(name = %file.name, mime = %file.mime_type, "document type rejected");
            return Verdict::invalid(format!(
                "Invalid file type. Please upload {}",
                self.allowed_labels()
            ));
        }

        if file.size > self.max_bytes {
            tracing::debug!(name = %file.name, size = file.size, "document too large");
            return Verdict::invalid(format!(
                "File size exceeds {}. Please upload a smaller file",
                self.max_size_label()
            ));
        }

        Verdict::valid()
    }

    /// "JPG, PNG or PDF" style list of the accepted types.
    pub fn allowed_labels(&self) -> String {
        let labels: Vec<&str> = self
            .allowed_mime_types
            .iter()
            .map(|m| mime_label(m))
            .collect();
        match labels.split_last() {
            None => "no file types".to_string(),
            Some((last, [])) => (*last).to_string(),
            Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
        }
    }

    /// Ceiling rendered as whole megabytes where possible, e.g. `"5MB"`.
    pub fn max_size_label(&self) -> String {
        if self.max_bytes % MIB == 0 {
            format!("{}MB", self.max_bytes / MIB)
        } else {
            format!("{:.2}MB", self.max_bytes as f64 / MIB as f64)
        }
    }
}

fn mime_label(mime: &str) -> &str {
    match mime {
        "image/jpeg" => "JPG",
        "image/png" => "PNG",
        "application/pdf" => "PDF",
        other => other,
    }
}
