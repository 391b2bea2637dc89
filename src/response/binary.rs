//! `@responseBinaryFile` tags (alias `@responsePdfFile`).
//!
//! ```text
//! @responseBinaryFile [STATUS] PATH
//! ```

use super::{split_status, tags_named, RawResponse, ResponseStrategy, StrategyContext, CONTENT_TYPE_HEADER};
use crate::docblock::Tag;
use crate::route::Route;
use log::warn;
use std::fs;
use std::path::PathBuf;

const TAG_NAMES: [&str; 2] = ["responseBinaryFile", "responsePdfFile"];

/// Binary fixtures, documented base64-encoded.
pub struct BinaryFileStrategy {
    fixtures_dir: PathBuf,
}

impl BinaryFileStrategy {
    pub fn new(fixtures_dir: impl Into<PathBuf>) -> Self {
        Self {
            fixtures_dir: fixtures_dir.into(),
        }
    }

    fn load(&self, content: &str) -> Option<RawResponse> {
        let (status, path) = split_status(content);
        let path = path.split_whitespace().next()?;

        let full_path = self.fixtures_dir.join(path);
        let bytes = match fs::read(&full_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Skipping binary response file {}: {}", full_path.display(), e);
                return None;
            }
        };

        let content_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream");
        Some(RawResponse::binary(status, bytes).with_header(CONTENT_TYPE_HEADER, content_type))
    }
}

impl ResponseStrategy for BinaryFileStrategy {
    fn name(&self) -> &'static str {
        "binary file"
    }

    fn attempt(&self, _route: &Route, tags: &[Tag], _context: &StrategyContext<'_>) -> Option<Vec<RawResponse>> {
        let responses: Vec<RawResponse> = tags_named(tags, &TAG_NAMES)
            .filter_map(|tag| self.load(&tag.content))
            .collect();

        (!responses.is_empty()).then_some(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppliedRules;
    use crate::docblock::DocBlock;
    use crate::params::ParameterTable;
    use crate::response::ResponseRecord;
    use crate::route::HttpMethod;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn attempt(dir: &TempDir, doc: &str) -> Option<Vec<ResponseRecord>> {
        let route = Route::new("invoices/{id}", vec![HttpMethod::Get], "InvoiceController::download");
        let rules = AppliedRules::default();
        let table = ParameterTable::new();
        let context = StrategyContext {
            rules: &rules,
            body: &table,
            query: &table,
        };

        BinaryFileStrategy::new(dir.path())
            .attempt(&route, &DocBlock::parse(doc).tags, &context)
            .map(|responses| responses.into_iter().map(ResponseRecord::from).collect())
    }

    #[test]
    fn test_pdf_alias() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("invoice.pdf"), b"%PDF-1.4").unwrap();

        let responses = attempt(&dir, "@responsePdfFile invoice.pdf").unwrap();
        assert_eq!(
            responses,
            vec![ResponseRecord {
                status: 200,
                content: "JVBERi0xLjQ=".to_string(),
                content_type: Some("application/pdf".to_string()),
                comment: None,
            }]
        );
    }

    #[test]
    fn test_status_and_default_content_type() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blob"), [0u8, 1, 2]).unwrap();

        let responses = attempt(&dir, "@responseBinaryFile 202 blob").unwrap();
        assert_eq!(responses[0].status, 202);
        assert_eq!(responses[0].content, "AAEC");
        assert_eq!(responses[0].content_type.as_deref(), Some("application/octet-stream"));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(attempt(&dir, "@responseBinaryFile nope.bin").is_none());
        assert!(attempt(&dir, "@responseBinaryFile").is_none());
    }
}
