//! In-memory text-mutation service
//!
//! Applies edits by splicing the snapshot text and re-parsing it with the
//! fixture parser. Every call is recorded, and a failure can be injected on
//! the N-th mutation to exercise integrity handling.

use crate::fixture::parse_document;
use async_trait::async_trait;
use parking_lot::Mutex;
use stitch_model::{NodeId, SourceDocument, TextMutationService};

/// One recorded service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Operation name (`insert_before`, `replace`, ...)
    pub operation: &'static str,
    /// Target node, when the operation has one
    pub node: Option<NodeId>,
    /// Payload text (inserted/replacing text or import line)
    pub text: Option<String>,
}

/// Text-mutation service over fixture text
#[derive(Debug, Default)]
pub struct FixtureMutationService {
    calls: Mutex<Vec<RecordedCall>>,
    fail_on: Mutex<Option<usize>>,
}

impl FixtureMutationService {
    /// Service that never fails on purpose
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Service whose `n`-th mutation (1-based) returns `None`
    #[must_use]
    pub fn failing_on(n: usize) -> Self {
        let service = Self::default();
        service.fail_on_nth(Some(n));
        service
    }

    /// Change the injected failure
    pub fn fail_on_nth(&self, n: Option<usize>) {
        *self.fail_on.lock() = n;
    }

    /// Every call so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of mutations attempted so far
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Record a call; false if this call should fail
    fn record(&self, operation: &'static str, node: Option<NodeId>, text: Option<&str>) -> bool {
        let mut calls = self.calls.lock();
        calls.push(RecordedCall {
            operation,
            node,
            text: text.map(str::to_string),
        });
        let n = calls.len();
        if *self.fail_on.lock() == Some(n) {
            tracing::warn!(operation, call = n, "injected mutation failure");
            return false;
        }
        true
    }

    fn reparse(document: &SourceDocument, text: String) -> Option<SourceDocument> {
        match parse_document(document.id().as_str(), &text) {
            Ok(next) => Some(next),
            Err(e) => {
                tracing::warn!(error = %e, "edited text no longer parses");
                None
            }
        }
    }

    fn splice(document: &SourceDocument, offset: usize, remove: usize, insert: &str) -> Option<SourceDocument> {
        let text = document.text();
        let end = offset.checked_add(remove)?;
        if end > text.len() || !text.is_char_boundary(offset) || !text.is_char_boundary(end) {
            return None;
        }
        let mut out = String::with_capacity(text.len() + insert.len());
        out.push_str(&text[..offset]);
        out.push_str(insert);
        out.push_str(&text[end..]);
        Self::reparse(document, out)
    }

    fn at_line_start(text: &str, offset: usize) -> bool {
        offset == 0 || text.as_bytes().get(offset - 1) == Some(&b'\n')
    }
}

#[async_trait]
impl TextMutationService for FixtureMutationService {
    async fn insert_before(&self, document: &SourceDocument, anchor: NodeId, text: &str) -> Option<SourceDocument> {
        if !self.record("insert_before", Some(anchor), Some(text)) {
            return None;
        }
        let node = document.node(anchor)?;
        Self::splice(document, node.span.start, 0, text)
    }

    async fn insert_after(&self, document: &SourceDocument, anchor: NodeId, text: &str) -> Option<SourceDocument> {
        if !self.record("insert_after", Some(anchor), Some(text)) {
            return None;
        }
        let node = document.node(anchor)?;
        let offset = node.span.end;
        if Self::at_line_start(document.text(), offset) {
            Self::splice(document, offset, 0, text)
        } else {
            Self::splice(document, offset, 0, &format!("\n{text}"))
        }
    }

    async fn insert_at_document_start(&self, document: &SourceDocument, text: &str) -> Option<SourceDocument> {
        if !self.record("insert_at_document_start", None, Some(text)) {
            return None;
        }
        Self::splice(document, 0, 0, text)
    }

    async fn insert_at_document_end(&self, document: &SourceDocument, text: &str) -> Option<SourceDocument> {
        if !self.record("insert_at_document_end", None, Some(text)) {
            return None;
        }
        let len = document.text().len();
        if Self::at_line_start(document.text(), len) {
            Self::splice(document, len, 0, text)
        } else {
            Self::splice(document, len, 0, &format!("\n{text}"))
        }
    }

    async fn insert_at_container_start(
        &self,
        document: &SourceDocument,
        container: NodeId,
        text: &str,
    ) -> Option<SourceDocument> {
        if !self.record("insert_at_container_start", Some(container), Some(text)) {
            return None;
        }
        let body = document.node(container)?.body?;
        let rest = &document.text()[body.start..];
        if let Some(after_newline) = rest.find('\n').filter(|&i| rest[..i].trim().is_empty()) {
            Self::splice(document, body.start + after_newline + 1, 0, text)
        } else {
            Self::splice(document, body.start, 0, &format!("\n{text}"))
        }
    }

    async fn insert_at_container_end(
        &self,
        document: &SourceDocument,
        container: NodeId,
        text: &str,
    ) -> Option<SourceDocument> {
        if !self.record("insert_at_container_end", Some(container), Some(text)) {
            return None;
        }
        let body = document.node(container)?.body?;
        let before = &document.text()[..body.end];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        if before[line_start..].trim().is_empty() && line_start >= body.start {
            Self::splice(document, line_start, 0, text)
        } else {
            Self::splice(document, body.end, 0, &format!("\n{text}"))
        }
    }

    async fn replace(&self, document: &SourceDocument, node: NodeId, text: &str) -> Option<SourceDocument> {
        if !self.record("replace", Some(node), Some(text)) {
            return None;
        }
        let span = document.node(node)?.span;
        Self::splice(document, span.start, span.len(), text)
    }

    async fn delete(&self, document: &SourceDocument, node: NodeId) -> Option<SourceDocument> {
        if !self.record("delete", Some(node), None) {
            return None;
        }
        let span = document.node(node)?.span;
        Self::splice(document, span.start, span.len(), "")
    }

    async fn add_import(
        &self,
        document: &SourceDocument,
        namespace: &str,
        alias: Option<&str>,
    ) -> Option<SourceDocument> {
        let line = match alias {
            Some(alias) => format!("using {alias} = {namespace};\n"),
            None => format!("using {namespace};\n"),
        };
        if !self.record("add_import", None, Some(&line)) {
            return None;
        }
        match document.imports().last() {
            Some((_, last)) if Self::at_line_start(document.text(), last.span.end) => {
                Self::splice(document, last.span.end, 0, &line)
            }
            Some((_, last)) => Self::splice(document, last.span.end, 0, &format!("\n{line}")),
            None => Self::splice(document, 0, 0, &line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stitch_model::{Anchor, Edit, LookupPath, MemberCategory};

    const TEXT: &str = "namespace Acme\n{\n    public class Widget\n    {\n        private int _a;\n    }\n}\n";

    fn widget(doc: &SourceDocument) -> NodeId {
        doc.resolve(&LookupPath::top_level("Acme.Widget")).unwrap()
    }

    #[tokio::test]
    async fn insert_after_member_lands_on_next_line() {
        let service = FixtureMutationService::new();
        let doc = parse_document("Widget.cs", TEXT).unwrap();
        let (field, _) = doc.members_in(widget(&doc), MemberCategory::Fields)[0];

        let next = service.insert_after(&doc, field, "        private int _b;\n").await.unwrap();
        assert_eq!(
            next.text(),
            "namespace Acme\n{\n    public class Widget\n    {\n        private int _a;\n        private int _b;\n    }\n}\n"
        );
        let fields = next.members_in(widget(&next), MemberCategory::Fields);
        assert_eq!(fields.len(), 2);
    }

    #[tokio::test]
    async fn container_start_and_end() {
        let service = FixtureMutationService::new();
        let doc = parse_document("Widget.cs", TEXT).unwrap();
        let w = widget(&doc);

        let start = service.insert_at_container_start(&doc, w, "        // first\n").await.unwrap();
        assert!(start.text().contains("    {\n        // first\n        private int _a;"));

        let end = service
            .apply(
                &doc,
                &Edit::Insert {
                    anchor: Anchor::ContainerEnd(w),
                    text: "        public void Run() { }\n".into(),
                },
            )
            .await
            .unwrap();
        assert!(end.text().contains("private int _a;\n        public void Run() { }\n    }\n"));
        assert_eq!(end.members_in(widget(&end), MemberCategory::Methods).len(), 1);
    }

    #[tokio::test]
    async fn imports_go_after_the_last_import_or_at_start() {
        let service = FixtureMutationService::new();
        let doc = parse_document("Widget.cs", TEXT).unwrap();

        let first = service.add_import(&doc, "System", None).await.unwrap();
        assert!(first.text().starts_with("using System;\nnamespace Acme"));

        let second = service.add_import(&first, "Acme.Logging", Some("Log")).await.unwrap();
        assert!(second.text().starts_with("using System;\nusing Log = Acme.Logging;\nnamespace"));
        assert_eq!(second.imports().count(), 2);
    }

    #[tokio::test]
    async fn replace_and_delete_use_full_spans() {
        let service = FixtureMutationService::new();
        let doc = parse_document("Widget.cs", TEXT).unwrap();
        let (field, _) = doc.members_in(widget(&doc), MemberCategory::Fields)[0];

        let replaced = service.replace(&doc, field, "        private long _a;\n").await.unwrap();
        assert!(replaced.text().contains("        private long _a;\n    }"));

        let deleted = service.delete(&doc, field).await.unwrap();
        assert_eq!(deleted.text(), "namespace Acme\n{\n    public class Widget\n    {\n    }\n}\n");
    }

    #[tokio::test]
    async fn injected_failure_and_call_log() {
        let service = FixtureMutationService::failing_on(2);
        let doc = parse_document("Widget.cs", TEXT).unwrap();

        let next = service.insert_at_document_end(&doc, "// end\n").await;
        assert!(next.is_some());
        assert!(service.insert_at_document_start(&doc, "// start\n").await.is_none());

        let calls = service.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].operation, "insert_at_document_start");
        assert_eq!(service.mutation_count(), 2);
    }

    #[tokio::test]
    async fn unparseable_result_is_unresolved() {
        let service = FixtureMutationService::new();
        let doc = parse_document("Widget.cs", TEXT).unwrap();
        assert!(service.insert_at_document_end(&doc, "}\n").await.is_none());
    }
}
