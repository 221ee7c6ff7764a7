//! Testing utilities for the Stitch workspace
//!
//! Shared fixtures, an in-memory text-mutation service and tracing setup.

#![allow(missing_docs)]

pub mod fixture;
mod service;

pub use fixture::{parse_document, FixtureError};
pub use service::{FixtureMutationService, RecordedCall};

use std::sync::Arc;
use stitch_model::{
    ContainerKind, DocumentId, LookupPath, MemberCategory, Node, NodeKind, Origin, Signature, SourceDocument, Span,
    TypeRef,
};
use tracing_subscriber::EnvFilter;

/// Install a test-friendly tracing subscriber
///
/// Honors `RUST_LOG`, defaults to `warn`, and is safe to call from every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true)
        .try_init();
}

/// Parse a fixture that is known to be well formed
///
/// # Panics
/// Panics if the fixture does not parse
#[must_use]
pub fn document(id: &str, text: &str) -> SourceDocument {
    match parse_document(id, text) {
        Ok(doc) => doc,
        Err(e) => panic!("fixture {id} does not parse: {e}"),
    }
}

/// Fixture document plus a fresh service
#[must_use]
pub fn setup(id: &str, text: &str) -> (Arc<FixtureMutationService>, SourceDocument) {
    init_tracing();
    (Arc::new(FixtureMutationService::new()), document(id, text))
}

/// Lookup path for a top-level container
#[must_use]
pub fn path(qualified_name: &str) -> LookupPath {
    LookupPath::top_level(qualified_name)
}

/// Part of a partial class holding one field
pub const PARTIAL_HOST: &str =
    "namespace Acme.Orders\n{\n    public partial class Host\n    {\n        private int _a;\n    }\n}\n";

/// [`PARTIAL_HOST`] plus a `void Run()` known only from another part
///
/// The metadata node reports the span of the local field, the way a
/// member merged in from elsewhere carries no usable position here.
///
/// # Panics
/// Panics if the hand-built snapshot is inconsistent
#[must_use]
pub fn partial_host_with_metadata_method() -> SourceDocument {
    let text = PARTIAL_HOST;
    let id = DocumentId::new("Host.cs");
    let line_after = |from: usize| text[from..].find('\n').map_or(text.len(), |i| from + i + 1);

    let host_start = text.find("    public partial").unwrap();
    let body_start = text[host_start..].find('{').unwrap() + host_start + 1;
    let field_start = text.find("        private").unwrap();
    let field_end = line_after(field_start);
    let body_end = text[field_end..].find('}').unwrap() + field_end;

    let mut b = SourceDocument::builder(id.clone(), text);
    let mut host = Node::new(
        NodeKind::Container(ContainerKind::Class),
        "Host",
        Span::new(host_start, line_after(body_end)),
        b.local_origin(),
    );
    host.namespace = Some("Acme.Orders".to_string());
    host.body = Some(Span::new(body_start, body_end));
    let host_id = b.add_node(None, host).unwrap();

    let mut field = Node::new(
        NodeKind::Member(MemberCategory::Fields),
        "_a",
        Span::new(field_start, field_end),
        b.local_origin(),
    );
    field.type_ref = Some(TypeRef::keyword("int"));
    b.add_node(Some(host_id), field).unwrap();

    let mut method = Node::new(
        NodeKind::Member(MemberCategory::Methods),
        "Run",
        Span::new(field_start, field_end),
        Origin::metadata(DocumentId::new("Host.Generated.cs")),
    );
    method.signature = Some(Signature::new(Vec::new(), TypeRef::void()));
    b.add_node(Some(host_id), method).unwrap();

    b.build().unwrap()
}

/// Class with one member in each member category
pub const ORDER_SERVICE: &str = r#"using System;
using Microsoft.Extensions.Logging;

namespace Acme.Orders
{
    public class OrderService
    {
        private readonly ILogger _logger;

        public OrderService(ILogger logger)
        {
            _logger = logger;
        }

        public int Count { get; set; }

        public event EventHandler Changed;

        public void Reset()
        {
            Count = 0;
        }

        public class Line
        {
        }
    }
}
"#;

/// Class with no members at all
pub const EMPTY_CLASS: &str = "using System;\n\nnamespace Acme.Orders\n{\n    public class Empty\n    {\n    }\n}\n";

/// Class with constructors but no fields, properties or events
pub const CONSTRUCTOR_ONLY: &str = r"namespace Acme.Orders
{
    public class Builder
    {
        public Builder()
        {
        }

        public Builder(int size)
        {
        }
    }
}
";

/// Interface with one method
pub const REPOSITORY: &str = r"namespace Acme.Orders
{
    public interface IOrderRepository
    {
        Task Save(Order order);
    }
}
";
