//! Update sessions
//!
//! An [`UpdateSession`] owns the current snapshot of one document and the
//! identity of one container in it. Every mutation goes through the
//! text-mutation service, produces a new snapshot and re-locates the
//! container by its [`LookupPath`]. Node ids from an earlier snapshot are
//! never used against a later one.
//!
//! # Failure
//!
//! If the service returns no document, or the container no longer resolves,
//! the session is poisoned: the failing call returns
//! [`SessionError::Integrity`] and so does every later mutation. Edits
//! already applied stay applied.

use crate::error::SessionError;
use crate::imports::ImportTable;
use crate::placement::{InsertionPointResolver, PlacementOptions};
use std::marker::PhantomData;
use std::sync::Arc;
use stitch_model::{
    Anchor, ContainerType, Edit, EditRecord, LookupPath, MemberCategory, MemberIdentity, Node, NodeId,
    SourceDocument, TextMutationService,
};
use tracing::{debug, info, warn};

/// Editing session over one container of kind `K`
#[derive(Debug)]
pub struct UpdateSession<K: ContainerType> {
    service: Arc<dyn TextMutationService>,
    document: SourceDocument,
    container: NodeId,
    path: LookupPath,
    imports: Option<ImportTable>,
    journal: Vec<EditRecord>,
    options: PlacementOptions,
    poisoned: bool,
    _kind: PhantomData<K>,
}

impl<K: ContainerType> UpdateSession<K> {
    /// Open a session on the container at `path`
    ///
    /// # Errors
    /// - `InvalidArgument` if the path is empty, does not resolve, or names a
    ///   container of another kind
    pub fn open(
        service: Arc<dyn TextMutationService>,
        document: SourceDocument,
        path: LookupPath,
        options: PlacementOptions,
    ) -> Result<Self, SessionError> {
        if path.is_empty() {
            return Err(SessionError::invalid_argument("empty container path"));
        }
        let container = service
            .resolve_container(&document, &path)
            .ok_or_else(|| SessionError::invalid_argument(format!("container {path} not found in {}", document.id())))?;
        Self::check_kind(&document, container, &path)?;

        info!(document = %document.id(), container = %path, kind = K::KIND.keyword(), "update session opened");
        Ok(Self {
            service,
            document,
            container,
            path,
            imports: None,
            journal: Vec::new(),
            options,
            poisoned: false,
            _kind: PhantomData,
        })
    }

    /// Open a session on a container node of `document`
    ///
    /// # Errors
    /// - `InvalidArgument` if `container` is not a container of kind `K`
    pub fn open_at(
        service: Arc<dyn TextMutationService>,
        document: SourceDocument,
        container: NodeId,
        options: PlacementOptions,
    ) -> Result<Self, SessionError> {
        let path = document
            .lookup_path(container)
            .ok_or_else(|| SessionError::invalid_argument(format!("{container} is not a container")))?;
        Self::open(service, document, path, options)
    }

    fn check_kind(document: &SourceDocument, container: NodeId, path: &LookupPath) -> Result<(), SessionError> {
        match document.node(container).and_then(Node::container_kind) {
            Some(kind) if kind == K::KIND => Ok(()),
            Some(kind) => Err(SessionError::invalid_argument(format!(
                "{path} is declared as `{}`, expected `{}`",
                kind.keyword(),
                K::KIND.keyword()
            ))),
            None => Err(SessionError::invalid_argument(format!("{path} is not a container"))),
        }
    }

    /// Current snapshot
    #[inline]
    #[must_use]
    pub fn document(&self) -> &SourceDocument {
        &self.document
    }

    /// Container id in the current snapshot
    #[inline]
    #[must_use]
    pub fn container_id(&self) -> NodeId {
        self.container
    }

    /// Container node in the current snapshot
    #[inline]
    #[must_use]
    pub fn container(&self) -> Option<&Node> {
        self.document.node(self.container)
    }

    /// Stable address of the container
    #[inline]
    #[must_use]
    pub fn lookup_path(&self) -> &LookupPath {
        &self.path
    }

    /// Edits applied so far, oldest first
    #[inline]
    #[must_use]
    pub fn journal(&self) -> &[EditRecord] {
        &self.journal
    }

    /// Import table, if it has been built
    #[inline]
    #[must_use]
    pub fn import_table(&self) -> Option<&ImportTable> {
        self.imports.as_ref()
    }

    /// Placement switches in effect
    #[inline]
    #[must_use]
    pub fn options(&self) -> PlacementOptions {
        self.options
    }

    /// True after an integrity failure
    #[inline]
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Build the import table if it has not been built yet
    pub fn ensure_import_table(&mut self) -> &ImportTable {
        let (document, container) = (&self.document, self.container);
        self.imports
            .get_or_insert_with(|| ImportTable::from_document(document, container))
    }

    /// Members of `category` in the container, in source order
    #[must_use]
    pub fn members(&self, category: MemberCategory) -> Vec<(NodeId, &Node)> {
        self.document.members_in(self.container, category)
    }

    /// Existing member with the given identity
    #[must_use]
    pub fn find_member(&self, identity: &MemberIdentity) -> Option<NodeId> {
        self.document
            .children(self.container)
            .find(|(_, node)| identity.matches(node))
            .map(|(id, _)| id)
    }

    /// Anchor for new syntax before the first member of `category`
    #[must_use]
    pub fn anchor_before(&self, category: MemberCategory) -> Anchor {
        self.resolver().resolve_before(category)
    }

    /// Anchor for new syntax after the last member of `category`
    #[must_use]
    pub fn anchor_after(&self, category: MemberCategory) -> Anchor {
        self.resolver().resolve_after(category)
    }

    fn resolver(&self) -> InsertionPointResolver<'_> {
        InsertionPointResolver::new(&self.document, self.container, self.options)
    }

    /// Insert `text` at `anchor`; empty text is a no-op
    ///
    /// # Errors
    /// - `Integrity` if the service result cannot be resolved
    pub async fn mutate_at(&mut self, anchor: Anchor, text: &str) -> Result<(), SessionError> {
        if text.is_empty() {
            debug!(%anchor, "empty insertion skipped");
            return Ok(());
        }
        self.apply(Edit::Insert {
            anchor,
            text: text.to_string(),
        })
        .await
    }

    /// Insert before the first member of `category`
    ///
    /// # Errors
    /// - `Integrity` if the service result cannot be resolved
    pub async fn add_before(&mut self, category: MemberCategory, text: &str) -> Result<(), SessionError> {
        let anchor = self.anchor_before(category);
        self.mutate_at(anchor, text).await
    }

    /// Insert after the last member of `category`
    ///
    /// # Errors
    /// - `Integrity` if the service result cannot be resolved
    pub async fn add_after(&mut self, category: MemberCategory, text: &str) -> Result<(), SessionError> {
        let anchor = self.anchor_after(category);
        self.mutate_at(anchor, text).await
    }

    /// Insert at the start of the container body
    ///
    /// # Errors
    /// - `Integrity` if the service result cannot be resolved
    pub async fn add_to_beginning(&mut self, text: &str) -> Result<(), SessionError> {
        self.mutate_at(Anchor::ContainerStart(self.container), text).await
    }

    /// Insert at the end of the container body
    ///
    /// # Errors
    /// - `Integrity` if the service result cannot be resolved
    pub async fn add_to_end(&mut self, text: &str) -> Result<(), SessionError> {
        self.mutate_at(Anchor::ContainerEnd(self.container), text).await
    }

    /// Overwrite a member of the container
    ///
    /// # Errors
    /// - `InvalidArgument` if `member` is not a direct member of the container
    ///   declared in this document
    /// - `Integrity` if the service result cannot be resolved
    pub async fn replace_member(&mut self, member: NodeId, text: &str) -> Result<(), SessionError> {
        self.check_member(member)?;
        if text.is_empty() {
            return Err(SessionError::invalid_argument("replacement text is empty"));
        }
        self.apply(Edit::Replace {
            node: member,
            text: text.to_string(),
        })
        .await
    }

    /// Remove a member of the container
    ///
    /// # Errors
    /// - `InvalidArgument` if `member` is not a direct member of the container
    ///   declared in this document
    /// - `Integrity` if the service result cannot be resolved
    pub async fn delete_member(&mut self, member: NodeId) -> Result<(), SessionError> {
        self.check_member(member)?;
        self.apply(Edit::Delete { node: member }).await
    }

    /// Add an import directive unless the identical one already exists
    ///
    /// # Errors
    /// - `InvalidArgument` if `namespace` is empty
    /// - `Integrity` if the service result cannot be resolved
    pub async fn add_using(&mut self, namespace: &str, alias: Option<&str>) -> Result<(), SessionError> {
        if namespace.trim().is_empty() {
            return Err(SessionError::invalid_argument("empty namespace"));
        }
        if self.ensure_import_table().contains(namespace, alias) {
            debug!(namespace, "import already present");
            return Ok(());
        }
        self.apply(Edit::AddImport {
            namespace: namespace.to_string(),
            alias: alias.map(str::to_string),
        })
        .await
    }

    /// True if `member` was parsed from this session's document
    ///
    /// Members merged in from other parts or from metadata cannot be
    /// edited through this snapshot.
    #[must_use]
    pub fn is_local_member(&self, member: NodeId) -> bool {
        self.document
            .node(member)
            .is_some_and(|node| node.is_local_to(self.document.id()))
    }

    fn check_member(&self, member: NodeId) -> Result<(), SessionError> {
        match self.document.node(member) {
            Some(node) if node.parent == Some(self.container) && node.is_local_to(self.document.id()) => Ok(()),
            Some(node) if node.parent == Some(self.container) => Err(SessionError::invalid_argument(format!(
                "{member} ({}) is not declared in {}",
                node.name,
                self.document.id()
            ))),
            _ => Err(SessionError::invalid_argument(format!(
                "{member} is not a member of {}",
                self.path
            ))),
        }
    }

    async fn apply(&mut self, edit: Edit) -> Result<(), SessionError> {
        let operation = edit.operation();
        if self.poisoned {
            return Err(SessionError::integrity(
                operation,
                "session was poisoned by an earlier failure",
            ));
        }

        let base_hash = self.document.hash();
        let Some(next) = self.service.apply(&self.document, &edit).await else {
            return Err(self.poison(operation, "text-mutation service returned no document".to_string()));
        };
        let Some(container) = self.service.resolve_container(&next, &self.path) else {
            return Err(self.poison(operation, format!("container {} no longer resolves", self.path)));
        };
        if next.node(container).and_then(Node::container_kind) != Some(K::KIND) {
            return Err(self.poison(operation, format!("{} is no longer a {}", self.path, K::KIND.keyword())));
        }

        let result_hash = next.hash();
        if let (Edit::AddImport { namespace, alias }, Some(table)) = (&edit, self.imports.as_mut()) {
            table.insert(namespace.clone(), alias.clone());
        }
        debug!(operation, container = %self.path, hash = %result_hash.short(), "edit applied");
        self.document = next;
        self.container = container;
        self.journal.push(EditRecord {
            edit,
            base_hash,
            result_hash,
        });
        Ok(())
    }

    fn poison(&mut self, operation: &'static str, detail: String) -> SessionError {
        warn!(operation, container = %self.path, %detail, "session poisoned");
        self.poisoned = true;
        SessionError::integrity(operation, detail)
    }
}
