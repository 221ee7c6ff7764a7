//! Import visibility
//!
//! [`ImportTable`] is a snapshot of the import directives a container can
//! see. [`NamespaceResolver`] walks type references and adds an import for
//! every namespace that is not yet visible.

use crate::error::SessionError;
use crate::session::UpdateSession;
use indexmap::IndexSet;
use stitch_model::{ContainerType, NodeId, SourceDocument, TypeRef};

/// Import directives visible to one container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    self_namespace: Option<String>,
    entries: IndexSet<(String, Option<String>)>,
}

impl ImportTable {
    /// Empty table for a container declared in `self_namespace`
    #[must_use]
    pub fn new(self_namespace: Option<String>) -> Self {
        Self {
            self_namespace,
            entries: IndexSet::new(),
        }
    }

    /// Table built from the document's imports and the container's namespace
    #[must_use]
    pub fn from_document(document: &SourceDocument, container: NodeId) -> Self {
        let self_namespace = enclosing_namespace(document, container);
        let mut table = Self::new(self_namespace);
        for (_, import) in document.imports() {
            table.insert(import.name.clone(), import.alias.clone());
        }
        table
    }

    /// Namespace the container itself is declared in
    #[inline]
    #[must_use]
    pub fn self_namespace(&self) -> Option<&str> {
        self.self_namespace.as_deref()
    }

    /// Record a directive; false if it was already present
    pub fn insert(&mut self, namespace: impl Into<String>, alias: Option<String>) -> bool {
        self.entries.insert((namespace.into(), alias))
    }

    /// True if this exact directive is present
    #[must_use]
    pub fn contains(&self, namespace: &str, alias: Option<&str>) -> bool {
        self.entries
            .iter()
            .any(|(ns, a)| ns == namespace && a.as_deref() == alias)
    }

    /// True if types of `namespace` can be named from the container
    #[must_use]
    pub fn is_visible(&self, namespace: &str) -> bool {
        self.self_namespace.as_deref() == Some(namespace) || self.entries.iter().any(|(ns, _)| ns == namespace)
    }

    /// Alias to qualify `namespace` with, when it is only visible through one
    #[must_use]
    pub fn qualifier_for(&self, namespace: &str) -> Option<&str> {
        if self.self_namespace.as_deref() == Some(namespace) {
            return None;
        }
        let mut aliases = self.entries.iter().filter(|(ns, _)| ns == namespace);
        if aliases.clone().any(|(_, alias)| alias.is_none()) {
            return None;
        }
        aliases.find_map(|(_, alias)| alias.as_deref())
    }

    /// Number of directives
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no directives
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Directives in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(ns, alias)| (ns.as_str(), alias.as_deref()))
    }
}

/// Namespace of the outermost container enclosing `id`
fn enclosing_namespace(document: &SourceDocument, id: NodeId) -> Option<String> {
    let mut current = document.node(id)?;
    while let Some(parent) = current.parent.and_then(|p| document.node(p)) {
        current = parent;
    }
    current.namespace.clone().filter(|ns| !ns.is_empty())
}

/// Makes namespaces visible in a session
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceResolver;

impl NamespaceResolver {
    /// Import every namespace `type_ref` mentions, type arguments first
    ///
    /// Generic parameters and keyword types carry no namespace and are
    /// skipped.
    ///
    /// # Errors
    /// Propagates session failures from adding an import
    pub async fn ensure_visible<K: ContainerType>(
        session: &mut UpdateSession<K>,
        type_ref: &TypeRef,
    ) -> Result<(), SessionError> {
        let namespaces: Vec<String> = type_ref
            .walk()
            .into_iter()
            .filter(|t| !t.is_generic_parameter())
            .filter_map(|t| t.namespace.clone())
            .collect();
        for namespace in namespaces {
            Self::ensure_namespace(session, &namespace).await?;
        }
        Ok(())
    }

    /// [`Self::ensure_visible`] over several types, in order
    ///
    /// # Errors
    /// Propagates the first session failure
    pub async fn ensure_all<'t, K, I>(session: &mut UpdateSession<K>, types: I) -> Result<(), SessionError>
    where
        K: ContainerType,
        I: IntoIterator<Item = &'t TypeRef>,
    {
        for type_ref in types {
            Self::ensure_visible(session, type_ref).await?;
        }
        Ok(())
    }

    /// Add a plain import for `namespace` unless it is already visible
    ///
    /// # Errors
    /// Propagates session failures from adding the import
    pub async fn ensure_namespace<K: ContainerType>(
        session: &mut UpdateSession<K>,
        namespace: &str,
    ) -> Result<(), SessionError> {
        if namespace.is_empty() || session.ensure_import_table().is_visible(namespace) {
            return Ok(());
        }
        session.add_using(namespace, None).await
    }
}
