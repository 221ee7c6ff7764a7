//! Member synthesis
//!
//! Every synthesis call follows the same sequence against one
//! [`UpdateSession`]:
//!
//! 1. Identity check: an existing member with the same identity is left
//!    alone unless the request asks for replacement
//! 2. Imports for every referenced type and every policy namespace
//! 3. Text composition
//! 4. Placement through the session's category rules, or replacement in
//!    place
//!
//! Nothing is rolled back if a later step fails; the session journal shows
//! what was applied.

use crate::config::{PropertyStyle, SynthConfig};
use crate::descriptor::{
    EventRequest, FieldDescriptor, FieldRequest, MemberRequest, MethodDescriptor, MethodRequest, PropertyDescriptor,
    PropertyRequest,
};
use crate::error::SynthError;
use crate::render::Renderer;
use std::sync::Arc;
use stitch_model::{AsyncShape, ContainerType, MemberCategory, MemberIdentity, TypeRef, Visibility};
use stitch_policy::{
    first_applicable, BlockKind, BoundsCheckPolicy, ErrorBlockPolicy, LoggingFormatter, MethodContext, PolicyRegistry,
};
use stitch_session::{NamespaceResolver, UpdateSession};
use tracing::{debug, info};

/// Why a synthesis call changed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A member with the same identity exists and replacement was not asked for
    AlreadyExists,
    /// The composed text was empty
    EmptyText,
}

/// Result of one synthesis call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthOutcome {
    /// New member added
    Inserted,
    /// Existing member overwritten
    Replaced,
    /// Nothing to do
    Skipped(SkipReason),
}

impl SynthOutcome {
    /// True if the document changed
    #[inline]
    #[must_use]
    pub fn changed(self) -> bool {
        !matches!(self, Self::Skipped(_))
    }
}

/// Composes members from descriptors and policies
///
/// Policies are shared read-only; one synthesizer serves any number of
/// sessions.
#[derive(Debug, Clone)]
pub struct MemberSynthesizer {
    config: SynthConfig,
    formatter: Option<Arc<dyn LoggingFormatter>>,
    bounds_checks: Vec<Arc<dyn BoundsCheckPolicy>>,
    error_blocks: Vec<Arc<dyn ErrorBlockPolicy>>,
}

/// Builder for [`MemberSynthesizer`]
#[derive(Debug, Default)]
pub struct MemberSynthesizerBuilder {
    config: SynthConfig,
    formatter: Option<Arc<dyn LoggingFormatter>>,
    bounds_checks: Vec<Arc<dyn BoundsCheckPolicy>>,
    error_blocks: Vec<Arc<dyn ErrorBlockPolicy>>,
}

impl MemberSynthesizerBuilder {
    /// Use `config` for indentation, naming and property settings
    #[must_use]
    pub fn config(mut self, config: SynthConfig) -> Self {
        self.config = config;
        self
    }

    /// Generate log calls with `formatter`
    #[must_use]
    pub fn formatter(mut self, formatter: Arc<dyn LoggingFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Append a bounds-check policy
    #[must_use]
    pub fn bounds_check(mut self, policy: Arc<dyn BoundsCheckPolicy>) -> Self {
        self.bounds_checks.push(policy);
        self
    }

    /// Append an error-block policy
    #[must_use]
    pub fn error_block(mut self, policy: Arc<dyn ErrorBlockPolicy>) -> Self {
        self.error_blocks.push(policy);
        self
    }

    /// Finish
    #[must_use]
    pub fn build(self) -> MemberSynthesizer {
        MemberSynthesizer {
            config: self.config,
            formatter: self.formatter,
            bounds_checks: self.bounds_checks,
            error_blocks: self.error_blocks,
        }
    }
}

impl MemberSynthesizer {
    /// Start building a synthesizer with default configuration and no policies
    #[must_use]
    pub fn builder() -> MemberSynthesizerBuilder {
        MemberSynthesizerBuilder::default()
    }

    /// Synthesizer with the policies `config` names
    ///
    /// # Errors
    /// Returns `SynthError::Policy` if a name is unknown or the logger field
    /// is invalid
    pub fn from_config(config: SynthConfig, registry: &PolicyRegistry) -> Result<Self, SynthError> {
        let bounds_checks = registry.bounds_checks(config.policies.bounds_checks.as_slice())?;
        let error_blocks = registry.error_blocks(config.policies.error_blocks.as_slice())?;
        let formatter = config
            .policies
            .logging
            .as_deref()
            .map(|name| registry.formatter(name, &config.logger_field))
            .transpose()?;
        Ok(Self {
            config,
            formatter,
            bounds_checks,
            error_blocks,
        })
    }

    /// Configuration in effect
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Add a method
    ///
    /// # Errors
    /// - `InvalidArgument` if the name is empty or a mandatory visibility is missing
    /// - `Session` if a mutation fails
    pub async fn synthesize_method<K: ContainerType>(
        &self,
        session: &mut UpdateSession<K>,
        request: &MethodRequest,
    ) -> Result<SynthOutcome, SynthError> {
        let method = &request.descriptor;
        require_name(&method.name)?;
        let visibility = visibility_for::<K>(request.visibility, &method.name)?;

        let identity = MemberIdentity::of_method(&method.name, &method.signature);
        if !request.replace && session.find_member(&identity).is_some() {
            debug!(member = %method.name, %identity, "method already exists");
            return Ok(SynthOutcome::Skipped(SkipReason::AlreadyExists));
        }

        let indent = self.member_indent(session, request.indent.as_deref());
        let body_indent = format!("{indent}{}", self.config.indent_unit);
        let level = request.level.unwrap_or(self.config.default_log_level);
        let ctx = MethodContext::new(&method.name, &body_indent, &self.config.indent_unit)
            .with_formatter(self.formatter.as_deref())
            .with_level(level);

        NamespaceResolver::ensure_all(session, method.referenced_types()).await?;
        if !K::signature_only() {
            for namespace in self.body_namespaces(&ctx, method) {
                NamespaceResolver::ensure_namespace(session, &namespace).await?;
            }
        }

        // Policy text is rendered against the final imports
        let table = session.ensure_import_table().clone();
        let renderer = Renderer::new(&table);
        let body = if K::signature_only() {
            None
        } else {
            Some(self.method_body(&ctx.with_type_names(&renderer), method))
        };
        let text = compose_method(&renderer, method, visibility, &indent, body.as_ref());
        self.place(session, &identity, MemberCategory::Methods, &text, request.replace)
            .await
    }

    /// Add a property, with a backing field when configured
    ///
    /// # Errors
    /// - `InvalidArgument` if the name is empty, there is no accessor, or a
    ///   mandatory visibility is missing
    /// - `Session` if a mutation fails
    pub async fn synthesize_property<K: ContainerType>(
        &self,
        session: &mut UpdateSession<K>,
        request: &PropertyRequest,
    ) -> Result<SynthOutcome, SynthError> {
        let property = &request.descriptor;
        require_name(&property.name)?;
        if property.accessor_count() == 0 {
            return Err(SynthError::invalid_argument(format!(
                "property {} has no accessor",
                property.name
            )));
        }
        let visibility = visibility_for::<K>(request.visibility, &property.name)?;

        let identity = MemberIdentity::named(MemberCategory::Properties, property.name.clone());
        if !request.replace && session.find_member(&identity).is_some() {
            debug!(member = %property.name, "property already exists");
            return Ok(SynthOutcome::Skipped(SkipReason::AlreadyExists));
        }

        let backing_name = self.config.field_naming.apply(&property.name);
        let wants_backing_field = self.config.property.backing_field && !K::signature_only();
        if wants_backing_field && backing_name == property.name {
            return Err(SynthError::invalid_argument(format!(
                "backing field of {} would share its name",
                property.name
            )));
        }

        let types = property
            .attributes
            .iter()
            .map(|a| &a.type_ref)
            .chain(std::iter::once(&property.type_ref));
        NamespaceResolver::ensure_all(session, types).await?;

        let backing_field = if wants_backing_field {
            let field = FieldRequest {
                descriptor: FieldDescriptor::new(property.name.clone(), property.type_ref.clone()),
                indent: request.indent.clone(),
                visibility: Some(Visibility::Private),
            };
            self.synthesize_field(session, &field).await?;
            Some(backing_name)
        } else {
            None
        };

        let indent = self.member_indent(session, request.indent.as_deref());
        let table = session.ensure_import_table().clone();
        let text = self.compose_property(
            &Renderer::new(&table),
            property,
            visibility,
            &indent,
            backing_field.as_deref(),
        );
        self.place(session, &identity, MemberCategory::Properties, &text, request.replace)
            .await
    }

    /// Add a field after the existing fields
    ///
    /// # Errors
    /// - `InvalidArgument` if the container is an interface, the name is
    ///   empty, a mandatory visibility is missing, or a `const` has no value
    /// - `Session` if a mutation fails
    pub async fn synthesize_field<K: ContainerType>(
        &self,
        session: &mut UpdateSession<K>,
        request: &FieldRequest,
    ) -> Result<SynthOutcome, SynthError> {
        let field = &request.descriptor;
        if K::signature_only() {
            return Err(SynthError::invalid_argument(format!(
                "a {} cannot declare field {}",
                K::KIND.keyword(),
                field.name
            )));
        }
        require_name(&field.name)?;
        let visibility = visibility_for::<K>(request.visibility, &field.name)?;
        if field.is_const && field.default_value.is_none() {
            return Err(SynthError::invalid_argument(format!(
                "const field {} needs a value",
                field.name
            )));
        }

        let stored = self.config.field_naming.apply(&field.name);
        let identity = MemberIdentity::named(MemberCategory::Fields, stored.clone());
        if session.find_member(&identity).is_some() {
            debug!(member = %stored, "field already exists");
            return Ok(SynthOutcome::Skipped(SkipReason::AlreadyExists));
        }

        NamespaceResolver::ensure_visible(session, &field.type_ref).await?;

        let indent = self.member_indent(session, request.indent.as_deref());
        let table = session.ensure_import_table().clone();
        let text = compose_field(&Renderer::new(&table), field, &stored, visibility, &indent);
        self.place(session, &identity, MemberCategory::Fields, &text, false).await
    }

    /// Add an event after the existing events
    ///
    /// # Errors
    /// - `InvalidArgument` if the name is empty or a mandatory visibility is missing
    /// - `Session` if a mutation fails
    pub async fn synthesize_event<K: ContainerType>(
        &self,
        session: &mut UpdateSession<K>,
        request: &EventRequest,
    ) -> Result<SynthOutcome, SynthError> {
        let event = &request.descriptor;
        require_name(&event.name)?;
        let visibility = visibility_for::<K>(request.visibility, &event.name)?;

        let identity = MemberIdentity::named(MemberCategory::Events, event.name.clone());
        if session.find_member(&identity).is_some() {
            debug!(member = %event.name, "event already exists");
            return Ok(SynthOutcome::Skipped(SkipReason::AlreadyExists));
        }

        NamespaceResolver::ensure_visible(session, &event.type_ref).await?;

        let indent = self.member_indent(session, request.indent.as_deref());
        let table = session.ensure_import_table().clone();
        let renderer = Renderer::new(&table);
        let mut text = String::new();
        if let Some(doc) = &event.documentation {
            text.push_str(&renderer.documentation(&indent, doc));
        }
        text.push_str(&indent);
        push_visibility(&mut text, visibility);
        text.push_str(&format!("event {} {};\n", renderer.type_name(&event.type_ref), event.name));
        self.place(session, &identity, MemberCategory::Events, &text, false).await
    }

    /// Run requests in order, stopping at the first error
    ///
    /// # Errors
    /// The first error raised by any request; earlier requests stay applied
    pub async fn synthesize_all<K: ContainerType>(
        &self,
        session: &mut UpdateSession<K>,
        requests: &[MemberRequest],
    ) -> Result<Vec<SynthOutcome>, SynthError> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            let outcome = match request {
                MemberRequest::Method(r) => self.synthesize_method(session, r).await?,
                MemberRequest::Property(r) => self.synthesize_property(session, r).await?,
                MemberRequest::Field(r) => self.synthesize_field(session, r).await?,
                MemberRequest::Event(r) => self.synthesize_event(session, r).await?,
            };
            outcomes.push(outcome);
        }
        info!(
            container = %session.lookup_path(),
            requested = requests.len(),
            changed = outcomes.iter().filter(|o| o.changed()).count(),
            "synthesis batch complete"
        );
        Ok(outcomes)
    }

    async fn place<K: ContainerType>(
        &self,
        session: &mut UpdateSession<K>,
        identity: &MemberIdentity,
        category: MemberCategory,
        text: &str,
        replace: bool,
    ) -> Result<SynthOutcome, SynthError> {
        if text.is_empty() {
            return Ok(SynthOutcome::Skipped(SkipReason::EmptyText));
        }
        match session.find_member(identity) {
            Some(existing) if replace && session.is_local_member(existing) => {
                session.replace_member(existing, text).await?;
                info!(%identity, container = %session.lookup_path(), "member replaced");
                Ok(SynthOutcome::Replaced)
            }
            Some(_) if replace => {
                debug!(%identity, "member is declared in another part, left in place");
                Ok(SynthOutcome::Skipped(SkipReason::AlreadyExists))
            }
            Some(_) => Ok(SynthOutcome::Skipped(SkipReason::AlreadyExists)),
            None => {
                session.add_after(category, text).await?;
                info!(%identity, %category, container = %session.lookup_path(), "member inserted");
                Ok(SynthOutcome::Inserted)
            }
        }
    }

    /// Explicit indent, or the container's indentation plus one unit
    fn member_indent<K: ContainerType>(&self, session: &UpdateSession<K>, explicit: Option<&str>) -> String {
        if let Some(indent) = explicit {
            return indent.to_string();
        }
        let container_text = session.document().node_text(session.container_id());
        let leading: String = container_text
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();
        format!("{leading}{}", self.config.indent_unit)
    }

    /// Catch-kind error blocks, in configured order
    ///
    /// The body is wrapped in `try` by [`compose_method`]; other clause kinds
    /// are not emitted.
    fn catch_blocks(&self) -> impl Iterator<Item = &Arc<dyn ErrorBlockPolicy>> {
        self.error_blocks.iter().filter(|p| p.kind() == BlockKind::Catch)
    }

    /// Namespaces the policies applied to `method` depend on, in first-use order
    fn body_namespaces(&self, ctx: &MethodContext<'_>, method: &MethodDescriptor) -> Vec<String> {
        let mut namespaces: Vec<String> = Vec::new();
        let mut push_namespaces = |list: Vec<String>| {
            for ns in list {
                if !namespaces.contains(&ns) {
                    namespaces.push(ns);
                }
            }
        };
        if let Some(formatter) = &self.formatter {
            push_namespaces(formatter.required_namespaces());
        }
        for parameter in &method.signature.parameters {
            if let Some((policy, _)) = first_applicable(&self.bounds_checks, ctx, parameter) {
                push_namespaces(policy.required_namespaces());
            }
        }
        for policy in self.catch_blocks() {
            push_namespaces(policy.required_namespaces());
        }
        namespaces
    }

    fn method_body(&self, ctx: &MethodContext<'_>, method: &MethodDescriptor) -> MethodBody {
        let guards = method
            .signature
            .parameters
            .iter()
            .filter_map(|parameter| first_applicable(&self.bounds_checks, ctx, parameter))
            .map(|(_, text)| text)
            .collect();
        let blocks = self.catch_blocks().map(|policy| policy.generate(ctx)).collect();

        let entry = ctx.log(ctx.level, &format!("Entering {}", method.name), None);
        let exit = ctx.log(ctx.level, &format!("Exiting {}", method.name), None);
        MethodBody {
            indent: ctx.indent.to_string(),
            entry,
            guards,
            blocks,
            exit,
        }
    }

    fn compose_property(
        &self,
        renderer: &Renderer<'_>,
        property: &PropertyDescriptor,
        visibility: Option<Visibility>,
        indent: &str,
        backing_field: Option<&str>,
    ) -> String {
        let mut out = String::new();
        if let Some(doc) = &property.documentation {
            out.push_str(&renderer.documentation(indent, doc));
        }
        out.push_str(&renderer.attributes(indent, &property.attributes));
        out.push_str(indent);
        push_visibility(&mut out, visibility);
        out.push_str(&renderer.type_name(&property.type_ref));
        out.push(' ');
        out.push_str(&property.name);

        let Some(field) = backing_field else {
            let accessors = match (property.getter, property.setter) {
                (true, true) => "{ get; set; }",
                (true, false) => "{ get; }",
                _ => "{ set; }",
            };
            out.push_str(&format!(" {accessors}\n"));
            return out;
        };

        let expression = self.config.property.style == PropertyStyle::Expression;
        if expression && property.getter && !property.setter {
            out.push_str(&format!(" => {field};\n"));
            return out;
        }
        if expression {
            debug!(member = %property.name, "expression body needs a single getter, using block accessors");
        }

        let inner = format!("{indent}{}", self.config.indent_unit);
        out.push_str(&format!("\n{indent}{{\n"));
        if property.getter {
            out.push_str(&format!("{inner}get {{ return {field}; }}\n"));
        }
        if property.setter {
            out.push_str(&format!("{inner}set {{ {field} = value; }}\n"));
        }
        out.push_str(&format!("{indent}}}\n"));
        out
    }
}

/// Pre-rendered statement blocks of a method body
#[derive(Debug)]
struct MethodBody {
    indent: String,
    entry: Option<String>,
    guards: Vec<String>,
    blocks: Vec<String>,
    exit: Option<String>,
}

fn require_name(name: &str) -> Result<(), SynthError> {
    if name.trim().is_empty() {
        return Err(SynthError::invalid_argument("member name is empty"));
    }
    Ok(())
}

fn visibility_for<K: ContainerType>(
    requested: Option<Visibility>,
    member: &str,
) -> Result<Option<Visibility>, SynthError> {
    match requested {
        None if K::requires_visibility() => Err(SynthError::invalid_argument(format!(
            "{member} needs a visibility in a {}",
            K::KIND.keyword()
        ))),
        other => Ok(other),
    }
}

fn push_visibility(out: &mut String, visibility: Option<Visibility>) {
    if let Some(visibility) = visibility {
        out.push_str(visibility.keyword());
        out.push(' ');
    }
}

/// Local holding the value a method returns, if any
fn result_type(return_type: &TypeRef) -> Option<&TypeRef> {
    match return_type.async_shape() {
        AsyncShape::Value(inner) => Some(inner),
        AsyncShape::Completion => None,
        AsyncShape::NotAsync if return_type.is_void() => None,
        AsyncShape::NotAsync => Some(return_type),
    }
}

fn compose_method(
    renderer: &Renderer<'_>,
    method: &MethodDescriptor,
    visibility: Option<Visibility>,
    indent: &str,
    body: Option<&MethodBody>,
) -> String {
    let sig = &method.signature;
    let mut out = String::new();
    if let Some(doc) = &method.documentation {
        out.push_str(&renderer.documentation(indent, doc));
    }
    out.push_str(&renderer.attributes(indent, &method.attributes));

    out.push_str(indent);
    push_visibility(&mut out, visibility);
    if body.is_some() {
        if method.is_static {
            out.push_str("static ");
        }
        if !matches!(sig.return_type.async_shape(), AsyncShape::NotAsync) {
            out.push_str("async ");
        }
    }
    out.push_str(&format!(
        "{} {}{}({}){}",
        renderer.type_name(&sig.return_type),
        method.name,
        Renderer::generic_list(&sig.generic_parameters),
        renderer.parameters(&sig.parameters),
        renderer.where_clauses(&sig.generic_parameters),
    ));

    let Some(body) = body else {
        out.push_str(";\n");
        return out;
    };

    let inner = &body.indent;
    out.push_str(&format!("\n{indent}{{\n"));
    if let Some(line) = &body.entry {
        out.push_str(&format!("{inner}{line}\n"));
    }
    for guard in &body.guards {
        out.push_str(guard);
    }

    let result = result_type(&sig.return_type);
    if let Some(ty) = result {
        let init = if ty.accepts_null() { "null" } else { "default" };
        out.push_str(&format!("{inner}{} result = {init};\n", renderer.type_name(ty)));
    }

    if body.blocks.is_empty() {
        out.push_str(&format!("{inner}// {} implementation\n", method.name));
    } else {
        out.push_str(&format!("{inner}try\n{inner}{{\n{inner}}}\n"));
        for block in &body.blocks {
            out.push_str(block);
        }
    }

    if let Some(line) = &body.exit {
        out.push_str(&format!("{inner}{line}\n"));
    }
    if result.is_some() {
        out.push_str(&format!("{inner}return result;\n"));
    }
    out.push_str(&format!("{indent}}}\n"));
    out
}

fn compose_field(
    renderer: &Renderer<'_>,
    field: &FieldDescriptor,
    stored: &str,
    visibility: Option<Visibility>,
    indent: &str,
) -> String {
    let mut out = String::new();
    if let Some(summary) = &field.summary {
        out.push_str(&renderer.summary(indent, summary));
    }
    out.push_str(indent);
    push_visibility(&mut out, visibility);
    if field.is_const {
        if field.is_static || field.is_readonly {
            debug!(member = %stored, "const field ignores static and readonly");
        }
        out.push_str("const ");
    } else {
        if field.is_static {
            out.push_str("static ");
        }
        if field.is_readonly {
            out.push_str("readonly ");
        }
    }
    out.push_str(&renderer.type_name(&field.type_ref));
    out.push(' ');
    out.push_str(stored);
    if let Some(value) = &field.default_value {
        out.push_str(" = ");
        out.push_str(value);
    }
    out.push_str(";\n");
    out
}
