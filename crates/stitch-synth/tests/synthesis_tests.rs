use pretty_assertions::assert_eq;
use std::sync::Arc;
use stitch_model::{Class, Interface, MemberCategory, Parameter, TypeRef, Visibility};
use stitch_policy::PolicyRegistry;
use stitch_session::{PlacementOptions, UpdateSession};
use stitch_synth::{
    EventDescriptor, EventRequest, FieldDescriptor, FieldNaming, FieldRequest, MemberRequest, MemberSynthesizer, MethodDescriptor,
    MethodRequest, PropertyConfig, PropertyDescriptor, PropertyRequest, PropertyStyle, SkipReason, SynthConfig,
    SynthError, SynthOutcome,
};
use stitch_test_utils::{
    init_tracing, partial_host_with_metadata_method, path, setup, FixtureMutationService, EMPTY_CLASS, ORDER_SERVICE,
    REPOSITORY,
};

fn class_session(id: &str, text: &str, container: &str) -> (Arc<FixtureMutationService>, UpdateSession<Class>) {
    let (service, doc) = setup(id, text);
    let session = UpdateSession::open(service.clone(), doc, path(container), PlacementOptions::default()).unwrap();
    (service, session)
}

fn default_synthesizer() -> MemberSynthesizer {
    MemberSynthesizer::from_config(SynthConfig::default(), &PolicyRegistry::with_defaults()).unwrap()
}

fn process() -> MethodRequest {
    let descriptor = MethodDescriptor::new("Process", TypeRef::reference("Acme.Orders", "Order"))
        .with_parameter(Parameter::new("c", TypeRef::reference("Acme.Orders", "Customer")));
    MethodRequest::new(descriptor, Some(Visibility::Public))
}

fn position(text: &str, needle: &str) -> usize {
    text.find(needle).unwrap_or_else(|| panic!("{needle:?} not found in:\n{text}"))
}

#[tokio::test]
async fn test_guarded_method_statement_order() {
    let (_, mut session) = class_session("OrderService.cs", ORDER_SERVICE, "Acme.Orders.OrderService");
    let synth = default_synthesizer();

    let outcome = synth.synthesize_method(&mut session, &process()).await.unwrap();
    assert_eq!(outcome, SynthOutcome::Inserted);

    let text = session.document().text();
    let entry = position(text, "_logger.LogInformation(\"Entering Process\");");
    let guard = position(text, "if (c == null)");
    let throw = position(text, "throw new ArgumentNullException(nameof(c));");
    let result = position(text, "Order result = null;");
    let try_at = position(text, "try\n");
    let rethrow = position(text, "catch (ArgumentException)");
    let wrap = position(text, "catch (Exception unhandledException)");
    let exit = position(text, "_logger.LogInformation(\"Exiting Process\");");
    let ret = position(text, "return result;");
    assert!(entry < guard && guard < throw && throw < result && result < try_at);
    assert!(try_at < rethrow && rethrow < wrap && wrap < exit && exit < ret);

    let methods: Vec<String> = session
        .members(MemberCategory::Methods)
        .into_iter()
        .map(|(_, n)| n.name.clone())
        .collect();
    assert_eq!(methods, vec!["Reset".to_string(), "Process".to_string()]);
    assert!(position(text, "public Order Process(Customer c)") < position(text, "public class Line"));
}

#[tokio::test]
async fn test_existing_method_is_left_alone() {
    let (service, mut session) = class_session("OrderService.cs", ORDER_SERVICE, "Acme.Orders.OrderService");
    let synth = default_synthesizer();

    synth.synthesize_method(&mut session, &process()).await.unwrap();
    let text = session.document().text().to_string();
    let calls = service.mutation_count();
    let members = session.document().children(session.container_id()).count();

    let outcome = synth.synthesize_method(&mut session, &process()).await.unwrap();
    assert_eq!(outcome, SynthOutcome::Skipped(SkipReason::AlreadyExists));
    assert_eq!(session.document().text(), text);
    assert_eq!(service.mutation_count(), calls);
    assert_eq!(session.document().children(session.container_id()).count(), members);
}

#[tokio::test]
async fn test_replace_overwrites_in_place() {
    let (_, mut session) = class_session("OrderService.cs", ORDER_SERVICE, "Acme.Orders.OrderService");
    let synth = MemberSynthesizer::builder().build();

    let request = MethodRequest::new(MethodDescriptor::new("Reset", TypeRef::void()), Some(Visibility::Public)).replacing();
    let outcome = synth.synthesize_method(&mut session, &request).await.unwrap();
    assert_eq!(outcome, SynthOutcome::Replaced);

    let text = session.document().text();
    assert!(!text.contains("Count = 0;"));
    assert!(text.contains("        public void Reset()\n        {\n            // Reset implementation\n        }\n"));
    assert_eq!(session.members(MemberCategory::Methods).len(), 1);
    assert!(position(text, "public void Reset()") > position(text, "public event EventHandler Changed;"));
    assert!(position(text, "public void Reset()") < position(text, "public class Line"));
}

#[tokio::test]
async fn test_imports_cover_every_external_type() {
    let (_, mut session) = class_session("Empty.cs", EMPTY_CLASS, "Acme.Orders.Empty");
    let synth = default_synthesizer();

    let lookup = TypeRef::reference("System.Collections.Generic", "Dictionary")
        .with_args(vec![TypeRef::value("System", "Guid"), TypeRef::reference("Acme.Billing", "Invoice")]);
    let descriptor = MethodDescriptor::new("Index", TypeRef::task_of(lookup))
        .with_parameter(Parameter::new("customer", TypeRef::reference("Acme.Orders", "Customer")))
        .with_parameter(Parameter::new(
            "filters",
            TypeRef::reference("System.Linq.Expressions", "Expression"),
        ));
    let request = MethodRequest::new(descriptor, Some(Visibility::Public));
    synth.synthesize_method(&mut session, &request).await.unwrap();

    let table = session.import_table().unwrap();
    for namespace in [
        "System",
        "System.Collections.Generic",
        "Acme.Billing",
        "System.Linq.Expressions",
        "System.Threading.Tasks",
        "Microsoft.Extensions.Logging",
    ] {
        assert!(table.is_visible(namespace), "{namespace}");
    }
    assert!(!table.iter().any(|(ns, _)| ns == "Acme.Orders"));
    assert_eq!(session.document().imports().count(), table.len());

    let text = session.document().text();
    assert!(text.contains("public async Task<Dictionary<Guid, Invoice>> Index(Customer customer, Expression filters)"));
    assert!(text.contains("Dictionary<Guid, Invoice> result = null;"));
}

#[tokio::test]
async fn test_field_in_empty_container_lands_in_body() {
    let (_, mut session) = class_session("Empty.cs", EMPTY_CLASS, "Acme.Orders.Empty");
    let synth = default_synthesizer();

    let request = FieldRequest::new(
        FieldDescriptor::new("Count", TypeRef::keyword("int")),
        Some(Visibility::Private),
    );
    assert_eq!(
        synth.synthesize_field(&mut session, &request).await.unwrap(),
        SynthOutcome::Inserted
    );
    assert_eq!(
        session.document().text(),
        "using System;\n\nnamespace Acme.Orders\n{\n    public class Empty\n    {\n        private int _count;\n    }\n}\n"
    );
    assert_eq!(
        synth.synthesize_field(&mut session, &request).await.unwrap(),
        SynthOutcome::Skipped(SkipReason::AlreadyExists)
    );
}

#[tokio::test]
async fn test_batch_keeps_category_order() {
    let (_, mut session) = class_session("Empty.cs", EMPTY_CLASS, "Acme.Orders.Empty");
    let synth = MemberSynthesizer::builder().build();

    let requests = vec![
        MemberRequest::Method(MethodRequest::new(
            MethodDescriptor::new("Total", TypeRef::keyword("int")),
            Some(Visibility::Public),
        )),
        MemberRequest::Event(EventRequest::new(
            EventDescriptor::new("Changed", TypeRef::reference("System", "EventHandler")),
            Some(Visibility::Public),
        )),
        MemberRequest::Property(PropertyRequest::new(
            PropertyDescriptor::new("Name", TypeRef::keyword("string")),
            Some(Visibility::Public),
        )),
        MemberRequest::Field(FieldRequest::new(
            FieldDescriptor::new("Count", TypeRef::keyword("int")),
            Some(Visibility::Private),
        )),
    ];
    let outcomes = synth.synthesize_all(&mut session, &requests).await.unwrap();
    assert_eq!(outcomes, vec![SynthOutcome::Inserted; 4]);

    let text = session.document().text();
    let field = position(text, "private int _count;");
    let property = position(text, "public string Name { get; set; }");
    let event = position(text, "public event EventHandler Changed;");
    let method = position(text, "public int Total()");
    assert!(field < property && property < event && event < method, "{text}");
    assert!(text.contains("            int result = default;\n"));
    assert_eq!(session.journal().len(), 4);
}

#[tokio::test]
async fn test_expression_bodied_properties_need_a_single_getter() {
    let (_, mut session) = class_session("Empty.cs", EMPTY_CLASS, "Acme.Orders.Empty");
    let config = SynthConfig {
        property: PropertyConfig {
            style: PropertyStyle::Expression,
            backing_field: true,
        },
        ..SynthConfig::default()
    };
    let synth = MemberSynthesizer::builder().config(config).build();

    let total = PropertyRequest::new(
        PropertyDescriptor::new("Total", TypeRef::keyword("decimal")).read_only(),
        Some(Visibility::Public),
    );
    let name = PropertyRequest::new(
        PropertyDescriptor::new("Name", TypeRef::keyword("string")),
        Some(Visibility::Public),
    );
    synth.synthesize_property(&mut session, &total).await.unwrap();
    synth.synthesize_property(&mut session, &name).await.unwrap();

    assert_eq!(
        session.document().text(),
        r#"using System;

namespace Acme.Orders
{
    public class Empty
    {
        private decimal _total;
        private string _name;
        public decimal Total => _total;
        public string Name
        {
            get { return _name; }
            set { _name = value; }
        }
    }
}
"#
    );
    assert_eq!(session.members(MemberCategory::Fields).len(), 2);
    assert_eq!(session.members(MemberCategory::Properties).len(), 2);

    let again = synth.synthesize_property(&mut session, &total).await.unwrap();
    assert_eq!(again, SynthOutcome::Skipped(SkipReason::AlreadyExists));
}

#[tokio::test]
async fn test_interfaces_get_signatures_only() {
    init_tracing();
    let (service, doc) = setup("IOrderRepository.cs", REPOSITORY);
    let mut session =
        UpdateSession::<Interface>::open(service, doc, path("Acme.Orders.IOrderRepository"), PlacementOptions::default())
            .unwrap();
    let synth = default_synthesizer();

    let find = MethodDescriptor::new("Find", TypeRef::task_of(TypeRef::reference("Acme.Orders", "Order")))
        .with_parameter(Parameter::new("id", TypeRef::value("System", "Guid")));
    synth
        .synthesize_method(&mut session, &MethodRequest::new(find, None))
        .await
        .unwrap();
    synth
        .synthesize_property(
            &mut session,
            &PropertyRequest::new(PropertyDescriptor::new("Count", TypeRef::keyword("int")).read_only(), None),
        )
        .await
        .unwrap();

    let text = session.document().text();
    assert!(text.starts_with("using System;\nusing System.Threading.Tasks;\n"), "{text}");
    assert!(text.contains("        Task Save(Order order);\n        Task<Order> Find(Guid id);\n"));
    assert!(text.contains("        int Count { get; }\n"));
    assert!(!text.contains("_logger"));

    let field = FieldRequest::new(FieldDescriptor::new("Cache", TypeRef::keyword("int")), None);
    let err = synth.synthesize_field(&mut session, &field).await.unwrap_err();
    assert!(err.is_invalid_argument());
}

#[tokio::test]
async fn test_invalid_requests_change_nothing() {
    let (service, mut session) = class_session("Empty.cs", EMPTY_CLASS, "Acme.Orders.Empty");
    let synth = default_synthesizer();

    let no_visibility = MethodRequest::new(MethodDescriptor::new("Run", TypeRef::void()), None);
    assert!(synth.synthesize_method(&mut session, &no_visibility).await.unwrap_err().is_invalid_argument());

    let nameless = MethodRequest::new(MethodDescriptor::new(" ", TypeRef::void()), Some(Visibility::Public));
    assert!(synth.synthesize_method(&mut session, &nameless).await.unwrap_err().is_invalid_argument());

    let const_without_value = FieldRequest::new(
        FieldDescriptor::new("Limit", TypeRef::keyword("int")).constant(),
        Some(Visibility::Private),
    );
    let err = synth.synthesize_field(&mut session, &const_without_value).await.unwrap_err();
    assert!(matches!(err, SynthError::InvalidArgument(_)));

    assert_eq!(service.mutation_count(), 0);
    assert!(session.journal().is_empty());
}

#[tokio::test]
async fn test_integrity_failure_keeps_earlier_edits() {
    init_tracing();
    let service = Arc::new(FixtureMutationService::failing_on(2));
    let doc = stitch_test_utils::document("Empty.cs", EMPTY_CLASS);
    let mut session =
        UpdateSession::<Class>::open(service.clone(), doc, path("Acme.Orders.Empty"), PlacementOptions::default())
            .unwrap();
    let synth = MemberSynthesizer::builder().build();

    let bill = MethodDescriptor::new("Bill", TypeRef::void())
        .with_parameter(Parameter::new("invoice", TypeRef::reference("Acme.Billing", "Invoice")));
    let err = synth
        .synthesize_method(&mut session, &MethodRequest::new(bill, Some(Visibility::Public)))
        .await
        .unwrap_err();
    assert!(err.is_integrity());

    assert_eq!(session.journal().len(), 1);
    assert!(session.document().text().contains("using Acme.Billing;\n"));
    assert!(!session.document().text().contains("Bill("));

    let field = FieldRequest::new(FieldDescriptor::new("Count", TypeRef::keyword("int")), Some(Visibility::Private));
    assert!(synth.synthesize_field(&mut session, &field).await.unwrap_err().is_integrity());
    assert_eq!(service.mutation_count(), 2);
}

#[tokio::test]
async fn test_replace_leaves_members_of_other_parts_alone() {
    init_tracing();
    let service = Arc::new(FixtureMutationService::new());
    let mut session = UpdateSession::<Class>::open(
        service.clone(),
        partial_host_with_metadata_method(),
        path("Acme.Orders.Host"),
        PlacementOptions::default(),
    )
    .unwrap();
    let synth = MemberSynthesizer::builder().build();

    let request = MethodRequest::new(MethodDescriptor::new("Run", TypeRef::void()), Some(Visibility::Public)).replacing();
    let outcome = synth.synthesize_method(&mut session, &request).await.unwrap();
    assert_eq!(outcome, SynthOutcome::Skipped(SkipReason::AlreadyExists));

    assert!(session.document().text().contains("        private int _a;\n"));
    assert_eq!(service.mutation_count(), 0);
    assert!(service.calls().iter().all(|call| call.operation != "replace"));
    assert_eq!(session.members(MemberCategory::Fields).len(), 1);
}

const ALIASED_SYSTEM: &str =
    "using Sys = System;\n\nnamespace Acme.Orders\n{\n    public class Billing\n    {\n    }\n}\n";

#[tokio::test]
async fn test_policy_types_follow_alias_only_imports() {
    let (_, mut session) = class_session("Billing.cs", ALIASED_SYSTEM, "Acme.Orders.Billing");
    let synth = default_synthesizer();

    let charge = MethodDescriptor::new("Charge", TypeRef::void())
        .with_parameter(Parameter::new("id", TypeRef::value("System", "Guid")))
        .with_parameter(Parameter::new("c", TypeRef::reference("Acme.Orders", "Customer")));
    synth
        .synthesize_method(&mut session, &MethodRequest::new(charge, Some(Visibility::Public)))
        .await
        .unwrap();

    let text = session.document().text();
    assert!(text.contains("public void Charge(Sys.Guid id, Customer c)"), "{text}");
    assert!(text.contains("throw new Sys.ArgumentNullException(nameof(c));"));
    assert!(text.contains("catch (Sys.ArgumentException)"));
    assert!(text.contains("catch (Sys.Exception unhandledException)"));
    assert!(text.contains("throw new Sys.InvalidOperationException(\"Unhandled error in Charge\", unhandledException);"));
    assert!(!text.contains("using System;"));
    assert!(!text.contains("new ArgumentNullException"));
    assert!(text.contains("using Microsoft.Extensions.Logging;\n"));
}

#[tokio::test]
async fn test_backing_field_must_not_shadow_its_property() {
    let (service, mut session) = class_session("Empty.cs", EMPTY_CLASS, "Acme.Orders.Empty");
    let config = SynthConfig {
        field_naming: FieldNaming::verbatim(),
        property: PropertyConfig {
            style: PropertyStyle::Block,
            backing_field: true,
        },
        ..SynthConfig::default()
    };
    let synth = MemberSynthesizer::builder().config(config).build();

    let total = PropertyRequest::new(
        PropertyDescriptor::new("Total", TypeRef::keyword("decimal")),
        Some(Visibility::Public),
    );
    let err = synth.synthesize_property(&mut session, &total).await.unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(service.mutation_count(), 0);
    assert!(session.members(MemberCategory::Fields).is_empty());
    assert!(session.members(MemberCategory::Properties).is_empty());
}
