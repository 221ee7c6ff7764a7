use pretty_assertions::assert_eq;
use std::sync::Arc;
use stitch_model::{Class, MemberCategory, TypeRef};
use stitch_session::{NamespaceResolver, PlacementOptions, SessionError, UpdateSession};
use stitch_test_utils::{document, init_tracing, path, setup, FixtureMutationService, EMPTY_CLASS, ORDER_SERVICE};

const FIELD: &str = "        private int _count;\n";
const CTOR: &str = "        public Empty(int count)\n        {\n            _count = count;\n        }\n";
const METHOD: &str = "        public int Total()\n        {\n            return _count;\n        }\n";

fn open(service: Arc<FixtureMutationService>, text: &str, id: &str, container: &str) -> UpdateSession<Class> {
    UpdateSession::open(service, document(id, text), path(container), PlacementOptions::default()).unwrap()
}

#[tokio::test]
async fn test_category_order_holds_whatever_the_insertion_order() {
    let (service, doc) = setup("Empty.cs", EMPTY_CLASS);
    let mut session =
        UpdateSession::<Class>::open(service, doc, path("Acme.Orders.Empty"), PlacementOptions::default()).unwrap();

    session.add_after(MemberCategory::Methods, METHOD).await.unwrap();
    session.add_after(MemberCategory::Fields, FIELD).await.unwrap();
    session.add_after(MemberCategory::Constructors, CTOR).await.unwrap();

    let text = session.document().text();
    let field = text.find("_count;").unwrap();
    let ctor = text.find("public Empty(").unwrap();
    let method = text.find("public int Total()").unwrap();
    assert!(field < ctor && ctor < method, "{text}");
    assert_eq!(session.journal().len(), 3);
}

#[tokio::test]
async fn test_add_before_methods_lands_ahead_of_existing_method() {
    init_tracing();
    let service = Arc::new(FixtureMutationService::new());
    let mut session = open(service, ORDER_SERVICE, "OrderService.cs", "Acme.Orders.OrderService");

    session
        .add_before(MemberCategory::Methods, "        public void Start()\n        {\n        }\n\n")
        .await
        .unwrap();
    let names: Vec<String> = session
        .members(MemberCategory::Methods)
        .into_iter()
        .map(|(_, n)| n.name.clone())
        .collect();
    assert_eq!(names, vec!["Start".to_string(), "Reset".to_string()]);
}

#[tokio::test]
async fn test_integrity_failure_poisons_without_rollback() {
    init_tracing();
    let service = Arc::new(FixtureMutationService::failing_on(2));
    let mut session = open(service.clone(), EMPTY_CLASS, "Empty.cs", "Acme.Orders.Empty");

    session.add_after(MemberCategory::Fields, FIELD).await.unwrap();
    let err = session.add_after(MemberCategory::Methods, METHOD).await.unwrap_err();
    assert!(err.is_fatal());
    assert!(session.is_poisoned());

    let again = session.add_to_end(METHOD).await.unwrap_err();
    assert!(matches!(again, SessionError::Integrity { operation: "insert", .. }));
    assert_eq!(service.mutation_count(), 2);

    assert_eq!(session.journal().len(), 1);
    assert!(session.document().text().contains("_count;"));
    assert!(!session.document().text().contains("Total()"));
}

#[tokio::test]
async fn test_unparseable_result_is_an_integrity_failure() {
    let (service, doc) = setup("Empty.cs", EMPTY_CLASS);
    let mut session =
        UpdateSession::<Class>::open(service, doc, path("Acme.Orders.Empty"), PlacementOptions::default()).unwrap();

    let err = session.add_to_beginning("        }\n").await.unwrap_err();
    assert!(matches!(err, SessionError::Integrity { .. }));
    assert!(session.journal().is_empty());
}

#[tokio::test]
async fn test_namespace_resolver_imports_arguments_first() {
    let (service, doc) = setup("Empty.cs", EMPTY_CLASS);
    let mut session =
        UpdateSession::<Class>::open(service.clone(), doc, path("Acme.Orders.Empty"), PlacementOptions::default())
            .unwrap();

    let lookup = TypeRef::reference("System.Collections.Generic", "Dictionary").with_args(vec![
        TypeRef::keyword("string"),
        TypeRef::reference("Acme.Orders", "Order"),
    ]);
    let ty = TypeRef::task_of(lookup);
    NamespaceResolver::ensure_visible(&mut session, &ty).await.unwrap();

    let imports: Vec<String> = session.document().imports().map(|(_, n)| n.name.clone()).collect();
    assert_eq!(
        imports,
        vec![
            "System".to_string(),
            "System.Collections.Generic".to_string(),
            "System.Threading.Tasks".to_string(),
        ]
    );
    assert_eq!(service.mutation_count(), 2);

    NamespaceResolver::ensure_all(&mut session, [&ty, &TypeRef::generic_parameter("T")])
        .await
        .unwrap();
    assert_eq!(service.mutation_count(), 2);
    assert_eq!(session.import_table().unwrap().len(), 3);
}
