use proptest::prelude::*;
use stitch_model::{Anchor, MemberCategory, SourceDocument};
use stitch_session::{InsertionPointResolver, PlacementOptions};
use stitch_test_utils::{document, path};

/// One member line per category, indexed like `MemberCategory::CHAIN[1..]`
fn member_line(category: MemberCategory, i: usize) -> String {
    match category {
        MemberCategory::Fields => format!("        private int _f{i};\n"),
        MemberCategory::Constructors => format!("        public Subject(int a{i}) {{ }}\n"),
        MemberCategory::Properties => format!("        public int P{i} {{ get; set; }}\n"),
        MemberCategory::Events => format!("        public event EventHandler E{i};\n"),
        MemberCategory::Methods => format!("        public void M{i}() {{ }}\n"),
        MemberCategory::NestedEnums => format!("        public enum NE{i} {{ A }}\n"),
        MemberCategory::NestedInterfaces => format!("        public interface NI{i} {{ }}\n"),
        MemberCategory::NestedStructures => format!("        public struct NS{i} {{ }}\n"),
        MemberCategory::NestedClasses => format!("        public class NC{i} {{ }}\n"),
        MemberCategory::Imports => String::new(),
    }
}

fn subject(counts: &[usize]) -> SourceDocument {
    let mut text = String::from("namespace Acme\n{\n    public class Subject\n    {\n");
    for (category, &count) in MemberCategory::CHAIN[1..].iter().zip(counts) {
        for i in 0..count {
            text.push_str(&member_line(*category, i));
        }
    }
    text.push_str("    }\n}\n");
    document("Subject.cs", &text)
}

#[test]
fn test_every_category_parses_from_member_lines() {
    let doc = subject(&[1; 9]);
    let id = doc.resolve(&path("Acme.Subject")).unwrap();
    for category in &MemberCategory::CHAIN[1..] {
        assert_eq!(doc.members_in(id, *category).len(), 1, "{category}");
    }
}

#[test]
fn test_properties_after_constructors_when_no_properties_or_events() {
    let doc = subject(&[0, 2, 0, 0, 1, 0, 0, 0, 0]);
    let id = doc.resolve(&path("Acme.Subject")).unwrap();
    let r = InsertionPointResolver::new(&doc, id, PlacementOptions::default());
    let last_ctor = doc.members_in(id, MemberCategory::Constructors)[1].0;

    assert_eq!(r.resolve_after(MemberCategory::Properties), Anchor::After(last_ctor));
    assert_eq!(r.resolve_after(MemberCategory::Events), Anchor::After(last_ctor));
    assert_eq!(r.resolve_before(MemberCategory::Properties), Anchor::After(last_ctor));
}

proptest! {
    #[test]
    fn prop_empty_category_matches_previous_category(counts in prop::collection::vec(0usize..3, 9)) {
        let doc = subject(&counts);
        let id = doc.resolve(&path("Acme.Subject")).unwrap();
        let r = InsertionPointResolver::new(&doc, id, PlacementOptions::default());

        for (i, category) in MemberCategory::CHAIN[1..].iter().enumerate() {
            let members = doc.members_in(id, *category);
            prop_assert_eq!(members.len(), counts[i]);

            match (members.first(), members.last(), category.previous()) {
                (Some((first, _)), Some((last, _)), _) => {
                    prop_assert_eq!(r.resolve_before(*category), Anchor::Before(*first));
                    prop_assert_eq!(r.resolve_after(*category), Anchor::After(*last));
                }
                (None, _, Some(MemberCategory::Imports)) => {
                    prop_assert_eq!(r.resolve_after(*category), Anchor::ContainerStart(id));
                }
                (None, _, Some(previous)) => {
                    prop_assert_eq!(r.resolve_after(*category), r.resolve_after(previous));
                    prop_assert_eq!(r.resolve_before(*category), r.resolve_after(previous));
                }
                (None, _, None) => unreachable!("only imports have no previous category"),
                (Some(_), None, _) => unreachable!("a non-empty slice has a last element"),
            }
        }
    }

    #[test]
    fn prop_resolution_is_deterministic(counts in prop::collection::vec(0usize..3, 9)) {
        let first = subject(&counts);
        let second = subject(&counts);
        let a = first.resolve(&path("Acme.Subject")).unwrap();
        let b = second.resolve(&path("Acme.Subject")).unwrap();
        let ra = InsertionPointResolver::new(&first, a, PlacementOptions::default());
        let rb = InsertionPointResolver::new(&second, b, PlacementOptions::default());
        for category in MemberCategory::CHAIN {
            prop_assert_eq!(ra.resolve_after(category), rb.resolve_after(category));
            prop_assert_eq!(ra.resolve_before(category), rb.resolve_before(category));
        }
    }
}
