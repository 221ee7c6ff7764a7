//! Field name transform

use serde::{Deserialize, Serialize};

/// Derives stored field names from base names
///
/// `Order` becomes `_order` with the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNaming {
    /// Lowercase the first character
    pub camel_case: bool,
    /// Prepended after casing
    pub prefix: String,
    /// Appended after casing
    pub suffix: String,
}

impl Default for FieldNaming {
    fn default() -> Self {
        Self {
            camel_case: true,
            prefix: "_".to_string(),
            suffix: String::new(),
        }
    }
}

impl FieldNaming {
    /// Transform that leaves names untouched
    #[must_use]
    pub fn verbatim() -> Self {
        Self {
            camel_case: false,
            prefix: String::new(),
            suffix: String::new(),
        }
    }

    /// Stored field name for `base`
    #[must_use]
    pub fn apply(&self, base: &str) -> String {
        let mut out = String::with_capacity(self.prefix.len() + base.len() + self.suffix.len());
        out.push_str(&self.prefix);
        let mut chars = base.chars();
        match chars.next() {
            Some(first) if self.camel_case => {
                out.extend(first.to_lowercase());
                out.push_str(chars.as_str());
            }
            _ => out.push_str(base),
        }
        out.push_str(&self.suffix);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn order_round_trip() {
        let naming = FieldNaming::default();
        assert_eq!(naming.apply("Order"), "_order");

        let naming = FieldNaming {
            camel_case: false,
            ..FieldNaming::default()
        };
        assert_eq!(naming.apply("Order"), "_Order");

        let naming = FieldNaming {
            camel_case: true,
            ..FieldNaming::verbatim()
        };
        assert_eq!(naming.apply("Order"), "order");
        assert_eq!(FieldNaming::verbatim().apply("Order"), "Order");
    }

    #[test]
    fn suffix_and_empty_base() {
        let naming = FieldNaming {
            camel_case: true,
            prefix: "m_".into(),
            suffix: "Field".into(),
        };
        assert_eq!(naming.apply("Count"), "m_countField");
        assert_eq!(naming.apply(""), "m_Field");
    }

    proptest! {
        #[test]
        fn prop_prefix_and_suffix_wrap_the_cased_name(
            base in "[A-Za-z][A-Za-z0-9]{0,12}",
            prefix in "[_a-z]{0,3}",
            suffix in "[_A-Za-z]{0,3}",
        ) {
            let naming = FieldNaming { camel_case: true, prefix: prefix.clone(), suffix: suffix.clone() };
            let name = naming.apply(&base);
            prop_assert!(name.starts_with(&prefix));
            prop_assert!(name.ends_with(&suffix));
            let core = &name[prefix.len()..name.len() - suffix.len()];
            prop_assert_eq!(core.to_lowercase(), base.to_lowercase());
            prop_assert_eq!(&core[1..], &base[1..]);
        }
    }
}
