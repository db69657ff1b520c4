//! Property-based tests for collection details validation and templating.
//!
//! These tests use proptest to generate random metadata documents and
//! arguments and verify that invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeMap;

    use crate::collection::{CollectionDetails, Violation};
    use crate::template::{render, TemplateContext};
    use proptest::prelude::*;
    use serde_yaml::{Mapping, Value};

    fn identifier() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,15}"
    }

    fn build(namespace: Value, name: Value, deps: Option<Value>) -> Mapping {
        let mut data = Mapping::new();
        data.insert(Value::from("namespace"), namespace);
        data.insert(Value::from("name"), name);
        if let Some(deps) = deps {
            data.insert(Value::from("dependencies"), deps);
        }
        data
    }

    // ============================================================================
    // CollectionDetails::from_mapping property tests
    // ============================================================================

    proptest! {
        /// Property: valid documents load and reproduce their fields exactly
        #[test]
        fn valid_documents_round_trip(
            namespace in identifier(),
            name in identifier(),
            deps in proptest::option::of(
                proptest::collection::btree_map(identifier(), "[<>=0-9. ,*]{0,12}", 0..5)
            ),
        ) {
            let deps_value = deps.as_ref().map(|deps| {
                let mut mapping = Mapping::new();
                for (k, v) in deps {
                    mapping.insert(Value::from(k.as_str()), Value::from(v.as_str()));
                }
                Value::Mapping(mapping)
            });
            let data = build(Value::from(namespace.as_str()), Value::from(name.as_str()), deps_value);

            let details = CollectionDetails::from_mapping(&data).unwrap();
            prop_assert_eq!(details.namespace, namespace);
            prop_assert_eq!(details.name, name);
            prop_assert_eq!(details.dependencies, deps.unwrap_or_default());
        }

        /// Property: a non-string namespace is always reported against namespace
        #[test]
        fn non_string_namespace_is_rejected(value in any::<i64>(), name in identifier()) {
            let data = build(Value::from(value), Value::from(name.as_str()), None);

            let err = CollectionDetails::from_mapping(&data).unwrap_err();
            prop_assert_eq!(err.field, "namespace");
            prop_assert!(
                matches!(err.violation, Violation::WrongType { expected: "string", .. }),
                "unexpected violation"
            );
        }

        /// Property: a non-string dependency value names the dependency
        #[test]
        fn non_string_dependency_value_is_rejected(key in identifier(), value in any::<bool>()) {
            let mut deps = Mapping::new();
            deps.insert(Value::from(key.as_str()), Value::from(value));
            let data = build(Value::from("ns"), Value::from("col"), Some(Value::Mapping(deps)));

            let err = CollectionDetails::from_mapping(&data).unwrap_err();
            prop_assert_eq!(err.field, "dependencies");
            prop_assert_eq!(
                err.to_string(),
                format!("dependencies.{} value {} is not a string", key, value)
            );
        }
    }

    // ============================================================================
    // render property tests
    // ============================================================================

    proptest! {
        /// Property: text without braces renders unchanged
        #[test]
        fn brace_free_text_is_unchanged(input in "[^{}]*") {
            let details = CollectionDetails {
                namespace: "ns".to_string(),
                name: "col".to_string(),
                dependencies: BTreeMap::new(),
            };
            let context = TemplateContext::new("/work", "/tmp/r", "/tmp/r/ansible_collections/ns/col", &details);
            prop_assert_eq!(render(&input, &context).unwrap(), input);
        }

        /// Property: doubling every brace yields the original text
        #[test]
        fn escaped_braces_render_literally(input in ".*") {
            let details = CollectionDetails {
                namespace: "ns".to_string(),
                name: "col".to_string(),
                dependencies: BTreeMap::new(),
            };
            let context = TemplateContext::new("/work", "/tmp/r", "/tmp/r/ansible_collections/ns/col", &details);
            let escaped = input.replace('{', "{{").replace('}', "}}");
            prop_assert_eq!(render(&escaped, &context).unwrap(), input);
        }
    }
}
