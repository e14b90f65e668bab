//! Property-based tests using proptest
//!
//! These tests check that name resolution picks exactly the record whose
//! name matches ignoring case, and never guesses between several.

use idmctl::scim::resolver::{name_filter, select_unique};
use idmctl::scim::{build_membership_patch, ResourceType, ScimError};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Randomly re-case an ASCII name
fn arb_recased(name: String) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), name.len()).prop_map(move |flags| {
        name.chars()
            .zip(flags)
            .map(|(c, upper)| {
                if upper {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect()
    })
}

/// A name plus a random re-casing of it
fn arb_name_and_query() -> impl Strategy<Value = (String, String)> {
    "[a-z][a-z0-9._-]{0,30}"
        .prop_flat_map(|name| (Just(name.clone()), arb_recased(name)))
}

fn user(id: usize, name: &str) -> Value {
    json!({"id": format!("u{}", id), "userName": name})
}

proptest! {
    /// The matching record is found whatever case the query uses
    #[test]
    fn unique_match_is_found_regardless_of_case(
        (name, query) in arb_name_and_query(),
        others in prop::collection::vec("[a-z][a-z0-9]{0,30}", 0..20),
        position in 0usize..20
    ) {
        let mut items: Vec<Value> = others
            .iter()
            .filter(|o| o.to_lowercase() != name.to_lowercase())
            .enumerate()
            .map(|(i, o)| user(i, o))
            .collect();
        let at = position.min(items.len());
        items.insert(at, json!({"id": "target", "userName": name}));

        let found = select_unique(&items, ResourceType::User, "userName", &query).unwrap();
        prop_assert_eq!(&found["id"], "target");
    }

    /// Two case-variants of the same name are always ambiguous
    #[test]
    fn case_variants_are_ambiguous((name, variant) in arb_name_and_query()) {
        let items = vec![user(1, &name), user(2, &variant)];
        let result = select_unique(&items, ResourceType::User, "userName", &name);
        prop_assert!(matches!(result, Err(ScimError::AmbiguousName { .. })), "expected ambiguous name error");
    }

    /// No case-insensitive match is NotFound
    #[test]
    fn missing_name_is_not_found(
        names in prop::collection::vec("[a-z]{1,10}", 0..20),
        query in "[0-9]{1,10}"
    ) {
        let items: Vec<Value> = names.iter().enumerate().map(|(i, n)| user(i, n)).collect();
        let result = select_unique(&items, ResourceType::User, "userName", &query);
        prop_assert!(matches!(result, Err(ScimError::NotFound { .. })), "expected not found error");
    }

    /// The filter always wraps the value in quotes after `eq`
    #[test]
    fn name_filter_shape(attr in "[a-zA-Z]{1,12}", value in "[a-zA-Z0-9 ]{0,20}") {
        let filter = name_filter(&attr, &value);
        prop_assert_eq!(filter, format!("{} eq \"{}\"", attr, value));
    }

    /// Membership patches carry exactly one member
    #[test]
    fn membership_patch_has_one_member(id in "[a-z0-9-]{1,36}", remove in any::<bool>()) {
        let patch = build_membership_patch(&id, remove);
        prop_assert_eq!(patch.members.len(), 1);
        prop_assert_eq!(&patch.members[0].value, &id);
        prop_assert_eq!(patch.members[0].operation.is_some(), remove);
    }
}
