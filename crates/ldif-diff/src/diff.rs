//! Entry diff: compute the modify record turning one snapshot into another.
//!
//! Three passes run in a fixed order, and each attribute is handled by at
//! most one of them:
//!
//! 1. Deletions: attributes missing from `after` are deleted whole; for
//!    attributes that are multi-valued on either side, each value missing
//!    from `after` is deleted.
//! 2. Additions: attributes missing from `before` are added with all their
//!    non-empty values; for multi-valued attributes, each value missing from
//!    `before` is added.
//! 3. Replacements: attributes holding exactly one value on both sides are
//!    replaced when that value changed. The new value is always written, so
//!    changing to an empty value yields `attr:` rather than clearing it.
//!
//! Empty values are never written to an add or delete.

use std::collections::HashSet;

use tracing::{debug, warn};

use ldif_model::{AttrValLine, ChangeModifyRecord, EncodingRules, ModSpec, ModSpecSepLine, SepLine};

use crate::entry::{Attribute, Entry, Value};

/// Compute the diff between two snapshots of the same entry.
///
/// Returns `None` when the snapshots are equivalent.
pub fn compute_diff(before: &Entry, after: &Entry) -> Option<ChangeModifyRecord> {
    compute_diff_with(before, after, &EncodingRules::default())
}

/// Like [`compute_diff`], encoding text values under explicit safety rules.
pub fn compute_diff_with(
    before: &Entry,
    after: &Entry,
    rules: &EncodingRules,
) -> Option<ChangeModifyRecord> {
    if before.dn() != after.dn() {
        warn!(
            before = before.dn(),
            after = after.dn(),
            "diffing snapshots with different DNs, targeting the earlier one"
        );
    }

    let mut record = ChangeModifyRecord::create(before.dn());
    deletions(&mut record, before, after, rules);
    additions(&mut record, before, after, rules);
    replacements(&mut record, before, after, rules);
    record.finish(SepLine::create());

    if record.is_valid() {
        debug!(
            dn = before.dn(),
            mod_specs = record.mod_spec_count(),
            "computed entry diff"
        );
        Some(record)
    } else {
        debug!(dn = before.dn(), "no difference between snapshots");
        None
    }
}

fn deletions(record: &mut ChangeModifyRecord, before: &Entry, after: &Entry, rules: &EncodingRules) {
    for old_attr in before.attributes() {
        let description = old_attr.description();
        match after.attribute(description) {
            None => emit(record, ModSpec::create_delete(description)),
            Some(new_attr) if single_valued_on_both_sides(old_attr, new_attr) => {}
            Some(new_attr) => {
                let new_values = content_set(new_attr);
                for value in old_attr.values() {
                    if !value.is_empty() && !new_values.contains(value.as_bytes()) {
                        let mut spec = ModSpec::create_delete(description);
                        spec.add_attr_val(value_line(old_attr, value, rules));
                        emit(record, spec);
                    }
                }
            }
        }
    }
}

fn additions(record: &mut ChangeModifyRecord, before: &Entry, after: &Entry, rules: &EncodingRules) {
    for new_attr in after.attributes() {
        let description = new_attr.description();
        match before.attribute(description) {
            None => {
                let mut spec = ModSpec::create_add(description);
                for value in new_attr.values().iter().filter(|v| !v.is_empty()) {
                    spec.add_attr_val(value_line(new_attr, value, rules));
                }
                spec.finish(ModSpecSepLine::create());
                if spec.is_valid() {
                    debug!(attribute = description, "add whole attribute");
                    record.add_mod_spec(spec);
                } else {
                    debug!(attribute = description, "skipping new attribute without values");
                }
            }
            Some(old_attr) if single_valued_on_both_sides(old_attr, new_attr) => {}
            Some(old_attr) => {
                let old_values = content_set(old_attr);
                for value in new_attr.values() {
                    if !value.is_empty() && !old_values.contains(value.as_bytes()) {
                        let mut spec = ModSpec::create_add(description);
                        spec.add_attr_val(value_line(new_attr, value, rules));
                        emit(record, spec);
                    }
                }
            }
        }
    }
}

fn replacements(record: &mut ChangeModifyRecord, before: &Entry, after: &Entry, rules: &EncodingRules) {
    for new_attr in after.attributes() {
        let description = new_attr.description();
        let old_attr = match before.attribute(description) {
            Some(old_attr) if single_valued_on_both_sides(old_attr, new_attr) => old_attr,
            _ => continue,
        };
        let old_value = &old_attr.values()[0];
        let new_value = &new_attr.values()[0];
        if old_value.as_bytes() == new_value.as_bytes() {
            continue;
        }

        let mut spec = ModSpec::create_replace(description);
        spec.add_attr_val(value_line(new_attr, new_value, rules));
        emit(record, spec);
    }
}

fn emit(record: &mut ChangeModifyRecord, mut spec: ModSpec) {
    spec.finish(ModSpecSepLine::create());
    debug!(
        kind = %spec.kind(),
        attribute = %spec.attribute_description(),
        values = spec.attr_vals().len(),
        "emitting modification"
    );
    record.add_mod_spec(spec);
}

fn single_valued_on_both_sides(old_attr: &Attribute, new_attr: &Attribute) -> bool {
    old_attr.value_count() == 1 && new_attr.value_count() == 1
}

fn content_set(attribute: &Attribute) -> HashSet<&[u8]> {
    attribute.values().iter().map(Value::as_bytes).collect()
}

/// Build the value line for `value`; the attribute's binary flag decides
/// between text and binary payload.
fn value_line(attribute: &Attribute, value: &Value, rules: &EncodingRules) -> AttrValLine {
    let description = attribute.description();
    match value.text_value() {
        Some(text) if !attribute.is_binary() => AttrValLine::create_with(description, text, rules),
        _ => AttrValLine::create_binary(description, value.binary_value()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldif_model::{FormatParameters, LdifValue, ModSpecKind};
    use proptest::prelude::*;

    const DN: &str = "cn=Alice,ou=people,dc=example,dc=com";

    fn entry(attrs: Vec<Attribute>) -> Entry {
        Entry::new(DN, attrs).unwrap()
    }

    fn text(description: &str, values: &[&str]) -> Attribute {
        Attribute::text(description, values.iter().copied()).unwrap()
    }

    fn values_of(spec: &ModSpec) -> Vec<String> {
        spec.attr_vals()
            .iter()
            .map(|l| l.value().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn summary(record: &ChangeModifyRecord) -> Vec<(ModSpecKind, String, Vec<String>)> {
        record
            .mod_specs()
            .map(|m| (m.kind(), m.attribute_description(), values_of(m)))
            .collect()
    }

    #[test]
    fn identical_snapshots_have_no_diff() {
        let e = entry(vec![
            text("cn", &["Alice"]),
            text("mail", &["a@x", "b@x"]),
            text("objectClass", &["top", "person"]),
        ]);
        assert!(compute_diff(&e, &e).is_none());
    }

    #[test]
    fn attribute_and_value_order_is_irrelevant() {
        let before = entry(vec![text("cn", &["Alice"]), text("mail", &["a@x", "b@x"])]);
        let after = entry(vec![text("mail", &["b@x", "a@x"]), text("cn", &["Alice"])]);
        assert!(compute_diff(&before, &after).is_none());
    }

    #[test]
    fn single_value_change_is_a_replace() {
        let before = entry(vec![text("cn", &["Alice"])]);
        let after = entry(vec![text("cn", &["Bob"])]);
        let record = compute_diff(&before, &after).unwrap();
        assert_eq!(
            summary(&record),
            vec![(ModSpecKind::Replace, "cn".into(), vec!["Bob".into()])]
        );
    }

    #[test]
    fn removed_attribute_is_deleted_whole() {
        let before = entry(vec![text("cn", &["Alice"]), text("description", &["x"])]);
        let after = entry(vec![text("cn", &["Alice"])]);
        let record = compute_diff(&before, &after).unwrap();
        assert_eq!(
            summary(&record),
            vec![(ModSpecKind::Delete, "description".into(), vec![])]
        );
    }

    #[test]
    fn multi_valued_partial_change() {
        let before = entry(vec![text("mail", &["a@x", "b@x"])]);
        let after = entry(vec![text("mail", &["b@x", "c@x"])]);
        let record = compute_diff(&before, &after).unwrap();
        assert_eq!(
            summary(&record),
            vec![
                (ModSpecKind::Delete, "mail".into(), vec!["a@x".into()]),
                (ModSpecKind::Add, "mail".into(), vec!["c@x".into()]),
            ]
        );
        let text = record.serialize(&FormatParameters::default());
        assert!(!text.contains("b@x"));
    }

    #[test]
    fn single_to_multi_valued_uses_add_and_delete() {
        let before = entry(vec![text("mail", &["a@x"])]);
        let after = entry(vec![text("mail", &["b@x", "c@x"])]);
        let record = compute_diff(&before, &after).unwrap();
        assert_eq!(
            summary(&record),
            vec![
                (ModSpecKind::Delete, "mail".into(), vec!["a@x".into()]),
                (ModSpecKind::Add, "mail".into(), vec!["b@x".into()]),
                (ModSpecKind::Add, "mail".into(), vec!["c@x".into()]),
            ]
        );
    }

    #[test]
    fn new_attribute_is_added_with_all_values() {
        let before = entry(vec![text("cn", &["Alice"])]);
        let after = entry(vec![text("cn", &["Alice"]), text("mail", &["a@x", "", "b@x"])]);
        let record = compute_diff(&before, &after).unwrap();
        assert_eq!(
            summary(&record),
            vec![(
                ModSpecKind::Add,
                "mail".into(),
                vec!["a@x".into(), "b@x".into()]
            )]
        );
    }

    #[test]
    fn new_attribute_without_values_is_skipped() {
        let before = entry(vec![text("cn", &["Alice"])]);
        let after = entry(vec![
            text("cn", &["Alice"]),
            text("mail", &[]),
            text("description", &[""]),
        ]);
        assert!(compute_diff(&before, &after).is_none());
    }

    #[test]
    fn empty_values_are_never_added_or_deleted() {
        let before = entry(vec![text("mail", &["a@x", ""])]);
        let after = entry(vec![text("mail", &["a@x", "b@x", " "])]);
        let record = compute_diff(&before, &after).unwrap();
        for spec in record.mod_specs() {
            assert!(spec.attr_vals().iter().all(|l| !l.is_empty_value()));
        }
        assert_eq!(record.mod_spec_count(), 2);
    }

    #[test]
    fn empty_to_non_empty_single_value_is_a_replace() {
        let before = entry(vec![text("description", &[""])]);
        let after = entry(vec![text("description", &["now set"])]);
        let record = compute_diff(&before, &after).unwrap();
        assert_eq!(
            summary(&record),
            vec![(
                ModSpecKind::Replace,
                "description".into(),
                vec!["now set".into()]
            )]
        );
    }

    #[test]
    fn non_empty_to_empty_single_value_replaces_with_empty_value() {
        let before = entry(vec![text("description", &["was set"])]);
        let after = entry(vec![text("description", &[""])]);
        let record = compute_diff(&before, &after).unwrap();
        assert_eq!(
            summary(&record),
            vec![(ModSpecKind::Replace, "description".into(), vec!["".into()])]
        );
        assert_eq!(
            record.serialize(&FormatParameters::default()),
            format!("dn: {DN}\nchangetype: modify\nreplace: description\ndescription:\n-\n\n")
        );
    }

    #[test]
    fn passes_emit_in_fixed_order() {
        let before = entry(vec![
            text("cn", &["Alice"]),
            text("description", &["old"]),
            text("mail", &["a@x", "b@x"]),
        ]);
        let after = entry(vec![
            text("cn", &["Alicia"]),
            text("mail", &["a@x"]),
            text("telephoneNumber", &["123"]),
        ]);
        let record = compute_diff(&before, &after).unwrap();
        let kinds: Vec<_> = record
            .mod_specs()
            .map(|m| (m.kind(), m.attribute_description()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ModSpecKind::Delete, "description".to_string()),
                (ModSpecKind::Delete, "mail".to_string()),
                (ModSpecKind::Add, "telephoneNumber".to_string()),
                (ModSpecKind::Replace, "cn".to_string()),
            ]
        );
    }

    #[test]
    fn binary_attribute_values_are_encoded() {
        let before = Entry::new(DN, vec![Attribute::binary("jpegPhoto", [vec![1u8, 2, 3]]).unwrap()]).unwrap();
        let after = Entry::new(DN, vec![Attribute::binary("jpegPhoto", [vec![4u8, 5, 6]]).unwrap()]).unwrap();
        let record = compute_diff(&before, &after).unwrap();
        let spec = record.mod_specs().next().unwrap();
        assert_eq!(spec.kind(), ModSpecKind::Replace);
        let line = &spec.attr_vals()[0];
        assert!(line.is_base64());
        assert_eq!(line.value(), Some(LdifValue::Binary(vec![4, 5, 6])));
    }

    #[test]
    fn text_values_use_safety_rules() {
        let before = entry(vec![text("sn", &["Muller"])]);
        let after = entry(vec![text("sn", &["Müller"])]);
        let record = compute_diff(&before, &after).unwrap();
        assert!(record.mod_specs().next().unwrap().attr_vals()[0].is_base64());

        let long_before = entry(vec![text("description", &["short"])]);
        let long_after = entry(vec![text("description", &["rather long"])]);
        let rules = EncodingRules::with_max_plain_length(8);
        let record = compute_diff_with(&long_before, &long_after, &rules).unwrap();
        assert!(record.mod_specs().next().unwrap().attr_vals()[0].is_base64());
    }

    #[test]
    fn serialized_record_matches_ldif_grammar() {
        let before = entry(vec![text("cn", &["Alice"]), text("mail", &["a@x"])]);
        let after = entry(vec![text("cn", &["Bob"])]);
        let record = compute_diff(&before, &after).unwrap();
        assert_eq!(
            record.serialize(&FormatParameters::default()),
            "dn: cn=Alice,ou=people,dc=example,dc=com\n\
             changetype: modify\n\
             delete: mail\n\
             -\n\
             replace: cn\n\
             cn: Bob\n\
             -\n\
             \n"
        );
    }

    #[test]
    fn record_targets_before_dn() {
        let before = Entry::new("cn=old", vec![text("cn", &["a"])]).unwrap();
        let after = Entry::new("cn=new", vec![text("cn", &["b"])]).unwrap();
        let record = compute_diff(&before, &after).unwrap();
        assert_eq!(record.dn().as_deref(), Some("cn=old"));
    }

    fn arb_entry() -> impl Strategy<Value = Entry> {
        prop::collection::btree_map(
            "[a-z]{1,6}",
            prop::collection::vec("[a-z@.]{0,6}", 0..4),
            0..6,
        )
        .prop_map(|attrs| {
            let attributes = attrs
                .into_iter()
                .map(|(d, v)| Attribute::text(d, v).unwrap())
                .collect();
            Entry::new(DN, attributes).unwrap()
        })
    }

    proptest! {
        #[test]
        fn self_diff_is_empty(e in arb_entry()) {
            prop_assert!(compute_diff(&e, &e).is_none());
        }

        #[test]
        fn returned_records_are_valid(before in arb_entry(), after in arb_entry()) {
            if let Some(record) = compute_diff(&before, &after) {
                prop_assert!(record.is_valid());
                prop_assert!(record.mod_spec_count() > 0);
                prop_assert!(record.mod_specs().all(|m| m.is_valid()));
            }
        }

        #[test]
        fn replace_never_shares_attribute_with_delete_all(before in arb_entry(), after in arb_entry()) {
            if let Some(record) = compute_diff(&before, &after) {
                let replaced: Vec<String> = record
                    .mod_specs()
                    .filter(|m| m.kind() == ModSpecKind::Replace)
                    .map(|m| m.attribute_description())
                    .collect();
                for spec in record.mod_specs() {
                    if spec.kind() == ModSpecKind::Delete && spec.attr_vals().is_empty() {
                        prop_assert!(!replaced.contains(&spec.attribute_description()));
                    }
                }
            }
        }
    }
}
