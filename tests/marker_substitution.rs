// tests/marker_substitution.rs

use proptest::prelude::*;

use gcmd::config::Job;
use gcmd::exec::NodeInvocation;
use gcmd::marker::{DEFAULT_MARKER, replace_marker, template_uses_marker};

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn hello_template_for_node_a() {
    let template = args(&["hello", "__NODE__", "__NODE__-x"]);
    assert_eq!(
        replace_marker(&template, DEFAULT_MARKER, "a"),
        args(&["hello", "a", "a-x"])
    );
    assert!(template_uses_marker(&template, DEFAULT_MARKER));
}

#[test]
fn every_occurrence_in_every_argument_is_replaced() {
    let template = args(&["-h", "__NODE__", "log-__NODE__-__NODE__.txt", "plain"]);
    let resolved = replace_marker(&template, DEFAULT_MARKER, "web1");

    assert_eq!(resolved, args(&["-h", "web1", "log-web1-web1.txt", "plain"]));
}

#[test]
fn template_without_marker_is_copied() {
    let template = args(&["uptime", "-p"]);
    assert_eq!(replace_marker(&template, DEFAULT_MARKER, "x"), template);
    assert!(!template_uses_marker(&template, DEFAULT_MARKER));
}

#[test]
fn matching_is_literal_and_case_sensitive() {
    let template = args(&["__node__", "__NODE_", "_NODE__", "[__NODE__]"]);
    let resolved = replace_marker(&template, DEFAULT_MARKER, "n");

    assert_eq!(resolved, args(&["__node__", "__NODE_", "_NODE__", "[n]"]));
}

#[test]
fn node_containing_the_marker_is_not_expanded_again() {
    let template = args(&["__NODE__"]);
    assert_eq!(
        replace_marker(&template, DEFAULT_MARKER, "a__NODE__b"),
        args(&["a__NODE__b"])
    );
}

#[test]
fn empty_marker_leaves_template_alone() {
    let template = args(&["a", ""]);
    assert_eq!(replace_marker(&template, "", "n"), template);
    assert!(!template_uses_marker(&template, ""));
}

#[test]
fn invocation_resolves_its_own_arguments() {
    let job = Job::new("ssh", ["{}", "hostname"], ["db1", "db2"]).with_marker("{}");

    let first = NodeInvocation::new(0, "db1".to_string(), &job);
    let second = NodeInvocation::new(1, "db2".to_string(), &job);

    assert_eq!(first.args(), args(&["db1", "hostname"]).as_slice());
    assert_eq!(second.args(), args(&["db2", "hostname"]).as_slice());
    assert_eq!(second.index(), 1);
    // The template itself is untouched.
    assert_eq!(job.args, args(&["{}", "hostname"]));
}

proptest! {
    #[test]
    fn marker_never_survives_substitution(
        parts in proptest::collection::vec("[a-z/ .-]{0,8}", 1..6),
        node in "[a-z0-9.-]{1,12}",
    ) {
        let template: Vec<String> = parts.iter().map(|p| format!("{p}__NODE__{p}")).collect();
        let resolved = replace_marker(&template, DEFAULT_MARKER, &node);

        prop_assert_eq!(resolved.len(), template.len());
        for (out, part) in resolved.iter().zip(&parts) {
            prop_assert!(!out.contains(DEFAULT_MARKER));
            prop_assert_eq!(out, &format!("{part}{node}{part}"));
        }
    }

    #[test]
    fn arguments_without_marker_are_unchanged(
        template in proptest::collection::vec("[a-z0-9 ]{0,10}", 0..6),
        node in "[a-z]{1,6}",
    ) {
        prop_assert_eq!(replace_marker(&template, DEFAULT_MARKER, &node), template);
    }
}
