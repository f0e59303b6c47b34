mod common;
use common::*;

use core_state::Mode;
use pretty_assertions::assert_eq;

fn action(
    name: &'static str,
    kind: &str,
    count: Option<u32>,
    register: Option<&str>,
    keys_pressed: &[&str],
    mode: Mode,
) -> HostCall {
    HostCall::Action {
        name,
        kind: kind.to_string(),
        count,
        register: register.map(str::to_string),
        keys: keys(keys_pressed),
        mode,
    }
}

#[test]
fn counts_multiply_across_operator_and_motion() {
    let mut h = Harness::new("");
    h.type_keys("2d3w");
    assert_eq!(
        h.host.calls,
        vec![action(
            "delete",
            "motion:word_forward",
            Some(6),
            None,
            &["d"],
            Mode::Normal
        )]
    );
    assert_eq!(h.dispatcher.recorded(), &Default::default());
}

#[test]
fn repeated_operator_is_linewise() {
    let mut h = Harness::new("");
    h.type_keys("dd3yy");
    assert_eq!(
        h.host.calls,
        vec![
            action("delete", "linewise", None, None, &["d"], Mode::Normal),
            action("yank", "linewise", Some(3), None, &["y"], Mode::Normal),
        ]
    );
}

#[test]
fn zero_after_operator_is_a_motion() {
    let mut h = Harness::new("");
    h.type_keys("d0");
    assert_eq!(
        h.last_action(),
        Some(&action(
            "delete",
            "motion:line_start",
            None,
            None,
            &["d"],
            Mode::Normal
        ))
    );
    h.type_keys("10x");
    assert_eq!(
        h.last_action(),
        Some(&action(
            "delete_char",
            "action",
            Some(10),
            None,
            &["x"],
            Mode::Normal
        ))
    );
}

#[test]
fn register_prefix_attaches_to_next_command() {
    let mut h = Harness::new("");
    h.type_keys("\"add");
    assert_eq!(
        h.host.calls,
        vec![action(
            "delete",
            "linewise",
            None,
            Some("a"),
            &["d"],
            Mode::Normal
        )]
    );
    h.type_keys("p");
    assert_eq!(
        h.last_action(),
        Some(&action("put_after", "action", None, None, &["p"], Mode::Normal))
    );
}

#[test]
fn register_prefix_only_valid_first() {
    let mut h = Harness::new("");
    h.type_keys("d\"");
    assert!(h.host.calls.is_empty());
    assert_eq!(h.dispatcher.recorded(), &Default::default());
    h.type_keys("x");
    assert_eq!(h.action_names(), vec!["delete_char"]);
}

#[test]
fn conflicting_operators_cancel() {
    let mut h = Harness::new("");
    h.type_keys("dy");
    assert!(h.host.calls.is_empty());
    h.type_keys("x");
    assert_eq!(h.action_names(), vec!["delete_char"]);
}

#[test]
fn operator_followed_by_non_motion_cancels() {
    let mut h = Harness::new("");
    h.type_keys("dp");
    assert!(h.host.calls.is_empty());
    assert_eq!(h.mode(), Mode::Normal);
}

#[test]
fn change_operator_enters_insert() {
    let mut h = Harness::new("");
    h.type_keys("cw");
    assert_eq!(h.mode(), Mode::Insert);
    h.type_keys("hi");
    assert_eq!(h.inserted_text(), "hi");
}

#[test]
fn visual_operator_acts_on_selection() {
    let mut h = Harness::new("");
    h.type_keys("vjd");
    assert_eq!(h.mode(), Mode::Normal);
    assert_eq!(
        h.host.calls,
        vec![
            action("visual_char", "action", None, None, &["v"], Mode::Normal),
            action("move_down", "action", None, None, &["j"], Mode::Visual),
            action("delete", "selection", None, None, &["d"], Mode::Visual),
        ]
    );
}

#[test]
fn visual_change_enters_insert() {
    let mut h = Harness::new("");
    h.type_keys("Vc");
    assert_eq!(h.mode(), Mode::Insert);
}

#[test]
fn plugin_operator_composes_like_builtins() {
    let mut h = Harness::with_plugins("[plugins]\nreplace_with_register = true\n");
    h.type_keys("grr");
    h.type_keys("grw");
    h.type_keys("gg");
    assert_eq!(
        h.host.calls,
        vec![
            action(
                "replace_with_register",
                "linewise",
                None,
                None,
                &["g", "r"],
                Mode::Normal
            ),
            action(
                "replace_with_register",
                "motion:word_forward",
                None,
                None,
                &["g", "r"],
                Mode::Normal
            ),
            action(
                "goto_first_line",
                "action",
                None,
                None,
                &["g", "g"],
                Mode::Normal
            ),
        ]
    );
}

#[test]
fn plugin_absent_when_disabled() {
    let mut h = Harness::with_plugins("");
    h.type_keys("grx");
    // Without the plugin `gr` resolves to nothing and `x` starts fresh.
    assert_eq!(h.action_names(), vec!["delete_char"]);
}

#[test]
fn count_in_insert_mode_is_text() {
    let mut h = Harness::new("");
    h.type_keys("i12<esc>");
    assert_eq!(h.inserted_text(), "12");
    assert_eq!(h.mode(), Mode::Normal);
}

#[test]
fn commandline_keys_resolve_as_text() {
    let mut h = Harness::new("");
    h.type_keys(":w<cr>");
    assert_eq!(
        h.action_names(),
        vec!["enter_commandline", "cmdline_character", "cmdline_execute"]
    );
    assert_eq!(h.mode(), Mode::Normal);
}
