//! Built-in action table.
//!
//! Registration order is the tie-break for identical patterns and also decides
//! precedence between overlapping wildcards, so specific keys (`<bs>`, `<cr>`)
//! come before the catch-all `<character>` leaves.

use crate::action::ActionDescriptor as A;
use core_state::{Mode, ModeSet as M};

/// `"x` selects register `x` for the next command; never executed itself.
pub const REGISTER_PREFIX: &str = "register_prefix";

fn motions() -> Vec<A> {
    let nv = M::NORMAL_AND_VISUAL;
    vec![
        A::new("move_left", nv).keys(["h"]).keys(["<left>"]).motion(),
        A::new("move_down", nv).keys(["j"]).keys(["<down>"]).motion(),
        A::new("move_up", nv).keys(["k"]).keys(["<up>"]).motion(),
        A::new("move_right", nv).keys(["l"]).keys(["<right>"]).motion(),
        A::new("word_forward", nv).keys(["w"]).motion(),
        A::new("word_backward", nv).keys(["b"]).motion(),
        A::new("word_end", nv).keys(["e"]).motion(),
        A::new("line_start", nv).keys(["0"]).keys(["<home>"]).motion(),
        A::new("first_non_blank", nv).keys(["^"]).motion(),
        A::new("line_end", nv).keys(["$"]).keys(["<end>"]).motion(),
        A::new("goto_first_line", nv).keys(["g", "g"]).keys(["<c-home>"]).motion(),
        A::new("goto_last_line", nv).keys(["G"]).keys(["<c-end>"]).motion(),
        A::new("match_pair", nv).keys(["%"]).motion(),
        A::new("find_forward", nv).keys(["f", "<character>"]).motion(),
        A::new("find_backward", nv).keys(["F", "<character>"]).motion(),
        A::new("till_forward", nv).keys(["t", "<character>"]).motion(),
        A::new("till_backward", nv).keys(["T", "<character>"]).motion(),
        A::new("goto_mark", nv).keys(["`", "<alpha>"]).motion(),
        A::new("half_page_down", nv).keys(["<c-d>"]).motion(),
        A::new("half_page_up", nv).keys(["<c-u>"]).motion(),
    ]
}

fn operators() -> Vec<A> {
    let nv = M::NORMAL_AND_VISUAL;
    vec![
        A::new("delete", nv).keys(["d"]).operator(),
        A::new("yank", nv).keys(["y"]).operator(),
        A::new("change", nv).keys(["c"]).operator().enters(Mode::Insert),
        A::new("indent", nv).keys([">"]).operator(),
        A::new("outdent", nv).keys(["<"]).operator(),
    ]
}

fn normal_commands() -> Vec<A> {
    let n = M::NORMAL;
    vec![
        A::new(REGISTER_PREFIX, M::NORMAL_AND_VISUAL)
            .keys(["\"", "<character>"])
            .first_key(),
        A::new("delete_char", n).keys(["x"]).keys(["<del>"]).dot(),
        A::new("delete_char_before", n).keys(["X"]).dot(),
        A::new("delete_to_line_end", n).keys(["D"]).dot(),
        A::new("change_to_line_end", n)
            .keys(["C"])
            .dot()
            .enters(Mode::Insert),
        A::new("join_lines", n).keys(["J"]).dot(),
        A::new("put_after", n).keys(["p"]).dot(),
        A::new("put_before", n).keys(["P"]).dot(),
        A::new("undo", n).keys(["u"]),
        A::new("redo", n).keys(["<c-r>"]),
        A::new("repeat_last_change", n).keys(["."]),
        A::new("replace_char", n).keys(["r", "<character>"]).dot(),
        A::new("set_mark", n).keys(["m", "<alpha>"]),
        A::new("insert_before_cursor", n)
            .keys(["i"])
            .keys(["<insert>"])
            .enters(Mode::Insert),
        A::new("insert_after_cursor", n).keys(["a"]).enters(Mode::Insert),
        A::new("insert_line_start", n).keys(["I"]).enters(Mode::Insert),
        A::new("insert_line_end", n).keys(["A"]).enters(Mode::Insert),
        A::new("open_line_below", n).keys(["o"]).enters(Mode::Insert),
        A::new("open_line_above", n).keys(["O"]).enters(Mode::Insert),
        A::new("enter_replace", n).keys(["R"]).enters(Mode::Replace),
        A::new("enter_commandline", M::NORMAL_AND_VISUAL)
            .keys([":"])
            .enters(Mode::CommandlineInProgress),
        A::new("search_forward", n)
            .keys(["/"])
            .enters(Mode::SearchInProgress),
        A::new("search_backward", n)
            .keys(["?"])
            .enters(Mode::SearchInProgress),
        A::new("cancel_pending", n).keys(["<esc>"]),
    ]
}

fn visual_commands() -> Vec<A> {
    vec![
        A::new("visual_char", M::NORMAL | M::VISUAL_LINE | M::VISUAL_BLOCK)
            .keys(["v"])
            .enters(Mode::Visual),
        A::new("visual_line", M::NORMAL | M::VISUAL | M::VISUAL_BLOCK)
            .keys(["V"])
            .enters(Mode::VisualLine),
        A::new("visual_block", M::NORMAL | M::VISUAL | M::VISUAL_LINE)
            .keys(["<c-v>"])
            .enters(Mode::VisualBlock),
        A::new("visual_exit", M::VISUAL).keys(["v"]).enters(Mode::Normal),
        A::new("visual_line_exit", M::VISUAL_LINE)
            .keys(["V"])
            .enters(Mode::Normal),
        A::new("visual_block_exit", M::VISUAL_BLOCK)
            .keys(["<c-v>"])
            .enters(Mode::Normal),
        A::new("visual_swap_ends", M::ANY_VISUAL).keys(["o"]),
    ]
}

fn text_entry() -> Vec<A> {
    let i = M::INSERT_LIKE;
    let c = M::COMMAND_LINE_LIKE;
    vec![
        A::new("leave_to_normal", M::ANY_VISUAL | i | c)
            .keys(["<esc>"])
            .keys(["<c-[>"])
            .enters(Mode::Normal),
        A::new("insert_backspace", i).keys(["<bs>"]).keys(["<shift+bs>"]),
        A::new("insert_tab", i).keys(["<tab>"]),
        A::new("insert_newline", i).keys(["<cr>"]),
        A::new("insert_delete_word", i).keys(["<c-w>"]),
        A::new("insert_register", i).keys(["<c-r>", "<character>"]),
        A::new("insert_character", i).keys(["<character>"]),
        A::new("cmdline_execute", c).keys(["<cr>"]).enters(Mode::Normal),
        A::new("cmdline_backspace", c).keys(["<bs>"]).keys(["<shift+bs>"]),
        A::new("cmdline_history_prev", c).keys(["<up>"]),
        A::new("cmdline_history_next", c).keys(["<down>"]),
        A::new("cmdline_insert_register", c).keys(["<c-r>", "<character>"]),
        A::new("cmdline_character", c).keys(["<character>"]),
    ]
}

/// Programmatic-only templates: never reachable by keystroke.
fn programmatic() -> Vec<A> {
    vec![A::new("show_partial_command", M::all())]
}

pub fn builtin_actions() -> Vec<A> {
    let mut v = Vec::new();
    v.extend(motions());
    v.extend(operators());
    v.extend(normal_commands());
    v.extend(visual_commands());
    v.extend(text_entry());
    v.extend(programmatic());
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let all = builtin_actions();
        let names: HashSet<_> = all.iter().map(|a| a.name).collect();
        assert_eq!(names.len(), all.len());
    }

    #[test]
    fn every_mode_has_an_escape_route() {
        let all = builtin_actions();
        for mode in Mode::ALL {
            let has_esc = all.iter().any(|a| {
                a.modes.admits(mode)
                    && a.keys
                        .iter()
                        .any(|k| k.len() == 1 && k[0].as_str() == "<esc>")
            });
            assert!(has_esc, "{mode} lacks <esc>");
        }
    }
}
