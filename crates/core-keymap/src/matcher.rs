//! Wildcard-aware key sequence comparison.
//!
//! Stateless apart from the configured leader key. Positions are compared
//! independently and either side may carry the wildcard, so
//! `matches(p, t) == matches(t, p)` for sequences of equal length.

use crate::token::{KeyPattern, KeyView, Token, Wildcard};
use tracing::trace;

/// Control keys never satisfy `<character>`. Any bracketed name counts except
/// these three, which behave like typed characters.
const CHARACTER_LIKE_NAMED: [&str; 3] = ["<bs>", "<shift+bs>", "<tab>"];

pub fn is_control_key(key: &str) -> bool {
    if !key.starts_with('<') || key.len() <= 1 {
        return false;
    }
    !CHARACTER_LIKE_NAMED
        .iter()
        .any(|named| named.eq_ignore_ascii_case(key))
}

fn is_single_digit(key: &str) -> bool {
    key.len() == 1 && key.as_bytes()[0].is_ascii_digit()
}

fn is_single_alpha(key: &str) -> bool {
    key.len() == 1 && key.as_bytes()[0].is_ascii_alphabetic()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMatcher {
    leader: String,
}

impl Default for KeyMatcher {
    fn default() -> Self {
        Self::new("\\")
    }
}

impl KeyMatcher {
    pub fn new(leader: impl Into<String>) -> Self {
        Self {
            leader: leader.into(),
        }
    }

    pub fn leader(&self) -> &str {
        &self.leader
    }

    pub fn set_leader(&mut self, leader: impl Into<String>) {
        self.leader = leader.into();
    }

    /// Compare one position. Rule order matters: `<character>` is checked
    /// before the leader exclusion, so `<character>` accepts the leader key.
    pub fn keys_match(&self, left: KeyView<'_>, right: KeyView<'_>) -> bool {
        let one_side = |wild: Wildcard, pred: &dyn Fn(&str) -> bool| {
            (left.wildcard == Some(wild) && pred(right.text))
                || (right.wildcard == Some(wild) && pred(left.text))
        };

        if left.wildcard == Some(Wildcard::Any) || right.wildcard == Some(Wildcard::Any) {
            return true;
        }
        if one_side(Wildcard::Number, &is_single_digit) {
            return true;
        }
        if one_side(Wildcard::Alpha, &is_single_alpha) {
            return true;
        }
        if one_side(Wildcard::Character, &|k| !is_control_key(k)) {
            return true;
        }
        if one_side(Wildcard::Leader, &|k| k == self.leader) {
            return true;
        }
        // Once configured, the leader is not an ordinary literal.
        if left.text == self.leader || right.text == self.leader {
            return false;
        }
        left.text == right.text
    }

    /// Exact comparison of one pattern against typed keys.
    pub fn matches<S: AsRef<str>>(&self, pattern: &[Token], typed: &[S]) -> bool {
        pattern.len() == typed.len()
            && pattern
                .iter()
                .zip(typed)
                .all(|(p, t)| self.keys_match(p.view(), KeyView::of(t.as_ref())))
    }

    /// Succeeds when any alternative matches exactly.
    pub fn matches_any<S: AsRef<str>>(&self, alternatives: &[KeyPattern], typed: &[S]) -> bool {
        alternatives.iter().any(|alt| self.matches(alt, typed))
    }

    /// "Could this still complete": every alternative is truncated to the
    /// typed length before comparing.
    pub fn matches_prefix<S: AsRef<str>>(&self, alternatives: &[KeyPattern], typed: &[S]) -> bool {
        alternatives.iter().any(|alt| {
            let cut = alt.len().min(typed.len());
            self.matches(&alt[..cut], typed)
        })
    }

    /// Plain key-name sequences on both sides (used for symmetry checks and by
    /// callers holding two typed sequences).
    pub fn sequences_match<A: AsRef<str>, B: AsRef<str>>(&self, left: &[A], right: &[B]) -> bool {
        let ok = left.len() == right.len()
            && left
                .iter()
                .zip(right)
                .all(|(l, r)| self.keys_match(KeyView::of(l.as_ref()), KeyView::of(r.as_ref())));
        trace!(target: "input.registry", len = left.len(), ok, "sequence_compare");
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::pattern;
    use proptest::prelude::*;

    fn m() -> KeyMatcher {
        KeyMatcher::new("\\")
    }

    #[test]
    fn exact_literals() {
        assert!(m().matches(&pattern(["g", "g"]), &["g", "g"]));
        assert!(!m().matches(&pattern(["g", "g"]), &["g", "j"]));
        assert!(!m().matches(&pattern(["g", "g"]), &["g"]));
    }

    #[test]
    fn number_and_alpha_wildcards() {
        assert!(m().matches(&pattern(["<number>"]), &["7"]));
        assert!(!m().matches(&pattern(["<number>"]), &["a"]));
        assert!(!m().matches(&pattern(["<number>"]), &["12"]));
        assert!(m().matches(&pattern(["m", "<alpha>"]), &["m", "Q"]));
        assert!(!m().matches(&pattern(["m", "<alpha>"]), &["m", "1"]));
    }

    #[test]
    fn character_rejects_control_keys_except_three() {
        let p = pattern(["<character>"]);
        assert!(m().matches(&p, &["x"]));
        assert!(m().matches(&p, &["<"]));
        assert!(m().matches(&p, &["<bs>"]));
        assert!(m().matches(&p, &["<BS>"]));
        assert!(m().matches(&p, &["<shift+bs>"]));
        assert!(m().matches(&p, &["<tab>"]));
        assert!(!m().matches(&p, &["<esc>"]));
        assert!(!m().matches(&p, &["<c-r>"]));
        assert!(!m().matches(&p, &["<cr>"]));
    }

    #[test]
    fn leader_is_not_a_plain_literal() {
        let matcher = KeyMatcher::new(",");
        assert!(matcher.matches(&pattern(["<leader>", "w"]), &[",", "w"]));
        assert!(!matcher.matches(&pattern([",", "w"]), &[",", "w"]));
        assert!(!matcher.matches(&pattern(["<leader>"]), &["\\"]));
        // <character> is checked first and still accepts the leader.
        assert!(matcher.matches(&pattern(["<character>"]), &[","]));
    }

    #[test]
    fn any_matches_control_keys() {
        assert!(m().matches(&pattern(["<any>"]), &["<esc>"]));
    }

    #[test]
    fn alternatives_and_prefix() {
        let alts = vec![pattern(["g", "g"]), pattern(["<c-home>"])];
        assert!(m().matches_any(&alts, &["<c-home>"]));
        assert!(m().matches_prefix(&alts, &["g"]));
        assert!(!m().matches_any(&alts, &["g"]));
        assert!(!m().matches_prefix(&alts, &["g", "g", "g"]));
        let empty: [&str; 0] = [];
        assert!(m().matches_prefix(&alts, &empty));
    }

    fn key_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z0-9]".prop_map(|s| s),
            Just("\\".to_string()),
            Just("<esc>".to_string()),
            Just("<bs>".to_string()),
            Just("<tab>".to_string()),
            Just("<c-r>".to_string()),
            Just("<any>".to_string()),
            Just("<number>".to_string()),
            Just("<alpha>".to_string()),
            Just("<character>".to_string()),
            Just("<leader>".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn comparison_is_symmetric(
            pairs in proptest::collection::vec((key_strategy(), key_strategy()), 0..6)
        ) {
            let (left, right): (Vec<String>, Vec<String>) = pairs.into_iter().unzip();
            let matcher = m();
            prop_assert_eq!(
                matcher.sequences_match(&left, &right),
                matcher.sequences_match(&right, &left)
            );
        }

        #[test]
        fn character_never_matches_bracketed_names(name in "[a-z][a-z0-9+-]{1,6}") {
            let key = format!("<{name}>");
            prop_assume!(!["bs", "shift+bs", "tab"].contains(&name.as_str()));
            prop_assume!(Wildcard::classify(&key).is_none());
            prop_assert!(!m().matches(&pattern(["<character>"]), &[key.as_str()]));
        }

        #[test]
        fn full_match_implies_every_prefix_could_match(
            keys in proptest::collection::vec("[a-z0-9]", 1..5)
        ) {
            let alts = vec![pattern(keys.iter())];
            let matcher = m();
            prop_assert!(matcher.matches_any(&alts, &keys));
            for cut in 0..=keys.len() {
                prop_assert!(matcher.matches_prefix(&alts, &keys[..cut]));
            }
        }
    }
}
