//! `gr{motion}` replaces the covered text with a register's contents.
//!
//! `grr` (operator repeated) is the linewise form and `gr` in Visual mode
//! replaces the selection; both come out of the dispatcher's operator
//! composition, so one operator descriptor is all this plugin registers.

use crate::Plugin;
use core_keymap::ActionDescriptor;
use core_state::ModeSet;

pub struct ReplaceWithRegister;

impl ReplaceWithRegister {
    pub const ACTION: &'static str = "replace_with_register";
}

impl Plugin for ReplaceWithRegister {
    fn name(&self) -> &'static str {
        "replace-with-register"
    }

    fn actions(&self) -> Vec<ActionDescriptor> {
        vec![ActionDescriptor::new(Self::ACTION, ModeSet::NORMAL_AND_VISUAL)
            .keys(["g", "r"])
            .operator()]
    }
}
