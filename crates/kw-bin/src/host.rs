//! Line-oriented host: prints every resolved invocation instead of editing a
//! buffer.

use core_actions::{EditorHost, Invocation, InvocationKind};
use core_state::Mode;
use std::io::Write;

pub struct PrintingHost<W: Write> {
    out: W,
}

impl<W: Write> PrintingHost<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn note(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(self.out, "{line}")?;
        Ok(())
    }
}

/// `normal delete [d] motion=find_forward [fx] count=2 register=a`
pub fn describe(inv: &Invocation) -> String {
    let mut line = format!(
        "{} {} [{}]",
        inv.mode,
        inv.name(),
        inv.action.keys_pressed.concat()
    );
    match &inv.kind {
        InvocationKind::Action => {}
        InvocationKind::Linewise => line.push_str(" linewise"),
        InvocationKind::Selection => line.push_str(" selection"),
        InvocationKind::OperatorMotion { motion } => {
            line.push_str(&format!(
                " motion={} [{}]",
                motion.name(),
                motion.keys_pressed.concat()
            ));
        }
    }
    if let Some(count) = inv.count {
        line.push_str(&format!(" count={count}"));
    }
    if let Some(register) = &inv.register {
        line.push_str(&format!(" register={register}"));
    }
    line
}

impl<W: Write> EditorHost for PrintingHost<W> {
    fn execute_action(&mut self, invocation: &Invocation) -> anyhow::Result<Option<Mode>> {
        writeln!(self.out, "{}", describe(invocation))?;
        Ok(None)
    }

    fn execute_command(&mut self, command: &str, args: &[String]) -> anyhow::Result<()> {
        if args.is_empty() {
            writeln!(self.out, "command {command}")?;
        } else {
            writeln!(self.out, "command {command} {}", args.join(" "))?;
        }
        Ok(())
    }

    fn run_command_line(&mut self, input: &str) -> anyhow::Result<()> {
        writeln!(self.out, ":{input}")?;
        Ok(())
    }
}
