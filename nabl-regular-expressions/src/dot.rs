use crate::Automaton;
use std::fmt::{Debug, Display};
use std::io;
use std::io::Write;

impl<S: Debug + Display> Automaton<S> {
    /// Writes this automaton as a graphviz digraph.
    ///
    /// Accepting states are drawn as double circles, stuck states are grey.
    pub fn output_dot(&self, w: &mut impl Write) -> io::Result<()> {
        writeln!(w, "digraph {{")?;

        for (src, state) in self.states.iter().enumerate() {
            let mut attrs = String::new();
            if state.is_accepting() {
                attrs.push_str(", shape=doublecircle");
            }
            if state.is_stuck() {
                attrs.push_str(", color=grey");
            }
            if src == self.initial {
                attrs.push_str(", style=bold");
            }
            let label = format!("{}", state.regex).replace('"', "\\\"");
            writeln!(w, "node[label=\"{label}\"{attrs}] id{src}")?;

            for (sym, tgt) in self.alphabet.iter().zip(&state.transition_table) {
                writeln!(w, "id{src} -> id{tgt} [label=\"{sym}\"]")?;
            }
        }

        writeln!(w, "}}")?;

        Ok(())
    }
}
