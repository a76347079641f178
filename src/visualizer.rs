use crate::{ActionPath, Result, TransitionRules, WorldState};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes a plan as a Graphviz DOT chain of world snapshots
pub struct PlanVisualizer {
    rules: TransitionRules,
}

impl PlanVisualizer {
    pub fn new() -> Self {
        Self {
            rules: TransitionRules::default(),
        }
    }

    /// Replays plans under the rules they were planned with.
    pub fn with_rules(mut self, rules: TransitionRules) -> Self {
        self.rules = rules;
        self
    }

    /// Generate a DOT file showing every state the plan passes through
    pub fn visualize_plan(
        &self,
        initial: &WorldState,
        plan: &ActionPath,
        filename: impl AsRef<Path>,
    ) -> Result<()> {
        let mut file = BufWriter::new(File::create(filename)?);
        self.write_dot(initial, plan, &mut file)?;
        file.flush()?;
        Ok(())
    }

    /// Write the DOT graph to any writer
    pub fn write_dot<W: Write>(
        &self,
        initial: &WorldState,
        plan: &ActionPath,
        out: &mut W,
    ) -> Result<()> {
        writeln!(out, "digraph Robby {{")?;
        writeln!(out, "    rankdir=LR;")?;
        writeln!(
            out,
            "    node [shape=box, style=filled, fillcolor=lightblue, fontname=monospace];"
        )?;
        writeln!(out, "    edge [fontsize=10];")?;

        writeln!(
            out,
            "    state_0 [label=\"{}\", fillcolor=lightgreen];",
            Self::state_label(initial)
        )?;

        let mut state = initial.clone();
        for (i, action) in plan.iter().enumerate() {
            match state.apply_action_with(action, self.rules) {
                Ok(next) => {
                    let fill = if next.is_solved() { "lightpink" } else { "lightblue" };
                    writeln!(
                        out,
                        "    state_{} [label=\"{}\", fillcolor={}];",
                        i + 1,
                        Self::state_label(&next),
                        fill
                    )?;
                    writeln!(out, "    state_{} -> state_{} [label=\"{}\"];", i, i + 1, action)?;
                    state = next;
                }
                Err(rejection) => {
                    // Highlight where the plan stops making sense
                    writeln!(
                        out,
                        "    rejected [label=\"{}\", fillcolor=lightcoral];",
                        rejection
                    )?;
                    writeln!(
                        out,
                        "    state_{} -> rejected [label=\"{}\", color=red, penwidth=2.0];",
                        i, action
                    )?;
                    break;
                }
            }
        }

        writeln!(out, "}}")?;
        Ok(())
    }

    /// Grid rendering plus battery, with DOT line breaks
    fn state_label(state: &WorldState) -> String {
        let grid = state.to_string().trim_end().replace('\n', "\\n");
        format!("{}\\nbattery {}/{}", grid, state.battery(), state.capacity())
    }
}

impl Default for PlanVisualizer {
    fn default() -> Self {
        Self::new()
    }
}
