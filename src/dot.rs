//! Circuit to DOT (Graphviz) conversion.
//!
//! # DOT Format
//!
//! The generated DOT output follows these conventions:
//! - **Gates** are rendered with the configured gate shape, labelled `NOR`
//! - **Inputs** are rendered at the bottom (sink rank), labelled `x1`, `x2`, ...
//! - **Edges** go from each gate to its two children
//! - The **output** is a separate node at the top (source rank) pointing to the root
//!
//! Every node is named after the encoding id it was decoded from, so the
//! drawing can be matched against the raw `(id, kind, left, right)` rows.
//!
//! # Examples
//!
//! ```
//! use nor_synth::circuit::Circuit;
//! use nor_synth::encoding::Encoding;
//!
//! let encoding = Encoding::from_rows(2, 1, &[(1, -1, 2, 3), (2, 1, 0, 0), (3, 2, 0, 0)]).unwrap();
//! let circuit = Circuit::decode(&encoding).unwrap();
//!
//! let dot = circuit.to_dot().unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::fmt::Write as _;

use crate::circuit::{Circuit, Idx, Node};

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for gate nodes (default: "invtriangle")
    pub gate_shape: &'static str,
    /// Shape for input leaves (default: "circle")
    pub input_shape: &'static str,
    /// Shape for the output node (default: "rect")
    pub output_shape: &'static str,
    /// Whether to use HTML labels for subscripts (default: true)
    pub use_html_labels: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            gate_shape: "invtriangle",
            input_shape: "circle",
            output_shape: "rect",
            use_html_labels: true,
        }
    }
}

impl Circuit {
    /// Converts the circuit to DOT format with the default configuration.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the circuit to DOT format.
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "rankdir=TB;")?;

        let mut inputs = Vec::new();
        for i in 0..self.len() {
            let idx = Idx::from(i);
            let id = self.source_id(idx);
            match self.node(idx) {
                Node::Nor(l, r) => {
                    writeln!(dot, "n{} [shape={}, label=\"NOR\"];", id, config.gate_shape)?;
                    writeln!(dot, "n{} -> n{};", id, self.source_id(l))?;
                    writeln!(dot, "n{} -> n{};", id, self.source_id(r))?;
                }
                Node::Input(k) => inputs.push((id, k)),
            }
        }

        // Inputs share the bottom rank
        writeln!(dot, "{{ rank=sink")?;
        for (id, k) in inputs {
            let label = if config.use_html_labels {
                format!("<x<SUB>{}</SUB>>", k)
            } else {
                format!("\"x{}\"", k)
            };
            writeln!(dot, "n{} [shape={}, label={}];", id, config.input_shape, label)?;
        }
        writeln!(dot, "}}")?;

        writeln!(dot, "{{ rank=source")?;
        writeln!(dot, "out [shape={}, label=\"out\"];", config.output_shape)?;
        writeln!(dot, "}}")?;
        writeln!(dot, "out -> n{};", self.source_id(self.root()))?;

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
