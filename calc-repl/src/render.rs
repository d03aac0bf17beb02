use calc_history::{backend::Cas, Calculator, Node};
use std::fmt::Write;

/// Describes a single entry, as in `a1 (width): \mathrm{a0} + 2 = 3`.
pub fn describe(calc: &Calculator<Cas>, node: &Node<Cas>) -> String {
    let mut out = node.id().to_string();
    if let Some(alias) = node.alias() {
        let _ = write!(out, " ({})", alias);
    }
    let _ = write!(out, ": {}", node.equation());
    if let Some(value) = node.value() {
        let _ = write!(out, " = {}", calc.format(value));
    }
    if let Some(note) = node.note() {
        let _ = write!(out, "  # {}", note);
    }
    out
}

fn render_node(calc: &Calculator<Cas>, id: &str, depth: usize, out: &mut String) {
    let Some(node) = calc.tree().get(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let _ = writeln!(out, "{}{}", indent, describe(calc, node));

    if node.collapsed() && !node.dependents().is_empty() {
        let hidden = calc.tree().descendants(id).len();
        let _ = writeln!(out, "{}  ... {} hidden", indent, hidden);
        return;
    }
    for dependent in node.dependents() {
        render_node(calc, dependent.as_str(), depth + 1, out);
    }
}

/// Renders the history as a forest. Entries with several dependencies appear under each of them.
pub fn render_tree(calc: &Calculator<Cas>) -> String {
    let mut out = String::new();
    for root in calc.tree().roots() {
        render_node(calc, root.as_str(), 0, &mut out);
    }
    if out.is_empty() {
        out.push_str("(empty)\n");
    }
    out
}
