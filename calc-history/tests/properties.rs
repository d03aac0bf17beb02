//! Property tests for evaluation and for the structural invariants of the tree.

use calc_compute::Formula;
use calc_history::backend::{Backend, Cas};
use calc_history::{Calculator, NodeId, Tree};
use proptest::prelude::*;
use std::collections::HashSet;

// ── Helpers ──────────────────────────────────────────────────────────

fn evaluate(source: &str) -> f64 {
    let cas = Cas::default();
    let value = cas.evaluate(&cas.parse(source));
    cas.as_number(&value).unwrap_or(f64::NAN)
}

fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(1.0)
}

fn finite() -> impl Strategy<Value = f64> {
    -1e6f64..1e6
}

#[derive(Debug, Clone)]
enum Op {
    Add(Vec<usize>),
    Delete(usize),
    Link(usize, usize),
    Unlink(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => proptest::collection::vec(0usize..16, 0..3).prop_map(Op::Add),
        1 => (0usize..16).prop_map(Op::Delete),
        2 => (0usize..16, 0usize..16).prop_map(|(a, b)| Op::Link(a, b)),
        1 => (0usize..16, 0usize..16).prop_map(|(a, b)| Op::Unlink(a, b)),
    ]
}

fn live(tree: &Tree<Cas>) -> Vec<NodeId> {
    tree.nodes().map(|node| node.id().clone()).collect()
}

fn pick(ids: &[NodeId], index: usize) -> Option<&NodeId> {
    (!ids.is_empty()).then(|| &ids[index % ids.len()])
}

/// Applies an operation, returning the identifier of a created node.
fn apply(tree: &mut Tree<Cas>, op: &Op) -> Option<NodeId> {
    let ids = live(tree);
    match op {
        Op::Add(indices) => {
            let dependencies = indices
                .iter()
                .filter_map(|index| pick(&ids, *index).cloned())
                .collect::<Vec<_>>();
            tree.add_node("1", Formula::parse("1"), &dependencies).ok()
        },
        Op::Delete(index) => {
            if let Some(id) = pick(&ids, *index) {
                tree.delete_node(id.as_str());
            }
            None
        },
        Op::Link(a, b) => {
            if let (Some(a), Some(b)) = (pick(&ids, *a), pick(&ids, *b)) {
                let _ = tree.add_dependency(a.as_str(), b.as_str());
            }
            None
        },
        Op::Unlink(a, b) => {
            if let (Some(a), Some(b)) = (pick(&ids, *a), pick(&ids, *b)) {
                let _ = tree.remove_dependency(a.as_str(), b.as_str());
            }
            None
        },
    }
}

fn check_invariants(tree: &Tree<Cas>) -> Result<(), TestCaseError> {
    for node in tree.nodes() {
        for dependency in node.dependencies() {
            let other = tree.get(dependency.as_str());
            prop_assert!(other.is_some(), "dangling dependency {} of {}", dependency, node.id());
            prop_assert!(other.is_some_and(|other| other.dependents().contains(node.id())));
        }
        for dependent in node.dependents() {
            let other = tree.get(dependent.as_str());
            prop_assert!(other.is_some(), "dangling dependent {} of {}", dependent, node.id());
            prop_assert!(other.is_some_and(|other| other.dependencies().contains(node.id())));
        }

        prop_assert_eq!(tree.roots().contains(node.id()), node.dependencies().is_empty());
        prop_assert!(!tree.descendants(node.id().as_str()).contains(node.id()), "cycle through {}", node.id());
    }
    for root in tree.roots() {
        prop_assert!(tree.contains(root.as_str()));
    }
    Ok(())
}

// ── Evaluation ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn addition_commutes(a in finite(), b in finite()) {
        let left = evaluate(&format!("({a}) + ({b})"));
        let right = evaluate(&format!("({b}) + ({a})"));
        prop_assert!(close(left, right, 1e-9));
    }

    #[test]
    fn multiplication_commutes(a in finite(), b in finite()) {
        let left = evaluate(&format!("({a}) * ({b})"));
        let right = evaluate(&format!("({b}) * ({a})"));
        prop_assert!(close(left, right, 1e-9));
    }

    #[test]
    fn identities(a in finite()) {
        let sum = evaluate(&format!("({a}) + 0"));
        prop_assert!(close(sum, a, 1e-9));
        let product = evaluate(&format!("({a}) * 1"));
        prop_assert!(close(product, a, 1e-9));
    }

    #[test]
    fn addition_associates(a in finite(), b in finite(), c in finite()) {
        let left = evaluate(&format!("(({a}) + ({b})) + ({c})"));
        let right = evaluate(&format!("({a}) + (({b}) + ({c}))"));
        prop_assert!(close(left, right, 1e-8));
    }

    #[test]
    fn multiplication_distributes(a in finite(), b in finite(), c in finite()) {
        let left = evaluate(&format!("({a}) * (({b}) + ({c}))"));
        let right = evaluate(&format!("({a}) * ({b}) + ({a}) * ({c})"));
        prop_assert!(close(left, right, 1e-8));
    }

    #[test]
    fn sanitize_is_idempotent(raw in r"[a-zA-Z0-9_$\\{} +*]{0,40}") {
        let once = Calculator::<Cas>::sanitize(&raw);
        prop_assert_eq!(Calculator::<Cas>::sanitize(&once), once);
    }

    #[test]
    fn canonical_references_are_untouched(name in "[a-z][a-z0-9_]{0,8}", rest in "[0-9 +*]{0,10}") {
        let raw = format!(r"\mathrm{{{name}}}{rest}");
        prop_assert_eq!(Calculator::<Cas>::sanitize(&raw), raw);
    }
}

// ── Tree structure ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn invariants_hold(ops in proptest::collection::vec(op(), 1..60)) {
        let mut tree = Tree::<Cas>::new();
        let mut generated = HashSet::new();
        for op in &ops {
            if let Some(id) = apply(&mut tree, op) {
                prop_assert!(generated.insert(id.clone()), "identifier {} generated twice", id);
            }
            check_invariants(&tree)?;
        }
    }

    #[test]
    fn single_parents_share_families(ops in proptest::collection::vec(op(), 1..40)) {
        let mut tree = Tree::<Cas>::new();
        for op in &ops {
            let Some(id) = apply(&mut tree, op) else {
                continue;
            };
            let node = tree.get(id.as_str()).unwrap();
            if let [parent] = node.dependencies().iter().collect::<Vec<_>>().as_slice() {
                prop_assert_eq!(id.family(), parent.family());
            }
        }
    }

    #[test]
    fn delete_removes_descendants(ops in proptest::collection::vec(op(), 1..40), target in 0usize..16) {
        let mut tree = Tree::<Cas>::new();
        for op in &ops {
            apply(&mut tree, op);
        }
        let ids = live(&tree);
        let Some(target) = pick(&ids, target).cloned() else {
            return Ok(());
        };

        let doomed = tree.descendants(target.as_str());
        prop_assert!(tree.delete_node(target.as_str()));
        prop_assert!(!tree.contains(target.as_str()));
        for id in &ids {
            let expected = *id != target && !doomed.contains(id);
            prop_assert_eq!(tree.contains(id.as_str()), expected);
        }
        check_invariants(&tree)?;
    }
}
