//! Classification tree assembly and aggregation.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use tracing::warn;

use crate::catalog::{AccountCatalog, Classification};

use super::types::ReportNode;

/// Fallback display name when neither the lines nor the catalog know one.
const UNNAMED_ACCOUNT: &str = "Conta não identificada";

/// Accumulated values of one leaf classification before tree assembly.
#[derive(Debug, Default, Clone)]
pub(crate) struct LeafSeed {
    /// Display name from the source lines, when present.
    pub name: Option<String>,
    /// Value per month.
    pub monthly: BTreeMap<u32, Decimal>,
    /// How many lines fed this leaf.
    pub lines: usize,
    /// How many of them were sign-corrected.
    pub flipped: usize,
}

impl LeafSeed {
    /// `Some(true)` when every line was sign-corrected, `Some(false)` when
    /// none was, `None` when the leaf mixes both.
    fn flip_state(&self) -> Option<bool> {
        if self.flipped == 0 {
            Some(false)
        } else if self.flipped == self.lines {
            Some(true)
        } else {
            None
        }
    }

    fn sign_anomaly(&self) -> bool {
        self.flip_state().is_none()
    }
}

/// Builds the aggregated classification tree from leaf seeds.
///
/// Missing ancestors are created as heading nodes. Any node with children
/// has its values replaced by the sum of its children, so sheet-level
/// subtotals never double-count.
pub(crate) fn build_tree(
    seeds: BTreeMap<Classification, LeafSeed>,
    catalog: &AccountCatalog,
) -> Vec<ReportNode> {
    let mut nodes: HashMap<Classification, ReportNode> = HashMap::new();
    let mut leaf_flips: HashMap<Classification, Option<bool>> = HashMap::new();

    for (code, seed) in seeds {
        let anomaly = seed.sign_anomaly();
        if anomaly {
            warn!(classification = %code, "mixed sign corrections under one account");
        }
        leaf_flips.insert(code.clone(), seed.flip_state());
        let node = ReportNode {
            name: resolve_name(&code, seed.name.as_deref(), catalog),
            level: code.level(),
            is_heading: false,
            monthly: seed.monthly,
            total: Decimal::ZERO,
            sign_anomaly: anomaly,
            children: Vec::new(),
            classification: code.clone(),
        };
        for ancestor in code.ancestors() {
            nodes.entry(ancestor.clone()).or_insert_with(|| ReportNode {
                name: resolve_name(&ancestor, None, catalog),
                level: ancestor.level(),
                is_heading: true,
                monthly: BTreeMap::new(),
                total: Decimal::ZERO,
                sign_anomaly: false,
                children: Vec::new(),
                classification: ancestor.clone(),
            });
        }
        nodes.insert(node.classification.clone(), node);
    }

    // Attach deepest nodes first so every parent sees complete children.
    let mut codes: Vec<Classification> = nodes.keys().cloned().collect();
    codes.sort_by_key(|c| std::cmp::Reverse(c.level()));

    let mut roots = Vec::new();
    for code in codes {
        let Some(node) = nodes.remove(&code) else {
            continue;
        };
        match code.parent() {
            Some(parent_code) => {
                // Ancestors were pre-created above.
                if let Some(parent) = nodes.get_mut(&parent_code) {
                    parent.children.push(node);
                }
            }
            None => roots.push(node),
        }
    }

    roots.sort_by(|a, b| a.classification.cmp(&b.classification));
    for root in &mut roots {
        finalize(root, &leaf_flips);
    }
    roots
}

/// Post-order pass: sort children, derive parent values, compute totals.
///
/// Returns the subtree's sign-correction state. A parent whose children
/// disagree (one subtree fully corrected, another untouched) is flagged,
/// so a single leaf out of step with its siblings surfaces in the tree.
fn finalize(
    node: &mut ReportNode,
    leaf_flips: &HashMap<Classification, Option<bool>>,
) -> Option<bool> {
    node.children
        .sort_by(|a, b| a.classification.cmp(&b.classification));
    if node.children.is_empty() {
        node.total = node.monthly.values().copied().sum();
        return leaf_flips
            .get(&node.classification)
            .copied()
            .unwrap_or(Some(false));
    }

    let mut derived: BTreeMap<u32, Decimal> = BTreeMap::new();
    let mut states = Vec::with_capacity(node.children.len());
    for child in &mut node.children {
        states.push(finalize(child, leaf_flips));
        for (month, value) in &child.monthly {
            *derived.entry(*month).or_insert(Decimal::ZERO) += *value;
        }
        node.sign_anomaly = node.sign_anomaly || child.sign_anomaly;
    }
    node.monthly = derived;
    node.is_heading = true;
    node.total = node.monthly.values().copied().sum();

    let any_flipped = states.contains(&Some(true));
    let any_untouched = states.contains(&Some(false));
    if any_flipped && any_untouched {
        warn!(
            classification = %node.classification,
            "sign corrections disagree between sibling accounts"
        );
        node.sign_anomaly = true;
        return None;
    }
    if states.contains(&None) {
        return None;
    }
    Some(any_flipped)
}

fn resolve_name(code: &Classification, line_name: Option<&str>, catalog: &AccountCatalog) -> String {
    if let Some(name) = line_name {
        return name.to_string();
    }
    catalog
        .get(code)
        .map_or_else(|| UNNAMED_ACCOUNT.to_string(), |entry| entry.account_name)
}
