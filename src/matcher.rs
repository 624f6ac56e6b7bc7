use crate::region_tree::{RegionNode, RegionTree};
use crate::translate::{find_correction, Correction};
use log::debug;

/// Result of resolving one raw report row against the region tree. A
/// correction entry may fan out to several current regions, hence `Many`.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome<'a> {
    One(&'a RegionNode),
    Many(Vec<&'a RegionNode>),
    Unmatched,
}

impl<'a> MatchOutcome<'a> {
    pub fn first(&self) -> Option<&'a RegionNode> {
        match self {
            MatchOutcome::One(node) => Some(*node),
            MatchOutcome::Many(nodes) => nodes.first().copied(),
            MatchOutcome::Unmatched => None,
        }
    }

    pub fn nodes(&self) -> Vec<&'a RegionNode> {
        match self {
            MatchOutcome::One(node) => vec![*node],
            MatchOutcome::Many(nodes) => nodes.clone(),
            MatchOutcome::Unmatched => Vec::new(),
        }
    }

    pub fn is_unmatched(&self) -> bool {
        matches!(self, MatchOutcome::Unmatched)
    }
}

/// Resolves a summary-row province directly against its top-level node.
/// Municipality rows bypass child matching entirely and go through here.
pub fn match_province<'a>(tree: &'a RegionTree, localized_name: &str) -> Option<&'a RegionNode> {
    tree.province(localized_name)
}

/// Resolves one detail row `(provinceName, childRawName)` to a canonical
/// child node. Heuristics run in order, first hit wins:
///
/// 1. exact canonical name
/// 2. suffix guessing: "区" when the province itself carries the city
///    suffix, otherwise "市" then "县"
/// 3. autonomous-area prefix search after stripping a trailing
///    "(自治)?(县|州)"
/// 4. manual correction table
///
/// Pure and deterministic; the same tree and row always yield the same
/// outcome.
pub fn match_child<'a>(
    tree: &'a RegionTree,
    province_name: &str,
    raw_name: &str,
    corrections: &[Correction],
) -> MatchOutcome<'a> {
    let Some(province) = tree.province(province_name) else {
        debug!("detail row names unknown province {}", province_name);
        return MatchOutcome::Unmatched;
    };

    if let Some(node) = province.child(raw_name) {
        return MatchOutcome::One(node);
    }

    let province_is_city = province_name.ends_with('市');
    if province_is_city {
        if let Some(node) = province.child(&format!("{raw_name}区")) {
            return MatchOutcome::One(node);
        }
    } else {
        if let Some(node) = province.child(&format!("{raw_name}市")) {
            return MatchOutcome::One(node);
        }
        if let Some(node) = province.child(&format!("{raw_name}县")) {
            return MatchOutcome::One(node);
        }
    }

    let stem = strip_autonomous_suffix(raw_name);
    if !stem.is_empty() {
        if let Some(node) = province
            .children
            .iter()
            .find(|c| c.name.contains("自治") && c.name.starts_with(stem))
        {
            return MatchOutcome::One(node);
        }
    }

    if let Some(correction) = find_correction(corrections, province_name, raw_name) {
        let found: Vec<&RegionNode> = correction
            .correct_names
            .iter()
            .filter_map(|name| {
                let node = province.child(name);
                if node.is_none() {
                    debug!(
                        "correction target {} not present under {}, dropped",
                        name, province_name
                    );
                }
                node
            })
            .collect();

        return match found.len() {
            0 => MatchOutcome::Unmatched,
            1 => MatchOutcome::One(found[0]),
            _ => MatchOutcome::Many(found),
        };
    }

    MatchOutcome::Unmatched
}

// "甘孜藏族自治州" is reported as "甘孜州"; stripping the administrative
// suffix leaves the prefix shared with the canonical name.
fn strip_autonomous_suffix(name: &str) -> &str {
    match name
        .strip_suffix('县')
        .or_else(|| name.strip_suffix('州'))
    {
        Some(stem) => stem.strip_suffix("自治").unwrap_or(stem),
        None => name,
    }
}
