use crate::matcher::{match_child, match_province};
use crate::region_tree::{RegionNode, RegionTree};
use crate::schema::{DetailRow, SummaryRow};
use crate::translate::{localized_province_name, Correction};
use chrono::NaiveDate;
use log::debug;

/// A matched node carried by value, so prepared rows can live next to the
/// tree inside the driver without borrowing from it.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRegion {
    pub id: String,
    pub level: u32,
}

impl From<&RegionNode> for MatchedRegion {
    fn from(node: &RegionNode) -> Self {
        Self {
            id: node.id.clone(),
            level: node.level,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreparedSummaryRow {
    pub date: NaiveDate,
    /// Localized province name, `None` for country rows and for raw names
    /// the translation table does not know.
    pub province_name: Option<String>,
    pub country: bool,
    pub cases: u64,
    pub matched: Option<MatchedRegion>,
}

#[derive(Debug, Clone)]
pub struct PreparedDetailRow {
    pub province_name: String,
    pub city_name: String,
    pub confirmed_count: u64,
    pub modify_time: String,
    /// Resolved nodes; empty when the row is unmatched, more than one when a
    /// correction fanned out.
    pub matched: Vec<MatchedRegion>,
}

/// Translates summary rows to localized province names and resolves each to
/// its top-level node. Runs once per feed; the summary timeseries covers all
/// dates at once.
pub fn prepare_summary(rows: &[SummaryRow], tree: &RegionTree) -> Vec<PreparedSummaryRow> {
    rows.iter()
        .map(|row| {
            let localized = row.province.as_deref().and_then(|raw| {
                let name = localized_province_name(raw);
                if name.is_none() {
                    debug!("no translation for summary province {}", raw);
                }
                name
            });
            let matched = localized
                .and_then(|name| match_province(tree, name))
                .map(MatchedRegion::from);

            PreparedSummaryRow {
                date: row.date,
                province_name: localized.map(str::to_string),
                country: row.country,
                cases: row.cases,
                matched,
            }
        })
        .collect()
}

/// Resolves one day's detail rows against the tree. Unmatched rows are kept
/// (with an empty match set) so callers can audit them; the accumulator
/// skips them.
pub fn prepare_detail(
    rows: &[DetailRow],
    tree: &RegionTree,
    corrections: &[Correction],
) -> Vec<PreparedDetailRow> {
    let mut unmatched = 0usize;

    let prepared: Vec<PreparedDetailRow> = rows
        .iter()
        .map(|row| {
            let outcome = match_child(tree, &row.province_name, &row.city_name, corrections);
            if outcome.is_unmatched() {
                unmatched += 1;
                debug!(
                    "unmatched detail row {} / {}",
                    row.province_name, row.city_name
                );
            }

            PreparedDetailRow {
                province_name: row.province_name.clone(),
                city_name: row.city_name.clone(),
                confirmed_count: row.confirmed_count,
                modify_time: row.modify_time.clone(),
                matched: outcome.nodes().into_iter().map(MatchedRegion::from).collect(),
            }
        })
        .collect();

    if unmatched > 0 {
        debug!("{} of {} detail rows unmatched", unmatched, rows.len());
    }

    prepared
}
