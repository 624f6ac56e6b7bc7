use crate::error::{EpidemicHistoryError, Result};
use crate::schema::RegionRecord;
use crate::translate::is_municipality;
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;

/// One canonical administrative region. Built once from the region list,
/// immutable thereafter; report rows reference nodes, they never own them.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegionNode {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub children: Vec<RegionNode>,
}

impl RegionNode {
    pub fn child(&self, name: &str) -> Option<&RegionNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Two-level hierarchy of provinces and their child regions, keyed by
/// localized province name.
#[derive(Debug, Clone, Default)]
pub struct RegionTree {
    provinces: BTreeMap<String, RegionNode>,
}

impl RegionTree {
    /// Builds the tree from the flat region list. A row is a province when
    /// its own id equals its declared top-level id; every other row is
    /// attached, in input order, to the province named by `province_name`.
    ///
    /// Two passes, so child rows may precede their province in the input.
    pub fn from_records(records: &[RegionRecord]) -> Result<Self> {
        let mut provinces: BTreeMap<String, RegionNode> = BTreeMap::new();

        for record in records {
            if record.id != record.level_1 {
                continue;
            }
            let node = RegionNode {
                id: record.id.clone(),
                name: record.province_name.clone(),
                level: record.level,
                children: Vec::new(),
            };
            if provinces.insert(record.province_name.clone(), node).is_some() {
                return Err(EpidemicHistoryError::DuplicateProvince(
                    record.province_name.clone(),
                ));
            }
        }

        for record in records {
            if record.id == record.level_1 {
                continue;
            }
            let province = provinces.get_mut(&record.province_name).ok_or_else(|| {
                EpidemicHistoryError::UnknownProvince {
                    province: record.province_name.clone(),
                    child: record.name_chi.clone(),
                }
            })?;
            if province.children.iter().any(|c| c.name == record.name_chi) {
                return Err(EpidemicHistoryError::AmbiguousChildName {
                    province: record.province_name.clone(),
                    name: record.name_chi.clone(),
                });
            }
            province.children.push(RegionNode {
                id: record.id.clone(),
                name: record.name_chi.clone(),
                level: record.level,
                children: Vec::new(),
            });
        }

        for province in provinces.values() {
            if province.children.is_empty() && !is_municipality(&province.name) {
                warn!("province {} has no child regions", province.name);
            }
        }

        Ok(Self { provinces })
    }

    pub fn province(&self, localized_name: &str) -> Option<&RegionNode> {
        self.provinces.get(localized_name)
    }

    pub fn provinces(&self) -> impl Iterator<Item = &RegionNode> {
        self.provinces.values()
    }

    pub fn len(&self) -> usize {
        self.provinces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }
}
