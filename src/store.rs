use crate::ingestion::{PreparedDetailRow, PreparedSummaryRow};
use crate::translate::is_municipality;
use crate::walker::{to_iso, ORIGIN_DATE};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Per-region time series, created lazily on the first day the region has a
/// resolvable row. `cases[i]` belongs to the i-th processed date since this
/// entry appeared; a day without data for the region appends nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesEntry {
    pub id: String,
    pub name: String,
    pub lvl: u32,
    pub cases: Vec<u64>,
}

/// Mutation notifications for observer-style consumers. The store itself is
/// plain mutable state; reactivity is the subscriber's business.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    SeriesCreated { id: String, name: String, cases: u64 },
    CasesAppended { id: String, cases: u64 },
    DayRecorded { date: String, total: u64 },
    Ready,
}

type Observer = Box<dyn FnMut(&StoreEvent)>;

/// The evolving per-region series plus the date/total frontier. Mutated only
/// by the single accumulation flow; read-only once `ready` is true.
pub struct CaseStore {
    pub data: BTreeMap<String, SeriesEntry>,
    pub dates: Vec<String>,
    pub total: Vec<u64>,
    pub days_loaded: usize,
    pub ready: bool,
    pub last_updated: String,
    observers: Vec<Observer>,
}

impl CaseStore {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            dates: Vec::new(),
            total: Vec::new(),
            days_loaded: 0,
            ready: false,
            last_updated: ORIGIN_DATE.to_string(),
            observers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// First processing day: records the date frontier and creates a
    /// `SeriesEntry` for every region seen, municipalities from their
    /// summary rows and everything else from detail rows.
    pub fn prime_day(
        &mut self,
        date: NaiveDate,
        summary: &[PreparedSummaryRow],
        detail: &[PreparedDetailRow],
    ) {
        self.record_day(date, summary);
        let mut touched = HashSet::new();

        for row in summary {
            let (Some(region), Some(name)) = (&row.matched, row.province_name.as_deref()) else {
                continue;
            };
            if row.date != date || !is_municipality(name) {
                continue;
            }
            self.create_entry(region.id.clone(), name.to_string(), region.level, row.cases, &mut touched);
        }

        for row in detail {
            let Some(region) = row.matched.first() else {
                continue;
            };
            if is_municipality(&row.province_name) {
                continue;
            }
            self.create_entry(
                region.id.clone(),
                row.city_name.clone(),
                region.level,
                row.confirmed_count,
                &mut touched,
            );
        }

        self.raise_last_updated(detail);
    }

    /// Every subsequent day: appends to existing entries only. A row whose
    /// node has no entry is skipped, never created retroactively.
    pub fn continue_day(
        &mut self,
        date: NaiveDate,
        summary: &[PreparedSummaryRow],
        detail: &[PreparedDetailRow],
    ) {
        self.record_day(date, summary);
        let mut touched = HashSet::new();

        for row in summary {
            let (Some(region), Some(name)) = (&row.matched, row.province_name.as_deref()) else {
                continue;
            };
            if row.date != date || !is_municipality(name) {
                continue;
            }
            self.append_cases(&region.id, row.cases, &mut touched);
        }

        for row in detail {
            let Some(region) = row.matched.first() else {
                continue;
            };
            if is_municipality(&row.province_name) {
                continue;
            }
            self.append_cases(&region.id, row.confirmed_count, &mut touched);
        }

        self.raise_last_updated(detail);
        self.days_loaded += 1;
    }

    /// Idempotent; fires the `Ready` event once.
    pub fn mark_ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        self.emit(StoreEvent::Ready);
    }

    fn record_day(&mut self, date: NaiveDate, summary: &[PreparedSummaryRow]) {
        let iso = to_iso(date);
        let total = summary
            .iter()
            .filter(|row| row.country && row.date == date)
            .map(|row| row.cases)
            .sum();

        self.dates.push(iso.clone());
        self.total.push(total);
        self.emit(StoreEvent::DayRecorded { date: iso, total });
    }

    fn create_entry(
        &mut self,
        id: String,
        name: String,
        lvl: u32,
        cases: u64,
        touched: &mut HashSet<String>,
    ) {
        if !touched.insert(id.clone()) || self.data.contains_key(&id) {
            debug!("duplicate row for region {} skipped", id);
            return;
        }

        self.data.insert(
            id.clone(),
            SeriesEntry {
                id: id.clone(),
                name: name.clone(),
                lvl,
                cases: vec![cases],
            },
        );
        self.emit(StoreEvent::SeriesCreated { id, name, cases });
    }

    fn append_cases(&mut self, id: &str, cases: u64, touched: &mut HashSet<String>) {
        if !touched.insert(id.to_string()) {
            debug!("duplicate row for region {} skipped", id);
            return;
        }

        match self.data.get_mut(id) {
            Some(entry) => {
                entry.cases.push(cases);
                self.emit(StoreEvent::CasesAppended {
                    id: id.to_string(),
                    cases,
                });
            }
            None => debug!("no series entry for region {}, row skipped", id),
        }
    }

    fn raise_last_updated(&mut self, detail: &[PreparedDetailRow]) {
        for row in detail {
            if row.modify_time > self.last_updated {
                self.last_updated = row.modify_time.clone();
            }
        }
    }

    fn emit(&mut self, event: StoreEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }
}

impl Default for CaseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CaseStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseStore")
            .field("data", &self.data)
            .field("dates", &self.dates)
            .field("total", &self.total)
            .field("days_loaded", &self.days_loaded)
            .field("ready", &self.ready)
            .field("last_updated", &self.last_updated)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::MatchedRegion;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn summary_row(
        d: &str,
        province: Option<(&str, &str)>,
        country: bool,
        cases: u64,
    ) -> PreparedSummaryRow {
        PreparedSummaryRow {
            date: date(d),
            province_name: province.map(|(name, _)| name.to_string()),
            country,
            cases,
            matched: province.map(|(_, id)| MatchedRegion {
                id: id.to_string(),
                level: 1,
            }),
        }
    }

    fn detail_row(province: &str, city: &str, ids: &[&str], count: u64, time: &str) -> PreparedDetailRow {
        PreparedDetailRow {
            province_name: province.to_string(),
            city_name: city.to_string(),
            confirmed_count: count,
            modify_time: time.to_string(),
            matched: ids
                .iter()
                .map(|id| MatchedRegion {
                    id: id.to_string(),
                    level: 2,
                })
                .collect(),
        }
    }

    #[test]
    fn test_prime_day_creates_entries() {
        let mut store = CaseStore::new();
        let summary = vec![
            summary_row("2020-01-25", None, true, 1975),
            summary_row("2020-01-25", Some(("北京市", "110000")), false, 63),
            summary_row("2020-01-25", Some(("湖北省", "420000")), false, 1052),
            summary_row("2020-01-24", Some(("北京市", "110000")), false, 51),
        ];
        let detail = vec![
            detail_row("湖北省", "武汉", &["420100"], 618, "2020-01-25 12:30:00"),
            detail_row("湖北省", "不知名地方", &[], 4, "2020-01-25 12:31:00"),
        ];

        store.prime_day(date("2020-01-25"), &summary, &detail);

        assert_eq!(store.dates, vec!["2020-01-25"]);
        assert_eq!(store.total, vec![1975]);

        let beijing = store.data.get("110000").unwrap();
        assert_eq!(beijing.name, "北京市");
        assert_eq!(beijing.lvl, 1);
        assert_eq!(beijing.cases, vec![63]);

        let wuhan = store.data.get("420100").unwrap();
        assert_eq!(wuhan.name, "武汉");
        assert_eq!(wuhan.cases, vec![618]);

        // non-municipality summary rows and unmatched detail rows create nothing
        assert!(store.data.get("420000").is_none());
        assert_eq!(store.data.len(), 2);
        assert_eq!(store.days_loaded, 0);
        assert!(!store.ready);
    }

    #[test]
    fn test_continue_day_appends_and_skips_unknown() {
        let mut store = CaseStore::new();
        let summary = vec![
            summary_row("2020-01-25", None, true, 1975),
            summary_row("2020-01-25", Some(("北京市", "110000")), false, 63),
            summary_row("2020-01-24", None, true, 1287),
            summary_row("2020-01-24", Some(("北京市", "110000")), false, 51),
        ];
        store.prime_day(
            date("2020-01-25"),
            &summary,
            &[detail_row("湖北省", "武汉", &["420100"], 618, "")],
        );

        let late_detail = vec![
            detail_row("湖北省", "武汉", &["420100"], 495, ""),
            // first appears after priming: skipped, never created
            detail_row("湖北省", "黄石", &["420200"], 31, ""),
        ];
        store.continue_day(date("2020-01-24"), &summary, &late_detail);

        assert_eq!(store.dates, vec!["2020-01-25", "2020-01-24"]);
        assert_eq!(store.total, vec![1975, 1287]);
        assert_eq!(store.days_loaded, 1);

        assert_eq!(store.data.get("110000").unwrap().cases, vec![63, 51]);
        assert_eq!(store.data.get("420100").unwrap().cases, vec![618, 495]);
        assert!(store.data.get("420200").is_none());

        for entry in store.data.values() {
            assert!(entry.cases.len() <= store.dates.len());
        }
    }

    #[test]
    fn test_total_counts_only_country_rows_for_the_day() {
        let mut store = CaseStore::new();
        let summary = vec![
            summary_row("2020-01-25", None, true, 1000),
            summary_row("2020-01-25", None, true, 975),
            summary_row("2020-01-24", None, true, 1287),
            summary_row("2020-01-25", Some(("湖北省", "420000")), false, 1052),
        ];

        store.prime_day(date("2020-01-25"), &summary, &[]);
        assert_eq!(store.total, vec![1975]);
    }

    #[test]
    fn test_first_row_wins_within_a_day() {
        let mut store = CaseStore::new();
        let detail = vec![
            detail_row("湖北省", "武汉", &["420100"], 618, ""),
            detail_row("湖北省", "武汉市", &["420100"], 700, ""),
        ];
        store.prime_day(date("2020-01-25"), &[], &detail);
        assert_eq!(store.data.get("420100").unwrap().cases, vec![618]);

        store.continue_day(date("2020-01-24"), &[], &detail);
        assert_eq!(store.data.get("420100").unwrap().cases, vec![618, 618]);
    }

    #[test]
    fn test_multi_match_row_feeds_first_node_only() {
        let mut store = CaseStore::new();
        store.prime_day(
            date("2020-01-25"),
            &[],
            &[
                detail_row("黑龙江省", "哈尔滨", &["230100"], 20, ""),
                detail_row("黑龙江省", "大兴安岭地区", &["232700"], 2, ""),
            ],
        );

        // one historical name resolved to two current regions
        let fan_out = detail_row("黑龙江省", "老辖区", &["230100", "232700"], 9, "");
        store.continue_day(date("2020-01-24"), &[], &[fan_out]);

        assert_eq!(store.data.get("230100").unwrap().cases, vec![20, 9]);
        assert_eq!(store.data.get("232700").unwrap().cases, vec![2]);
    }

    #[test]
    fn test_last_updated_raised_across_days() {
        let mut store = CaseStore::new();
        assert_eq!(store.last_updated, ORIGIN_DATE);

        store.prime_day(
            date("2020-01-25"),
            &[],
            &[detail_row("湖北省", "武汉", &["420100"], 618, "2020-01-25 08:00:00")],
        );
        assert_eq!(store.last_updated, "2020-01-25 08:00:00");

        store.continue_day(
            date("2020-01-24"),
            &[],
            &[detail_row("湖北省", "武汉", &["420100"], 495, "2020-01-24 22:00:00")],
        );
        // earlier timestamp never lowers the frontier
        assert_eq!(store.last_updated, "2020-01-25 08:00:00");
    }

    #[test]
    fn test_mark_ready_is_idempotent() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        let mut store = CaseStore::new();
        store.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        store.mark_ready();
        store.mark_ready();

        assert!(store.ready);
        assert_eq!(*events.borrow(), vec![StoreEvent::Ready]);
    }

    #[test]
    fn test_observers_see_each_mutation() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);

        let mut store = CaseStore::new();
        store.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        store.prime_day(
            date("2020-01-25"),
            &[summary_row("2020-01-25", None, true, 1975)],
            &[detail_row("湖北省", "武汉", &["420100"], 618, "")],
        );
        store.continue_day(
            date("2020-01-24"),
            &[summary_row("2020-01-24", None, true, 1287)],
            &[detail_row("湖北省", "武汉", &["420100"], 495, "")],
        );

        let events = events.borrow();
        assert_eq!(
            *events,
            vec![
                StoreEvent::DayRecorded {
                    date: "2020-01-25".to_string(),
                    total: 1975,
                },
                StoreEvent::SeriesCreated {
                    id: "420100".to_string(),
                    name: "武汉".to_string(),
                    cases: 618,
                },
                StoreEvent::DayRecorded {
                    date: "2020-01-24".to_string(),
                    total: 1287,
                },
                StoreEvent::CasesAppended {
                    id: "420100".to_string(),
                    cases: 495,
                },
            ]
        );
    }
}
