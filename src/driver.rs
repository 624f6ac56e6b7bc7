use crate::error::Result;
use crate::ingestion::{prepare_detail, prepare_summary, PreparedSummaryRow};
use crate::region_tree::RegionTree;
use crate::schema::{DetailRow, RegionRecord, SummaryRow};
use crate::store::CaseStore;
use crate::translate::{default_corrections, Correction};
use crate::walker::{to_iso, Countdown};
use chrono::NaiveDate;
use log::{debug, info};

/// Injected capability for obtaining the upstream feeds. The region list and
/// the summary timeseries are fetched once per run; detail is fetched per
/// day. The engine performs no I/O of its own.
pub trait DataSource {
    fn regions(&self) -> Result<Vec<RegionRecord>>;
    fn summary(&self) -> Result<Vec<SummaryRow>>;
    fn detail(&self, date: NaiveDate) -> Result<Vec<DetailRow>>;
}

/// Drives the walk: pulls a date from the countdown, fetches that day's
/// detail, matches rows against the tree, and feeds the store. All mutation
/// stays on the caller's thread; days are strictly sequential because each
/// continuing day appends to entries built by earlier days.
pub struct HistoryBuilder<S> {
    source: S,
    tree: RegionTree,
    corrections: Vec<Correction>,
    summary: Vec<PreparedSummaryRow>,
    countdown: Countdown,
    store: CaseStore,
}

impl<S: DataSource> HistoryBuilder<S> {
    /// Builds the tree, prepares the summary feed, and runs the priming day
    /// starting from yesterday (UTC+8).
    pub fn initialize(source: S) -> Result<Self> {
        Self::with_countdown(source, Countdown::starting_yesterday(), default_corrections())
    }

    /// Same as [`initialize`](Self::initialize) with an explicit walker and
    /// corrections table.
    pub fn with_countdown(
        source: S,
        mut countdown: Countdown,
        corrections: Vec<Correction>,
    ) -> Result<Self> {
        let records = source.regions()?;
        let tree = RegionTree::from_records(&records)?;
        info!("region tree built with {} provinces", tree.len());

        let raw_summary = source.summary()?;
        let summary = prepare_summary(&raw_summary, &tree);

        let mut store = CaseStore::new();
        match countdown.next() {
            Some(date) => {
                let raw_detail = source.detail(date)?;
                let detail = prepare_detail(&raw_detail, &tree, &corrections);
                store.prime_day(date, &summary, &detail);
                info!(
                    "primed store on {} with {} regions",
                    to_iso(date),
                    store.data.len()
                );
            }
            None => store.mark_ready(),
        }

        Ok(Self {
            source,
            tree,
            corrections,
            summary,
            countdown,
            store,
        })
    }

    /// One continuing cycle. Returns `Ok(false)` once the walk is exhausted
    /// and the store is ready; calling again stays a no-op. A fetch failure
    /// is fatal for the run: the error propagates and the walker does not
    /// advance past the failed day.
    pub fn advance(&mut self) -> Result<bool> {
        if self.store.ready {
            return Ok(false);
        }

        let Some(date) = self.countdown.next() else {
            self.store.mark_ready();
            return Ok(false);
        };

        let raw_detail = self.source.detail(date)?;
        let detail = prepare_detail(&raw_detail, &self.tree, &self.corrections);
        self.store.continue_day(date, &self.summary, &detail);
        debug!("processed {}", to_iso(date));

        Ok(true)
    }

    pub fn run_to_origin(&mut self) -> Result<()> {
        while self.advance()? {}
        Ok(())
    }

    pub fn store(&self) -> &CaseStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CaseStore {
        &mut self.store
    }

    pub fn tree(&self) -> &RegionTree {
        &self.tree
    }

    pub fn into_store(self) -> CaseStore {
        self.store
    }
}

/// Convenience facade: initialize, walk to the origin, return the finished
/// store.
pub fn build_history<S: DataSource>(source: S) -> Result<CaseStore> {
    let mut builder = HistoryBuilder::initialize(source)?;
    builder.run_to_origin()?;
    Ok(builder.into_store())
}
