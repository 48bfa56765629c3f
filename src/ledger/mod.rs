//! Prayer completion ledger: per-day completion records and the streak and
//! completion-rate statistics derived from them.
//!
//! The ledger never surfaces storage failures. A day that cannot be read is
//! an empty day, and a write that fails is logged and dropped.

pub mod clock;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use log::{debug, warn};

use crate::db::DayLogStore;
use crate::models::{DailyStats, DayLog, PrayerName, Streak, WeeklyGrid};

pub use clock::{Clock, FixedClock, SystemClock};

/// Upper bound on how many days a backward streak walk may visit.
pub const DEFAULT_MAX_LOOKBACK_DAYS: u32 = 3650;

pub struct PrayerLedger<S, C = SystemClock> {
    store: S,
    clock: C,
    offset: FixedOffset,
    max_lookback_days: u32,
}

impl<S: DayLogStore> PrayerLedger<S> {
    pub fn new(store: S, offset: FixedOffset) -> Self {
        Self::with_clock(store, SystemClock, offset)
    }
}

impl<S: DayLogStore, C: Clock> PrayerLedger<S, C> {
    pub fn with_clock(store: S, clock: C, offset: FixedOffset) -> Self {
        Self {
            store,
            clock,
            offset,
            max_lookback_days: DEFAULT_MAX_LOOKBACK_DAYS,
        }
    }

    pub fn with_max_lookback(mut self, days: u32) -> Self {
        self.max_lookback_days = days;
        self
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn max_lookback_days(&self) -> u32 {
        self.max_lookback_days
    }

    /// The calendar day `instant` falls on under the ledger's offset.
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    pub fn today(&self) -> NaiveDate {
        self.day_of(self.clock.now())
    }

    /// The log for `date`; empty if there is no record or it cannot be read.
    pub fn day_log(&self, date: NaiveDate) -> DayLog {
        match self.store.load(date) {
            Ok(Some(log)) => log,
            Ok(None) => DayLog::new(date),
            Err(e) => {
                warn!("Reading {} failed, treating as empty: {}", date, e);
                DayLog::new(date)
            }
        }
    }

    pub fn set_completed(&mut self, prayer: PrayerName, completed: bool, date: NaiveDate) {
        let mut log = self.day_log(date);
        let changed = if completed {
            log.mark(prayer, self.clock.now())
        } else {
            log.unmark(prayer)
        };

        if !changed {
            debug!("{} on {} already {}", prayer, date, completed);
            return;
        }
        if let Err(e) = self.store.save(&log) {
            warn!("Saving {} for {} failed: {}", prayer, date, e);
        }
    }

    /// Flip `prayer` on `date` and return its new state.
    pub fn toggle(&mut self, prayer: PrayerName, date: NaiveDate) -> bool {
        let completed = !self.is_completed(prayer, date);
        self.set_completed(prayer, completed, date);
        completed
    }

    pub fn is_completed(&self, prayer: PrayerName, date: NaiveDate) -> bool {
        self.day_log(date).is_completed(prayer)
    }

    /// Consecutive days, ending on `ending_on`, with every prayer completed.
    pub fn full_day_streak(&self, ending_on: NaiveDate) -> u32 {
        self.walk_back(ending_on, DayLog::is_full_day)
    }

    /// Consecutive days, ending on `ending_on`, with `prayer` completed.
    pub fn prayer_streak(&self, prayer: PrayerName, ending_on: NaiveDate) -> u32 {
        self.walk_back(ending_on, |log| log.is_completed(prayer))
    }

    pub fn last_7_days_completion(&self) -> f64 {
        self.completion_rate(7, self.today())
    }

    /// Fraction of all prayers completed over the `days` days ending on
    /// `ending_on`, in `[0, 1]`.
    pub fn completion_rate(&self, days: u32, ending_on: NaiveDate) -> f64 {
        let denominator = days as usize * PrayerName::COUNT;
        if denominator == 0 {
            return 0.0;
        }
        let start = window_start(ending_on, days);
        let done: usize = self
            .history(start, ending_on)
            .iter()
            .map(DayLog::completed_count)
            .sum();
        done as f64 / denominator as f64
    }

    /// One entry per day in `start..=end`, including days with no record.
    pub fn daily_stats(&self, start: NaiveDate, end: NaiveDate) -> Vec<DailyStats> {
        let mut logs = self.history(start, end).into_iter().peekable();
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|date| match logs.next_if(|log| log.date == date) {
                Some(log) => DailyStats::from_log(&log),
                None => DailyStats::from_log(&DayLog::new(date)),
            })
            .collect()
    }

    pub fn weekly_grid(&self, ending_on: NaiveDate) -> WeeklyGrid {
        WeeklyGrid::new(self.daily_stats(window_start(ending_on, 7), ending_on))
    }

    /// Longest run of full days within the lookback window ending on
    /// `ending_on`.
    pub fn best_full_day_streak(&self, ending_on: NaiveDate) -> u32 {
        let Some(floor) = self.floor() else {
            return 0;
        };
        let start = window_start(ending_on, self.max_lookback_days).max(floor);

        let mut best = 0u32;
        let mut run = 0u32;
        let mut prev: Option<NaiveDate> = None;
        for log in self
            .history(start, ending_on)
            .iter()
            .filter(|log| log.is_full_day())
        {
            run = match prev {
                Some(p) if p.succ_opt() == Some(log.date) => run + 1,
                _ => 1,
            };
            best = best.max(run);
            prev = Some(log.date);
        }
        best
    }

    pub fn streak(&self, ending_on: NaiveDate) -> Streak {
        Streak {
            current: self.full_day_streak(ending_on),
            best: self.best_full_day_streak(ending_on),
        }
    }

    /// Remove every record. Returns false if the store could not be cleared.
    pub fn wipe(&mut self) -> bool {
        match self.store.clear() {
            Ok(()) => {
                debug!("Ledger wiped");
                true
            }
            Err(e) => {
                warn!("Wiping ledger failed: {}", e);
                false
            }
        }
    }

    /// Earliest recorded day. `None` means there is nothing to walk; if the
    /// store cannot answer, the lookback cap is the only bound.
    fn floor(&self) -> Option<NaiveDate> {
        match self.store.earliest_date() {
            Ok(earliest) => earliest,
            Err(e) => {
                warn!("Reading earliest record failed: {}", e);
                Some(NaiveDate::MIN)
            }
        }
    }

    fn walk_back(&self, ending_on: NaiveDate, completed: impl Fn(&DayLog) -> bool) -> u32 {
        let Some(floor) = self.floor() else {
            return 0;
        };

        let mut count = 0u32;
        let mut date = ending_on;
        while count < self.max_lookback_days && date >= floor {
            if !completed(&self.day_log(date)) {
                break;
            }
            count += 1;
            match date.pred_opt() {
                Some(prev) => date = prev,
                None => break,
            }
        }
        count
    }

    /// Recorded logs for `start..=end`, ascending.
    ///
    /// If the range cannot be read as a whole, days are read one at a time
    /// so an unreadable day only blanks itself. That fallback never reaches
    /// below the earliest record or further back than the lookback cap.
    pub fn history(&self, start: NaiveDate, end: NaiveDate) -> Vec<DayLog> {
        match self.store.load_range(start, end) {
            Ok(logs) => logs,
            Err(e) => {
                warn!("Reading {}..={} failed, reading day by day: {}", start, end, e);
                let Some(floor) = self.floor() else {
                    return Vec::new();
                };
                let start = start
                    .max(floor)
                    .max(window_start(end, self.max_lookback_days));
                start
                    .iter_days()
                    .take_while(|d| *d <= end)
                    .map(|d| self.day_log(d))
                    .filter(|log| !log.is_empty())
                    .collect()
            }
        }
    }
}

/// First day of the `days`-long window that ends on `end`.
fn window_start(end: NaiveDate, days: u32) -> NaiveDate {
    end.checked_sub_days(Days::new(days.saturating_sub(1) as u64))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, StoreError};
    use chrono::TimeZone;
    use std::cell::Cell;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    fn noon(d: NaiveDate) -> DateTime<Utc> {
        Utc.from_utc_datetime(&d.and_hms_opt(12, 0, 0).unwrap())
    }

    fn ledger_on(today: NaiveDate) -> PrayerLedger<MemoryStore, FixedClock> {
        PrayerLedger::with_clock(MemoryStore::new(), FixedClock(noon(today)), utc())
    }

    fn complete_day<S: DayLogStore, C: Clock>(ledger: &mut PrayerLedger<S, C>, d: NaiveDate) {
        for prayer in PrayerName::all() {
            ledger.set_completed(prayer, true, d);
        }
    }

    fn days_back(from: NaiveDate, n: u64) -> NaiveDate {
        from.checked_sub_days(Days::new(n)).unwrap()
    }

    #[test]
    fn test_set_then_is_completed() {
        let today = date(3, 10);
        let mut ledger = ledger_on(today);

        assert!(!ledger.is_completed(PrayerName::Asr, today));
        ledger.set_completed(PrayerName::Asr, true, today);
        assert!(ledger.is_completed(PrayerName::Asr, today));
        ledger.set_completed(PrayerName::Asr, false, today);
        assert!(!ledger.is_completed(PrayerName::Asr, today));
    }

    #[test]
    fn test_set_completed_is_idempotent() {
        let today = date(3, 10);
        let mut ledger = ledger_on(today);
        ledger.set_completed(PrayerName::Fajr, true, today);
        let once = ledger.day_log(today);

        ledger.set_completed(PrayerName::Fajr, true, today);
        assert_eq!(ledger.day_log(today), once);

        ledger.set_completed(PrayerName::Isha, false, today);
        ledger.set_completed(PrayerName::Isha, false, today);
        assert_eq!(ledger.day_log(today), once);
    }

    #[test]
    fn test_completion_timestamp_comes_from_clock() {
        let today = date(3, 10);
        let mut ledger = ledger_on(today);
        ledger.set_completed(PrayerName::Maghrib, true, today);

        assert_eq!(
            ledger.day_log(today).completed_at(PrayerName::Maghrib),
            Some(noon(today))
        );
    }

    #[test]
    fn test_full_day_streak_counts_n_days() {
        let today = date(4, 20);
        let mut ledger = ledger_on(today);
        for n in 0..5 {
            complete_day(&mut ledger, days_back(today, n));
        }
        // Day six back is untouched, day seven back is full again
        complete_day(&mut ledger, days_back(today, 6));

        assert_eq!(ledger.full_day_streak(today), 5);
    }

    #[test]
    fn test_full_day_streak_stops_on_partial_day() {
        let today = date(4, 20);
        let mut ledger = ledger_on(today);
        complete_day(&mut ledger, days_back(today, 1));
        complete_day(&mut ledger, days_back(today, 2));
        for prayer in PrayerName::all().take(4) {
            ledger.set_completed(prayer, true, today);
        }

        assert_eq!(ledger.full_day_streak(today), 0);
        assert_eq!(ledger.full_day_streak(days_back(today, 1)), 2);
    }

    #[test]
    fn test_prayer_streak_ignores_other_prayers() {
        let today = date(5, 1);
        let mut ledger = ledger_on(today);
        for n in 0..3 {
            ledger.set_completed(PrayerName::Fajr, true, days_back(today, n));
        }
        ledger.set_completed(PrayerName::Isha, true, today);
        ledger.set_completed(PrayerName::Zuhr, true, days_back(today, 3));
        let before = ledger.prayer_streak(PrayerName::Fajr, today);

        ledger.set_completed(PrayerName::Asr, true, days_back(today, 1));
        ledger.set_completed(PrayerName::Isha, false, today);

        assert_eq!(before, 3);
        assert_eq!(ledger.prayer_streak(PrayerName::Fajr, today), 3);
        assert_eq!(ledger.prayer_streak(PrayerName::Zuhr, today), 0);
    }

    #[test]
    fn test_last_7_days_completion_bounds() {
        let today = date(6, 15);
        let mut ledger = ledger_on(today);
        assert_eq!(ledger.last_7_days_completion(), 0.0);

        for n in 0..7 {
            complete_day(&mut ledger, days_back(today, n));
        }
        // Outside the window
        complete_day(&mut ledger, days_back(today, 7));
        assert_eq!(ledger.last_7_days_completion(), 1.0);
    }

    #[test]
    fn test_last_7_days_completion_partial() {
        let today = date(6, 15);
        let mut ledger = ledger_on(today);
        for n in 0..7 {
            ledger.set_completed(PrayerName::Fajr, true, days_back(today, n));
        }
        assert!((ledger.last_7_days_completion() - 0.2).abs() < 1e-9);
        assert_eq!(ledger.completion_rate(0, today), 0.0);
    }

    #[test]
    fn test_today_follows_offset() {
        let late_evening = Utc.with_ymd_and_hms(2025, 1, 1, 22, 0, 0).unwrap();
        let karachi = FixedOffset::east_opt(5 * 3600).unwrap();
        let ledger =
            PrayerLedger::with_clock(MemoryStore::new(), FixedClock(late_evening), karachi);

        assert_eq!(ledger.today(), date(1, 2));
        assert_eq!(ledger.day_of(late_evening), date(1, 2));
    }

    #[test]
    fn test_walk_is_capped_by_lookback() {
        let today = date(7, 31);
        let mut ledger = ledger_on(today).with_max_lookback(4);
        for n in 0..10 {
            complete_day(&mut ledger, days_back(today, n));
        }
        assert_eq!(ledger.full_day_streak(today), 4);
        assert_eq!(ledger.prayer_streak(PrayerName::Asr, today), 4);
        assert_eq!(ledger.best_full_day_streak(today), 4);
    }

    struct CountingStore {
        inner: MemoryStore,
        loads: Cell<u32>,
    }

    impl DayLogStore for CountingStore {
        fn load(&self, date: NaiveDate) -> crate::db::Result<Option<DayLog>> {
            self.loads.set(self.loads.get() + 1);
            self.inner.load(date)
        }
        fn save(&mut self, log: &DayLog) -> crate::db::Result<()> {
            self.inner.save(log)
        }
        fn earliest_date(&self) -> crate::db::Result<Option<NaiveDate>> {
            self.inner.earliest_date()
        }
        fn clear(&mut self) -> crate::db::Result<()> {
            self.inner.clear()
        }
    }

    #[test]
    fn test_walk_stops_at_earliest_record() {
        let today = date(8, 10);
        let store = CountingStore {
            inner: MemoryStore::new(),
            loads: Cell::new(0),
        };
        let mut ledger = PrayerLedger::with_clock(store, FixedClock(noon(today)), utc());
        for n in 0..3 {
            ledger.set_completed(PrayerName::Isha, true, days_back(today, n));
        }
        ledger.store.loads.set(0);

        assert_eq!(ledger.prayer_streak(PrayerName::Isha, today), 3);
        assert_eq!(ledger.store.loads.get(), 3);
    }

    #[test]
    fn test_empty_store_has_no_streak() {
        let today = date(8, 10);
        let ledger = ledger_on(today);
        assert_eq!(ledger.full_day_streak(today), 0);
        assert_eq!(ledger.streak(today), Streak::default());
    }

    struct BrokenStore;

    fn unavailable() -> StoreError {
        StoreError::Database(rusqlite::Error::InvalidQuery)
    }

    impl DayLogStore for BrokenStore {
        fn load(&self, _date: NaiveDate) -> crate::db::Result<Option<DayLog>> {
            Err(unavailable())
        }
        fn save(&mut self, _log: &DayLog) -> crate::db::Result<()> {
            Err(unavailable())
        }
        fn earliest_date(&self) -> crate::db::Result<Option<NaiveDate>> {
            Err(unavailable())
        }
        fn clear(&mut self) -> crate::db::Result<()> {
            Err(unavailable())
        }
    }

    #[test]
    fn test_broken_store_fails_open() {
        let today = date(9, 1);
        let mut ledger =
            PrayerLedger::with_clock(BrokenStore, FixedClock(noon(today)), utc());

        ledger.set_completed(PrayerName::Fajr, true, today);
        assert!(!ledger.is_completed(PrayerName::Fajr, today));
        assert_eq!(ledger.full_day_streak(today), 0);
        assert_eq!(ledger.prayer_streak(PrayerName::Fajr, today), 0);
        assert_eq!(ledger.last_7_days_completion(), 0.0);
        assert_eq!(ledger.best_full_day_streak(today), 0);
        assert!(ledger.day_log(today).is_empty());
        assert!(!ledger.wipe());
    }

    /// Fails to read one day, and any range that covers it.
    struct CorruptDayStore {
        inner: MemoryStore,
        corrupt: NaiveDate,
    }

    impl CorruptDayStore {
        fn corrupt_error(&self) -> StoreError {
            StoreError::Corrupt {
                date: self.corrupt.to_string(),
                reason: "bad timestamp".to_string(),
            }
        }
    }

    impl DayLogStore for CorruptDayStore {
        fn load(&self, date: NaiveDate) -> crate::db::Result<Option<DayLog>> {
            if date == self.corrupt {
                return Err(self.corrupt_error());
            }
            self.inner.load(date)
        }
        fn save(&mut self, log: &DayLog) -> crate::db::Result<()> {
            self.inner.save(log)
        }
        fn earliest_date(&self) -> crate::db::Result<Option<NaiveDate>> {
            let earliest = self.inner.earliest_date()?;
            Ok(earliest.map(|d| d.min(self.corrupt)).or(Some(self.corrupt)))
        }
        fn clear(&mut self) -> crate::db::Result<()> {
            self.inner.clear()
        }
        fn load_range(
            &self,
            start: NaiveDate,
            end: NaiveDate,
        ) -> crate::db::Result<Vec<DayLog>> {
            if (start..=end).contains(&self.corrupt) {
                return Err(self.corrupt_error());
            }
            self.inner.load_range(start, end)
        }
    }

    #[test]
    fn test_corrupt_day_only_blanks_itself() {
        let today = date(3, 30);
        let mut inner = MemoryStore::new();
        for n in 0..6 {
            let mut log = DayLog::new(days_back(today, n));
            for prayer in PrayerName::all() {
                log.mark(prayer, noon(today));
            }
            inner.save(&log).unwrap();
        }
        let store = CorruptDayStore {
            inner,
            corrupt: days_back(today, 6),
        };
        let ledger = PrayerLedger::with_clock(store, FixedClock(noon(today)), utc());

        let streak = ledger.streak(today);
        assert_eq!(streak.current, 6);
        assert_eq!(streak.best, 6);
        assert!((ledger.last_7_days_completion() - 30.0 / 35.0).abs() < 1e-9);

        let grid = ledger.weekly_grid(today);
        assert_eq!(grid.days[0].prayers_done, 0);
        assert_eq!(grid.days_with_full_prayers(), 6);
    }

    #[test]
    fn test_best_streak_finds_longest_run() {
        let today = date(10, 20);
        let mut ledger = ledger_on(today);
        for n in [0, 1, 4, 5, 6, 7, 10] {
            complete_day(&mut ledger, days_back(today, n));
        }

        assert_eq!(
            ledger.streak(today),
            Streak {
                current: 2,
                best: 4
            }
        );
    }

    #[test]
    fn test_daily_stats_fill_missing_days() {
        let today = date(11, 7);
        let mut ledger = ledger_on(today);
        ledger.set_completed(PrayerName::Fajr, true, days_back(today, 2));
        complete_day(&mut ledger, today);

        let grid = ledger.weekly_grid(today);
        assert_eq!(grid.days.len(), 7);
        assert_eq!(grid.days[0].date, days_back(today, 6));
        assert_eq!(grid.days[4].prayers_done, 1);
        assert_eq!(grid.days[6].prayers_done, 5);
        assert_eq!(grid.total_done(), 6);
        assert_eq!(grid.days_with_full_prayers(), 1);
    }

    #[test]
    fn test_toggle_and_wipe() {
        let today = date(12, 1);
        let mut ledger = ledger_on(today);

        assert!(ledger.toggle(PrayerName::Zuhr, today));
        assert!(!ledger.toggle(PrayerName::Zuhr, today));
        assert!(ledger.toggle(PrayerName::Zuhr, today));

        assert!(ledger.wipe());
        assert!(!ledger.is_completed(PrayerName::Zuhr, today));
        assert_eq!(ledger.prayer_streak(PrayerName::Zuhr, today), 0);
    }
}
