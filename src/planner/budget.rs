use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use super::day_index::{DayPlacement, TripCalendar};
use crate::models::budget::{BudgetCategory, BudgetEntry};

const TOP_CATEGORIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: BudgetCategory,
    pub total: Decimal,
    /// Share of the enclosing total in percent, one decimal place.
    pub percentage: Decimal,
}

/// Spend against the trip budget up to a selected date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balance {
    pub budget: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub over_budget: bool,
    pub budget_set: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub total: Decimal,
    pub recorded_days: usize,
    pub average_daily: Decimal,
    pub highest_day: Option<DailyTotal>,
    pub lowest_day: Option<DailyTotal>,
    pub top_categories: Vec<CategoryTotal>,
}

/// An entry dated outside the trip, filed under a boundary day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClampedEntry {
    pub entry_id: i64,
    pub date: NaiveDate,
    pub assigned_date: NaiveDate,
}

/// Expense records of one trip grouped by date.
///
/// Amounts are summed at face value; the currency field takes no part in it.
/// Sums saturate at `Decimal::MAX` instead of overflowing.
#[derive(Debug, Clone, Default)]
pub struct BudgetLedger {
    by_date: BTreeMap<NaiveDate, Vec<BudgetEntry>>,
    clamped: Vec<ClampedEntry>,
}

impl BudgetLedger {
    pub fn new(entries: Vec<BudgetEntry>) -> Self {
        Self::from_buckets(entries.into_iter().map(|entry| (entry.date, entry)), Vec::new())
    }

    /// Files every entry under a trip day. Entries dated before the start or
    /// after the end land on the first or last day and are listed in `clamped`,
    /// so the running total on the final day always covers every entry.
    pub fn for_trip(calendar: &TripCalendar, entries: Vec<BudgetEntry>) -> Self {
        let mut clamped = Vec::new();
        let keyed: Vec<(NaiveDate, BudgetEntry)> = entries
            .into_iter()
            .map(|entry| {
                let assigned = calendar.date_of(calendar.day_number(entry.date));
                if !matches!(calendar.placement(entry.date), DayPlacement::InRange(_)) {
                    warn!(
                        entry_id = entry.id,
                        date = %entry.date,
                        assigned = %assigned,
                        "budget entry date outside trip range, clamped"
                    );
                    clamped.push(ClampedEntry {
                        entry_id: entry.id,
                        date: entry.date,
                        assigned_date: assigned,
                    });
                }
                (assigned, entry)
            })
            .collect();
        Self::from_buckets(keyed, clamped)
    }

    fn from_buckets(
        entries: impl IntoIterator<Item = (NaiveDate, BudgetEntry)>,
        clamped: Vec<ClampedEntry>,
    ) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<BudgetEntry>> = BTreeMap::new();
        for (date, entry) in entries {
            by_date.entry(date).or_default().push(entry);
        }
        for entries in by_date.values_mut() {
            entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        Self { by_date, clamped }
    }

    pub fn clamped(&self) -> &[ClampedEntry] {
        &self.clamped
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.by_date.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = &BudgetEntry> {
        self.by_date.values().flatten()
    }

    pub fn entries_on(&self, date: NaiveDate) -> &[BudgetEntry] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_on(&self, date: NaiveDate) -> Decimal {
        sum(self.entries_on(date))
    }

    pub fn daily_totals(&self) -> Vec<DailyTotal> {
        self.by_date
            .iter()
            .map(|(date, entries)| DailyTotal {
                date: *date,
                total: sum(entries),
                count: entries.len(),
            })
            .collect()
    }

    /// Everything spent on or before `date`.
    pub fn cumulative_through(&self, date: NaiveDate) -> Decimal {
        self.by_date
            .range(..=date)
            .map(|(_, entries)| sum(entries))
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn grand_total(&self) -> Decimal {
        self.by_date
            .values()
            .map(|entries| sum(entries))
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn category_totals(&self) -> Vec<CategoryTotal> {
        category_totals(self.entries())
    }

    pub fn category_totals_on(&self, date: NaiveDate) -> Vec<CategoryTotal> {
        category_totals(self.entries_on(date).iter())
    }

    /// An unset budget counts as zero, so `remaining` is then the negated spend.
    pub fn balance(&self, ceiling: Option<Decimal>, through: NaiveDate) -> Balance {
        let budget = ceiling.unwrap_or(Decimal::ZERO);
        let spent = self.cumulative_through(through);
        let remaining = budget.saturating_sub(spent);
        Balance {
            budget,
            spent,
            remaining,
            over_budget: remaining < Decimal::ZERO,
            budget_set: ceiling.is_some(),
        }
    }

    pub fn summary(&self) -> BudgetSummary {
        let total = self.grand_total();
        let daily = self.daily_totals();
        let recorded_days = daily.len();
        let average_daily = if recorded_days == 0 {
            Decimal::ZERO
        } else {
            total
                .checked_div(Decimal::from(recorded_days))
                .unwrap_or(Decimal::ZERO)
                .round_dp(0)
        };

        // First maximum and last minimum, both in date order.
        let highest_day = daily
            .iter()
            .fold(None::<&DailyTotal>, |best, day| match best {
                Some(current) if current.total >= day.total => Some(current),
                _ => Some(day),
            })
            .cloned();
        let lowest_day = daily
            .iter()
            .fold(None::<&DailyTotal>, |best, day| match best {
                Some(current) if current.total < day.total => Some(current),
                _ => Some(day),
            })
            .cloned();

        let mut top_categories = self.category_totals();
        top_categories.truncate(TOP_CATEGORIES);

        BudgetSummary {
            total,
            recorded_days,
            average_daily,
            highest_day,
            lowest_day,
            top_categories,
        }
    }
}

fn sum(entries: &[BudgetEntry]) -> Decimal {
    entries
        .iter()
        .map(|entry| entry.amount)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

fn category_totals<'a>(entries: impl Iterator<Item = &'a BudgetEntry>) -> Vec<CategoryTotal> {
    let mut totals: HashMap<BudgetCategory, Decimal> = HashMap::new();
    for entry in entries {
        let total = totals.entry(entry.category).or_default();
        *total = total.saturating_add(entry.amount);
    }
    let overall = totals
        .values()
        .copied()
        .fold(Decimal::ZERO, Decimal::saturating_add);
    let mut rows: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category,
            total,
            percentage: percentage_of(total, overall),
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));
    rows
}

fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
        .round_dp(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(id: i64, date: &str, amount: i64, category: BudgetCategory) -> BudgetEntry {
        BudgetEntry {
            id,
            itinerary_id: 1,
            date: date.parse().unwrap(),
            activity_id: None,
            activity: None,
            category,
            amount: Decimal::from(amount),
            description: None,
            currency: "JPY".into(),
            paid_by: None,
            created_at: Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sample() -> BudgetLedger {
        BudgetLedger::new(vec![
            entry(1, "2025-03-15", 1000, BudgetCategory::Transport),
            entry(2, "2025-03-15", 2000, BudgetCategory::Food),
            entry(3, "2025-03-16", 500, BudgetCategory::Food),
        ])
    }

    #[test]
    fn totals_per_date_and_cumulative() {
        let ledger = sample();
        assert_eq!(ledger.total_on(date("2025-03-15")), Decimal::from(3000));
        assert_eq!(ledger.total_on(date("2025-03-17")), Decimal::ZERO);
        assert_eq!(ledger.cumulative_through(date("2025-03-16")), Decimal::from(3500));
        assert_eq!(ledger.cumulative_through(date("2025-03-14")), Decimal::ZERO);
        assert_eq!(ledger.grand_total(), Decimal::from(3500));
    }

    #[test]
    fn remaining_balance_against_trip_budget() {
        let balance = sample().balance(Some(Decimal::from(5000)), date("2025-03-16"));
        assert_eq!(balance.remaining, Decimal::from(1500));
        assert!(!balance.over_budget);
        assert!(balance.budget_set);
    }

    #[test]
    fn unset_budget_reports_negative_spend() {
        let balance = sample().balance(None, date("2025-03-15"));
        assert_eq!(balance.remaining, Decimal::from(-3000));
        assert!(balance.over_budget);
        assert!(!balance.budget_set);
    }

    #[test]
    fn decimal_amounts_do_not_drift() {
        let mut a = entry(1, "2025-03-15", 0, BudgetCategory::Other);
        a.amount = "0.1".parse().unwrap();
        let mut b = entry(2, "2025-03-15", 0, BudgetCategory::Other);
        b.amount = "0.2".parse().unwrap();
        let ledger = BudgetLedger::new(vec![a, b]);
        assert_eq!(ledger.grand_total(), "0.3".parse::<Decimal>().unwrap());
    }

    #[test]
    fn newest_entry_first_within_a_date() {
        let ledger = sample();
        let ids: Vec<i64> = ledger.entries_on(date("2025-03-15")).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn category_totals_sum_by_tag() {
        let totals = sample().category_totals();
        assert_eq!(totals[0].category, BudgetCategory::Food);
        assert_eq!(totals[0].total, Decimal::from(2500));
        assert_eq!(totals[0].percentage, "71.4".parse::<Decimal>().unwrap());
        assert_eq!(totals[1].category, BudgetCategory::Transport);
    }

    #[test]
    fn summary_picks_extreme_days() {
        let summary = sample().summary();
        assert_eq!(summary.recorded_days, 2);
        assert_eq!(summary.average_daily, Decimal::from(1750));
        assert_eq!(summary.highest_day.unwrap().date, date("2025-03-15"));
        assert_eq!(summary.lowest_day.unwrap().date, date("2025-03-16"));
    }

    #[test]
    fn huge_amounts_saturate_instead_of_panicking() {
        let mut a = entry(1, "2025-03-15", 0, BudgetCategory::Food);
        a.amount = Decimal::MAX;
        let mut b = entry(2, "2025-03-16", 0, BudgetCategory::Food);
        b.amount = Decimal::MAX;
        let mut c = entry(3, "2025-03-16", 0, BudgetCategory::Other);
        c.amount = "1000000000000000000000000000".parse().unwrap();
        let ledger = BudgetLedger::new(vec![a, b, c]);

        assert_eq!(ledger.grand_total(), Decimal::MAX);
        assert_eq!(ledger.cumulative_through(date("2025-03-16")), Decimal::MAX);
        let summary = ledger.summary();
        assert_eq!(summary.top_categories[0].category, BudgetCategory::Food);
        assert!(summary.top_categories[0].percentage <= Decimal::ONE_HUNDRED);
        let balance = ledger.balance(Some(Decimal::from(5000)), date("2025-03-16"));
        assert!(balance.over_budget);
    }

    #[test]
    fn large_single_amount_percentage() {
        let mut big = entry(1, "2025-03-15", 0, BudgetCategory::Shopping);
        big.amount = "1000000000000000000000000000".parse().unwrap();
        let totals = BudgetLedger::new(vec![big]).category_totals();
        assert_eq!(totals[0].percentage, Decimal::ONE_HUNDRED);
    }

    fn trip() -> TripCalendar {
        TripCalendar::new(date("2025-03-15"), date("2025-03-17")).unwrap()
    }

    #[test]
    fn entries_outside_the_trip_are_filed_on_boundary_days() {
        let ledger = BudgetLedger::for_trip(
            &trip(),
            vec![
                entry(1, "2025-03-10", 100, BudgetCategory::Food),
                entry(2, "2025-03-16", 200, BudgetCategory::Food),
                entry(3, "2025-03-20", 700, BudgetCategory::Food),
            ],
        );
        assert_eq!(ledger.total_on(date("2025-03-15")), Decimal::from(100));
        assert_eq!(ledger.total_on(date("2025-03-17")), Decimal::from(700));
        assert_eq!(ledger.cumulative_through(date("2025-03-17")), Decimal::from(1000));
        let moved: Vec<(i64, NaiveDate)> = ledger
            .clamped()
            .iter()
            .map(|c| (c.entry_id, c.assigned_date))
            .collect();
        assert_eq!(
            moved,
            vec![(1, date("2025-03-15")), (3, date("2025-03-17"))]
        );
    }

    #[test]
    fn final_day_running_total_equals_grand_total() {
        let cal = trip();
        for count in 0..40i64 {
            let entries: Vec<BudgetEntry> = (0..count)
                .map(|i| {
                    // dates sweep from well before to well after the trip
                    let day = 5 + (i * 7) % 25;
                    let amount = (i * 37) % 1000 + 1;
                    entry(i, &format!("2025-03-{day:02}"), amount, BudgetCategory::ALL[(i % 7) as usize])
                })
                .collect();
            let expected: Decimal = entries.iter().map(|e| e.amount).sum();
            let ledger = BudgetLedger::for_trip(&cal, entries);
            assert_eq!(ledger.grand_total(), expected);
            assert_eq!(ledger.cumulative_through(cal.end()), expected);
            let daily: Decimal = ledger.daily_totals().iter().map(|d| d.total).sum();
            assert_eq!(daily, expected);
            let mut running = Decimal::ZERO;
            for (_, day) in cal.days() {
                let through = ledger.cumulative_through(day);
                assert!(through >= running);
                running = through;
            }
        }
    }

    #[test]
    fn empty_ledger_summary() {
        let summary = BudgetLedger::default().summary();
        assert_eq!(summary.total, Decimal::ZERO);
        assert!(summary.highest_day.is_none());
        assert!(summary.top_categories.is_empty());
    }
}
