//! Ordering, paging and per-owner aggregation over revenue records.

use std::collections::BTreeMap;

use serde::Serialize;

use revdesk_core::UserId;

use crate::query::{Page, PageRequest, RevenueFilter};
use crate::record::{RevenueRecord, compute_roi, round2};

/// Filter, order (newest instant first, then highest id) and page.
pub fn paginate_records<'a, I>(
    records: I,
    filter: &RevenueFilter,
    request: PageRequest,
) -> Page<RevenueRecord>
where
    I: IntoIterator<Item = &'a RevenueRecord>,
{
    let mut rows: Vec<RevenueRecord> = records
        .into_iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.record_time.cmp(&a.record_time).then(b.id.cmp(&a.id)));
    Page::slice(rows, request)
}

/// Totals for one owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerSummary {
    pub user_id: UserId,
    pub nickname: String,
    pub expenditure: f64,
    pub revenue: f64,
    pub order_count: i64,
    pub ad_creation_count: i64,
    /// Σrevenue / Σexpenditure; never the mean of per-record ROIs.
    pub roi: f64,
}

impl OwnerSummary {
    fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            nickname: String::new(),
            expenditure: 0.0,
            revenue: 0.0,
            order_count: 0,
            ad_creation_count: 0,
            roi: 0.0,
        }
    }

    fn absorb(&mut self, record: &RevenueRecord) {
        self.expenditure += record.expenditure;
        self.revenue += record.revenue;
        self.order_count = self.order_count.saturating_add(record.order_count);
        self.ad_creation_count = self.ad_creation_count.saturating_add(record.ad_creation_count);
    }

    /// Money figures and ROI rounded to 2 dp.
    pub fn rounded(mut self) -> Self {
        self.expenditure = round2(self.expenditure);
        self.revenue = round2(self.revenue);
        self.roi = round2(self.roi);
        self
    }
}

/// Group matching records by owner, ordered by owner id, and page the groups.
///
/// `nickname_of` resolves display names; unknown owners get an empty name.
pub fn summarize_by_owner<'a, I, F>(
    records: I,
    filter: &RevenueFilter,
    request: PageRequest,
    nickname_of: F,
) -> Page<OwnerSummary>
where
    I: IntoIterator<Item = &'a RevenueRecord>,
    F: Fn(UserId) -> Option<String>,
{
    let mut groups: BTreeMap<UserId, OwnerSummary> = BTreeMap::new();
    for record in records.into_iter().filter(|r| filter.matches(r)) {
        groups
            .entry(record.user_id)
            .or_insert_with(|| OwnerSummary::empty(record.user_id))
            .absorb(record);
    }

    let rows = groups
        .into_values()
        .map(|mut group| {
            group.roi = compute_roi(group.expenditure, group.revenue);
            group.nickname = nickname_of(group.user_id).unwrap_or_default();
            group
        })
        .collect();

    Page::slice(rows, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use revdesk_core::RecordId;

    use crate::query::DateRange;
    use crate::record::RevenueDraft;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn record(id: u64, owner: u64, spend: f64, revenue: f64, at: DateTime<Utc>) -> RevenueRecord {
        let draft = RevenueDraft {
            expenditure: spend,
            revenue,
            order_count: 2,
            ad_creation_count: 1,
            record_time: at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ..RevenueDraft::default()
        };
        RevenueRecord::create(RecordId::new(id), UserId::new(owner), draft, base()).unwrap()
    }

    #[test]
    fn thirteen_rows_limit_six_gives_three_pages() {
        let rows: Vec<_> = (1..=13)
            .map(|i| record(i, 1, 10.0, 20.0, base() + Duration::hours(i as i64)))
            .collect();

        let page = paginate_records(&rows, &RevenueFilter::default(), PageRequest::new(3, 6));
        assert_eq!(page.total, 13);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data.len(), 1);
        // Oldest row lands last.
        assert_eq!(page.data[0].id, RecordId::new(1));
    }

    #[test]
    fn newest_first_then_highest_id() {
        let rows = vec![
            record(1, 1, 1.0, 1.0, base()),
            record(2, 1, 1.0, 1.0, base() + Duration::days(1)),
            record(3, 1, 1.0, 1.0, base()),
        ];
        let page = paginate_records(&rows, &RevenueFilter::default(), PageRequest::default());
        let ids: Vec<u64> = page.data.iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn owner_and_range_filters_combine() {
        let rows = vec![
            record(1, 1, 1.0, 1.0, base()),
            record(2, 2, 1.0, 1.0, base()),
            record(3, 1, 1.0, 1.0, base() + Duration::days(30)),
        ];
        let filter = RevenueFilter {
            owner: Some(UserId::new(1)),
            range: Some(DateRange::from_days("2025-03-01", "2025-03-01").unwrap()),
        };
        let page = paginate_records(&rows, &filter, PageRequest::default());
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].id, RecordId::new(1));
    }

    #[test]
    fn group_roi_is_ratio_of_sums() {
        // Per-record ROIs are 2.0 and 0.0; their mean would be 1.0.
        let rows = vec![
            record(1, 5, 200.0, 400.0, base()),
            record(2, 5, 200.0, 100.0, base()),
            record(3, 5, 0.0, 0.0, base()),
        ];
        let page = summarize_by_owner(
            &rows,
            &RevenueFilter::default(),
            PageRequest::default(),
            |_| Some("Alice".to_string()),
        );
        assert_eq!(page.total, 1);
        let group = &page.data[0];
        assert_eq!(group.expenditure, 400.0);
        assert_eq!(group.revenue, 500.0);
        assert_eq!(group.roi, 1.25);
        assert_eq!(group.order_count, 6);
        assert_eq!(group.ad_creation_count, 3);
        assert_eq!(group.nickname, "Alice");
    }

    #[test]
    fn roi_of_hundred_and_three_hundred_spend_is_one_twenty_five() {
        let rows = vec![
            record(1, 7, 100.0, 50.0, base()),
            record(2, 7, 300.0, 450.0, base()),
        ];
        let page = summarize_by_owner(&rows, &RevenueFilter::default(), PageRequest::default(), |_| None);
        let group = &page.data[0];
        assert_eq!(group.expenditure, 400.0);
        assert_eq!(group.revenue, 500.0);
        assert_eq!(group.roi, 1.25);
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let huge = |id: u64| {
            let draft = RevenueDraft {
                expenditure: 1.0,
                revenue: 1.0,
                order_count: i64::MAX,
                ad_creation_count: i64::MAX,
                record_time: "2025-03-01 09:00:00".to_string(),
                ..RevenueDraft::default()
            };
            RevenueRecord::create(RecordId::new(id), UserId::new(1), draft, base()).unwrap()
        };
        let rows = vec![huge(1), huge(2)];
        let page = summarize_by_owner(&rows, &RevenueFilter::default(), PageRequest::default(), |_| None);
        assert_eq!(page.data[0].order_count, i64::MAX);
        assert_eq!(page.data[0].ad_creation_count, i64::MAX);
    }

    #[test]
    fn groups_are_ordered_by_owner_and_paged() {
        let rows = vec![
            record(1, 9, 1.0, 1.0, base()),
            record(2, 3, 1.0, 1.0, base()),
            record(3, 6, 1.0, 1.0, base()),
        ];
        let page = summarize_by_owner(
            &rows,
            &RevenueFilter::default(),
            PageRequest::new(1, 2),
            |_| None,
        );
        let owners: Vec<u64> = page.data.iter().map(|g| g.user_id.get()).collect();
        assert_eq!(owners, vec![3, 6]);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data[0].nickname, "");
    }

    #[test]
    fn zero_spend_group_has_zero_roi() {
        let rows = vec![record(1, 1, 0.0, 50.0, base())];
        let page = summarize_by_owner(&rows, &RevenueFilter::default(), PageRequest::default(), |_| None);
        assert_eq!(page.data[0].roi, 0.0);
    }

    #[test]
    fn rounded_summary_keeps_counts() {
        let rows = vec![record(1, 1, 3.0, 10.0, base())];
        let page = summarize_by_owner(&rows, &RevenueFilter::default(), PageRequest::default(), |_| None);
        let group = page.data[0].clone().rounded();
        assert_eq!(group.roi, 3.33);
        assert_eq!(group.order_count, 2);
    }

    proptest! {
        /// Property: page sizes across all pages add up to the total.
        #[test]
        fn pages_partition_the_rows(count in 0usize..60, limit in 1u64..15) {
            let rows: Vec<_> = (0..count)
                .map(|i| record(i as u64 + 1, 1, 1.0, 1.0, base() + Duration::minutes(i as i64)))
                .collect();
            let first = paginate_records(&rows, &RevenueFilter::default(), PageRequest::new(1, limit));
            let mut seen = 0usize;
            for page in 1..=first.total_pages {
                let p = paginate_records(&rows, &RevenueFilter::default(), PageRequest::new(page, limit));
                prop_assert!(p.data.len() as u64 <= limit);
                seen += p.data.len();
            }
            prop_assert_eq!(seen, count);
        }
    }
}
