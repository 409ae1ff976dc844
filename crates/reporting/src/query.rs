//! Query parameters for revenue listings: paging, date range, owner filter.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use revdesk_core::{DomainError, DomainResult, UserId};

use crate::record::RevenueRecord;

/// Raw query string, exactly as clients send it.
///
/// Everything is optional text so that lenient defaults can be applied
/// instead of rejecting the request outright.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Page cursor. Both fields are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    pub const DEFAULT_PAGE: u64 = 1;
    pub const DEFAULT_LIMIT: u64 = 10;

    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Lenient parse: missing, non-numeric or < 1 falls back to the default.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: lenient_positive(page).unwrap_or(Self::DEFAULT_PAGE),
            limit: lenient_positive(limit).unwrap_or(Self::DEFAULT_LIMIT),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE, Self::DEFAULT_LIMIT)
    }
}

fn lenient_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.parse::<i64>().ok())
        .filter(|v| *v >= 1)
        .map(|v| v as u64)
}

/// Inclusive record-instant range covering whole calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// From two `YYYY-MM-DD` bounds. The end bound is moved to the last
    /// nanosecond of its day.
    pub fn from_days(start: &str, end: &str) -> DomainResult<Self> {
        let start_day = parse_day(start, "startDate")?;
        let end_day = parse_day(end, "endDate")?;

        let start = start_day.and_time(NaiveTime::MIN).and_utc();
        let end = end_day
            .checked_add_days(Days::new(1))
            .map(|next| next.and_time(NaiveTime::MIN).and_utc() - TimeDelta::nanoseconds(1))
            .ok_or_else(|| DomainError::invalid_input("endDate is out of range"))?;

        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

fn parse_day(raw: &str, field: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| DomainError::invalid_input(format!("Invalid {field} format")))
}

/// Row filter shared by listing and summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevenueFilter {
    pub owner: Option<UserId>,
    pub range: Option<DateRange>,
}

impl RevenueFilter {
    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner: Some(owner),
            range: None,
        }
    }

    pub fn matches(&self, record: &RevenueRecord) -> bool {
        self.owner.is_none_or(|o| record.user_id == o)
            && self.range.is_none_or(|r| r.contains(record.record_time))
    }
}

/// Parsed listing parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: PageRequest,
    pub filter: RevenueFilter,
}

impl ListParams {
    /// Parse the raw query. Empty strings count as absent; the date range is
    /// only applied when both bounds are present.
    pub fn from_raw(raw: &RawListQuery) -> DomainResult<Self> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().filter(|s| !s.is_empty())
        }

        let page = PageRequest::from_raw(present(&raw.page), present(&raw.limit));

        let range = match (present(&raw.start_date), present(&raw.end_date)) {
            (Some(start), Some(end)) => Some(DateRange::from_days(start, end)?),
            _ => None,
        };

        let owner = present(&raw.user_id)
            .map(|s| s.parse::<UserId>())
            .transpose()?;

        Ok(Self {
            page,
            filter: RevenueFilter { owner, range },
        })
    }

    /// Same parameters with the owner forced to `owner`.
    pub fn scoped_to(mut self, owner: UserId) -> Self {
        self.filter.owner = Some(owner);
        self
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Slice `items` (already in their final order) according to `request`.
    pub fn slice(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len() as u64;
        let data = items
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.limit()).unwrap_or(usize::MAX))
            .collect();

        Self {
            data,
            total,
            page: request.page(),
            limit: request.limit(),
            total_pages: request.total_pages(total),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}
