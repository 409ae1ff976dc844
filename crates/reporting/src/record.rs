//! Revenue record model and the ROI write-time invariant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use revdesk_core::{RecordId, UserId};

use crate::timestamp::{TimestampError, normalize_timestamp};

/// ROI for a single record or a group: `revenue / spend`, zero when spend is zero.
pub fn compute_roi(spend: f64, revenue: f64) -> f64 {
    if spend != 0.0 { revenue / spend } else { 0.0 }
}

/// Round to 2 decimal places for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Client input for creating or replacing a revenue record.
///
/// There is no `roi` field: any value a client sends is ignored and the
/// metric is recomputed from `expenditure` and `revenue`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RevenueDraft {
    pub ad_platform: String,
    pub product_categories: String,
    pub ad_type: String,
    pub region: String,
    pub expenditure: f64,
    pub order_count: i64,
    pub ad_creation_count: i64,
    pub revenue: f64,
    /// Free-text instant; see [`crate::timestamp`]. Empty means "not supplied".
    pub record_time: String,
    pub remark: String,
}

impl RevenueDraft {
    /// Resolve the supplied instant, if any.
    pub fn parsed_record_time(&self) -> Result<Option<DateTime<Utc>>, TimestampError> {
        if self.record_time.is_empty() {
            return Ok(None);
        }
        normalize_timestamp(&self.record_time).map(Some)
    }
}

/// A stored revenue record.
///
/// `roi` is private: the only ways to set it are [`RevenueRecord::create`] and
/// [`RevenueRecord::apply`], both of which recompute it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueRecord {
    pub id: RecordId,
    pub user_id: UserId,
    pub ad_platform: String,
    pub product_categories: String,
    pub ad_type: String,
    pub region: String,
    pub expenditure: f64,
    pub order_count: i64,
    pub ad_creation_count: i64,
    pub revenue: f64,
    roi: f64,
    pub record_time: DateTime<Utc>,
    pub remark: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RevenueRecord {
    /// Build a new record owned by `owner`. Without a supplied instant the
    /// record is stamped with `now`.
    pub fn create(
        id: RecordId,
        owner: UserId,
        draft: RevenueDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, TimestampError> {
        let record_time = draft.parsed_record_time()?.unwrap_or(now);
        let mut record = Self {
            id,
            user_id: owner,
            ad_platform: draft.ad_platform,
            product_categories: draft.product_categories,
            ad_type: draft.ad_type,
            region: draft.region,
            expenditure: draft.expenditure,
            order_count: draft.order_count,
            ad_creation_count: draft.ad_creation_count,
            revenue: draft.revenue,
            roi: 0.0,
            record_time,
            remark: draft.remark,
            created_at: now,
            updated_at: now,
        };
        record.recompute_roi();
        Ok(record)
    }

    /// Replace every editable field with the draft's. Without a supplied
    /// instant the existing one is kept. On error nothing is modified.
    pub fn apply(&mut self, draft: RevenueDraft, now: DateTime<Utc>) -> Result<(), TimestampError> {
        let record_time = draft.parsed_record_time()?;

        self.ad_platform = draft.ad_platform;
        self.product_categories = draft.product_categories;
        self.ad_type = draft.ad_type;
        self.region = draft.region;
        self.expenditure = draft.expenditure;
        self.order_count = draft.order_count;
        self.ad_creation_count = draft.ad_creation_count;
        self.revenue = draft.revenue;
        self.remark = draft.remark;
        if let Some(t) = record_time {
            self.record_time = t;
        }
        self.updated_at = now;
        self.recompute_roi();
        Ok(())
    }

    pub fn roi(&self) -> f64 {
        self.roi
    }

    fn recompute_roi(&mut self) {
        self.roi = compute_roi(self.expenditure, self.revenue);
    }

    /// Presentation copy with money figures and ROI rounded to 2 dp.
    pub fn view(&self) -> RevenueView {
        RevenueView {
            id: self.id,
            user_id: self.user_id,
            nickname: None,
            avatar: None,
            ad_platform: self.ad_platform.clone(),
            product_categories: self.product_categories.clone(),
            ad_type: self.ad_type.clone(),
            region: self.region.clone(),
            expenditure: round2(self.expenditure),
            order_count: self.order_count,
            ad_creation_count: self.ad_creation_count,
            revenue: round2(self.revenue),
            roi: round2(self.roi),
            record_time: self.record_time,
            remark: self.remark.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Rendered revenue record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueView {
    pub id: RecordId,
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub ad_platform: String,
    pub product_categories: String,
    pub ad_type: String,
    pub region: String,
    pub expenditure: f64,
    pub order_count: i64,
    pub ad_creation_count: i64,
    pub revenue: f64,
    pub roi: f64,
    pub record_time: DateTime<Utc>,
    pub remark: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RevenueView {
    pub fn with_owner(mut self, nickname: impl Into<String>, avatar: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self.avatar = Some(avatar.into());
        self
    }
}
