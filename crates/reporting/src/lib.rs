//! Revenue reporting: record model, timestamp normalization, filtering,
//! paging and per-owner aggregation.

pub mod query;
pub mod record;
pub mod summary;
pub mod timestamp;

pub use query::{DateRange, ListParams, Page, PageRequest, RawListQuery, RevenueFilter};
pub use record::{RevenueDraft, RevenueRecord, RevenueView, compute_roi, round2};
pub use summary::{OwnerSummary, paginate_records, summarize_by_owner};
pub use timestamp::{Shape, TimestampError, normalize_timestamp, normalize_with_shape};
