//! Sync run inputs and results.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Time horizon considered by one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

impl SyncWindow {
    /// Window from `past_days` before `now` to `future_days` after it,
    /// clamped to the representable date range.
    pub fn around(now: DateTime<Utc>, past_days: u32, future_days: u32) -> Self {
        let time_min = now
            .checked_sub_signed(Duration::days(i64::from(past_days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let time_max = now
            .checked_add_signed(Duration::days(i64::from(future_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { time_min, time_max }
    }

    /// True when `[start, end]` intersects the window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start <= self.time_max && end >= self.time_min
    }
}

/// Counters reported by a single tenant run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    /// Remote changes applied locally: `created + updated + cancelled`.
    pub pulled: u32,
    pub created: u32,
    pub updated: u32,
    pub cancelled: u32,
    pub pushed: u32,
    pub deleted: u32,
    pub remote_count: u32,
    pub local_count: u32,
    /// Per-item failures that were logged and skipped.
    pub failed: u32,
}

impl SyncSummary {
    /// True when the run changed nothing on either side.
    pub fn is_noop(&self) -> bool {
        self.created == 0
            && self.updated == 0
            && self.cancelled == 0
            && self.pushed == 0
            && self.deleted == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSyncResult {
    pub tenant_id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SyncSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TenantSyncResult {
    pub fn success(tenant_id: impl Into<String>, summary: SyncSummary) -> Self {
        Self { tenant_id: tenant_id.into(), ok: true, summary: Some(summary), error: None }
    }

    pub fn failure(tenant_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self { tenant_id: tenant_id.into(), ok: false, summary: None, error: Some(error.into()) }
    }
}

/// Aggregate result of a fan-out over every enabled integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanOutReport {
    pub success: u32,
    pub failed: u32,
    pub results: Vec<TenantSyncResult>,
}

impl FanOutReport {
    pub fn record(&mut self, result: TenantSyncResult) {
        if result.ok {
            self.success += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn window_spans_configured_horizon() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let window = SyncWindow::around(now, 90, 180);

        assert_eq!(window.time_min, now - Duration::days(90));
        assert_eq!(window.time_max, now + Duration::days(180));
        assert!(window.overlaps(now, now + Duration::hours(1)));
        assert!(!window.overlaps(now - Duration::days(200), now - Duration::days(199)));
    }

    #[test]
    fn huge_horizon_clamps_instead_of_overflowing() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let window = SyncWindow::around(now, u32::MAX, u32::MAX);

        assert_eq!(window.time_min, DateTime::<Utc>::MIN_UTC);
        assert_eq!(window.time_max, DateTime::<Utc>::MAX_UTC);
        assert!(window.overlaps(now, now));
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = SyncSummary { remote_count: 3, local_count: 2, ..Default::default() };
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["remoteCount"], 3);
        assert_eq!(json["localCount"], 2);
        assert!(summary.is_noop());
    }

    #[test]
    fn report_counts_successes_and_failures() {
        let mut report = FanOutReport::default();
        report.record(TenantSyncResult::success("t1", SyncSummary::default()));
        report.record(TenantSyncResult::failure("t2", "auth: refresh token missing"));

        assert_eq!(report.success, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.results.len(), 2);

        let json = serde_json::to_value(&report.results[1]).unwrap();
        assert_eq!(json["tenantId"], "t2");
        assert!(json.get("summary").is_none());
    }
}
