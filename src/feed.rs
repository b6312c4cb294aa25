//! Gallery feed: the capped, newest-first view of recent visits.

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::models::VisitRecord;
use crate::store::RecordStore;

/// Recent visits for the configured tag.
///
/// Refreshing never fails loudly: when the store is unreachable the
/// previously fetched contents stay on display. Safe to call repeatedly.
#[derive(Debug, Default)]
pub struct Feed {
    pub visits: Vec<VisitRecord>,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh<R: RecordStore>(&mut self, store: &R, cfg: &AppConfig) {
        match store
            .recent_visits(&cfg.table, &cfg.tracking_code, cfg.feed_limit)
            .await
        {
            Ok(visits) => self.visits = visits,
            Err(err) => tracing::debug!("feed refresh failed, keeping stale view: {}", err),
        }
    }
}

/// Compact "how long ago" label for gallery entries.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let mins = (now - then).num_minutes().max(0);
    if mins < 1 {
        return "just now".to_string();
    }
    if mins < 60 {
        return format!("{}m ago", mins);
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    let days = hours / 24;
    if days < 30 {
        return format!("{}d ago", days);
    }
    let months = days / 30;
    if months < 12 {
        return format!("{}mo ago", months);
    }
    format!("{}y ago", months / 12)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewVisit;
    use crate::store::StoreError;
    use chrono::TimeDelta;
    use std::path::PathBuf;

    struct FakeRecords {
        rows: Result<Vec<VisitRecord>, ()>,
    }

    impl RecordStore for FakeRecords {
        async fn insert_visit(&self, _table: &str, _visit: &NewVisit) -> Result<(), StoreError> {
            unreachable!("feed never inserts")
        }

        async fn recent_visits(
            &self,
            _table: &str,
            _tracking_code: &str,
            _limit: u32,
        ) -> Result<Vec<VisitRecord>, StoreError> {
            match &self.rows {
                Ok(rows) => Ok(rows.clone()),
                Err(()) => Err(StoreError::UnexpectedStatus {
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    body: "down".into(),
                }),
            }
        }
    }

    fn visit(id: i64, minutes_ago: i64) -> VisitRecord {
        VisitRecord {
            id,
            created_at: Utc::now() - TimeDelta::minutes(minutes_ago),
            nickname: None,
            message: None,
            lat: None,
            lon: None,
            photo_url: format!("https://cdn.test/{}.jpg", id),
        }
    }

    fn test_config() -> AppConfig {
        AppConfig {
            base_url: "https://proj.supabase.co".into(),
            anon_key: "anon".into(),
            tracking_code: "D98MYP".into(),
            bucket: "tb-tbb2qbe".into(),
            table: "tb_visits".into(),
            tag_label: "TBB2QBE".into(),
            max_dimension: 1600,
            jpeg_quality: 80,
            feed_limit: 60,
            state_file: PathBuf::from("/tmp/tblog-feed-test.json"),
            location_command: None,
        }
    }

    #[tokio::test]
    async fn refresh_replaces_the_view_in_store_order() {
        let cfg = test_config();
        let store = FakeRecords {
            rows: Ok(vec![visit(3, 1), visit(2, 10), visit(1, 120)]),
        };

        let mut feed = Feed::new();
        feed.refresh(&store, &cfg).await;
        let ids: Vec<i64> = feed.visits.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn a_failed_refresh_keeps_the_previous_view() {
        let cfg = test_config();
        let mut feed = Feed::new();

        feed.refresh(
            &FakeRecords {
                rows: Ok(vec![visit(1, 5), visit(2, 6)]),
            },
            &cfg,
        )
        .await;
        assert_eq!(feed.visits.len(), 2);

        feed.refresh(&FakeRecords { rows: Err(()) }, &cfg).await;
        assert_eq!(feed.visits.len(), 2, "stale view must stay on display");
    }

    #[test]
    fn time_ago_matches_the_gallery_thresholds() {
        let now = Utc::now();
        let ago = |delta: TimeDelta| time_ago(now - delta, now);

        assert_eq!(ago(TimeDelta::seconds(20)), "just now");
        assert_eq!(ago(TimeDelta::minutes(5)), "5m ago");
        assert_eq!(ago(TimeDelta::minutes(59)), "59m ago");
        assert_eq!(ago(TimeDelta::hours(3)), "3h ago");
        assert_eq!(ago(TimeDelta::hours(36)), "1d ago");
        assert_eq!(ago(TimeDelta::days(45)), "1mo ago");
        assert_eq!(ago(TimeDelta::days(400)), "1y ago");

        // Clock skew never produces negative labels.
        assert_eq!(time_ago(now + TimeDelta::minutes(10), now), "just now");
    }
}
