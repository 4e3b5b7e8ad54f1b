//! Transient user-facing notices (the alert banner).

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_NOTICE_TTL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub posted_at: DateTime<Utc>,
}

/// Notices auto-dismiss `ttl` after being posted.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    ttl: Duration,
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            notices: Vec::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn post(&mut self, kind: NoticeKind, message: impl Into<String>, now: DateTime<Utc>) {
        self.prune(now);
        self.notices.push(Notice {
            kind,
            message: message.into(),
            posted_at: now,
        });
    }

    /// Notices still visible at `now`, oldest first.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<Notice> {
        self.notices
            .iter()
            .filter(|n| !self.expired(n, now))
            .cloned()
            .collect()
    }

    /// The banner shows only the most recent visible notice.
    pub fn latest(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.notices.iter().rev().find(|n| !self.expired(n, now))
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.notices.retain(|n| !is_expired(ttl, n, now));
    }

    fn expired(&self, notice: &Notice, now: DateTime<Utc>) -> bool {
        is_expired(self.ttl, notice, now)
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

fn is_expired(ttl: Duration, notice: &Notice, now: DateTime<Utc>) -> bool {
    match (now - notice.posted_at).to_std() {
        Ok(age) => age >= ttl,
        // Posted "in the future" relative to `now`: still visible.
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + chrono::Duration::milliseconds(ms)
    }

    #[test]
    fn notices_expire_after_ttl() {
        let mut board = NoticeBoard::new(Duration::from_millis(3000));
        board.post(NoticeKind::Success, "Logged in successfully.", t(0));

        assert_eq!(board.active(t(2999)).len(), 1);
        assert!(board.active(t(3000)).is_empty());
    }

    #[test]
    fn latest_prefers_newest_visible() {
        let mut board = NoticeBoard::default();
        board.post(NoticeKind::Success, "first", t(0));
        board.post(NoticeKind::Error, "second", t(1000));

        let latest = board.latest(t(1500)).unwrap();
        assert_eq!(latest.message, "second");
        assert_eq!(latest.kind, NoticeKind::Error);

        assert_eq!(board.latest(t(3500)).unwrap().message, "second");
        assert!(board.latest(t(4000)).is_none());
    }

    #[test]
    fn posting_prunes_expired() {
        let mut board = NoticeBoard::new(Duration::from_millis(100));
        board.post(NoticeKind::Success, "old", t(0));
        board.post(NoticeKind::Success, "new", t(500));
        assert_eq!(board.active(t(0)).len(), 1);
    }
}
