use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    pub details: Option<String>,
    pub created_at: u64,
}

/// 画面に出す通知。一定時間で自動的に消える
#[derive(Debug)]
pub struct NotificationCenter {
    ttl_ms: u64,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    items: Vec<Notification>,
}

impl Inner {
    fn prune(&mut self, ttl_ms: u64, now_ms: u64) {
        self.items
            .retain(|n| now_ms < n.created_at.saturating_add(ttl_ms));
    }
}

impl NotificationCenter {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            ttl_ms,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn push(
        &self,
        severity: Severity,
        message: impl Into<String>,
        details: Option<String>,
        now_ms: u64,
    ) -> u64 {
        let mut inner = self.lock();
        inner.prune(self.ttl_ms, now_ms);
        inner.next_id += 1;
        let id = inner.next_id;
        inner.items.push(Notification {
            id,
            severity,
            message: message.into(),
            details,
            created_at: now_ms,
        });
        id
    }

    /// 期限切れを捨ててから表示中の通知を返す
    pub fn active(&self, now_ms: u64) -> Vec<Notification> {
        let mut inner = self.lock();
        inner.prune(self.ttl_ms, now_ms);
        inner.items.clone()
    }

    pub fn dismiss(&self, id: u64) {
        self.lock().items.retain(|n| n.id != id);
    }

    /// 最後の push / active 以降に期限切れになったものも含む
    pub fn history(&self) -> Vec<Notification> {
        self.lock().items.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_ttl() {
        let center = NotificationCenter::new(5_000);
        center.push(Severity::Info, "first", None, 1_000);
        center.push(Severity::Error, "second", Some("why".to_string()), 3_000);

        assert_eq!(center.active(5_999).len(), 2);
        let left = center.active(6_000);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].message, "second");
        assert!(center.active(8_000).is_empty());
    }

    #[test]
    fn dismisses_by_id() {
        let center = NotificationCenter::new(5_000);
        let a = center.push(Severity::Success, "a", None, 0);
        let b = center.push(Severity::Success, "b", None, 0);
        assert_ne!(a, b);
        center.dismiss(a);
        let left = center.active(0);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, b);
    }

    #[test]
    fn push_drops_expired_entries() {
        let center = NotificationCenter::new(5_000);
        for t in 0..100 {
            center.push(Severity::Info, "tick", None, t * 1_000);
        }
        let kept = center.history();
        assert_eq!(kept.len(), 5);
        assert_eq!(kept[0].created_at, 95_000);
        assert_eq!(kept.last().unwrap().id, 100);
    }
}
