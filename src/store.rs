use crate::action::Action;
use crate::reducer::reduce;
use crate::state::Session;
use std::sync::{Arc, Mutex, MutexGuard};

/// Session の保持者。dispatch のたびにスナップショットを差し替える
#[derive(Debug, Default)]
pub struct Store {
    current: Mutex<Arc<Session>>,
}

impl Store {
    pub fn new(initial: Session) -> Self {
        Self {
            current: Mutex::new(Arc::new(initial)),
        }
    }

    pub fn dispatch(&self, action: Action) {
        tracing::trace!(?action, "dispatch");
        let mut current = self.lock();
        let next = reduce(&current, action);
        *current = Arc::new(next);
    }

    pub fn state(&self) -> Arc<Session> {
        Arc::clone(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Arc<Session>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// 開始アクションを発行し、スコープを抜けるときに終了アクションを必ず 1 回発行する
pub struct Bracket<'a> {
    store: &'a Store,
    terminal: Option<Action>,
}

impl<'a> Bracket<'a> {
    pub fn open(store: &'a Store, start: Action, fallback: Action) -> Self {
        store.dispatch(start);
        Self {
            store,
            terminal: Some(fallback),
        }
    }

    /// 成功時など、既定とは別の終了アクションで閉じる
    pub fn close_with(mut self, action: Action) {
        self.terminal = None;
        self.store.dispatch(action);
    }
}

impl Drop for Bracket<'_> {
    fn drop(&mut self) {
        if let Some(action) = self.terminal.take() {
            self.store.dispatch(action);
        }
    }
}
