//! Single-slot, auto-dismissing status notifications.
//!
//! States: idle → shown → idle when the timer expires; a new `show` while
//! shown replaces the text and restarts the timer. The controller owns the
//! only timer task; a superseded timer is aborted and, if it already woke,
//! its stale generation keeps it from clearing the newer notification.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
    pub expires_at: Instant,
}

#[derive(Debug, Default)]
struct SlotState {
    current: Option<Notification>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<SlotState>,
    tx: watch::Sender<Option<Notification>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
pub struct NotificationController {
    shared: Arc<Shared>,
    ttl: Duration,
}

impl NotificationController {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(3);

    pub fn new(ttl: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SlotState::default()),
                tx,
            }),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Replaces the visible notification and restarts the dismissal timer.
    ///
    /// Outside a Tokio runtime the notification is shown without a timer and
    /// stays until the next `show` or `clear`.
    pub fn show(&self, kind: NotificationKind, text: impl Into<String>) {
        let text = text.into();
        let notification = Notification {
            kind,
            text,
            expires_at: Instant::now() + self.ttl,
        };

        let mut state = self.shared.lock();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        let generation = state.generation;

        match kind {
            NotificationKind::Success => tracing::info!(text = %notification.text, "notification"),
            NotificationKind::Error => tracing::warn!(text = %notification.text, "notification"),
        }
        state.current = Some(notification.clone());
        self.shared.tx.send_replace(Some(notification));

        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("no tokio runtime; notification will not auto-dismiss");
            return;
        };
        let shared = Arc::clone(&self.shared);
        let ttl = self.ttl;
        state.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut state = shared.lock();
            if state.generation != generation {
                return;
            }
            state.current = None;
            state.timer = None;
            shared.tx.send_replace(None);
            tracing::debug!(generation, "notification expired");
        }));
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(NotificationKind::Success, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(NotificationKind::Error, text);
    }

    /// Hides the notification now and cancels its timer.
    pub fn clear(&self) {
        let mut state = self.shared.lock();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        if state.current.take().is_some() {
            self.shared.tx.send_replace(None);
        }
    }

    /// The visible notification, if any.
    pub fn current(&self) -> Option<Notification> {
        self.shared.lock().current.clone()
    }

    /// Number of `show`/`clear` transitions so far.
    pub fn generation(&self) -> u64 {
        self.shared.lock().generation
    }

    /// Whether a dismissal timer is pending.
    pub fn has_timer(&self) -> bool {
        self.shared
            .lock()
            .timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Follows notification changes (for renderers).
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.shared.tx.subscribe()
    }
}

impl Default for NotificationController {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

impl Drop for NotificationController {
    fn drop(&mut self) {
        if let Some(timer) = self.shared.lock().timer.take() {
            timer.abort();
        }
    }
}
