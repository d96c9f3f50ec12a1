use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use backwatch::clock::Clock;
use backwatch::config::Settings;
use backwatch::connectivity::ConnectivityProbe;
use backwatch::errors::{BackwatchError, Result};
use backwatch::notify::{Notification, Notifier};
use backwatch::session::{BackupSession, Collaborators};
use backwatch::state::MemoryStateStore;
use chrono::{DateTime, TimeDelta, Utc};

use crate::fake_backend::FakeSyncBackend;

/// Connectivity probe with a switchable answer; counts how often it was asked.
#[derive(Clone)]
pub struct FakeProbe {
    online: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl FakeProbe {
    pub fn online() -> Self {
        Self {
            online: Arc::new(AtomicBool::new(true)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn offline() -> Self {
        let probe = Self::online();
        probe.set_online(false);
        probe
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConnectivityProbe for FakeProbe {
    fn is_online(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let online = self.online.load(Ordering::SeqCst);
        Box::pin(async move { online })
    }
}

/// Notifier that keeps every message; optionally rejects them all.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    reject: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        let notifier = Self::new();
        notifier.reject.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(notification.clone());
            if self.reject.load(Ordering::SeqCst) {
                return Err(BackwatchError::NotificationError(
                    "rejected by test notifier".to_string(),
                ));
            }
            Ok(())
        })
    }
}

/// A clock that only moves when told to.
#[derive(Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut guard = self.now.lock().unwrap();
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// All the fakes a session needs, with handles kept for assertions.
#[derive(Clone)]
pub struct SessionHarness {
    pub store: MemoryStateStore,
    pub backend: FakeSyncBackend,
    pub probe: FakeProbe,
    pub notifier: RecordingNotifier,
    pub clock: FixedClock,
}

impl SessionHarness {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            store: MemoryStateStore::new(),
            backend: FakeSyncBackend::new(),
            probe: FakeProbe::online(),
            notifier: RecordingNotifier::new(),
            clock: FixedClock::at(now),
        }
    }

    pub fn with_store(mut self, store: MemoryStateStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_backend(mut self, backend: FakeSyncBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_probe(mut self, probe: FakeProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_notifier(mut self, notifier: RecordingNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Collaborators sharing state with this harness. The notifier is only
    /// wired in when `notify` is set.
    pub fn collaborators(&self, notify: bool) -> Collaborators {
        let notifier: Option<Box<dyn Notifier>> = if notify {
            Some(Box::new(self.notifier.clone()))
        } else {
            None
        };
        Collaborators {
            store: Box::new(self.store.clone()),
            backend: Arc::new(self.backend.clone()),
            probe: Box::new(self.probe.clone()),
            notifier,
            clock: Arc::new(self.clock.clone()),
        }
    }

    pub fn open(&self, settings: &Settings) -> Result<BackupSession> {
        BackupSession::open(settings, self.collaborators(settings.notify))
    }
}
