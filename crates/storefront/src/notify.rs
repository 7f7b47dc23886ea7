//! User-visible notifications.
//!
//! The engine fires notifications and never waits for them. Rendering them as
//! toasts is up to the front end; the library ships a [`TracingNotifier`]
//! for headless use and a [`RecordingNotifier`] for tests.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

/// How long a confirmation stays on screen.
pub const CONFIRMATION_DURATION: Duration = Duration::from_millis(2000);
/// How long the "added to cart" toast stays on screen.
pub const ADDED_DURATION: Duration = Duration::from_millis(3000);
/// Default duration for error toasts.
pub const ERROR_DURATION: Duration = Duration::from_millis(4000);
/// Delay before the UI follows a login redirect.
pub const LOGIN_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// Tone of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Follow-up the UI may offer alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    /// A "View Cart" button.
    ViewCart,
    /// Navigate to the login page after `after`.
    RedirectToLogin { after: Duration },
}

/// A message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub duration: Duration,
    pub action: Option<NotificationAction>,
}

impl Notification {
    /// A success message.
    #[must_use]
    pub fn success(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            duration,
            action: None,
        }
    }

    /// An error message.
    #[must_use]
    pub fn error(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
            duration,
            action: None,
        }
    }

    /// Attach a follow-up action.
    #[must_use]
    pub const fn with_action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// Fire-and-forget notification sink.
pub trait Notifier {
    /// Deliver `notification`. Must not block on the user.
    fn notify(&self, notification: Notification);
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Writes notifications to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let duration_ms = u64::try_from(notification.duration.as_millis()).unwrap_or(u64::MAX);
        match notification.kind {
            NotificationKind::Success => tracing::info!(
                duration_ms,
                action = ?notification.action,
                "{}",
                notification.message
            ),
            NotificationKind::Error => tracing::warn!(
                duration_ms,
                action = ?notification.action,
                "{}",
                notification.message
            ),
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.received.lock().clone()
    }

    /// Messages received so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.received
            .lock()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    /// The most recent notification.
    #[must_use]
    pub fn last(&self) -> Option<Notification> {
        self.received.lock().last().cloned()
    }

    /// Drain and return everything received so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.received.lock())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.received.lock().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier() {
        let recorder = RecordingNotifier::new();
        recorder.notify(Notification::success("Cart cleared", CONFIRMATION_DURATION));
        recorder.notify(
            Notification::error("Please login", ERROR_DURATION).with_action(
                NotificationAction::RedirectToLogin {
                    after: LOGIN_REDIRECT_DELAY,
                },
            ),
        );

        assert_eq!(recorder.messages(), vec!["Cart cleared", "Please login"]);
        assert_eq!(
            recorder.last().and_then(|n| n.action),
            Some(NotificationAction::RedirectToLogin {
                after: LOGIN_REDIRECT_DELAY
            })
        );

        assert_eq!(recorder.take().len(), 2);
        assert!(recorder.notifications().is_empty());
    }

    #[test]
    fn test_notifier_through_arc() {
        let recorder = Arc::new(RecordingNotifier::new());
        let sink: Arc<dyn Notifier> = recorder.clone();
        sink.notify(Notification::success("hi", CONFIRMATION_DURATION));
        assert_eq!(recorder.messages(), vec!["hi"]);
    }
}
