//! Notifier port: deliver user-facing notifications.

use std::future::Future;

use rainhub_domain::error::RainHubError;
use rainhub_domain::notification::Notification;

/// Delivers a [`Notification`] to whoever should read it (push, log, …).
pub trait Notifier {
    fn notify(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), RainHubError>> + Send;
}

impl<T: Notifier + Send + Sync> Notifier for std::sync::Arc<T> {
    fn notify(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), RainHubError>> + Send {
        (**self).notify(notification)
    }
}
