//! Notifier that writes notifications to the log.

use std::future::Future;

use rainhub_app::ports::Notifier;
use rainhub_domain::error::RainHubError;
use rainhub_domain::notification::{Notification, NotificationLevel};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), RainHubError>> + Send {
        match notification.level {
            NotificationLevel::Warning => tracing::warn!(
                source = %notification.source,
                title = %notification.title,
                "{}",
                notification.message
            ),
            NotificationLevel::Info => tracing::info!(
                source = %notification.source,
                title = %notification.title,
                "{}",
                notification.message
            ),
        }
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rainhub_domain::id::DeviceId;

    #[tokio::test]
    async fn should_always_succeed() {
        let notification = Notification::warning(
            DeviceId::from("rain"),
            "Rain",
            "Rain detected while open: Kitchen window",
        );
        assert!(LogNotifier.notify(notification).await.is_ok());
    }
}
