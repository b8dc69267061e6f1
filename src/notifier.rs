//! Notification seam.
//!
//! The engine only emits a single best-effort "booking succeeded" signal after
//! a successful create; delivery guarantees belong to the external notifier.
//! Failures are logged and never affect the committed transaction.

use async_trait::async_trait;

/// External notification collaborator.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        account_id: i64,
        title: &str,
        message: &str,
        kind: &str,
    ) -> anyhow::Result<()>;
}

/// Default notifier that records the signal in the log stream.
#[derive(Debug, Default, Clone)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(
        &self,
        account_id: i64,
        title: &str,
        message: &str,
        kind: &str,
    ) -> anyhow::Result<()> {
        tracing::info!(
            account_id = account_id,
            title = %title,
            message = %message,
            kind = %kind,
            "NOTIFICATION"
        );
        Ok(())
    }
}
