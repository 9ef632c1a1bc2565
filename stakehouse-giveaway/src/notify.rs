use crate::drawing::Drawing;
use async_trait::async_trait;

/// Fire-and-forget presentation hooks.
///
/// Implementations live with the transport (chat embeds, webhooks). The
/// engine logs a failed notification and moves on; it never rolls back the
/// state change that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// A drawing resolved with a winner.
    async fn resolution(&self, drawing: &Drawing) -> anyhow::Result<()>;

    /// A drawing resolved with no winner.
    async fn no_winner(&self, drawing: &Drawing) -> anyhow::Result<()>;

    /// The winner's double-down sub-game settled.
    async fn double_down_outcome(&self, drawing: &Drawing) -> anyhow::Result<()>;
}

/// Notifier that drops everything, for embedders without a presentation
/// layer and for tests.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn resolution(&self, _drawing: &Drawing) -> anyhow::Result<()> {
        Ok(())
    }

    async fn no_winner(&self, _drawing: &Drawing) -> anyhow::Result<()> {
        Ok(())
    }

    async fn double_down_outcome(&self, _drawing: &Drawing) -> anyhow::Result<()> {
        Ok(())
    }
}
