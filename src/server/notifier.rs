// src/server/notifier.rs

use tokio::sync::broadcast;
use tracing::debug;

use crate::engine::{CompletionSignal, ReloadSink};
use crate::types::AssetClass;

/// Notification sent to SSE clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerNotification {
    /// A build of `class` finished; reload the page.
    Reload { class: AssetClass },
    /// Server is shutting down, close connection.
    Shutdown,
}

/// Fan-out of reload notifications to every connected browser.
///
/// Cloning is cheap; all clones share one broadcast channel.
#[derive(Debug, Clone)]
pub struct ReloadNotifier {
    tx: broadcast::Sender<ServerNotification>,
}

impl ReloadNotifier {
    /// `capacity` bounds how many notifications a slow client may lag
    /// behind before it starts skipping (a lagged client reloads anyway).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerNotification> {
        self.tx.subscribe()
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(ServerNotification::Shutdown);
    }
}

impl Default for ReloadNotifier {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ReloadSink for ReloadNotifier {
    fn notify(&self, signal: CompletionSignal) {
        // No connected clients is not an error.
        let clients = self
            .tx
            .send(ServerNotification::Reload {
                class: signal.class,
            })
            .unwrap_or(0);
        debug!(id = signal.id, class = %signal.class, clients, "reload broadcast");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BuildOutcome;

    #[tokio::test]
    async fn every_completion_reaches_every_client() {
        let notifier = ReloadNotifier::default();
        let mut a = notifier.subscribe();
        let mut b = notifier.subscribe();

        notifier.notify(CompletionSignal {
            id: 1,
            class: AssetClass::Styles,
            outcome: BuildOutcome::Ok,
        });
        notifier.notify(CompletionSignal {
            id: 2,
            class: AssetClass::Templates,
            outcome: BuildOutcome::Errored(3),
        });

        for rx in [&mut a, &mut b] {
            assert_eq!(
                rx.recv().await.unwrap(),
                ServerNotification::Reload {
                    class: AssetClass::Styles
                }
            );
            assert_eq!(
                rx.recv().await.unwrap(),
                ServerNotification::Reload {
                    class: AssetClass::Templates
                }
            );
        }
    }

    #[test]
    fn notify_without_clients_is_fine() {
        let notifier = ReloadNotifier::new(4);
        notifier.notify(CompletionSignal {
            id: 1,
            class: AssetClass::Images,
            outcome: BuildOutcome::Ok,
        });
    }
}
