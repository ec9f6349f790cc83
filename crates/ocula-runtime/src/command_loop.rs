//! Async command receiver
//!
//! The byte transport between processes lives elsewhere; it hands complete
//! messages to this loop through a bounded channel.

use std::sync::Arc;

use ocula_command::{Command, CommandDispatchRegistry, DispatchStats};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::RuntimeConfig;

/// Inbound message sender, for the transport side
pub type CommandSender = mpsc::Sender<Vec<u8>>;

/// Inbound message receiver, consumed by [`start_command_loop`]
pub type CommandReceiver = mpsc::Receiver<Vec<u8>>;

/// Counters reported when the loop ends
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandLoopStats {
    pub received: u64,
    pub decode_errors: u64,
    /// Outcomes of messages this loop dispatched
    pub dispatch: DispatchStats,
}

/// Bounded channel sized from the config
pub fn command_channel(config: &RuntimeConfig) -> (CommandSender, CommandReceiver) {
    mpsc::channel(config.command_queue_size)
}

/// Start the command receive loop.
///
/// Each message is decoded as a JSON [`Command`] and dispatched on the task.
/// Undecodable messages are logged and dropped. The loop ends once every
/// sender is dropped.
pub fn start_command_loop(
    registry: Arc<CommandDispatchRegistry>,
    mut rx: CommandReceiver,
) -> JoinHandle<CommandLoopStats> {
    tokio::spawn(async move {
        let mut stats = CommandLoopStats::default();
        while let Some(message) = rx.recv().await {
            stats.received += 1;
            match Command::from_json(&message) {
                Ok(command) => stats.dispatch.record(registry.dispatch(&command)),
                Err(e) => {
                    stats.decode_errors += 1;
                    warn!(error = %e, len = message.len(), "undecodable command dropped");
                }
            }
        }
        debug!(received = stats.received, "command loop finished");
        stats
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AvatarSession;
    use ocula_command::ENABLE_FPS_ASSUMED_RIGHT_HAND;
    use ocula_core::BehaviorFlag;

    #[tokio::test]
    async fn test_loop_dispatches_and_reports() {
        let config = RuntimeConfig::default();
        let (_session, handles) = AvatarSession::assemble(config.clone()).unwrap();
        let (tx, rx) = command_channel(&config);
        let task = start_command_loop(Arc::clone(&handles.registry), rx);

        let toggle = Command::new(ENABLE_FPS_ASSUMED_RIGHT_HAND, true);
        tx.send(toggle.to_json().unwrap()).await.unwrap();
        tx.send(br#"{"command":"Unheard","payload":1}"#.to_vec())
            .await
            .unwrap();
        tx.send(br#"{"command":"ExTrackerEnable","payload":"sometimes"}"#.to_vec())
            .await
            .unwrap();
        tx.send(b"\x00garbage".to_vec()).await.unwrap();
        drop(tx);

        let stats = task.await.unwrap();
        assert_eq!(stats.received, 4);
        assert_eq!(stats.decode_errors, 1);
        assert_eq!(
            stats.dispatch,
            DispatchStats {
                handled: 1,
                unknown: 1,
                malformed: 1
            }
        );
        assert!(handles.flags.get(BehaviorFlag::FpsAssumedRightHand));
        assert!(!handles.flags.get(BehaviorFlag::ExternalTracker));
    }

    #[tokio::test]
    async fn test_loop_counts_only_its_own_dispatches() {
        let config = RuntimeConfig::default();
        let (_session, handles) = AvatarSession::assemble(config.clone()).unwrap();
        handles.registry.dispatch_parts(ENABLE_FPS_ASSUMED_RIGHT_HAND, true);
        handles.registry.dispatch_parts("Elsewhere", true);

        let (tx, rx) = command_channel(&config);
        let task = start_command_loop(Arc::clone(&handles.registry), rx);
        let toggle = Command::new(ENABLE_FPS_ASSUMED_RIGHT_HAND, false);
        tx.send(toggle.to_json().unwrap()).await.unwrap();
        drop(tx);

        let stats = task.await.unwrap();
        assert_eq!(
            stats.dispatch,
            DispatchStats {
                handled: 1,
                unknown: 0,
                malformed: 0
            }
        );
        assert_eq!(handles.registry.stats().total(), 3);
    }

    #[tokio::test]
    async fn test_loop_ends_when_senders_drop() {
        let config = RuntimeConfig::default();
        let (_session, handles) = AvatarSession::assemble(config.clone()).unwrap();
        let (tx, rx) = command_channel(&config);
        let task = start_command_loop(handles.registry, rx);
        drop(tx);
        let stats = task.await.unwrap();
        assert_eq!(stats, CommandLoopStats::default());
    }
}
