use std::sync::{Arc, mpsc};
use std::thread;

use engine::{Command, DataProvider, Engine, Event};
use iced::futures::{SinkExt, StreamExt, channel::mpsc as futures_mpsc, executor};
use iced::{Subscription, stream};
use tracing::{debug, error};

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const EVENT_CHANNEL_CAPACITY: usize = 8;
const SUBSCRIPTION_CHANNEL_CAPACITY: usize = 32;

/// Sender used by the UI thread to dispatch commands to the engine.
pub type EngineCommandSender = mpsc::SyncSender<Command>;

/// Receiver used by the UI thread to read events emitted by the engine.
pub type EngineEventReceiver = mpsc::Receiver<Event>;

/// Messages emitted by the engine bridge subscription.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    Ready(EngineCommandSender),
    Event(Event),
    Disconnected,
}

/// Builds a subscription that starts the engine bridge and forwards events.
pub fn engine_subscription(api_url: String) -> Subscription<BridgeEvent> {
    Subscription::run_with_id(
        "engine-bridge",
        bridge_worker_stream_with(move || spawn_http_bridge(api_url)),
    )
}

fn bridge_worker_stream_with<F>(spawn_bridge: F) -> impl iced::futures::Stream<Item = BridgeEvent>
where
    F: FnOnce() -> (EngineCommandSender, EngineEventReceiver) + Send + 'static,
{
    stream::channel(
        SUBSCRIPTION_CHANNEL_CAPACITY,
        move |mut output| async move {
            let (engine_tx, engine_rx) = spawn_bridge();
            let _ = output.send(BridgeEvent::Ready(engine_tx)).await;

            let (forward_tx, mut forward_rx) =
                futures_mpsc::channel::<BridgeEvent>(SUBSCRIPTION_CHANNEL_CAPACITY);

            thread::spawn(move || {
                let mut forward_tx = forward_tx;
                while let Ok(event) = engine_rx.recv() {
                    if executor::block_on(forward_tx.send(BridgeEvent::Event(event))).is_err() {
                        return;
                    }
                }
                let _ = executor::block_on(forward_tx.send(BridgeEvent::Disconnected));
            });

            while let Some(event) = forward_rx.next().await {
                if output.send(event).await.is_err() {
                    break;
                }
            }
        },
    )
}

/// Spawns the production bridge talking to the provider at `api_url`.
pub fn spawn_http_bridge(api_url: String) -> (EngineCommandSender, EngineEventReceiver) {
    spawn_engine_bridge(move || Engine::with_http(&api_url))
}

/// Spawns a bridge around any data provider.
///
/// The engine is built on the bridge thread, since the blocking HTTP client
/// must not be created or dropped on the async executor. Each command then
/// runs on its own worker thread so a slow request never delays another.
pub fn spawn_engine_bridge<P, F>(make_engine: F) -> (EngineCommandSender, EngineEventReceiver)
where
    P: DataProvider + Send + Sync + 'static,
    F: FnOnce() -> engine::Result<Engine<P>> + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::sync_channel::<Command>(COMMAND_CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::sync_channel::<Event>(EVENT_CHANNEL_CAPACITY);

    thread::spawn(move || {
        let engine = match make_engine() {
            Ok(engine) => Arc::new(engine),
            Err(error) => {
                error!(%error, "engine could not be started");
                return;
            }
        };

        while let Ok(command) = command_rx.recv() {
            debug!(command = ?command.kind(), "dispatching command");
            let engine = Arc::clone(&engine);
            let event_tx = event_tx.clone();
            thread::spawn(move || {
                for event in engine.dispatch(command) {
                    if event_tx.send(event).is_err() {
                        return;
                    }
                }
            });
        }
    });

    (command_tx, event_rx)
}
