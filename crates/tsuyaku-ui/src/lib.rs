use kanal::{AsyncReceiver, AsyncSender};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tsuyaku_types::{DispatcherMessage, UiMessage};

pub mod events;
pub mod layout;
pub mod machine;
pub mod state;


pub use events::InputEvent;
pub use layout::{PanelMeasure, Placement, TextMetrics, clamp_into_viewport};
pub use machine::SelectionUi;
pub use state::{Pane, PaneContent, Panel, Selection, SelectionPayload, UiState};

/// Everything the page context reacts to, merged onto one channel
#[derive(Debug)]
enum UiEvent {
    Input(InputEvent),
    Dispatcher(DispatcherMessage),
    Closed(&'static str),
}

/// Page-context loop for one tab.
///
/// Feeds user input and dispatcher messages into the machine, forwards its
/// requests, and publishes every state it settles in. Ends when either the
/// input stream or the tab inbox closes.
pub async fn ui_loop(
    mut ui: SelectionUi,
    input_rx: AsyncReceiver<InputEvent>,
    inbox: AsyncReceiver<DispatcherMessage>,
    to_dispatcher: AsyncSender<UiMessage>,
    state_tx: watch::Sender<UiState>,
) -> anyhow::Result<()> {
    tracing::info!("[UI] Loop started for {}", ui.tab());

    let (events_tx, events_rx) = kanal::bounded_async(64);
    // aborted on drop
    let mut forwarders = JoinSet::new();
    forwarders.spawn(forward(input_rx, events_tx.clone(), UiEvent::Input, "Input"));
    forwarders.spawn(forward(inbox, events_tx, UiEvent::Dispatcher, "Inbox"));

    while let Ok(event) = events_rx.recv().await {
        match event {
            UiEvent::Input(event) => {
                for message in ui.handle(event) {
                    to_dispatcher.send(message).await?;
                }
            }
            UiEvent::Dispatcher(message) => {
                if !ui.receive(message) {
                    continue;
                }
            }
            UiEvent::Closed(source) => {
                tracing::info!("[UI] {source} closed for {}", ui.tab());
                break;
            }
        }

        state_tx.send_replace(ui.state().clone());
    }

    Ok(())
}

async fn forward<T>(
    rx: AsyncReceiver<T>,
    tx: AsyncSender<UiEvent>,
    wrap: fn(T) -> UiEvent,
    source: &'static str,
) {
    while let Ok(item) = rx.recv().await {
        if tx.send(wrap(item)).await.is_err() {
            return;
        }
    }
    let _ = tx.send(UiEvent::Closed(source)).await;
}
