use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tsuyaku_dispatcher::{DispatchContext, Dispatcher, TabRouter};
use tsuyaku_types::{DispatcherMessage, TabId, UiMessage};
use tsuyaku_ui::{InputEvent, Panel, SelectionUi, UiState, ui_loop};

use crate::state::AppState;

/// The one simulated tab this process drives
pub const TAB: TabId = TabId(1);

/// Centralized channel management
pub struct ChannelSet {
    pub input: (AsyncSender<InputEvent>, AsyncReceiver<InputEvent>),
    pub ui_to_dispatcher: (AsyncSender<UiMessage>, AsyncReceiver<UiMessage>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            input: kanal::bounded_async(16),            // user input
            ui_to_dispatcher: kanal::bounded_async(64), // requests and cancels
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    router: TabRouter,
    inbox: AsyncReceiver<DispatcherMessage>,
    dispatcher: Dispatcher,
    state: AppState,
    ui_state: watch::Sender<UiState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub async fn new(state: AppState) -> Self {
        let router = TabRouter::new();
        let inbox = router.register(TAB).await;

        let dispatcher = Dispatcher::new(DispatchContext {
            config: state.config.clone(),
            capture: state.capture.clone(),
            backends: state.backends.clone(),
            sink: Arc::new(router.clone()),
        });

        Self {
            channels: ChannelSet::new(),
            router,
            inbox,
            dispatcher,
            state,
            ui_state: watch::Sender::new(UiState::Idle),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Dispatcher
        let dispatcher = self.dispatcher.clone();
        let requests = self.channels.ui_to_dispatcher.1.clone();
        tasks.spawn(async move { dispatcher.serve(requests).await });

        // UI loop
        let ui = SelectionUi::new(TAB, self.state.viewport, self.state.device_pixel_ratio);
        tasks.spawn(until_cancelled(
            self.cancel_token.child_token(),
            ui_loop(
                ui,
                self.channels.input.1.clone(),
                self.inbox.clone(),
                self.channels.ui_to_dispatcher.0.clone(),
                self.ui_state.clone(),
            ),
        ));

        tasks
    }

    /// Play user input into the tab and wait until its panel has every answer
    pub async fn drive(&self, script: Vec<InputEvent>) -> anyhow::Result<Panel> {
        let mut ui_state = self.ui_state.subscribe();
        let deadline = self.state.settle_timeout().await;

        for event in script {
            self.channels.input.0.send(event).await?;
        }

        let settled = tokio::time::timeout(
            deadline,
            ui_state.wait_for(|state| state.panel().is_some_and(Panel::is_settled)),
        )
        .await
        .context("No complete result panel before the deadline")??;

        settled.panel().cloned().context("Result panel closed")
    }

    pub async fn shutdown(&self) {
        self.cancel_token.cancel();
        self.dispatcher.shutdown();
        self.router.unregister(TAB).await;
    }
}

async fn until_cancelled(
    token: CancellationToken,
    task: impl Future<Output = anyhow::Result<()>>,
) -> anyhow::Result<()> {
    tokio::select! {
        result = task => result,
        _ = token.cancelled() => Ok(()),
    }
}
