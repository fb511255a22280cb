use super::order_polling::{OrderPollingMachine, PollCommand, PollingConfig, PollingState};
use crate::domain::order::SessionId;
use crate::domain::ports::OrderSourceRef;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

/// Runs an `OrderPollingMachine` on the tokio runtime.
///
/// Owns the scheduler: fetches go through the injected `OrderSource` and
/// waits are `tokio::time::sleep`. At most one fetch is in flight. State is
/// published on a `watch` channel after every transition.
///
/// Changing the session or dropping the poller aborts the running task; the
/// machine's epoch check additionally discards anything that completes in
/// between.
pub struct OrderPoller {
    source: OrderSourceRef,
    machine: Arc<Mutex<OrderPollingMachine>>,
    state_tx: Arc<watch::Sender<PollingState>>,
    task: Option<JoinHandle<()>>,
}

impl OrderPoller {
    pub fn new(source: OrderSourceRef, config: PollingConfig) -> Self {
        let (state_tx, _) = watch::channel(PollingState::default());
        Self {
            source,
            machine: Arc::new(Mutex::new(OrderPollingMachine::new(config))),
            state_tx: Arc::new(state_tx),
            task: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PollingState> {
        self.state_tx.subscribe()
    }

    /// The latest published state.
    pub fn state(&self) -> PollingState {
        self.state_tx.borrow().clone()
    }

    /// Starts polling for `session_id`, abandoning any previous session.
    ///
    /// Passing the session already being polled changes nothing.
    pub async fn set_session(&mut self, session_id: Option<SessionId>) {
        let mut machine = self.machine.lock().await;
        let before = machine.epoch();
        let command = machine.set_session(session_id);
        if machine.epoch() == before {
            return;
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.state_tx.send_replace(machine.state().clone());
        drop(machine);

        if let Some(command) = command {
            self.task = Some(tokio::spawn(drive(
                Arc::clone(&self.machine),
                Arc::clone(&self.source),
                Arc::clone(&self.state_tx),
                command,
            )));
        }
    }

    /// Stops polling and returns to idle.
    pub async fn teardown(&mut self) {
        let mut machine = self.machine.lock().await;
        machine.teardown();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.state_tx.send_replace(machine.state().clone());
    }

    /// Polls `session_id` until a terminal state is reached.
    #[instrument(skip(source, config))]
    pub async fn poll_until_settled(
        source: OrderSourceRef,
        config: PollingConfig,
        session_id: SessionId,
    ) -> PollingState {
        let mut poller = Self::new(source, config);
        let mut rx = poller.subscribe();
        poller.set_session(Some(session_id)).await;
        let settled = match rx.wait_for(PollingState::is_terminal).await {
            Ok(state) => state.clone(),
            // The sender lives in `poller`, which outlives this wait.
            Err(_) => poller.state(),
        };
        settled
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for OrderPoller {
    fn drop(&mut self) {
        self.abort_task();
    }
}

async fn drive(
    machine: Arc<Mutex<OrderPollingMachine>>,
    source: OrderSourceRef,
    state_tx: Arc<watch::Sender<PollingState>>,
    mut command: PollCommand,
) {
    loop {
        let next = match command {
            PollCommand::Fetch {
                epoch,
                session_id,
                attempt,
            } => {
                debug!(session = %session_id, attempt, "fetching order");
                let result = source.fetch_order_by_session(&session_id).await;

                let mut machine = machine.lock().await;
                if machine.epoch() != epoch {
                    return;
                }
                let next = machine.on_result(epoch, result);
                state_tx.send_replace(machine.state().clone());
                next
            }
            PollCommand::Wait { epoch, delay } => {
                tokio::time::sleep(delay).await;
                machine.lock().await.on_timer(epoch)
            }
        };

        match next {
            Some(follow_up) => command = follow_up,
            None => return,
        }
    }
}
