use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::{
    core::desk::{Admission, DeskError, DeskSnapshot, TriageDesk},
    record::{PatientDraft, PatientRecord, VisitStatus},
};

use super::events::DeskEvent;

/// Errors returned by [`DeskHandle`] calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// The desk rejected the operation.
    #[error(transparent)]
    Desk(#[from] DeskError),
    /// The desk task has stopped.
    #[error("desk task is no longer running")]
    ChannelClosed,
}

/// Channel sizes for [`spawn_desk`].
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Commands buffered before senders wait. Zero is treated as one.
    pub command_queue_bound: usize,
    /// Events retained for lagging subscribers. Zero is treated as one.
    pub event_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_buffer: 1024,
        }
    }
}

/// Cloneable front door to a desk owned by a spawned task.
pub struct DeskHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<DeskEvent>,
}

impl Clone for DeskHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    Admit {
        draft: PatientDraft,
        resp: oneshot::Sender<Result<Admission, RuntimeError>>,
    },
    PeekNext {
        resp: oneshot::Sender<Result<Option<PatientRecord>, RuntimeError>>,
    },
    TreatNext {
        resp: oneshot::Sender<Result<Option<PatientRecord>, RuntimeError>>,
    },
    Lookup {
        id: String,
        resp: oneshot::Sender<Result<Option<PatientRecord>, RuntimeError>>,
    },
    Discharge {
        id: String,
        resp: oneshot::Sender<Result<Option<PatientRecord>, RuntimeError>>,
    },
    Snapshot {
        resp: oneshot::Sender<DeskSnapshot>,
    },
    Shutdown {
        resp: oneshot::Sender<TriageDesk>,
    },
}

/// Moves `desk` into a task that serves commands one at a time.
///
/// Must be called from within a tokio runtime.
pub fn spawn_desk(desk: TriageDesk, config: RuntimeConfig) -> DeskHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound.max(1));
    let (events_tx, _) = broadcast::channel::<DeskEvent>(config.event_buffer.max(1));
    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut desk = desk;
        info!(
            queue_capacity = desk.config().queue_capacity,
            index_capacity = desk.config().index_capacity,
            "desk task started"
        );

        while let Some(cmd) = cmd_rx.recv().await {
            if let Some(resp) = handle_command(cmd, &mut desk, &events_tx_loop) {
                let _ = resp.send(desk);
                info!("desk task shut down");
                return;
            }
        }
        debug!("all desk handles dropped");
    });

    DeskHandle { cmd_tx, events_tx }
}

impl DeskHandle {
    /// Receiver for events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<DeskEvent> {
        self.events_tx.subscribe()
    }

    /// See [`TriageDesk::admit`].
    pub async fn admit(&self, draft: PatientDraft) -> Result<Admission, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Admit { draft, resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// See [`TriageDesk::peek_next`].
    pub async fn peek_next(&self) -> Result<Option<PatientRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::PeekNext { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// See [`TriageDesk::treat_next`].
    pub async fn treat_next(&self) -> Result<Option<PatientRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::TreatNext { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// See [`TriageDesk::lookup`].
    pub async fn lookup(&self, id: impl Into<String>) -> Result<Option<PatientRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Lookup {
            id: id.into(),
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// See [`TriageDesk::discharge`].
    pub async fn discharge(
        &self,
        id: impl Into<String>,
    ) -> Result<Option<PatientRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Discharge {
            id: id.into(),
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// See [`TriageDesk::snapshot`].
    pub async fn snapshot(&self) -> Result<DeskSnapshot, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Stops the task and hands the desk back to the caller.
    pub async fn shutdown(&self) -> Result<TriageDesk, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Shutdown { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    async fn send(&self, cmd: Command) -> Result<(), RuntimeError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| RuntimeError::ChannelClosed)
    }
}

/// Applies one command. Returns the shutdown responder when the loop should stop.
fn handle_command(
    cmd: Command,
    desk: &mut TriageDesk,
    events_tx: &broadcast::Sender<DeskEvent>,
) -> Option<oneshot::Sender<TriageDesk>> {
    match cmd {
        Command::Admit { draft, resp } => {
            let res = desk.admit(draft).map_err(RuntimeError::from);
            match &res {
                Ok(adm) => {
                    let event = if adm.previous == Some(VisitStatus::Waiting) {
                        DeskEvent::Retriaged {
                            id: adm.id.clone(),
                            rank: adm.rank,
                            arrival: adm.arrival,
                        }
                    } else {
                        DeskEvent::Admitted {
                            id: adm.id.clone(),
                            rank: adm.rank,
                            arrival: adm.arrival,
                        }
                    };
                    let _ = events_tx.send(event);
                }
                Err(err) => warn!(%err, "admission rejected"),
            }
            let _ = resp.send(res);
        }
        Command::PeekNext { resp } => {
            let _ = resp.send(desk.peek_next().map_err(RuntimeError::from));
        }
        Command::TreatNext { resp } => {
            let res = desk.treat_next().map_err(RuntimeError::from);
            if let Ok(Some(rec)) = &res {
                let _ = events_tx.send(DeskEvent::Treated { id: rec.id.clone() });
            }
            let _ = resp.send(res);
        }
        Command::Lookup { id, resp } => {
            let _ = resp.send(desk.lookup(&id).map_err(RuntimeError::from));
        }
        Command::Discharge { id, resp } => {
            let res = desk.discharge(&id).map_err(RuntimeError::from);
            if let Ok(Some(_)) = &res {
                let _ = events_tx.send(DeskEvent::Discharged { id });
            }
            let _ = resp.send(res);
        }
        Command::Snapshot { resp } => {
            let _ = resp.send(desk.snapshot());
        }
        Command::Shutdown { resp } => return Some(resp),
    }

    None
}
