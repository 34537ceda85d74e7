// src/simulation/actor.rs

//! Mailbox around a `Manufacturer`.
//!
//! The manufacturer lives inside a single tokio task and is the only writer
//! of its orders and inventory. Events are processed one at a time, so a
//! day's status pass always completes before the next event is looked at.

use crate::error::{ActorError, SimulationError};
use crate::model::events::{InboundEvent, OutboundCommand};
use crate::simulation::engine::Manufacturer;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error};

type Reply = oneshot::Sender<Result<Vec<OutboundCommand>, SimulationError>>;

struct Envelope {
    event: InboundEvent,
    reply: Reply,
}

pub struct ManufacturerActor {
    tx: mpsc::Sender<Envelope>,
    task: JoinHandle<Manufacturer>,
}

impl ManufacturerActor {
    /// Moves `manufacturer` into its own task. Must be called inside a tokio
    /// runtime.
    pub fn spawn(manufacturer: Manufacturer, mailbox: usize) -> Self {
        let (tx, rx) = mpsc::channel(mailbox.max(1));
        let task = tokio::spawn(run(manufacturer, rx));
        Self { tx, task }
    }

    /// Delivers one event and waits for the commands it produced.
    pub async fn send(&self, event: InboundEvent) -> Result<Vec<OutboundCommand>, SimulationError> {
        let day = event.day();
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Envelope { event, reply })
            .await
            .map_err(|_| ActorError::MailboxClosed)?;
        response.await.map_err(|_| ActorError::ReplyDropped(day))?
    }

    /// Delivers a whole day's events in order, collecting all commands.
    pub async fn send_day(
        &self,
        events: Vec<InboundEvent>,
    ) -> Result<Vec<OutboundCommand>, SimulationError> {
        let mut commands = Vec::new();
        for event in events {
            commands.extend(self.send(event).await?);
        }
        Ok(commands)
    }

    /// Closes the mailbox and returns the manufacturer once every queued
    /// event has been handled.
    pub async fn shutdown(self) -> Result<Manufacturer, ActorError> {
        drop(self.tx);
        Ok(self.task.await?)
    }
}

async fn run(mut manufacturer: Manufacturer, mut rx: mpsc::Receiver<Envelope>) -> Manufacturer {
    while let Some(Envelope { event, reply }) = rx.recv().await {
        let result = manufacturer.handle(&event);
        if let Err(e) = &result {
            error!(day = event.day(), error = %e, "event handling failed");
        }
        if reply.send(result).is_err() {
            debug!(day = event.day(), "caller went away before the reply");
        }
    }
    manufacturer
}
