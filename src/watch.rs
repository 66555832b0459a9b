use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::accumulator::Accumulator;

pub enum Command {
    Stop,
}

/// Drains an [`Accumulator`] on an interval and forwards each nonzero delta.
#[derive(Clone)]
pub struct DeltaWatch {
    pub mbox: mpsc::Sender<Command>,
}

impl DeltaWatch {
    /// Spawn the drain task on the current tokio runtime. The receiver closes
    /// once the task ends.
    pub fn spawn(
        accumulator: Arc<Accumulator>,
        every: Duration,
    ) -> (DeltaWatch, mpsc::Receiver<i8>) {
        let (mbox, mbox_rx) = mpsc::channel(1);
        let (tx, rx) = mpsc::channel(64);
        let actor = Watcher {
            rx: mbox_rx,
            tx,
            accumulator,
            every,
        };
        tokio::spawn(execute(actor));
        (DeltaWatch { mbox }, rx)
    }

    pub async fn stop(&self) {
        // a closed mailbox means the task is already gone
        let _ = self.mbox.send(Command::Stop).await;
    }
}

struct Watcher {
    rx: mpsc::Receiver<Command>,
    tx: mpsc::Sender<i8>,
    accumulator: Arc<Accumulator>,
    every: Duration,
}

async fn execute(mut actor: Watcher) {
    let mut interval = time::interval(actor.every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            message = actor.rx.recv() => match message {
                Some(Command::Stop) | None => break,
            },
            _ = interval.tick() => {
                if actor.tx.is_closed() {
                    break;
                }
                if let Some(delta) = actor.accumulator.drain() {
                    if actor.tx.send(delta).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
    debug!("delta watch stopped");
}
