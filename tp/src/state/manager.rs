//! SessionStore - actor that owns the itinerary
//!
//! Processes commands via channels, so every mutation is applied whole before
//! the next one is looked at. Readers always see the state left by the last
//! completed command.

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};

use crate::domain::{OptimizeResult, Place, PlacesData};
use crate::reconcile;

use super::messages::{Snapshot, StateError, StateResponse, StoreCommand};

/// Event broadcast after a mutation completes so views can re-render
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Itinerary overwritten with a backend-confirmed payload
    Replaced { places: usize },
    /// Suggestions merged; `added` counts places that survived de-duplication
    Appended { added: usize, places: usize },
    /// Local reorder applied ahead of backend confirmation
    Reordered,
    ResultSet,
    ResultCleared,
    Reset,
}

/// Handle to send commands to the SessionStore
///
/// Cheap to clone; every clone talks to the same actor.
#[derive(Clone)]
pub struct SessionStore {
    tx: mpsc::Sender<StoreCommand>,
    /// Broadcast sender for change notifications
    event_tx: broadcast::Sender<StoreEvent>,
}

impl SessionStore {
    /// Spawn a new SessionStore actor holding an empty session
    pub fn spawn() -> Self {
        debug!("spawn: called");
        let (tx, rx) = mpsc::channel(256);
        let (event_tx, _) = broadcast::channel(64);

        tokio::spawn(actor_loop(rx));

        info!("SessionStore spawned");
        Self { tx, event_tx }
    }

    /// Subscribe to change events
    pub fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<StateResponse<T>>) -> StoreCommand) -> StateResponse<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    /// Overwrite places and anchors with `data`
    pub async fn replace(&self, data: PlacesData) -> StateResponse<PlacesData> {
        debug!(places = data.places.len(), "replace: called");
        let current = self.request(|reply| StoreCommand::Replace { data, reply }).await?;
        self.emit(StoreEvent::Replaced {
            places: current.places.len(),
        });
        Ok(current)
    }

    /// Merge `places` after the current ones, dropping coordinate duplicates
    ///
    /// `None` anchors keep the prior values. Returns the new itinerary and how
    /// many places were added.
    pub async fn append(
        &self,
        places: Vec<Place>,
        start: Option<Place>,
        end: Option<Place>,
    ) -> StateResponse<(PlacesData, usize)> {
        debug!(incoming = places.len(), has_start = start.is_some(), has_end = end.is_some(), "append: called");
        let (current, added) = self
            .request(|reply| StoreCommand::Append {
                places,
                start,
                end,
                reply,
            })
            .await?;
        self.emit(StoreEvent::Appended {
            added,
            places: current.places.len(),
        });
        Ok((current, added))
    }

    /// Set the place order without touching the anchors
    pub async fn reorder(&self, places: Vec<Place>) -> StateResponse<PlacesData> {
        debug!(places = places.len(), "reorder: called");
        let current = self.request(|reply| StoreCommand::Reorder { places, reply }).await?;
        self.emit(StoreEvent::Reordered);
        Ok(current)
    }

    /// Store or clear the last optimization result
    pub async fn set_optimize_result(&self, result: Option<OptimizeResult>) -> StateResponse<()> {
        debug!(is_some = result.is_some(), "set_optimize_result: called");
        let cleared = result.is_none();
        self.request(|reply| StoreCommand::SetOptimizeResult { result, reply })
            .await?;
        self.emit(if cleared {
            StoreEvent::ResultCleared
        } else {
            StoreEvent::ResultSet
        });
        Ok(())
    }

    /// Replace the itinerary with the held result's canonical order, then clear it
    ///
    /// Returns `None` when there is no result to apply.
    pub async fn apply_optimize_result(&self) -> StateResponse<Option<PlacesData>> {
        debug!("apply_optimize_result: called");
        let applied = self
            .request(|reply| StoreCommand::ApplyOptimizeResult { reply })
            .await?;
        if let Some(data) = &applied {
            self.emit(StoreEvent::Replaced {
                places: data.places.len(),
            });
            self.emit(StoreEvent::ResultCleared);
        }
        Ok(applied)
    }

    /// Current itinerary and result
    pub async fn snapshot(&self) -> StateResponse<Snapshot> {
        self.request(|reply| StoreCommand::Snapshot { reply }).await
    }

    /// Current itinerary only
    pub async fn places_data(&self) -> StateResponse<PlacesData> {
        Ok(self.snapshot().await?.data)
    }

    /// Drop everything and start from an empty session
    pub async fn reset(&self) -> StateResponse<()> {
        debug!("reset: called");
        self.request(|reply| StoreCommand::Reset { reply }).await?;
        self.emit(StoreEvent::Reset);
        Ok(())
    }

    /// Stop the actor; later calls fail with `ChannelError`
    pub async fn shutdown(&self) -> Result<(), StateError> {
        debug!("shutdown: called");
        self.tx
            .send(StoreCommand::Shutdown)
            .await
            .map_err(|_| StateError::ChannelError)
    }
}

/// Actor state
#[derive(Debug, Default)]
struct Session {
    data: PlacesData,
    result: Option<OptimizeResult>,
}

async fn actor_loop(mut rx: mpsc::Receiver<StoreCommand>) {
    debug!("actor_loop: called");
    let mut session = Session::default();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            StoreCommand::Replace { data, reply } => {
                debug!(places = data.places.len(), "actor_loop: Replace command");
                session.data = data;
                let _ = reply.send(Ok(session.data.clone()));
            }

            StoreCommand::Append {
                places,
                start,
                end,
                reply,
            } => {
                debug!(incoming = places.len(), "actor_loop: Append command");
                let (merged, added) = reconcile::append(&session.data, places, start, end);
                session.data = merged;
                info!(added, total = session.data.places.len(), "Appended places");
                let _ = reply.send(Ok((session.data.clone(), added)));
            }

            StoreCommand::Reorder { places, reply } => {
                debug!(places = places.len(), "actor_loop: Reorder command");
                session.data.places = places;
                let _ = reply.send(Ok(session.data.clone()));
            }

            StoreCommand::SetOptimizeResult { result, reply } => {
                debug!(is_some = result.is_some(), "actor_loop: SetOptimizeResult command");
                session.result = result;
                let _ = reply.send(Ok(()));
            }

            StoreCommand::ApplyOptimizeResult { reply } => {
                debug!("actor_loop: ApplyOptimizeResult command");
                let applied = session.result.take().map(|result| {
                    session.data = PlacesData {
                        places: result.ordered_places,
                        start: result.start,
                        end: result.end,
                    };
                    info!(places = session.data.places.len(), "Applied optimized route as itinerary");
                    session.data.clone()
                });
                let _ = reply.send(Ok(applied));
            }

            StoreCommand::Snapshot { reply } => {
                let _ = reply.send(Ok(Snapshot {
                    data: session.data.clone(),
                    result: session.result.clone(),
                }));
            }

            StoreCommand::Reset { reply } => {
                debug!("actor_loop: Reset command");
                session = Session::default();
                let _ = reply.send(Ok(()));
            }

            StoreCommand::Shutdown => {
                info!("SessionStore shutting down");
                break;
            }
        }
    }

    debug!("SessionStore actor stopped");
}
