//! Planner - turns intents into backend round trips and store mutations
//!
//! Every backend call is caught where it is made and becomes a notice; a
//! failure leaves the store as it was. The one exception is drag reorder,
//! which is applied locally first and never rolled back.

mod intent;

pub use intent::{FIND_COUNT_RANGE, Intent, Notice, NoticeLevel, Outcome, Precondition};

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::backend::PlacesBackend;
use crate::domain::{Algorithm, Place, PlacesData};
use crate::error::PlanError;
use crate::projector;
use crate::reconcile;
use crate::roles::{self, Anchor, RoleAssigner, RoleChange};
use crate::session::SessionIdFile;
use crate::state::{SessionStore, Snapshot, StateResponse};

/// Controller for one planning session
pub struct Planner {
    store: SessionStore,
    backend: Arc<dyn PlacesBackend>,
    roles: RoleAssigner,
    session_id: RwLock<Option<String>>,
    id_file: Option<SessionIdFile>,
    notice_tx: broadcast::Sender<Notice>,
    /// Background confirmations still in flight
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl Planner {
    pub fn new(store: SessionStore, backend: Arc<dyn PlacesBackend>) -> Self {
        debug!("Planner::new: called");
        let (notice_tx, _) = broadcast::channel(64);
        Self {
            roles: RoleAssigner::new(store.clone(), backend.clone()),
            store,
            backend,
            session_id: RwLock::new(None),
            id_file: None,
            notice_tx,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Resume an existing backend session
    pub fn with_session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = RwLock::new(session_id);
        self
    }

    /// Persist session ids handed out by the backend to `file`
    pub fn with_session_file(mut self, file: SessionIdFile) -> Self {
        self.id_file = Some(file);
        self
    }

    pub async fn session_id(&self) -> Option<String> {
        self.session_id.read().await.clone()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub async fn snapshot(&self) -> StateResponse<Snapshot> {
        self.store.snapshot().await
    }

    /// Subscribe to notices, including those from background confirmations
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notice_tx.subscribe()
    }

    /// Carry out one intent
    pub async fn dispatch(&self, intent: Intent) -> Outcome {
        debug!(intent = intent.name(), "dispatch: called");
        let outcome = match intent {
            Intent::Chat { query } => self.chat(query).await,
            Intent::FindPlaces {
                business_type,
                location,
                count,
            } => self.find_places(business_type, location, count).await,
            Intent::AddCustomPlace { name, address } => self.add_custom_place(name, address).await,
            Intent::RemovePlace { place_id } => self.remove_place(place_id).await,
            Intent::Reorder { from, to } => self.reorder(from, to).await,
            Intent::ToggleRole { place, role, checked } => self.toggle_role(place, role, checked).await,
            Intent::Optimize { algo, return_to_start } => self.optimize(algo, return_to_start).await,
            Intent::ApplyResult => self.apply_result().await,
            Intent::DiscardResult => self.discard_result().await,
        };

        match &outcome {
            Outcome::Skipped(reason) => debug!(%reason, "dispatch: skipped"),
            other => {
                if let Some(notice) = other.notice() {
                    let _ = self.notice_tx.send(notice.clone());
                }
            }
        }
        outcome
    }

    /// Wait for background confirmations started so far
    pub async fn settle(&self) {
        let handles: Vec<_> = self.pending.lock().await.drain(..).collect();
        debug!(pending = handles.len(), "settle: called");
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Background confirmation panicked");
            }
        }
    }

    /// Wait for in-flight work, then stop the store
    pub async fn shutdown(&self) {
        debug!("shutdown: called");
        self.settle().await;
        if let Err(e) = self.store.shutdown().await {
            warn!(error = %e, "Store already stopped");
        }
    }

    async fn require_session(&self) -> Result<String, Precondition> {
        self.session_id().await.ok_or(Precondition::NoSession)
    }

    fn failed(&self, what: &str, err: PlanError, fallback: &str) -> Outcome {
        error!(error = %err, "{} failed", what);
        Outcome::Failed(Notice::error(err.user_message(fallback)))
    }

    async fn remember_session(&self, session_id: &str) {
        if session_id.is_empty() {
            return;
        }
        let mut current = self.session_id.write().await;
        if current.as_deref() == Some(session_id) {
            return;
        }
        *current = Some(session_id.to_string());
        drop(current);

        info!(%session_id, "Session initialized");
        if let Some(file) = &self.id_file {
            if let Err(e) = file.save(session_id) {
                warn!(error = %e, "Failed to persist session id");
            }
        }
    }

    async fn chat(&self, query: String) -> Outcome {
        let query = query.trim();
        if query.is_empty() {
            return Outcome::Skipped(Precondition::EmptyMessage);
        }
        let session_id = self.session_id().await;

        let reply = match self.backend.chat(query, session_id.as_deref()).await {
            Ok(reply) => reply,
            Err(e) => return self.failed("chat", e.into(), "Failed to send message"),
        };
        self.remember_session(&reply.session_id).await;

        let places = reply.places.unwrap_or_default();
        if places.is_empty() {
            return Outcome::Replied {
                message: reply.message,
                notice: None,
            };
        }

        match self
            .store
            .append(places, reply.start.into_option(), reply.end.into_option())
            .await
        {
            Ok((_, added)) => {
                info!(added, "Places from chat appended");
                Outcome::Replied {
                    message: reply.message,
                    notice: Some(Notice::success(format!("Added {} place(s) from chat.", added))),
                }
            }
            Err(e) => self.failed("chat", e.into(), "Failed to send message"),
        }
    }

    async fn find_places(&self, business_type: String, location: String, count: u32) -> Outcome {
        let session_id = match self.require_session().await {
            Ok(id) => id,
            Err(reason) => return Outcome::Skipped(reason),
        };
        let (business_type, location) = (business_type.trim(), location.trim());
        if business_type.is_empty() || location.is_empty() {
            return Outcome::Skipped(Precondition::EmptySearch);
        }
        if !FIND_COUNT_RANGE.contains(&count) {
            return Outcome::Skipped(Precondition::CountOutOfRange(count));
        }

        let result: Result<usize, PlanError> = async {
            let payload = self
                .backend
                .find_places(&session_id, business_type, location, count)
                .await?;
            let places = payload.places.unwrap_or_default();
            let (_, added) = self
                .store
                .append(places, payload.start.into_option(), payload.end.into_option())
                .await?;
            Ok(added)
        }
        .await;

        match result {
            Ok(added) => {
                info!(%business_type, %location, added, "Places found");
                Outcome::Applied(Some(Notice::success("Places found")))
            }
            Err(e) => self.failed("find_places", e, "Failed to find places"),
        }
    }

    async fn add_custom_place(&self, name: String, address: String) -> Outcome {
        let session_id = match self.require_session().await {
            Ok(id) => id,
            Err(reason) => return Outcome::Skipped(reason),
        };
        let (name, address) = (name.trim(), address.trim());
        if name.is_empty() || address.is_empty() {
            return Outcome::Skipped(Precondition::MissingNameOrAddress);
        }

        let point = match self.backend.geocode(address).await {
            Ok(point) => point,
            Err(e) => {
                error!(error = %e, %address, "geocode failed");
                let message = e.user_message(&e.to_string());
                return Outcome::Failed(Notice::error(format!("Geocoding failed: {}", message)));
            }
        };

        let result: Result<PlacesData, PlanError> = async {
            let place = Place::new(name, point.latitude, point.longitude).with_address(address);
            let payload = self.backend.add_place(&session_id, &place).await?;
            Ok(self.store.replace(payload.into_places_data()).await?)
        }
        .await;

        match result {
            Ok(data) => {
                info!(%name, places = data.places.len(), "Place added");
                Outcome::Applied(Some(Notice::success("Place added")))
            }
            Err(e) => self.failed("add_custom_place", e, "Failed to add place"),
        }
    }

    async fn remove_place(&self, place_id: String) -> Outcome {
        let session_id = match self.require_session().await {
            Ok(id) => id,
            Err(reason) => return Outcome::Skipped(reason),
        };

        let result: Result<PlacesData, PlanError> = async {
            let current = self.store.places_data().await?;
            // Release the anchors first so the removed place does not linger as start/end.
            // A failed release is logged; the removal still goes ahead.
            if let Some(change) = RoleChange::for_removal(&current, &place_id) {
                if let Err(e) = self.roles.submit(&session_id, change, &current).await {
                    warn!(error = %e, %place_id, "Failed to release start/end before removal");
                }
            }
            let payload = self.backend.remove_place(&session_id, &place_id).await?;
            Ok(self.store.replace(payload.into_places_data()).await?)
        }
        .await;

        match result {
            Ok(data) => {
                info!(%place_id, places = data.places.len(), "Place removed");
                Outcome::Applied(Some(Notice::success("Place removed")))
            }
            Err(e) => self.failed("remove_place", e, "Failed to remove place"),
        }
    }

    async fn reorder(&self, from: usize, to: usize) -> Outcome {
        let session_id = match self.require_session().await {
            Ok(id) => id,
            Err(reason) => return Outcome::Skipped(reason),
        };
        let current = match self.store.places_data().await {
            Ok(data) => data,
            Err(e) => return self.failed("reorder", e.into(), "Failed to update places"),
        };
        let Some(places) = reconcile::move_place(&current.places, from, to) else {
            return Outcome::Skipped(Precondition::InvalidMove { from, to });
        };

        // Visible immediately; the backend confirmation follows in the background
        let local = match self.store.reorder(places).await {
            Ok(data) => data,
            Err(e) => return self.failed("reorder", e.into(), "Failed to update places"),
        };

        let store = self.store.clone();
        let backend = self.backend.clone();
        let notice_tx = self.notice_tx.clone();
        let handle = tokio::spawn(async move {
            let result: Result<PlacesData, PlanError> = async {
                let payload = backend
                    .confirm_places(&session_id, &local.places, local.start.as_ref(), local.end.as_ref())
                    .await?;
                Ok(store.replace(payload.resolve_against(&local)).await?)
            }
            .await;

            match result {
                Ok(data) => debug!(places = data.places.len(), "reorder: confirmed"),
                Err(e) => {
                    // No rollback: the local order stays until the next backend payload
                    error!(error = %e, "Failed to confirm reordered places");
                    let _ = notice_tx.send(Notice::error(e.user_message("Failed to update places")));
                }
            }
        });
        let mut pending = self.pending.lock().await;
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
        drop(pending);

        Outcome::Applied(None)
    }

    async fn toggle_role(&self, place: Place, role: Anchor, checked: bool) -> Outcome {
        let session_id = match self.require_session().await {
            Ok(id) => id,
            Err(reason) => return Outcome::Skipped(reason),
        };

        match self.roles.toggle(&session_id, &place, role, checked).await {
            Ok(_) => Outcome::Applied(None),
            Err(e) => self.failed("toggle_role", e, &format!("Failed to update {} point", role)),
        }
    }

    async fn optimize(&self, algo: Algorithm, return_to_start: bool) -> Outcome {
        let session_id = match self.require_session().await {
            Ok(id) => id,
            Err(reason) => return Outcome::Skipped(reason),
        };

        let result: Result<Option<()>, PlanError> = async {
            let current = self.store.places_data().await?;
            if current.places.len() < 2 {
                return Ok(None);
            }
            let return_to_start = return_to_start && roles::return_to_start_allowed(&current);
            let raw = self
                .backend
                .optimize_route(&session_id, algo, return_to_start)
                .await?;
            let result = projector::project(raw);
            info!(
                %algo,
                stops = ?result.stats.as_ref().and_then(|s| s.stops),
                "Route optimized"
            );
            self.store.set_optimize_result(Some(result)).await?;
            Ok(Some(()))
        }
        .await;

        match result {
            Ok(Some(())) => Outcome::Applied(None),
            Ok(None) => Outcome::Skipped(Precondition::NotEnoughPlaces),
            Err(e) => {
                let message = e.user_message("unknown error");
                error!(error = %e, "optimize failed");
                Outcome::Failed(Notice::error(format!("Optimization failed: {}", message)))
            }
        }
    }

    async fn apply_result(&self) -> Outcome {
        match self.store.apply_optimize_result().await {
            Ok(Some(data)) => {
                info!(places = data.places.len(), "Optimized route applied");
                Outcome::Applied(None)
            }
            Ok(None) => Outcome::Skipped(Precondition::NoResult),
            Err(e) => self.failed("apply_result", e.into(), "Failed to apply route"),
        }
    }

    async fn discard_result(&self) -> Outcome {
        match self.store.set_optimize_result(None).await {
            Ok(()) => Outcome::Applied(None),
            Err(e) => self.failed("discard_result", e.into(), "Failed to clear result"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::client::mock::{Call, FakeBackend};
    use crate::backend::{ChatReply, GeoPoint, OptimizeRouteResponse};
    use crate::domain::Field;
    use tempfile::tempdir;

    fn place(id: &str, lat: f64) -> Place {
        Place::new(id.to_uppercase(), lat, lat).with_id(id)
    }

    async fn setup(data: PlacesData) -> (Planner, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend::with_session(data.clone()));
        let store = SessionStore::spawn();
        store.replace(data).await.unwrap();
        let planner = Planner::new(store, backend.clone()).with_session_id(Some("sess".to_string()));
        (planner, backend)
    }

    async fn places(planner: &Planner) -> PlacesData {
        planner.snapshot().await.unwrap().data
    }

    fn names(data: &PlacesData) -> Vec<String> {
        data.places.iter().map(|p| p.name.clone()).collect()
    }

    #[tokio::test]
    async fn test_chat_starts_session_and_persists_id() {
        let temp = tempdir().unwrap();
        let file = SessionIdFile::new(temp.path().join("session_id"));
        let backend = Arc::new(FakeBackend::new());
        backend.push_chat_reply(ChatReply {
            session_id: "new-sess".to_string(),
            message: "Where would you like to go?".to_string(),
            ..Default::default()
        });
        let planner = Planner::new(SessionStore::spawn(), backend.clone()).with_session_file(file.clone());

        let outcome = planner
            .dispatch(Intent::Chat {
                query: "plan a day in Pune".to_string(),
            })
            .await;

        assert_eq!(
            outcome,
            Outcome::Replied {
                message: "Where would you like to go?".to_string(),
                notice: None,
            }
        );
        assert_eq!(planner.session_id().await.as_deref(), Some("new-sess"));
        assert_eq!(file.load().unwrap().as_deref(), Some("new-sess"));
        assert_eq!(
            backend.calls(),
            vec![Call::Chat {
                query: "plan a day in Pune".to_string(),
                session_id: None,
            }]
        );
        assert!(places(&planner).await.is_empty());
    }

    #[tokio::test]
    async fn test_chat_appends_without_duplicates() {
        let a = Place::new("A", 18.52, 73.85).with_id("a");
        let (planner, backend) = setup(PlacesData::new(vec![a.clone()], None, None)).await;
        backend.push_chat_reply(ChatReply {
            session_id: "sess".to_string(),
            message: "Found some cafes".to_string(),
            places: Some(vec![
                Place::new("A again", 18.52, 73.85).with_id("a2"),
                Place::new("B", 18.53, 73.84).with_id("b"),
            ]),
            ..Default::default()
        });

        let outcome = planner
            .dispatch(Intent::Chat {
                query: "cafes".to_string(),
            })
            .await;

        assert_eq!(
            outcome.notice().map(|n| n.message.as_str()),
            Some("Added 1 place(s) from chat.")
        );
        assert_eq!(names(&places(&planner).await), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_chat_keeps_anchors_when_reply_omits_them() {
        let home = place("home", 0.0);
        let (planner, backend) = setup(PlacesData::new(vec![], Some(home.clone()), None)).await;
        backend.push_chat_reply(ChatReply {
            session_id: "sess".to_string(),
            places: Some(vec![place("x", 1.0)]),
            start: Field::Cleared,
            ..Default::default()
        });

        planner.dispatch(Intent::Chat { query: "x".to_string() }).await;

        let data = places(&planner).await;
        assert_eq!(data.start, Some(home));
        assert_eq!(data.end, None);
        assert_eq!(data.places.len(), 1);
    }

    #[tokio::test]
    async fn test_chat_failure_surfaces_detail() {
        let (planner, backend) = setup(PlacesData::default()).await;
        backend.fail_next("chat", 500, r#"{"detail":"LLM unavailable"}"#);

        let outcome = planner.dispatch(Intent::Chat { query: "hi".to_string() }).await;

        assert_eq!(outcome, Outcome::Failed(Notice::error("LLM unavailable")));
        assert_eq!(planner.session_id().await.as_deref(), Some("sess"));
    }

    #[tokio::test]
    async fn test_empty_chat_is_skipped() {
        let (planner, backend) = setup(PlacesData::default()).await;
        let outcome = planner.dispatch(Intent::Chat { query: "   ".to_string() }).await;
        assert_eq!(outcome, Outcome::Skipped(Precondition::EmptyMessage));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_find_places_preconditions() {
        let backend = Arc::new(FakeBackend::new());
        let no_session = Planner::new(SessionStore::spawn(), backend.clone());
        let find = |count| Intent::FindPlaces {
            business_type: "cafe".to_string(),
            location: "Pune".to_string(),
            count,
        };

        assert_eq!(no_session.dispatch(find(5)).await, Outcome::Skipped(Precondition::NoSession));

        let planner = no_session.with_session_id(Some("sess".to_string()));
        assert_eq!(
            planner.dispatch(find(0)).await,
            Outcome::Skipped(Precondition::CountOutOfRange(0))
        );
        assert_eq!(
            planner.dispatch(find(21)).await,
            Outcome::Skipped(Precondition::CountOutOfRange(21))
        );
        assert_eq!(
            planner
                .dispatch(Intent::FindPlaces {
                    business_type: String::new(),
                    location: "Pune".to_string(),
                    count: 5,
                })
                .await,
            Outcome::Skipped(Precondition::EmptySearch)
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_find_places_appends_results() {
        let a = place("a", 1.0);
        let (planner, backend) = setup(PlacesData::new(vec![a.clone()], None, None)).await;
        backend.set_search_results(vec![Place::new("Cafe 1", 2.0, 2.0), Place::new("Cafe 2", 3.0, 3.0)]);

        let outcome = planner
            .dispatch(Intent::FindPlaces {
                business_type: "cafe".to_string(),
                location: "Pune".to_string(),
                count: 2,
            })
            .await;

        assert_eq!(outcome, Outcome::Applied(Some(Notice::success("Places found"))));
        assert_eq!(names(&places(&planner).await), vec!["A", "Cafe 1", "Cafe 2"]);
        assert_eq!(
            backend.calls(),
            vec![Call::FindPlaces {
                business_type: "cafe".to_string(),
                location: "Pune".to_string(),
                count: 2,
            }]
        );
    }

    #[tokio::test]
    async fn test_add_custom_place_replaces_with_backend_payload() {
        let (planner, backend) = setup(PlacesData::default()).await;
        backend.set_geocode_reply(GeoPoint {
            latitude: 18.5,
            longitude: 73.8,
        });

        let outcome = planner
            .dispatch(Intent::AddCustomPlace {
                name: "Shaniwar Wada".to_string(),
                address: "Shaniwar Peth, Pune".to_string(),
            })
            .await;

        assert_eq!(outcome, Outcome::Applied(Some(Notice::success("Place added"))));
        let data = places(&planner).await;
        assert_eq!(data.places.len(), 1);
        assert_eq!(data.places[0].id.as_deref(), Some("srv-0"));
        assert_eq!(data.places[0].address.as_deref(), Some("Shaniwar Peth, Pune"));
        assert_eq!(backend.call_names(), vec!["geocode", "add_place"]);
    }

    #[tokio::test]
    async fn test_add_custom_place_requires_name_and_address() {
        let (planner, backend) = setup(PlacesData::default()).await;
        let outcome = planner
            .dispatch(Intent::AddCustomPlace {
                name: "Somewhere".to_string(),
                address: " ".to_string(),
            })
            .await;
        assert_eq!(outcome, Outcome::Skipped(Precondition::MissingNameOrAddress));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_duplicate_place_fails_and_keeps_store() {
        let a = Place::new("A", 18.5, 73.8).with_id("a");
        let (planner, backend) = setup(PlacesData::new(vec![a.clone()], None, None)).await;
        backend.set_geocode_reply(GeoPoint {
            latitude: 18.5,
            longitude: 73.8,
        });

        let outcome = planner
            .dispatch(Intent::AddCustomPlace {
                name: "A twin".to_string(),
                address: "Same spot".to_string(),
            })
            .await;

        assert_eq!(outcome, Outcome::Failed(Notice::error("Place already exists")));
        assert_eq!(places(&planner).await.places, vec![a]);
    }

    #[tokio::test]
    async fn test_unknown_address_reports_geocoding_failure() {
        let a = place("a", 1.0);
        let (planner, backend) = setup(PlacesData::new(vec![a.clone()], None, None)).await;
        backend.fail_next("geocode", 404, "Location not found");

        let outcome = planner
            .dispatch(Intent::AddCustomPlace {
                name: "Nowhere".to_string(),
                address: "Atlantis".to_string(),
            })
            .await;

        assert_eq!(
            outcome,
            Outcome::Failed(Notice::error("Geocoding failed: Location not found"))
        );
        assert_eq!(backend.call_names(), vec!["geocode"]);
        assert_eq!(places(&planner).await.places, vec![a]);
    }

    #[tokio::test]
    async fn test_remove_start_place_resets_role_first() {
        let s = place("s", 1.0);
        let a = place("a", 2.0);
        let (planner, backend) = setup(PlacesData::new(vec![s.clone(), a.clone()], Some(s.clone()), None)).await;

        let outcome = planner
            .dispatch(Intent::RemovePlace {
                place_id: "s".to_string(),
            })
            .await;

        assert_eq!(outcome, Outcome::Applied(Some(Notice::success("Place removed"))));
        assert_eq!(
            backend.calls(),
            vec![
                Call::ResetStartEnd {
                    reset_start: true,
                    reset_end: false,
                },
                Call::RemovePlace {
                    place_id: "s".to_string(),
                },
            ]
        );
        let data = places(&planner).await;
        assert_eq!(data.start, None);
        assert_eq!(data.places, vec![a]);
    }

    #[tokio::test]
    async fn test_remove_continues_when_role_release_fails() {
        let s = place("s", 1.0);
        let a = place("a", 2.0);
        let (planner, backend) = setup(PlacesData::new(vec![s.clone(), a.clone()], Some(s.clone()), None)).await;
        backend.fail_next("reset_start_end", 500, r#"{"detail":"Failed to reset start/end: boom"}"#);

        let outcome = planner
            .dispatch(Intent::RemovePlace {
                place_id: "s".to_string(),
            })
            .await;

        assert_eq!(outcome, Outcome::Applied(Some(Notice::success("Place removed"))));
        assert_eq!(backend.call_names(), vec!["reset_start_end", "remove_place"]);
        let data = places(&planner).await;
        assert_eq!(data.places, vec![a]);
        assert_eq!(data.start, None);
    }

    #[tokio::test]
    async fn test_remove_regular_place_skips_role_reset() {
        let (planner, backend) = setup(PlacesData::new(vec![place("a", 1.0), place("b", 2.0)], None, None)).await;

        planner
            .dispatch(Intent::RemovePlace {
                place_id: "b".to_string(),
            })
            .await;

        assert_eq!(backend.call_names(), vec!["remove_place"]);
        assert_eq!(names(&places(&planner).await), vec!["A"]);
    }

    #[tokio::test]
    async fn test_reorder_applies_locally_then_confirms() {
        let (a, b, c) = (place("a", 1.0), place("b", 2.0), place("c", 3.0));
        let (planner, backend) = setup(PlacesData::new(vec![a, b, c], None, None)).await;

        let outcome = planner.dispatch(Intent::Reorder { from: 0, to: 2 }).await;
        assert_eq!(outcome, Outcome::Applied(None));
        assert_eq!(names(&places(&planner).await), vec!["B", "C", "A"]);

        planner.settle().await;
        assert_eq!(
            backend.calls(),
            vec![Call::ConfirmPlaces {
                ids: vec!["b".to_string(), "c".to_string(), "a".to_string()],
            }]
        );
        assert_eq!(names(&places(&planner).await), vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn test_failed_reorder_is_not_rolled_back() {
        let (planner, backend) = setup(PlacesData::new(vec![place("a", 1.0), place("b", 2.0)], None, None)).await;
        backend.fail_next("confirm_places", 500, r#"{"detail":"Failed to update places"}"#);
        let mut notices = planner.subscribe_notices();

        planner.dispatch(Intent::Reorder { from: 1, to: 0 }).await;
        planner.settle().await;

        assert_eq!(names(&places(&planner).await), vec!["B", "A"]);
        let notice = notices.try_recv().unwrap();
        assert!(notice.is_error());
        assert_eq!(notice.message, "Failed to update places");
    }

    #[tokio::test]
    async fn test_finished_confirmations_are_pruned() {
        let (planner, _backend) = setup(PlacesData::new(vec![place("a", 1.0), place("b", 2.0)], None, None)).await;

        for _ in 0..5 {
            planner.dispatch(Intent::Reorder { from: 0, to: 1 }).await;
            // Let the confirmation run to completion without draining
            for _ in 0..100 {
                if planner.pending.lock().await.iter().all(|h| h.is_finished()) {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        }

        assert_eq!(planner.pending.lock().await.len(), 1);
        planner.settle().await;
        assert!(planner.pending.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_reorder_out_of_range_is_skipped() {
        let (planner, backend) = setup(PlacesData::new(vec![place("a", 1.0)], None, None)).await;
        assert_eq!(
            planner.dispatch(Intent::Reorder { from: 0, to: 3 }).await,
            Outcome::Skipped(Precondition::InvalidMove { from: 0, to: 3 })
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_start_on_end_place_closes_loop() {
        let x = place("x", 1.0);
        let (planner, _backend) = setup(PlacesData::new(vec![x.clone()], None, Some(x.clone()))).await;

        let outcome = planner
            .dispatch(Intent::ToggleRole {
                place: x.clone(),
                role: Anchor::Start,
                checked: true,
            })
            .await;

        assert_eq!(outcome, Outcome::Applied(None));
        let data = places(&planner).await;
        assert_eq!(data.start, Some(x.clone()));
        assert_eq!(data.end, Some(x));
        assert!(data.is_closed_loop());
    }

    #[tokio::test]
    async fn test_optimize_needs_two_places() {
        let (planner, backend) = setup(PlacesData::new(vec![place("a", 1.0)], None, None)).await;
        let outcome = planner
            .dispatch(Intent::Optimize {
                algo: Algorithm::Nn,
                return_to_start: true,
            })
            .await;
        assert_eq!(outcome, Outcome::Skipped(Precondition::NotEnoughPlaces));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_optimize_projects_result() {
        let (s, e) = (place("s", 0.0), place("e", 9.0));
        let (x, y) = (place("x", 1.0), place("y", 2.0));
        let (planner, backend) = setup(PlacesData::new(vec![x.clone(), y.clone()], Some(s.clone()), Some(e.clone()))).await;
        backend.set_optimize_reply(OptimizeRouteResponse {
            optimized_places: vec![s.clone(), y.clone(), x.clone(), e.clone()],
            total_distance: Some(12345.0),
            total_time: Some(125.0),
            start: Some(s),
            end: Some(e),
            ..Default::default()
        });

        let outcome = planner
            .dispatch(Intent::Optimize {
                algo: Algorithm::Nn2opt,
                return_to_start: true,
            })
            .await;

        assert_eq!(outcome, Outcome::Applied(None));
        // A distinct end point rules out returning to start
        assert_eq!(
            backend.calls(),
            vec![Call::OptimizeRoute {
                algo: Algorithm::Nn2opt,
                return_to_start: false,
            }]
        );
        let stats = planner.snapshot().await.unwrap().result.unwrap().stats.unwrap();
        assert_eq!(stats.distance_label(), "12.3 km");
        assert_eq!(stats.duration_label(), "2 min");
        assert_eq!(stats.stops, Some(4));
    }

    #[tokio::test]
    async fn test_optimize_failure_notice() {
        let (planner, _backend) = setup(PlacesData::new(vec![place("a", 1.0), place("b", 2.0)], None, None)).await;

        let outcome = planner
            .dispatch(Intent::Optimize {
                algo: Algorithm::Ga,
                return_to_start: false,
            })
            .await;

        assert_eq!(
            outcome,
            Outcome::Failed(Notice::error("Optimization failed: No places to optimize."))
        );
        assert_eq!(planner.snapshot().await.unwrap().result, None);
    }

    #[tokio::test]
    async fn test_apply_and_discard_result() {
        let (a, b) = (place("a", 1.0), place("b", 2.0));
        let (planner, backend) = setup(PlacesData::new(vec![a.clone(), b.clone()], Some(a.clone()), None)).await;
        backend.set_optimize_reply(OptimizeRouteResponse {
            optimized_places: vec![a.clone(), b.clone(), a.clone()],
            start: Some(a.clone()),
            ..Default::default()
        });

        assert_eq!(planner.dispatch(Intent::ApplyResult).await, Outcome::Skipped(Precondition::NoResult));

        planner
            .dispatch(Intent::Optimize {
                algo: Algorithm::Nn,
                return_to_start: true,
            })
            .await;
        assert_eq!(planner.dispatch(Intent::ApplyResult).await, Outcome::Applied(None));

        let snapshot = planner.snapshot().await.unwrap();
        assert_eq!(snapshot.result, None);
        assert_eq!(snapshot.data.places, vec![a.clone(), b, a.clone()]);
        assert_eq!(snapshot.data.start, Some(a));

        planner
            .dispatch(Intent::Optimize {
                algo: Algorithm::Nn,
                return_to_start: true,
            })
            .await;
        assert!(planner.snapshot().await.unwrap().result.is_some());
        assert_eq!(planner.dispatch(Intent::DiscardResult).await, Outcome::Applied(None));
        assert_eq!(planner.snapshot().await.unwrap().result, None);
    }

    #[tokio::test]
    async fn test_notices_are_broadcast() {
        let (planner, backend) = setup(PlacesData::new(vec![place("a", 1.0)], None, None)).await;
        let mut notices = planner.subscribe_notices();

        planner
            .dispatch(Intent::RemovePlace {
                place_id: "a".to_string(),
            })
            .await;
        backend.fail_next("remove_place", 404, r#"{"detail":"Place not found"}"#);
        planner
            .dispatch(Intent::RemovePlace {
                place_id: "zzz".to_string(),
            })
            .await;

        assert_eq!(notices.try_recv().unwrap(), Notice::success("Place removed"));
        assert_eq!(notices.try_recv().unwrap(), Notice::error("Place not found"));
    }
}
