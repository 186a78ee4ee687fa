use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use chrono::Utc;
use eventdesk_api::{ApiClient, ApiError, EventList};
use eventdesk_reservation::{ExportError, RosterQuery, RosterStats, Selection, export_csv};
use eventdesk_session::{
    FileCookieJar, FileStorage, RealtimeChannel, SessionError, SessionOptions, SessionState,
    SessionStore, Transport,
};
use eventdesk_shared::{
    DashboardStats, Event, EventDraft, EventFilters, EventPayload, LoginRequest, Navigator,
    Notice, Notifier, OccupancyReport, ProfileUpdate, RegisterRequest, Reservation, User,
};

use crate::{
    config::Config,
    error::AppError,
    guard::{self, Decision},
};

/// An event together with its reservations, as shown to administrators.
#[derive(Clone, Debug)]
pub struct Roster {
    pub event: Event,
    pub reservations: Vec<Reservation>,
}

impl Roster {
    pub fn view(&self, query: &RosterQuery) -> Vec<&Reservation> {
        query.apply(&self.reservations)
    }

    pub fn stats(&self) -> RosterStats {
        RosterStats::new(&self.event, &self.reservations)
    }
}

/// Application root: owns the session and the API client and turns
/// failures into notices and navigation.
pub struct App {
    config: Config,
    api: ApiClient,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    expired: AtomicBool,
}

impl App {
    pub fn new(
        config: Config,
        session: SessionStore,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, AppError> {
        let api = ApiClient::new(
            &config.api.base_url,
            config.api.timeout(),
            Arc::new(session.clone()),
        )?;

        Ok(Self {
            config,
            api,
            session,
            notifier,
            navigator,
            expired: AtomicBool::new(false),
        })
    }

    /// Opens the session kept under `session.data_dir`.
    pub fn from_config(
        config: Config,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, AppError> {
        let dir = &config.session.data_dir;
        let session = SessionStore::open(
            Arc::new(FileStorage::new(dir)),
            Arc::new(FileCookieJar::new(dir.join("cookies.txt"))),
            Arc::new(RealtimeChannel::new(transport)),
            SessionOptions {
                storage_key: config.session.storage_key.clone(),
                cookie_name: config.session.cookie_name.clone(),
                cookie_max_age: time::Duration::days(config.session.cookie_max_age_days),
            },
        )?;

        Self::new(config, session, notifier, navigator)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn initialize(&self) -> SessionState {
        self.session.initialize()
    }

    /// Runs the route guard for `path`, redirecting when it refuses.
    pub fn guard(&self, path: &str) -> Result<(), AppError> {
        match guard::check(path, self.session.has_cookie()) {
            Decision::Allow => Ok(()),
            Decision::Redirect { to, clear_cookie } => {
                tracing::debug!(path, to, "route guard redirect");
                if clear_cookie {
                    if let Err(err) = self.session.clear_cookie() {
                        tracing::warn!(err = %err, "failed to clear stale cookie");
                    }
                }
                self.navigator.redirect(to);
                Err(AppError::Redirected(to.to_owned()))
            }
        }
    }

    pub fn require_session(&self) -> Result<User, AppError> {
        match self.session.user() {
            Some(user) => Ok(user),
            None => {
                self.navigator.redirect("/login");
                Err(AppError::Redirected("/login".to_owned()))
            }
        }
    }

    pub fn require_admin(&self) -> Result<User, AppError> {
        let user = self.require_session()?;

        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, "administrator route refused");
            self.navigator.redirect("/login");
            return Err(AppError::Redirected("/login".to_owned()));
        }

        Ok(user)
    }

    /// The one place a rejected session is dealt with: the session is reset
    /// and the user sent to the login page once per expiry.
    pub fn handle_unauthenticated(&self) {
        if self.expired.swap(true, Ordering::SeqCst) {
            tracing::debug!("session expiry already handled");
            return;
        }

        tracing::warn!("session rejected by the server, signing out");
        if let Err(err) = self.session.reset() {
            tracing::error!(err = %err, "failed to clear the rejected session");
        }

        self.notifier.notify(Notice::warning(
            "Your session has expired. Please log in again.",
        ));
        self.navigator.redirect("/login");
    }

    fn check<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        result.inspect_err(|err| {
            if err.is_unauthenticated() {
                self.handle_unauthenticated();
            }
        })
    }

    fn report(&self, err: &ApiError, fallback: &str) {
        if !err.is_unauthenticated() {
            self.notifier.notify(Notice::error(err.user_message(fallback)));
        }
    }

    fn signed_in(&self, user: &User, message: &str) {
        self.expired.store(false, Ordering::SeqCst);
        self.notifier.notify(Notice::success(message));
        self.navigator.redirect("/");
        tracing::info!(user_id = %user.id, "session started");
    }

    fn sign_in_failed(&self, err: &SessionError) {
        let message = if err.is_unauthenticated() {
            "Invalid email or password.".to_owned()
        } else {
            err.user_message("Could not process the request")
        };
        self.notifier.notify(Notice::error(message));
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<User, AppError> {
        match self.session.login(&self.api, request).await {
            Ok(user) => {
                self.signed_in(&user, "Logged in successfully!");
                Ok(user)
            }
            Err(err) => {
                self.sign_in_failed(&err);
                Err(err.into())
            }
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AppError> {
        match self.session.register(&self.api, request).await {
            Ok(user) => {
                self.signed_in(&user, "Account created successfully!");
                Ok(user)
            }
            Err(err) => {
                self.sign_in_failed(&err);
                Err(err.into())
            }
        }
    }

    pub fn logout(&self) -> Result<(), AppError> {
        self.session.logout()?;
        self.notifier.notify(Notice::info("You have been logged out."));
        self.navigator.redirect("/login");

        Ok(())
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, AppError> {
        if update.is_empty() {
            self.notifier.notify(Notice::info("Nothing to update."));
            return self.require_session();
        }

        match self.session.update_profile(&self.api, update).await {
            Ok(user) => {
                self.notifier.notify(Notice::success("Profile updated successfully!"));
                Ok(user)
            }
            Err(SessionError::Api(err)) => {
                if err.is_unauthenticated() {
                    self.handle_unauthenticated();
                }
                self.report(&err, "Could not update the profile");
                Err(err.into())
            }
            Err(SessionError::NotAuthenticated) => {
                self.navigator.redirect("/login");
                Err(SessionError::NotAuthenticated.into())
            }
            Err(err) => {
                self.notifier.notify(Notice::error("Could not update the profile"));
                Err(err.into())
            }
        }
    }

    /// Public listing. Failures leave an empty list and a notice.
    pub async fn browse_events(&self, filters: &EventFilters) -> EventList {
        match self.check(self.api.list_events(filters).await) {
            Ok(list) => list,
            Err(err) => {
                self.report(&err, "Could not load events");
                EventList::default()
            }
        }
    }

    pub async fn event_details(&self, id: &str) -> Option<Event> {
        match self.check(self.api.get_event(id).await) {
            Ok(event) => Some(event),
            Err(err) if err.is_not_found() => {
                self.notifier.notify(Notice::error("Event not found"));
                self.navigator.redirect("/");
                None
            }
            Err(err) => {
                self.report(&err, "Could not load the event");
                None
            }
        }
    }

    /// Reserves a spot and returns the event as it stands afterwards.
    pub async fn reserve(&self, event_id: &str) -> Result<Option<Event>, AppError> {
        self.require_session()?;

        if let Err(err) = self.check(self.api.reserve(event_id).await) {
            self.report(&err, "Could not make the reservation");
            return Err(err.into());
        }

        self.notifier.notify(Notice::success("Reservation confirmed!"));

        Ok(self.check(self.api.get_event(event_id).await).ok())
    }

    fn validated(&self, draft: &EventDraft, editing: bool) -> Result<EventPayload, AppError> {
        draft.to_payload(Utc::now(), editing).map_err(|err| {
            self.notifier.notify(Notice::error(err.to_string()));
            AppError::from(err)
        })
    }

    pub async fn create_event(&self, draft: &EventDraft) -> Result<Option<Event>, AppError> {
        self.require_admin()?;
        let payload = self.validated(draft, false)?;

        match self.check(self.api.create_event(&payload).await) {
            Ok(event) => {
                self.notifier.notify(Notice::success("Event created successfully!"));
                self.navigator.redirect("/admin/dashboard");
                Ok(event)
            }
            Err(err) => {
                self.report(&err, "Could not create the event");
                Err(err.into())
            }
        }
    }

    /// Loads an event into an edit form.
    pub async fn edit_draft(&self, id: &str) -> Option<EventDraft> {
        self.require_admin().ok()?;

        match self.check(self.api.get_event(id).await) {
            Ok(event) => Some(EventDraft::from_event(&event)),
            Err(err) => {
                if !err.is_unauthenticated() {
                    self.notifier.notify(Notice::error("Could not load the event"));
                    self.navigator.redirect("/admin/dashboard");
                }
                None
            }
        }
    }

    pub async fn update_event(
        &self,
        id: &str,
        draft: &EventDraft,
    ) -> Result<Option<Event>, AppError> {
        self.require_admin()?;
        let payload = self.validated(draft, true)?;

        match self.check(self.api.update_event(id, &payload).await) {
            Ok(event) => {
                self.notifier.notify(Notice::success("Event updated successfully!"));
                self.navigator.redirect("/admin/dashboard");
                Ok(event)
            }
            Err(err) => {
                let message = match &err {
                    ApiError::Unauthenticated => None,
                    ApiError::Validation { .. } | ApiError::Transport(_) => {
                        Some(err.user_message(""))
                    }
                    ApiError::NotFound(_) => Some("Event not found".to_owned()),
                    ApiError::Forbidden(_) => {
                        Some("You do not have permission to edit this event".to_owned())
                    }
                    _ => Some("Internal server error. Please try again.".to_owned()),
                };
                if let Some(message) = message {
                    self.notifier.notify(Notice::error(message));
                }
                Err(err.into())
            }
        }
    }

    pub async fn delete_event(&self, id: &str) -> Result<(), AppError> {
        self.require_admin()?;

        match self.check(self.api.delete_event(id).await) {
            Ok(()) => {
                self.notifier.notify(Notice::success("Event deleted successfully!"));
                Ok(())
            }
            Err(err) => {
                self.report(&err, "Could not delete the event");
                Err(err.into())
            }
        }
    }

    pub async fn my_reservations(&self) -> Vec<Reservation> {
        if self.require_session().is_err() {
            return vec![];
        }

        match self.check(self.api.my_reservations().await) {
            Ok(reservations) => reservations,
            Err(err) => {
                self.report(&err, "Could not load your reservations");
                vec![]
            }
        }
    }

    pub async fn cancel_reservation(&self, id: &str) -> Result<(), AppError> {
        self.require_session()?;

        match self.check(self.api.cancel_reservation(id).await) {
            Ok(()) => {
                self.notifier
                    .notify(Notice::success("Reservation canceled successfully!"));
                Ok(())
            }
            Err(err) => {
                self.report(&err, "Could not cancel the reservation");
                Err(err.into())
            }
        }
    }

    /// Event and roster for the administrator view. Failures send the user
    /// back to the dashboard.
    pub async fn load_roster(&self, event_id: &str) -> Option<Roster> {
        self.require_admin().ok()?;

        let result = async {
            let event = self.api.get_event(event_id).await?;
            let reservations = self.api.event_reservations(event_id).await?;
            Ok::<_, ApiError>(Roster {
                event,
                reservations,
            })
        }
        .await;

        match self.check(result) {
            Ok(roster) => Some(roster),
            Err(err) => {
                if !err.is_unauthenticated() {
                    let message = if err.is_not_found() {
                        "Event not found"
                    } else {
                        "Could not load data"
                    };
                    self.notifier.notify(Notice::error(message));
                    self.navigator.redirect("/admin/dashboard");
                }
                None
            }
        }
    }

    /// Cancels every selected reservation concurrently, then reloads the
    /// roster whatever the outcome. Cancelled ids leave the selection.
    pub async fn cancel_selected(
        &self,
        event_id: &str,
        selection: &mut Selection,
    ) -> Result<Vec<Reservation>, AppError> {
        self.require_admin()?;

        if selection.is_empty() {
            self.notifier.notify(Notice::warning(
                "Select at least one reservation to cancel",
            ));
            return Err(AppError::EmptySelection);
        }

        let ids = selection.ids().map(str::to_owned).collect::<Vec<_>>();
        let results =
            futures::future::join_all(ids.iter().map(|id| self.api.cancel_reservation(id))).await;

        let mut failed = 0;
        for (id, result) in ids.iter().zip(results) {
            match self.check(result) {
                Ok(()) => {
                    selection.remove(id);
                }
                Err(err) => {
                    failed += 1;
                    tracing::warn!(reservation_id = %id, err = %err, "cancellation failed");
                }
            }
        }

        if failed == 0 {
            self.notifier.notify(Notice::success(format!(
                "{} reservation(s) canceled successfully!",
                ids.len()
            )));
        } else {
            self.notifier
                .notify(Notice::error("Failed to cancel some reservations"));
        }

        match self.check(self.api.event_reservations(event_id).await) {
            Ok(reservations) => Ok(reservations),
            Err(err) => {
                self.report(&err, "Could not load data");
                Ok(vec![])
            }
        }
    }

    /// Writes the visible roster to `dir`. An empty view only warns.
    pub fn export_roster(
        &self,
        roster: &Roster,
        query: &RosterQuery,
        dir: &Path,
    ) -> Result<Option<PathBuf>, AppError> {
        let view = roster.view(query);
        let event_name = Some(roster.event.name.as_str());

        let export = match export_csv(&view, event_name, Utc::now().date_naive()) {
            Ok(export) => export,
            Err(ExportError::Empty) => {
                self.notifier.notify(Notice::warning("No reservations to export"));
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let path = export.write_to(dir)?;
        self.notifier.notify(Notice::success(format!(
            "{} reservation(s) exported to CSV",
            export.rows
        )));

        Ok(Some(path))
    }

    pub async fn occupancy_report(&self) -> Option<OccupancyReport> {
        self.require_admin().ok()?;

        match self.check(self.api.occupancy_report().await) {
            Ok(report) => Some(report),
            Err(err) => {
                self.report(&err, "Could not load reports");
                None
            }
        }
    }

    /// Every event (unpaginated) and the dashboard figures derived from them.
    pub async fn dashboard(&self) -> Option<(Vec<Event>, DashboardStats)> {
        self.require_admin().ok()?;

        let everything = EventFilters {
            page: 0,
            limit: 0,
            ..EventFilters::default()
        };

        match self.check(self.api.list_events(&everything).await) {
            Ok(list) => {
                let stats = DashboardStats::from_events(&list.events, Utc::now());
                Some((list.events, stats))
            }
            Err(err) => {
                self.report(&err, "Could not load events");
                None
            }
        }
    }
}
