use std::sync::Arc;

use eventdesk::{
    App, AppError, Config,
    config::{ApiConfig, ObservabilityConfig, SessionConfig},
};
use eventdesk_reservation::{RosterQuery, Selection};
use eventdesk_session::{
    CookieStore, MemoryCookieJar, MemoryStorage, RealtimeChannel, RecordingTransport,
    STORAGE_KEY, SessionOptions, SessionState, SessionStore, session_cookie,
};
use eventdesk_shared::{
    EventFilters, Level, LoginRequest, Notice, RecordingNavigator, RecordingNotifier,
};
use serde_json::{Value, json};
use temp_dir::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

struct Harness {
    app: App,
    storage: Arc<MemoryStorage>,
    cookies: MemoryCookieJar,
    transport: RecordingTransport,
    notifier: RecordingNotifier,
    navigator: RecordingNavigator,
}

impl Harness {
    fn errors(&self) -> Vec<String> {
        self.notifier
            .notices()
            .into_iter()
            .filter(|notice| notice.level == Level::Error)
            .map(|notice| notice.message)
            .collect()
    }
}

fn admin() -> Value {
    json!({
        "id": "admin-1",
        "email": "admin@example.com",
        "firstName": "Ada",
        "lastName": "Admin",
        "role": "ADMIN"
    })
}

fn event(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Rust meetup",
        "eventDate": "2030-03-01T18:00:00.000Z",
        "location": "Hall A",
        "maxCapacity": 10,
        "availableSpots": 7,
        "creatorId": "admin-1"
    })
}

fn reservation(id: &str, name: &str, date: &str) -> Value {
    json!({
        "id": id,
        "eventId": "e1",
        "userId": format!("user-{id}"),
        "reservationDate": date,
        "status": "CONFIRMED",
        "user": {"name": name, "email": format!("{id}@example.com")}
    })
}

fn harness(server: &MockServer, signed_in: bool) -> anyhow::Result<Harness> {
    let storage = Arc::new(MemoryStorage::default());
    if signed_in {
        storage.insert_raw(
            STORAGE_KEY,
            json!({"user": admin(), "token": "jwt-admin"}).to_string(),
        );
    }

    let cookies = MemoryCookieJar::default();
    let transport = RecordingTransport::default();
    let session = SessionStore::open(
        storage.clone(),
        Arc::new(cookies.clone()),
        Arc::new(RealtimeChannel::new(Arc::new(transport.clone()))),
        SessionOptions::default(),
    )?;

    let config = Config {
        api: ApiConfig {
            base_url: server.uri(),
            realtime_url: "ws://localhost:3001".to_owned(),
            timeout_secs: None,
        },
        session: SessionConfig::default(),
        observability: ObservabilityConfig::default(),
    };

    let notifier = RecordingNotifier::default();
    let navigator = RecordingNavigator::default();
    let app = App::new(
        config,
        session,
        Arc::new(notifier.clone()),
        Arc::new(navigator.clone()),
    )?;
    app.initialize();

    Ok(Harness {
        app,
        storage,
        cookies,
        transport,
        notifier,
        navigator,
    })
}

async fn mount_delete(server: &MockServer, id: &str, status: u16) {
    Mock::given(method("DELETE"))
        .and(path(format!("/reservations/{id}")))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_bulk_cancel_with_partial_failure() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_delete(&server, "r1", 200).await;
    mount_delete(&server, "r2", 500).await;
    mount_delete(&server, "r3", 204).await;
    Mock::given(method("GET"))
        .and(path("/events/e1/reservations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [reservation("r2", "Bruno", "2030-01-02T10:00:00.000Z")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, true)?;

    let mut selection = ["r1", "r2", "r3"]
        .into_iter()
        .map(str::to_owned)
        .collect::<Selection>();
    let refreshed = h.app.cancel_selected("e1", &mut selection).await?;

    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed[0].id, "r2");
    assert_eq!(selection.ids().collect::<Vec<_>>(), vec!["r2"]);
    assert_eq!(h.errors(), vec!["Failed to cancel some reservations"]);
    assert!(h.navigator.redirects().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_bulk_cancel_success() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_delete(&server, "r1", 200).await;
    mount_delete(&server, "r2", 200).await;
    Mock::given(method("GET"))
        .and(path("/events/e1/reservations"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, true)?;

    let mut selection = ["r1", "r2"]
        .into_iter()
        .map(str::to_owned)
        .collect::<Selection>();
    h.app.cancel_selected("e1", &mut selection).await?;

    assert!(selection.is_empty());
    assert_eq!(
        h.notifier.notices(),
        vec![Notice::success("2 reservation(s) canceled successfully!")]
    );

    Ok(())
}

#[tokio::test]
async fn test_empty_selection_sends_nothing() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let h = harness(&server, true)?;

    let err = h
        .app
        .cancel_selected("e1", &mut Selection::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::EmptySelection));
    assert!(server.received_requests().await.unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_rejected_session_redirects_once() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Token expired"})))
        .expect(3)
        .mount(&server)
        .await;
    let h = harness(&server, true)?;
    assert_eq!(h.app.session().state(), SessionState::Authenticated);
    assert_eq!(h.transport.live(), 1);

    for _ in 0..3 {
        let list = h.app.browse_events(&EventFilters::default()).await;
        assert!(list.events.is_empty());
    }

    assert_eq!(h.app.session().state(), SessionState::Anonymous);
    assert_eq!(h.storage.raw(STORAGE_KEY), None);
    assert!(!h.app.session().has_cookie());
    assert_eq!(h.transport.live(), 0);
    assert_eq!(h.navigator.redirects(), vec!["/login"]);
    assert_eq!(
        h.notifier.notices(),
        vec![Notice::warning("Your session has expired. Please log in again.")]
    );

    Ok(())
}

#[tokio::test]
async fn test_rejected_login_shows_credentials_message() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})),
        )
        .mount(&server)
        .await;
    let h = harness(&server, false)?;

    let result = h
        .app
        .login(&LoginRequest {
            email: "ana@example.com".to_owned(),
            password: "wrong".to_owned(),
        })
        .await;

    assert!(result.is_err());
    assert_eq!(h.errors(), vec!["Invalid email or password."]);
    assert!(h.navigator.redirects().is_empty());
    assert_eq!(h.app.session().state(), SessionState::Anonymous);

    Ok(())
}

#[tokio::test]
async fn test_guard_protects_routes() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let h = harness(&server, false)?;

    let err = h.app.guard("/admin/dashboard").unwrap_err();
    assert!(matches!(err, AppError::Redirected(ref to) if to == "/login"));
    assert!(h.app.guard("/events/e1").is_ok());

    h.cookies
        .set(session_cookie("token", "jwt", time::Duration::days(7)))?;
    assert!(h.app.guard("/admin/dashboard").is_ok());
    assert!(h.app.guard("/login").is_err());

    assert_eq!(h.navigator.redirects(), vec!["/login", "/"]);

    Ok(())
}

#[tokio::test]
async fn test_listing_failure_degrades_to_empty() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&server)
        .await;
    let h = harness(&server, false)?;

    let list = h.app.browse_events(&EventFilters::default()).await;

    assert!(list.events.is_empty());
    assert_eq!(h.errors().len(), 1);
    assert!(h.navigator.redirects().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_missing_event_redirects_home() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Not found"})))
        .mount(&server)
        .await;
    let h = harness(&server, false)?;

    assert!(h.app.event_details("missing").await.is_none());
    assert_eq!(h.errors(), vec!["Event not found"]);
    assert_eq!(h.navigator.redirects(), vec!["/"]);

    Ok(())
}

#[tokio::test]
async fn test_roster_export() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/e1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": event("e1")})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events/e1/reservations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                reservation("r1", "Ana", "2030-01-01T10:00:00.000Z"),
                reservation("r2", "Bruno", "2030-01-02T10:00:00.000Z"),
                reservation("r3", "Carla", "2030-01-03T10:00:00.000Z")
            ]
        })))
        .mount(&server)
        .await;
    let h = harness(&server, true)?;
    let dir = TempDir::new()?;

    let roster = h.app.load_roster("e1").await.unwrap();
    assert_eq!(roster.stats().total_reservations, 3);

    let query = RosterQuery {
        search: "bruno".to_owned(),
        ..RosterQuery::default()
    };
    let path = h.app.export_roster(&roster, &query, dir.path())?.unwrap();

    let content = std::fs::read_to_string(&path)?;
    let lines = content.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "Name,Email,Reservation date");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("\"Bruno\",\"r2@example.com\","));

    let nobody = RosterQuery {
        search: "nobody".to_owned(),
        ..RosterQuery::default()
    };
    assert_eq!(h.app.export_roster(&roster, &nobody, dir.path())?, None);
    assert_eq!(
        h.notifier.notices().last(),
        Some(&Notice::warning("No reservations to export"))
    );

    Ok(())
}
