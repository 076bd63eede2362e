use std::{sync::Arc, time::Duration};

use chrono::{TimeZone, Utc};
use client_core::{AppContext, ClientEvent, NetworkProfile};
use shared::{
    domain::{EventId, RegistrationStatus},
    query::{self, DashboardStats, EventFilter},
};
use storage::{LocalStorage, MemoryStorage, Storage};
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn user_books_and_admin_reviews_the_registration() {
    let storage = Arc::new(MemoryStorage::new());
    let ctx = AppContext::initialize(storage.clone(), NetworkProfile::default())
        .await
        .expect("initialize context");
    let mut notifications = ctx.subscribe_events();

    let started = Instant::now();
    assert!(ctx
        .sign_in("user@example.com", "password123")
        .expect("valid form")
        .await
        .expect("login resolves"));
    assert!(started.elapsed() >= Duration::from_millis(1000));

    let event_id = EventId::from("event-4");
    assert!(ctx
        .book_event(event_id.clone(), 2)
        .await
        .expect("signed in")
        .await
        .expect("booking resolves"));

    let user = ctx.session().await.user.expect("signed in");
    let mine = ctx.events.get_user_registrations(&user.id).await;
    let booking = mine
        .iter()
        .find(|registration| registration.event_id == event_id && registration.ticket_count == 2)
        .expect("new booking listed");
    assert_eq!(booking.total_price.cents(), 24_000);
    assert_eq!(booking.status, RegistrationStatus::Confirmed);

    ctx.auth.logout().await.expect("logout");
    assert!(storage
        .get_item("eventVista_user")
        .await
        .expect("read storage")
        .is_none());

    ctx.sign_in("admin@eventvista.com", "admin123")
        .expect("valid form")
        .await
        .expect("login resolves");
    assert!(ctx.session().await.is_admin());
    assert!(ctx
        .events
        .update_registration_status(booking.id.clone(), RegistrationStatus::Pending)
        .await
        .expect("status resolves"));

    let stats = DashboardStats::compute(
        &ctx.events.events().await,
        &ctx.events.registrations().await,
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("valid instant"),
    );
    assert_eq!(stats.total_registrations, 6);
    assert_eq!(stats.pending_registrations, 2);

    let mut seen = Vec::new();
    while let Ok(event) = notifications.try_recv() {
        seen.push(event);
    }
    assert!(matches!(seen.first(), Some(ClientEvent::SessionChanged(Some(_)))));
    assert!(seen
        .iter()
        .any(|event| matches!(event, ClientEvent::RegistrationsChanged { .. })));

    ctx.shutdown().await;
}

#[tokio::test]
async fn tech_search_matches_title_description_or_location() {
    let ctx = AppContext::initialize(Arc::new(MemoryStorage::new()), NetworkProfile::instant())
        .await
        .expect("initialize context");
    let events = ctx.events.events().await;

    let filter = EventFilter {
        search: Some("Tech".to_string()),
        ..EventFilter::default()
    };
    let found = query::filter_events(&events, &filter);

    let expected: Vec<_> = events
        .iter()
        .filter(|event| {
            [&event.title, &event.description, &event.location]
                .iter()
                .any(|field| field.to_lowercase().contains("tech"))
        })
        .cloned()
        .collect();
    assert!(!found.is_empty());
    assert_eq!(found, expected);
}

#[tokio::test]
async fn session_survives_a_restart_on_sqlite_storage() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("eventvista.db");
    let url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    {
        let storage = Arc::new(Storage::new(&url).await.expect("open storage"));
        let ctx = AppContext::initialize(storage, NetworkProfile::instant())
            .await
            .expect("initialize context");
        ctx.sign_in("admin@eventvista.com", "admin123")
            .expect("valid form")
            .await
            .expect("login resolves");
        ctx.shutdown().await;
    }

    let storage = Arc::new(Storage::new(&url).await.expect("reopen storage"));
    let ctx = AppContext::initialize(storage, NetworkProfile::instant())
        .await
        .expect("initialize context");
    let user = ctx.session().await.user.expect("session restored");
    assert_eq!(user.email, "admin@eventvista.com");
}
