use super::*;
use chrono::NaiveDate;
use shared::domain::Money;

const LATENCY: Duration = Duration::from_millis(1000);

fn store() -> (EventsStore, broadcast::Receiver<ClientEvent>) {
    let catalog = shared::seed::catalog().expect("bundled catalog");
    let (notifier, rx) = broadcast::channel(32);
    (EventsStore::new(catalog, LATENCY, notifier), rx)
}

fn draft(title: &str, price_cents: u64) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        date: NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date"),
        time: "10:00 AM - 4:00 PM".to_string(),
        location: "Pier 9, San Francisco".to_string(),
        category: "Technology".to_string(),
        price: Money::from_cents(price_cents),
        description: "Hands-on robotics workshops.".to_string(),
        image: "https://example.com/robots.jpg".to_string(),
        capacity: 120,
        organizer: "Bay Makers".to_string(),
        featured: false,
    }
}

#[tokio::test(start_paused = true)]
async fn added_event_is_retrievable_with_its_assigned_id() {
    let (store, _rx) = store();
    let before = store.events().await.len();

    let added = store
        .add_event(draft("Robotics Day", 10_000))
        .await
        .expect("add resolves");

    assert!(added.id.as_str().starts_with("event-"));
    assert_eq!(
        store.get_event(&added.id).await,
        Some(Event::from_draft(added.id.clone(), draft("Robotics Day", 10_000)))
    );
    assert_eq!(store.events().await.len(), before + 1);
}

#[tokio::test(start_paused = true)]
async fn deleted_event_is_gone_but_its_registrations_remain() {
    let (store, _rx) = store();
    let id = EventId::from("event-1");

    assert!(store.delete_event(id.clone()).await.expect("delete resolves"));

    assert!(store.get_event(&id).await.is_none());
    assert_eq!(store.get_event_registrations(&id).await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_ids_still_report_success() {
    let (store, mut rx) = store();
    let ghost = EventId::from("event-404");

    assert!(store
        .update_event(ghost.clone(), EventPatch::default())
        .await
        .expect("update resolves"));
    assert!(store.delete_event(ghost).await.expect("delete resolves"));
    assert!(store
        .update_registration_status(RegistrationId::from("reg-404"), RegistrationStatus::Cancelled)
        .await
        .expect("status resolves"));

    assert_eq!(store.events().await.len(), 8);
    assert!(rx.try_recv().is_err(), "no change should be announced");
}

#[tokio::test(start_paused = true)]
async fn update_merges_only_the_patched_fields() {
    let (store, _rx) = store();
    let id = EventId::from("event-2");
    let original = store.get_event(&id).await.expect("seeded");

    let patch = EventPatch {
        price: Some(Money::from_cents(9_500)),
        featured: Some(false),
        ..EventPatch::default()
    };
    assert!(store.update_event(id.clone(), patch).await.expect("update resolves"));

    let updated = store.get_event(&id).await.expect("still present");
    assert_eq!(updated.price, Money::from_cents(9_500));
    assert!(!updated.featured);
    assert_eq!(updated.title, original.title);
    assert_eq!(updated.capacity, original.capacity);
}

#[tokio::test(start_paused = true)]
async fn booking_snapshots_the_total_and_confirms() {
    let (store, mut rx) = store();
    let added = store
        .add_event(draft("Robotics Day", 10_000))
        .await
        .expect("add resolves");
    let _ = rx.recv().await;

    assert!(store
        .register_for_event(
            added.id.clone(),
            UserId::from("user-id-456"),
            "Regular User".to_string(),
            "user@example.com".to_string(),
            2,
        )
        .await
        .expect("booking resolves"));

    let registrations = store.get_event_registrations(&added.id).await;
    assert_eq!(registrations.len(), 1);
    let registration = &registrations[0];
    assert_eq!(registration.total_price, Money::from_cents(20_000));
    assert_eq!(registration.status, RegistrationStatus::Confirmed);
    assert_eq!(registration.ticket_count, 2);
    assert!(registration.id.as_str().starts_with("reg-"));
    assert!(matches!(
        rx.recv().await.expect("notification"),
        ClientEvent::RegistrationsChanged { registration_id } if registration_id == registration.id
    ));

    store
        .update_event(
            added.id.clone(),
            EventPatch {
                price: Some(Money::from_cents(15_000)),
                ..EventPatch::default()
            },
        )
        .await
        .expect("update resolves");
    let after = store.get_event_registrations(&added.id).await;
    assert_eq!(after[0].total_price, Money::from_cents(20_000));
}

#[tokio::test(start_paused = true)]
async fn booking_an_unknown_event_changes_nothing() {
    let (store, _rx) = store();
    let before = store.registrations().await.len();

    let booked = store
        .register_for_event(
            EventId::from("event-404"),
            UserId::from("user-id-456"),
            "Regular User".to_string(),
            "user@example.com".to_string(),
            1,
        )
        .await
        .expect("booking resolves");

    assert!(!booked);
    assert_eq!(store.registrations().await.len(), before);
}

#[tokio::test(start_paused = true)]
async fn booking_zero_tickets_is_rejected() {
    let (store, _rx) = store();
    let before = store.registrations().await.len();

    let booked = store
        .register_for_event(
            EventId::from("event-1"),
            UserId::from("user-id-456"),
            "Regular User".to_string(),
            "user@example.com".to_string(),
            0,
        )
        .await
        .expect("booking resolves");

    assert!(!booked);
    assert_eq!(store.registrations().await.len(), before);
}

#[tokio::test(start_paused = true)]
async fn status_update_touches_only_the_status() {
    let (store, _rx) = store();
    let id = RegistrationId::from("reg-1");
    let before = store.registrations().await;

    assert!(store
        .update_registration_status(id.clone(), RegistrationStatus::Cancelled)
        .await
        .expect("status resolves"));

    let after = store.registrations().await;
    assert_eq!(after.len(), before.len());
    for (old, new) in before.iter().zip(&after) {
        if old.id == id {
            assert_eq!(new.status, RegistrationStatus::Cancelled);
            assert_eq!(
                Registration {
                    status: old.status,
                    ..new.clone()
                },
                *old
            );
        } else {
            assert_eq!(new, old);
        }
    }
}

#[tokio::test]
async fn registration_lookups_filter_by_user_and_event() {
    let (store, _rx) = store();

    let mine = store
        .get_user_registrations(&UserId::from("user-id-456"))
        .await;
    let ids: Vec<&str> = mine.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["reg-1", "reg-2"]);

    let for_event = store
        .get_event_registrations(&EventId::from("event-3"))
        .await;
    assert_eq!(for_event.len(), 1);
    assert_eq!(for_event[0].user_name, "Jane Smith");
}

#[tokio::test(start_paused = true)]
async fn operations_issued_back_to_back_apply_in_order() {
    let (store, _rx) = store();
    let id = EventId::from("event-5");

    let rename = store.update_event(
        id.clone(),
        EventPatch {
            title: Some("Renamed".to_string()),
            ..EventPatch::default()
        },
    );
    let delete = store.delete_event(id.clone());
    let late_rename = store.update_event(
        id.clone(),
        EventPatch {
            title: Some("Too late".to_string()),
            ..EventPatch::default()
        },
    );

    drop(rename);
    assert!(late_rename.await.expect("resolves"));
    assert!(delete.await.expect("resolves"));
    assert!(store.get_event(&id).await.is_none());
}
