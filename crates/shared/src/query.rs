//! Derived views recomputed by the view layer on every render. Nothing here
//! is owned by a container; every function takes plain slices.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Event, EventId, Money, Registration, RegistrationStatus};

/// Category label that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Column-header sort state: clicking the active field flips the direction,
/// clicking another field switches to it ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: PartialEq + Copy> SortState<F> {
    pub fn new(field: F, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn click(self, field: F) -> Self {
        if self.field == field {
            Self::new(field, self.direction.toggle())
        } else {
            Self::new(field, SortDirection::Ascending)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSortField {
    Title,
    Date,
    Price,
    Capacity,
}

pub type EventSort = SortState<EventSortField>;

impl Default for EventSort {
    fn default() -> Self {
        SortState::new(EventSortField::Date, SortDirection::Ascending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationSortField {
    Name,
    Date,
    Tickets,
    Total,
}

pub type RegistrationSort = SortState<RegistrationSortField>;

impl Default for RegistrationSort {
    fn default() -> Self {
        SortState::new(RegistrationSortField::Date, SortDirection::Descending)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(term) = non_empty(&self.search) {
            let term = term.to_lowercase();
            let hit = event.title.to_lowercase().contains(&term)
                || event.description.to_lowercase().contains(&term)
                || event.location.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        match non_empty(&self.category) {
            Some(category) if category != ALL_CATEGORIES => event.category == category,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationFilter {
    pub search: Option<String>,
    pub status: Option<RegistrationStatus>,
    pub event_id: Option<EventId>,
}

impl RegistrationFilter {
    pub fn matches(&self, registration: &Registration) -> bool {
        if let Some(term) = non_empty(&self.search) {
            let term = term.to_lowercase();
            let hit = registration.user_name.to_lowercase().contains(&term)
                || registration.user_email.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        if let Some(status) = self.status {
            if registration.status != status {
                return false;
            }
        }
        match &self.event_id {
            Some(event_id) => &registration.event_id == event_id,
            None => true,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub fn filter_events(events: &[Event], filter: &EventFilter) -> Vec<Event> {
    events
        .iter()
        .filter(|event| filter.matches(event))
        .cloned()
        .collect()
}

/// Sorts in place. Ties land in unspecified order.
pub fn sort_events(events: &mut [Event], sort: EventSort) {
    events.sort_unstable_by(|a, b| {
        let ordering = match sort.field {
            EventSortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            EventSortField::Date => a.date.cmp(&b.date),
            EventSortField::Price => a.price.cmp(&b.price),
            EventSortField::Capacity => a.capacity.cmp(&b.capacity),
        };
        sort.direction.apply(ordering)
    });
}

pub fn filter_registrations(
    registrations: &[Registration],
    filter: &RegistrationFilter,
) -> Vec<Registration> {
    registrations
        .iter()
        .filter(|registration| filter.matches(registration))
        .cloned()
        .collect()
}

/// Sorts in place. Ties land in unspecified order.
pub fn sort_registrations(registrations: &mut [Registration], sort: RegistrationSort) {
    registrations.sort_unstable_by(|a, b| {
        let ordering = match sort.field {
            RegistrationSortField::Name => {
                a.user_name.to_lowercase().cmp(&b.user_name.to_lowercase())
            }
            RegistrationSortField::Date => a.date.cmp(&b.date),
            RegistrationSortField::Tickets => a.ticket_count.cmp(&b.ticket_count),
            RegistrationSortField::Total => a.total_price.cmp(&b.total_price),
        };
        sort.direction.apply(ordering)
    });
}

/// `"All"` followed by each category in first-seen order.
pub fn categories(events: &[Event]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for event in events {
        if !out.iter().any(|c| c == &event.category) {
            out.push(event.category.clone());
        }
    }
    out
}

pub fn featured_events(events: &[Event], limit: usize) -> Vec<Event> {
    events
        .iter()
        .filter(|event| event.featured)
        .take(limit)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_events: usize,
    pub total_registrations: usize,
    /// Sum over every registration, cancelled ones included.
    pub total_revenue: Money,
    pub pending_registrations: usize,
    pub upcoming_events: Vec<Event>,
}

impl DashboardStats {
    pub fn compute(events: &[Event], registrations: &[Registration], now: DateTime<Utc>) -> Self {
        let mut upcoming_events: Vec<Event> = events
            .iter()
            .filter(|event| event.starts_at() > now)
            .cloned()
            .collect();
        upcoming_events.sort_unstable_by(|a, b| a.date.cmp(&b.date));

        Self {
            total_events: events.len(),
            total_registrations: registrations.len(),
            total_revenue: registrations.iter().map(|r| r.total_price).sum(),
            pending_registrations: registrations
                .iter()
                .filter(|r| r.status == RegistrationStatus::Pending)
                .count(),
            upcoming_events,
        }
    }
}

/// A user's registration joined with its event. `event` is `None` when the
/// event has since been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub registration: Registration,
    pub event: Option<Event>,
}

/// Joins registrations to events, most recent registration first.
pub fn user_bookings(events: &[Event], registrations: &[Registration]) -> Vec<Booking> {
    let mut bookings: Vec<Booking> = registrations
        .iter()
        .map(|registration| Booking {
            registration: registration.clone(),
            event: events
                .iter()
                .find(|event| event.id == registration.event_id)
                .cloned(),
        })
        .collect();
    bookings.sort_by(|a, b| b.registration.date.cmp(&a.registration.date));
    bookings
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::seed;

    fn catalog() -> seed::Catalog {
        seed::catalog().expect("seed")
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn search_matches_title_description_or_location_ignoring_case() {
        let catalog = catalog();
        let filter = EventFilter {
            search: Some("Tech".into()),
            category: None,
        };
        let filtered = filter_events(&catalog.events, &filter);

        let expected: Vec<&str> = catalog
            .events
            .iter()
            .filter(|e| {
                e.title.to_lowercase().contains("tech")
                    || e.description.to_lowercase().contains("tech")
                    || e.location.to_lowercase().contains("tech")
            })
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids(&filtered), expected);
        assert!(ids(&filtered).contains(&"event-1"));
    }

    #[test]
    fn category_filter_combines_with_search() {
        let catalog = catalog();
        let business = filter_events(
            &catalog.events,
            &EventFilter {
                search: None,
                category: Some("Business".into()),
            },
        );
        assert_eq!(ids(&business), vec!["event-3", "event-7"]);

        let narrowed = filter_events(
            &catalog.events,
            &EventFilter {
                search: Some("london".into()),
                category: Some("Business".into()),
            },
        );
        assert_eq!(ids(&narrowed), vec!["event-7"]);
    }

    #[test]
    fn all_category_disables_category_filter() {
        let catalog = catalog();
        let filter = EventFilter {
            search: Some(String::new()),
            category: Some(ALL_CATEGORIES.into()),
        };
        assert_eq!(filter_events(&catalog.events, &filter).len(), 8);
    }

    #[test]
    fn sorts_events_by_price_descending() {
        let mut events = catalog().events;
        sort_events(
            &mut events,
            SortState::new(EventSortField::Price, SortDirection::Descending),
        );
        assert_eq!(events.first().map(|e| e.id.as_str()), Some("event-6"));
        assert_eq!(events.last().map(|e| e.id.as_str()), Some("event-8"));
    }

    #[test]
    fn default_event_sort_is_date_ascending() {
        let mut events = catalog().events;
        sort_events(&mut events, EventSort::default());
        assert_eq!(events.first().map(|e| e.id.as_str()), Some("event-8"));
        assert_eq!(events.last().map(|e| e.id.as_str()), Some("event-7"));
    }

    #[test]
    fn clicking_a_column_toggles_then_resets_direction() {
        let sort = EventSort::default();
        let flipped = sort.click(EventSortField::Date);
        assert_eq!(flipped.direction, SortDirection::Descending);
        let switched = flipped.click(EventSortField::Title);
        assert_eq!(switched.field, EventSortField::Title);
        assert_eq!(switched.direction, SortDirection::Ascending);
    }

    #[test]
    fn registration_filter_by_status_and_search() {
        let catalog = catalog();
        let pending = filter_registrations(
            &catalog.registrations,
            &RegistrationFilter {
                status: Some(RegistrationStatus::Pending),
                ..RegistrationFilter::default()
            },
        );
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_name, "Jane Smith");

        let by_email = filter_registrations(
            &catalog.registrations,
            &RegistrationFilter {
                search: Some("EXAMPLE.COM".into()),
                event_id: Some(EventId::from("event-1")),
                ..RegistrationFilter::default()
            },
        );
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].id.as_str(), "reg-1");
    }

    #[test]
    fn sorts_registrations_by_total() {
        let mut registrations = catalog().registrations;
        sort_registrations(
            &mut registrations,
            SortState::new(RegistrationSortField::Total, SortDirection::Ascending),
        );
        assert_eq!(registrations[0].id.as_str(), "reg-2");
        assert_eq!(registrations[4].id.as_str(), "reg-1");
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let catalog = catalog();
        assert_eq!(
            categories(&catalog.events),
            vec![
                "All",
                "Technology",
                "Music",
                "Business",
                "Food & Drink",
                "Marketing",
                "Health & Wellness",
                "Lifestyle",
            ]
        );
    }

    #[test]
    fn featured_takes_first_flagged_events() {
        let catalog = catalog();
        assert_eq!(
            ids(&featured_events(&catalog.events, 3)),
            vec!["event-1", "event-2", "event-4"]
        );
    }

    #[test]
    fn dashboard_counts_every_registration_toward_revenue() {
        let catalog = catalog();
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).single().expect("now");
        let stats = DashboardStats::compute(&catalog.events, &catalog.registrations, now);

        assert_eq!(stats.total_events, 8);
        assert_eq!(stats.total_registrations, 5);
        assert_eq!(
            stats.total_revenue,
            Money::from_cents(59_998 + 12_000 + 26_997 + 49_999 + 39_998)
        );
        assert_eq!(stats.pending_registrations, 1);
        assert_eq!(
            ids(&stats.upcoming_events),
            vec!["event-2", "event-4", "event-3", "event-7"]
        );
    }

    #[test]
    fn bookings_flag_missing_events_and_sort_newest_first() {
        let mut catalog = catalog();
        catalog.events.retain(|e| e.id.as_str() != "event-4");
        let mine: Vec<Registration> = catalog
            .registrations
            .iter()
            .filter(|r| r.user_id.as_str() == "user-id-456")
            .cloned()
            .collect();

        let bookings = user_bookings(&catalog.events, &mine);
        assert_eq!(bookings[0].registration.id.as_str(), "reg-2");
        assert!(bookings[0].event.is_none());
        assert_eq!(
            bookings[1].event.as_ref().map(|e| e.id.as_str()),
            Some("event-1")
        );
    }
}
