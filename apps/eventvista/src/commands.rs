use std::io::Write;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use client_core::{AppContext, Navigation, Route};
use serde::Serialize;
use shared::{
    domain::{Event, EventDraft, EventId, EventPatch, Registration, RegistrationId},
    error::{ApiError, ApiException, ErrorCode},
    query::{
        self, DashboardStats, EventFilter, EventSort, RegistrationFilter, RegistrationSort,
        SortDirection, SortState,
    },
    validation::{self, ContactMessage},
};
use tracing::info;

use crate::cli::{AdminCommand, Command, EventFields, EventQuery, EventUpdate, RegistrationQuery};

/// Appended to every catalog mutation: events and registrations are held in
/// memory and reseeded on each start.
const SESSION_LOCAL_NOTE: &str = "(kept for this run only; the catalog resets on next start)";

fn notice(err: ApiError) -> anyhow::Error {
    anyhow::Error::new(ApiException::from(err))
}

fn emit<W: Write, T: Serialize>(
    out: &mut W,
    json: bool,
    value: &T,
    text: impl FnOnce(&mut W) -> std::io::Result<()>,
) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, value)?;
        writeln!(out)?;
    } else {
        text(out)?;
    }
    Ok(())
}

fn write_event_row<W: Write>(out: &mut W, event: &Event) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<10} {}  {:<36} {:<18} {:>10}  cap {}{}",
        event.id,
        event.date,
        event.title,
        event.category,
        event.price.to_string(),
        event.capacity,
        if event.featured { "  *" } else { "" }
    )
}

fn write_registration_row<W: Write>(
    out: &mut W,
    registration: &Registration,
) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<16} {:<10} {:<16} {:<24} x{:<3} {:>10}  {}",
        registration.id,
        registration.event_id,
        registration.user_name,
        registration.user_email,
        registration.ticket_count,
        registration.total_price.to_string(),
        registration.status
    )
}

/// Fails unless the session may render `path`.
async fn require_route(ctx: &AppContext, path: &str) -> Result<()> {
    match ctx.navigate(path).await {
        Navigation::Render(_) => Ok(()),
        Navigation::Redirect(Route::Login) => Err(notice(ApiError::new(
            ErrorCode::Unauthorized,
            "sign in first (eventvista login)",
        ))),
        Navigation::Redirect(target) => Err(notice(ApiError::new(
            ErrorCode::Forbidden,
            format!("access denied; redirected to {target}"),
        ))),
    }
}

fn event_sort(sort: EventQuery) -> (EventFilter, EventSort) {
    let direction = if sort.desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    (
        EventFilter {
            search: sort.search,
            category: sort.category,
        },
        SortState::new(sort.sort.into(), direction),
    )
}

fn registration_sort(query: RegistrationQuery) -> (RegistrationFilter, RegistrationSort) {
    let direction = if query.asc {
        SortDirection::Ascending
    } else {
        SortDirection::Descending
    };
    (
        RegistrationFilter {
            search: query.search,
            status: query.status,
            event_id: query.event_id.map(EventId::from),
        },
        SortState::new(query.sort.into(), direction),
    )
}

async fn list_events<W: Write>(
    ctx: &AppContext,
    query: EventQuery,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let (filter, sort) = event_sort(query);
    let mut events = query::filter_events(&ctx.events.events().await, &filter);
    query::sort_events(&mut events, sort);
    emit(out, json, &events, |out| {
        if events.is_empty() {
            return writeln!(out, "No events found");
        }
        events.iter().try_for_each(|event| write_event_row(out, event))
    })
}

pub async fn run<W: Write>(
    ctx: &AppContext,
    command: Command,
    json: bool,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let signed_in = ctx.sign_in(&email, &password).map_err(notice)?.await?;
            if !signed_in {
                bail!("Invalid email or password");
            }
            let session = ctx.session().await;
            emit(out, json, &session.user, |out| {
                writeln!(out, "Signed in as {email}")
            })
        }
        Command::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let created = ctx
                .sign_up(&name, &email, &password, &confirm_password)
                .map_err(notice)?
                .await?;
            if !created {
                bail!("Registration failed");
            }
            let session = ctx.session().await;
            emit(out, json, &session.user, |out| {
                writeln!(out, "Welcome, {name}")
            })
        }
        Command::Logout => {
            ctx.auth.logout().await?;
            writeln!(out, "Signed out")?;
            Ok(())
        }
        Command::Whoami => {
            let user = ctx.auth.current_user().await;
            emit(out, json, &user, |out| match &user {
                Some(user) => writeln!(out, "{} <{}> ({})", user.name, user.email, user.role),
                None => writeln!(out, "Not signed in"),
            })
        }
        Command::Events(query) => list_events(ctx, query, json, out).await,
        Command::Featured { limit } => {
            let featured = query::featured_events(&ctx.events.events().await, limit);
            emit(out, json, &featured, |out| {
                featured.iter().try_for_each(|event| write_event_row(out, event))
            })
        }
        Command::Categories => {
            let categories = query::categories(&ctx.events.events().await);
            emit(out, json, &categories, |out| {
                categories
                    .iter()
                    .try_for_each(|category| writeln!(out, "{category}"))
            })
        }
        Command::Show { id } => {
            let event_id = EventId::from(id);
            let event = ctx
                .events
                .get_event(&event_id)
                .await
                .ok_or_else(|| {
                    notice(ApiError::not_found(format!("Event {event_id} not found")))
                })?;
            emit(out, json, &event, |out| {
                writeln!(out, "{}", event.title)?;
                writeln!(out, "  when:      {} {}", event.date, event.time)?;
                writeln!(out, "  where:     {}", event.location)?;
                writeln!(out, "  category:  {}", event.category)?;
                writeln!(out, "  price:     {}", event.price)?;
                writeln!(out, "  capacity:  {}", event.capacity)?;
                writeln!(out, "  organizer: {}", event.organizer)?;
                writeln!(out)?;
                writeln!(out, "{}", event.description)
            })
        }
        Command::Book { id, tickets } => {
            let ticket_count = validation::parse_ticket_count(&tickets);
            let event_id = EventId::from(id);
            let booked = ctx
                .book_event(event_id.clone(), ticket_count)
                .await
                .map_err(notice)?
                .await?;
            if !booked {
                bail!("Could not book event {event_id}");
            }
            info!(%event_id, ticket_count, "booking completed");
            writeln!(
                out,
                "Booked {ticket_count} ticket(s) for {event_id} {SESSION_LOCAL_NOTE}"
            )?;
            Ok(())
        }
        Command::Dashboard => {
            require_route(ctx, "/dashboard").await?;
            let user = ctx
                .auth
                .current_user()
                .await
                .ok_or_else(|| anyhow!("session ended"))?;
            let bookings = query::user_bookings(
                &ctx.events.events().await,
                &ctx.events.get_user_registrations(&user.id).await,
            );
            emit(out, json, &bookings, |out| {
                if bookings.is_empty() {
                    return writeln!(out, "No bookings yet");
                }
                for booking in &bookings {
                    let title = booking
                        .event
                        .as_ref()
                        .map_or("Event no longer available", |event| event.title.as_str());
                    writeln!(
                        out,
                        "{:<36} x{:<3} {:>10}  {}",
                        title,
                        booking.registration.ticket_count,
                        booking.registration.total_price.to_string(),
                        booking.registration.status
                    )?;
                }
                Ok(())
            })
        }
        Command::Open { path } => {
            let navigation = ctx.navigate(&path).await;
            match navigation {
                Navigation::Render(route) => writeln!(out, "render {route}")?,
                Navigation::Redirect(route) => writeln!(out, "redirect {route}")?,
            }
            Ok(())
        }
        Command::Contact {
            name,
            email,
            subject,
            message,
        } => {
            ctx.send_contact_message(ContactMessage {
                name,
                email,
                subject,
                message,
            })
            .map_err(notice)?
            .await?;
            writeln!(out, "Message sent. We'll get back to you soon.")?;
            Ok(())
        }
        Command::Admin(command) => run_admin(ctx, command, json, out).await,
    }
}

async fn run_admin<W: Write>(
    ctx: &AppContext,
    command: AdminCommand,
    json: bool,
    out: &mut W,
) -> Result<()> {
    match command {
        AdminCommand::Stats => {
            require_route(ctx, "/admin").await?;
            let stats = DashboardStats::compute(
                &ctx.events.events().await,
                &ctx.events.registrations().await,
                Utc::now(),
            );
            emit(out, json, &stats, |out| {
                writeln!(out, "events:        {}", stats.total_events)?;
                writeln!(out, "registrations: {}", stats.total_registrations)?;
                writeln!(out, "revenue:       {}", stats.total_revenue)?;
                writeln!(out, "pending:       {}", stats.pending_registrations)?;
                writeln!(out, "upcoming:")?;
                stats
                    .upcoming_events
                    .iter()
                    .try_for_each(|event| write_event_row(out, event))
            })
        }
        AdminCommand::Events(query) => {
            require_route(ctx, "/admin/events").await?;
            list_events(ctx, query, json, out).await
        }
        AdminCommand::Registrations(query) => {
            require_route(ctx, "/admin/registrations").await?;
            let (filter, sort) = registration_sort(query);
            let mut registrations =
                query::filter_registrations(&ctx.events.registrations().await, &filter);
            query::sort_registrations(&mut registrations, sort);
            emit(out, json, &registrations, |out| {
                registrations
                    .iter()
                    .try_for_each(|registration| write_registration_row(out, registration))
            })
        }
        AdminCommand::AddEvent(fields) => {
            require_route(ctx, "/admin/events").await?;
            let draft = draft_from(fields);
            validation::validate_event_draft(&draft).map_err(notice)?;
            let event = ctx.events.add_event(draft).await?;
            emit(out, json, &event, |out| {
                writeln!(
                    out,
                    "Created {} ({}) {SESSION_LOCAL_NOTE}",
                    event.id, event.title
                )
            })
        }
        AdminCommand::UpdateEvent(update) => {
            require_route(ctx, "/admin/events").await?;
            let (id, patch) = patch_from(update);
            if patch.is_empty() {
                bail!("nothing to update");
            }
            validation::validate_event_patch(&patch).map_err(notice)?;
            ctx.events.update_event(id.clone(), patch).await?;
            writeln!(out, "Updated {id} {SESSION_LOCAL_NOTE}")?;
            Ok(())
        }
        AdminCommand::DeleteEvent { id } => {
            require_route(ctx, "/admin/events").await?;
            let id = EventId::from(id);
            ctx.events.delete_event(id.clone()).await?;
            writeln!(out, "Deleted {id} {SESSION_LOCAL_NOTE}")?;
            Ok(())
        }
        AdminCommand::SetStatus { id, status } => {
            require_route(ctx, "/admin/registrations").await?;
            let id = RegistrationId::from(id);
            ctx.events
                .update_registration_status(id.clone(), status)
                .await
                .with_context(|| format!("failed to update {id}"))?;
            writeln!(out, "{id} is now {status} {SESSION_LOCAL_NOTE}")?;
            Ok(())
        }
    }
}

fn draft_from(fields: EventFields) -> EventDraft {
    EventDraft {
        title: fields.title,
        date: fields.date,
        time: fields.time,
        location: fields.location,
        category: fields.category,
        price: fields.price,
        description: fields.description,
        image: fields.image,
        capacity: fields.capacity,
        organizer: fields.organizer,
        featured: fields.featured,
    }
}

fn patch_from(update: EventUpdate) -> (EventId, EventPatch) {
    (
        EventId::from(update.id),
        EventPatch {
            title: update.title,
            date: update.date,
            time: update.time,
            location: update.location,
            category: update.category,
            price: update.price,
            description: update.description,
            image: update.image,
            capacity: update.capacity,
            organizer: update.organizer,
            featured: update.featured,
        },
    )
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
