//! Route table and access guards for the application views.

use std::fmt;

use shared::domain::EventId;

use crate::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Events,
    EventDetail(EventId),
    About,
    Contact,
    Login,
    Register,
    Dashboard,
    Admin,
    AdminEvents,
    AdminRegistrations,
    NotFound,
}

/// Who may render a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Only for visitors without a session; signed-in users are sent on.
    GuestOnly,
    Authenticated,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

impl Route {
    /// Query strings, fragments and trailing slashes are ignored. Unknown
    /// paths map to [`Route::NotFound`].
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["events"] => Self::Events,
            ["events", id] => Self::EventDetail(EventId::from(*id)),
            ["about"] => Self::About,
            ["contact"] => Self::Contact,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["dashboard"] => Self::Dashboard,
            ["admin"] => Self::Admin,
            ["admin", "events"] => Self::AdminEvents,
            ["admin", "registrations"] => Self::AdminRegistrations,
            _ => Self::NotFound,
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Self::Login | Self::Register => Access::GuestOnly,
            Self::Dashboard => Access::Authenticated,
            Self::Admin | Self::AdminEvents | Self::AdminRegistrations => Access::Admin,
            _ => Access::Public,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Events => "/events".to_string(),
            Self::EventDetail(id) => format!("/events/{id}"),
            Self::About => "/about".to_string(),
            Self::Contact => "/contact".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Admin => "/admin".to_string(),
            Self::AdminEvents => "/admin/events".to_string(),
            Self::AdminRegistrations => "/admin/registrations".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub fn resolve(path: &str, session: &Session) -> Navigation {
    let route = Route::parse(path);
    match (route.access(), &session.user) {
        (Access::GuestOnly, Some(_)) => Navigation::Redirect(Route::Dashboard),
        (Access::Authenticated | Access::Admin, None) => Navigation::Redirect(Route::Login),
        (Access::Admin, Some(user)) if !user.role.is_admin() => {
            Navigation::Redirect(Route::Dashboard)
        }
        _ => Navigation::Render(route),
    }
}

#[cfg(test)]
#[path = "tests/routes_tests.rs"]
mod tests;
