use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use shared::{
    domain::{Money, RegistrationStatus},
    query::{EventSortField, RegistrationSortField},
};

#[derive(Parser, Debug)]
#[command(name = "eventvista", version, about = "Browse and book events from the terminal")]
pub struct Cli {
    /// SQLite url or path holding the signed-in session.
    #[arg(long, global = true)]
    pub database_url: Option<String>,
    /// Simulated round-trip delay for every operation.
    #[arg(long, global = true)]
    pub latency_ms: Option<u64>,
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in with a demo account.
    Login { email: String, password: String },
    /// Create an account and sign in.
    Register {
        name: String,
        email: String,
        password: String,
        #[arg(long = "confirm")]
        confirm_password: String,
    },
    Logout,
    Whoami,
    /// List events, optionally filtered and sorted.
    Events(EventQuery),
    Featured {
        #[arg(long, default_value_t = 3)]
        limit: usize,
    },
    Categories,
    Show { id: String },
    /// Book tickets for the signed-in user.
    Book {
        id: String,
        #[arg(long, default_value = "1")]
        tickets: String,
    },
    /// The signed-in user's bookings.
    Dashboard,
    /// Resolve a view path against the current session.
    Open { path: String },
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    Stats,
    Events(EventQuery),
    Registrations(RegistrationQuery),
    AddEvent(EventFields),
    UpdateEvent(EventUpdate),
    DeleteEvent { id: String },
    SetStatus {
        id: String,
        status: RegistrationStatus,
    },
}

#[derive(Args, Debug, Default)]
pub struct EventQuery {
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, value_enum, default_value_t = EventSortKey::Date)]
    pub sort: EventSortKey,
    #[arg(long)]
    pub desc: bool,
}

#[derive(Args, Debug, Default)]
pub struct RegistrationQuery {
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub status: Option<RegistrationStatus>,
    #[arg(long = "event")]
    pub event_id: Option<String>,
    #[arg(long, value_enum, default_value_t = RegistrationSortKey::Date)]
    pub sort: RegistrationSortKey,
    /// Oldest first; newest first is the default.
    #[arg(long)]
    pub asc: bool,
}

#[derive(Args, Debug)]
pub struct EventFields {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub date: NaiveDate,
    #[arg(long, default_value = "")]
    pub time: String,
    #[arg(long)]
    pub location: String,
    #[arg(long)]
    pub category: String,
    #[arg(long, default_value = "0")]
    pub price: Money,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "")]
    pub image: String,
    #[arg(long)]
    pub capacity: u32,
    #[arg(long, default_value = "")]
    pub organizer: String,
    #[arg(long)]
    pub featured: bool,
}

#[derive(Args, Debug)]
pub struct EventUpdate {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub time: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub price: Option<Money>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub image: Option<String>,
    #[arg(long)]
    pub capacity: Option<u32>,
    #[arg(long)]
    pub organizer: Option<String>,
    #[arg(long)]
    pub featured: Option<bool>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventSortKey {
    Title,
    #[default]
    Date,
    Price,
    Capacity,
}

impl From<EventSortKey> for EventSortField {
    fn from(key: EventSortKey) -> Self {
        match key {
            EventSortKey::Title => EventSortField::Title,
            EventSortKey::Date => EventSortField::Date,
            EventSortKey::Price => EventSortField::Price,
            EventSortKey::Capacity => EventSortField::Capacity,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegistrationSortKey {
    Name,
    #[default]
    Date,
    Tickets,
    Total,
}

impl From<RegistrationSortKey> for RegistrationSortField {
    fn from(key: RegistrationSortKey) -> Self {
        match key {
            RegistrationSortKey::Name => RegistrationSortField::Name,
            RegistrationSortKey::Date => RegistrationSortField::Date,
            RegistrationSortKey::Tickets => RegistrationSortField::Tickets,
            RegistrationSortKey::Total => RegistrationSortField::Total,
        }
    }
}
