use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "remindctl", version, about = "Client for the AI reminder assistant")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub config: Option<String>,
    /// Settings profile to use (web or mobile).
    #[arg(long, global = true, env = "REMINDCTL_PROFILE")]
    pub profile: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one chat message.
    Chat(ChatOpts),
    #[command(subcommand)]
    Reminders(RemindersAction),
    #[command(subcommand)]
    Admin(AdminAction),
    #[command(subcommand)]
    Settings(SettingsAction),
    #[command(subcommand)]
    Prefs(PrefsAction),
    #[command(subcommand)]
    Push(PushAction),
    #[command(subcommand)]
    Calendar(CalendarAction),
    #[command(subcommand)]
    Memories(MemoriesAction),
    #[command(subcommand)]
    Billing(BillingAction),
    /// Upcoming events and tasks.
    Agenda(AgendaOpts),
    /// Print the URL that starts Google Calendar authorization.
    OauthUrl,
    /// Transcribe an audio file.
    Stt(SttOpts),
    /// Synthesize speech into an MP3 file.
    Tts(TtsOpts),
    Health,
    Metrics(MetricsOpts),
    #[command(subcommand)]
    Config(ConfigAction),
    Doctor,
    Version,
}

#[derive(clap::Args)]
pub struct ChatOpts {
    pub message: String,
    #[arg(short, long)]
    pub persona: Option<String>,
}

#[derive(Subcommand)]
pub enum RemindersAction {
    List {
        /// Only show reminders with this status.
        #[arg(short, long)]
        status: Option<String>,
    },
    Cancel {
        id: uuid::Uuid,
    },
}

#[derive(Subcommand)]
pub enum AdminAction {
    /// Queues, workers, recent reminders and flags.
    Overview,
    /// Flip a feature flag.
    Toggle { key: String },
    /// Set a feature flag explicitly.
    Set {
        key: String,
        #[arg(long, action = clap::ArgAction::Set)]
        enabled: bool,
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    Show,
    Set(SettingsSetOpts),
    Reset,
}

#[derive(clap::Args)]
pub struct SettingsSetOpts {
    #[arg(long)]
    pub api_key: Option<String>,
    #[arg(long)]
    pub base_url: Option<String>,
    #[arg(long)]
    pub timezone: Option<String>,
    #[arg(long)]
    pub admin_token: Option<String>,
}

#[derive(Subcommand)]
pub enum PrefsAction {
    Show,
    /// Flip `notifications` or `voice`.
    Toggle { name: String },
}

#[derive(Subcommand)]
pub enum PushAction {
    /// Register a device token obtained elsewhere.
    Register { token: String },
    /// Forget the registered token.
    Clear,
}

#[derive(Subcommand)]
pub enum CalendarAction {
    Add {
        reminder_id: uuid::Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value_t = crate::config::DEFAULT_CALENDAR_DURATION_MINUTES)]
        duration: u32,
    },
    List {
        /// Day to list (YYYY-MM-DD).
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
        #[arg(long, default_value_t = crate::config::DEFAULT_CALENDAR_LIST_LIMIT)]
        limit: u32,
    },
}

#[derive(Subcommand)]
pub enum MemoriesAction {
    /// Store a memory for a user.
    Add {
        #[arg(long)]
        user_id: uuid::Uuid,
        /// note, goal, habit, preference or contact.
        #[arg(long = "type", default_value = "note")]
        kind: String,
        text: String,
        #[arg(long)]
        source: Option<String>,
    },
    Search {
        #[arg(long)]
        user_id: uuid::Uuid,
        query: String,
        #[arg(long, default_value_t = crate::config::DEFAULT_MEMORY_TOP_K)]
        top_k: u32,
    },
}

#[derive(Subcommand)]
pub enum BillingAction {
    /// Print a checkout URL for a new subscription.
    Checkout {
        #[arg(long)]
        success_url: Option<String>,
        #[arg(long)]
        cancel_url: Option<String>,
    },
    /// Print the customer portal URL.
    Portal {
        #[arg(long)]
        return_url: Option<String>,
    },
}

#[derive(clap::Args)]
pub struct AgendaOpts {
    /// Window start (RFC 3339).
    #[arg(long)]
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    /// Window end (RFC 3339).
    #[arg(long)]
    pub to: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(clap::Args)]
pub struct SttOpts {
    pub file: PathBuf,
    #[arg(short, long)]
    pub language: Option<String>,
}

#[derive(clap::Args)]
pub struct TtsOpts {
    pub text: String,
    #[arg(short, long)]
    pub out: PathBuf,
    #[arg(short, long, default_value = "en")]
    pub language: String,
}

#[derive(clap::Args)]
pub struct MetricsOpts {
    /// Prometheus text format instead of JSON.
    #[arg(long)]
    pub prometheus: bool,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    Validate,
    Init,
}
