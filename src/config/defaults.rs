/// Default configuration constants used across the client.

/// Base URL used whenever no usable base URL has been configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Default IANA timezone for the web profile.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Storage key for the web dashboard settings record.
pub const WEB_SETTINGS_STORAGE_KEY: &str = "remindctl.web-settings";

/// Storage key for the mobile app state record.
pub const MOBILE_STATE_STORAGE_KEY: &str = "remindctl.mobile-state";

/// Default CLI configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "remindctl.json";

/// Name of the state directory under the user's home.
pub const STATE_DIR_NAME: &str = ".remindctl";

/// Default log level directive for this crate.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Largest audio upload accepted by the speech-to-text endpoint (10 MB).
pub const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

/// Audio file suffixes accepted by the speech-to-text endpoint.
pub const ALLOWED_AUDIO_SUFFIXES: &[&str] = &["m4a", "mp3", "wav", "ogg"];

/// Maximum text length accepted by the text-to-speech endpoint.
pub const MAX_TTS_CHARS: usize = 1000;

/// Default number of events requested from `/calendar/list`.
pub const DEFAULT_CALENDAR_LIST_LIMIT: u32 = 10;

/// Default calendar event duration for `/calendar/add`.
pub const DEFAULT_CALENDAR_DURATION_MINUTES: u32 = 60;

/// Default number of hits requested from `/memories/search`.
pub const DEFAULT_MEMORY_TOP_K: u32 = 8;
