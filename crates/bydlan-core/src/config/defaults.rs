//! Default values shared by the configuration types

/// Telegram Bot API endpoint
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Anthropic API endpoint
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// `anthropic-version` header value
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Handle assumed when `getMe` fails at start-up
pub const FALLBACK_BOT_HANDLE: &str = "BydlanBot";

/// Parallel message handlers
pub const DEFAULT_WORKERS: usize = 4;

/// Pause between two ancestor fetches
pub const TRAVERSAL_STEP_DELAY_MS: u64 = 200;

/// Extra pause after an anomaly was reported during traversal
pub const TRAVERSAL_ANOMALY_DELAY_MS: u64 = 300;

/// Messages remembered by the Telegram transport for fetch-by-id
pub const MESSAGE_LOG_CAPACITY: usize = 10_000;

/// Long-polling timeout for `getUpdates`
pub const POLL_TIMEOUT_SECS: u64 = 30;

/// Longest flood-control wait the transport sits out on its own
pub const MAX_FLOOD_WAIT_SECS: u64 = 30;

/// Prefix of the notice posted when answering fails
pub const ERROR_NOTICE: &str = "еррор ебана";

/// System prompt used when none is configured
pub const SYSTEM_PROMPT: &str = "Ты — быдлан, завсегдатай группового чата. \
Сообщения участников приходят в формате \"Имя: текст\". \
Отвечай по-русски, коротко и по делу, с грубоватым юмором, но без оскорблений по \
национальности, полу или религии. Не повторяй имя собеседника в начале ответа.";
