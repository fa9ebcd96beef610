use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Primary LLM Provider Args ---
    /// Type of LLM provider answering first (cohere, openrouter)
    #[arg(long, env = "PRIMARY_LLM_TYPE", default_value = "cohere")]
    pub primary_llm_type: String,

    /// API Key for the primary provider. Never compiled in; supply via env or secret store.
    #[arg(long, env = "PRIMARY_API_KEY", default_value = "", hide_env_values = true)]
    pub primary_api_key: String,

    /// Base URL for the primary provider (e.g., https://api.cohere.ai)
    #[arg(long, env = "PRIMARY_BASE_URL")] // No default, let adapters handle defaults if None
    pub primary_base_url: Option<String>,

    /// Model name for the primary provider (e.g., command-light)
    #[arg(long, env = "PRIMARY_MODEL")]
    pub primary_model: Option<String>,

    // --- Secondary (fallback) LLM Provider Args ---
    /// Type of LLM provider used when the primary fails (cohere, openrouter)
    #[arg(long, env = "SECONDARY_LLM_TYPE", default_value = "openrouter")]
    pub secondary_llm_type: String,

    /// API Key for the secondary provider.
    #[arg(long, env = "SECONDARY_API_KEY", default_value = "", hide_env_values = true)]
    pub secondary_api_key: String,

    /// Base URL for the secondary provider (e.g., https://openrouter.ai/api)
    #[arg(long, env = "SECONDARY_BASE_URL")]
    pub secondary_base_url: Option<String>,

    /// Model name for the secondary provider (e.g., mistralai/mistral-7b-instruct:free)
    #[arg(long, env = "SECONDARY_MODEL")]
    pub secondary_model: Option<String>,

    /// Value of the HTTP-Referer header sent to the secondary provider.
    #[arg(long, env = "SECONDARY_REFERER")]
    pub secondary_referer: Option<String>,

    /// Value of the X-Title header sent to the secondary provider.
    #[arg(long, env = "SECONDARY_TITLE", default_value = "MentalHealthHelper")]
    pub secondary_title: String,

    // --- Generation Args ---
    /// Timeout in seconds for every outbound provider call.
    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value = "30")]
    pub provider_timeout_secs: u64,

    /// Sampling temperature for primary provider calls.
    #[arg(long, env = "TEMPERATURE", default_value = "0.7")]
    pub temperature: f64,

    /// Maximum output tokens for every provider call.
    #[arg(long, env = "MAX_TOKENS", default_value = "300")]
    pub max_tokens: u32,

    /// Longest accepted latest message, in characters.
    #[arg(long, env = "MAX_MESSAGE_CHARS", default_value = "500")]
    pub max_message_chars: usize,

    /// Optional JSON file overriding the built-in prompt texts.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    /// Optional JSON file replacing the built-in citation table.
    #[arg(long, env = "CITATIONS_PATH")]
    pub citations_path: Option<String>,

    // --- Decision Log Args ---
    /// Decision log store type (file, memory)
    #[arg(long, env = "DECISION_LOG", default_value = "file")]
    pub decision_log: String,

    /// Directory holding the decision log file.
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    pub log_dir: String,

    // --- Server Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:8000")]
    pub server_addr: String,

    /// Global limit of /chat requests per second. Unlimited when unset.
    #[arg(long, env = "RATE_LIMIT_PER_SECOND")]
    pub rate_limit_per_second: Option<u32>,

    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
