/// Core error type for the webhook configurator.
///
/// Adapter crates map their specific errors into this type so the flow can
/// tell operator mistakes, provider failures and transport problems apart.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// Malformed operator input. Only ever surfaced inside a prompt loop.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    ProviderLookup(String),

    /// The Bot API answered with `ok: false`. Holds the description verbatim.
    #[error("{0}")]
    Api(String),

    #[error("{0}")]
    Transport(String),

    #[error("cancelled by user")]
    Cancelled,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
