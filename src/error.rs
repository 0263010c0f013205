//! Error types shared across the crate.

use std::borrow::Cow;
use std::fmt;

/// Message shown when a failure of unknown origin carries no message.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

const NETWORK_ERROR_MESSAGE: &str = "Could not reach the server. Check your connection.";
const DECODE_ERROR_MESSAGE: &str = "Received data could not be read.";
const UNAUTHORIZED_ERROR_MESSAGE: &str = "You need to sign in to see this.";

/// Broad category of a fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    Network,
    Decode,
    Unauthorized,
    Unknown,
}

impl FetchErrorKind {
    /// The fixed user-facing message used when a failure carries none.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Network => NETWORK_ERROR_MESSAGE,
            Self::Decode => DECODE_ERROR_MESSAGE,
            Self::Unauthorized => UNAUTHORIZED_ERROR_MESSAGE,
            Self::Unknown => DEFAULT_ERROR_MESSAGE,
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Decode => "decode",
            Self::Unauthorized => "unauthorized",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Failure reported by a data source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Network failure{}", format_message(.message))]
    Network { message: Option<Cow<'static, str>> },

    #[error("Decode failure{}", format_message(.message))]
    Decode { message: Option<Cow<'static, str>> },

    #[error("Unauthorized{}", format_message(.message))]
    Unauthorized { message: Option<Cow<'static, str>> },

    #[error("Fetch failed{}", format_message(.message))]
    Unknown { message: Option<Cow<'static, str>> },
}

impl FetchError {
    /// A network failure with a user-facing message.
    pub fn network(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Network { message: Some(message.into()) }
    }

    /// A failure to decode the response.
    pub fn decode(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Decode { message: Some(message.into()) }
    }

    /// The caller is not allowed to read this resource.
    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized { message: Some(message.into()) }
    }

    /// A failure of no particular kind.
    pub fn unknown(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Unknown { message: Some(message.into()) }
    }

    /// A failure that carries no message at all.
    #[must_use]
    pub const fn silent(kind: FetchErrorKind) -> Self {
        match kind {
            FetchErrorKind::Network => Self::Network { message: None },
            FetchErrorKind::Decode => Self::Decode { message: None },
            FetchErrorKind::Unauthorized => Self::Unauthorized { message: None },
            FetchErrorKind::Unknown => Self::Unknown { message: None },
        }
    }

    /// Category of this failure.
    #[must_use]
    pub const fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Network { .. } => FetchErrorKind::Network,
            Self::Decode { .. } => FetchErrorKind::Decode,
            Self::Unauthorized { .. } => FetchErrorKind::Unauthorized,
            Self::Unknown { .. } => FetchErrorKind::Unknown,
        }
    }

    /// The message attached by the source, if it was non-empty.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        let (Self::Network { message }
        | Self::Decode { message }
        | Self::Unauthorized { message }
        | Self::Unknown { message }) = self;
        message.as_deref().filter(|message| !message.trim().is_empty())
    }

    /// Message to surface to the user: the attached one or the kind's default.
    #[must_use]
    pub fn user_message(&self) -> Cow<'static, str> {
        match self.message() {
            Some(message) => Cow::Owned(message.to_owned()),
            None => Cow::Borrowed(self.kind().default_message()),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(source: serde_json::Error) -> Self {
        Self::decode(source.to_string())
    }
}

/// Errors raised by a [`KeyValueStore`](crate::kv::KeyValueStore).
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("Failed to encode value for key '{key}': {source}")]
    Encode { key: Cow<'static, str>, source: serde_json::Error },

    #[error("Failed to decode value for key '{key}': {source}")]
    Decode { key: Cow<'static, str>, source: serde_json::Error },

    #[error("Storage backend failure{}", format_message(.message))]
    Backend { message: Option<Cow<'static, str>> },
}

/// Errors raised by the [`StoreRegistry`](crate::registry::StoreRegistry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("No store registered for type {type_name}")]
    Missing { type_name: &'static str },
}

/// Errors raised while loading a [`StoreConfig`](crate::config::StoreConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid store configuration: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },
}

fn format_message(message: &Option<Cow<'static, str>>) -> String {
    match message.as_deref() {
        Some(message) if !message.is_empty() => format!(": {message}"),
        _ => String::new(),
    }
}
