use thiserror::Error;

/// Errors raised while turning a scope token into a [`crate::network::scope::ScopeEntry`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid IPv4 address '{0}'")]
    InvalidAddress(String),
    #[error("invalid prefix length in '{token}': {prefix} > 32")]
    PrefixTooLong { token: String, prefix: u32 },
    #[error("invalid prefix length in '{0}'")]
    InvalidPrefix(String),
    #[error("'{0}' is not a domain, IPv4 address or CIDR range")]
    Unrecognized(String),
}
