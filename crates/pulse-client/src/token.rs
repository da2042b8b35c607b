//! Credential supply.
//!
//! The client never stores the bearer token. It asks the provider on every
//! connect attempt, so a token refreshed between reconnects is honored and
//! a revoked one fails closed.

/// Supplies the current bearer token, if any.
pub trait TokenProvider: Send + Sync {
    /// The current credential, or `None` when the user is signed out.
    fn token(&self) -> Option<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

/// A fixed token, for tools and tests.
#[derive(Clone, Debug)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap a fixed credential string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_token_always_supplies() {
        let provider = StaticToken::new("secret");
        assert_eq!(provider.token().as_deref(), Some("secret"));
        assert_eq!(provider.token().as_deref(), Some("secret"));
    }

    #[test]
    fn closure_provider() {
        let provider = || Some("from-closure".to_string());
        assert_eq!(TokenProvider::token(&provider).as_deref(), Some("from-closure"));

        let absent = || None::<String>;
        assert!(TokenProvider::token(&absent).is_none());
    }
}
