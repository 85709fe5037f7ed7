use std::env;
use thiserror::Error;

pub const USERNAME_VAR: &str = "TWITCH_USERNAME";
pub const TOKEN_VAR: &str = "TWITCH_TOKEN";
pub const CHANNEL_VAR: &str = "TWITCH_CHANNEL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing username")]
    MissingUsername,
    #[error("missing token")]
    MissingToken,
    #[error("missing channel")]
    MissingChannel,
}

/// Login for the chat account the bot speaks as.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
    pub channel: String,
}

// never print the token
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("channel", &self.channel)
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Credentials, ConfigError> {
        Credentials::from_lookup(|name| env::var(name).ok())
    }

    /// Variables are checked in order, the first missing one is reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Credentials, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup(USERNAME_VAR).ok_or(ConfigError::MissingUsername)?;
        let token = lookup(TOKEN_VAR).ok_or(ConfigError::MissingToken)?;
        let channel = lookup(CHANNEL_VAR).ok_or(ConfigError::MissingChannel)?;

        Ok(Credentials {
            username,
            token,
            channel,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &HashMap<&str, &str>) -> Result<Credentials, ConfigError> {
        Credentials::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn missing_variables_are_reported_in_order() {
        let mut vars = HashMap::new();
        assert_eq!(lookup_in(&vars), Err(ConfigError::MissingUsername));
        assert_eq!(ConfigError::MissingUsername.to_string(), "missing username");

        vars.insert(USERNAME_VAR, "foo");
        assert_eq!(lookup_in(&vars), Err(ConfigError::MissingToken));

        vars.insert(TOKEN_VAR, "bar");
        assert_eq!(lookup_in(&vars), Err(ConfigError::MissingChannel));

        vars.insert(CHANNEL_VAR, "baz");
        let credentials = lookup_in(&vars).unwrap();
        assert_eq!(credentials.username, "foo");
        assert_eq!(credentials.token, "bar");
        assert_eq!(credentials.channel, "baz");
    }

    #[test]
    fn debug_output_hides_token() {
        let credentials = Credentials {
            username: "foo".to_string(),
            token: "oauth:secret".to_string(),
            channel: "baz".to_string(),
        };
        assert!(!format!("{:?}", credentials).contains("secret"));
    }
}
