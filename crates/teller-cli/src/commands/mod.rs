//! Subcommand implementations.

mod catalog;
mod check;
mod config;
mod permissions;

pub use catalog::CatalogCommand;
pub use check::CheckCommand;
pub use config::ConfigCommand;
pub use permissions::PermissionsCommand;

use teller_access::{AccessControl, SessionError};
use tracing::debug;

use crate::cli::{CommandContext, SignInArgs};
use crate::error::CliError;

/// Build the access facade and establish the session, signing in when
/// credentials were given.
pub(crate) async fn connect(ctx: &CommandContext, sign_in: &SignInArgs) -> Result<AccessControl, CliError> {
    let access = AccessControl::from_config(&ctx.config)
        .map_err(|e| CliError::network("cannot build HTTP client", e))?;

    match sign_in.credentials() {
        Some((email, password)) => {
            debug!(email, "signing in");
            access.login(email, password).await.map_err(sign_in_error)?;
        }
        None => {
            let ev = access.bootstrap().await;
            if let Some(message) = &ev.session().error {
                return Err(CliError::network(
                    format!("cannot reach {}", ctx.config.api.base_url),
                    anyhow::anyhow!("{message}"),
                ));
            }
        }
    }

    Ok(access)
}

fn sign_in_error(e: SessionError) -> CliError {
    match e {
        SessionError::Login(message) => CliError::authentication(message),
        SessionError::Backend(inner) if matches!(inner.status(), Some(400..=499)) => {
            CliError::authentication(SessionError::Backend(inner).user_message())
        }
        other => CliError::network(format!("sign in failed: {}", other.user_message()), other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teller_access::BackendError;
    use teller_common_http::HttpError;

    #[test]
    fn test_refused_credentials_are_authentication_errors() {
        let err = sign_in_error(SessionError::Login("Invalid email or password".into()));
        assert!(matches!(err, CliError::Authentication { .. }));
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[test]
    fn test_unreachable_backend_is_network_error() {
        let err = sign_in_error(SessionError::Backend(BackendError::Http(HttpError::ServerError {
            status: 503,
            body: "unavailable".into(),
        })));
        assert!(matches!(err, CliError::Network { .. }));
    }
}
