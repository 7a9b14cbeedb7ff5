use super::{Session, SessionUser};
use crate::error::Error;
use jwt_auth::JwtDecoder;
use tokio::sync::watch;

///
/// Source of the current [Session].
///
/// Every change is published through a watch channel
/// so the widget host can rerun its session effect.
///
pub struct SessionProvider {
    decoder: JwtDecoder,
    session_tx: watch::Sender<Session>,
}

impl SessionProvider {
    pub fn new(decoder: JwtDecoder) -> Self {
        let (session_tx, _) = watch::channel(Session::anonymous());

        Self {
            decoder,
            session_tx,
        }
    }

    pub fn current(&self) -> Session {
        self.session_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session_tx.subscribe()
    }

    ///
    /// Verifies access token and publishes authenticated session
    ///
    /// ### Errors
    /// - [Error::InvalidSessionToken] when token cannot be verified,
    ///   current session stays unchanged
    ///
    pub fn sign_in(&self, access_token: String) -> Result<(), Error> {
        let claims = self.decoder.decode(&access_token)?;
        tracing::info!(user_id = %claims.sub, "signed in");

        let user = SessionUser {
            id: claims.sub,
            access_token,
        };
        self.session_tx.send_replace(Session::authenticated(user));

        Ok(())
    }

    pub fn sign_out(&self) {
        tracing::info!("signed out");
        self.session_tx.send_replace(Session::anonymous());
    }
}
