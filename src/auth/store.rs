use std::sync::Arc;

use crate::common::{AuthStatus, ChatEvent, EventSink};

use super::provider::IdentityProvider;
use super::session::AuthSession;

/// Holds the current signed-in session and announces every change.
pub struct AuthStore {
    session: Option<AuthSession>,
    loading: bool,
    sink: EventSink,
}

impl AuthStore {
    pub fn new(sink: EventSink) -> Self {
        Self {
            session: None,
            loading: true,
            sink,
        }
    }

    pub fn set_session(&mut self, session: Option<AuthSession>) {
        self.session = session;
        self.loading = false;
        self.publish();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.publish();
    }

    pub fn clear(&mut self) {
        self.session = None;
        self.loading = false;
        self.publish();
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    // Raw token accessors for callers outside the bot path.
    #[allow(dead_code)]
    pub fn id_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.id_token.as_str())
    }

    #[allow(dead_code)]
    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }

    pub fn user_email(&self) -> Option<&str> {
        self.session.as_ref().and_then(AuthSession::email)
    }

    pub fn status(&self) -> AuthStatus {
        AuthStatus {
            authenticated: self.is_authenticated(),
            loading: self.is_loading(),
            email: self.user_email().map(str::to_string),
        }
    }

    fn publish(&self) {
        self.sink.publish(ChatEvent::AuthChanged(self.status()));
    }
}

/// The identity provider together with the session it issued.
pub struct AuthContext {
    pub provider: Arc<dyn IdentityProvider>,
    pub store: AuthStore,
}

impl AuthContext {
    pub fn new(provider: Arc<dyn IdentityProvider>, sink: EventSink) -> Self {
        Self {
            provider,
            store: AuthStore::new(sink),
        }
    }

    /// Resolve the remembered user at startup.
    pub async fn load_current_session(&mut self) {
        self.store.set_loading(true);
        match self.provider.current_session().await {
            Ok(session) => {
                log::info!(
                    "Auth session loaded: {}",
                    if session.is_some() { "authenticated" } else { "not authenticated" }
                );
                self.store.set_session(session);
            }
            Err(err) => {
                log::error!("Error loading auth session: {err}");
                self.store.set_session(None);
            }
        }
    }

    pub fn sign_out(&mut self) {
        self.provider.sign_out();
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::test_support::valid_session;

    #[test]
    fn starts_loading_and_unauthenticated() {
        let store = AuthStore::new(EventSink::disconnected());
        assert!(store.is_loading());
        assert!(!store.is_authenticated());
        assert_eq!(store.id_token(), None);
        assert_eq!(store.user_email(), None);
    }

    #[test]
    fn set_session_exposes_tokens_and_publishes() {
        let (sink, mut events) = EventSink::channel();
        let mut store = AuthStore::new(sink);
        let session = valid_session("a@b.c");

        store.set_session(Some(session.clone()));

        assert!(store.is_authenticated());
        assert!(!store.is_loading());
        assert_eq!(store.id_token(), Some(session.id_token.as_str()));
        assert_eq!(store.access_token(), Some(session.access_token.as_str()));
        assert_eq!(
            events.try_recv().unwrap(),
            ChatEvent::AuthChanged(AuthStatus {
                authenticated: true,
                loading: false,
                email: Some("a@b.c".into()),
            })
        );
    }

    #[test]
    fn clear_drops_session() {
        let mut store = AuthStore::new(EventSink::disconnected());
        store.set_session(Some(valid_session("a@b.c")));
        store.clear();
        assert!(!store.is_authenticated());
        assert_eq!(store.status(), AuthStatus::default());
    }
}
