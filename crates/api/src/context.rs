use chapel_auth::Session;

/// Session for a request, re-resolved from storage by the session middleware.
///
/// `None` means anonymous. It is present on every request that passed the
/// middleware stack.
#[derive(Debug, Clone, Default)]
pub struct SessionContext(Option<Session>);

impl SessionContext {
    pub fn new(session: Option<Session>) -> Self {
        Self(session)
    }

    pub fn session(&self) -> Option<&Session> {
        self.0.as_ref()
    }
}
