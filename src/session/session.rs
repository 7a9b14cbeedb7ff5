use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub access_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<SessionUser>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: SessionUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.access_token.as_str())
    }
}
