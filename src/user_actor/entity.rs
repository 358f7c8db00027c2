use chrono::Utc;

use super::error::UserError;
use crate::actor_framework::Entity;
use crate::domain::{User, UserCreate};

impl Entity for User {
    type Id = String;
    type CreateParams = UserCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();
    type Error = UserError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Emails are unique regardless of case.
    fn unique_key(&self) -> Option<String> {
        Some(self.email.to_ascii_lowercase())
    }

    fn from_create_params(id: String, params: UserCreate) -> Result<Self, UserError> {
        let name = params.name.trim();
        let email = params.email.trim();
        if name.is_empty() {
            return Err(UserError::ValidationError("name is required".into()));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(UserError::ValidationError(format!("invalid email: '{}'", email)));
        }
        Ok(Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role: params.role,
            created_at: Utc::now(),
        })
    }

    /// Users are immutable once registered.
    fn on_update(&mut self, _patch: ()) -> Result<(), UserError> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), UserError> {
        Ok(())
    }
}
