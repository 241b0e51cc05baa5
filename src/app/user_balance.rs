use crate::domain::model::User;
use crate::domain::ports::UserRepository;
use std::sync::Arc;
use uuid::Uuid;

pub struct UserBalanceService {
    users: Arc<dyn UserRepository>,
}

impl UserBalanceService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Unknown users get a fresh account.
    pub fn balance(&self, user_id: Uuid) -> User {
        self.users.find_or_create(user_id)
    }
}
