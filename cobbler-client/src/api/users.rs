use crate::{ApiClient, ClientResult};
use shared::models::{User, UserCreate, UserUpdate};
use shared::response::MessageResponse;

impl ApiClient {
    pub async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.get("/api/users").await
    }

    pub async fn create_user(&self, user: &UserCreate) -> ClientResult<User> {
        self.post("/api/users", user).await
    }

    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> ClientResult<User> {
        self.put(&format!("/api/users/{}", id), update).await
    }

    pub async fn delete_user(&self, id: &str) -> ClientResult<MessageResponse> {
        self.delete(&format!("/api/users/{}", id)).await
    }
}
