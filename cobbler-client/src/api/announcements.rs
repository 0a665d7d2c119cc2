use crate::{ApiClient, ClientResult};
use shared::models::{Announcement, AnnouncementInput};
use shared::response::MessageResponse;

impl ApiClient {
    pub async fn list_announcements(&self) -> ClientResult<Vec<Announcement>> {
        self.get("/api/announcements").await
    }

    pub async fn create_announcement(&self, input: &AnnouncementInput) -> ClientResult<Announcement> {
        self.post("/api/announcements", input).await
    }

    pub async fn update_announcement(
        &self,
        id: &str,
        input: &AnnouncementInput,
    ) -> ClientResult<Announcement> {
        self.put(&format!("/api/announcements/{}", id), input).await
    }

    pub async fn delete_announcement(&self, id: &str) -> ClientResult<MessageResponse> {
        self.delete(&format!("/api/announcements/{}", id)).await
    }
}
