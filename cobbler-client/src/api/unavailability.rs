use crate::{ApiClient, ClientResult};
use shared::models::{Unavailability, UnavailabilityCreate};
use shared::response::MessageResponse;

impl ApiClient {
    /// Closures of one branch
    pub async fn list_unavailability(&self, branch_id: &str) -> ClientResult<Vec<Unavailability>> {
        self.get_query("/api/unavailability", &[("branch_id", branch_id)])
            .await
    }

    pub async fn create_unavailability(
        &self,
        input: &UnavailabilityCreate,
    ) -> ClientResult<Unavailability> {
        self.post("/api/unavailability", input).await
    }

    pub async fn delete_unavailability(&self, id: &str) -> ClientResult<MessageResponse> {
        self.delete(&format!("/api/unavailability/{}", id)).await
    }
}
