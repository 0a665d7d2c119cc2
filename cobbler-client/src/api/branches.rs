use crate::{ApiClient, ClientResult};
use shared::models::{Branch, BranchCreate, BranchUpdate};
use shared::response::MessageResponse;

impl ApiClient {
    pub async fn list_branches(&self) -> ClientResult<Vec<Branch>> {
        self.get("/api/branches").await
    }

    pub async fn get_branch(&self, id: &str) -> ClientResult<Branch> {
        self.get(&format!("/api/branches/{}", id)).await
    }

    pub async fn create_branch(&self, branch: &BranchCreate) -> ClientResult<Branch> {
        self.post("/api/branches", branch).await
    }

    pub async fn update_branch(&self, id: &str, update: &BranchUpdate) -> ClientResult<Branch> {
        self.put(&format!("/api/branches/{}", id), update).await
    }

    pub async fn delete_branch(&self, id: &str) -> ClientResult<MessageResponse> {
        self.delete(&format!("/api/branches/{}", id)).await
    }
}
