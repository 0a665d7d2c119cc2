use crate::{ApiClient, ClientResult};
use shared::models::{Promo, PromoInput};
use shared::response::MessageResponse;

impl ApiClient {
    pub async fn list_promos(&self) -> ClientResult<Vec<Promo>> {
        self.get("/api/promos").await
    }

    pub async fn create_promo(&self, input: &PromoInput) -> ClientResult<Promo> {
        self.post("/api/promos", input).await
    }

    pub async fn update_promo(&self, id: &str, input: &PromoInput) -> ClientResult<Promo> {
        self.put(&format!("/api/promos/{}", id), input).await
    }

    pub async fn delete_promo(&self, id: &str) -> ClientResult<MessageResponse> {
        self.delete(&format!("/api/promos/{}", id)).await
    }
}
