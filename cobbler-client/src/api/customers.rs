use crate::{ApiClient, ClientResult};
use shared::models::{Customer, CustomerCreate, CustomerUpdate, Transaction};
use shared::response::MessageResponse;

impl ApiClient {
    pub async fn list_customers(&self) -> ClientResult<Vec<Customer>> {
        self.get("/api/customers").await
    }

    /// Name / email / contact search used by the intake form
    pub async fn search_customers(&self, term: &str) -> ClientResult<Vec<Customer>> {
        self.get_query("/api/customers", &[("search", term)]).await
    }

    pub async fn get_customer(&self, id: &str) -> ClientResult<Customer> {
        self.get(&format!("/api/customers/{}", id)).await
    }

    pub async fn create_customer(&self, customer: &CustomerCreate) -> ClientResult<Customer> {
        self.post("/api/customers", customer).await
    }

    pub async fn update_customer(&self, id: &str, update: &CustomerUpdate) -> ClientResult<Customer> {
        self.put(&format!("/api/customers/{}", id), update).await
    }

    pub async fn delete_customer(&self, id: &str) -> ClientResult<MessageResponse> {
        self.delete(&format!("/api/customers/{}", id)).await
    }

    /// Transaction history of one customer
    pub async fn customer_transactions(&self, id: &str) -> ClientResult<Vec<Transaction>> {
        self.get(&format!("/api/customers/{}/transactions", id)).await
    }
}
