use crate::{ApiClient, ClientResult, Fallback};
use serde::{Deserialize, Serialize};
use shared::models::{
    Customer, LineItem, Payment, PaymentStatus, ServiceRequestCreate, ServiceRequestCreated, Transaction,
    TransactionUpdate,
};

/// Transaction list filter
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

/// Everything the payment / detail view shows for one transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionView {
    pub transaction: Transaction,
    pub line_items: Vec<LineItem>,
    pub payments: Vec<Payment>,
    /// `None` when the customer record could not be loaded
    pub customer: Option<Customer>,
}

impl ApiClient {
    pub async fn list_transactions(&self, query: &TransactionQuery) -> ClientResult<Vec<Transaction>> {
        self.get_query("/api/transactions", query).await
    }

    pub async fn get_transaction(&self, id: &str) -> ClientResult<Transaction> {
        self.get(&format!("/api/transactions/{}", id)).await
    }

    /// Service-request intake: creates the transaction and its line items
    pub async fn create_service_request(
        &self,
        request: &ServiceRequestCreate,
    ) -> ClientResult<ServiceRequestCreated> {
        let created: ServiceRequestCreated = self.post("/api/transactions", request).await?;
        tracing::info!(
            transaction_id = %created.transaction.transaction_id,
            pairs = created.line_items.len(),
            "Service request created"
        );
        Ok(created)
    }

    pub async fn update_transaction(
        &self,
        id: &str,
        update: &TransactionUpdate,
    ) -> ClientResult<Transaction> {
        self.patch(&format!("/api/transactions/{}", id), update).await
    }

    pub async fn transaction_line_items(&self, id: &str) -> ClientResult<Vec<LineItem>> {
        self.get(&format!("/api/transactions/{}/line-items", id)).await
    }

    pub async fn transaction_payments(&self, id: &str) -> ClientResult<Vec<Payment>> {
        self.get(&format!("/api/transactions/{}/payments", id)).await
    }

    /// Fetch transaction, line items and payments concurrently, then the customer
    ///
    /// A missing customer does not fail the view.
    pub async fn load_transaction_view(&self, id: &str) -> ClientResult<TransactionView> {
        let (transaction, line_items, payments) = tokio::try_join!(
            self.get_transaction(id),
            self.transaction_line_items(id),
            self.transaction_payments(id),
        )?;

        let customer = self
            .get_customer(&transaction.customer_id)
            .await
            .map(Some)
            .or_fallback("transaction customer");

        Ok(TransactionView {
            transaction,
            line_items,
            payments,
            customer,
        })
    }
}
