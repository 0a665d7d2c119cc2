use crate::{ApiClient, ClientResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{Payment, PaymentCreate, PaymentMode, Transaction, TransactionUpdate};
use shared::payment::{PaymentSettlement, settle_payment};

/// Result of [`ApiClient::record_payment`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// `None` for a zero-amount settlement (fees / status refresh only)
    pub payment: Option<Payment>,
    pub settlement: PaymentSettlement,
    pub transaction: Transaction,
}

impl ApiClient {
    pub async fn list_payments(&self) -> ClientResult<Vec<Payment>> {
        self.get("/api/payments").await
    }

    pub async fn create_payment(&self, payment: &PaymentCreate) -> ClientResult<Payment> {
        self.post("/api/payments", payment).await
    }

    /// Record a payment against transaction `id`
    ///
    /// Fetches the transaction and its line items, computes storage fees and
    /// the new status locally, then writes the payment, the raised line-item
    /// fees and the transaction totals. Writes are not atomic: a failure part
    /// way leaves earlier writes in place, and the caller retries by hand.
    pub async fn record_payment(
        &self,
        id: &str,
        amount: f64,
        mode: PaymentMode,
        now: DateTime<Utc>,
    ) -> ClientResult<PaymentReceipt> {
        let (transaction, line_items) =
            tokio::try_join!(self.get_transaction(id), self.transaction_line_items(id))?;

        let settlement = settle_payment(&transaction, &line_items, amount, now)?;

        let payment = if amount > 0.0 {
            let create = PaymentCreate {
                transaction_id: transaction.transaction_id.clone(),
                payment_amount: amount,
                payment_mode: mode,
                payment_date: Some(now),
            };
            Some(self.create_payment(&create).await?)
        } else {
            None
        };

        for fee in &settlement.line_item_fees {
            self.set_storage_fee(&fee.id, fee.storage_fee).await?;
        }

        let update = TransactionUpdate {
            amount_paid: Some(settlement.amount_paid),
            payment_status: Some(settlement.status),
            payment_mode: Some(mode),
            ..Default::default()
        };
        let transaction = self.update_transaction(id, &update).await?;

        tracing::info!(
            transaction_id = %transaction.transaction_id,
            amount,
            balance = settlement.balance,
            status = %settlement.status,
            "Payment recorded"
        );

        Ok(PaymentReceipt {
            payment,
            settlement,
            transaction,
        })
    }
}
