use crate::{ApiClient, ClientResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::models::{LineItem, LineItemStatus, LineItemStatusUpdate, LineItemUpdate};
use shared::response::MessageResponse;

/// Line item list filter
#[derive(Debug, Clone, Default, Serialize)]
pub struct LineItemQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LineItemStatus>,
}

impl LineItemQuery {
    pub fn branch(branch_id: impl Into<String>) -> Self {
        Self {
            branch_id: Some(branch_id.into()),
            status: None,
        }
    }

    pub fn with_status(mut self, status: LineItemStatus) -> Self {
        self.status = Some(status);
        self
    }
}

impl ApiClient {
    pub async fn list_line_items(&self, query: &LineItemQuery) -> ClientResult<Vec<LineItem>> {
        self.get_query("/api/line-items", query).await
    }

    pub async fn get_line_item(&self, id: &str) -> ClientResult<LineItem> {
        self.get(&format!("/api/line-items/{}", id)).await
    }

    /// Pairs waiting at a branch for the customer (branch storage view)
    pub async fn branch_storage(&self, branch_id: &str) -> ClientResult<Vec<LineItem>> {
        self.list_line_items(
            &LineItemQuery::branch(branch_id).with_status(LineItemStatus::ReadyForPickup),
        )
        .await
    }

    /// Move several line items to `new_status` in one call
    pub async fn update_line_item_status(
        &self,
        line_item_ids: &[String],
        new_status: LineItemStatus,
    ) -> ClientResult<MessageResponse> {
        let body = LineItemStatusUpdate {
            line_item_ids: line_item_ids.to_vec(),
            new_status: new_status.clone(),
        };
        let response: MessageResponse = self.put("/api/line-items/status", &body).await?;
        tracing::info!(
            count = line_item_ids.len(),
            status = %new_status,
            "Line item status updated"
        );
        Ok(response)
    }

    /// Advance one line item to the next state of the sequence
    ///
    /// Returns `Ok(None)` when the item is already picked up or in a state
    /// outside the known sequence.
    pub async fn advance_line_item(&self, item: &LineItem) -> ClientResult<Option<LineItemStatus>> {
        let Some(next) = item.current_status.next() else {
            return Ok(None);
        };
        self.update_line_item_status(std::slice::from_ref(&item.id), next.clone())
            .await?;
        Ok(Some(next))
    }

    pub async fn update_line_item(&self, id: &str, update: &LineItemUpdate) -> ClientResult<LineItem> {
        self.patch(&format!("/api/line-items/{}", id), update).await
    }

    /// Record that the customer was told the pair is ready; starts the allowance clock
    pub async fn send_pickup_notice(&self, id: &str, at: DateTime<Utc>) -> ClientResult<LineItem> {
        let update = LineItemUpdate {
            pickup_notice: Some(at),
            ..Default::default()
        };
        self.update_line_item(id, &update).await
    }

    pub async fn set_storage_fee(&self, id: &str, storage_fee: f64) -> ClientResult<LineItem> {
        let update = LineItemUpdate {
            storage_fee: Some(storage_fee),
            ..Default::default()
        };
        self.update_line_item(id, &update).await
    }
}
