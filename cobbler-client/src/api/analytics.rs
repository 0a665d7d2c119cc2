use crate::{ApiClient, ClientResult};
use serde::Serialize;
use shared::models::{DashboardSummary, MonthlySales, ServiceCount};

/// Analytics filter; empty means all branches, current year
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyticsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl ApiClient {
    pub async fn monthly_sales(&self, query: &AnalyticsQuery) -> ClientResult<Vec<MonthlySales>> {
        self.get_query("/api/analytics/monthly-sales", query).await
    }

    pub async fn service_counts(&self, query: &AnalyticsQuery) -> ClientResult<Vec<ServiceCount>> {
        self.get_query("/api/analytics/services", query).await
    }

    pub async fn dashboard_summary(&self, query: &AnalyticsQuery) -> ClientResult<DashboardSummary> {
        self.get_query("/api/analytics/summary", query).await
    }
}
