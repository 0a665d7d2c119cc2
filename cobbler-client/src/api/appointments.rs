use crate::{ApiClient, ClientResult};
use serde::Serialize;
use shared::models::{Appointment, AppointmentStatus, AppointmentStatusUpdate};

/// Appointment list filter
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppointmentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
}

impl ApiClient {
    pub async fn list_appointments(&self, query: &AppointmentQuery) -> ClientResult<Vec<Appointment>> {
        self.get_query("/api/appointments", query).await
    }

    pub async fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> ClientResult<Appointment> {
        self.patch(
            &format!("/api/appointments/{}/status", id),
            &AppointmentStatusUpdate { status },
        )
        .await
    }
}
