use eventdesk_shared::Reservation;

use crate::{ApiClient, ApiError, client::segment, envelope::data_or_default};

impl ApiClient {
    /// Roster of one event (administrators only).
    #[tracing::instrument(skip(self))]
    pub async fn event_reservations(&self, event_id: &str) -> Result<Vec<Reservation>, ApiError> {
        data_or_default(
            self.get(&format!("/events/{}/reservations", segment(event_id)))
                .await?,
        )
    }

    #[tracing::instrument(skip(self))]
    pub async fn my_reservations(&self) -> Result<Vec<Reservation>, ApiError> {
        data_or_default(self.get("/my-reservations").await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn cancel_reservation(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/reservations/{}", segment(id))).await?;
        Ok(())
    }
}
