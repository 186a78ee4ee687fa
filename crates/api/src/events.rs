use eventdesk_shared::{Event, EventFilters, EventPayload, Reservation};
use reqwest::Method;

use crate::{
    ApiClient, ApiError, EventList,
    client::segment,
    envelope::{data, event_list, optional_data},
};

impl ApiClient {
    #[tracing::instrument(skip_all, fields(page = filters.page))]
    pub async fn list_events(&self, filters: &EventFilters) -> Result<EventList, ApiError> {
        let body = self
            .send::<()>(Method::GET, "/events", &filters.query_pairs(), None)
            .await?;

        event_list(body)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_event(&self, id: &str) -> Result<Event, ApiError> {
        data(self.get(&format!("/events/{}", segment(id))).await?)
    }

    /// Returns the created event when the server echoes it back.
    #[tracing::instrument(skip_all, fields(name = %payload.name))]
    pub async fn create_event(&self, payload: &EventPayload) -> Result<Option<Event>, ApiError> {
        Ok(optional_data(self.post("/events", Some(payload)).await?))
    }

    #[tracing::instrument(skip(self, payload))]
    pub async fn update_event(
        &self,
        id: &str,
        payload: &EventPayload,
    ) -> Result<Option<Event>, ApiError> {
        Ok(optional_data(
            self.put(&format!("/events/{}", segment(id)), payload).await?,
        ))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_event(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/events/{}", segment(id))).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn reserve(&self, event_id: &str) -> Result<Option<Reservation>, ApiError> {
        let body = self
            .post::<()>(&format!("/events/{}/reserve", segment(event_id)), None)
            .await?;

        Ok(optional_data(body))
    }
}
