use eventdesk_shared::{OccupancyReport, OccupancyRow};

use crate::{ApiClient, ApiError, envelope::data_or_default};

impl ApiClient {
    #[tracing::instrument(skip(self))]
    pub async fn occupancy_report(&self) -> Result<OccupancyReport, ApiError> {
        let rows: Vec<OccupancyRow> = data_or_default(self.get("/admin/reports/occupancy").await?)?;
        Ok(rows.into())
    }
}
