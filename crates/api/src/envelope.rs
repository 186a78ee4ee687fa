use eventdesk_shared::Event;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::ApiError;

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default, alias = "pages")]
    pub total_pages: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventList {
    pub events: Vec<Event>,
    pub pagination: Option<Pagination>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EventListData {
    Page {
        #[serde(default)]
        events: Vec<Event>,
        #[serde(default)]
        pagination: Option<Pagination>,
    },
    Plain(Vec<Event>),
}

/// `data` of a `{success, data}` envelope.
pub(crate) fn data<T: DeserializeOwned>(mut body: Value) -> Result<T, ApiError> {
    match body.get_mut("data").map(Value::take) {
        Some(Value::Null) | None => Err(ApiError::MalformedResponse(
            "response envelope has no data".to_owned(),
        )),
        Some(data) => Ok(serde_json::from_value(data)?),
    }
}

/// Like [`data`] but a missing or null payload becomes the default value.
pub(crate) fn data_or_default<T: DeserializeOwned + Default>(
    mut body: Value,
) -> Result<T, ApiError> {
    match body.get_mut("data").map(Value::take) {
        Some(Value::Null) | None => Ok(T::default()),
        Some(data) => Ok(serde_json::from_value(data)?),
    }
}

/// Mutation endpoints may answer with the new record or with nothing useful.
pub(crate) fn optional_data<T: DeserializeOwned>(body: Value) -> Option<T> {
    data(body).ok()
}

pub(crate) fn event_list(body: Value) -> Result<EventList, ApiError> {
    let Some(data) = data_or_default::<Option<EventListData>>(body)? else {
        return Ok(EventList::default());
    };

    Ok(match data {
        EventListData::Page { events, pagination } => EventList { events, pagination },
        EventListData::Plain(events) => EventList {
            events,
            pagination: None,
        },
    })
}
