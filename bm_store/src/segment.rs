use crate::convert::{decimal_seconds, item_to_record};
use crate::update::apply_update;
use crate::{AttrUpdate, Record, StoreError};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;
use std::future::Future;
use types::{attrs, millis};

/// Access to per-segment evaluation rows, keyed by
/// `(Stream_ID, Start_DateTime)`.
pub trait SegmentStore {
    fn get_segment(
        &self,
        stream_id: &str,
        start_date_time: &str,
    ) -> impl Future<Output = Result<Option<Record>, StoreError>> + Send;

    /// Find the most recently finished segment of this stream at the same
    /// loop position with the same duration, excluding the segment
    /// identified by `exclude_start_date_time`. Returns the source
    /// segment's `Start_DateTime`.
    fn find_reusable(
        &self,
        stream_id: &str,
        start_in_loop_ms: i64,
        exclude_start_date_time: &str,
        duration_sec: f64,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Additive attribute update on one segment row.
    fn update_segment(
        &self,
        stream_id: &str,
        start_date_time: &str,
        updates: Vec<AttrUpdate>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[derive(Debug, Clone)]
pub struct DynamoSegmentStore {
    client: Client,
    table_name: String,
}

impl DynamoSegmentStore {
    #[must_use]
    pub const fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    fn key(
        stream_id: &str,
        start_date_time: &str,
    ) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (
                attrs::STREAM_ID.to_string(),
                AttributeValue::S(stream_id.to_string()),
            ),
            (
                attrs::START_DATE_TIME.to_string(),
                AttributeValue::S(start_date_time.to_string()),
            ),
        ])
    }
}

impl SegmentStore for DynamoSegmentStore {
    async fn get_segment(
        &self,
        stream_id: &str,
        start_date_time: &str,
    ) -> Result<Option<Record>, StoreError> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(stream_id, start_date_time)))
            .send()
            .await
            .map_err(StoreError::dynamo)?;

        Ok(response.item.map(|item| item_to_record(&item)))
    }

    async fn find_reusable(
        &self,
        stream_id: &str,
        start_in_loop_ms: i64,
        exclude_start_date_time: &str,
        duration_sec: f64,
    ) -> Result<Option<String>, StoreError> {
        // Most recent first; the filter runs server-side so pagination is
        // rarely needed for the handful of loop iterations a stream keeps.
        let response = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(attrs::STREAM_START_IN_LOOP_INDEX)
            .scan_index_forward(false)
            .key_condition_expression("#sid = :sid AND #pos = :pos")
            .filter_expression(
                "#finished = :finished AND #start <> :start AND #dur = :dur",
            )
            .expression_attribute_names("#sid", attrs::STREAM_ID)
            .expression_attribute_names("#pos", attrs::START_TIME_SEC_IN_LOOP)
            .expression_attribute_names("#finished", attrs::FINISHED)
            .expression_attribute_names("#start", attrs::START_DATE_TIME)
            .expression_attribute_names("#dur", attrs::DURATION_SEC)
            .expression_attribute_values(
                ":sid",
                AttributeValue::S(stream_id.to_string()),
            )
            .expression_attribute_values(
                ":pos",
                decimal_seconds(start_in_loop_ms),
            )
            .expression_attribute_values(":finished", AttributeValue::Bool(true))
            .expression_attribute_values(
                ":start",
                AttributeValue::S(exclude_start_date_time.to_string()),
            )
            .expression_attribute_values(
                ":dur",
                decimal_seconds(millis::from_seconds(duration_sec)),
            )
            .send()
            .await
            .map_err(StoreError::dynamo)?;

        Ok(response
            .items
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|item| {
                item.get(attrs::START_DATE_TIME)
                    .and_then(|v| v.as_s().ok())
                    .cloned()
            }))
    }

    async fn update_segment(
        &self,
        stream_id: &str,
        start_date_time: &str,
        updates: Vec<AttrUpdate>,
    ) -> Result<(), StoreError> {
        apply_update(
            &self.client,
            &self.table_name,
            Self::key(stream_id, start_date_time),
            &updates,
        )
        .await
    }
}
