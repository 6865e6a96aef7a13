use crate::convert::{item_to_record, record_to_item};
use crate::update::apply_update;
use crate::{AttrUpdate, Record, StoreError};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;
use std::future::Future;
use types::attrs;

/// Access to per-frame detector rows, keyed by `(Stream_ID, DateTime)` and
/// indexed by `(Segment, Segment_Millis)`.
pub trait FrameStore {
    /// All frame rows of one segment, ascending by offset within the
    /// segment.
    fn frames_for_segment(
        &self,
        segment_id: &str,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send;

    /// One frame row, restricted to the named attributes. Attributes absent
    /// from the row are absent from the result; an existing row with none
    /// of the requested attributes yields an empty record.
    fn get_frame(
        &self,
        stream_id: &str,
        date_time: &str,
        attributes: &[String],
    ) -> impl Future<Output = Result<Option<Record>, StoreError>> + Send;

    fn put_frame(
        &self,
        frame: Record,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Additive attribute update on one frame row.
    fn update_frame(
        &self,
        stream_id: &str,
        date_time: &str,
        updates: Vec<AttrUpdate>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[derive(Debug, Clone)]
pub struct DynamoFrameStore {
    client: Client,
    table_name: String,
}

impl DynamoFrameStore {
    #[must_use]
    pub const fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    fn key(
        stream_id: &str,
        date_time: &str,
    ) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (
                attrs::STREAM_ID.to_string(),
                AttributeValue::S(stream_id.to_string()),
            ),
            (
                attrs::DATE_TIME.to_string(),
                AttributeValue::S(date_time.to_string()),
            ),
        ])
    }
}

impl FrameStore for DynamoFrameStore {
    async fn frames_for_segment(
        &self,
        segment_id: &str,
    ) -> Result<Vec<Record>, StoreError> {
        let mut frames = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let mut query = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(attrs::SEGMENT_MILLIS_INDEX)
                .key_condition_expression("#seg = :seg")
                .expression_attribute_names("#seg", attrs::SEGMENT)
                .expression_attribute_values(
                    ":seg",
                    AttributeValue::S(segment_id.to_string()),
                )
                .scan_index_forward(true);

            if let Some(start_key) = exclusive_start_key {
                query = query.set_exclusive_start_key(Some(start_key));
            }

            let response =
                query.send().await.map_err(StoreError::dynamo)?;

            frames.extend(
                response
                    .items
                    .unwrap_or_default()
                    .iter()
                    .map(item_to_record),
            );

            if response.last_evaluated_key.is_none() {
                break;
            }
            exclusive_start_key = response.last_evaluated_key;
        }

        Ok(frames)
    }

    async fn get_frame(
        &self,
        stream_id: &str,
        date_time: &str,
        attributes: &[String],
    ) -> Result<Option<Record>, StoreError> {
        let aliases: Vec<String> =
            (0..attributes.len()).map(|i| format!("#a{i}")).collect();

        let mut request = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(stream_id, date_time)))
            .projection_expression(aliases.join(", "));

        for (alias, name) in aliases.iter().zip(attributes) {
            request = request.expression_attribute_names(alias, name);
        }

        let response =
            request.send().await.map_err(StoreError::dynamo)?;

        Ok(response.item.map(|item| item_to_record(&item)))
    }

    async fn put_frame(&self, frame: Record) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record_to_item(&frame)))
            .send()
            .await
            .map_err(StoreError::dynamo)?;

        Ok(())
    }

    async fn update_frame(
        &self,
        stream_id: &str,
        date_time: &str,
        updates: Vec<AttrUpdate>,
    ) -> Result<(), StoreError> {
        apply_update(
            &self.client,
            &self.table_name,
            Self::key(stream_id, date_time),
            &updates,
        )
        .await
    }
}
