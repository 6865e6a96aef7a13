use crate::StoreError;
use crate::convert::decimal_seconds;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use std::future::Future;
use types::{ScheduledProgram, attrs};

/// Read access to a stream's expected-programming schedule.
///
/// The schedule is keyed by `(Stream_ID, Start_Time)` and sorted by start
/// time; this pipeline never writes it.
pub trait ScheduleStore {
    /// The entry with the latest `Start_Time` for the stream. Its
    /// `End_Time` is the stream's loop length.
    fn latest_entry(
        &self,
        stream_id: &str,
    ) -> impl Future<Output = Result<Option<ScheduledProgram>, StoreError>> + Send;

    /// All entries with `Start_Time <= upper_ms`, ascending by start time.
    /// The end-time overlap filter is applied by the resolver, in
    /// millisecond arithmetic.
    fn entries_starting_before(
        &self,
        stream_id: &str,
        upper_ms: i64,
    ) -> impl Future<Output = Result<Vec<ScheduledProgram>, StoreError>> + Send;
}

#[derive(Debug, Clone)]
pub struct DynamoScheduleStore {
    client: Client,
    table_name: String,
}

impl DynamoScheduleStore {
    #[must_use]
    pub const fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

impl ScheduleStore for DynamoScheduleStore {
    async fn latest_entry(
        &self,
        stream_id: &str,
    ) -> Result<Option<ScheduledProgram>, StoreError> {
        let response = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("#sid = :sid")
            .expression_attribute_names("#sid", attrs::STREAM_ID)
            .expression_attribute_values(
                ":sid",
                AttributeValue::S(stream_id.to_string()),
            )
            .scan_index_forward(false)
            .limit(1)
            .send()
            .await
            .map_err(StoreError::dynamo)?;

        response
            .items
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|item| serde_dynamo::from_item(item).map_err(StoreError::from))
            .transpose()
    }

    async fn entries_starting_before(
        &self,
        stream_id: &str,
        upper_ms: i64,
    ) -> Result<Vec<ScheduledProgram>, StoreError> {
        let mut entries = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let mut query = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#sid = :sid AND #start <= :upper")
                .expression_attribute_names("#sid", attrs::STREAM_ID)
                .expression_attribute_names("#start", attrs::START_TIME)
                .expression_attribute_values(
                    ":sid",
                    AttributeValue::S(stream_id.to_string()),
                )
                .expression_attribute_values(":upper", decimal_seconds(upper_ms))
                .scan_index_forward(true);

            if let Some(start_key) = exclusive_start_key {
                query = query.set_exclusive_start_key(Some(start_key));
            }

            let response =
                query.send().await.map_err(StoreError::dynamo)?;

            for item in response.items.unwrap_or_default() {
                entries.push(serde_dynamo::from_item(item)?);
            }

            if response.last_evaluated_key.is_none() {
                break;
            }
            exclusive_start_key = response.last_evaluated_key;
        }

        Ok(entries)
    }
}
