//! AppSync GraphQL push for finished segment summaries.

use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};
use types::StatusSummary;

const NEW_SEGMENT_READY_GQL: &str = "
mutation NewSegmentSummaryReady($input: newSegmentSummaryReadyInput!) {
  newSegmentSummaryReady(input: $input) {
    Stream_ID
    Start_DateTime
    Duration_Sec
    S3_Key
    Station_Status
    Audio_Status
    Sports_Status
    Team_Status
    Thumbnail_Key
  }
}
";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("graphql request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not encode graphql payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Input of the `newSegmentSummaryReady` mutation. Undecided check
/// statuses go out as explicit nulls; a missing thumbnail is omitted.
#[derive(Debug, Serialize)]
pub struct SegmentSummaryInput<'a> {
    #[serde(rename = "Stream_ID")]
    pub stream_id: &'a str,

    #[serde(rename = "Start_DateTime")]
    pub start_date_time: &'a str,

    #[serde(rename = "Duration_Sec")]
    pub duration_sec: f64,

    #[serde(rename = "S3_Key")]
    pub s3_key: &'a str,

    #[serde(
        rename = "Thumbnail_Key",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail_key: Option<&'a str>,

    #[serde(flatten)]
    pub status: StatusSummary,
}

/// AppSync wants the operation variables as an embedded JSON string, not
/// an object.
fn request_body(
    input: &SegmentSummaryInput<'_>,
) -> Result<String, serde_json::Error> {
    let variables = serde_json::to_string(&json!({ "input": input }))?;

    serde_json::to_string(&json!({
        "query": NEW_SEGMENT_READY_GQL,
        "variables": variables,
    }))
}

#[derive(Debug, Clone)]
pub struct AppSyncClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl AppSyncClient {
    #[must_use]
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }

    /// Notify subscribers that a new segment summary is available.
    pub async fn notify_segment_ready(
        &self,
        input: &SegmentSummaryInput<'_>,
    ) -> Result<(), NotifyError> {
        let body = request_body(input)?;
        debug!("graphQL request payload: {}", body);

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/graphql")
            .header("x-api-key", &self.api_key)
            .header("cache-control", "no-cache")
            .body(body)
            .send()
            .await?;

        // Fire and forget: a rejected mutation is logged, never fatal for
        // the segment. Only transport failures propagate.
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_success() {
            info!("graphQL response: {}", body);
        } else {
            warn!("graphQL push returned {}: {}", status, body);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::CheckStatus;

    #[test]
    fn variables_are_an_embedded_json_string() {
        let input = SegmentSummaryInput {
            stream_id: "test_1",
            start_date_time: "2020-03-05T18:49:28.708000Z",
            duration_sec: 5.0,
            s3_key: "live/test_1/test_1_00031.ts",
            thumbnail_key: Some("frames/resized/a.jpg"),
            status: StatusSummary {
                audio_status: CheckStatus::Pass,
                station_status: CheckStatus::Fail,
                ..StatusSummary::default()
            },
        };

        let body: serde_json::Value =
            serde_json::from_str(&request_body(&input).unwrap()).unwrap();

        let variables: serde_json::Value =
            serde_json::from_str(body["variables"].as_str().unwrap())
                .unwrap();
        let summary = &variables["input"];

        assert_eq!(summary["Stream_ID"], json!("test_1"));
        assert_eq!(summary["Duration_Sec"], json!(5.0));
        assert_eq!(summary["Thumbnail_Key"], json!("frames/resized/a.jpg"));
        assert_eq!(summary["Audio_Status"], json!(true));
        assert_eq!(summary["Station_Status"], json!(false));
        assert_eq!(summary["Team_Status"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn rejected_mutation_is_not_fatal() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener =
            tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0_u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 403 Forbidden\r\ncontent-length: 0\r\n\r\n",
                )
                .await;
        });

        let client =
            AppSyncClient::new(format!("http://{addr}"), "bad-key".into());
        let input = SegmentSummaryInput {
            stream_id: "test_1",
            start_date_time: "2020-03-05T18:49:28.708000Z",
            duration_sec: 5.0,
            s3_key: "live/test_1/test_1_00031.ts",
            thumbnail_key: None,
            status: StatusSummary::default(),
        };

        client.notify_segment_ready(&input).await.unwrap();
    }

    #[test]
    fn missing_thumbnail_is_omitted() {
        let input = SegmentSummaryInput {
            stream_id: "test_1",
            start_date_time: "2020-03-05T18:49:28.708000Z",
            duration_sec: 5.0,
            s3_key: "live/test_1/test_1_00031.ts",
            thumbnail_key: None,
            status: StatusSummary::default(),
        };

        let body: serde_json::Value =
            serde_json::from_str(&request_body(&input).unwrap()).unwrap();
        let variables: serde_json::Value =
            serde_json::from_str(body["variables"].as_str().unwrap())
                .unwrap();

        assert!(variables["input"].get("Thumbnail_Key").is_none());
    }
}
