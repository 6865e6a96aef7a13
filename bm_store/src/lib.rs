//! DynamoDB persistence for the broadcast monitoring pipeline.
//!
//! Three tables back the pipeline: the schedule (expected programming per
//! stream), the segment table, and the frame table. Each is exposed as a
//! trait so the engine components take an injected store and unit tests run
//! against in-memory fakes; the `Dynamo*` types are the real bindings.
//!
//! Segment and frame rows are shared mutable state across stages. All writes
//! go through [`update::build_update_expression`], which only ever produces
//! additive `SET` updates scoped to the caller's attribute set; no stage
//! replaces a whole row.

pub mod convert;
mod error;
mod frame;
mod schedule;
mod segment;
pub mod update;

pub use error::StoreError;
pub use frame::{DynamoFrameStore, FrameStore};
pub use schedule::{DynamoScheduleStore, ScheduleStore};
pub use segment::{DynamoSegmentStore, SegmentStore};

/// A row as attribute-name/value pairs, in JSON form. Used where stages
/// copy or inspect attributes generically rather than through a typed
/// record.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// An attribute write destined for a `SET` update.
pub type AttrUpdate = (String, aws_sdk_dynamodb::types::AttributeValue);
