//! Additive `SET` update expressions.
//!
//! Every stage writes only its own attribute set, so updates are always a
//! list of `(name, value)` pairs turned into one `UpdateItem` call. Names
//! are aliased through expression attribute names because several of the
//! pipeline's attributes collide with DynamoDB reserved words.

use crate::{AttrUpdate, StoreError};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

type NamedExpressions =
    (String, HashMap<String, String>, HashMap<String, AttributeValue>);

pub fn build_update_expression(updates: &[AttrUpdate]) -> NamedExpressions {
    let (exprs, names, values) = updates.iter().enumerate().fold(
        (Vec::new(), HashMap::new(), HashMap::new()),
        |(mut exprs, mut names, mut values), (i, (name, value))| {
            exprs.push(format!("#k{i} = :v{i}"));
            names.insert(format!("#k{i}"), name.clone());
            values.insert(format!(":v{i}"), value.clone());
            (exprs, names, values)
        },
    );

    (format!("SET {}", exprs.join(", ")), names, values)
}

pub(crate) async fn apply_update(
    client: &Client,
    table_name: &str,
    key: HashMap<String, AttributeValue>,
    updates: &[AttrUpdate],
) -> Result<(), StoreError> {
    if updates.is_empty() {
        return Ok(());
    }

    let (expression, names, values) = build_update_expression(updates);

    tracing::debug!(
        "Updating {} with expression: {}",
        table_name,
        expression
    );

    client
        .update_item()
        .table_name(table_name)
        .set_key(Some(key))
        .update_expression(expression)
        .set_expression_attribute_names(Some(names))
        .set_expression_attribute_values(Some(values))
        .send()
        .await
        .map_err(StoreError::dynamo)?;

    Ok(())
}
