use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

/// A single vote: one option chosen in one poll.
///
/// Both identifiers are opaque to the relay; the only requirement is that
/// they are non-empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteItem {
    /// Poll identifier, as defined by the upstream service.
    #[serde(alias = "poll_id")]
    pub poll_id: String,
    /// Option identifier within the poll.
    #[serde(alias = "option_id")]
    pub option_id: String,
}

impl VoteItem {
    /// Create a vote item
    pub fn new(poll_id: impl Into<String>, option_id: impl Into<String>) -> Self {
        Self {
            poll_id: poll_id.into(),
            option_id: option_id.into(),
        }
    }
}

/// A validated, non-empty, ordered batch of vote items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRequest {
    items: Vec<VoteItem>,
}

impl VoteRequest {
    /// Parse a raw request body.
    ///
    /// A body that is not JSON at all is treated like `{}` and therefore
    /// rejected with the same shape error.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let value = serde_json::from_slice(body).unwrap_or(Value::Object(Default::default()));
        Self::from_value(&value)
    }

    /// Normalize either `{pollId, optionId}` or `{votes: [...]}`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(shape_error)?;

        if let Some(votes) = object.get("votes") {
            let votes = votes.as_array().ok_or_else(shape_error)?;
            if votes.is_empty() {
                return Err(AppError::InvalidInput("votes must not be empty".to_string()));
            }
            let items = votes
                .iter()
                .enumerate()
                .map(|(index, vote)| item_from(vote, Some(index)))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Self { items });
        }

        let has_poll = field(object, "pollId", "poll_id").is_some();
        let has_option = field(object, "optionId", "option_id").is_some();
        if !has_poll && !has_option {
            return Err(shape_error());
        }

        Ok(Self {
            items: vec![item_from(value, None)?],
        })
    }

    /// Items in request order
    pub fn items(&self) -> &[VoteItem] {
        &self.items
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the request carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn shape_error() -> AppError {
    AppError::InvalidInput(
        "expected {pollId, optionId} or {votes: [{pollId, optionId}, ...]}".to_string(),
    )
}

fn field<'a>(
    object: &'a serde_json::Map<String, Value>,
    name: &str,
    alias: &str,
) -> Option<&'a Value> {
    object.get(name).or_else(|| object.get(alias))
}

fn item_from(value: &Value, index: Option<usize>) -> Result<VoteItem> {
    let location = match index {
        Some(i) => format!("votes[{}]", i),
        None => "vote".to_string(),
    };

    let object = value
        .as_object()
        .ok_or_else(|| AppError::InvalidInput(format!("{} must be an object", location)))?;

    let required = |name: &str, alias: &str| -> Result<String> {
        match field(object, name, alias).and_then(Value::as_str) {
            Some(s) if !s.is_empty() => Ok(s.to_string()),
            _ => Err(AppError::InvalidInput(format!(
                "{} requires a non-empty string {}",
                location, name
            ))),
        }
    };

    Ok(VoteItem {
        poll_id: required("pollId", "poll_id")?,
        option_id: required("optionId", "option_id")?,
    })
}
