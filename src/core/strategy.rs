use reqwest::Url;
use serde_json::{json, Value};

use crate::models::vote::VoteItem;

/// One path segment of an endpoint template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Fixed text.
    Lit(&'static str),
    /// The vote's poll id, percent-encoded as a single segment.
    PollId,
}

/// Body shape sent to the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `{pollId, votes: [{optionId}]}`
    PollWithOptionObjects,
    /// `{pollId, votes: [optionId]}`
    PollWithOptionIds,
    /// `{votes: [{optionId}]}`, poll id carried in the path
    OptionObjects,
    /// `{votes: [optionId]}`, poll id carried in the path
    OptionIds,
    /// `{poll_id, poll_option_id}`
    LegacyFlat,
}

impl Encoding {
    /// Build the request body for a vote
    pub fn encode(self, item: &VoteItem) -> Value {
        match self {
            Self::PollWithOptionObjects => json!({
                "pollId": item.poll_id,
                "votes": [{ "optionId": item.option_id }],
            }),
            Self::PollWithOptionIds => json!({
                "pollId": item.poll_id,
                "votes": [item.option_id],
            }),
            Self::OptionObjects => json!({
                "votes": [{ "optionId": item.option_id }],
            }),
            Self::OptionIds => json!({
                "votes": [item.option_id],
            }),
            Self::LegacyFlat => json!({
                "poll_id": item.poll_id,
                "poll_option_id": item.option_id,
            }),
        }
    }
}

/// An (endpoint template, payload encoding) pair the relay may try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    /// Short name used in logs and failure traces.
    pub name: &'static str,
    /// Path appended to the upstream base URL.
    pub path: &'static [Segment],
    /// Body shape.
    pub encoding: Encoding,
}

impl Strategy {
    /// Render the endpoint for `poll_id` under `base`.
    ///
    /// Returns `None` only when `base` cannot carry a path (e.g. `data:` URLs).
    pub fn endpoint(&self, base: &Url, poll_id: &str) -> Option<Url> {
        let mut url = base.clone();
        {
            let mut segments = url.path_segments_mut().ok()?;
            segments.pop_if_empty();
            for segment in self.path {
                match segment {
                    Segment::Lit(text) => segments.push(text),
                    Segment::PollId => segments.push(poll_id),
                };
            }
        }
        Some(url)
    }

    /// Build the request body for a vote
    pub fn payload(&self, item: &VoteItem) -> Value {
        self.encoding.encode(item)
    }
}

const GLOBAL_VOTES: &[Segment] = &[Segment::Lit("votes")];
const POLL_VOTES: &[Segment] = &[Segment::Lit("polls"), Segment::PollId, Segment::Lit("votes")];
const POLL_VOTE: &[Segment] = &[Segment::Lit("polls"), Segment::PollId, Segment::Lit("vote")];

/// Built-in fallback order, cheapest and most commonly accepted shape first.
pub const DEFAULT_STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "votes-option-objects",
        path: GLOBAL_VOTES,
        encoding: Encoding::PollWithOptionObjects,
    },
    Strategy {
        name: "votes-option-ids",
        path: GLOBAL_VOTES,
        encoding: Encoding::PollWithOptionIds,
    },
    Strategy {
        name: "poll-votes-option-objects",
        path: POLL_VOTES,
        encoding: Encoding::OptionObjects,
    },
    Strategy {
        name: "poll-vote-option-ids",
        path: POLL_VOTE,
        encoding: Encoding::OptionIds,
    },
    Strategy {
        name: "votes-legacy-flat",
        path: GLOBAL_VOTES,
        encoding: Encoding::LegacyFlat,
    },
];
