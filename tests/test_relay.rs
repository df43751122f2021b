mod common;

use reqwest::Url;
use serde_json::json;

use common::{ok, status, transport, ScriptedUpstream, API_KEY, BASE_URL};
use votebridge::{Encoding, RelayOutcome, Segment, Strategy, VoteItem, VoteRelay, DEFAULT_STRATEGIES};

fn relay(upstream: std::sync::Arc<ScriptedUpstream>) -> VoteRelay {
    VoteRelay::new(upstream, Url::parse(BASE_URL).unwrap(), API_KEY)
}

#[tokio::test]
async fn test_first_strategy_success_makes_one_call() {
    let upstream = ScriptedUpstream::new(vec![ok(r#"{"id":"v1"}"#)]);
    let outcome = relay(upstream.clone()).relay(&VoteItem::new("P1", "O1")).await;

    assert_eq!(
        outcome,
        RelayOutcome::Success {
            strategy_index: 0,
            body: json!({"id": "v1"}),
        }
    );

    let calls = upstream.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].url, "http://upstream.test/v3/votes");
    assert_eq!(calls[0].api_key, API_KEY);
    assert_eq!(
        calls[0].payload,
        json!({"pollId": "P1", "votes": [{"optionId": "O1"}]})
    );
}

#[tokio::test]
async fn test_falls_back_to_second_strategy() {
    let upstream = ScriptedUpstream::new(vec![
        status(422, r#"{"error":"bad shape"}"#),
        ok(r#"{"id":"v2"}"#),
    ]);
    let outcome = relay(upstream.clone()).relay(&VoteItem::new("P1", "O1")).await;

    assert_eq!(
        outcome,
        RelayOutcome::Success {
            strategy_index: 1,
            body: json!({"id": "v2"}),
        }
    );

    let calls = upstream.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].payload, json!({"pollId": "P1", "votes": ["O1"]}));
}

#[tokio::test]
async fn test_transport_error_moves_to_next_strategy() {
    let upstream = ScriptedUpstream::new(vec![
        transport("dns error: no such host"),
        status(404, "not here"),
        ok("thanks"),
    ]);
    let outcome = relay(upstream.clone()).relay(&VoteItem::new("P1", "O1")).await;

    // Non-JSON success bodies are wrapped, not dropped
    assert_eq!(
        outcome,
        RelayOutcome::Success {
            strategy_index: 2,
            body: json!({"raw": "thanks"}),
        }
    );
    assert_eq!(
        upstream.calls()[2].url,
        "http://upstream.test/v3/polls/P1/votes"
    );
}

#[tokio::test]
async fn test_exhaustion_reports_every_attempt_in_order() {
    let upstream = ScriptedUpstream::new(vec![
        status(422, "shape 0"),
        transport("connection refused"),
        status(400, "shape 2"),
        status(404, "shape 3"),
        status(500, "shape 4"),
    ]);
    let relay = relay(upstream.clone());
    let outcome = relay.relay(&VoteItem::new("P1", "O1")).await;

    let RelayOutcome::Failure { attempts } = outcome else {
        panic!("expected failure, got {:?}", outcome);
    };
    assert_eq!(attempts.len(), relay.strategies().len());
    assert_eq!(upstream.calls().len(), relay.strategies().len());

    for (index, attempt) in attempts.iter().enumerate() {
        assert_eq!(attempt.strategy_index, index);
        assert_eq!(attempt.strategy, DEFAULT_STRATEGIES[index].name);
    }
    assert_eq!(attempts[0].status, Some(422));
    assert_eq!(attempts[0].body, "shape 0");
    assert_eq!(attempts[1].status, None);
    assert_eq!(attempts[1].body, "connection refused");
    assert_eq!(attempts[3].endpoint, "http://upstream.test/v3/polls/P1/vote");
}

#[tokio::test]
async fn test_redirect_status_is_not_success() {
    let upstream = ScriptedUpstream::always(302, "");
    let outcome = relay(upstream).relay(&VoteItem::new("P1", "O1")).await;
    assert!(!outcome.is_success());
}

#[tokio::test]
async fn test_custom_strategy_table() {
    const PATH: &[Segment] = &[Segment::Lit("ballots"), Segment::PollId];
    let upstream = ScriptedUpstream::new(vec![ok("{}")]);
    let relay = relay(upstream.clone()).with_strategies(vec![Strategy {
        name: "ballots",
        path: PATH,
        encoding: Encoding::OptionIds,
    }]);

    let outcome = relay.relay(&VoteItem::new("P 9", "O1")).await;
    assert!(outcome.is_success());
    assert_eq!(upstream.calls()[0].url, "http://upstream.test/v3/ballots/P%209");
    assert_eq!(upstream.calls()[0].payload, json!({"votes": ["O1"]}));
}

#[tokio::test]
async fn test_debug_output_hides_api_key() {
    let relay = relay(ScriptedUpstream::new(vec![]));
    assert!(!format!("{:?}", relay).contains(API_KEY));
}

#[tokio::test]
async fn test_truncated_success_body_still_counts_as_success() {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    let (base, answered) = common::spawn_short_body_upstream(Duration::ZERO).await;
    let upstream = votebridge::HttpUpstream::new(Duration::from_secs(5)).unwrap();
    let relay = VoteRelay::new(std::sync::Arc::new(upstream), base, API_KEY);

    let outcome = relay.relay(&VoteItem::new("P1", "O1")).await;

    let RelayOutcome::Success { strategy_index, body } = outcome else {
        panic!("expected success, got {:?}", outcome);
    };
    assert_eq!(strategy_index, 0);
    assert!(body["raw"].is_string());
    assert_eq!(answered.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stalled_success_body_does_not_trigger_another_strategy() {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    let (base, answered) = common::spawn_short_body_upstream(Duration::from_secs(3)).await;
    let upstream = votebridge::HttpUpstream::new(Duration::from_millis(300)).unwrap();
    let relay = VoteRelay::new(std::sync::Arc::new(upstream), base, API_KEY);

    let outcome = relay.relay(&VoteItem::new("P1", "O1")).await;

    assert!(outcome.is_success(), "expected success, got {:?}", outcome);
    assert_eq!(answered.load(Ordering::SeqCst), 1);
}
