//! Integration Tests for Time Travel
//!
//! Forward runs, checkpoint rewinds and cycle arithmetic against the
//! in-memory engine's checkpoint store.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::time::Duration;

use test_utils::{spawn_mock_engine, start_session, test_config, MockEngineConfig};
use ucli_driver::Session;

fn without_auto_checkpoints() -> MockEngineConfig {
    MockEngineConfig {
        auto_checkpoint: false,
        ..MockEngineConfig::default()
    }
}

#[tokio::test]
async fn test_one_cycle_forward() {
    let (session, engine) = start_session(MockEngineConfig::default()).await;
    let skip = engine.command_count();

    let outcome = session.clock_cycle(1).await;
    assert!(outcome.success, "{}", outcome.diagnostic);
    assert_eq!(
        engine.commands_since(skip),
        vec!["senv time", "run -relative 20000ps"]
    );
    assert_eq!(session.get_clock().await, Some(1));
}

#[tokio::test]
async fn test_moving_to_current_time_is_a_no_op() {
    let (session, engine) = start_session(MockEngineConfig::default()).await;
    session.clock_cycle(2).await;

    let now = session.get_time().await.unwrap();
    let skip = engine.command_count();
    let outcome = session.set_time(now as i64, false).await;

    assert!(outcome.success);
    assert_eq!(engine.commands_since(skip), vec!["senv time"]);
    assert_eq!(engine.time_ps(), 40_000);
}

#[tokio::test]
async fn test_absolute_forward_move() {
    let (session, engine) = start_session(MockEngineConfig::default()).await;
    let skip = engine.command_count();

    let outcome = session.set_time(35_000, false).await;
    assert!(outcome.success);
    assert_eq!(
        engine.commands_since(skip),
        vec!["senv time", "run -relative 35000ps"]
    );
    assert_eq!(session.get_time().await, Some(35_000));
    assert_eq!(session.get_clock().await, Some(1));
}

#[tokio::test]
async fn test_rewind_uses_latest_earlier_checkpoint() {
    let (session, engine) = start_session(MockEngineConfig::default()).await;

    assert!(session.clock_cycle(1).await.success);
    assert!(session.clock_cycle(2).await.success);
    assert!(session.clock_cycle(1).await.success);
    assert_eq!(session.get_clock().await, Some(4));
    assert_eq!(engine.checkpoints(), vec![(1, 0), (2, 20_000), (3, 60_000)]);

    let skip = engine.command_count();
    let outcome = session.clock_cycle(-1).await;
    assert!(outcome.success, "{}", outcome.diagnostic);
    assert_eq!(
        engine.commands_since(skip),
        vec![
            "senv time",
            "checkpoint -list",
            "checkpoint -join 2",
            "run -relative 40000ps",
        ]
    );
    assert!(outcome.diagnostic.contains("Joined checkpoint 2"));
    assert_eq!(session.get_clock().await, Some(3));
}

#[tokio::test]
async fn test_forward_then_back_returns_to_start() {
    let (session, engine) = start_session(without_auto_checkpoints()).await;

    assert!(session.clock_cycle(5).await.success);
    assert_eq!(session.get_time().await, Some(100_000));

    let skip = engine.command_count();
    assert!(session.clock_cycle(-5).await.success);
    // nothing lies strictly before time zero, so the start checkpoint is used
    assert_eq!(
        engine.commands_since(skip),
        vec!["senv time", "checkpoint -list", "checkpoint -join 1"]
    );
    assert_eq!(session.get_time().await, Some(0));
}

#[tokio::test]
async fn test_partial_rewind_without_intermediate_checkpoints() {
    let (session, engine) = start_session(without_auto_checkpoints()).await;
    session.clock_cycle(5).await;

    let skip = engine.command_count();
    assert!(session.clock_cycle(-2).await.success);
    assert_eq!(
        engine.commands_since(skip),
        vec![
            "senv time",
            "checkpoint -list",
            "checkpoint -join 1",
            "run -relative 60000ps",
        ]
    );
    assert_eq!(session.get_clock().await, Some(3));
}

#[tokio::test]
async fn test_forward_then_back_with_auto_checkpoints() {
    let (session, _engine) = start_session(MockEngineConfig::default()).await;

    for n in 1..=3 {
        assert!(session.clock_cycle(n).await.success);
        assert!(session.clock_cycle(-n).await.success);
        assert_eq!(session.get_time().await, Some(0));
    }
}

#[tokio::test]
async fn test_tied_checkpoints_use_first_listed() {
    let (session, engine) = start_session(without_auto_checkpoints()).await;
    engine.insert_checkpoint(5, 40_000);
    engine.insert_checkpoint(6, 40_000);
    session.set_time(100_000, false).await;

    let skip = engine.command_count();
    assert!(session.set_time(50_000, false).await.success);
    assert_eq!(
        engine.commands_since(skip),
        vec![
            "senv time",
            "checkpoint -list",
            "checkpoint -join 5",
            "run -relative 10000ps",
        ]
    );
    assert_eq!(engine.time_ps(), 50_000);
}

#[tokio::test]
async fn test_negative_targets_fail_without_moving() {
    let (session, engine) = start_session(MockEngineConfig::default()).await;
    session.clock_cycle(1).await;

    let skip = engine.command_count();
    let absolute = session.set_time(-1, false).await;
    let relative = session.set_time(-50_000, true).await;
    let cycles = session.clock_cycle(-2).await;

    for outcome in [&absolute, &relative, &cycles] {
        assert!(!outcome.success);
        assert!(outcome.diagnostic.contains("negative"), "{}", outcome.diagnostic);
    }
    assert_eq!(
        engine.commands_since(skip),
        vec!["senv time", "senv time", "senv time"]
    );
    assert_eq!(engine.time_ps(), 20_000);
}

#[tokio::test]
async fn test_time_targets_with_units() {
    let (session, engine) = start_session(MockEngineConfig::default()).await;

    assert!(session.set_time_str("20 ns", false).await.success);
    assert_eq!(engine.time_ps(), 20_000);

    assert!(session.set_time_str("-10ns", true).await.success);
    assert_eq!(engine.time_ps(), 10_000);

    let skip = engine.command_count();
    let outcome = session.set_time_str("ten", false).await;
    assert!(!outcome.success);
    assert!(outcome.diagnostic.contains("ten"));
    assert!(engine.commands_since(skip).is_empty());
}

#[tokio::test]
async fn test_time_comes_from_engine_report() {
    let engine = MockEngineConfig {
        time_report: Some("10000 ps".to_string()),
        ..MockEngineConfig::default()
    };
    let (session, _engine) = start_session(engine).await;
    assert_eq!(session.get_time().await, Some(10_000));
    assert_eq!(session.get_clock().await, Some(0));
}

#[tokio::test]
async fn test_time_unknown_after_engine_exit() {
    let (session, engine) = start_session(MockEngineConfig::default()).await;
    engine.kill();
    let mut state = session.subscribe_state();
    let _ = state.wait_for(|s| s.is_terminal()).await.map(|_| ());

    assert_eq!(session.get_time().await, None);
    assert_eq!(session.get_clock().await, None);
    let outcome = session.clock_cycle(1).await;
    assert!(!outcome.success);
}

#[tokio::test]
async fn test_slow_replies_outlast_read_timeout() {
    let (transport, _engine) = spawn_mock_engine(MockEngineConfig {
        response_delay: Some(Duration::from_millis(150)),
        ..MockEngineConfig::default()
    });
    let mut config = test_config();
    config.session.read_timeout_ms = 100;
    let session = Session::start(transport, config).await.unwrap();

    assert_eq!(session.get_time().await, Some(0));
    let outcome = session.clock_cycle(1).await;
    assert!(outcome.success, "{}", outcome.diagnostic);
    assert_eq!(session.get_clock().await, Some(1));

    let rewound = session.clock_cycle(-1).await;
    assert!(rewound.success, "{}", rewound.diagnostic);
    assert_eq!(session.get_time().await, Some(0));

    assert_eq!(session.get_var("reset").await, "0x0");
    assert!(!session.list_vars().await.is_empty());
}
