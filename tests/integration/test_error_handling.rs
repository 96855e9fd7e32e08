//! Integration Tests for Error Handling
//!
//! Engine termination mid-session, timeouts, and shutdown racing with
//! blocked readers.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::time::{Duration, Instant};

use test_utils::{spawn_mock_engine, start_session, test_config, MockEngineConfig};
use ucli_driver::{handle_startup_error, Error, ErrorKind, ReadMode, Session, SessionState};

fn hanging_on(command: &str) -> MockEngineConfig {
    MockEngineConfig {
        hang_on: Some(command.to_string()),
        ..MockEngineConfig::default()
    }
}

async fn wait_terminal(session: &Session) {
    let mut state = session.subscribe_state();
    let _ = state.wait_for(|s| s.is_terminal()).await.map(|_| ());
}

#[tokio::test]
async fn test_engine_exit_unblocks_reader() {
    let (session, engine) = start_session(hanging_on("get slow")).await;
    let controller = session.controller().clone();

    session.run("get slow");
    let reader = tokio::spawn(async move {
        let started = Instant::now();
        let lines = controller.read("get slow", ReadMode::WAIT).await;
        (lines, started.elapsed())
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    engine.kill();

    let (lines, elapsed) = reader.await.unwrap();
    assert!(lines.is_empty());
    // well inside the 2 s read timeout
    assert!(elapsed < Duration::from_millis(1_000), "{:?}", elapsed);
}

#[tokio::test]
async fn test_operations_after_engine_exit() {
    let (session, engine) = start_session(MockEngineConfig::default()).await;
    engine.kill();
    wait_terminal(&session).await;

    assert_eq!(session.state(), SessionState::Stopped);
    assert!(session.controller().is_terminated());

    let before = engine.command_count();
    session.run("senv time");
    assert!(session.read("senv time", ReadMode::WAIT).await.is_empty());
    assert!(matches!(
        session.execute("senv time").await,
        Err(Error::SessionClosed)
    ));
    assert!(session.wait_idle().await.is_err());
    assert_eq!(engine.command_count(), before);

    assert!(session.step_next().await.is_empty());
    assert!(session.drivers("reset").await.is_empty());
    assert_eq!(session.get_var("reset").await, "");
}

#[tokio::test]
async fn test_engine_crash_during_command() {
    let engine = MockEngineConfig {
        crash_on: Some("get boom".to_string()),
        ..MockEngineConfig::default()
    };
    let (session, _engine) = start_session(engine).await;

    let result = session.execute("get boom").await;
    assert!(matches!(result, Err(Error::SessionClosed)));
    wait_terminal(&session).await;
    assert_eq!(session.state(), SessionState::Stopped);
}

#[tokio::test]
async fn test_queued_commands_dropped_on_exit() {
    let engine = MockEngineConfig {
        crash_on: Some("get boom".to_string()),
        ..MockEngineConfig::default()
    };
    let (session, _engine) = start_session(engine).await;

    let (boom, after) = tokio::join!(session.execute("get boom"), session.execute("senv time"));
    assert!(matches!(boom, Err(Error::SessionClosed)));
    assert!(matches!(after, Err(Error::SessionClosed)));
}

#[tokio::test]
async fn test_close_unblocks_reader() {
    let (session, _engine) = start_session(hanging_on("get slow")).await;
    let controller = session.controller().clone();

    session.run("get slow");
    let reader = tokio::spawn(async move { controller.read("get slow", ReadMode::WAIT).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    let started = Instant::now();
    session.close();

    assert!(reader.await.unwrap().is_empty());
    assert!(started.elapsed() < Duration::from_millis(1_000));
    assert_eq!(session.state(), SessionState::Stopped);
}

#[tokio::test]
async fn test_close_from_another_task() {
    let (session, _engine) = start_session(hanging_on("get slow")).await;
    let closer = session.controller().clone();

    let pending = session.execute("get slow");
    let close = async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        closer.close();
    };
    let (result, ()) = tokio::join!(pending, close);

    assert!(matches!(result, Err(Error::SessionClosed)));
}

#[tokio::test]
async fn test_execute_times_out_on_silent_engine() {
    let (transport, _engine) = spawn_mock_engine(hanging_on("get slow"));
    let mut config = test_config();
    config.session.read_timeout_ms = 200;
    let session = Session::start(transport, config).await.unwrap();

    let err = session.execute("get slow").await.unwrap_err();
    assert!(matches!(err, Error::CommandTimeout { ref command, .. } if command == "get slow"));
    assert_eq!(err.kind(), ErrorKind::Runtime);
    assert!(!err.is_fatal());

    let started = Instant::now();
    assert!(session.read("get slow", ReadMode::WAIT).await.is_empty());
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn test_interrupt_without_process() {
    let (session, _engine) = start_session(MockEngineConfig::default()).await;
    assert!(session.controller().pid().is_none());
    assert!(session.interrupt().is_err());
}

#[test]
fn test_error_kinds() {
    assert_eq!(Error::SessionClosed.kind(), ErrorKind::Runtime);
    assert_eq!(Error::EmptyCommand.kind(), ErrorKind::Launch);
    assert_eq!(Error::ClockNotFound { candidates: 0 }.kind(), ErrorKind::Protocol);
    assert_eq!(
        Error::InvalidTimeTarget {
            input: "ten".to_string(),
            reason: "not a number".to_string(),
        }
        .kind(),
        ErrorKind::UserInput
    );
    assert!(Error::ProcessExited {
        phase: "initialization".to_string()
    }
    .is_fatal());
}

#[test]
fn test_startup_error_hints() {
    let message = handle_startup_error(&Error::ExecutableNotFound {
        command: "./simv".to_string(),
    });
    assert!(message.contains("./simv"));
    assert!(message.contains("Try:"));

    let message = handle_startup_error(&Error::StartupTimeout {
        phase: "clock discovery".to_string(),
        duration: Duration::from_secs(120),
    });
    assert!(message.contains("clock discovery"));
    assert!(message.contains("startup_timeout_ms"));
}
