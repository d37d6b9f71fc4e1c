// Concurrent mutations against a single room.
//
// Each test fires several operations at the same room from separate tasks
// on a multi-threaded runtime and checks that no committed update is lost
// and that the sequence of committed states is a valid serial order.

use std::sync::Arc;

use futures::{StreamExt, future::join_all};
use mean_party::{
    ErrorKind, GameService, MemoryStore, Options, RoomCode, Status, view,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn service(max_attempts: usize) -> Arc<GameService<MemoryStore>> {
    init_tracing();
    Arc::new(
        GameService::new(
            MemoryStore::new(),
            Options {
                max_attempts,
                retry_backoff_ms: 1,
                ..Options::default()
            },
        )
        .expect("options are valid"),
    )
}

async fn room_with(service: &GameService<MemoryStore>, names: &[String]) -> RoomCode {
    let code = service.create_session(&names[0]).await.unwrap();
    for name in &names[1..] {
        service.join_session(&code, name).await.unwrap();
    }
    code
}

fn names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("Player{i}")).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_simultaneous_submissions_are_both_kept() {
    // Each writer can lose at most one race, so the default budget suffices
    let service = service(Options::default().max_attempts);
    let players = names(3);
    let code = room_with(&service, &players).await;
    service.start_round(&code).await.unwrap();

    let tasks = ["Player0", "Player1"].map(|name| {
        let service = service.clone();
        let code = code.clone();
        tokio::spawn(async move { service.submit_number(&code, name, 42).await })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let session = service.session(&code).await.unwrap();
    let round = session.current_round().unwrap();
    assert_eq!(round.numbers.len(), 2);
    assert!(round.numbers.contains_key("Player0"));
    assert!(round.numbers.contains_key("Player1"));
    assert_eq!(session.status(), Status::Playing);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_full_round_of_concurrent_submissions_resolves_once() {
    let count = 8;
    // Every other writer commits at most once, bounding the losses per writer
    let service = service(count + 2);
    let players = names(count);
    let code = room_with(&service, &players).await;
    service.start_round(&code).await.unwrap();

    let updates = service.subscribe_session(&code).await.unwrap();

    let tasks = players.iter().enumerate().map(|(i, name)| {
        let service = service.clone();
        let code = code.clone();
        let name = name.clone();
        tokio::spawn(async move { service.submit_number(&code, &name, (i as i64 + 1) * 10).await })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let session = service.session(&code).await.unwrap();
    let round = session.current_round().unwrap();
    assert_eq!(round.numbers.len(), count);
    // numbers 10..=80, mean 45, Player3 (40) and Player4 (50) tie, Player3 joined first
    assert_eq!(round.mean, Some(45.0));
    assert_eq!(round.winner.as_deref(), Some("Player3"));
    let decremented = session.players().iter().filter(|p| p.points == 4).count();
    assert_eq!(decremented, count - 1);

    // The initial state plus one commit per submission, each adding exactly one number
    let history: Vec<_> = updates.take(count + 1).collect().await;
    for (expected, state) in history.iter().enumerate() {
        assert_eq!(view::submission_count(state), expected);
    }
    let resolved: Vec<_> = history
        .iter()
        .filter(|state| state.current_round().is_some_and(|r| r.is_closed()))
        .collect();
    assert_eq!(resolved.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_are_all_admitted() {
    let count = 10;
    let service = service(count + 2);
    let code = service.create_session("Host").await.unwrap();

    let tasks = names(count).into_iter().map(|name| {
        let service = service.clone();
        let code = code.clone();
        tokio::spawn(async move { service.join_session(&code, &name).await })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let session = service.session(&code).await.unwrap();
    assert_eq!(session.players().len(), count + 1);
    assert_eq!(session.players().iter().filter(|p| p.is_host).count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_duplicate_names_admit_exactly_one() {
    let service = service(10);
    let code = service.create_session("Host").await.unwrap();

    let tasks = (0..5).map(|_| {
        let service = service.clone();
        let code = code.clone();
        tokio::spawn(async move { service.join_session(&code, "Twin").await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|result| result.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind() == ErrorKind::NameTaken)
    );
    let session = service.session(&code).await.unwrap();
    assert_eq!(session.players().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_next_round_clicks_start_one_round() {
    let service = service(10);
    let players = names(2);
    let code = room_with(&service, &players).await;
    service.start_round(&code).await.unwrap();
    service.submit_number(&code, "Player0", 30).await.unwrap();
    service.submit_number(&code, "Player1", 70).await.unwrap();

    let tasks = (0..4).map(|_| {
        let service = service.clone();
        let code = code.clone();
        tokio::spawn(async move { service.start_round(&code).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|result| result.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| e.kind() == ErrorKind::RoundInProgress)
    );
    assert_eq!(service.session(&code).await.unwrap().round_number(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_player_double_submit_keeps_first_commit() {
    let service = service(10);
    let players = names(3);
    let code = room_with(&service, &players).await;
    service.start_round(&code).await.unwrap();

    let tasks = [11, 99].map(|number| {
        let service = service.clone();
        let code = code.clone();
        tokio::spawn(async move { service.submit_number(&code, "Player0", number).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|result| result.unwrap())
        .collect();

    let accepted: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(accepted.len(), 1);
    let rejected = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(rejected.kind(), ErrorKind::AlreadySubmitted);

    let session = service.session(&code).await.unwrap();
    let stored = session.current_round().unwrap().numbers["Player0"];
    let committed = accepted[0].as_ref().unwrap().current_round().unwrap().numbers["Player0"];
    assert_eq!(stored, committed);
}
