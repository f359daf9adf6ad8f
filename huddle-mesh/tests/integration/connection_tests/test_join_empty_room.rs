use crate::utils::{join_test_room, wait_until};
use huddle_core::MessageOrigin;

#[tokio::test(start_paused = true)]
async fn joining_an_empty_room_yields_zero_sessions() {
    let mesh = join_test_room(Vec::new()).await;

    let status = mesh.handle.status();
    assert!(wait_until(|| status.borrow().summary == "Disconnected").await);
    assert_eq!(status.borrow().connected_peers, 0);
    assert!(status.borrow().peers.is_empty());
    assert_eq!(mesh.signaling.join_calls(), 1);
    assert_eq!(mesh.connector.connects(), 0);

    let log = mesh.handle.log_snapshot().await.unwrap();
    assert!(
        log.iter()
            .any(|m| m.origin == MessageOrigin::System && m.content.contains("joined room"))
    );
}

#[tokio::test(start_paused = true)]
async fn room_code_is_case_normalized_on_join() {
    let mesh = join_test_room(Vec::new()).await;
    assert_eq!(mesh.handle.membership().room.as_str(), "ABC123");
}
