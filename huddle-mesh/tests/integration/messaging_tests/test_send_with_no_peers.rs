use crate::utils::join_test_room;
use huddle_core::MessageOrigin;

#[tokio::test(start_paused = true)]
async fn send_without_connected_peers_produces_no_echo_and_no_wire_traffic() {
    let mesh = join_test_room(Vec::new()).await;

    let sent = mesh.handle.send_message("hi").await.unwrap();

    assert_eq!(sent, 0);
    let log = mesh.handle.log_snapshot().await.unwrap();
    assert!(log.iter().all(|m| m.origin != MessageOrigin::Own));
    assert!(
        log.iter()
            .any(|m| m.origin == MessageOrigin::System && m.content.contains("not sent"))
    );
    assert!(mesh.signaling.sent().is_empty());
}
