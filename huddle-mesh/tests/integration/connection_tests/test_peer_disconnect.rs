use crate::utils::{connect_peer, join_test_room, wait_until};
use huddle_core::{MessageOrigin, PeerId};
use huddle_mesh::LinkEvent;

#[tokio::test(start_paused = true)]
async fn link_loss_removes_the_session() {
    let p1 = PeerId::new();
    let mesh = join_test_room(vec![p1]).await;
    assert!(wait_until(|| mesh.signaling.offers_to(p1) == 1).await);
    connect_peer(&mesh, p1).await;

    mesh.connector.emit(p1, LinkEvent::Disconnected(p1)).await;

    let status = mesh.handle.status();
    assert!(wait_until(|| status.borrow().peers.is_empty()).await);
    assert_eq!(status.borrow().summary, "Disconnected");
    assert!(mesh.connector.link(p1).unwrap().is_closed());

    let log = mesh.handle.log_snapshot().await.unwrap();
    assert!(
        log.iter()
            .any(|m| m.origin == MessageOrigin::System && m.content.contains("link lost"))
    );
}

#[tokio::test(start_paused = true)]
async fn disconnect_of_one_peer_leaves_the_rest_connected() {
    let p1 = PeerId::new();
    let p2 = PeerId::new();
    let mesh = join_test_room(vec![p1, p2]).await;
    assert!(wait_until(|| mesh.signaling.offers_to(p2) == 1).await);
    connect_peer(&mesh, p1).await;
    connect_peer(&mesh, p2).await;

    mesh.connector.emit(p1, LinkEvent::Disconnected(p1)).await;

    let status = mesh.handle.status();
    assert!(wait_until(|| status.borrow().connected_peers == 1).await);
    assert!(
        status
            .borrow()
            .peers
            .iter()
            .all(|p| p.peer_id == p2)
    );
}
