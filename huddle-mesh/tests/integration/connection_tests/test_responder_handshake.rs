use crate::utils::{connect_peer, join_test_room, wait_until};
use huddle_core::{IncomingOffer, PeerId, PollResponse};
use huddle_mesh::SessionState;

#[tokio::test(start_paused = true)]
async fn inbound_offer_creates_a_responder_session_and_answers() {
    let mesh = join_test_room(Vec::new()).await;
    let p2 = PeerId::new();

    mesh.signaling.push_poll(PollResponse {
        offer: Some(IncomingOffer {
            from: p2,
            offer: "remote-offer".to_string(),
        }),
        ..Default::default()
    });

    // Responder role: the offer is applied, then our answer goes out.
    assert!(wait_until(|| mesh.signaling.answers_to(p2) == 1).await);
    let link = mesh.connector.link(p2).expect("no link for p2");
    assert_eq!(*link.offers_accepted.lock().unwrap(), vec!["remote-offer"]);
    assert_eq!(*link.offers_created.lock().unwrap(), 0);
    assert_eq!(mesh.signaling.offers_to(p2), 0);

    let status = mesh.handle.status();
    assert!(
        status
            .borrow()
            .peers
            .iter()
            .any(|p| p.peer_id == p2 && p.state == SessionState::AnsweringSent)
    );

    connect_peer(&mesh, p2).await;
    assert_eq!(status.borrow().connected_peers, 1);
}
