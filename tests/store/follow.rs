use kkultip_sync::{FollowBoard, FollowTarget, GatewayOp, InMemoryGateway, Outcome, StoreError};

use crate::support::{transport_down, GatedGateway};

const ME: i64 = 1;

fn target(user_no: i64, is_following: bool) -> FollowTarget {
    FollowTarget {
        user_no,
        nickname: format!("user{}", user_no),
        profile_image_url: String::new(),
        login_id: format!("login{}", user_no),
        is_following,
    }
}

async fn board() -> (FollowBoard<GatedGateway<FollowTarget>>, GatedGateway<FollowTarget>) {
    let server = InMemoryGateway::new();
    server.seed(ME, target(2, false));
    server.seed(ME, target(3, true));
    let gateway = GatedGateway::new(server);
    let board = FollowBoard::new(ME, gateway.clone());
    board.set_following_count(1);
    gateway.open(1);
    board.load(ME, false).await;
    (board, gateway)
}

#[tokio::test]
async fn toggle_follows_and_bumps_count() {
    let (board, gateway) = board().await;
    gateway.open(2);

    assert_eq!(board.toggle(2).await, Ok(Outcome::Applied));
    assert!(board.store().get(&2).unwrap().is_following);
    assert_eq!(board.following_count(), 2);

    assert_eq!(board.toggle(3).await, Ok(Outcome::Applied));
    assert!(!board.store().get(&3).unwrap().is_following);
    assert_eq!(board.following_count(), 1);
}

#[tokio::test]
async fn failed_toggle_restores_flag_and_count() {
    let (board, gateway) = board().await;
    gateway.server().fail_next(GatewayOp::Update, transport_down());

    let (result, ()) = tokio::join!(board.toggle(3), async {
        gateway.parked(1).await;
        assert_eq!(board.following_count(), 0);
        assert!(!board.store().get(&3).unwrap().is_following);
        gateway.open(1);
    });

    assert_eq!(result.unwrap_err().user_message(), "팔로우 처리 실패");
    assert!(board.store().get(&3).unwrap().is_following);
    assert_eq!(board.following_count(), 1);
    assert_eq!(board.store().error().as_deref(), Some("팔로우 처리 실패"));
}

#[tokio::test]
async fn double_click_sends_one_request() {
    let (board, gateway) = board().await;

    let (first, ()) = tokio::join!(board.toggle(2), async {
        gateway.parked(1).await;
        assert_eq!(board.toggle(2).await, Ok(Outcome::Skipped));
        gateway.open(1);
    });

    assert_eq!(first, Ok(Outcome::Applied));
    assert_eq!(gateway.server().calls(GatewayOp::Update), 1);
    assert_eq!(board.following_count(), 2);
    assert!(board.store().get(&2).unwrap().is_following);
}

#[tokio::test]
async fn cannot_follow_self_or_unknown_users() {
    let (board, gateway) = board().await;

    assert_eq!(board.toggle(ME).await, Err(StoreError::SelfTarget));
    assert!(matches!(
        board.toggle(99).await,
        Err(StoreError::NotFound { kind: "follow", .. })
    ));
    assert_eq!(gateway.server().calls(GatewayOp::Update), 0);
    assert_eq!(board.following_count(), 1);
}
