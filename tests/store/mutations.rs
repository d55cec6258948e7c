use std::sync::Arc;

use kkultip_sync::{
    EntityId, GatewayOp, InMemoryGateway, Outcome, PlaceholderIds, Storage, StorageDraft,
    StorageStore, StoreError, StoreOp,
};

use crate::support::{rejected, transport_down, GatedGateway};

const OWNER: i64 = 7;

fn storage(id: i64, name: &str) -> Storage {
    Storage {
        storage_no: id,
        name: name.into(),
    }
}

async fn loaded(items: &[Storage]) -> (StorageStore<GatedGateway<Storage>>, GatedGateway<Storage>) {
    let server = InMemoryGateway::new().acting_as(OWNER).ids_from(100);
    for item in items {
        server.seed(OWNER, item.clone());
    }
    let gateway = GatedGateway::new(server);
    let store = StorageStore::new(gateway.clone());
    gateway.open(1);
    store.load(OWNER, false).await;
    assert_eq!(store.items(), items);
    (store, gateway)
}

#[tokio::test]
async fn rename_is_visible_in_flight_and_rolled_back_on_rejection() {
    let (store, gateway) = loaded(&[storage(1, "A")]).await;
    gateway.server().fail_next(GatewayOp::Update, transport_down());

    let (result, ()) = tokio::join!(store.rename(1, "B"), async {
        gateway.parked(1).await;
        assert_eq!(store.items(), vec![storage(1, "B")]);
        assert!(store.is_busy(&1));
        gateway.open(1);
    });

    match result {
        Err(StoreError::Gateway { op, message, source }) => {
            assert_eq!(op, StoreOp::Update);
            assert_eq!(message, "이름 변경 실패");
            assert_eq!(source, transport_down());
        }
        other => panic!("expected gateway error, got {:?}", other),
    }
    assert_eq!(store.items(), vec![storage(1, "A")]);
    assert_eq!(store.error().as_deref(), Some("이름 변경 실패"));
    assert!(!store.is_busy(&1));
}

#[tokio::test]
async fn server_message_wins_over_fallback() {
    let (store, gateway) = loaded(&[storage(1, "A")]).await;
    gateway
        .server()
        .fail_next(GatewayOp::Update, rejected(409, "이미 사용 중인 이름입니다."));
    gateway.open(1);

    let err = store.rename(1, "B").await.unwrap_err();
    assert_eq!(err.user_message(), "이미 사용 중인 이름입니다.");
    assert_eq!(store.error().as_deref(), Some("이미 사용 중인 이름입니다."));
}

#[tokio::test]
async fn rename_trims_and_skips_blank_names() {
    let (store, gateway) = loaded(&[storage(1, "A")]).await;
    gateway.open(1);

    assert_eq!(store.rename(1, "   ").await, Ok(Outcome::Skipped));
    assert_eq!(gateway.server().calls(GatewayOp::Update), 0);

    assert_eq!(store.rename(1, "  Home ").await, Ok(Outcome::Applied));
    assert_eq!(store.items(), vec![storage(1, "Home")]);
    assert_eq!(gateway.server().records(&OWNER), vec![storage(1, "Home")]);
}

#[tokio::test]
async fn add_swaps_placeholder_for_server_id() {
    let server = InMemoryGateway::new().acting_as(OWNER).ids_from(42);
    let gateway = GatedGateway::new(server);
    let store = StorageStore::new(gateway.clone());

    let (created, ()) = tokio::join!(store.add(StorageDraft::new("Work")), async {
        gateway.parked(1).await;
        let items = store.items();
        assert_eq!(items.len(), 1);
        assert!(items[0].storage_no.is_placeholder());
        assert_eq!(items[0].name, "Work");
        gateway.open(1);
    });

    assert_eq!(created, Ok(storage(42, "Work")));
    assert_eq!(store.items(), vec![storage(42, "Work")]);
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn concurrent_adds_keep_order_and_distinct_ids() {
    let (store, gateway) = loaded(&[storage(1, "A"), storage(2, "B")]).await;

    let (first, second, ()) = tokio::join!(
        store.add(StorageDraft::new("C")),
        store.add(StorageDraft::new("D")),
        async {
            gateway.parked(2).await;
            let items = store.items();
            assert_eq!(items.len(), 4);
            assert!(items[2].storage_no.is_placeholder());
            assert!(items[3].storage_no.is_placeholder());
            assert_ne!(items[2].storage_no, items[3].storage_no);
            gateway.open(2);
        }
    );

    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(first.storage_no, second.storage_no);
    let names: Vec<_> = store.items().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["A", "B", "C", "D"]);
    assert!(store.items().iter().all(|s| !s.storage_no.is_placeholder()));
}

#[tokio::test]
async fn failed_add_removes_placeholder_and_returns_error() {
    let (store, gateway) = loaded(&[storage(1, "A")]).await;
    gateway.server().fail_next(GatewayOp::Create, transport_down());
    gateway.open(1);

    let err = store.add(StorageDraft::new("Work")).await.unwrap_err();
    assert_eq!(err.user_message(), "보관함 생성 실패");
    assert_eq!(store.items(), vec![storage(1, "A")]);
    assert_eq!(store.error().as_deref(), Some("보관함 생성 실패"));
}

#[tokio::test]
async fn blank_draft_never_reaches_the_gateway() {
    let (store, gateway) = loaded(&[]).await;

    let err = store.add(StorageDraft::new("   ")).await.unwrap_err();
    assert_eq!(err, StoreError::InvalidDraft("보관함 이름이 비어 있습니다.".into()));
    assert_eq!(gateway.server().calls(GatewayOp::Create), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn second_mutation_on_busy_id_is_dropped() {
    let (store, gateway) = loaded(&[storage(1, "A")]).await;

    let (first, ()) = tokio::join!(store.rename(1, "B"), async {
        gateway.parked(1).await;
        assert_eq!(store.rename(1, "C").await, Ok(Outcome::Skipped));
        assert_eq!(store.remove(1).await, Ok(Outcome::Skipped));
        gateway.open(1);
    });

    assert_eq!(first, Ok(Outcome::Applied));
    assert_eq!(gateway.server().calls(GatewayOp::Update), 1);
    assert_eq!(gateway.server().calls(GatewayOp::Delete), 0);
    assert_eq!(store.items(), vec![storage(1, "B")]);
    assert!(!store.is_busy(&1));
}

#[tokio::test]
async fn mutations_on_different_ids_run_together() {
    let (store, gateway) = loaded(&[storage(1, "A"), storage(2, "B")]).await;

    let (a, b, ()) = tokio::join!(store.rename(1, "A2"), store.rename(2, "B2"), async {
        gateway.parked(2).await;
        assert!(store.is_busy(&1) && store.is_busy(&2));
        gateway.open(2);
    });

    assert_eq!((a, b), (Ok(Outcome::Applied), Ok(Outcome::Applied)));
    assert_eq!(store.items(), vec![storage(1, "A2"), storage(2, "B2")]);
}

#[tokio::test]
async fn failed_remove_restores_entity_in_place() {
    let (store, gateway) = loaded(&[storage(1, "A"), storage(2, "B"), storage(3, "C")]).await;
    gateway.server().fail_next(GatewayOp::Delete, transport_down());

    let (result, ()) = tokio::join!(store.remove(2), async {
        gateway.parked(1).await;
        assert_eq!(store.items(), vec![storage(1, "A"), storage(3, "C")]);
        gateway.open(1);
    });

    assert!(matches!(
        result,
        Err(StoreError::Gateway {
            op: StoreOp::Remove,
            ..
        })
    ));
    assert_eq!(
        store.items(),
        vec![storage(1, "A"), storage(2, "B"), storage(3, "C")]
    );
    assert_eq!(store.error().as_deref(), Some("삭제 실패"));
}

#[tokio::test]
async fn remove_deletes_on_server() {
    let (store, gateway) = loaded(&[storage(1, "A"), storage(2, "B")]).await;
    gateway.open(1);

    assert_eq!(store.remove(1).await, Ok(Outcome::Applied));
    assert_eq!(store.items(), vec![storage(2, "B")]);
    assert_eq!(gateway.server().records(&OWNER), vec![storage(2, "B")]);
}

#[tokio::test]
async fn rollback_keeps_concurrent_changes_to_other_entities() {
    let (store, gateway) = loaded(&[storage(1, "A"), storage(2, "B"), storage(3, "C")]).await;
    gateway.server().fail_next(GatewayOp::Update, transport_down());

    let (renamed, removed, ()) = tokio::join!(store.rename(1, "Z"), store.remove(2), async {
        gateway.parked(2).await;
        assert_eq!(store.items(), vec![storage(1, "Z"), storage(3, "C")]);
        gateway.open(2);
    });

    assert!(renamed.is_err());
    assert_eq!(removed, Ok(Outcome::Applied));
    assert_eq!(store.items(), vec![storage(1, "A"), storage(3, "C")]);
}

#[tokio::test]
async fn unknown_id_is_not_found_without_a_call() {
    let (store, gateway) = loaded(&[storage(1, "A")]).await;

    let err = store.rename(9, "B").await.unwrap_err();
    assert_eq!(
        err,
        StoreError::NotFound {
            kind: "storage",
            id: "9".into()
        }
    );
    assert!(store.remove(9).await.is_err());
    assert_eq!(gateway.server().calls(GatewayOp::Update), 0);
    assert_eq!(gateway.server().calls(GatewayOp::Delete), 0);
    assert!(!store.is_busy(&9));
}

#[tokio::test]
async fn dropped_mutation_undoes_its_change() {
    let (store, gateway) = loaded(&[storage(1, "A")]).await;

    tokio::select! {
        _ = store.rename(1, "B") => panic!("gate is closed"),
        _ = gateway.parked(1) => {}
    }

    assert_eq!(store.items(), vec![storage(1, "A")]);
    assert!(!store.is_busy(&1));
    assert_eq!(gateway.server().calls(GatewayOp::Update), 0);
}

async fn two_owners() -> (StorageStore<GatedGateway<Storage>>, GatedGateway<Storage>) {
    let server = InMemoryGateway::new().acting_as(OWNER).ids_from(100);
    server.seed(OWNER, storage(1, "A"));
    server.seed(OWNER, storage(2, "B"));
    server.seed(8, storage(3, "C"));
    let gateway = GatedGateway::writes_only(server);
    let store = StorageStore::new(gateway.clone());
    store.load(OWNER, false).await;
    (store, gateway)
}

#[tokio::test]
async fn failed_remove_after_owner_switch_leaves_new_list_alone() {
    let (store, gateway) = two_owners().await;
    gateway.server().fail_next(GatewayOp::Delete, transport_down());

    let (result, ()) = tokio::join!(store.remove(1), async {
        gateway.parked(1).await;
        store.load(8, false).await;
        gateway.open(1);
    });

    assert!(result.is_err());
    assert_eq!(store.owner(), Some(8));
    assert_eq!(store.items(), vec![storage(3, "C")]);
}

#[tokio::test]
async fn add_after_owner_switch_is_not_merged() {
    let (store, gateway) = two_owners().await;

    let (created, ()) = tokio::join!(store.add(StorageDraft::new("Work")), async {
        gateway.parked(1).await;
        store.load(8, false).await;
        gateway.open(1);
    });

    assert_eq!(created, Ok(storage(100, "Work")));
    assert_eq!(store.items(), vec![storage(3, "C")]);
    assert_eq!(gateway.server().records(&8), vec![storage(3, "C")]);
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn failed_rename_after_reset_restores_nothing() {
    let (store, gateway) = two_owners().await;
    gateway.server().fail_next(GatewayOp::Update, transport_down());

    let (result, ()) = tokio::join!(store.rename(1, "Z"), async {
        gateway.parked(1).await;
        store.reset();
        gateway.open(1);
    });

    assert!(result.is_err());
    assert!(store.is_empty());
    assert_eq!(store.owner(), None);
}

#[tokio::test]
async fn placeholders_come_from_the_injected_source() {
    let ids = Arc::new(PlaceholderIds::new());
    let server = InMemoryGateway::new().acting_as(OWNER);
    let gateway = GatedGateway::new(server);
    let store = StorageStore::new(gateway.clone()).with_placeholders(Arc::clone(&ids));

    let (created, ()) = tokio::join!(store.add(StorageDraft::new("Work")), async {
        gateway.parked(1).await;
        assert_eq!(store.items()[0].storage_no, i64::placeholder(0));
        let next: i64 = ids.next();
        assert_eq!(next, i64::placeholder(1));
        gateway.open(1);
    });

    assert_eq!(created, Ok(storage(1, "Work")));
}
