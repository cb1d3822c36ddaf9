mod common;

use common::*;
use layerkit::cascade::CascadeEngine;
use layerkit::prelude::*;

fn engine(map: &std::sync::Arc<EntityMap>) -> CascadeEngine {
    CascadeEngine::new(map.clone())
}

#[tokio::test]
async fn cascade_stamps_every_reachable_dependent() {
    let (store, map) = store();
    seed_catalog(&store).await;

    let mut session = WorkSession::new(store.clone(), map.clone());
    let root = EntityKey::new("category", "electronics");
    engine(&map)
        .soft_delete(&mut session, &root, None, &CancelToken::new())
        .await
        .unwrap();
    session.save_changes().await.unwrap();

    for (entity_type, id) in [
        ("category", "electronics"),
        ("category", "phones"),
        ("category", "laptops"),
        ("product", "p1"),
        ("product", "p2"),
        ("product_detail", "d1"),
    ] {
        let key = EntityKey::new(entity_type, id);
        assert!(
            deleted_at_of(&store, &key).await.is_some(),
            "{key} should have been soft-deleted"
        );
    }
}

#[tokio::test]
async fn cascade_shares_one_deletion_instant() {
    let (store, map) = store();
    seed_catalog(&store).await;

    let mut session = WorkSession::new(store.clone(), map.clone());
    let root = EntityKey::new("category", "electronics");
    engine(&map)
        .soft_delete(&mut session, &root, None, &CancelToken::new())
        .await
        .unwrap();
    session.save_changes().await.unwrap();

    let root_stamp = deleted_at_of(&store, &root).await.unwrap();
    for (entity_type, id) in [
        ("category", "phones"),
        ("product", "p1"),
        ("product_detail", "d1"),
    ] {
        let stamp = deleted_at_of(&store, &EntityKey::new(entity_type, id))
            .await
            .unwrap();
        assert_eq!(stamp, root_stamp);
    }
}

#[tokio::test]
async fn cascade_skips_restrict_owned_and_non_deletion_aware_targets() {
    let (store, map) = store();
    seed_catalog(&store).await;

    let mut session = WorkSession::new(store.clone(), map.clone());
    let root = EntityKey::new("category", "electronics");
    engine(&map)
        .soft_delete(&mut session, &root, None, &CancelToken::new())
        .await
        .unwrap();
    session.save_changes().await.unwrap();

    // Restrict relation target stays live.
    assert!(deleted_at_of(&store, &EntityKey::new("audit_log", "a1"))
        .await
        .is_none());
    // Non-deletion-aware target never even resolved.
    assert!(deleted_at_of(&store, &EntityKey::new("tag", "t1"))
        .await
        .is_none());
}

#[tokio::test]
async fn dependent_one_to_one_is_cascaded_despite_no_action_policy() {
    let (store, map) = store();
    seed_catalog(&store).await;

    let mut session = WorkSession::new(store.clone(), map.clone());
    let root = EntityKey::new("product", "p1");
    engine(&map)
        .soft_delete(&mut session, &root, None, &CancelToken::new())
        .await
        .unwrap();
    session.save_changes().await.unwrap();

    assert!(deleted_at_of(&store, &EntityKey::new("product_detail", "d1"))
        .await
        .is_some());
    // Siblings under the same category are untouched.
    assert!(deleted_at_of(&store, &EntityKey::new("product", "p2"))
        .await
        .is_none());
}

#[tokio::test]
async fn cascade_is_idempotent() {
    let (store, map) = store();
    seed_catalog(&store).await;
    let root = EntityKey::new("category", "phones");
    let engine = engine(&map);

    let mut session = WorkSession::new(store.clone(), map.clone());
    engine
        .soft_delete(&mut session, &root, None, &CancelToken::new())
        .await
        .unwrap();
    session.save_changes().await.unwrap();
    let first_stamp = deleted_at_of(&store, &root).await.unwrap();

    // Second delete is a no-op: nothing staged, stamp unchanged.
    let mut session = WorkSession::new(store.clone(), map.clone());
    engine
        .soft_delete(&mut session, &root, None, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(session.pending_changes(), 0);
    session.save_changes().await.unwrap();
    assert_eq!(deleted_at_of(&store, &root).await.unwrap(), first_stamp);
}

#[tokio::test]
async fn cyclic_graph_terminates() {
    let (store, map) = store();
    store
        .insert_many(vec![
            Box::new(Profile::new("alice", Some("bob"))),
            Box::new(Profile::new("bob", Some("alice"))),
        ])
        .await
        .unwrap();

    let mut session = WorkSession::new(store.clone(), map.clone());
    let root = EntityKey::new("profile", "alice");
    engine(&map)
        .soft_delete(&mut session, &root, None, &CancelToken::new())
        .await
        .unwrap();
    session.save_changes().await.unwrap();

    let a = deleted_at_of(&store, &EntityKey::new("profile", "alice")).await;
    let b = deleted_at_of(&store, &EntityKey::new("profile", "bob")).await;
    assert!(a.is_some());
    assert_eq!(a, b);
}

#[tokio::test]
async fn dangling_relation_key_is_not_an_error() {
    let (store, map) = store();
    store
        .insert(Box::new(Profile::new("loner", Some("ghost"))))
        .await
        .unwrap();

    let mut session = WorkSession::new(store.clone(), map.clone());
    let root = EntityKey::new("profile", "loner");
    engine(&map)
        .soft_delete(&mut session, &root, None, &CancelToken::new())
        .await
        .unwrap();
    session.save_changes().await.unwrap();

    assert!(deleted_at_of(&store, &root).await.is_some());
}

#[tokio::test]
async fn cancelled_token_aborts_the_walk() {
    let (store, map) = store();
    seed_catalog(&store).await;

    let cancel = CancelToken::new();
    cancel.cancel();

    let mut session = WorkSession::new(store.clone(), map.clone());
    let root = EntityKey::new("category", "electronics");
    let err = engine(&map)
        .soft_delete(&mut session, &root, None, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Cancelled));
    assert_eq!(session.pending_changes(), 0);
}
