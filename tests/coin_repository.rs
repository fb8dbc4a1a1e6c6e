mod common;

use std::sync::Arc;

use coinvault::{
    AppError,
    models::{AddOutcome, NewCoin, RemoveOutcome},
    repository::CoinRepository,
};

#[tokio::test]
async fn repository_add_and_remove_flow() {
    let (_dir, repo) = common::temp_repo().await;
    let coin = NewCoin::new("USA", "Dime", 1964);

    assert_eq!(repo.add(coin.clone()).await.expect("add should succeed"), AddOutcome::Added);
    for _ in 0..4 {
        assert_eq!(
            repo.add(coin.clone()).await.expect("add should succeed"),
            AddOutcome::Incremented
        );
    }

    let listed = repo.list().await.expect("list should succeed");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].quantity, 5);

    let id = listed[0].id;
    for expected in [4, 3, 2, 1] {
        assert_eq!(
            repo.remove(id).await.expect("remove should succeed"),
            RemoveOutcome::Decremented
        );
        let fetched = repo
            .get_by_id(id)
            .await
            .expect("get should succeed")
            .expect("coin should still exist");
        assert_eq!(fetched.quantity, expected);
    }

    assert_eq!(
        repo.remove(id).await.expect("remove should succeed"),
        RemoveOutcome::Deleted
    );
    assert!(repo.get_by_id(id).await.expect("get should succeed").is_none());

    let err = repo.remove(id).await.expect_err("coin is gone");
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Coin not found"));
}

#[tokio::test]
async fn triples_differing_in_one_field_are_distinct() {
    let (_dir, repo) = common::temp_repo().await;

    for coin in [
        NewCoin::new("USA", "Cent", 1943),
        NewCoin::new("USA", "Cent", 1944),
        NewCoin::new("USA", "Nickel", 1943),
        NewCoin::new("usa", "Cent", 1943),
    ] {
        assert_eq!(repo.add(coin).await.expect("add should succeed"), AddOutcome::Added);
    }

    let listed = repo.list().await.expect("list should succeed");
    assert_eq!(listed.len(), 4);
    assert!(listed.iter().all(|coin| coin.quantity == 1));
}

#[tokio::test]
async fn removing_missing_id_leaves_store_untouched() {
    let (_dir, repo) = common::temp_repo().await;
    repo.add(NewCoin::new("Peru", "Sol", 1991))
        .await
        .expect("add should succeed");
    let before = repo.list().await.expect("list should succeed");

    let err = repo.remove(before[0].id + 1000).await.expect_err("id does not exist");
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(repo.list().await.expect("list should succeed"), before);
}

#[tokio::test]
async fn concurrent_adds_of_new_coin_collapse_into_one_record() {
    let (_dir, repo) = common::temp_repo().await;
    let repo = Arc::new(repo);
    const WRITERS: usize = 16;

    let tasks = (0..WRITERS).map(|_| {
        let repo = Arc::clone(&repo);
        tokio::spawn(async move { repo.add(NewCoin::new("Greece", "Drachma", 1976)).await })
    });

    let outcomes: Vec<AddOutcome> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| {
            joined
                .expect("task should not panic")
                .expect("concurrent add should succeed")
        })
        .collect();

    let added = outcomes.iter().filter(|o| **o == AddOutcome::Added).count();
    assert_eq!(added, 1);

    let listed = repo.list().await.expect("list should succeed");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].quantity, WRITERS as i64);
}

#[tokio::test]
async fn concurrent_removes_never_go_below_zero() {
    let (_dir, repo) = common::temp_repo().await;
    let repo = Arc::new(repo);

    for _ in 0..3 {
        repo.add(NewCoin::new("India", "Rupee", 2011))
            .await
            .expect("add should succeed");
    }
    let id = repo.list().await.expect("list should succeed")[0].id;

    let tasks = (0..6).map(|_| {
        let repo = Arc::clone(&repo);
        tokio::spawn(async move { repo.remove(id).await })
    });

    let mut decremented = 0;
    let mut deleted = 0;
    let mut not_found = 0;
    for joined in futures::future::join_all(tasks).await {
        match joined.expect("task should not panic") {
            Ok(RemoveOutcome::Decremented) => decremented += 1,
            Ok(RemoveOutcome::Deleted) => deleted += 1,
            Err(AppError::NotFound(_)) => not_found += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!((decremented, deleted, not_found), (2, 1, 3));
    assert!(repo.list().await.expect("list should succeed").is_empty());
}
