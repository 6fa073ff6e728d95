use assess_core::model::{Recommendation, RiskScore, ScoreResult};
use storage::{KeyValueStore, SqliteStore, Storage};

async fn memory_store() -> SqliteStore {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
    store.migrate().await.unwrap();
    store
}

#[tokio::test]
async fn kv_set_get_remove_round_trip() {
    let store = memory_store().await;

    assert_eq!(store.get("token").await.unwrap(), None);

    store.set("token", "jwt-abc").await.unwrap();
    assert_eq!(store.get("token").await.unwrap().as_deref(), Some("jwt-abc"));

    store.set("token", "jwt-def").await.unwrap();
    assert_eq!(store.get("token").await.unwrap().as_deref(), Some("jwt-def"));

    store.remove("token").await.unwrap();
    assert_eq!(store.get("token").await.unwrap(), None);

    // Removing an absent key is not an error.
    store.remove("token").await.unwrap();
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let store = memory_store().await;
    store.migrate().await.unwrap();

    store.set("k", "v").await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn result_store_round_trips_over_sqlite() {
    let store = memory_store().await;
    let storage = Storage::new(std::sync::Arc::new(store));

    let result = ScoreResult::new(
        RiskScore::new(72).unwrap(),
        vec![Recommendation::new("Enable MFA").with_note("start with admins")],
        vec!["Cryptographic Failures".to_owned()],
    );

    storage.results.save(&result).await.unwrap();
    assert_eq!(storage.results.load().await.unwrap(), Some(result));

    storage.results.clear().await.unwrap();
    assert_eq!(storage.results.load().await.unwrap(), None);
}
