use chrono::{Duration, TimeZone, Utc};
use hub_auth::config::StoreConfig;
use hub_auth::store::{FileTokenStore, MemoryTokenStore, TokenStore};
use hub_auth::Token;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn sample_token() -> Token {
    let obtained = Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap();
    let mut token = Token::new("access-1", obtained + Duration::hours(1))
        .with_refresh_token("refresh-1")
        .with_id_token("id-1");
    token.scope = Some("openid profile".to_string());
    token.obtained_at = obtained;
    token
}

fn assert_store_contract(store: &dyn TokenStore) {
    assert!(store.retrieve().expect("empty retrieve").is_none());
    store.delete().expect("delete on empty store succeeds");

    let first = sample_token();
    store.store(&first).expect("store");
    assert_eq!(store.retrieve().expect("retrieve"), Some(first));

    let mut second = sample_token();
    second.access_token = "access-2".to_string();
    second.refresh_token = None;
    store.store(&second).expect("overwrite");
    assert_eq!(store.retrieve().expect("retrieve"), Some(second));

    store.delete().expect("delete");
    assert!(store.retrieve().expect("retrieve after delete").is_none());
}

#[test]
fn memory_store_honors_contract() {
    assert_store_contract(&MemoryTokenStore::new());
}

#[test]
fn file_store_honors_contract() {
    let dir = TempDir::new().expect("tempdir");
    assert_store_contract(&FileTokenStore::new(dir.path(), StoreConfig::default()));
}

#[test]
fn file_store_survives_reopen() {
    let dir = TempDir::new().expect("tempdir");
    let token = sample_token();
    FileTokenStore::new(dir.path(), StoreConfig::default())
        .store(&token)
        .expect("store");

    let reopened = FileTokenStore::new(dir.path(), StoreConfig::default());
    assert_eq!(reopened.retrieve().expect("retrieve"), Some(token));
}

#[test]
fn file_stores_with_different_accounts_are_isolated() {
    let dir = TempDir::new().expect("tempdir");
    let work = FileTokenStore::new(dir.path(), StoreConfig::new("hub-auth", "work"));
    let home = FileTokenStore::new(dir.path(), StoreConfig::new("hub-auth", "home"));

    work.store(&sample_token()).expect("store");
    assert!(home.retrieve().expect("retrieve").is_none());
    assert_ne!(work.path(), home.path());
}

#[cfg(feature = "keyring")]
#[test]
fn keyring_store_honors_contract() {
    keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
    let store = hub_auth::store::KeyringTokenStore::new(StoreConfig::new("hub-auth-test", "contract"))
        .expect("keyring entry");
    assert_store_contract(&store);
}
