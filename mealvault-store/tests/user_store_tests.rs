//! User store integration tests: encrypted-field lookup semantics, integrity
//! pre-checks, and key rotation.

use mealvault_crypto::{hash_password, FieldCipher, MasterKey};
use mealvault_store::{Database, StoreError, UserStore};
use mealvault_types::Role;
use std::sync::Arc;

fn store() -> UserStore {
    let cipher = Arc::new(FieldCipher::new(&MasterKey::generate()));
    UserStore::new(Database::open_in_memory().unwrap(), cipher)
}

fn add(store: &UserStore, username: &str, role: Role) -> i64 {
    store
        .insert(username, "phc-hash-placeholder", role, "First", "Last")
        .unwrap()
}

// ── Lookup ───────────────────────────────────────────────────────

#[test]
fn insert_and_find_round_trips() {
    let store = store();
    let id = store
        .insert("alice_w.b", "stored-hash", Role::Consultant, "Alice", "Wright")
        .unwrap();

    let (record, hash) = store.find_by_username_with_hash("alice_w.b").unwrap().unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.username, "alice_w.b");
    assert_eq!(record.role, Role::Consultant);
    assert_eq!(record.first_name, "Alice");
    assert_eq!(record.last_name, "Wright");
    assert_eq!(hash, "stored-hash");
}

#[test]
fn lookup_returns_exactly_the_matching_row() {
    let store = store();
    let names = ["alfa_user", "bravo_user", "charlie_u", "delta_usr"];
    let ids: Vec<i64> = names
        .iter()
        .map(|name| add(&store, name, Role::Consultant))
        .collect();

    for (name, id) in names.iter().zip(&ids) {
        let record = store.find_by_username(name).unwrap().unwrap();
        assert_eq!(record.id, *id);
        assert_eq!(record.username, *name);
    }
}

#[test]
fn unknown_username_is_none_not_an_error() {
    let store = store();
    add(&store, "existing1", Role::Consultant);
    assert!(store.find_by_username("nobody_xx").unwrap().is_none());
    assert!(!store.username_exists("nobody_xx").unwrap());
}

#[test]
fn rows_under_a_foreign_key_are_skipped_not_fatal() {
    // Two stores over the same database but different ciphers: rows written
    // by the first are undecryptable noise to the second.
    let db = Database::open_in_memory().unwrap();
    let store_a = UserStore::new(db.clone(), Arc::new(FieldCipher::new(&MasterKey::generate())));
    let store_b = UserStore::new(db, Arc::new(FieldCipher::new(&MasterKey::generate())));

    store_a
        .insert("alice_w.b", "hash", Role::Consultant, "Alice", "Wright")
        .unwrap();

    assert!(store_b.find_by_username("alice_w.b").unwrap().is_none());
    assert!(store_b.list().unwrap().is_empty());

    // And the scan keeps working past the foreign row for keys it does hold.
    store_b
        .insert("bob_jones", "hash", Role::Consultant, "Bob", "Jones")
        .unwrap();
    assert_eq!(
        store_b.find_by_username("bob_jones").unwrap().unwrap().username,
        "bob_jones"
    );
}

#[test]
fn get_by_id_round_trips() {
    let store = store();
    let id = add(&store, "alice_w.b", Role::SystemAdmin);
    let record = store.get_by_id(id).unwrap().unwrap();
    assert_eq!(record.username, "alice_w.b");
    assert!(store.get_by_id(9999).unwrap().is_none());
}

// ── Integrity Pre-Checks ─────────────────────────────────────────

#[test]
fn duplicate_username_is_rejected_with_no_partial_write() {
    let store = store();
    add(&store, "alice_w.b", Role::Consultant);

    let err = store
        .insert("alice_w.b", "hash2", Role::SystemAdmin, "Other", "Person")
        .unwrap_err();
    assert!(matches!(err, StoreError::Integrity(_)));

    // Still exactly one row with that name, and it kept its original role.
    let record = store.find_by_username("alice_w.b").unwrap().unwrap();
    assert_eq!(record.role, Role::Consultant);
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn second_super_admin_is_rejected() {
    let store = store();
    add(&store, "the_chief", Role::SuperAdmin);

    let err = store
        .insert("usurper_1", "hash", Role::SuperAdmin, "Second", "Chief")
        .unwrap_err();
    assert!(matches!(err, StoreError::Integrity(_)));
    assert_eq!(store.count_role(Role::SuperAdmin).unwrap(), 1);
}

#[test]
fn ensure_super_admin_seeds_once() {
    let store = store();
    let hash = hash_password("Admin_123?").unwrap();

    assert!(store.ensure_super_admin(&hash).unwrap());
    assert!(!store.ensure_super_admin(&hash).unwrap());
    assert_eq!(store.count_role(Role::SuperAdmin).unwrap(), 1);

    let record = store.find_by_username("super_admin").unwrap().unwrap();
    assert_eq!(record.role, Role::SuperAdmin);
    assert_eq!(record.first_name, "Super");
    assert_eq!(record.last_name, "Admin");
}

// ── Mutation ─────────────────────────────────────────────────────

#[test]
fn update_profile_rewrites_the_encrypted_fields() {
    let store = store();
    let id = add(&store, "old_name1", Role::Consultant);

    store.update_profile(id, "new_name1", "New", "Name").unwrap();

    assert!(store.find_by_username("old_name1").unwrap().is_none());
    let record = store.find_by_username("new_name1").unwrap().unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.first_name, "New");
}

#[test]
fn update_password_hash_only_touches_the_hash() {
    let store = store();
    let id = add(&store, "alice_w.b", Role::Consultant);

    store.update_password_hash(id, "fresh-hash").unwrap();
    let (record, hash) = store.find_by_username_with_hash("alice_w.b").unwrap().unwrap();
    assert_eq!(record.id, id);
    assert_eq!(hash, "fresh-hash");
}

#[test]
fn mutations_on_missing_rows_are_not_found() {
    let store = store();
    assert!(matches!(
        store.update_profile(42, "x_name_xx", "X", "Y"),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.update_password_hash(42, "hash"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn delete_by_username_resolves_through_the_scan() {
    let store = store();
    add(&store, "keep_me_1", Role::Consultant);
    add(&store, "drop_me_1", Role::Consultant);

    assert!(store.delete_by_username("drop_me_1").unwrap());
    assert!(!store.delete_by_username("drop_me_1").unwrap());
    assert_eq!(store.list().unwrap().len(), 1);
    assert!(store.find_by_username("keep_me_1").unwrap().is_some());
}

#[test]
fn list_returns_storage_order() {
    let store = store();
    add(&store, "first_one", Role::SystemAdmin);
    add(&store, "second_on", Role::Consultant);

    let listed = store.list().unwrap();
    assert_eq!(
        listed,
        vec![
            ("first_one".to_string(), Role::SystemAdmin),
            ("second_on".to_string(), Role::Consultant),
        ]
    );
}

// ── Key Rotation ─────────────────────────────────────────────────

#[test]
fn re_encrypt_from_moves_rows_to_the_new_key() {
    let db = Database::open_in_memory().unwrap();
    let old_cipher = Arc::new(FieldCipher::new(&MasterKey::generate()));
    let old_store = UserStore::new(db.clone(), Arc::clone(&old_cipher));
    old_store
        .insert("alice_w.b", "hash", Role::Consultant, "Alice", "Wright")
        .unwrap();
    old_store
        .insert("bob_jones", "hash", Role::SystemAdmin, "Bob", "Jones")
        .unwrap();

    let new_store = UserStore::new(db, Arc::new(FieldCipher::new(&MasterKey::generate())));
    assert_eq!(new_store.re_encrypt_from(&old_cipher).unwrap(), 2);

    // Old cipher no longer decrypts anything; the new store sees it all.
    assert!(old_store.find_by_username("alice_w.b").unwrap().is_none());
    let record = new_store.find_by_username("alice_w.b").unwrap().unwrap();
    assert_eq!(record.first_name, "Alice");
    assert_eq!(new_store.list().unwrap().len(), 2);
}
