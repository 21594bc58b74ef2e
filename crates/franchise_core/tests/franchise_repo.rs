use franchise_core::db::{open_db, open_db_in_memory};
use franchise_core::{
    Branch, Franchise, FranchiseRepository, Product, RepoError, SqliteFranchiseRepository,
};
use rusqlite::Connection;

fn nested_franchise(id: &str, name: &str) -> Franchise {
    Franchise::with_id(
        id,
        name,
        vec![
            Branch::with_id(
                "b1",
                "Norte",
                vec![
                    Product::with_id("p1", "Cafe", 12),
                    Product::with_id("p2", "Te", 4),
                ],
            ),
            Branch::with_id("b2", "Sur", Vec::new()),
        ],
    )
}

#[test]
fn save_and_find_roundtrip_preserves_nested_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFranchiseRepository::try_new(&conn).unwrap();

    let saved = repo.save(&nested_franchise("f1", "Alpha")).unwrap();
    assert_eq!(saved.version, 1);

    let loaded = repo.find_by_id("f1").unwrap().unwrap();
    assert_eq!(loaded, saved);
    let branch_names: Vec<_> = loaded.branches.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(branch_names, ["Norte", "Sur"]);
    let product_ids: Vec<_> = loaded.branches[0]
        .products
        .iter()
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(product_ids, ["p1", "p2"]);
}

#[test]
fn find_by_id_returns_none_for_unknown_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFranchiseRepository::try_new(&conn).unwrap();

    assert!(repo.find_by_id("missing").unwrap().is_none());
}

#[test]
fn save_of_loaded_aggregate_increments_version() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFranchiseRepository::try_new(&conn).unwrap();
    repo.save(&nested_franchise("f1", "Alpha")).unwrap();

    let mut loaded = repo.find_by_id("f1").unwrap().unwrap();
    loaded.name = "Alpha Prime".to_string();
    loaded.branches[0].products[0].stock = 99;
    let saved = repo.save(&loaded).unwrap();
    assert_eq!(saved.version, 2);

    let reloaded = repo.find_by_id("f1").unwrap().unwrap();
    assert_eq!(reloaded.name, "Alpha Prime");
    assert_eq!(reloaded.branches[0].products[0].stock, 99);
    assert_eq!(reloaded.version, 2);
}

#[test]
fn save_of_stale_aggregate_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFranchiseRepository::try_new(&conn).unwrap();
    repo.save(&nested_franchise("f1", "Alpha")).unwrap();

    let mut first = repo.find_by_id("f1").unwrap().unwrap();
    let mut second = repo.find_by_id("f1").unwrap().unwrap();

    first.add_branch(Branch::with_id("b3", "Este", Vec::new()));
    repo.save(&first).unwrap();

    second.add_branch(Branch::with_id("b4", "Oeste", Vec::new()));
    let err = repo.save(&second).unwrap_err();
    assert!(matches!(
        err,
        RepoError::VersionConflict { ref id, expected_version: 1 } if id == "f1"
    ));

    let stored = repo.find_by_id("f1").unwrap().unwrap();
    assert!(stored.branch("b3").is_some());
    assert!(stored.branch("b4").is_none());
}

#[test]
fn inserting_unsaved_aggregate_with_existing_id_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFranchiseRepository::try_new(&conn).unwrap();
    repo.save(&nested_franchise("f1", "Alpha")).unwrap();

    let err = repo
        .save(&Franchise::with_id("f1", "Impostor", Vec::new()))
        .unwrap_err();
    assert!(matches!(err, RepoError::VersionConflict { .. }));
    assert_eq!(repo.find_by_id("f1").unwrap().unwrap().name, "Alpha");
}

#[test]
fn find_all_returns_franchises_in_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFranchiseRepository::try_new(&conn).unwrap();
    for (id, name) in [("z", "Zeta"), ("a", "Alpha"), ("m", "Mu")] {
        repo.save(&Franchise::with_id(id, name, Vec::new())).unwrap();
    }

    let mut renamed = repo.find_by_id("z").unwrap().unwrap();
    renamed.name = "Zeta Renamed".to_string();
    repo.save(&renamed).unwrap();

    let ids: Vec<_> = repo
        .find_all()
        .unwrap()
        .into_iter()
        .map(|franchise| franchise.id)
        .collect();
    assert_eq!(ids, ["z", "a", "m"]);
}

#[test]
fn data_survives_reopening_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("franchises.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteFranchiseRepository::try_new(&conn).unwrap();
        repo.save(&nested_franchise("f1", "Alpha")).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteFranchiseRepository::try_new(&conn).unwrap();
    let loaded = repo.find_by_id("f1").unwrap().unwrap();
    assert_eq!(loaded.branches.len(), 2);
    assert_eq!(loaded.version, 1);
}

#[test]
fn corrupt_document_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO franchises (id, name, document, version) VALUES ('f1', 'Alpha', '{not json', 1);",
        [],
    )
    .unwrap();
    let repo = SqliteFranchiseRepository::try_new(&conn).unwrap();

    let err = repo.find_by_id("f1").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)), "unexpected: {err}");
}

#[test]
fn document_with_mismatched_id_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO franchises (id, name, document, version)
         VALUES ('f1', 'Alpha', '{\"id\":\"other\",\"name\":\"Alpha\",\"branches\":[]}', 1);",
        [],
    )
    .unwrap();
    let repo = SqliteFranchiseRepository::try_new(&conn).unwrap();

    let err = repo.find_all().unwrap_err();
    match err {
        RepoError::InvalidData(message) => assert!(message.contains("does not match")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteFranchiseRepository::try_new(&conn)
        .err()
        .expect("unmigrated connection must be rejected");
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn try_new_rejects_missing_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE franchises;").unwrap();

    let err = SqliteFranchiseRepository::try_new(&conn)
        .err()
        .expect("missing table must be rejected");
    assert!(matches!(err, RepoError::MissingRequiredTable("franchises")));
}
