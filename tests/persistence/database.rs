use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::thread;

use bigdecimal::BigDecimal;
use slate_engine::persistence::{Database, Predicate, Row, Value};
use slate_engine::{EngineError, PersistenceError, ValidationError};

use crate::support::temp_dir;

fn _prepare_database() -> Database {
    Database::new("test_db")
}

fn _create_users(database: &mut Database) {
    database
        .create_table("users", &[("id", "int not null"), ("name", "string")], "id")
        .expect("invalid column definitions");
}

fn _user(id: i64, name: &str) -> Row {
    Row::from([("id", Value::from(id)), ("name", Value::from(name))])
}

fn _snapshot(dir: &Path) -> String {
    fs::read_to_string(dir.join("shop.json")).unwrap()
}

#[test]
fn database_users_scenario() {
    let mut database = _prepare_database();
    _create_users(&mut database);

    database.add_row("users", _user(1, "a")).unwrap();

    let duplicate = database.add_row("users", _user(1, "b"));
    assert!(matches!(
        duplicate,
        Err(EngineError::Validation(ValidationError::DuplicateKey { .. }))
    ));
    assert_eq!(
        database.get_rows("users", &[], None, false).unwrap(),
        vec![_user(1, "a")]
    );

    database
        .update_row("users", &Value::from(1), Row::from([("name", "c")]))
        .unwrap();

    assert!(matches!(
        database.delete_row("users", &Value::from(2)),
        Err(EngineError::RowNotFound { .. })
    ));

    let rows = database.get_rows("users", &[], Some("name"), false).unwrap();
    assert_eq!(rows, vec![_user(1, "c")]);
}

#[test]
fn database_missing_table_is_an_error_everywhere() {
    let mut database = _prepare_database();
    let missing = |result: Result<(), EngineError>| {
        assert!(matches!(result, Err(EngineError::TableNotFound(name)) if name == "ghosts"))
    };

    missing(database.add_row("ghosts", _user(1, "a")));
    missing(database.update_row("ghosts", &Value::from(1), Row::new()));
    missing(database.delete_row("ghosts", &Value::from(1)).map(|_| ()));
    missing(database.get_rows("ghosts", &[], None, false).map(|_| ()));
    missing(database.table("ghosts").map(|_| ()));
}

#[test]
fn database_create_table_replaces_existing() {
    let mut database = _prepare_database();
    _create_users(&mut database);
    database.add_row("users", _user(1, "a")).unwrap();

    _create_users(&mut database);

    assert!(database.table("users").unwrap().is_empty());
    // the key of the old row is free again
    database.add_row("users", _user(1, "b")).unwrap();
    assert_eq!(database.table_names(), vec!["users".to_string()]);
}

#[test]
fn database_create_table_rejects_bad_schema() {
    let mut database = _prepare_database();
    let result = database.create_table("t", &[("id", "int")], "uid");

    assert!(matches!(result, Err(EngineError::InvalidSchema { .. })));
    assert!(!database.contains_table("t"));
}

#[test]
fn database_get_rows_with_filters_and_sort() {
    let mut database = _prepare_database();
    database
        .create_table(
            "orders",
            &[("id", "int not null"), ("status", "string"), ("total", "decimal")],
            "id",
        )
        .unwrap();

    let orders = vec![
        (1, "open", "10.50"),
        (2, "paid", "99.00"),
        (3, "open", "7.25"),
        (4, "open", "12.00"),
    ];
    for (id, status, total) in orders {
        let row = Row::from([
            ("id", Value::from(id)),
            ("status", Value::from(status)),
            ("total", Value::from(BigDecimal::from_str(total).unwrap())),
        ]);
        database.add_row("orders", row).unwrap();
    }

    let rows = database
        .get_rows("orders", &[Predicate::new("status", "open")], Some("total"), true)
        .unwrap();
    let ids: Vec<Option<&Value>> = rows.iter().map(|row| row.get("id")).collect();

    assert_eq!(
        ids,
        vec![Some(&Value::Integer(4)), Some(&Value::Integer(1)), Some(&Value::Integer(3))]
    );
}

#[test]
fn database_persists_every_mutation() {
    temp_dir(|dir| {
        let mut database = Database::open("shop", dir).unwrap();
        assert!(!dir.join("shop.json").exists());

        _create_users(&mut database);
        assert!(_snapshot(dir).contains("\"users\""));

        database.add_row("users", _user(1, "Jansen")).unwrap();
        assert!(_snapshot(dir).contains("Jansen"));

        database
            .update_row("users", &Value::from(1), Row::from([("name", "Bonega")]))
            .unwrap();
        assert!(_snapshot(dir).contains("Bonega"));
        assert!(!_snapshot(dir).contains("Jansen"));

        database.delete_row("users", &Value::from(1)).unwrap();
        assert!(!_snapshot(dir).contains("Bonega"));
    });
}

#[test]
fn database_rejected_mutation_does_not_touch_snapshot() {
    temp_dir(|dir| {
        let mut database = Database::open("shop", dir).unwrap();
        _create_users(&mut database);
        database.add_row("users", _user(1, "a")).unwrap();
        let before = _snapshot(dir);

        assert!(database.add_row("users", _user(1, "b")).is_err());
        assert!(database.delete_row("users", &Value::from(9)).is_err());

        assert_eq!(_snapshot(dir), before);
    });
}

#[test]
fn database_reopens_to_the_same_state() {
    temp_dir(|dir| {
        let mut database = Database::open("shop", dir).unwrap();
        database
            .create_table(
                "products",
                &[
                    ("sku", "string not null"),
                    ("site", "url"),
                    ("weight", "float"),
                    ("price", "decimal not null"),
                    ("stock", "int"),
                ],
                "sku",
            )
            .unwrap();
        _create_users(&mut database);

        database
            .add_row(
                "products",
                Row::from([
                    ("sku", Value::from("A-1")),
                    ("site", Value::from("https://example.com/a1")),
                    ("weight", Value::from(1.5)),
                    ("price", Value::from(BigDecimal::from_str("19.90").unwrap())),
                    ("stock", Value::Null),
                ]),
            )
            .unwrap();
        database.add_row("users", _user(2, "b")).unwrap();
        database.add_row("users", _user(1, "a")).unwrap();

        let reopened = Database::open("shop", dir).unwrap();
        assert_eq!(reopened, database);
        assert_eq!(
            reopened.table_names(),
            vec!["products".to_string(), "users".to_string()]
        );

        // primary keys are tracked again after loading
        let mut reopened = reopened;
        assert!(reopened.add_row("users", _user(1, "again")).is_err());
    });
}

#[test]
fn database_open_rejects_bad_names() {
    temp_dir(|dir| {
        for name in ["", "../escape", "with space"] {
            assert!(matches!(
                Database::open(name, dir),
                Err(EngineError::InvalidDatabaseName(_))
            ));
        }
    });
}

#[test]
fn database_open_reports_corrupt_snapshot() {
    temp_dir(|dir| {
        fs::write(dir.join("shop.json"), "{ \"database\": \"shop\", \"tables\": ").unwrap();

        assert!(matches!(
            Database::open("shop", dir),
            Err(EngineError::Persistence(PersistenceError::Corrupt { .. }))
        ));
    });
}

#[test]
fn database_open_rejects_snapshot_with_duplicate_keys() {
    temp_dir(|dir| {
        let snapshot = serde_json::json!({
            "database": "shop",
            "tables": {
                "users": {
                    "columns": { "id": "int not null", "name": "string" },
                    "primary_key": "id",
                    "data": [ { "id": 1, "name": "a" }, { "id": 1, "name": "b" } ]
                }
            }
        });
        fs::write(dir.join("shop.json"), snapshot.to_string()).unwrap();

        assert!(matches!(
            Database::open("shop", dir),
            Err(EngineError::Persistence(PersistenceError::Corrupt { .. }))
        ));
    });
}

#[cfg(unix)]
#[test]
fn database_rolls_back_when_the_snapshot_cannot_be_written() {
    temp_dir(|dir| {
        let mut database = Database::open("shop", dir).unwrap();
        _create_users(&mut database);
        database.add_row("users", _user(1, "a")).unwrap();

        // a directory in place of the snapshot makes the final rename fail
        fs::remove_file(dir.join("shop.json")).unwrap();
        fs::create_dir(dir.join("shop.json")).unwrap();
        fs::write(dir.join("shop.json").join("keep"), "").unwrap();

        let insert = database.add_row("users", _user(2, "b"));
        assert!(matches!(insert, Err(EngineError::Persistence(_))));

        let update = database.update_row("users", &Value::from(1), Row::from([("name", "z")]));
        assert!(matches!(update, Err(EngineError::Persistence(_))));

        let create = database.create_table("audit", &[("id", "int")], "id");
        assert!(matches!(create, Err(EngineError::Persistence(_))));

        assert_eq!(
            database.get_rows("users", &[], None, false).unwrap(),
            vec![_user(1, "a")]
        );
        assert!(!database.contains_table("audit"));
        assert!(!dir.join("shop.json.tmp").exists());

        // the rolled back key is still free once the disk is back
        fs::remove_dir_all(dir.join("shop.json")).unwrap();
        database.add_row("users", _user(2, "b")).unwrap();
        assert_eq!(database.table("users").unwrap().len(), 2);
    });
}

#[test]
fn database_shared_between_threads() {
    let mut database = _prepare_database();
    _create_users(&mut database);
    let shared = database.shared();

    let writers: Vec<_> = (0..4)
        .map(|n| {
            let shared = shared.clone();
            thread::spawn(move || {
                let mut database = shared.write().unwrap();
                database.add_row("users", _user(n, "w")).unwrap();
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let database = shared.read().unwrap();
    let rows = database.get_rows("users", &[], Some("id"), false).unwrap();
    let ids: Vec<Value> = rows.iter().filter_map(|row| row.get("id").cloned()).collect();
    assert_eq!(ids, (0..4).map(Value::Integer).collect::<Vec<_>>());
}
