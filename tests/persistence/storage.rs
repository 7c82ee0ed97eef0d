use std::fs;

use indexmap::IndexMap;
use slate_engine::EngineError;
use slate_engine::persistence::{Row, SnapshotStore, Table, Value};

use crate::support::temp_dir;

fn _tables() -> IndexMap<String, Table> {
    let mut users = Table::new("users", &[("id", "int not null"), ("name", "string")], "id").unwrap();
    users
        .insert(Row::from([("id", Value::from(1)), ("name", Value::from("a"))]))
        .unwrap();
    users
        .insert(Row::from([("id", Value::from(2)), ("name", Value::Null)]))
        .unwrap();

    let mut tables = IndexMap::new();
    tables.insert("users".to_string(), users);
    tables
}

#[test]
fn storage_load_without_snapshot_is_none() {
    temp_dir(|dir| {
        let store = SnapshotStore::new(dir, "shop").unwrap();
        assert!(store.load("shop").unwrap().is_none());
    });
}

#[test]
fn storage_round_trip() {
    temp_dir(|dir| {
        let store = SnapshotStore::new(dir, "shop").unwrap();
        let tables = _tables();

        store.save("shop", &tables).unwrap();
        let loaded = store.load("shop").unwrap().unwrap();

        assert_eq!(loaded, tables);
    });
}

#[test]
fn storage_round_trip_keeps_float_bits() {
    temp_dir(|dir| {
        let mut readings =
            Table::new("readings", &[("id", "int not null"), ("value", "float")], "id").unwrap();

        let mut floats = vec![
            1.0715660391465826e-75,
            0.1 + 0.2,
            -0.0,
            f64::MIN_POSITIVE,
            f64::MAX,
            5e-324,
            std::f64::consts::PI,
        ];
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        while floats.len() < 500 {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let float = f64::from_bits(state);
            if float.is_finite() {
                floats.push(float);
            }
        }
        for (id, float) in floats.iter().enumerate() {
            readings
                .insert(Row::from([("id", Value::from(id as i64)), ("value", Value::from(*float))]))
                .unwrap();
        }

        let mut tables = IndexMap::new();
        tables.insert("readings".to_string(), readings);

        let store = SnapshotStore::new(dir, "lab").unwrap();
        store.save("lab", &tables).unwrap();
        let loaded = store.load("lab").unwrap().unwrap();

        let bits: Vec<u64> = loaded["readings"]
            .rows()
            .iter()
            .map(|row| match row.get("value") {
                Some(Value::Float(float)) => float.to_bits(),
                other => panic!("expected a float, got {:?}", other),
            })
            .collect();
        assert_eq!(bits, floats.iter().map(|float| float.to_bits()).collect::<Vec<_>>());
    });
}

#[test]
fn storage_writes_readable_json() {
    temp_dir(|dir| {
        let store = SnapshotStore::new(dir, "shop").unwrap();
        store.save("shop", &_tables()).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(json["database"], "shop");
        assert_eq!(
            json["tables"]["users"],
            serde_json::json!({
                "columns": { "id": "int not null", "name": "string" },
                "primary_key": "id",
                "data": [ { "id": 1, "name": "a" }, { "id": 2, "name": null } ]
            })
        );
        // pretty printed, one field per line
        assert!(text.lines().count() > 10);
    });
}

#[test]
fn storage_save_replaces_previous_snapshot() {
    temp_dir(|dir| {
        let store = SnapshotStore::new(dir, "shop").unwrap();
        store.save("shop", &_tables()).unwrap();
        store.save("shop", &IndexMap::new()).unwrap();

        assert!(store.load("shop").unwrap().unwrap().is_empty());
        assert!(!dir.join("shop.json.tmp").exists());
    });
}

#[test]
fn storage_creates_missing_data_dir() {
    temp_dir(|dir| {
        let nested = dir.join("a").join("b");
        let store = SnapshotStore::new(&nested, "shop").unwrap();
        store.save("shop", &_tables()).unwrap();

        assert!(nested.join("shop.json").is_file());
    });
}

#[test]
fn storage_rejects_path_like_names() {
    temp_dir(|dir| {
        assert!(matches!(
            SnapshotStore::new(dir, "a/b"),
            Err(EngineError::InvalidDatabaseName(_))
        ));
    });
}
