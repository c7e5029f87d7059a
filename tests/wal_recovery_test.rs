use std::fs::{self, OpenOptions};

use cellstore::{
    Code, ColumnFamilyDescriptor, Configuration, Connection, ConnectionFactory, Delete, Get, Put,
    Scan, TableDescriptor, TableName, config::keys,
};
use tempfile::TempDir;

fn configuration(dir: &TempDir) -> Configuration {
    let mut conf = Configuration::create();
    conf.set(keys::QUORUM, "localhost:2181")
        .set(keys::ROOT_DIR, dir.path().to_string_lossy());
    conf
}

fn connect(dir: &TempDir) -> cellstore::Result<Connection> {
    ConnectionFactory::create_connection(&configuration(dir))
}

fn name() -> TableName {
    TableName::value_of("t_phone_info").unwrap()
}

fn create_table(conn: &Connection) {
    let mut extra = ColumnFamilyDescriptor::new("extra_info");
    extra.set_versions(1, 3).unwrap();
    let mut desc = TableDescriptor::new(name());
    desc.add_family(ColumnFamilyDescriptor::new("base_info"))
        .add_family(extra);
    conn.admin().unwrap().create_table(&desc).unwrap();
}

fn put(conn: &Connection, row: &str, family: &str, qualifier: &str, value: &str) {
    let mut put = Put::new(row);
    put.add_column(family, qualifier, value);
    conn.table(name()).unwrap().put(put).unwrap();
}

fn value(conn: &Connection, row: &str, family: &str, qualifier: &str) -> Option<String> {
    conn.table(name())
        .unwrap()
        .get(&Get::new(row))
        .unwrap()
        .value(family, qualifier)
        .map(|v| String::from_utf8(v.to_vec()).unwrap())
}

#[test]
fn test_reopen_restores_schema_and_data() {
    let temp_dir = TempDir::new().unwrap();

    // Phase 1: write, then drop without an explicit close
    {
        let conn = connect(&temp_dir).unwrap();
        create_table(&conn);
        put(&conn, "p001", "base_info", "brand", "Apple");
        put(&conn, "p002", "extra_info", "price", "5899");

        let mut delete = Delete::new("p001");
        delete.add_column("base_info", "brand");
        conn.table(name()).unwrap().delete(delete).unwrap();
        put(&conn, "p001", "base_info", "name", "iPhone 11 pro");
    }

    // Phase 2: everything comes back from the log
    {
        let conn = connect(&temp_dir).unwrap();
        let admin = conn.admin().unwrap();
        assert_eq!(admin.list_table_names().unwrap(), vec![name()]);
        let desc = admin.get_descriptor(&name()).unwrap();
        assert_eq!(desc.family(b"extra_info").unwrap().max_versions(), 3);

        assert_eq!(value(&conn, "p001", "base_info", "brand"), None);
        assert_eq!(
            value(&conn, "p001", "base_info", "name").as_deref(),
            Some("iPhone 11 pro")
        );
        assert_eq!(value(&conn, "p002", "extra_info", "price").as_deref(), Some("5899"));

        // New writes get timestamps after the recovered ones
        put(&conn, "p002", "extra_info", "price", "5799");
        let mut get = Get::new("p002");
        get.read_versions(3);
        let result = conn.table(name()).unwrap().get(&get).unwrap();
        let cells = result.cells();
        assert_eq!(cells.len(), 2);
        assert!(cells[0].timestamp() > cells[1].timestamp());
        assert_eq!(cells[0].value().as_ref(), b"5799");
    }
}

#[test]
fn test_table_state_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let conn = connect(&temp_dir).unwrap();
        create_table(&conn);
        let admin = conn.admin().unwrap();
        admin
            .add_column_family(&name(), ColumnFamilyDescriptor::new("spec_info"))
            .unwrap();
        admin.disable_table(&name()).unwrap();
        conn.close().unwrap();
    }

    let conn = connect(&temp_dir).unwrap();
    let admin = conn.admin().unwrap();
    assert!(admin.is_table_disabled(&name()).unwrap());
    assert!(admin
        .get_descriptor(&name())
        .unwrap()
        .has_family(b"spec_info"));
    assert!(temp_dir.path().join("catalog.json").exists());
}

#[test]
fn test_compaction_on_close_keeps_visible_data() {
    let temp_dir = TempDir::new().unwrap();
    let mut conf = configuration(&temp_dir);
    conf.set(keys::WAL_COMPACT_BYTES, "1");

    let before = {
        let conn = ConnectionFactory::create_connection(&conf).unwrap();
        create_table(&conn);
        for i in 0..5 {
            put(&conn, "p001", "extra_info", "price", &format!("{}", 6000 - i * 100));
        }
        put(&conn, "p002", "base_info", "name", "gone");
        conn.table(name()).unwrap().delete(Delete::new("p002")).unwrap();

        let wal_len = fs::metadata(temp_dir.path().join("wal.log")).unwrap().len();
        conn.close().unwrap();
        assert_eq!(conn.statistics().snapshot().wal_compactions, 1);
        wal_len
    };
    let after = fs::metadata(temp_dir.path().join("wal.log")).unwrap().len();
    assert!(after < before, "compacted log {after} should be smaller than {before}");

    let conn = connect(&temp_dir).unwrap();
    let mut get = Get::new("p001");
    get.read_versions(10);
    let result = conn.table(name()).unwrap().get(&get).unwrap();
    let prices: Vec<&[u8]> = result.cells().iter().map(|c| c.value().as_ref()).collect();
    assert_eq!(prices, vec![b"5600".as_ref(), b"5700".as_ref(), b"5800".as_ref()]);

    let rows: Vec<_> = conn
        .table(name())
        .unwrap()
        .scanner(&Scan::new())
        .unwrap()
        .map(|r| r.unwrap().row().clone())
        .collect();
    assert_eq!(rows, vec!["p001"]);
}

#[test]
fn test_torn_tail_is_dropped() {
    let temp_dir = TempDir::new().unwrap();
    {
        let conn = connect(&temp_dir).unwrap();
        create_table(&conn);
        put(&conn, "p001", "base_info", "name", "kept");
        put(&conn, "p002", "base_info", "name", "torn");
    }

    let wal = temp_dir.path().join("wal.log");
    let len = fs::metadata(&wal).unwrap().len();
    OpenOptions::new()
        .write(true)
        .open(&wal)
        .unwrap()
        .set_len(len - 3)
        .unwrap();

    {
        let conn = connect(&temp_dir).unwrap();
        assert_eq!(value(&conn, "p001", "base_info", "name").as_deref(), Some("kept"));
        assert_eq!(value(&conn, "p002", "base_info", "name"), None);
        put(&conn, "p003", "base_info", "name", "after");
    }

    let conn = connect(&temp_dir).unwrap();
    assert_eq!(value(&conn, "p001", "base_info", "name").as_deref(), Some("kept"));
    assert_eq!(value(&conn, "p003", "base_info", "name").as_deref(), Some("after"));
}

#[test]
fn test_damaged_record_is_corruption() {
    let temp_dir = TempDir::new().unwrap();
    {
        let conn = connect(&temp_dir).unwrap();
        create_table(&conn);
        put(&conn, "p001", "base_info", "name", "value");
    }

    let wal = temp_dir.path().join("wal.log");
    let mut data = fs::read(&wal).unwrap();
    data[10] ^= 0xff;
    fs::write(&wal, data).unwrap();

    let err = connect(&temp_dir).err().unwrap();
    assert!(err.is_corruption());
}

#[test]
fn test_concurrent_connection_is_busy() {
    let temp_dir = TempDir::new().unwrap();
    let first = connect(&temp_dir).unwrap();
    assert_eq!(connect(&temp_dir).err().unwrap().code(), Code::Busy);

    first.close().unwrap();
    let second = connect(&temp_dir).unwrap();
    assert!(!second.is_closed());
}

#[test]
fn test_stale_lock_file_does_not_block_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let conn = connect(&temp_dir).unwrap();
        create_table(&conn);
        put(&conn, "p001", "base_info", "name", "survivor");
        conn.close().unwrap();
    }

    // A killed process leaves its lock file behind, but not the lock
    let lock = temp_dir.path().join("LOCK");
    fs::write(&lock, b"").unwrap();

    let conn = connect(&temp_dir).unwrap();
    assert_eq!(value(&conn, "p001", "base_info", "name").as_deref(), Some("survivor"));
    assert!(lock.exists());
}

#[test]
fn test_compaction_keeps_order_of_same_timestamp_writes() {
    let temp_dir = TempDir::new().unwrap();
    let family = |conn: &Connection| {
        let mut history = ColumnFamilyDescriptor::new("history");
        history.set_keep_deleted_cells(true);
        let mut desc = TableDescriptor::new(name());
        desc.add_family(history);
        conn.admin().unwrap().create_table(&desc).unwrap();
    };
    let put_at = |conn: &Connection, value: &str| {
        let mut put = Put::new("p001");
        put.add_column_at("history", "price", 10, value);
        conn.table(name()).unwrap().put(put).unwrap();
    };

    {
        let conn = connect(&temp_dir).unwrap();
        family(&conn);
        put_at(&conn, "first");
        put_at(&conn, "second");
        assert_eq!(value(&conn, "p001", "history", "price").as_deref(), Some("second"));

        conn.admin().unwrap().compact().unwrap();
        assert_eq!(value(&conn, "p001", "history", "price").as_deref(), Some("second"));
    }

    let conn = connect(&temp_dir).unwrap();
    assert_eq!(value(&conn, "p001", "history", "price").as_deref(), Some("second"));
}
