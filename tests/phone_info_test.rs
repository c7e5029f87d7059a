use cellstore::{
    Code, ColumnFamilyDescriptor, Configuration, Connection, ConnectionFactory, Delete, Get, Put,
    Scan, TableDescriptor, TableName, config::keys,
};
use tempfile::TempDir;

fn connect(dir: &TempDir) -> Connection {
    let mut conf = Configuration::create();
    conf.set(keys::QUORUM, "nosql01:2181,nosql02:2181,nosql03:2181")
        .set(keys::ROOT_DIR, dir.path().to_string_lossy());
    ConnectionFactory::create_connection(&conf).unwrap()
}

fn phone_info() -> TableName {
    TableName::value_of("t_phone_info").unwrap()
}

fn create_table(conn: &Connection) {
    let admin = conn.admin().unwrap();
    let mut extra = ColumnFamilyDescriptor::new("extra_info");
    extra.set_versions(1, 3).unwrap();
    let mut desc = TableDescriptor::new(phone_info());
    desc.add_family(ColumnFamilyDescriptor::new("base_info"))
        .add_family(extra);
    admin.create_table(&desc).unwrap();
    admin.close();
}

fn put_phones(conn: &Connection) {
    let table = conn.table(phone_info()).unwrap();
    let mut p001 = Put::new("p001");
    p001.add_column("base_info", "brand", "Apple")
        .add_column("base_info", "name", "iPhone 11 pro");
    let mut p002 = Put::new("p002");
    p002.add_column("base_info", "name", "HUAWEI Mate 30 Pro")
        .add_column("extra_info", "price", "5899");
    table.put_batch(vec![p001, p002]).unwrap();
    table.close();
}

#[test]
fn test_create_table_lists_families() {
    let dir = TempDir::new().unwrap();
    let conn = connect(&dir);
    create_table(&conn);

    let admin = conn.admin().unwrap();
    assert!(admin.table_exists(&phone_info()).unwrap());
    let desc = admin.get_descriptor(&phone_info()).unwrap();
    assert_eq!(desc.family_names(), vec!["base_info", "extra_info"]);

    let extra = desc.family(b"extra_info").unwrap();
    assert_eq!(extra.min_versions(), 1);
    assert_eq!(extra.max_versions(), 3);

    let mut again = TableDescriptor::new(phone_info());
    again.add_family(ColumnFamilyDescriptor::new("base_info"));
    assert_eq!(admin.create_table(&again).unwrap_err().code(), Code::TableExists);
}

#[test]
fn test_put_then_get() {
    let dir = TempDir::new().unwrap();
    let conn = connect(&dir);
    create_table(&conn);
    put_phones(&conn);

    let table = conn.table(phone_info()).unwrap();
    let result = table.get(&Get::new("p001")).unwrap();
    assert_eq!(result.row().as_ref(), b"p001");
    assert_eq!(result.len(), 2);
    assert_eq!(result.value("base_info", "brand").unwrap().as_ref(), b"Apple");
    assert_eq!(
        result.value("base_info", "name").unwrap().as_ref(),
        b"iPhone 11 pro"
    );

    assert!(table.get(&Get::new("p404")).unwrap().is_empty());
    assert!(table.exists(&Get::new("p002")).unwrap());
}

#[test]
fn test_scan_yields_every_row() {
    let dir = TempDir::new().unwrap();
    let conn = connect(&dir);
    create_table(&conn);
    put_phones(&conn);

    let table = conn.table(phone_info()).unwrap();
    let rows: Vec<_> = table
        .scanner(&Scan::new())
        .unwrap()
        .collect::<cellstore::Result<_>>()
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].row().as_ref(), b"p001");
    assert_eq!(rows[0].len(), 2);
    assert_eq!(rows[1].row().as_ref(), b"p002");
    assert_eq!(
        rows[1].value("base_info", "name").unwrap().as_ref(),
        b"HUAWEI Mate 30 Pro"
    );
    assert_eq!(rows[1].value("extra_info", "price").unwrap().as_ref(), b"5899");
}

#[test]
fn test_delete_one_column() {
    let dir = TempDir::new().unwrap();
    let conn = connect(&dir);
    create_table(&conn);
    put_phones(&conn);

    let table = conn.table(phone_info()).unwrap();
    let mut delete = Delete::new("p001");
    delete.add_column("base_info", "name");
    table.delete(delete).unwrap();

    let result = table.get(&Get::new("p001")).unwrap();
    assert!(!result.contains_column("base_info", "name"));
    assert_eq!(result.value("base_info", "brand").unwrap().as_ref(), b"Apple");
}

#[test]
fn test_drop_table() {
    let dir = TempDir::new().unwrap();
    let conn = connect(&dir);
    create_table(&conn);
    put_phones(&conn);

    let admin = conn.admin().unwrap();
    admin.disable_table(&phone_info()).unwrap();
    assert!(admin.is_table_disabled(&phone_info()).unwrap());
    admin.delete_table(&phone_info()).unwrap();
    assert!(admin.list_table_names().unwrap().is_empty());

    let table = conn.table(phone_info()).unwrap();
    let err = table.get(&Get::new("p001")).unwrap_err();
    assert!(err.is_table_not_found());
    assert_eq!(
        admin.disable_table(&phone_info()).unwrap_err().code(),
        Code::TableNotFound
    );
}

#[test]
fn test_closed_handles_fail() {
    let dir = TempDir::new().unwrap();
    let conn = connect(&dir);
    create_table(&conn);

    let table = conn.table(phone_info()).unwrap();
    table.close();
    assert_eq!(
        table.get(&Get::new("p001")).unwrap_err().code(),
        Code::ConnectionClosed
    );

    let admin = conn.admin().unwrap();
    conn.close().unwrap();
    assert_eq!(
        admin.table_exists(&phone_info()).unwrap_err().code(),
        Code::ConnectionClosed
    );
    assert!(conn.table(phone_info()).is_err());
}
