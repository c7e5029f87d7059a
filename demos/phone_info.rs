//! Walk through the phone catalogue example end to end
//!
//! Run with `cargo run --example phone_info`. Store logs go to stdout
//! through `tracing-subscriber`.

use cellstore::{
    ColumnFamilyDescriptor, Configuration, ConnectionFactory, Delete, Get, Put, Result, RowResult,
    Scan, TableDescriptor, TableName, config::keys, util::Printable,
};
use tempfile::TempDir;

fn print_row(result: &RowResult) {
    for cell in result.cells() {
        println!(
            "row: {}  family: {}  qualifier: {}  value: {}",
            Printable(cell.row()),
            Printable(cell.family()),
            Printable(cell.qualifier()),
            Printable(cell.value())
        );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let root = TempDir::new()?;
    let mut conf = Configuration::create();
    conf.set(keys::QUORUM, "nosql01:2181,nosql02:2181,nosql03:2181")
        .set(keys::ROOT_DIR, root.path().to_string_lossy());
    let conn = ConnectionFactory::create_connection(&conf)?;
    let name = TableName::value_of("t_phone_info")?;

    // createTable
    let admin = conn.admin()?;
    let mut extra = ColumnFamilyDescriptor::new("extra_info");
    extra.set_versions(1, 3)?;
    let mut desc = TableDescriptor::new(name.clone());
    desc.add_family(ColumnFamilyDescriptor::new("base_info"))
        .add_family(extra);
    admin.create_table(&desc)?;
    admin.close();

    // put
    let table = conn.table(name.clone())?;
    let mut p001 = Put::new("p001");
    p001.add_column("base_info", "brand", "Apple")
        .add_column("base_info", "name", "iPhone 11 pro");
    let mut p002 = Put::new("p002");
    p002.add_column("base_info", "name", "HUAWEI Mate 30 Pro")
        .add_column("extra_info", "price", "5899");
    table.put_batch(vec![p001, p002])?;

    println!("== get p001");
    print_row(&table.get(&Get::new("p001"))?);

    println!("== scan");
    for row in table.scanner(&Scan::new())? {
        print_row(&row?);
        println!("-----------------------");
    }

    println!("== delete p001 base_info:name");
    let mut delete = Delete::new("p001");
    delete.add_column("base_info", "name");
    table.delete(delete)?;
    print_row(&table.get(&Get::new("p001"))?);
    table.close();

    // dropTable
    let admin = conn.admin()?;
    admin.disable_table(&name)?;
    admin.delete_table(&name)?;
    println!("== tables after drop: {:?}", admin.list_table_names()?);
    admin.close();

    conn.close()
}
