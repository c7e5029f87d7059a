use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{
    cell::{Cell, CellType},
    schema::{TableDescriptor, TableName},
    util::{Result, Status},
};

const TAG_MUTATION: u8 = 1;
const TAG_CREATE_TABLE: u8 = 2;
const TAG_DELETE_TABLE: u8 = 3;
const TAG_SET_ENABLED: u8 = 4;
const TAG_TRUNCATE: u8 = 5;
const TAG_MODIFY_TABLE: u8 = 6;

/// One WAL record payload
///
/// Byte strings are written as `u32 LE length + bytes`; schema-carrying
/// edits embed the descriptor as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum WalEdit {
    /// Cells of one batch; cell `i` was written with sequence `sequence + i`
    Mutation {
        table: TableName,
        sequence: u64,
        cells: Vec<Cell>,
    },
    CreateTable(TableDescriptor),
    DeleteTable(TableName),
    SetEnabled { table: TableName, enabled: bool },
    Truncate(TableName),
    ModifyTable(TableDescriptor),
}

impl WalEdit {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::new();
        match self {
            WalEdit::Mutation {
                table,
                sequence,
                cells,
            } => {
                buf.put_u8(TAG_MUTATION);
                put_table(&mut buf, table);
                buf.put_u64_le(*sequence);
                buf.put_u32_le(cells.len() as u32);
                for cell in cells {
                    put_bytes(&mut buf, cell.row());
                    put_bytes(&mut buf, cell.family());
                    put_bytes(&mut buf, cell.qualifier());
                    buf.put_u64_le(cell.timestamp());
                    buf.put_u8(cell.cell_type() as u8);
                    put_bytes(&mut buf, cell.value());
                }
            }
            WalEdit::CreateTable(desc) => {
                buf.put_u8(TAG_CREATE_TABLE);
                put_bytes(&mut buf, &serde_json::to_vec(desc)?);
            }
            WalEdit::ModifyTable(desc) => {
                buf.put_u8(TAG_MODIFY_TABLE);
                put_bytes(&mut buf, &serde_json::to_vec(desc)?);
            }
            WalEdit::DeleteTable(table) => {
                buf.put_u8(TAG_DELETE_TABLE);
                put_table(&mut buf, table);
            }
            WalEdit::SetEnabled { table, enabled } => {
                buf.put_u8(TAG_SET_ENABLED);
                put_table(&mut buf, table);
                buf.put_u8(u8::from(*enabled));
            }
            WalEdit::Truncate(table) => {
                buf.put_u8(TAG_TRUNCATE);
                put_table(&mut buf, table);
            }
        }
        Ok(buf.to_vec())
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut buf = data;
        let tag = get_u8(&mut buf)?;
        let edit = match tag {
            TAG_MUTATION => {
                let table = get_table(&mut buf)?;
                let sequence = get_u64(&mut buf)?;
                let count = get_u32(&mut buf)? as usize;
                let mut cells = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    let row = get_bytes(&mut buf)?;
                    let family = get_bytes(&mut buf)?;
                    let qualifier = get_bytes(&mut buf)?;
                    let timestamp = get_u64(&mut buf)?;
                    let type_byte = get_u8(&mut buf)?;
                    let cell_type = CellType::from_u8(type_byte).ok_or_else(|| {
                        Status::corruption(format!("Unknown cell type {type_byte} in WAL"))
                    })?;
                    let value = get_bytes(&mut buf)?;
                    cells.push(Cell::new(row, family, qualifier, timestamp, cell_type, value));
                }
                WalEdit::Mutation {
                    table,
                    sequence,
                    cells,
                }
            }
            TAG_CREATE_TABLE => WalEdit::CreateTable(serde_json::from_slice(&get_bytes(&mut buf)?)?),
            TAG_MODIFY_TABLE => WalEdit::ModifyTable(serde_json::from_slice(&get_bytes(&mut buf)?)?),
            TAG_DELETE_TABLE => WalEdit::DeleteTable(get_table(&mut buf)?),
            TAG_SET_ENABLED => WalEdit::SetEnabled {
                table: get_table(&mut buf)?,
                enabled: get_u8(&mut buf)? != 0,
            },
            TAG_TRUNCATE => WalEdit::Truncate(get_table(&mut buf)?),
            other => return Err(Status::corruption(format!("Unknown WAL edit tag {other}"))),
        };

        if !buf.is_empty() {
            return Err(Status::corruption("Trailing bytes after WAL edit"));
        }
        Ok(edit)
    }
}

fn put_bytes(buf: &mut BytesMut, data: &[u8]) {
    buf.put_u32_le(data.len() as u32);
    buf.put_slice(data);
}

fn put_table(buf: &mut BytesMut, table: &TableName) {
    put_bytes(buf, table.full_name().as_bytes());
}

fn need(buf: &[u8], n: usize) -> Result<()> {
    if buf.len() < n {
        return Err(Status::corruption("WAL edit truncated"));
    }
    Ok(())
}

fn get_u8(buf: &mut &[u8]) -> Result<u8> {
    need(buf, 1)?;
    Ok(buf.get_u8())
}

fn get_u32(buf: &mut &[u8]) -> Result<u32> {
    need(buf, 4)?;
    Ok(buf.get_u32_le())
}

fn get_u64(buf: &mut &[u8]) -> Result<u64> {
    need(buf, 8)?;
    Ok(buf.get_u64_le())
}

fn get_bytes(buf: &mut &[u8]) -> Result<Bytes> {
    let len = get_u32(buf)? as usize;
    need(buf, len)?;
    Ok(buf.copy_to_bytes(len))
}

fn get_table(buf: &mut &[u8]) -> Result<TableName> {
    TableName::value_of(get_bytes(buf)?)
}
