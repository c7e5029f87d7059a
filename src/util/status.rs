use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    NotFound,
    Corruption,
    InvalidArgument,
    IOError,
    Busy,
    TableNotFound,
    TableExists,
    TableNotEnabled,
    TableNotDisabled,
    NoSuchColumnFamily,
    ConnectionClosed,
}

#[derive(Debug, Clone)]
pub struct Status {
    code: Code,
    message: Option<String>,
}

impl Status {
    fn with(code: Code, msg: impl Into<String>) -> Self {
        Status {
            code,
            message: Some(msg.into()),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::with(Code::NotFound, msg)
    }

    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::with(Code::Corruption, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::with(Code::InvalidArgument, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::with(Code::IOError, msg)
    }

    pub fn busy(msg: impl Into<String>) -> Self {
        Self::with(Code::Busy, msg)
    }

    pub fn table_not_found(table: impl fmt::Display) -> Self {
        Self::with(Code::TableNotFound, table.to_string())
    }

    pub fn table_exists(table: impl fmt::Display) -> Self {
        Self::with(Code::TableExists, table.to_string())
    }

    pub fn table_not_enabled(table: impl fmt::Display) -> Self {
        Self::with(Code::TableNotEnabled, table.to_string())
    }

    pub fn table_not_disabled(table: impl fmt::Display) -> Self {
        Self::with(Code::TableNotDisabled, table.to_string())
    }

    pub fn no_such_column_family(msg: impl Into<String>) -> Self {
        Self::with(Code::NoSuchColumnFamily, msg)
    }

    pub fn connection_closed() -> Self {
        Status {
            code: Code::ConnectionClosed,
            message: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code == Code::NotFound
    }

    pub fn is_corruption(&self) -> bool {
        self.code == Code::Corruption
    }

    pub fn is_io_error(&self) -> bool {
        self.code == Code::IOError
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.code == Code::InvalidArgument
    }

    pub fn is_table_not_found(&self) -> bool {
        self.code == Code::TableNotFound
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{:?}: {}", self.code, msg),
            None => write!(f, "{:?}", self.code),
        }
    }
}

impl std::error::Error for Status {}

impl From<std::io::Error> for Status {
    fn from(err: std::io::Error) -> Self {
        Status::io_error(err.to_string())
    }
}

impl From<serde_json::Error> for Status {
    fn from(err: serde_json::Error) -> Self {
        Status::corruption(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Status>;
