use std::path::PathBuf;
use thiserror::Error;

/// Ошибки загрузки исходных файлов (фатальные)
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive {path} contains no CSV file")]
    NoCsvInArchive { path: PathBuf },

    #[error("Malformed CSV in {table} table: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("Column '{column}' not found in {table} table")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("Invalid value '{value}' in column '{column}' of {table} table (line {line})")]
    InvalidValue {
        table: &'static str,
        column: &'static str,
        line: u64,
        value: String,
    },
}

/// Ошибка схемы: ключ соединения отсутствует, данные отдаются без категорий
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Column '{column}' not found in {table} table, sales are not joined with products")]
    MissingJoinKey {
        table: &'static str,
        column: &'static str,
    },
}
