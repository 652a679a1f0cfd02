use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum TrackerError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
}

impl TrackerError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            TrackerError::DatabaseConfig(_) => "E001",
            TrackerError::DatabaseConnection(_) => "E002",
            TrackerError::DatabaseOperation(_) => "E003",
            TrackerError::FileOperation(_) => "E004",
            TrackerError::Validation(_) => "E005",
            TrackerError::NotFound(_) => "E006",
            TrackerError::Serialization(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            TrackerError::DatabaseConfig(_) => "Database Configuration Error",
            TrackerError::DatabaseConnection(_) => "Database Connection Error",
            TrackerError::DatabaseOperation(_) => "Database Operation Error",
            TrackerError::FileOperation(_) => "File Operation Error",
            TrackerError::Validation(_) => "Validation Error",
            TrackerError::NotFound(_) => "Resource Not Found",
            TrackerError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            TrackerError::DatabaseConfig(msg)
            | TrackerError::DatabaseConnection(msg)
            | TrackerError::DatabaseOperation(msg)
            | TrackerError::FileOperation(msg)
            | TrackerError::Validation(msg)
            | TrackerError::NotFound(msg)
            | TrackerError::Serialization(msg) => msg,
        }
    }

    /// HTTP 状态码映射
    ///
    /// 存储层错误统一为 500；webhook 入口自行吞掉错误，不走这里。
    pub fn http_status(&self) -> StatusCode {
        match self {
            TrackerError::Validation(_) => StatusCode::BAD_REQUEST,
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::DatabaseConfig(_)
            | TrackerError::DatabaseConnection(_)
            | TrackerError::DatabaseOperation(_)
            | TrackerError::FileOperation(_)
            | TrackerError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TrackerError {}

// 便捷的构造函数
impl TrackerError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        TrackerError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        TrackerError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        TrackerError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        TrackerError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        TrackerError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        TrackerError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        TrackerError::Serialization(msg.into())
    }
}

impl From<sea_orm::DbErr> for TrackerError {
    fn from(err: sea_orm::DbErr) -> Self {
        TrackerError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
