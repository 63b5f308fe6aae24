use thiserror::Error;

use crate::storage::StorageError;

/// 启动 / 运行期错误 (请求级错误走 `AppError`)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置错误: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;
