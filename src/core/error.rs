use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("读盘错误: {0}")]
    ReadError(String),

    #[error("输出设备错误: {0}")]
    ConsumerError(String),

    #[error("无法打开光盘: {0}")]
    OpenError(String),

    #[error("光盘上没有可播放的标题")]
    NoTitles,

    #[error("已有播放会话在进行中")]
    SessionActive,

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("其他错误: {0}")]
    Other(String),

    #[error("Anyhow 错误: {0}")]
    AnyhowError(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
