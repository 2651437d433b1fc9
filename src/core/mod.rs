// 核心数据结构和类型定义

pub mod types;
pub mod marks;
pub mod error;

// 重新导出常用类型
pub use types::{ClipInfo, PlaylistInfo, StreamTrack, TitleInfo};

pub use types::*;
pub use marks::*;
pub use error::*;
