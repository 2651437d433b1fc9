// 播放器核心模块

pub mod source;   // 标题源抽象接口
pub mod device;   // 下游输出设备抽象接口
pub mod engine;   // 读盘/解复用引擎
pub mod control;  // 面向 UI 的控制门面
pub mod supervisor; // 会话登记

pub use source::{SourceEvent, TitleSource};
pub use device::OutputDevice;
pub use engine::BdPlayer;
pub use control::BdControl;
pub use supervisor::{SessionGuard, SessionRegistry};
