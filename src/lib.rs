// 蓝光播放引擎
//
// 核心是一个读盘/解复用循环：后台线程从标题源拉取对齐块，
// 响应流内的布局事件（播放列表/片段/章节切换），把 TS 包
// 逐个转发给下游输出设备。解码与渲染由宿主负责。

pub mod core;
pub mod player;

pub use crate::core::{PlayerError, Result};
pub use player::{BdControl, BdPlayer, OutputDevice, SessionRegistry, SourceEvent, TitleSource};
