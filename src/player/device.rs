use crate::core::{Result, TrackKind};
use std::time::Duration;

/// 下游输出设备抽象接口
///
/// 引擎把解出的 TS 包逐个交给设备，设备内部自行做缓冲与同步，
/// 所以方法都是 &self，实现者用内部可变性管理状态
pub trait OutputDevice: Send + Sync {
    /// 轮询设备是否可写，最多等待 timeout
    fn poll_ready(&self, timeout: Duration) -> bool;

    /// 写入一个 188 字节 TS 包
    ///
    /// 返回：
    /// - Ok(188): 整包接收
    /// - Ok(0): 设备暂时满（背压），调用方稍后重试同一个包
    /// - Ok(n): 部分接收（协议上不应出现，调用方记录异常后继续）
    /// - Err(e): 设备错误，播放终止
    fn play_ts(&self, packet: &[u8]) -> Result<usize>;

    /// 丢弃设备内所有未播出的数据（seek 前必须调用）
    fn clear(&self);

    /// 冻结播放（暂停）
    fn freeze(&self);

    /// 恢复播放
    fn play(&self);

    /// 清空可选轨道表
    fn clear_tracks(&self);

    /// 登记一条可选轨道（片段切换时重建轨道表）
    fn set_track(&self, kind: TrackKind, index: usize, pid: u16, lang: &str);
}
