use crate::core::{PlaylistInfo, Result, TitleInfo};

/// 读盘时随数据带回的布局事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEvent {
    /// 没有事件（事件链的终止值）
    None,
    /// 切换到新的播放列表
    Playlist(u32),
    /// 切换到播放列表内的新片段
    Clip(u32),
    /// 进入新章节（编号从 1 开始）
    Chapter(u32),
    /// 标题播放结束
    EndOfTitle,
}

/// 标题源抽象接口
///
/// 这个 trait 定义了引擎对光盘容器库的全部要求：
/// 枚举/选择标题、按对齐单元读数据、排队的布局事件、按时间或章节定位。
/// 不同的实现（真实光盘、BDMV 目录、测试桩）都走这个接口
pub trait TitleSource: Send {
    /// 枚举标题列表，过滤掉短于 min_seconds 的条目
    fn titles(&mut self, min_seconds: u32) -> Vec<TitleInfo>;

    /// 按序号选择标题，失败返回 false
    fn select_title(&mut self, index: u32) -> bool;

    /// 按编号切换播放列表，失败返回 false
    fn select_playlist(&mut self, playlist: u32) -> bool;

    /// 读取下一个对齐单元，同时带回至多一个排队事件
    ///
    /// 返回：
    /// - Ok((n, ev)): 读到 n 字节（整数个 m2ts 包）；n 为 0 且无事件
    ///   表示源暂时无数据（如无视频的标题），调用方应小睡后重试
    /// - Err(e): 读盘错误，本次播放会话终止
    fn read_block(&mut self, buf: &mut [u8]) -> Result<(usize, SourceEvent)>;

    /// 取下一个排队事件；一次读盘可能积压多个事件，
    /// 调用方应循环取直到返回 SourceEvent::None
    fn next_event(&mut self) -> SourceEvent;

    /// 定位到绝对时间（tick）
    fn seek_time(&mut self, tick: u64);

    /// 定位到章节（从 0 开始的下标）
    fn seek_chapter(&mut self, chapter: u32);

    /// 当前绝对时间（tick）
    fn tell_time(&self) -> u64;

    /// 拉取播放列表元数据；旧的由调用方直接丢弃
    fn playlist_info(&mut self, playlist: u32) -> Option<PlaylistInfo>;

    /// 光盘显示名称（尽力而为，读不到返回 None）
    fn disc_name(&self) -> Option<String> {
        None
    }

    /// 获取描述信息（用于调试）
    fn description(&self) -> String;
}
