use serde::{Deserialize, Serialize};

/// m2ts 包大小：4 字节时间戳头 + 188 字节 TS 包
pub const M2TS_PACKET_SIZE: usize = 192;

/// TS 包净荷大小
pub const TS_PACKET_SIZE: usize = 188;

/// 对齐单元包含的包数
pub const ALIGNED_UNIT_PACKETS: usize = 32;

/// 对齐单元大小：一次读盘的最小单位（32 个 m2ts 包）
pub const ALIGNED_UNIT_SIZE: usize = ALIGNED_UNIT_PACKETS * M2TS_PACKET_SIZE;

/// 光盘时间单位：每秒 90000 tick（与 PTS 同刻度）
pub const TICKS_PER_SECOND: u64 = 90_000;

/// 章节标记和进度换算使用的帧率
///
/// 光盘不一定真是 25fps，但标记/进度都按这个常量换算，
/// 改动它会同时影响 GetIndex 和章节标记的帧号
pub const ASSUMED_FPS: u64 = 25;

/// 标题枚举时的最短时长过滤（秒），太短的多半是菜单/片头
pub const MIN_TITLE_LENGTH_SECONDS: u32 = 180;

/// 光盘标题列表中的一项
///
/// 枚举阶段产生，选中标题后即可丢弃
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleInfo {
    pub index: u32,       // 标题序号
    pub playlist: u32,    // 关联的播放列表编号
    pub duration: u64,    // 时长（tick）
}

/// 基本流描述：包标识 + 语言代码
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamTrack {
    pub pid: u16,
    pub lang: String,
}

/// 单个片段的音频/字幕轨道集合
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipInfo {
    pub audio_streams: Vec<StreamTrack>,
    pub pg_streams: Vec<StreamTrack>,
}

/// 当前播放列表的元数据
///
/// 引擎独占持有；收到播放列表切换事件时整体替换（旧的释放、新的拉取），
/// 不做增量修补
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistInfo {
    pub playlist: u32,
    pub duration: u64,      // 总时长（tick）
    pub clips: Vec<ClipInfo>,
    pub chapters: Vec<u64>, // 各章节起始时间（tick），升序
}

/// 轨道类别，用于向输出设备登记可选轨道
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Subtitle,
}

/// 播放状态
///
/// 只通过 Play()/Pause() 切换。注意 Pause 是开关语义：
/// 已暂停时再按 Pause 会恢复播放，Play 则始终回到播放态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    Play,
    Pause,
}

/// 回放模式上报（无变速/倒放，speed 恒为 -1）
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReplayMode {
    pub play: bool,
    pub forward: bool,
    pub speed: i32,
}
