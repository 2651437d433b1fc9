use crate::core::{
    ChapterMarks, Mark, PlayMode, PlayerError, PlaylistInfo, ReplayMode, Result, TitleInfo,
    TrackKind, ALIGNED_UNIT_SIZE, ASSUMED_FPS, M2TS_PACKET_SIZE, TICKS_PER_SECOND, TS_PACKET_SIZE,
};
use crate::player::device::OutputDevice;
use crate::player::source::{SourceEvent, TitleSource};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::process;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

fn log_ctx() -> String {
    format!("[pid:{} tid:{:?}]", process::id(), thread::current().id())
}

/// 源暂时无数据时的小睡时长
const READ_IDLE: Duration = Duration::from_millis(3);

/// 每轮解复用前轮询设备可写的超时
const POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// 引擎的单一互斥域：读缓冲、标题源句柄、播放列表元数据、
/// 位置上下文和播放状态都在这把锁下
struct Inner {
    source: Box<dyn TitleSource>,
    buffer: [u8; ALIGNED_UNIT_SIZE],
    pos: usize,   // 已消费的包数
    packs: usize, // 缓冲内有效包数
    playlist_info: Option<PlaylistInfo>,
    marks: ChapterMarks,
    current_playlist: i32,
    current_clip: i32,
    current_chapter: i32, // 章节编号从 1 开始，-1 表示未知
    play_mode: PlayMode,
}

/// 蓝光播放引擎
///
/// 后台线程跑读盘/解复用循环；所有控制命令（播放/暂停/定位/选列表/查询）
/// 从其他线程进来，与循环在同一把锁上串行。循环只在读盘和解复用两步内
/// 持锁，设备轮询和无数据小睡都在锁外，命令延迟上界是一次包转发
pub struct BdPlayer {
    inner: Arc<Mutex<Inner>>,
    device: Arc<dyn OutputDevice>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl BdPlayer {
    pub fn new(source: Box<dyn TitleSource>, device: Arc<dyn OutputDevice>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                source,
                buffer: [0u8; ALIGNED_UNIT_SIZE],
                pos: 0,
                packs: 0,
                playlist_info: None,
                marks: ChapterMarks::new(),
                current_playlist: -1,
                current_clip: -1,
                current_chapter: -1,
                play_mode: PlayMode::Play,
            })),
            device,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// 启动播放线程
    pub fn start(&mut self) {
        if self.thread_handle.is_some() {
            warn!("{} ⚠ 播放线程已在运行", log_ctx());
            return;
        }

        self.running.store(true, Ordering::SeqCst);

        let inner = Arc::clone(&self.inner);
        let device = Arc::clone(&self.device);
        let running = Arc::clone(&self.running);

        self.thread_handle = Some(thread::spawn(move || {
            Self::action(&inner, device.as_ref(), &running);
        }));
    }

    /// 停止播放线程并等待退出
    ///
    /// 取消是协作式的：循环每轮检查一次 running 标志，
    /// 最多一次读盘加一次轮询超时后退出，绝不会在包中间停下
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    /// 播放线程是否还在跑
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// 读盘/解复用主循环（在独立线程中运行）
    fn action(inner: &Arc<Mutex<Inner>>, device: &dyn OutputDevice, running: &AtomicBool) {
        info!(
            "{} 🎬 蓝光播放线程启动: {}",
            log_ctx(),
            inner.lock().source.description()
        );

        let mut unit_count: usize = 0;

        while running.load(Ordering::SeqCst) {
            // 缓冲耗尽时补一个对齐单元
            let mut starved = false;
            {
                let mut guard = inner.lock();
                if guard.pos >= guard.packs {
                    match Self::do_read(&mut guard, device, running) {
                        Ok(has_data) => {
                            starved = !has_data;
                            if has_data {
                                unit_count += 1;
                                if unit_count <= 5 || unit_count % 1000 == 0 {
                                    debug!(
                                        "{} 📦 读取对齐单元 #{}（{} 包）",
                                        log_ctx(),
                                        unit_count,
                                        guard.packs
                                    );
                                }
                            }
                        }
                        Err(e) => {
                            error!("{} ❌ 读盘失败，播放终止: {}", log_ctx(), e);
                            break;
                        }
                    }
                }
            }

            if starved {
                // 暂时无数据也无事件（如无视频的标题），小睡后重试
                thread::sleep(READ_IDLE);
                continue;
            }

            // 设备没准备好就整轮跳过，不碰任何包
            if !device.poll_ready(POLL_TIMEOUT) {
                continue;
            }

            let mut guard = inner.lock();
            if let Err(e) = Self::do_play(&mut guard, device) {
                error!("{} ❌ 包转发失败，播放终止: {}", log_ctx(), e);
                break;
            }
        }

        running.store(false, Ordering::SeqCst);
        info!("{} 🛑 结束蓝光播放（共 {} 个对齐单元）", log_ctx(), unit_count);
    }

    /// 读一个对齐单元并处理随读带回的事件
    ///
    /// 返回 Ok(true) 表示读到数据，Ok(false) 表示源暂时无数据（饿了），
    /// Err 表示读盘错误。缓冲在锁内整体更新，并发的 seek
    /// 不会看到半填充状态
    fn do_read(inner: &mut Inner, device: &dyn OutputDevice, running: &AtomicBool) -> Result<bool> {
        inner.pos = 0;
        inner.packs = 0;

        let (bytes, ev) = match inner.source.read_block(&mut inner.buffer) {
            Ok(r) => r,
            Err(e) => {
                error!("{} ❌ read_block() 错误: {}", log_ctx(), e);
                return Err(PlayerError::ReadError(e.to_string()));
            }
        };

        inner.packs = bytes / M2TS_PACKET_SIZE;
        let starved = inner.packs == 0 && ev == SourceEvent::None;

        Self::handle_events(inner, ev, device, running);

        Ok(!starved)
    }

    /// 按源给出的顺序吃完整条事件链
    fn handle_events(
        inner: &mut Inner,
        mut ev: SourceEvent,
        device: &dyn OutputDevice,
        running: &AtomicBool,
    ) {
        loop {
            match ev {
                SourceEvent::None => break,

                SourceEvent::Playlist(pl) => {
                    // 旧元数据直接替换；章节/片段回到未知，标记整表重建
                    inner.playlist_info = inner.source.playlist_info(pl);
                    inner.current_playlist = pl as i32;
                    inner.current_chapter = -1;
                    inner.current_clip = -1;
                    if let Some(info) = &inner.playlist_info {
                        inner.marks.rebuild(&info.chapters);
                    } else {
                        warn!("{} ⚠ 拉取播放列表 {} 元数据失败", log_ctx(), pl);
                        inner.marks.rebuild(&[]);
                    }
                    info!("{} 📋 切换播放列表: {}", log_ctx(), pl);
                }

                SourceEvent::Clip(clip) => {
                    inner.current_clip = clip as i32;
                    Self::update_tracks(inner, clip, device);
                }

                SourceEvent::Chapter(chapter) => {
                    inner.current_chapter = chapter as i32;
                }

                SourceEvent::EndOfTitle => {
                    info!("{} 📄 标题播放结束", log_ctx());
                    running.store(false, Ordering::SeqCst);
                }
            }

            // 一次读盘可能积压多个事件，取到 None 为止
            ev = inner.source.next_event();
        }
    }

    /// 按当前片段重建设备的可选轨道表
    fn update_tracks(inner: &Inner, clip: u32, device: &dyn OutputDevice) {
        let Some(info) = inner.playlist_info.as_ref() else {
            return;
        };
        let Some(clip_info) = info.clips.get(clip as usize) else {
            return;
        };

        device.clear_tracks();

        for (i, track) in clip_info.audio_streams.iter().enumerate() {
            device.set_track(TrackKind::Audio, i, track.pid, &track.lang);
        }
        for (i, track) in clip_info.pg_streams.iter().enumerate() {
            device.set_track(TrackKind::Subtitle, i, track.pid, &track.lang);
        }

        debug!(
            "{} 🔀 片段 {} 轨道表: {} 音频 / {} 字幕",
            log_ctx(),
            clip,
            clip_info.audio_streams.len(),
            clip_info.pg_streams.len()
        );
    }

    /// 把缓冲内 pos..packs 的包逐个转发给设备
    ///
    /// 包要么整包交给设备、要么留在缓冲里等下一轮，
    /// pos 不会越过一个没被整包接收的包
    fn do_play(inner: &mut Inner, device: &dyn OutputDevice) -> Result<()> {
        while inner.pos < inner.packs {
            let off = inner.pos * M2TS_PACKET_SIZE;

            // 13 位包标识在 4 字节 m2ts 头之后的 TS 头里
            let pid =
                (((inner.buffer[off + 5] as u16) << 8) | inner.buffer[off + 6] as u16) & 0x1fff;

            if (1200..1300).contains(&pid) {
                // 跳过 PG 流（字幕叠加走另一条通路）
                inner.pos += 1;
                continue;
            }
            if (1400..1500).contains(&pid) {
                // 跳过 IG 流
                inner.pos += 1;
                continue;
            }

            let packet = &inner.buffer[off + 4..off + M2TS_PACKET_SIZE];

            match device.play_ts(packet) {
                Ok(n) if n == TS_PACKET_SIZE => {
                    inner.pos += 1;
                }
                Ok(0) => {
                    // 设备背压：同一个包下一轮重试
                    break;
                }
                Ok(n) => {
                    // 设备不该部分接收；记下异常但按成功处理
                    error!("{} ❌ play_ts() 异常: 部分接收 {} 字节", log_ctx(), n);
                    inner.pos += 1;
                }
                Err(e) => {
                    error!("{} ❌ play_ts() 错误: {}", log_ctx(), e);
                    return Err(PlayerError::ConsumerError(e.to_string()));
                }
            }
        }

        Ok(())
    }

    /// 清掉读缓冲和设备里所有未播出的数据
    ///
    /// 任何 seek 之前都要先走这一步，位置跳变后不能重播旧包
    fn empty(inner: &mut Inner, device: &dyn OutputDevice) {
        inner.pos = 0;
        inner.packs = 0;
        device.clear();
    }

    fn goto_locked(inner: &mut Inner, device: &dyn OutputDevice, seconds: i64) {
        Self::empty(inner, device);

        info!("{} 🎯 Seek 到 {} 秒", log_ctx(), seconds);
        inner.source.seek_time(seconds as u64 * TICKS_PER_SECOND);
    }

    /// 定位到绝对秒数（负值按 0 处理）
    pub fn goto_seconds(&self, seconds: i64) {
        let seconds = seconds.max(0);

        let mut inner = self.inner.lock();
        Self::goto_locked(&mut inner, self.device.as_ref(), seconds);
    }

    /// 相对当前位置前后跳 delta 秒，目标不小于 0
    pub fn skip_seconds(&self, delta: i64) {
        let mut inner = self.inner.lock();

        let mut seconds = delta + (inner.source.tell_time() / TICKS_PER_SECOND) as i64;
        if seconds < 0 {
            seconds = 0;
        }

        Self::goto_locked(&mut inner, self.device.as_ref(), seconds);
    }

    /// 前后跳 chapters 个章节，目标夹在 [1, 章节数] 内
    ///
    /// 章节信息还没就绪（没有播放列表元数据或当前章节未知）时不做任何事
    pub fn skip_chapters(&self, chapters: i32) {
        let mut inner = self.inner.lock();

        let count = match inner.playlist_info.as_ref() {
            Some(info) => info.chapters.len() as i32,
            None => return,
        };
        if count < 1 || inner.current_chapter < 1 {
            return;
        }

        let target = (inner.current_chapter + chapters).clamp(1, count);

        Self::empty(&mut inner, self.device.as_ref());

        info!("{} 🎯 Seek 到章节 {}", log_ctx(), target);
        inner.source.seek_chapter((target - 1) as u32);
    }

    /// 切换播放列表，返回源是否接受
    pub fn select_playlist(&self, playlist: u32) -> bool {
        let mut inner = self.inner.lock();

        Self::empty(&mut inner, self.device.as_ref());

        let ok = inner.source.select_playlist(playlist);
        info!(
            "{} 📋 select_playlist({}) -> {}",
            log_ctx(),
            playlist,
            if ok { "OK" } else { "FAIL" }
        );
        ok
    }

    /// 暂停
    ///
    /// 注意开关语义：已暂停时再调用等于恢复播放
    pub fn pause(&self) {
        let mut inner = self.inner.lock();

        if inner.play_mode == PlayMode::Pause {
            Self::play_locked(&mut inner, self.device.as_ref());
        } else {
            info!("{} ⏸ 暂停", log_ctx());
            self.device.freeze();
            inner.play_mode = PlayMode::Pause;
        }
    }

    /// 播放（已在播放时是空操作）
    pub fn play(&self) {
        let mut inner = self.inner.lock();
        Self::play_locked(&mut inner, self.device.as_ref());
    }

    fn play_locked(inner: &mut Inner, device: &dyn OutputDevice) {
        if inner.play_mode != PlayMode::Play {
            info!("{} ▶ 播放", log_ctx());
            device.play();
            inner.play_mode = PlayMode::Play;
        }
    }

    /// 当前位置与总长（帧号，按 ASSUMED_FPS 换算）
    ///
    /// 播放列表元数据还没加载时返回 None
    pub fn get_index(&self) -> Option<(i64, i64)> {
        let inner = self.inner.lock();

        let duration = inner.playlist_info.as_ref().map(|info| info.duration)?;
        let total = (duration / TICKS_PER_SECOND * ASSUMED_FPS) as i64;
        let current = (inner.source.tell_time() / TICKS_PER_SECOND * ASSUMED_FPS) as i64;

        Some((current, total))
    }

    /// 回放模式：本引擎没有变速/倒放
    pub fn replay_mode(&self) -> ReplayMode {
        ReplayMode {
            play: self.inner.lock().play_mode == PlayMode::Play,
            forward: true,
            speed: -1,
        }
    }

    /// 位置短串，未知的部分省略
    pub fn pos_str(&self) -> String {
        let inner = self.inner.lock();

        let pl = if inner.current_playlist >= 0 {
            format!("PL {}", inner.current_playlist)
        } else {
            String::new()
        };
        let cl = if inner.current_clip >= 0 {
            format!(" CL {}", inner.current_clip)
        } else {
            String::new()
        };
        let ch = if inner.current_chapter >= 1 {
            format!(" C {}", inner.current_chapter)
        } else {
            String::new()
        };

        format!("{}{}{}", pl, cl, ch)
    }

    /// 章节标记快照（只读，供进度条渲染）
    pub fn marks(&self) -> Vec<Mark> {
        self.inner.lock().marks.marks().to_vec()
    }

    /// 枚举标题列表（代理给标题源）
    pub fn titles(&self, min_seconds: u32) -> Vec<TitleInfo> {
        self.inner.lock().source.titles(min_seconds)
    }
}

impl Drop for BdPlayer {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            warn!("{} ⚠ BdPlayer 被 drop 但未调用 stop()，正在停止线程", log_ctx());
            self.stop();
        }
    }
}
