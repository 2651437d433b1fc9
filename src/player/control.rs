use crate::core::{
    Mark, PlayerError, ReplayMode, Result, TitleInfo, MIN_TITLE_LENGTH_SECONDS, TICKS_PER_SECOND,
};
use crate::player::device::OutputDevice;
use crate::player::engine::BdPlayer;
use crate::player::source::TitleSource;
use crate::player::supervisor::{SessionGuard, SessionRegistry};
use log::{error, info};
use std::sync::Arc;

/// 播放控制器 - 面向 UI 层的薄门面
///
/// 负责会话建立（枚举标题、挑正片、取盘名）和命令转发，
/// 真正的读盘/解复用都在 BdPlayer 里
pub struct BdControl {
    player: BdPlayer,
    disc_name: String,
    _session: SessionGuard,
}

impl std::fmt::Debug for BdControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BdControl")
            .field("disc_name", &self.disc_name)
            .finish_non_exhaustive()
    }
}

impl BdControl {
    /// 打开光盘并启动播放会话
    ///
    /// 流程：登记会话 -> 枚举标题（过滤短标题）-> 挑最长的当正片 ->
    /// 选中标题 -> 取光盘显示名 -> 启动播放线程
    pub fn open(
        mut source: Box<dyn TitleSource>,
        device: Arc<dyn OutputDevice>,
        registry: &SessionRegistry,
    ) -> Result<BdControl> {
        let session = registry.begin_session().ok_or(PlayerError::SessionActive)?;

        let titles = source.titles(MIN_TITLE_LENGTH_SECONDS);
        if titles.is_empty() {
            error!("蓝光光盘: 没有可播放的标题");
            return Err(PlayerError::NoTitles);
        }
        info!("蓝光光盘: {} 个标题", titles.len());

        // 挑最长的标题当正片
        let mut main_index = 0;
        let mut main_playlist = 0;
        let mut duration = 0;
        for title in &titles {
            if title.duration > duration {
                main_index = title.index;
                main_playlist = title.playlist;
                duration = title.duration;
            }
        }
        info!("蓝光正片: #{} ({:05}.mpls)", main_index, main_playlist);

        if !source.select_title(main_index) {
            error!("select_title({}) 失败", main_index);
            return Err(PlayerError::OpenError(format!(
                "选择标题 {} 失败",
                main_index
            )));
        }

        // 光盘显示名（尽力而为，太短的当没有）
        let disc_name = source
            .disc_name()
            .filter(|name| name.len() > 1)
            .unwrap_or_else(|| "BluRay".to_string());

        let mut player = BdPlayer::new(source, device);
        player.start();

        Ok(BdControl {
            player,
            disc_name,
            _session: session,
        })
    }

    /// 光盘显示名，用作回放界面标题
    pub fn header(&self) -> &str {
        &self.disc_name
    }

    /// 播放会话是否还在进行
    pub fn active(&self) -> bool {
        self.player.is_running()
    }

    /// 停止会话并等待播放线程退出
    pub fn stop(&mut self) {
        self.player.stop();
    }

    pub fn play(&self) {
        self.player.play();
    }

    pub fn pause(&self) {
        self.player.pause();
    }

    pub fn goto_seconds(&self, seconds: i64) {
        self.player.goto_seconds(seconds);
    }

    pub fn skip_seconds(&self, delta: i64) {
        self.player.skip_seconds(delta);
    }

    pub fn skip_chapters(&self, chapters: i32) {
        self.player.skip_chapters(chapters);
    }

    pub fn select_playlist(&self, playlist: u32) -> bool {
        self.player.select_playlist(playlist)
    }

    pub fn get_index(&self) -> Option<(i64, i64)> {
        self.player.get_index()
    }

    pub fn replay_mode(&self) -> ReplayMode {
        self.player.replay_mode()
    }

    pub fn pos_str(&self) -> String {
        self.player.pos_str()
    }

    pub fn marks(&self) -> Vec<Mark> {
        self.player.marks()
    }

    /// 标题列表，最长的排前面（给标题选择界面用）
    pub fn title_list(&self) -> Vec<TitleInfo> {
        let mut titles = self.player.titles(0);
        titles.sort_by(|a, b| b.duration.cmp(&a.duration));
        titles
    }

    /// 标题条目的显示文本："Title 序号 (时:分:秒)"
    pub fn title_label(title: &TitleInfo) -> String {
        let seconds = title.duration / TICKS_PER_SECOND;
        format!(
            "Title {} ({:02}:{:02}:{:02})",
            title.index + 1,
            seconds / 3600,
            (seconds / 60) % 60,
            seconds % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PlaylistInfo, TrackKind};
    use crate::player::source::SourceEvent;
    use parking_lot::Mutex as PlMutex;
    use std::time::Duration;

    // 极简标题源：只为会话建立流程服务，
    // read_block 直接报标题结束，让播放线程立刻收工
    struct ListSource {
        titles: Vec<TitleInfo>,
        name: Option<String>,
        select_ok: bool,
        selected: Arc<PlMutex<Option<u32>>>,
        min_filter: Arc<PlMutex<Option<u32>>>,
    }

    impl ListSource {
        fn new(titles: Vec<TitleInfo>) -> Self {
            Self {
                titles,
                name: None,
                select_ok: true,
                selected: Arc::new(PlMutex::new(None)),
                min_filter: Arc::new(PlMutex::new(None)),
            }
        }
    }

    impl TitleSource for ListSource {
        fn titles(&mut self, min_seconds: u32) -> Vec<TitleInfo> {
            *self.min_filter.lock() = Some(min_seconds);
            self.titles
                .iter()
                .filter(|t| t.duration >= min_seconds as u64 * TICKS_PER_SECOND)
                .cloned()
                .collect()
        }

        fn select_title(&mut self, index: u32) -> bool {
            *self.selected.lock() = Some(index);
            self.select_ok
        }

        fn select_playlist(&mut self, _playlist: u32) -> bool {
            true
        }

        fn read_block(&mut self, _buf: &mut [u8]) -> Result<(usize, SourceEvent)> {
            Ok((0, SourceEvent::EndOfTitle))
        }

        fn next_event(&mut self) -> SourceEvent {
            SourceEvent::None
        }

        fn seek_time(&mut self, _tick: u64) {}

        fn seek_chapter(&mut self, _chapter: u32) {}

        fn tell_time(&self) -> u64 {
            0
        }

        fn playlist_info(&mut self, _playlist: u32) -> Option<PlaylistInfo> {
            None
        }

        fn disc_name(&self) -> Option<String> {
            self.name.clone()
        }

        fn description(&self) -> String {
            "list".to_string()
        }
    }

    struct NullDevice;

    impl OutputDevice for NullDevice {
        fn poll_ready(&self, _timeout: Duration) -> bool {
            false
        }

        fn play_ts(&self, _packet: &[u8]) -> Result<usize> {
            Ok(0)
        }

        fn clear(&self) {}
        fn freeze(&self) {}
        fn play(&self) {}
        fn clear_tracks(&self) {}
        fn set_track(&self, _kind: TrackKind, _index: usize, _pid: u16, _lang: &str) {}
    }

    fn title(index: u32, playlist: u32, seconds: u64) -> TitleInfo {
        TitleInfo {
            index,
            playlist,
            duration: seconds * TICKS_PER_SECOND,
        }
    }

    #[test]
    fn test_open_picks_longest_title() {
        let source = ListSource::new(vec![
            title(0, 1, 600),
            title(1, 800, 7200),
            title(2, 3, 1200),
        ]);
        let selected = source.selected.clone();
        let min_filter = source.min_filter.clone();
        let registry = SessionRegistry::new();

        let control =
            BdControl::open(Box::new(source), Arc::new(NullDevice), &registry).unwrap();

        assert_eq!(*selected.lock(), Some(1), "应选中最长的标题");
        assert_eq!(*min_filter.lock(), Some(MIN_TITLE_LENGTH_SECONDS));
        drop(control);
    }

    #[test]
    fn test_open_fails_without_titles() {
        // 全部短于最小时长，过滤后为空
        let source = ListSource::new(vec![title(0, 1, 30)]);
        let registry = SessionRegistry::new();

        let err = BdControl::open(Box::new(source), Arc::new(NullDevice), &registry).unwrap_err();
        assert!(matches!(err, PlayerError::NoTitles));

        // 失败后会话占位要放掉
        assert!(!registry.is_active());
    }

    #[test]
    fn test_open_fails_when_select_rejected() {
        let mut source = ListSource::new(vec![title(0, 1, 600)]);
        source.select_ok = false;
        let registry = SessionRegistry::new();

        let err = BdControl::open(Box::new(source), Arc::new(NullDevice), &registry).unwrap_err();
        assert!(matches!(err, PlayerError::OpenError(_)));
        assert!(!registry.is_active());
    }

    #[test]
    fn test_only_one_session_at_a_time() {
        let registry = SessionRegistry::new();

        let control = BdControl::open(
            Box::new(ListSource::new(vec![title(0, 1, 600)])),
            Arc::new(NullDevice),
            &registry,
        )
        .unwrap();

        let err = BdControl::open(
            Box::new(ListSource::new(vec![title(0, 1, 600)])),
            Arc::new(NullDevice),
            &registry,
        )
        .unwrap_err();
        assert!(matches!(err, PlayerError::SessionActive));

        // 第一个会话结束后才能再开
        drop(control);
        assert!(!registry.is_active());
        let again = BdControl::open(
            Box::new(ListSource::new(vec![title(0, 1, 600)])),
            Arc::new(NullDevice),
            &registry,
        );
        assert!(again.is_ok());
    }

    #[test]
    fn test_disc_name_fallback() {
        let registry = SessionRegistry::new();

        let control = BdControl::open(
            Box::new(ListSource::new(vec![title(0, 1, 600)])),
            Arc::new(NullDevice),
            &registry,
        )
        .unwrap();
        assert_eq!(control.header(), "BluRay");
        drop(control);

        // 单字符的名字当没有
        let mut source = ListSource::new(vec![title(0, 1, 600)]);
        source.name = Some("X".to_string());
        let control = BdControl::open(Box::new(source), Arc::new(NullDevice), &registry).unwrap();
        assert_eq!(control.header(), "BluRay");
        drop(control);

        let mut source = ListSource::new(vec![title(0, 1, 600)]);
        source.name = Some("My Disc".to_string());
        let control = BdControl::open(Box::new(source), Arc::new(NullDevice), &registry).unwrap();
        assert_eq!(control.header(), "My Disc");
    }

    #[test]
    fn test_title_list_sorted_longest_first() {
        let registry = SessionRegistry::new();
        let control = BdControl::open(
            Box::new(ListSource::new(vec![
                title(0, 1, 600),
                title(1, 800, 7200),
                title(2, 3, 1200),
            ])),
            Arc::new(NullDevice),
            &registry,
        )
        .unwrap();

        let list = control.title_list();
        let indices: Vec<u32> = list.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![1, 2, 0]);
    }

    #[test]
    fn test_title_label_format() {
        let label = BdControl::title_label(&title(1, 800, 7325));
        assert_eq!(label, "Title 2 (02:02:05)");
    }
}
