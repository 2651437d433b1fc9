use crate::core::types::{ASSUMED_FPS, TICKS_PER_SECOND};
use serde::{Deserialize, Serialize};

/// 章节边界标记，位置为帧号（按 ASSUMED_FPS 换算）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Mark {
    pub position: i64,
}

/// 章节标记表
///
/// 由当前播放列表的章节起始时间推导：起点一个 0 标记，
/// 之后每个章节边界一对标记（边界前一帧 + 边界帧）。
/// 播放列表切换时整表重建，不做增量合并
#[derive(Debug, Clone, Default)]
pub struct ChapterMarks {
    marks: Vec<Mark>,
}

impl ChapterMarks {
    pub fn new() -> Self {
        Self { marks: Vec::new() }
    }

    /// 按章节起始时间（tick）整表重建
    pub fn rebuild(&mut self, chapters: &[u64]) {
        self.marks.clear();

        if !chapters.is_empty() {
            self.add(0);
            for start in &chapters[1..] {
                let frame = (start / TICKS_PER_SECOND * ASSUMED_FPS) as i64;
                self.add(frame - 1);
                self.add(frame);
            }
        }
    }

    fn add(&mut self, position: i64) {
        self.marks.push(Mark { position });
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
