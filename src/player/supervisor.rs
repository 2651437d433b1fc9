use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// 进程级播放会话登记处
///
/// 同一时刻只允许一个播放会话。拿到 SessionGuard 即占位，
/// guard 被 drop 时自动释放，外部只能查询是否有会话在跑
#[derive(Clone, Default)]
pub struct SessionRegistry {
    active: Arc<AtomicBool>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 是否有会话在进行中
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// 尝试开启新会话；已有会话时返回 None
    pub fn begin_session(&self) -> Option<SessionGuard> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Some(SessionGuard {
                active: Arc::clone(&self.active),
            })
        } else {
            None
        }
    }
}

/// 会话占位凭证，drop 即释放
pub struct SessionGuard {
    active: Arc<AtomicBool>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}
