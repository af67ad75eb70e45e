//! 会话：处理锁、活跃时间与每会话的工作流状态

pub mod registry;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

pub use registry::SessionRegistry;

/// 每会话的工作流状态（thread / run 句柄与阶段快照）
#[derive(Debug, Default)]
pub struct SessionState {
    /// 托管服务的会话线程；首轮懒创建
    pub thread_id: Option<String>,
    /// 当前在途 run；取消或终态后必须清空
    pub run_id: Option<String>,
    /// 各工作流阶段的最新内容快照（outline / full / optimized / ...）
    pub stages: HashMap<String, String>,
    /// 显式标记为 final 的课程内容
    pub final_candidate: Option<String>,
}

/// 一个用户会话；processing 标志保证同一会话同时只有一轮在处理
pub struct Session {
    pub key: String,
    processing: AtomicBool,
    last_active: StdMutex<Instant>,
    pub state: Mutex<SessionState>,
}

impl Session {
    pub fn new(key: &str, now: Instant) -> Self {
        Self {
            key: key.to_string(),
            processing: AtomicBool::new(false),
            last_active: StdMutex::new(now),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// CAS 抢占处理权；false 表示已有一轮在处理
    pub fn try_begin_processing(&self) -> bool {
        self.processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// 无论本轮结局如何都必须调用
    pub fn end_processing(&self) {
        self.processing.store(false, Ordering::Release);
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn touch(&self, now: Instant) {
        *self.last_active.lock().unwrap() = now;
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.last_active.lock().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_flag_is_exclusive() {
        let session = Session::new("u1", Instant::now());
        assert!(session.try_begin_processing());
        assert!(!session.try_begin_processing());
        session.end_processing();
        assert!(session.try_begin_processing());
    }

    #[test]
    fn test_touch_resets_idle() {
        let start = Instant::now();
        let session = Session::new("u1", start);
        let later = start + Duration::from_secs(100);
        assert_eq!(session.idle_for(later), Duration::from_secs(100));
        session.touch(later);
        assert_eq!(session.idle_for(later), Duration::ZERO);
    }
}
