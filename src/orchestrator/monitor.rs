//! 卡死检测状态机：POLLING → STUCK_WARN → RECOVERING
//!
//! 纯计数驱动，不读真实时间：同一状态连续观测达到阈值即告警。
//! queued 用独立的高阈值（冷启动排队是常态），其余非终态用通用阈值。
//! 每轮最多恢复一次，二次卡死交给超时策略处理。

use crate::hosted::RunStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Polling,
    StuckWarn,
    Recovering,
}

pub struct StuckMonitor {
    queued_threshold: u32,
    general_threshold: u32,
    last_status: Option<RunStatus>,
    unchanged: u32,
    state: MonitorState,
    recovered_once: bool,
}

impl StuckMonitor {
    pub fn new(queued_threshold: u32, general_threshold: u32) -> Self {
        Self {
            queued_threshold,
            general_threshold,
            last_status: None,
            unchanged: 0,
            state: MonitorState::Polling,
            recovered_once: false,
        }
    }

    /// 每次轮询喂入一个状态；返回当前状态机状态
    pub fn observe(&mut self, status: RunStatus) -> MonitorState {
        if self.state == MonitorState::Recovering {
            return self.state;
        }

        if self.last_status == Some(status) {
            self.unchanged += 1;
        } else {
            self.last_status = Some(status);
            self.unchanged = 1;
        }

        let threshold = match status {
            RunStatus::Queued => self.queued_threshold,
            _ => self.general_threshold,
        };

        self.state = if self.unchanged >= threshold {
            MonitorState::StuckWarn
        } else {
            MonitorState::Polling
        };
        self.state
    }

    /// 申请恢复；每轮只允许一次
    pub fn begin_recovery(&mut self) -> bool {
        if self.recovered_once {
            return false;
        }
        self.recovered_once = true;
        self.state = MonitorState::Recovering;
        true
    }

    /// 恢复完成（新 run 已创建），计数清零回到轮询
    pub fn recovery_done(&mut self) {
        self.last_status = None;
        self.unchanged = 0;
        self.state = MonitorState::Polling;
    }

    /// 有实际进展（如工具输出已回传）时清零计数
    pub fn note_progress(&mut self) {
        self.last_status = None;
        self.unchanged = 0;
        self.state = MonitorState::Polling;
    }

    pub fn has_recovered(&self) -> bool {
        self.recovered_once
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_warns_at_exact_threshold_not_earlier() {
        let mut monitor = StuckMonitor::new(15, 6);
        for i in 1..15 {
            assert_eq!(
                monitor.observe(RunStatus::Queued),
                MonitorState::Polling,
                "warned too early at poll {i}"
            );
        }
        assert_eq!(monitor.observe(RunStatus::Queued), MonitorState::StuckWarn);
    }

    #[test]
    fn test_general_threshold_applies_to_in_progress() {
        let mut monitor = StuckMonitor::new(15, 6);
        for _ in 1..6 {
            assert_eq!(monitor.observe(RunStatus::InProgress), MonitorState::Polling);
        }
        assert_eq!(
            monitor.observe(RunStatus::InProgress),
            MonitorState::StuckWarn
        );
    }

    #[test]
    fn test_status_change_resets_counter() {
        let mut monitor = StuckMonitor::new(15, 6);
        for _ in 0..5 {
            monitor.observe(RunStatus::InProgress);
        }
        monitor.observe(RunStatus::Queued);
        for _ in 0..5 {
            assert_eq!(monitor.observe(RunStatus::InProgress), MonitorState::Polling);
        }
    }

    #[test]
    fn test_recovery_is_granted_exactly_once() {
        let mut monitor = StuckMonitor::new(15, 6);
        assert!(monitor.begin_recovery());
        monitor.recovery_done();
        assert!(!monitor.begin_recovery());
        assert!(monitor.has_recovered());
    }

    #[test]
    fn test_progress_resets_counters() {
        let mut monitor = StuckMonitor::new(15, 6);
        for _ in 0..5 {
            monitor.observe(RunStatus::InProgress);
        }
        monitor.note_progress();
        for _ in 1..6 {
            assert_eq!(monitor.observe(RunStatus::InProgress), MonitorState::Polling);
        }
        assert_eq!(
            monitor.observe(RunStatus::InProgress),
            MonitorState::StuckWarn
        );
    }
}
