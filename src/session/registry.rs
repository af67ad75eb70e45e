//! 会话注册表：TTL 驱逐 + 硬性容量上限
//!
//! 驱逐规则：空闲超过 TTL 且未在处理的会话被清理；总数超过上限时按最久未活跃
//! 强制驱逐到上限以内。驱逐前尽力取消在途 run 并清空句柄，处理中的会话永不驱逐。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::hosted::HostedAgentApi;
use crate::session::Session;

pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    ttl: Duration,
    max_sessions: usize,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(ttl: Duration, max_sessions: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            max_sessions,
            clock,
        }
    }

    pub async fn get_or_create(&self, key: &str) -> Arc<Session> {
        if let Some(session) = self.sessions.read().await.get(key) {
            return session.clone();
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Session::new(key, self.clock.now())))
            .clone()
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(key).cloned()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn remove(&self, key: &str, api: &dyn HostedAgentApi) -> bool {
        let session = self.sessions.write().await.remove(key);
        match session {
            Some(session) => {
                cancel_in_flight(&session, api).await;
                true
            }
            None => false,
        }
    }

    /// 周期清扫：先按 TTL，再按容量上限；返回驱逐数
    pub async fn sweep(&self, api: &dyn HostedAgentApi) -> usize {
        let now = self.clock.now();
        let mut evict: Vec<Arc<Session>> = Vec::new();

        {
            let sessions = self.sessions.read().await;

            for session in sessions.values() {
                if session.idle_for(now) > self.ttl && !session.is_processing() {
                    evict.push(session.clone());
                }
            }

            let surviving = sessions.len() - evict.len();
            if surviving > self.max_sessions {
                // 按最久未活跃排序，强制驱逐到上限
                let mut candidates: Vec<Arc<Session>> = sessions
                    .values()
                    .filter(|s| {
                        !s.is_processing() && !evict.iter().any(|e| Arc::ptr_eq(e, s))
                    })
                    .cloned()
                    .collect();
                candidates.sort_by_key(|s| std::cmp::Reverse(s.idle_for(now)));
                let excess = surviving - self.max_sessions;
                evict.extend(candidates.into_iter().take(excess));
            }
        }

        let mut evicted = 0;
        for session in &evict {
            // 读锁释放后会话可能刚开始处理，驱逐前再查一次
            if session.is_processing() {
                continue;
            }
            cancel_in_flight(session, api).await;
            self.sessions.write().await.remove(&session.key);
            tracing::info!(session = %session.key, "会话已驱逐");
            evicted += 1;
        }

        evicted
    }
}

/// 尽力取消在途 run 并清空句柄；对已结束的 run 忽略错误
async fn cancel_in_flight(session: &Session, api: &dyn HostedAgentApi) {
    let mut state = session.state.lock().await;
    if let (Some(thread_id), Some(run_id)) = (state.thread_id.clone(), state.run_id.take()) {
        if let Err(e) = api.cancel_run(&thread_id, &run_id).await {
            tracing::debug!(run = %run_id, error = %e, "取消在途 run 失败，忽略");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::hosted::mock::ScriptedHostedApi;

    fn registry(clock: Arc<ManualClock>, max: usize) -> SessionRegistry {
        SessionRegistry::new(Duration::from_secs(1800), max, clock)
    }

    #[tokio::test]
    async fn test_idle_past_ttl_is_evicted() {
        let clock = Arc::new(ManualClock::new());
        let reg = registry(clock.clone(), 50);
        let api = ScriptedHostedApi::new();

        reg.get_or_create("alt").await;
        clock.advance(Duration::from_secs(1801));
        reg.get_or_create("frisch").await;

        assert_eq!(reg.sweep(&api).await, 1);
        assert!(reg.get("alt").await.is_none());
        assert!(reg.get("frisch").await.is_some());
    }

    #[tokio::test]
    async fn test_processing_session_is_never_evicted() {
        let clock = Arc::new(ManualClock::new());
        let reg = registry(clock.clone(), 50);
        let api = ScriptedHostedApi::new();

        let session = reg.get_or_create("aktiv").await;
        assert!(session.try_begin_processing());
        clock.advance(Duration::from_secs(7200));

        assert_eq!(reg.sweep(&api).await, 0);
        assert!(reg.get("aktiv").await.is_some());

        session.end_processing();
        assert_eq!(reg.sweep(&api).await, 1);
    }

    #[tokio::test]
    async fn test_cap_force_evicts_least_recently_active() {
        let clock = Arc::new(ManualClock::new());
        let reg = registry(clock.clone(), 2);
        let api = ScriptedHostedApi::new();

        reg.get_or_create("a").await;
        clock.advance(Duration::from_secs(10));
        reg.get_or_create("b").await;
        clock.advance(Duration::from_secs(10));
        reg.get_or_create("c").await;

        assert_eq!(reg.sweep(&api).await, 1);
        assert!(reg.get("a").await.is_none());
        assert!(reg.get("b").await.is_some());
        assert!(reg.get("c").await.is_some());
    }

    #[tokio::test]
    async fn test_eviction_cancels_in_flight_run() {
        let clock = Arc::new(ManualClock::new());
        let reg = registry(clock.clone(), 50);
        let api = ScriptedHostedApi::new();

        let session = reg.get_or_create("mit_run").await;
        {
            let mut state = session.state.lock().await;
            state.thread_id = Some("thread_1".into());
            state.run_id = Some("run_1".into());
        }
        clock.advance(Duration::from_secs(1801));

        assert_eq!(reg.sweep(&api).await, 1);
        assert_eq!(api.cancel_count(), 1);
        assert!(session.state.lock().await.run_id.is_none());
    }
}
