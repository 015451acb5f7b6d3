//! 刷新信号：Session 与收藏列表之间唯一的同步通道
//!
//! 基于 tokio::sync::watch 的版本计数器。Session 持有 RefreshTrigger，保存成功后递增版本；
//! View 持有 RefreshWatcher，发现版本变化时重新 list()。两者不共享任何其他状态。

use std::sync::Arc;

use tokio::sync::watch;

/// 创建一对触发端 / 监听端
pub struct RefreshSignal;

impl RefreshSignal {
    pub fn channel() -> (RefreshTrigger, RefreshWatcher) {
        let (tx, rx) = watch::channel(0u64);
        (RefreshTrigger { tx: Arc::new(tx) }, RefreshWatcher { rx })
    }
}

/// 触发端：可克隆，递增版本号
#[derive(Clone, Debug)]
pub struct RefreshTrigger {
    tx: Arc<watch::Sender<u64>>,
}

impl RefreshTrigger {
    /// 递增版本并通知所有监听者（无监听者时也不会失败）
    pub fn notify(&self) -> u64 {
        self.tx.send_modify(|v| *v += 1);
        *self.tx.borrow()
    }

    pub fn version(&self) -> u64 {
        *self.tx.borrow()
    }
}

/// 监听端
#[derive(Debug)]
pub struct RefreshWatcher {
    rx: watch::Receiver<u64>,
}

impl RefreshWatcher {
    /// 是否有未消费的刷新请求；消费后返回 true
    pub fn take_pending(&mut self) -> bool {
        match self.rx.has_changed() {
            Ok(true) => {
                self.rx.borrow_and_update();
                true
            }
            _ => false,
        }
    }

    /// 等待下一次刷新请求；触发端全部销毁时返回 false
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    pub fn version(&self) -> u64 {
        *self.rx.borrow()
    }
}
