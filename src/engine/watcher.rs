//! DOM变更监听
//!
//! 宿主在向页面插入节点后调用 [`WatcherHandle::node_inserted`]，
//! 引擎的驱动循环收到事件后做防抖合并再触发重翻译。

use std::cell::RefCell;

use markup5ever_rcdom::Handle;
use tokio::sync::mpsc;

use crate::dom::subtree_text;

/// 变更事件
#[derive(Debug)]
pub enum WatchEvent {
    /// 有包含文本的节点被插入页面
    Inserted,
    /// 引擎销毁，驱动循环应当退出
    Shutdown,
}

/// 供宿主持有的变更上报句柄，可克隆到引擎之外
#[derive(Clone)]
pub struct WatcherHandle {
    tx: mpsc::UnboundedSender<WatchEvent>,
}

impl WatcherHandle {
    /// 上报节点插入；不含文本的子树被直接忽略
    pub fn node_inserted(&self, node: &Handle) {
        if subtree_text(node).trim().is_empty() {
            return;
        }
        // 接收端已关闭说明引擎已销毁，丢弃事件即可
        let _ = self.tx.send(WatchEvent::Inserted);
    }
}

/// 变更监听器，持有事件通道两端
pub struct MutationWatcher {
    tx: mpsc::UnboundedSender<WatchEvent>,
    rx: RefCell<Option<mpsc::UnboundedReceiver<WatchEvent>>>,
}

impl MutationWatcher {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: RefCell::new(Some(rx)),
        }
    }

    /// 获取上报句柄
    pub fn handle(&self) -> WatcherHandle {
        WatcherHandle {
            tx: self.tx.clone(),
        }
    }

    /// 取走接收端，只能取一次
    pub fn take_receiver(&self) -> Option<mpsc::UnboundedReceiver<WatchEvent>> {
        self.rx.borrow_mut().take()
    }

    /// 通知驱动循环退出
    pub fn disconnect(&self) {
        let _ = self.tx.send(WatchEvent::Shutdown);
    }
}

impl Default for MutationWatcher {
    fn default() -> Self {
        Self::new()
    }
}
