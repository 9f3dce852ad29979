//! 原文快照
//!
//! 翻译前对所有可翻译节点的原始文本做一次性快照，
//! 以节点身份（指针）为键，恢复原文时不做任何网络请求。

use std::collections::HashMap;
use std::rc::Rc;

use markup5ever_rcdom::{Handle, Node};

use crate::dom::set_text_content;
use crate::engine::extractor::TranslatableNode;

/// 页面原文快照
pub struct OriginalState {
    entries: Vec<(Handle, String)>,
    index: HashMap<*const Node, usize>,
}

impl OriginalState {
    /// 对提取出的节点集建立快照，按提取顺序保存
    pub fn capture(nodes: &[TranslatableNode]) -> Self {
        let mut entries = Vec::with_capacity(nodes.len());
        let mut index = HashMap::with_capacity(nodes.len());

        for item in nodes {
            let key = Rc::as_ptr(&item.node);
            if index.contains_key(&key) {
                continue;
            }
            index.insert(key, entries.len());
            entries.push((item.node.clone(), item.text.clone()));
        }

        Self { entries, index }
    }

    /// 将一次重新提取的结果并入快照
    ///
    /// 已知节点保持首次记录的原文不变，新节点以其当前文本
    /// 作为原文登记。返回新增条目数。
    pub fn absorb(&mut self, nodes: &[TranslatableNode]) -> usize {
        let mut added = 0;
        for item in nodes {
            let key = Rc::as_ptr(&item.node);
            if self.index.contains_key(&key) {
                continue;
            }
            self.index.insert(key, self.entries.len());
            self.entries.push((item.node.clone(), item.text.clone()));
            added += 1;
        }
        added
    }

    /// 查询某节点快照时的原始文本；快照后插入的节点返回 `None`
    pub fn original_of(&self, node: &Handle) -> Option<&str> {
        self.index
            .get(&Rc::as_ptr(node))
            .map(|&i| self.entries[i].1.as_str())
    }

    /// 快照内节点数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 将所有快照节点写回原始文本
    ///
    /// 只触碰快照内的节点，幂等且不访问网络。
    pub fn restore(&self) {
        for (node, original) in &self.entries {
            set_text_content(node, original);
        }
    }
}
