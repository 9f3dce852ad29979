//! DOM文本节点遍历器
//!
//! 使用显式栈做深度优先遍历，按文档顺序产出文本节点，
//! 避免大文档下的递归深度问题。

use markup5ever_rcdom::{Handle, NodeData};

/// 按文档顺序遍历DOM树中所有文本节点的迭代器
pub struct TextWalker {
    stack: Vec<Handle>,
}

impl TextWalker {
    /// 从给定根节点创建遍历器
    pub fn new(root: &Handle) -> Self {
        Self {
            stack: vec![root.clone()],
        }
    }
}

impl Iterator for TextWalker {
    type Item = Handle;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            // 子节点逆序入栈，保证出栈顺序即文档顺序
            for child in node.children.borrow().iter().rev() {
                self.stack.push(child.clone());
            }

            if matches!(node.data, NodeData::Text { .. }) {
                return Some(node);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{html_to_dom, text_content};

    #[test]
    fn test_document_order() {
        let dom = html_to_dom(
            b"<html><body><p>one</p><div><span>two</span>three</div></body></html>",
            "UTF-8",
        )
        .unwrap();

        let texts: Vec<String> = TextWalker::new(&dom.document)
            .filter_map(|n| text_content(&n))
            .filter(|t| !t.trim().is_empty())
            .collect();

        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_empty_document() {
        let dom = html_to_dom(b"<html><body></body></html>", "UTF-8").unwrap();
        let count = TextWalker::new(&dom.document)
            .filter_map(|n| text_content(&n))
            .filter(|t| !t.trim().is_empty())
            .count();
        assert_eq!(count, 0);
    }
}
