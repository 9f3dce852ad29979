//! 可翻译文本提取器
//!
//! 按文档顺序收集页面中的文本节点，跳过脚本、样式等
//! 不应翻译的区域以及翻译控件自身。

use markup5ever_rcdom::Handle;

use crate::dom::{get_node_attr, get_node_name, parent_element, text_content, TextWalker};

/// 一个待翻译的文本节点及其当前文本
#[derive(Clone)]
pub struct TranslatableNode {
    pub node: Handle,
    pub text: String,
}

/// 判断文本节点是否位于被排除的区域内
///
/// 从最近的元素祖先向上查找，命中排除标签或翻译控件容器
/// 即排除。
fn is_excluded(node: &Handle, skip_elements: &[String], container_id: &str) -> bool {
    let mut current = parent_element(node);

    while let Some(element) = current {
        if let Some(name) = get_node_name(&element) {
            if skip_elements.iter().any(|s| s == name) {
                return true;
            }
        }

        if get_node_attr(&element, "id").as_deref() == Some(container_id) {
            return true;
        }

        current = parent_element(&element);
    }

    false
}

/// 提取根节点下所有可翻译的文本节点
///
/// 纯空白文本被丢弃，返回顺序为文档顺序。
pub fn extract_translatable(
    root: &Handle,
    skip_elements: &[String],
    container_id: &str,
) -> Vec<TranslatableNode> {
    TextWalker::new(root)
        .filter_map(|node| {
            let text = text_content(&node)?;
            if text.trim().is_empty() {
                return None;
            }
            if is_excluded(&node, skip_elements, container_id) {
                return None;
            }
            Some(TranslatableNode { node, text })
        })
        .collect()
}
