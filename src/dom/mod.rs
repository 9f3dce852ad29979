//! 文档模型基础设施
//!
//! 基于 html5ever / rcdom 提供解析、序列化、节点操作和显式遍历原语。
//! 翻译引擎只通过本模块访问文档树，便于在无渲染环境下测试。

mod node;
mod parse;
mod walker;

pub use node::{
    append_child, detach_node, find_nodes, get_child_node_by_name, get_node_attr, get_node_name,
    new_element, new_text, parent_element, set_node_attr, set_text_content, subtree_text,
    text_content,
};
pub use parse::{html_to_dom, serialize_dom};
pub use walker::TextWalker;
