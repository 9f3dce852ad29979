//! 节点操作辅助函数

use std::cell::RefCell;
use std::rc::Rc;

use html5ever::interface::{Attribute, QualName};
use html5ever::tendril::StrTendril;
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData};

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 设置节点属性；`attr_value` 为 `None` 时删除该属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.clone() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value.as_str());
                } else {
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value {
                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: StrTendril::from_slice(&attr_value),
                });
            }
        }
    };
}

/// 获取元素节点的标签名
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取最近的元素父节点
pub fn parent_element(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent.filter(|p| matches!(p.data, NodeData::Element { .. }))
}

/// 获取文本节点内容
pub fn text_content(node: &Handle) -> Option<String> {
    match node.data {
        NodeData::Text { ref contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 覆写文本节点内容
pub fn set_text_content(node: &Handle, text: &str) {
    if let NodeData::Text { ref contents } = node.data {
        let mut content_ref = contents.borrow_mut();
        content_ref.clear();
        content_ref.push_slice(text);
    }
}

/// 拼接子树内的全部文本
pub fn subtree_text(node: &Handle) -> String {
    let mut out = String::new();
    collect_subtree_text(node, &mut out);
    out
}

fn collect_subtree_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { ref contents } = node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_subtree_text(child, out);
    }
}

/// 查找指定标签路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: &[&str]) -> Vec<Handle> {
    assert!(!node_names.is_empty());

    let mut found_nodes = Vec::new();
    let node_name = node_names[0];

    if node_names.len() == 1 {
        if get_node_name(node) == Some(node_name) {
            found_nodes.push(node.clone());
        }

        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names));
        }
    } else if get_node_name(node) == Some(node_name) {
        found_nodes.append(&mut find_nodes(node, &node_names[1..]));
    } else {
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names));
        }
    }

    found_nodes
}

/// 根据标签名获取直接子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    children
        .iter()
        .find(|child| get_node_name(child) == Some(node_name))
        .cloned()
}

/// 创建元素节点
pub fn new_element(tag: &str, attributes: &[(&str, &str)]) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(
            attributes
                .iter()
                .map(|(name, value)| Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(*name)),
                    value: StrTendril::from_slice(value),
                })
                .collect(),
        ),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// 创建文本节点
pub fn new_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

/// 将子节点挂到父节点末尾，并维护父指针
pub fn append_child(parent: &Handle, child: &Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child.clone());
}

/// 将节点从其父节点摘除
pub fn detach_node(node: &Handle) {
    if let Some(weak) = node.parent.take() {
        if let Some(parent) = weak.upgrade() {
            parent
                .children
                .borrow_mut()
                .retain(|c| !Rc::ptr_eq(c, node));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::html_to_dom;

    #[test]
    fn test_attr_get_set_remove() {
        let el = new_element("div", &[("id", "a")]);
        assert_eq!(get_node_attr(&el, "id"), Some("a".to_string()));

        set_node_attr(&el, "id", Some("b".to_string()));
        assert_eq!(get_node_attr(&el, "id"), Some("b".to_string()));

        set_node_attr(&el, "data-x", Some("1".to_string()));
        assert_eq!(get_node_attr(&el, "data-x"), Some("1".to_string()));

        set_node_attr(&el, "id", None);
        assert_eq!(get_node_attr(&el, "id"), None);
    }

    #[test]
    fn test_text_content_replacement() {
        let text = new_text("こんにちは");
        assert_eq!(text_content(&text), Some("こんにちは".to_string()));
        set_text_content(&text, "Hello");
        assert_eq!(text_content(&text), Some("Hello".to_string()));
    }

    #[test]
    fn test_append_and_detach() {
        let parent = new_element("div", &[]);
        let child = new_text("x");
        append_child(&parent, &child);
        assert_eq!(parent.children.borrow().len(), 1);
        assert!(parent_element(&child).is_some());

        detach_node(&child);
        assert!(parent.children.borrow().is_empty());
    }

    #[test]
    fn test_parent_element_from_parsed_document() {
        let dom = html_to_dom(b"<html><body><p>text</p></body></html>", "UTF-8").unwrap();
        let p = find_nodes(&dom.document, &["html", "body", "p"])
            .first()
            .cloned()
            .unwrap();
        let text = p.children.borrow().first().cloned().unwrap();
        let parent = parent_element(&text).unwrap();
        assert_eq!(get_node_name(&parent), Some("p"));
        // parent_element 不应清掉父指针
        assert!(parent_element(&text).is_some());
    }

    #[test]
    fn test_subtree_text() {
        let dom = html_to_dom(b"<div><p>a</p><span>b</span></div>", "UTF-8").unwrap();
        assert_eq!(subtree_text(&dom.document).trim(), "ab");
    }
}
