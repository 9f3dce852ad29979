//! 翻译控件注入
//!
//! 在页面中注入翻译按钮与语言菜单的容器，容器自身
//! 被提取器排除，不参与翻译。

use std::cell::RefCell;

use markup5ever_rcdom::{Handle, RcDom};

use crate::dom::{
    append_child, detach_node, find_nodes, get_child_node_by_name, new_element, new_text,
};
use crate::error::{EngineError, EngineResult};
use crate::provider::Language;

/// 页面内的翻译控件
pub struct WidgetUi {
    container: RefCell<Option<Handle>>,
    container_id: String,
}

impl WidgetUi {
    /// 在文档 body 尾部注入控件容器
    pub fn inject(dom: &RcDom, container_id: &str) -> EngineResult<Self> {
        let body = find_nodes(&dom.document, &["html", "body"])
            .first()
            .cloned()
            .ok_or_else(|| EngineError::Parse("文档缺少 body 元素".to_string()))?;

        let container = new_element("div", &[("id", container_id), ("class", "wt-widget")]);

        let toggle = new_element("button", &[("type", "button"), ("class", "wt-toggle")]);
        append_child(&toggle, &new_text("翻訳"));
        append_child(&container, &toggle);

        let menu = new_element("ul", &[("class", "wt-menu"), ("hidden", "")]);
        append_child(&container, &menu);

        append_child(&body, &container);

        Ok(Self {
            container: RefCell::new(Some(container)),
            container_id: container_id.to_string(),
        })
    }

    /// 用可用语言填充菜单，原文选项排在最前
    pub fn populate_menu(&self, languages: &[Language]) {
        let container = self.container.borrow();
        let Some(container) = container.as_ref() else {
            return;
        };

        let Some(menu) = get_child_node_by_name(container, "ul") else {
            return;
        };

        for child in menu.children.borrow().iter() {
            child.parent.set(None);
        }
        menu.children.borrow_mut().clear();

        let original = new_element("li", &[("class", "wt-item"), ("data-lang", "")]);
        append_child(&original, &new_text("原文"));
        append_child(&menu, &original);

        for language in languages {
            let item = new_element(
                "li",
                &[("class", "wt-item"), ("data-lang", language.code.as_str())],
            );
            append_child(&item, &new_text(&language.name));
            append_child(&menu, &item);
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// 将控件从页面移除
    pub fn remove(&self) {
        if let Some(container) = self.container.borrow_mut().take() {
            detach_node(&container);
        }
    }
}
