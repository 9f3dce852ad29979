//! 页面翻译引擎
//!
//! 把提取、快照、缓存、变更监听和翻译服务串成一个
//! 单线程协作式的状态机。引擎持有 DOM 的非拥有引用，
//! 所有修改都在单一控制流上完成。

mod cache;
mod extractor;
mod snapshot;
mod state;
mod ui;
mod watcher;

pub use cache::{CacheKey, CacheStats, TranslationCache};
pub use extractor::{extract_translatable, TranslatableNode};
pub use snapshot::OriginalState;
pub use state::{EngineState, SelectOutcome};
pub use ui::WidgetUi;
pub use watcher::{MutationWatcher, WatchEvent, WatcherHandle};

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use markup5ever_rcdom::{Handle, RcDom};
use tokio::sync::mpsc::error::TryRecvError;

use crate::config::WidgetConfig;
use crate::dom::set_text_content;
use crate::error::{EngineError, EngineResult};
use crate::provider::{Language, TranslationProvider};

/// 页面翻译引擎
///
/// 持有 DOM 引用，因此不可跨线程移动；翻译服务通过
/// [`TranslationProvider`] 注入。
pub struct PageTranslator {
    document: Handle,
    config: WidgetConfig,
    provider: Arc<dyn TranslationProvider>,
    state: RefCell<EngineState>,
    originals: RefCell<OriginalState>,
    cache: TranslationCache,
    languages: RefCell<Option<Vec<Language>>>,
    ui: WidgetUi,
    watcher: MutationWatcher,
    destroyed: Cell<bool>,
}

impl PageTranslator {
    /// 初始化引擎：注入控件、提取文本并建立原文快照
    pub fn new(
        dom: &RcDom,
        config: WidgetConfig,
        provider: Arc<dyn TranslationProvider>,
    ) -> EngineResult<Self> {
        let ui = WidgetUi::inject(dom, crate::config::constants::WIDGET_CONTAINER_ID)?;

        let nodes = extract_translatable(&dom.document, &config.skip_elements, ui.container_id());
        let originals = OriginalState::capture(&nodes);
        tracing::info!(
            widget_id = %config.widget_id,
            nodes = originals.len(),
            "翻译引擎初始化完成"
        );

        let cache = TranslationCache::new(config.cache_capacity);

        Ok(Self {
            document: dom.document.clone(),
            config,
            provider,
            state: RefCell::new(EngineState::Source),
            originals: RefCell::new(originals),
            cache,
            languages: RefCell::new(None),
            ui,
            watcher: MutationWatcher::new(),
            destroyed: Cell::new(false),
        })
    }

    /// 当前状态的快照
    pub fn state(&self) -> EngineState {
        self.state.borrow().clone()
    }

    /// 缓存统计
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// 供宿主上报DOM变更的句柄
    pub fn watcher_handle(&self) -> WatcherHandle {
        self.watcher.handle()
    }

    /// 获取可用语言列表
    ///
    /// 成功结果会被缓存并填入控件菜单；失败不落缓存，
    /// 下次调用会重新请求。
    pub async fn languages(&self) -> EngineResult<Vec<Language>> {
        let cached = self.languages.borrow().clone();
        if let Some(list) = cached {
            return Ok(list);
        }

        let fetched = self.provider.list_languages().await?;
        self.ui.populate_menu(&fetched);
        *self.languages.borrow_mut() = Some(fetched.clone());
        Ok(fetched)
    }

    /// 用户选择语言
    ///
    /// 选择源语言或空代码时恢复原文；翻译进行中时拒绝
    /// 本次请求而不是排队。
    pub async fn select_language(&self, code: &str) -> EngineResult<SelectOutcome> {
        if self.destroyed.get() {
            return Err(EngineError::Destroyed);
        }
        if self.state.borrow().is_translating() {
            return Ok(SelectOutcome::Busy);
        }

        if code.is_empty() || code == self.config.source_language {
            if matches!(*self.state.borrow(), EngineState::Source) {
                return Ok(SelectOutcome::AlreadyCurrent);
            }
            self.originals.borrow().restore();
            *self.state.borrow_mut() = EngineState::Source;
            tracing::info!("已恢复原文");
            return Ok(SelectOutcome::Restored);
        }

        let languages = self.languages().await?;
        if !languages.iter().any(|l| l.code == code) {
            return Err(EngineError::InvalidLanguage(code.to_string()));
        }

        // 获取语言列表期间控制权可能被让出，重新检查守卫
        if self.state.borrow().is_translating() {
            return Ok(SelectOutcome::Busy);
        }
        if self.state.borrow().displayed_language() == Some(code) {
            return Ok(SelectOutcome::AlreadyCurrent);
        }

        self.translate_page(code).await?;
        Ok(SelectOutcome::Translated)
    }

    /// 驱动循环：消费变更事件，防抖合并后触发重翻译
    ///
    /// 在独立任务中运行，`destroy` 或通道关闭时退出。
    pub async fn drive(&self) {
        let Some(mut rx) = self.watcher.take_receiver() else {
            return;
        };

        while let Some(event) = rx.recv().await {
            match event {
                WatchEvent::Shutdown => break,
                WatchEvent::Inserted => {
                    tokio::time::sleep(self.config.debounce_window()).await;

                    // 吸收防抖窗口内积压的事件
                    loop {
                        match rx.try_recv() {
                            Ok(WatchEvent::Inserted) => continue,
                            Ok(WatchEvent::Shutdown) => return,
                            Err(TryRecvError::Disconnected) => return,
                            Err(TryRecvError::Empty) => break,
                        }
                    }

                    if self.destroyed.get() {
                        break;
                    }

                    let target = match &*self.state.borrow() {
                        EngineState::Translated { language } => language.clone(),
                        // 原文状态下无需处理；翻译进行中的变更由下次事件重试
                        _ => continue,
                    };

                    if let Err(e) = self.translate_page(&target).await {
                        // 新插入内容保持未翻译，等待下次变更或手动重选
                        tracing::warn!("变更触发的重翻译失败: {}", e);
                    }
                }
            }
        }
    }

    /// 销毁引擎：停止驱动循环并移除注入的控件
    ///
    /// 返回后不会再有翻译写入页面。
    pub fn destroy(&self) {
        self.destroyed.set(true);
        self.watcher.disconnect();
        self.ui.remove();
        tracing::info!(widget_id = %self.config.widget_id, "翻译引擎已销毁");
    }

    /// 带守卫的整页翻译，失败时回退到进入前的状态
    async fn translate_page(&self, target: &str) -> EngineResult<()> {
        let previous = self.state.borrow().clone();
        *self.state.borrow_mut() = EngineState::Translating {
            target: target.to_string(),
        };

        let result = self.run_translation(target).await;

        match result {
            Ok(()) => {
                *self.state.borrow_mut() = EngineState::Translated {
                    language: target.to_string(),
                };
                Ok(())
            }
            Err(e) => {
                *self.state.borrow_mut() = previous;
                Err(e)
            }
        }
    }

    /// 执行一次完整的提取、查缓存、翻译、写回流程
    ///
    /// 借用不跨越 await 点：节点与原文先收集为自有数据，
    /// 网络调用返回后再写回DOM。
    async fn run_translation(&self, target: &str) -> EngineResult<()> {
        let pairs: Vec<(Handle, String)> = {
            let nodes = extract_translatable(
                &self.document,
                &self.config.skip_elements,
                self.ui.container_id(),
            );
            let mut originals = self.originals.borrow_mut();
            let added = originals.absorb(&nodes);
            if added > 0 {
                tracing::debug!("快照新增 {} 个节点", added);
            }
            nodes
                .iter()
                .map(|n| {
                    let original = originals
                        .original_of(&n.node)
                        .unwrap_or(n.text.as_str())
                        .to_string();
                    (n.node.clone(), original)
                })
                .collect()
        };

        // 批次为空或全为空白时直接视为完成
        if pairs.iter().all(|(_, t)| t.trim().is_empty()) {
            return Ok(());
        }

        let texts: Vec<String> = pairs.iter().map(|(_, t)| t.clone()).collect();
        let key = CacheKey::new(target, &texts);

        if let Some(translations) = self.cache.get(&key) {
            tracing::debug!("缓存命中: {} 条 -> {}", texts.len(), target);
            apply_translations(&pairs, &translations);
            return Ok(());
        }

        let translations = self
            .provider
            .translate_batch(&texts, target, &self.config.source_language)
            .await?;

        // 等待期间引擎可能已被销毁，销毁后不再写入页面
        if self.destroyed.get() {
            return Err(EngineError::Destroyed);
        }

        if translations.len() != texts.len() {
            return Err(EngineError::TranslationFailed(format!(
                "译文数量不匹配: 期望 {} 条, 收到 {} 条",
                texts.len(),
                translations.len()
            )));
        }

        apply_translations(&pairs, &translations);
        self.cache.put(key, translations);
        Ok(())
    }
}

/// 将译文写回节点；空译文回退为原文
fn apply_translations(pairs: &[(Handle, String)], translations: &[String]) {
    for ((node, original), translated) in pairs.iter().zip(translations) {
        if translated.trim().is_empty() {
            set_text_content(node, original);
        } else {
            set_text_content(node, translated);
        }
    }
}
