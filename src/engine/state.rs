//! 翻译引擎状态机

/// 页面当前所处的翻译状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    /// 原文状态，页面未被修改
    Source,
    /// 正在翻译中，持有目标语言代码
    Translating { target: String },
    /// 已翻译为某种语言
    Translated { language: String },
}

impl EngineState {
    /// 当前页面展示的语言；原文和翻译进行中返回 `None`
    pub fn displayed_language(&self) -> Option<&str> {
        match self {
            EngineState::Translated { language } => Some(language),
            _ => None,
        }
    }

    pub fn is_translating(&self) -> bool {
        matches!(self, EngineState::Translating { .. })
    }
}

/// 语言选择操作的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// 页面已翻译为目标语言
    Translated,
    /// 页面已恢复为原文
    Restored,
    /// 目标语言即当前语言，未做任何修改
    AlreadyCurrent,
    /// 已有翻译在进行中，本次请求被拒绝
    Busy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displayed_language() {
        assert_eq!(EngineState::Source.displayed_language(), None);
        assert_eq!(
            EngineState::Translating {
                target: "en".to_string()
            }
            .displayed_language(),
            None
        );
        assert_eq!(
            EngineState::Translated {
                language: "en".to_string()
            }
            .displayed_language(),
            Some("en")
        );
    }
}
