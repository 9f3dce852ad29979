//! 翻译结果缓存
//!
//! 以「目标语言 + 整批原文」为键的精确匹配缓存，LRU淘汰。
//! 同一批文本重复翻译为同一语言时不再请求翻译服务。

use std::cell::RefCell;
use std::num::NonZeroUsize;

use lru::LruCache;

/// 缓存键：目标语言与批次内容的规范化序列
///
/// 采用长度前缀编码拼接各条文本，避免不同分批方式
/// 拼出相同键。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(target_language: &str, texts: &[String]) -> Self {
        let mut key = String::with_capacity(
            target_language.len() + texts.iter().map(|t| t.len() + 12).sum::<usize>(),
        );
        key.push_str(target_language);
        for text in texts {
            key.push('\u{1}');
            key.push_str(&text.len().to_string());
            key.push('\u{2}');
            key.push_str(text);
        }
        Self(key)
    }
}

/// 缓存统计
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// LRU翻译缓存
pub struct TranslationCache {
    entries: RefCell<LruCache<CacheKey, Vec<String>>>,
    stats: RefCell<CacheStats>,
}

impl TranslationCache {
    /// 创建指定容量的缓存；容量为0时取最小容量1
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RefCell::new(LruCache::new(capacity)),
            stats: RefCell::new(CacheStats::default()),
        }
    }

    /// 查询缓存，命中时返回整批译文的拷贝
    pub fn get(&self, key: &CacheKey) -> Option<Vec<String>> {
        let result = self.entries.borrow_mut().get(key).cloned();
        let mut stats = self.stats.borrow_mut();
        match result {
            Some(_) => stats.hits += 1,
            None => stats.misses += 1,
        }
        result
    }

    /// 写入一批译文
    pub fn put(&self, key: CacheKey, translations: Vec<String>) {
        self.entries.borrow_mut().put(key, translations);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        *self.stats.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = TranslationCache::new(4);
        let key = CacheKey::new("en", &batch(&["こんにちは"]));

        assert!(cache.get(&key).is_none());
        cache.put(key.clone(), batch(&["Hello"]));
        assert_eq!(cache.get(&key), Some(batch(&["Hello"])));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_key_distinguishes_target_language() {
        let texts = batch(&["猫"]);
        assert_ne!(CacheKey::new("en", &texts), CacheKey::new("fr", &texts));
    }

    #[test]
    fn test_key_distinguishes_batch_boundaries() {
        // "ab" + "c" 与 "a" + "bc" 不应撞键
        assert_ne!(
            CacheKey::new("en", &batch(&["ab", "c"])),
            CacheKey::new("en", &batch(&["a", "bc"]))
        );
    }

    #[test]
    fn test_lru_eviction() {
        let cache = TranslationCache::new(2);
        let k1 = CacheKey::new("en", &batch(&["one"]));
        let k2 = CacheKey::new("en", &batch(&["two"]));
        let k3 = CacheKey::new("en", &batch(&["three"]));

        cache.put(k1.clone(), batch(&["1"]));
        cache.put(k2.clone(), batch(&["2"]));
        cache.put(k3.clone(), batch(&["3"]));

        assert!(cache.get(&k1).is_none());
        assert!(cache.get(&k2).is_some());
        assert!(cache.get(&k3).is_some());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let cache = TranslationCache::new(0);
        let key = CacheKey::new("en", &batch(&["x"]));
        cache.put(key.clone(), batch(&["y"]));
        assert_eq!(cache.len(), 1);
    }
}
