use crate::model::{ProxyRecord, RunSummary};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// 运行结果缓存。
///
/// 每个字段都在一次写锁内整体替换，读者要么看到旧值要么看到新值，
/// 不会读到写了一半的字段。发布过程中“新计数 + 旧文本”的组合是允许的。
#[derive(Debug, Default)]
pub struct RunCache {
    lists: RwLock<HashMap<String, Vec<ProxyRecord>>>,
    texts: RwLock<HashMap<String, String>>,
    summary: RwLock<RunSummary>,
}

impl RunCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn get_list(&self, key: &str) -> Option<Vec<ProxyRecord>> {
        let store = self.lists.read().unwrap_or_else(PoisonError::into_inner);
        store.get(key).cloned()
    }

    pub fn set_list(&self, key: &str, list: Vec<ProxyRecord>) {
        let mut store = self.lists.write().unwrap_or_else(PoisonError::into_inner);
        store.insert(key.to_string(), list);
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn get_text(&self, key: &str) -> Option<String> {
        let store = self.texts.read().unwrap_or_else(PoisonError::into_inner);
        store.get(key).cloned()
    }

    pub fn set_text(&self, key: &str, text: String) {
        let mut store = self.texts.write().unwrap_or_else(PoisonError::into_inner);
        store.insert(key.to_string(), text);
    }

    /// 返回当前快照的副本。
    pub fn summary(&self) -> RunSummary {
        self.summary
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update_summary(&self, f: impl FnOnce(&mut RunSummary)) {
        let mut summary = self.summary.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut summary);
    }
}

// 全局唯一缓存实例
pub static CACHE: Lazy<Arc<RunCache>> = Lazy::new(|| Arc::new(RunCache::new()));
