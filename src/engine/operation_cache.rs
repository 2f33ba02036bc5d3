// ==========================================
// ERP 报表核心 - 操作目录缓存
// ==========================================
// 操作 code → Operation 的查找缓存
// 约束: 单一 RwLock 保护; 无主动过期, 仅显式 clear 失效
// 红线: 作为对象注入使用, 不做模块级全局状态
// ==========================================

use crate::domain::operation::Operation;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct OperationCache {
    entries: RwLock<HashMap<String, Operation>>,
}

impl OperationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: &str) -> Option<Operation> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(code).cloned()
    }

    pub fn set(&self, operation: Operation) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(operation.code.clone(), operation);
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(id: i64, code: &str) -> Operation {
        Operation {
            id,
            code: code.to_string(),
            name: code.to_lowercase(),
            description: None,
        }
    }

    #[test]
    fn test_set_get_clear() {
        let cache = OperationCache::new();
        assert!(cache.get("REPORT_VIEW").is_none());

        cache.set(op(1, "REPORT_VIEW"));
        cache.set(op(2, "REPORT_EXPORT"));
        assert_eq!(cache.get("REPORT_VIEW").map(|o| o.id), Some(1));
        assert_eq!(cache.len(), 2);

        cache.set(op(3, "REPORT_VIEW"));
        assert_eq!(cache.get("REPORT_VIEW").map(|o| o.id), Some(3));

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("REPORT_EXPORT").is_none());
    }
}
