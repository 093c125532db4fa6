use std::collections::HashSet;

/// 一轮任务内已见过的原始行，跨所有上游源共享，任务结束即丢弃。
///
/// 去重依据是带前缀标记、未解析前的原始文本，逐字节相同才算重复。
#[derive(Debug, Default)]
pub struct SeenSet {
    lines: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 首次见到时登记并返回 `true`，重复时返回 `false`。
    pub fn register(&mut self, raw_line: &str) -> bool {
        if self.lines.contains(raw_line) {
            return false;
        }
        self.lines.insert(raw_line.to_string())
    }

    /// 已登记的不同原始行数。
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register() {
        let mut seen = SeenSet::new();
        assert!(seen.register("- {\"type\":\"ss\"}"));
        assert!(!seen.register("- {\"type\":\"ss\"}"));
        // 前缀不同即视为不同的行
        assert!(seen.register("  {\"type\":\"ss\"}"));
        assert_eq!(seen.line_count(), 2);
    }
}
