//! # 会话历史
//!
//! - [`HistoryPort`] 是与浏览器历史（或任意宿主历史栈）对接的出口，导航器只在提交时调用它；
//! - [`SessionHistory`] 是导航器内部的有界历史，每个条目只保存路径与屏幕；
//!   回退/前进在当前会话下重新解析该路径，链路参数由命中路由的参数重新得到。

use std::collections::VecDeque;

use lodge_core::ScreenId;

/// 宿主历史栈的写入口。
///
/// # 教案式说明
/// - **契约 (What)**：`push` 追加新条目，`replace` 覆盖当前条目；导航器保证只在提交成功后调用；
/// - **风险 (Trade-offs)**：端口不回传错误，宿主写入失败不会回滚已提交的导航。
pub trait HistoryPort {
    fn push(&mut self, path: &str);
    fn replace(&mut self, path: &str);
}

/// 无宿主历史时使用的空实现。
impl HistoryPort for () {
    fn push(&mut self, _path: &str) {}

    fn replace(&mut self, _path: &str) {}
}

/// 记录到的一次宿主历史写入。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryOp {
    Push(String),
    Replace(String),
}

/// 把所有写入记录下来的端口，便于测试与命令行回放。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingHistory {
    ops: Vec<HistoryOp>,
}

impl RecordingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[HistoryOp] {
        &self.ops
    }

    pub fn last(&self) -> Option<&HistoryOp> {
        self.ops.last()
    }
}

impl HistoryPort for RecordingHistory {
    fn push(&mut self, path: &str) {
        self.ops.push(HistoryOp::Push(path.to_owned()));
    }

    fn replace(&mut self, path: &str) {
        self.ops.push(HistoryOp::Replace(path.to_owned()));
    }
}

/// 一条已提交的历史条目。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    path: String,
    screen: ScreenId,
}

impl HistoryEntry {
    pub(crate) fn new(path: String, screen: ScreenId) -> Self {
        Self { path, screen }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn screen(&self) -> &ScreenId {
        &self.screen
    }
}

/// 有界的线性历史，游标之后的条目在新的 `push` 时被截断。
#[derive(Debug)]
pub(crate) struct SessionHistory {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    limit: usize,
}

impl SessionHistory {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    pub(crate) fn push(&mut self, entry: HistoryEntry) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(entry);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    /// 覆盖当前条目；历史为空时等同于 `push`。
    pub(crate) fn replace(&mut self, entry: HistoryEntry) {
        match self.entries.get_mut(self.cursor) {
            Some(slot) => *slot = entry,
            None => self.push(entry),
        }
    }

    /// 游标偏移 `step` 处的条目。
    pub(crate) fn neighbour(&self, step: isize) -> Option<(usize, &HistoryEntry)> {
        let index = self.cursor.checked_add_signed(step)?;
        self.entries.get(index).map(|entry| (index, entry))
    }

    /// 移动游标到 `index` 并以重新解析的结果覆盖该条目。
    pub(crate) fn restore(&mut self, index: usize, entry: HistoryEntry) {
        if let Some(slot) = self.entries.get_mut(index) {
            *slot = entry;
            self.cursor = index;
        }
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> HistoryEntry {
        HistoryEntry::new(path.to_owned(), ScreenId::new(path.to_owned()))
    }

    fn paths(history: &SessionHistory) -> Vec<&str> {
        history.entries().map(HistoryEntry::path).collect()
    }

    #[test]
    fn push_after_back_truncates_the_forward_branch() {
        let mut history = SessionHistory::new(8);
        for path in ["/a", "/b", "/c"] {
            history.push(entry(path));
        }
        let (index, _) = history.neighbour(-1).expect("可回退");
        history.restore(index, entry("/b"));
        history.push(entry("/d"));

        assert_eq!(paths(&history), ["/a", "/b", "/d"]);
        assert!(history.neighbour(1).is_none());
        assert_eq!(history.cursor(), 2);
    }

    #[test]
    fn restore_overwrites_the_entry_and_moves_the_cursor() {
        let mut history = SessionHistory::new(8);
        for path in ["/a", "/b", "/c"] {
            history.push(entry(path));
        }
        history.restore(0, HistoryEntry::new("/a".to_owned(), ScreenId::new("Elsewhere")));

        assert_eq!(history.cursor(), 0);
        let (_, current) = history.neighbour(0).expect("游标处有条目");
        assert_eq!(current.screen().as_str(), "Elsewhere");
        assert_eq!(paths(&history), ["/a", "/b", "/c"]);

        history.restore(9, entry("/z"));
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn oldest_entries_fall_off_at_the_limit() {
        let mut history = SessionHistory::new(2);
        for path in ["/a", "/b", "/c"] {
            history.push(entry(path));
        }
        assert_eq!(paths(&history), ["/b", "/c"]);
        assert_eq!(history.cursor(), 1);
        assert!(history.neighbour(-2).is_none());
    }

    #[test]
    fn recording_port_keeps_every_write() {
        let mut port = RecordingHistory::new();
        port.push("/Home");
        port.replace("/Login");
        assert_eq!(
            port.ops(),
            [
                HistoryOp::Push("/Home".into()),
                HistoryOp::Replace("/Login".into())
            ]
        );
    }
}
