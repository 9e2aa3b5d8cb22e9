//! In-memory history stack.

use parking_lot::Mutex;

use crate::ports::History;

#[derive(Debug, Default)]
struct Stack {
    entries: Vec<String>,
    cursor: usize,
}

/// Entries plus a cursor; pushing truncates the forward stack.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    stack: Mutex<Stack>,
}

impl MemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.stack.lock().entries.clone()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.stack.lock().cursor
    }
}

impl History for MemoryHistory {
    fn push(&self, path: &str) {
        let mut stack = self.stack.lock();
        if !stack.entries.is_empty() {
            let keep = stack.cursor + 1;
            stack.entries.truncate(keep);
        }
        stack.entries.push(path.to_string());
        stack.cursor = stack.entries.len() - 1;
    }

    fn replace(&self, path: &str) {
        let mut stack = self.stack.lock();
        let cursor = stack.cursor;
        match stack.entries.get_mut(cursor) {
            Some(entry) => *entry = path.to_string(),
            None => {
                stack.entries.push(path.to_string());
                stack.cursor = 0;
            }
        }
    }

    fn go(&self, delta: i64) -> Option<String> {
        let mut stack = self.stack.lock();
        let target = i64::try_from(stack.cursor).ok()?.checked_add(delta)?;
        let target = usize::try_from(target).ok()?;
        let path = stack.entries.get(target)?.clone();
        stack.cursor = target;
        Some(path)
    }

    fn current(&self) -> Option<String> {
        let stack = self.stack.lock();
        stack.entries.get(stack.cursor).cloned()
    }

    fn len(&self) -> usize {
        self.stack.lock().entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_truncates_forward_entries() {
        let history = MemoryHistory::new();
        history.push("/");
        history.push("/feed");
        history.push("/races/1");

        assert_eq!(history.go(-2).as_deref(), Some("/"));
        history.push("/races/2");

        assert_eq!(history.entries(), vec!["/", "/races/2"]);
        assert_eq!(history.go(1), None);
        assert_eq!(history.current().as_deref(), Some("/races/2"));
    }

    #[test]
    fn test_replace_overwrites_current() {
        let history = MemoryHistory::new();
        history.replace("/");
        history.push("/feed");
        history.replace("/races");

        assert_eq!(history.entries(), vec!["/", "/races"]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_out_of_range_go_keeps_cursor() {
        let history = MemoryHistory::new();
        assert_eq!(history.go(-1), None);
        history.push("/");
        assert_eq!(history.go(-1), None);
        assert_eq!(history.cursor(), 0);
    }
}
