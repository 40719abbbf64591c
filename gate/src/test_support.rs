//! Test-only helpers: todo builders, a store that fails on demand, and a
//! scripted judge.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::core::types::{TodoItem, TodoStatus};
use crate::io::judge::{Judge, JudgeRequest, Verdict};
use crate::io::store::{KeyValueStore, MemoryStore, StoreKey};

pub fn completed(content: &str) -> TodoItem {
    TodoItem::new(content, TodoStatus::Completed)
}

pub fn pending(content: &str) -> TodoItem {
    TodoItem::new(content, TodoStatus::Pending)
}

pub fn in_progress(content: &str) -> TodoItem {
    TodoItem::new(content, TodoStatus::InProgress)
}

/// In-memory store whose writes to one key always fail.
#[derive(Debug)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_on: StoreKey,
}

impl FailingStore {
    pub fn failing_on(fail_on: StoreKey) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_on,
        }
    }

    /// Backing store, for seeding and inspecting state.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: StoreKey) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: StoreKey, value: &str) -> Result<()> {
        if key == self.fail_on {
            return Err(anyhow!("simulated write failure for {}", key.file_name()));
        }
        self.inner.set(key, value)
    }

    fn delete(&self, key: StoreKey) -> Result<()> {
        if key == self.fail_on {
            return Err(anyhow!("simulated delete failure for {}", key.file_name()));
        }
        self.inner.delete(key)
    }
}

/// Owned copy of a [`JudgeRequest`] seen by [`ScriptedJudge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub items: Vec<TodoItem>,
    pub previous: Option<Vec<TodoItem>>,
    pub current: Vec<TodoItem>,
}

/// Judge that returns queued verdicts in order and errors once drained.
#[derive(Debug, Default)]
pub struct ScriptedJudge {
    verdicts: RefCell<VecDeque<Verdict>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl ScriptedJudge {
    pub fn new(verdicts: Vec<Verdict>) -> Self {
        Self {
            verdicts: RefCell::new(verdicts.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }
}

impl Judge for ScriptedJudge {
    fn judge(&self, request: &JudgeRequest<'_>) -> Result<Verdict> {
        self.requests.borrow_mut().push(RecordedRequest {
            items: request.items.to_vec(),
            previous: request.previous.map(<[TodoItem]>::to_vec),
            current: request.current.to_vec(),
        });
        self.verdicts
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted judge has no verdict left"))
    }
}
