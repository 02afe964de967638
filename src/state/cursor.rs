use serde::Serialize;

/// Derived from the cursor on every transition; never stored elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub current_index: usize,
    pub total_steps: usize,
    pub is_first_step: bool,
    pub is_last_step: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Active,
    Upcoming,
}

/// Position within a fixed sequence of steps. Out-of-range moves are
/// rejected and leave the position unchanged.
#[derive(Debug, Clone)]
pub struct StepCursor {
    current: usize,
    total: usize,
    changes: Vec<NavigationState>,
}

impl StepCursor {
    /// `total` must be at least one; the form model guarantees it.
    pub fn new(total: usize) -> Self {
        Self {
            current: 0,
            total: total.max(1),
            changes: Vec::new(),
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total_steps(&self) -> usize {
        self.total
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.total
    }

    pub fn navigation(&self) -> NavigationState {
        NavigationState {
            current_index: self.current,
            total_steps: self.total,
            is_first_step: self.is_first(),
            is_last_step: self.is_last(),
        }
    }

    pub fn status_at(&self, index: usize) -> StepStatus {
        match index.cmp(&self.current) {
            std::cmp::Ordering::Less => StepStatus::Completed,
            std::cmp::Ordering::Equal => StepStatus::Active,
            std::cmp::Ordering::Greater => StepStatus::Upcoming,
        }
    }

    pub fn goto(&mut self, index: usize) -> bool {
        if index >= self.total {
            return false;
        }
        self.current = index;
        self.changes.push(self.navigation());
        true
    }

    pub fn next(&mut self) -> bool {
        self.goto(self.current + 1)
    }

    pub fn previous(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(index) => self.goto(index),
            None => false,
        }
    }

    /// Re-announces the current position without moving.
    pub fn announce(&mut self) {
        self.changes.push(self.navigation());
    }

    /// Step-change notifications emitted since the last call.
    pub fn take_changes(&mut self) -> Vec<NavigationState> {
        std::mem::take(&mut self.changes)
    }
}
