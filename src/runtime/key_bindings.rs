use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Enter,
    Tab,
    Esc,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyModifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn key(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn shift(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::SHIFT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    NextStep,
    PreviousStep,
}

#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, NavCommand>,
}

impl KeyBindings {
    /// Enter advances, Shift+Enter goes back.
    pub fn new() -> Self {
        let mut bindings = Self::default();
        bindings.bind(KeyEvent::key(KeyCode::Enter), NavCommand::NextStep);
        bindings.bind(KeyEvent::shift(KeyCode::Enter), NavCommand::PreviousStep);
        bindings
    }

    pub fn bind(&mut self, key: KeyEvent, command: NavCommand) {
        self.bindings.insert(key, command);
    }

    pub fn unbind(&mut self, key: &KeyEvent) {
        self.bindings.remove(key);
    }

    pub fn resolve(&self, event: KeyEvent) -> Option<NavCommand> {
        self.bindings.get(&event).copied()
    }
}
