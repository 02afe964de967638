use crate::config::FormConfig;
use crate::core::{FieldKind, FormDefinition, FormModel, RawValue, SelectedFile};
use crate::error::{FormError, SubmitError};
use crate::persist::{PersistenceStore, Storage};
use crate::query::QueryParams;
use crate::runtime::{Clock, FormSignal, KeyBindings, KeyEvent, NavCommand};
use crate::state::cursor::{NavigationState, StepCursor, StepStatus};
use crate::state::validation::ValidationState;
use crate::validation::{StepValidator, ValidationResult};

/// Coordinates the step cursor, the validator and the persistence store.
/// Forward movement is gated on validation; backward movement never is.
pub struct FormController {
    form: FormModel,
    config: FormConfig,
    cursor: StepCursor,
    validator: StepValidator,
    persistence: Option<PersistenceStore>,
    clock: Box<dyn Clock>,
    key_bindings: KeyBindings,
    signals: Vec<FormSignal>,
    started: bool,
    initialized: bool,
    submitted: bool,
}

impl FormController {
    pub fn new(
        form: FormModel,
        config: FormConfig,
        storage: Box<dyn Storage>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let validator = StepValidator::for_form(&form, &config);
        let persistence = config.persistence.then(|| {
            PersistenceStore::new(config.storage_key(form.id()), storage, &config)
        });
        Self {
            cursor: StepCursor::new(form.step_count()),
            form,
            config,
            validator,
            persistence,
            clock,
            key_bindings: KeyBindings::new(),
            signals: Vec::new(),
            started: false,
            initialized: false,
            submitted: false,
        }
    }

    pub fn from_definition(
        definition: FormDefinition,
        storage: Box<dyn Storage>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, FormError> {
        let (form, config) = definition.into_parts()?;
        Ok(Self::new(form, config, storage, clock))
    }

    /// Restores saved progress, applies query parameters, announces the
    /// starting step and starts the autosave timer. Restoration and query
    /// handling run on the first start only; later starts restart timers.
    pub fn start(&mut self, query: Option<&QueryParams>) {
        if self.started {
            return;
        }
        let now = self.clock.now_ms();
        if !self.initialized {
            self.initialize(query, now);
        }

        if let Some(store) = self.persistence.as_mut() {
            store.start(now);
        }
        self.started = true;
        tracing::info!(form = %self.form.id(), step = self.cursor.current_index(), "form started");
    }

    fn initialize(&mut self, query: Option<&QueryParams>, now: u64) {
        self.initialized = true;

        let restored = self
            .persistence
            .as_mut()
            .and_then(|store| store.restore(&mut self.form, now));
        if let Some(restored) = restored {
            self.signals.push(FormSignal::ProgressRestored {
                timestamp: restored.timestamp,
            });
        }

        if self.config.prefill
            && let Some(query) = query
        {
            let changed = query.prefill(&mut self.form);
            tracing::debug!(fields = changed.len(), "prefilled from query parameters");
        }

        self.cursor.announce();
        self.flush_cursor();

        if let Some(restored) = restored
            && restored.step > 0
        {
            self.go_to_step(restored.step);
        }
        if let Some(step) = query.and_then(QueryParams::step_index) {
            self.go_to_step(step);
        }
    }

    /// Cancels the periodic and debounce timers.
    pub fn stop(&mut self) {
        if let Some(store) = self.persistence.as_mut() {
            store.stop();
        }
        self.started = false;
    }

    pub fn destroy(&mut self) {
        self.stop();
        self.validator.clear_all();
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn form(&self) -> &FormModel {
        &self.form
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn navigation(&self) -> NavigationState {
        self.cursor.navigation()
    }

    pub fn current_step(&self) -> usize {
        self.cursor.current_index()
    }

    pub fn step_status(&self, index: usize) -> StepStatus {
        self.cursor.status_at(index)
    }

    pub fn validation(&self) -> &ValidationState {
        self.validator.state()
    }

    pub fn persistence(&self) -> Option<&PersistenceStore> {
        self.persistence.as_ref()
    }

    pub fn key_bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.key_bindings
    }

    /// Registers a rule for this form only, replacing any rule of the
    /// same name.
    pub fn add_rule<F>(&mut self, name: impl Into<String>, rule: F)
    where
        F: Fn(RawValue<'_>, Option<&str>) -> ValidationResult + Send + Sync + 'static,
    {
        self.validator.registry_mut().register(name, rule);
    }

    /// Validates the current step and advances when it passes. A no-op on
    /// the last step.
    pub fn next_step(&mut self) -> bool {
        if self.cursor.is_last() {
            return false;
        }
        let leaving = self.cursor.current_index();
        if !self.validator.validate_step(&self.form, leaving) {
            tracing::debug!(step = leaving, "step invalid; staying");
            return false;
        }
        if !self.cursor.next() {
            return false;
        }
        self.flush_cursor();
        self.save_progress();
        self.signals.push(FormSignal::StepCompleted { step: leaving });
        true
    }

    pub fn previous_step(&mut self) -> bool {
        if !self.cursor.previous() {
            return false;
        }
        self.flush_cursor();
        self.save_progress();
        true
    }

    /// Jumps toward `target`, landing on the first earlier step that fails
    /// validation. Returns the step landed on, or `None` when `target` is
    /// out of range.
    pub fn go_to_step(&mut self, target: usize) -> Option<usize> {
        if target >= self.cursor.total_steps() {
            tracing::debug!(target, "ignoring out-of-range step request");
            return None;
        }
        let landing = (0..target)
            .find(|&index| !self.validator.validate_step(&self.form, index))
            .unwrap_or(target);
        self.cursor.goto(landing);
        self.flush_cursor();
        Some(landing)
    }

    /// Accepts the form only on the last step with every step valid. On
    /// success the timers stop, the snapshot is cleared and `FormValid` is
    /// emitted. Nothing is saved again until `reset`.
    pub fn submit(&mut self) -> Result<(), SubmitError> {
        let message = self.config.messages.submit_blocked.clone();
        let rejection = if !self.cursor.is_last() {
            Some(SubmitError::NotOnLastStep { message })
        } else if !self.validator.validate_all_steps(&self.form) {
            Some(SubmitError::Invalid { message })
        } else {
            None
        };

        if let Some(rejection) = rejection {
            tracing::debug!(reason = ?rejection, "submission rejected");
            self.signals.push(FormSignal::SubmissionRejected {
                message: rejection.message().to_string(),
            });
            return Err(rejection);
        }

        self.stop();
        self.submitted = true;
        self.discard_progress();
        self.signals.push(FormSignal::FormValid);
        tracing::info!(form = %self.form.id(), "form submitted");
        Ok(())
    }

    /// Restores initial values, clears marks and saved progress, and
    /// returns to the first step.
    pub fn reset(&mut self) {
        self.submitted = false;
        self.form.reset();
        self.validator.clear_all();
        self.discard_progress();
        self.cursor.goto(0);
        self.flush_cursor();
    }

    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> Result<(), FormError> {
        let kind = self.form.set_value(id, value)?.kind;
        self.after_input(id, kind);
        Ok(())
    }

    pub fn set_checked(&mut self, id: &str, checked: bool) -> Result<(), FormError> {
        let kind = self.form.set_checked(id, checked)?.kind;
        self.after_input(id, kind);
        Ok(())
    }

    pub fn set_files(&mut self, id: &str, files: Vec<SelectedFile>) -> Result<(), FormError> {
        let kind = self.form.set_files(id, files)?.kind;
        self.after_input(id, kind);
        Ok(())
    }

    /// Validates one field when it loses focus.
    pub fn blur(&mut self, id: &str) -> Result<bool, FormError> {
        if self.form.field(id).is_none() {
            return Err(FormError::UnknownField(id.to_string()));
        }
        Ok(self.validator.validate_field(&self.form, id))
    }

    /// Returns whether the key was bound to a navigation command.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if !self.config.keyboard_navigation {
            return false;
        }
        match self.key_bindings.resolve(key) {
            Some(NavCommand::NextStep) => {
                self.next_step();
                true
            }
            Some(NavCommand::PreviousStep) => {
                self.previous_step();
                true
            }
            None => false,
        }
    }

    /// Runs due timers. Any number of due timers results in one save.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now_ms();
        let Some(store) = self.persistence.as_mut() else {
            return false;
        };
        let due = store.due(now);
        if due.is_empty() {
            return false;
        }
        tracing::trace!(?due, "timers fired");
        self.save_progress()
    }

    /// Best-effort synchronous save before the page goes away.
    pub fn unload(&mut self) -> bool {
        self.save_progress()
    }

    pub fn save_progress(&mut self) -> bool {
        if self.submitted {
            return false;
        }
        let Some(store) = self.persistence.as_mut() else {
            return false;
        };
        let now = self.clock.now_ms();
        let saved = store.save(&self.form, self.cursor.current_index(), now);
        if saved {
            self.signals.push(FormSignal::ProgressSaved);
        }
        saved
    }

    pub fn drain_signals(&mut self) -> Vec<FormSignal> {
        std::mem::take(&mut self.signals)
    }

    fn after_input(&mut self, id: &str, kind: FieldKind) {
        self.validator.clear_error(id);
        if let Some(store) = self.persistence.as_mut() {
            store.on_input(kind, self.clock.now_ms());
        }
    }

    fn discard_progress(&mut self) {
        if let Some(store) = self.persistence.as_mut() {
            store.cancel_pending_input();
            store.clear();
        }
    }

    fn flush_cursor(&mut self) {
        for change in self.cursor.take_changes() {
            self.signals.push(FormSignal::StepChanged(change));
            if self.config.auto_scroll {
                self.signals.push(FormSignal::ScrollToTop);
            }
        }
    }
}
