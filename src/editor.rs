//! Add/edit form: the two-state edit controller and the shared name/value fields.

use tracing::debug;

use crate::config::Theme;
use crate::record::{RecordError, RecordStore};
use crate::widgets::text_input::TextInput;

/// Which record, if any, the form is editing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Adding,
    Editing(usize),
}

/// Focus inside the form. `Cancel` only exists while editing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    #[default]
    Name,
    Value,
    Submit,
    Cancel,
}

pub struct EditController {
    mode: EditMode,
    pub focus: FormFocus,
    pub name_input: TextInput,
    pub value_input: TextInput,
}

impl EditController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.set_theme(theme);
        self
    }

    pub fn set_theme(&mut self, theme: &Theme) {
        self.name_input.set_theme(theme);
        self.value_input.set_theme(theme);
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn editing_index(&self) -> Option<usize> {
        match self.mode {
            EditMode::Adding => None,
            EditMode::Editing(i) => Some(i),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, EditMode::Editing(_))
    }

    pub fn name(&self) -> &str {
        self.name_input.value()
    }

    pub fn value(&self) -> &str {
        self.value_input.value()
    }

    /// Fill both fields, as if typed.
    pub fn set_fields(&mut self, name: &str, value: &str) {
        self.name_input.set_value(name.to_string());
        self.value_input.set_value(value.to_string());
    }

    pub fn clear_fields(&mut self) {
        self.name_input.clear();
        self.value_input.clear();
    }

    /// Enter `Editing(index)` with the fields pre-filled from the record.
    /// Ignored when `index` does not exist.
    pub fn begin_edit(&mut self, index: usize, store: &RecordStore) {
        let Some(record) = store.get(index) else {
            return;
        };
        let name = record.name.clone();
        let value = record.value.to_string();
        self.set_fields(&name, &value);
        self.mode = EditMode::Editing(index);
        self.set_focus(FormFocus::Name);
        debug!(index, "edit started");
    }

    /// Write the fields back to the record being edited. On success the form
    /// returns to `Adding` and is cleared; on a validation failure nothing changes.
    pub fn save(&mut self, store: &mut RecordStore) -> Result<(), RecordError> {
        let EditMode::Editing(index) = self.mode else {
            return Ok(());
        };
        store.update(index, self.name_input.value(), self.value_input.value())?;
        self.reset();
        Ok(())
    }

    /// Leave `Editing`, discarding whatever was typed.
    pub fn cancel(&mut self) {
        if self.is_editing() {
            debug!("edit cancelled");
            self.reset();
        }
    }

    /// Append a record from the fields. Fields are cleared only on success.
    pub fn submit_add(&mut self, store: &mut RecordStore) -> Result<(), RecordError> {
        if self.is_editing() {
            return Ok(());
        }
        store.add(self.name_input.value(), self.value_input.value())?;
        self.clear_fields();
        self.set_focus(FormFocus::Name);
        Ok(())
    }

    /// Must be called after `store.remove(index)`. A cursor at or beyond the
    /// removed position no longer names the record it was opened on.
    pub fn on_removed(&mut self, index: usize) {
        if let EditMode::Editing(current) = self.mode {
            if current >= index {
                debug!(current, removed = index, "edit cursor invalidated");
                self.reset();
            }
        }
    }

    /// Must be called after `store.replace_all`.
    pub fn on_replaced(&mut self) {
        if self.is_editing() {
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.mode = EditMode::Adding;
        self.clear_fields();
        self.set_focus(FormFocus::Name);
    }

    pub fn set_focus(&mut self, focus: FormFocus) {
        let focus = if focus == FormFocus::Cancel && !self.is_editing() {
            FormFocus::Submit
        } else {
            focus
        };
        self.focus = focus;
        self.name_input.set_focused(focus == FormFocus::Name);
        self.value_input.set_focused(focus == FormFocus::Value);
    }

    /// Drop the input cursor from both fields (form no longer has focus).
    pub fn blur(&mut self) {
        self.name_input.set_focused(false);
        self.value_input.set_focused(false);
    }

    pub fn next_focus(&mut self) {
        let next = match self.focus {
            FormFocus::Name => FormFocus::Value,
            FormFocus::Value => FormFocus::Submit,
            FormFocus::Submit if self.is_editing() => FormFocus::Cancel,
            FormFocus::Submit | FormFocus::Cancel => FormFocus::Name,
        };
        self.set_focus(next);
    }

    pub fn prev_focus(&mut self) {
        let prev = match self.focus {
            FormFocus::Name if self.is_editing() => FormFocus::Cancel,
            FormFocus::Name => FormFocus::Submit,
            FormFocus::Value => FormFocus::Name,
            FormFocus::Submit => FormFocus::Value,
            FormFocus::Cancel => FormFocus::Submit,
        };
        self.set_focus(prev);
    }
}

impl Default for EditController {
    fn default() -> Self {
        Self {
            mode: EditMode::Adding,
            focus: FormFocus::Name,
            name_input: TextInput::new().with_placeholder("Ex: Janvier, Lundi..."),
            value_input: TextInput::new().with_placeholder("Ex: 65"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    #[test]
    fn starts_in_adding() {
        let editor = EditController::new();
        assert_eq!(editor.mode(), EditMode::Adding);
        assert_eq!(editor.editing_index(), None);
    }

    #[test]
    fn begin_edit_prefills_fields() {
        let store = RecordStore::with_samples();
        let mut editor = EditController::new();
        editor.begin_edit(1, &store);
        assert_eq!(editor.mode(), EditMode::Editing(1));
        assert_eq!(editor.name(), "Février");
        assert_eq!(editor.value(), "78");
    }

    #[test]
    fn begin_edit_out_of_range_is_ignored() {
        let store = RecordStore::with_samples();
        let mut editor = EditController::new();
        editor.begin_edit(9, &store);
        assert_eq!(editor.mode(), EditMode::Adding);
    }

    #[test]
    fn save_updates_and_returns_to_adding() {
        let mut store = RecordStore::with_samples();
        let mut editor = EditController::new();
        editor.begin_edit(2, &store);
        editor.set_fields("March", "90");
        editor.save(&mut store).unwrap();
        assert_eq!(store.get(2), Some(&Record::new("March", 90.0)));
        assert_eq!(editor.mode(), EditMode::Adding);
        assert!(editor.name().is_empty());
        assert!(editor.value().is_empty());
    }

    #[test]
    fn save_with_invalid_fields_stays_editing() {
        let mut store = RecordStore::with_samples();
        let before = store.clone();
        let mut editor = EditController::new();
        editor.begin_edit(0, &store);
        editor.set_fields("Janvier", "lots");
        assert!(editor.save(&mut store).is_err());
        assert_eq!(store, before);
        assert_eq!(editor.mode(), EditMode::Editing(0));
        assert_eq!(editor.value(), "lots");
    }

    #[test]
    fn cancel_discards_edits() {
        let mut store = RecordStore::with_samples();
        let before = store.clone();
        let mut editor = EditController::new();
        editor.begin_edit(0, &store);
        editor.set_fields("changed", "1");
        editor.cancel();
        assert_eq!(editor.mode(), EditMode::Adding);
        assert!(editor.name().is_empty());
        // save is only valid while editing
        editor.save(&mut store).unwrap();
        assert_eq!(store, before);
    }

    #[test]
    fn submit_add_clears_on_success_only() {
        let mut store = RecordStore::new();
        let mut editor = EditController::new();
        editor.set_fields("Mai", "");
        assert!(editor.submit_add(&mut store).is_err());
        assert_eq!(editor.name(), "Mai");
        assert!(store.is_empty());

        editor.set_fields("Mai", "12");
        editor.submit_add(&mut store).unwrap();
        assert_eq!(store.records(), &[Record::new("Mai", 12.0)]);
        assert!(editor.name().is_empty());
        assert_eq!(editor.mode(), EditMode::Adding);
    }

    #[test]
    fn submit_add_ignored_while_editing() {
        let mut store = RecordStore::with_samples();
        let mut editor = EditController::new();
        editor.begin_edit(0, &store);
        editor.submit_add(&mut store).unwrap();
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn remove_at_or_before_cursor_resets() {
        let mut store = RecordStore::with_samples();
        let mut editor = EditController::new();

        editor.begin_edit(2, &store);
        store.remove(2);
        editor.on_removed(2);
        assert_eq!(editor.mode(), EditMode::Adding);

        editor.begin_edit(2, &store);
        store.remove(0);
        editor.on_removed(0);
        assert_eq!(editor.mode(), EditMode::Adding);
        assert!(editor.name().is_empty());
    }

    #[test]
    fn remove_after_cursor_keeps_editing() {
        let mut store = RecordStore::with_samples();
        let mut editor = EditController::new();
        editor.begin_edit(1, &store);
        store.remove(3);
        editor.on_removed(3);
        assert_eq!(editor.mode(), EditMode::Editing(1));
        assert_eq!(editor.name(), "Février");
    }

    #[test]
    fn focus_cycle_skips_cancel_when_adding() {
        let mut editor = EditController::new();
        editor.next_focus();
        assert_eq!(editor.focus, FormFocus::Value);
        editor.next_focus();
        assert_eq!(editor.focus, FormFocus::Submit);
        editor.next_focus();
        assert_eq!(editor.focus, FormFocus::Name);
        editor.prev_focus();
        assert_eq!(editor.focus, FormFocus::Submit);
    }

    #[test]
    fn focus_cycle_includes_cancel_when_editing() {
        let store = RecordStore::with_samples();
        let mut editor = EditController::new();
        editor.begin_edit(0, &store);
        editor.set_focus(FormFocus::Submit);
        editor.next_focus();
        assert_eq!(editor.focus, FormFocus::Cancel);
        editor.next_focus();
        assert_eq!(editor.focus, FormFocus::Name);
    }
}
