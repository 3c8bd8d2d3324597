//! Generic multi-field form used by the add/edit views.
//!
//! Fields are either free text ([`InputField`]) or a fixed list of choices
//! cycled with Left/Right. Tab/Down and BackTab/Up move between fields,
//! Enter submits and Esc cancels.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::enums::ViewId;
use crate::tui::input::InputField;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text(InputField),
    Choice { options: Vec<String>, selected: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub label: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    Editing,
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    /// View this form belongs to.
    pub view: ViewId,
    pub fields: Vec<FormField>,
    pub focus: usize,
    /// Record being edited, when not creating.
    pub target: Option<u64>,
}

impl Form {
    pub fn new(view: ViewId) -> Self {
        Form {
            view,
            fields: Vec::new(),
            focus: 0,
            target: None,
        }
    }

    pub fn text(mut self, label: &'static str, value: &str) -> Self {
        self.fields.push(FormField {
            label,
            kind: FieldKind::Text(InputField::with_value(value)),
        });
        self
    }

    /// Choice field; `selected` is clamped to the options.
    pub fn choice(mut self, label: &'static str, options: Vec<String>, selected: usize) -> Self {
        let selected = selected.min(options.len().saturating_sub(1));
        self.fields.push(FormField {
            label,
            kind: FieldKind::Choice { options, selected },
        });
        self
    }

    pub fn target(mut self, id: u64) -> Self {
        self.target = Some(id);
        self
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> FormEvent {
        match key.code {
            KeyCode::Esc => return FormEvent::Cancel,
            KeyCode::Enter => return FormEvent::Submit,
            KeyCode::Tab | KeyCode::Down => self.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.prev_field(),
            _ => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    edit_field(&mut field.kind, key);
                }
            }
        }
        FormEvent::Editing
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    fn field(&self, label: &str) -> Option<&FieldKind> {
        self.fields.iter().find(|f| f.label == label).map(|f| &f.kind)
    }

    /// Raw text of a text field (empty if missing).
    pub fn value(&self, label: &str) -> String {
        match self.field(label) {
            Some(FieldKind::Text(input)) => input.value.clone(),
            _ => String::new(),
        }
    }

    /// Trimmed text, `None` when blank.
    pub fn optional(&self, label: &str) -> Option<String> {
        match self.field(label) {
            Some(FieldKind::Text(input)) => input.optional(),
            _ => None,
        }
    }

    /// Index of the selected option of a choice field.
    pub fn selected(&self, label: &str) -> usize {
        match self.field(label) {
            Some(FieldKind::Choice { selected, .. }) => *selected,
            _ => 0,
        }
    }

    pub fn selected_label(&self, label: &str) -> Option<String> {
        match self.field(label) {
            Some(FieldKind::Choice { options, selected }) => options.get(*selected).cloned(),
            _ => None,
        }
    }
}

fn edit_field(kind: &mut FieldKind, key: &KeyEvent) {
    match kind {
        FieldKind::Text(input) => match key.code {
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                input.handle_char(c)
            }
            KeyCode::Backspace => input.handle_backspace(),
            KeyCode::Delete => input.handle_delete(),
            KeyCode::Left => input.move_cursor_left(),
            KeyCode::Right => input.move_cursor_right(),
            KeyCode::Home => input.home(),
            KeyCode::End => input.end(),
            _ => {}
        },
        FieldKind::Choice { options, selected } => {
            if options.is_empty() {
                return;
            }
            match key.code {
                KeyCode::Left => *selected = (*selected + options.len() - 1) % options.len(),
                KeyCode::Right | KeyCode::Char(' ') => *selected = (*selected + 1) % options.len(),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(form: &mut Form, code: KeyCode) -> FormEvent {
        form.handle_key(&KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn sample() -> Form {
        Form::new(ViewId::TaskAdd)
            .text("Text", "")
            .choice("Priority", vec!["-".into(), "high".into(), "low".into()], 0)
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut form = sample();
        for c in "buy milk".chars() {
            press(&mut form, KeyCode::Char(c));
        }
        press(&mut form, KeyCode::Tab);
        press(&mut form, KeyCode::Left);
        assert_eq!(form.value("Text"), "buy milk");
        assert_eq!(form.selected_label("Priority").as_deref(), Some("low"));
    }

    #[test]
    fn test_focus_wraps_both_ways() {
        let mut form = sample();
        press(&mut form, KeyCode::BackTab);
        assert_eq!(form.focus, 1);
        press(&mut form, KeyCode::Down);
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn test_submit_and_cancel() {
        let mut form = sample();
        assert_eq!(press(&mut form, KeyCode::Enter), FormEvent::Submit);
        assert_eq!(press(&mut form, KeyCode::Esc), FormEvent::Cancel);
        assert_eq!(press(&mut form, KeyCode::Char('x')), FormEvent::Editing);
    }

    #[test]
    fn test_choice_is_clamped() {
        let form = Form::new(ViewId::TaskAdd).choice("P", vec!["a".into()], 9);
        assert_eq!(form.selected("P"), 0);
        assert_eq!(form.optional("missing"), None);
    }
}
