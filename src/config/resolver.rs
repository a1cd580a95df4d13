use crate::config::actions::*;
use crate::config::keybindings::KeybindingsConfig;
use crossterm::event::KeyEvent;
use std::sync::Arc;

pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
            GlobalAction::Inquire => kb.inquire.matches(event),
        }
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.display(),
            GlobalAction::Inquire => kb.inquire.display(),
        }
    }

    // Navigation actions
    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.matches(event),
            NavAction::Down => kb.down.matches(event),
            NavAction::PageUp => kb.page_up.matches(event),
            NavAction::PageDown => kb.page_down.matches(event),
            NavAction::Home => kb.home.matches(event),
            NavAction::End => kb.end.matches(event),
            NavAction::Select => kb.select.matches(event),
        }
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.display(),
            NavAction::Down => kb.down.display(),
            NavAction::PageUp => kb.page_up.display(),
            NavAction::PageDown => kb.page_down.display(),
            NavAction::Home => kb.home.display(),
            NavAction::End => kb.end.display(),
            NavAction::Select => kb.select.display(),
        }
    }

    // Form actions
    pub fn matches_form(&self, event: &KeyEvent, action: FormAction) -> bool {
        let kb = &self.keybindings.form;
        match action {
            FormAction::Submit => kb.submit.matches(event),
            FormAction::Cancel => kb.cancel.matches(event),
            FormAction::NextField => kb.next_field.matches(event),
            FormAction::PreviousField => kb.previous_field.matches(event),
        }
    }

    pub fn display_form(&self, action: FormAction) -> String {
        let kb = &self.keybindings.form;
        match action {
            FormAction::Submit => kb.submit.display(),
            FormAction::Cancel => kb.cancel.display(),
            FormAction::NextField => kb.next_field.display(),
            FormAction::PreviousField => kb.previous_field.display(),
        }
    }

    // Project detail actions
    pub fn matches_project(&self, event: &KeyEvent, action: ProjectAction) -> bool {
        let kb = &self.keybindings.project;
        match action {
            ProjectAction::Close => kb.close.matches(event),
            ProjectAction::NextLink => kb.next_link.matches(event),
            ProjectAction::OpenLink => kb.open_link.matches(event),
            ProjectAction::CopyLink => kb.copy_link.matches(event),
        }
    }

    pub fn display_project(&self, action: ProjectAction) -> String {
        let kb = &self.keybindings.project;
        match action {
            ProjectAction::Close => kb.close.display(),
            ProjectAction::NextLink => kb.next_link.display(),
            ProjectAction::OpenLink => kb.open_link.display(),
            ProjectAction::CopyLink => kb.copy_link.display(),
        }
    }

    // Dialog actions
    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Dismiss => kb.dismiss.matches(event),
        }
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}
