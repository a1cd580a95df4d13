use crate::config::key::{Key, KeyBinding};
use crate::config::keybindings::*;
use crossterm::event::KeyCode;

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::new(KeyCode::Char('q')).into(),
            inquire: Key::new(KeyCode::Char('b')).into(),
        }
    }
}

impl Default for NavigationKeybindings {
    fn default() -> Self {
        Self {
            up: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('k')),
                Key::new(KeyCode::Up),
            ]),
            down: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('j')),
                Key::new(KeyCode::Down),
            ]),
            page_up: Key::new(KeyCode::PageUp).into(),
            page_down: Key::new(KeyCode::PageDown).into(),
            home: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('g')),
                Key::new(KeyCode::Home),
            ]),
            end: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('G')),
                Key::new(KeyCode::End),
            ]),
            select: Key::new(KeyCode::Enter).into(),
        }
    }
}

impl Default for FormKeybindings {
    fn default() -> Self {
        Self {
            submit: Key::with_ctrl(KeyCode::Char('s')).into(),
            cancel: Key::new(KeyCode::Esc).into(),
            next_field: KeyBinding::multiple(vec![
                Key::new(KeyCode::Tab),
                Key::new(KeyCode::Down),
            ]),
            previous_field: KeyBinding::multiple(vec![
                Key::new(KeyCode::BackTab),
                Key::new(KeyCode::Up),
            ]),
        }
    }
}

impl Default for ProjectKeybindings {
    fn default() -> Self {
        Self {
            close: KeyBinding::multiple(vec![
                Key::new(KeyCode::Esc),
                Key::new(KeyCode::Char('q')),
            ]),
            next_link: Key::new(KeyCode::Tab).into(),
            open_link: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('o')),
                Key::new(KeyCode::Enter),
            ]),
            copy_link: Key::new(KeyCode::Char('y')).into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            dismiss: KeyBinding::multiple(vec![
                Key::new(KeyCode::Enter),
                Key::new(KeyCode::Esc),
                Key::new(KeyCode::Char('q')),
            ]),
        }
    }
}
