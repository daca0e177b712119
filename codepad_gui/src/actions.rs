use egui::{Key, KeyboardShortcut, Modifiers};
use once_cell::sync::Lazy;

/// User-triggerable commands, reachable from the menu bar and the keyboard.
/// 使用者可觸發的指令；可由選單或快捷鍵呼叫。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NewDocument,
    OpenFile,
    OpenFolder,
    Save,
    SaveAs,
    ToggleSidebar,
    Preferences,
    About,
    Quit,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::NewDocument => "New",
            Action::OpenFile => "Open File…",
            Action::OpenFolder => "Open Folder…",
            Action::Save => "Save",
            Action::SaveAs => "Save As…",
            Action::ToggleSidebar => "Toggle Sidebar",
            Action::Preferences => "Preferences",
            Action::About => "About Codepad",
            Action::Quit => "Quit",
        }
    }

    pub fn shortcut(self) -> Option<KeyboardShortcut> {
        SHORTCUTS
            .iter()
            .find(|(action, _)| *action == self)
            .map(|(_, shortcut)| *shortcut)
    }
}

pub struct MenuSection {
    pub title: &'static str,
    pub actions: &'static [Action],
}

pub const MENU: &[MenuSection] = &[
    MenuSection {
        title: "File",
        actions: &[
            Action::NewDocument,
            Action::OpenFile,
            Action::OpenFolder,
            Action::Save,
            Action::SaveAs,
            Action::Quit,
        ],
    },
    MenuSection {
        title: "View",
        actions: &[Action::ToggleSidebar],
    },
    MenuSection {
        title: "Help",
        actions: &[Action::Preferences, Action::About],
    },
];

const CTRL_SHIFT: Modifiers = Modifiers {
    alt: false,
    ctrl: false,
    shift: true,
    mac_cmd: false,
    command: true,
};

/// Shift variants come first: `consume_shortcut` ignores extra modifiers, so
/// Ctrl+S would otherwise swallow Ctrl+Shift+S.
static SHORTCUTS: Lazy<Vec<(Action, KeyboardShortcut)>> = Lazy::new(|| {
    vec![
        (Action::OpenFolder, KeyboardShortcut::new(CTRL_SHIFT, Key::O)),
        (Action::SaveAs, KeyboardShortcut::new(CTRL_SHIFT, Key::S)),
        (
            Action::NewDocument,
            KeyboardShortcut::new(Modifiers::COMMAND, Key::N),
        ),
        (
            Action::OpenFile,
            KeyboardShortcut::new(Modifiers::COMMAND, Key::O),
        ),
        (Action::Save, KeyboardShortcut::new(Modifiers::COMMAND, Key::S)),
        (
            Action::ToggleSidebar,
            KeyboardShortcut::new(Modifiers::COMMAND, Key::B),
        ),
        (
            Action::Preferences,
            KeyboardShortcut::new(Modifiers::COMMAND, Key::Comma),
        ),
        (Action::Quit, KeyboardShortcut::new(Modifiers::COMMAND, Key::Q)),
    ]
});

/// Consumes every shortcut pressed this frame and returns the matching actions.
/// 取出本畫格觸發的快捷鍵並轉為對應指令。
pub fn pressed_actions(ctx: &egui::Context) -> Vec<Action> {
    ctx.input_mut(|input| {
        SHORTCUTS
            .iter()
            .filter(|(_, shortcut)| input.consume_shortcut(shortcut))
            .map(|(action, _)| *action)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_menu_action_except_about_has_a_shortcut() {
        for section in MENU {
            for action in section.actions {
                assert_eq!(
                    action.shortcut().is_some(),
                    *action != Action::About,
                    "{action:?}"
                );
            }
        }
    }

    #[test]
    fn shifted_shortcuts_are_checked_before_plain_ones() {
        let position = |wanted: Action| {
            SHORTCUTS
                .iter()
                .position(|(action, _)| *action == wanted)
                .unwrap()
        };
        assert!(position(Action::SaveAs) < position(Action::Save));
        assert!(position(Action::OpenFolder) < position(Action::OpenFile));
    }
}
