#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKey {
    Character(char),
    Enter,
    Escape,
    Delete,
    Backspace,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShortcutModifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl ShortcutModifiers {
    pub const fn new(ctrl: bool, shift: bool) -> Self {
        Self { ctrl, shift }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputContext {
    pub text_editing: bool,
    pub has_selection: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    TextInsert(char),
    TextInsertLineBreak,
    TextDeleteBackward,
    TextDeleteForward,
    TextCursorLeft,
    TextCursorRight,
    TextCursorUp,
    TextCursorDown,
    TextCommit,
    TextDiscard,
    EditorDeleteSelection,
    EditorClearSelection,
    EditorExport,
}

fn resolve_text_shortcut(key: ShortcutKey, modifiers: ShortcutModifiers) -> Option<ShortcutAction> {
    match (key, modifiers.ctrl) {
        (ShortcutKey::Enter, true) => Some(ShortcutAction::TextCommit),
        (ShortcutKey::Enter, false) => Some(ShortcutAction::TextInsertLineBreak),
        (ShortcutKey::Escape, _) => Some(ShortcutAction::TextDiscard),
        (ShortcutKey::Backspace, _) => Some(ShortcutAction::TextDeleteBackward),
        (ShortcutKey::Delete, _) => Some(ShortcutAction::TextDeleteForward),
        (ShortcutKey::Left, _) => Some(ShortcutAction::TextCursorLeft),
        (ShortcutKey::Right, _) => Some(ShortcutAction::TextCursorRight),
        (ShortcutKey::Up, _) => Some(ShortcutAction::TextCursorUp),
        (ShortcutKey::Down, _) => Some(ShortcutAction::TextCursorDown),
        (ShortcutKey::Character(c), false) if !c.is_control() => {
            Some(ShortcutAction::TextInsert(c))
        }
        _ => None,
    }
}

fn resolve_editor_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
    context: InputContext,
) -> Option<ShortcutAction> {
    match (key, modifiers.ctrl, modifiers.shift) {
        (ShortcutKey::Delete, false, false) | (ShortcutKey::Backspace, false, false)
            if context.has_selection =>
        {
            Some(ShortcutAction::EditorDeleteSelection)
        }
        (ShortcutKey::Escape, false, false) if context.has_selection => {
            Some(ShortcutAction::EditorClearSelection)
        }
        (ShortcutKey::Character('s'), true, _) => Some(ShortcutAction::EditorExport),
        _ => None,
    }
}

/// Text editing swallows every key it understands before editor shortcuts apply.
pub fn resolve_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
    context: InputContext,
) -> Option<ShortcutAction> {
    if context.text_editing {
        return resolve_text_shortcut(key, modifiers);
    }

    resolve_editor_shortcut(key, modifiers, context)
}
