use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

const MOUSE_SCROLL_LINES: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => {
            if app.input_mode == InputMode::Editing && !app.show_document_picker {
                app.insert_str(&text);
            }
        }
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_document_picker {
        handle_document_picker(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_document_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_document_picker(),
        KeyCode::Char('j') | KeyCode::Down => app.document_picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.document_picker_nav_up(),
        KeyCode::Enter => app.select_document(),
        KeyCode::Char('x') => app.clear_document(),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Back to typing
        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,

        // Chat scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::PageDown => app.scroll_chat_page_down(),
        KeyCode::PageUp => app.scroll_chat_page_up(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_chat_to_bottom(),
        KeyCode::Char('g') | KeyCode::Home => app.chat_scroll = 0,

        KeyCode::Char('d') => app.open_document_picker(),

        KeyCode::Char(c @ '1'..='3') => {
            let index = c as usize - '1' as usize;
            app.apply_suggestion(index);
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter if key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) => {
            app.insert_char('\n');
        }
        KeyCode::Enter => app.submit(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::PageUp => app.scroll_chat_page_up(),
        KeyCode::PageDown => app.scroll_chat_page_down(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);

    if !in_chat || app.show_document_picker {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_chat_down(MOUSE_SCROLL_LINES),
        MouseEventKind::ScrollUp => app.scroll_chat_up(MOUSE_SCROLL_LINES),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ihelp_core::{BackendClient, GatewaySettings, Session};

    fn test_app() -> App {
        let client = BackendClient::new(GatewaySettings::default()).unwrap();
        App::new(Session::empty(), client)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_typing_and_mode_switch() {
        let mut app = test_app();
        for c in "hi".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.input, "hi");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);

        // in normal mode letters are commands, not text
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.input, "hi");

        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn test_alt_enter_inserts_newline() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        handle_key(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.input, "a\nb");
        assert!(!app.session.is_pending());
    }

    #[test]
    fn test_number_keys_apply_suggestions() {
        let mut app = test_app();
        app.input_mode = InputMode::Normal;
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.input, "Key findings?");
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn test_ctrl_c_quits_from_anywhere() {
        let mut app = test_app();
        app.show_document_picker = true;
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_paste_goes_to_input_only_when_editing() {
        let mut app = test_app();
        handle_event(&mut app, AppEvent::Paste("pasted\r\ntext".to_string())).unwrap();
        assert_eq!(app.input, "pasted\ntext");

        app.input_mode = InputMode::Normal;
        handle_event(&mut app, AppEvent::Paste("more".to_string())).unwrap();
        assert_eq!(app.input, "pasted\ntext");
    }

    #[test]
    fn test_point_in_rect() {
        let rect = Rect::new(2, 2, 4, 4);
        assert!(point_in_rect(2, 2, rect));
        assert!(point_in_rect(5, 5, rect));
        assert!(!point_in_rect(6, 5, rect));
        assert!(!point_in_rect(1, 3, rect));
    }
}
