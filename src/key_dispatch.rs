//! Key emission for matched gestures.
//!
//! A key identifier is a whitespace-separated list of tokens pressed in
//! order. Single characters and a fixed set of named keys are tapped; any
//! other token is typed out as literal text. Emission goes through the
//! [`KeyEmitter`] trait so the detection loop does not depend on the
//! windowing system.

use crate::{
    constants::SPECIAL_KEYS,
    error::{Error, Result},
};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use x11rb::{
    connection::{Connection, RequestConnection},
    protocol::{
        xproto::{ConnectionExt as _, Keycode, Keysym, Window, KEY_PRESS_EVENT, KEY_RELEASE_EVENT},
        xtest::{self, ConnectionExt as _},
    },
    rust_connection::RustConnection,
    CURRENT_TIME,
};

/// Named keys that are tapped rather than typed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKey {
    /// Return key
    Enter,
    /// Space bar
    Space,
    /// Tab key
    Tab,
    /// Backspace key
    Backspace,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Escape key
    Escape,
}

impl NamedKey {
    /// Parse a named key token, case-insensitively
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let lower = token.to_ascii_lowercase();
        let canonical = if lower == "esc" { "escape" } else { lower.as_str() };
        if !SPECIAL_KEYS.contains(&canonical) {
            return None;
        }
        Some(match canonical {
            "enter" => Self::Enter,
            "space" => Self::Space,
            "tab" => Self::Tab,
            "backspace" => Self::Backspace,
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            _ => Self::Escape,
        })
    }

    /// X11 keysym of the key
    #[must_use]
    pub const fn keysym(self) -> Keysym {
        match self {
            Self::Enter => 0xff0d,
            Self::Space => 0x0020,
            Self::Tab => 0xff09,
            Self::Backspace => 0xff08,
            Self::Up => 0xff52,
            Self::Down => 0xff54,
            Self::Left => 0xff51,
            Self::Right => 0xff53,
            Self::Escape => 0xff1b,
        }
    }
}

/// One step of a key sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Tap a named key
    Named(NamedKey),
    /// Tap the key producing a single character
    Char(char),
    /// Type a string character by character
    Text(String),
}

/// Split a key identifier into the actions to perform, in order
#[must_use]
pub fn parse_key_sequence(identifier: &str) -> Vec<KeyAction> {
    identifier
        .split_whitespace()
        .map(|token| {
            if let Some(named) = NamedKey::from_token(token) {
                return KeyAction::Named(named);
            }
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyAction::Char(c),
                _ => KeyAction::Text(token.to_string()),
            }
        })
        .collect()
}

/// Key-dispatch collaborator
pub trait KeyEmitter: Send {
    /// Press the key identifier (a single token or a token sequence)
    fn press(&mut self, key: &str) -> Result<()>;

    /// Emitter name for logging
    fn name(&self) -> &str;
}

/// Emitter that only logs what it would press
#[derive(Debug, Default)]
pub struct LogEmitter;

impl KeyEmitter for LogEmitter {
    fn press(&mut self, key: &str) -> Result<()> {
        for action in parse_key_sequence(key) {
            info!("[dry-run] {:?}", action);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "LogEmitter"
    }
}

/// Keysym to keycode lookup built from the server keyboard mapping
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    codes: HashMap<Keysym, (Keycode, bool)>,
}

impl Keymap {
    /// Build from a `GetKeyboardMapping` reply.
    ///
    /// Only the first two columns are used: column 0 is the plain keysym and
    /// column 1 the shifted one. Plain bindings win over shifted ones and
    /// lower keycodes win over higher ones.
    #[must_use]
    pub fn from_keysyms(min_keycode: Keycode, keysyms_per_keycode: u8, keysyms: &[Keysym]) -> Self {
        let mut codes = HashMap::new();
        let per = usize::from(keysyms_per_keycode);
        if per == 0 {
            return Self { codes };
        }
        for column in 0..per.min(2) {
            for (offset, row) in keysyms.chunks(per).enumerate() {
                let Some(&sym) = row.get(column) else { continue };
                let Ok(offset) = u8::try_from(offset) else { break };
                let Some(code) = min_keycode.checked_add(offset) else { break };
                if sym != 0 {
                    codes.entry(sym).or_insert((code, column == 1));
                }
            }
        }
        Self { codes }
    }

    /// Keycode for `keysym` and whether Shift must be held
    #[must_use]
    pub fn lookup(&self, keysym: Keysym) -> Option<(Keycode, bool)> {
        self.codes.get(&keysym).copied()
    }
}

/// Keysym for a character
#[must_use]
pub fn char_keysym(c: char) -> Keysym {
    let code = u32::from(c);
    if (0x20..=0x7e).contains(&code) || (0xa0..=0xff).contains(&code) {
        code
    } else {
        0x0100_0000 + code
    }
}

const SHIFT_L_KEYSYM: Keysym = 0xffe1;

/// Emitter that injects key events through the X11 XTEST extension
pub struct X11KeyEmitter {
    connection: RustConnection,
    root: Window,
    keymap: Keymap,
}

impl X11KeyEmitter {
    /// Connect to the display and load its keyboard mapping
    pub fn new() -> Result<Self> {
        info!("Initializing X11 key emitter");

        let (connection, screen_num) = RustConnection::connect(None)
            .map_err(|e| Error::X11(format!("Failed to connect to X11: {e}")))?;

        let has_xtest = connection
            .extension_information(xtest::X11_EXTENSION_NAME)
            .map_err(|e| Error::X11(format!("Failed to query XTEST: {e}")))?
            .is_some();
        if !has_xtest {
            return Err(Error::X11("XTEST extension not available".to_string()));
        }

        let setup = connection.setup();
        let root = setup
            .roots
            .get(screen_num)
            .ok_or_else(|| Error::X11("Failed to get screen".to_string()))?
            .root;
        let min_keycode = setup.min_keycode;
        let count = setup.max_keycode.saturating_sub(min_keycode).saturating_add(1);

        let mapping = connection
            .get_keyboard_mapping(min_keycode, count)
            .map_err(|e| Error::X11(format!("Failed to request keyboard mapping: {e}")))?
            .reply()
            .map_err(|e| Error::X11(format!("Failed to get keyboard mapping: {e}")))?;
        let keymap = Keymap::from_keysyms(min_keycode, mapping.keysyms_per_keycode, &mapping.keysyms);

        info!("Connected to X11 display, {} keycodes mapped", count);

        Ok(Self { connection, root, keymap })
    }

    fn fake(&self, code: Keycode, pressed: bool) -> Result<()> {
        let event = if pressed { KEY_PRESS_EVENT } else { KEY_RELEASE_EVENT };
        self.connection
            .xtest_fake_input(event, code, CURRENT_TIME, self.root, 0, 0, 0)
            .map_err(|e| Error::KeyDispatch(format!("Failed to send fake input: {e}")))?;
        Ok(())
    }

    fn tap_keysym(&self, keysym: Keysym, label: &str) -> Result<()> {
        let (code, shifted) = self
            .keymap
            .lookup(keysym)
            .ok_or_else(|| Error::KeyDispatch(format!("No keycode for '{label}'")))?;
        let shift = if shifted {
            let (shift_code, _) = self
                .keymap
                .lookup(SHIFT_L_KEYSYM)
                .ok_or_else(|| Error::KeyDispatch("No keycode for Shift".to_string()))?;
            Some(shift_code)
        } else {
            None
        };

        if let Some(shift_code) = shift {
            self.fake(shift_code, true)?;
        }
        self.fake(code, true)?;
        self.fake(code, false)?;
        if let Some(shift_code) = shift {
            self.fake(shift_code, false)?;
        }
        Ok(())
    }
}

impl KeyEmitter for X11KeyEmitter {
    fn press(&mut self, key: &str) -> Result<()> {
        for action in parse_key_sequence(key) {
            debug!("Emitting {:?}", action);
            match action {
                KeyAction::Named(named) => self.tap_keysym(named.keysym(), key)?,
                KeyAction::Char(c) => self.tap_keysym(char_keysym(c), &c.to_string())?,
                KeyAction::Text(text) => {
                    for c in text.chars() {
                        self.tap_keysym(char_keysym(c), &c.to_string())?;
                    }
                }
            }
        }
        self.connection
            .flush()
            .map_err(|e| Error::KeyDispatch(format!("Failed to flush connection: {e}")))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "X11KeyEmitter"
    }
}

/// Fire-and-forget wrapper that presses keys on a worker thread.
///
/// `press` only queues the key; failures are logged by the worker and never
/// reach the caller. Dropping the emitter drains the queue and joins the
/// worker.
pub struct ThreadedEmitter {
    sender: Option<Sender<String>>,
    worker: Option<JoinHandle<()>>,
    name: String,
}

impl ThreadedEmitter {
    /// Move `inner` onto a worker thread
    pub fn spawn(mut inner: Box<dyn KeyEmitter>) -> Result<Self> {
        let name = format!("Threaded({})", inner.name());
        let (sender, receiver) = mpsc::channel::<String>();
        let worker = std::thread::Builder::new()
            .name("key-dispatch".to_string())
            .spawn(move || {
                for key in receiver {
                    if let Err(e) = inner.press(&key) {
                        warn!("Key dispatch for '{}' failed: {}", key, e);
                    }
                }
            })?;
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            name,
        })
    }
}

impl KeyEmitter for ThreadedEmitter {
    fn press(&mut self, key: &str) -> Result<()> {
        self.sender
            .as_ref()
            .ok_or_else(|| Error::KeyDispatch("dispatch worker stopped".to_string()))?
            .send(key.to_string())
            .map_err(|_| Error::KeyDispatch("dispatch worker stopped".to_string()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ThreadedEmitter {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Key dispatch worker panicked");
            }
        }
    }
}

/// Create an emitter by backend name (`x11` or `log`)
pub fn create_emitter(backend: &str) -> Result<Box<dyn KeyEmitter>> {
    match backend.to_lowercase().as_str() {
        "x11" => Ok(Box::new(X11KeyEmitter::new()?)),
        "log" | "dry-run" | "dry_run" => Ok(Box::new(LogEmitter)),
        _ => Err(Error::InvalidInput(format!("Unknown key dispatch backend: {backend}"))),
    }
}
