//! Shared fakes: a screen-backed injector, a recording layout switcher
//! and a small fixed word list.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::config::Config;
use crate::dispatch::{LayoutRequestSlot, LayoutSwitcher, SwitchError};
use crate::domain::Lang;
use crate::domain::outcome::CorrectionOutcome;
use crate::domain::text::mapping::Layout;
use crate::engine::{Collaborators, Engine};
use crate::event::{Key, KeyEvent};
use crate::replace::{InjectError, InjectOp, Injector};
use crate::strategy::spell::{Dictionary, Suggestion, WordList};

/// Text as the target application would see it. Cloneable handle so the
/// test keeps one while the engine owns the injector.
#[derive(Clone, Default)]
pub struct Screen {
    text: Arc<Mutex<String>>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, ch: char) {
        self.text.lock().unwrap().push(ch);
    }

    pub fn pop(&self) {
        self.text.lock().unwrap().pop();
    }

    pub fn text(&self) -> String {
        self.text.lock().unwrap().clone()
    }
}

/// Injector that applies ops to a [`Screen`], all-or-nothing.
pub struct ScreenInjector {
    screen: Screen,
}

impl ScreenInjector {
    pub fn new(screen: Screen) -> Self {
        Self { screen }
    }
}

impl Injector for ScreenInjector {
    fn inject(&mut self, ops: &[InjectOp]) -> Result<(), InjectError> {
        let mut text = self.screen.text.lock().unwrap();
        for op in ops {
            match op {
                InjectOp::DeleteBack(n) => {
                    for _ in 0..*n {
                        text.pop();
                    }
                }
                InjectOp::Insert(s) => text.push_str(s),
            }
        }
        Ok(())
    }
}

/// Injector that refuses every call.
pub struct FailingInjector;

impl Injector for FailingInjector {
    fn inject(&mut self, _ops: &[InjectOp]) -> Result<(), InjectError> {
        Err(InjectError::Rejected)
    }
}

/// Switcher that records targets instead of touching any layout.
#[derive(Clone, Default)]
pub struct FakeSwitcher {
    pub switched: Arc<Mutex<Vec<Layout>>>,
    pub fail: bool,
}

impl LayoutSwitcher for FakeSwitcher {
    fn switch(&mut self, target: Layout) -> Result<(), SwitchError> {
        if self.fail {
            return Err(SwitchError::CommandFailed);
        }
        self.switched.lock().unwrap().push(target);
        Ok(())
    }
}

/// Dictionary that answers nothing until released. Lets a test hold
/// every entry back from the word-level passes so finalized words pile
/// up in the phrase window, then free the entries for the phrase pass.
pub struct GatedDictionary {
    inner: WordList,
    open: Arc<AtomicBool>,
}

impl GatedDictionary {
    pub fn new(inner: WordList) -> (Self, Arc<AtomicBool>) {
        let open = Arc::new(AtomicBool::new(false));
        let gated = Self {
            inner,
            open: Arc::clone(&open),
        };
        (gated, open)
    }
}

impl Dictionary for GatedDictionary {
    fn contains(&self, lang: Lang, word: &str) -> bool {
        self.open.load(Ordering::SeqCst) && self.inner.contains(lang, word)
    }

    fn lookup(&self, lang: Lang, word: &str) -> Option<Suggestion> {
        if !self.open.load(Ordering::SeqCst) {
            return None;
        }
        self.inner.lookup(lang, word)
    }
}

pub fn word_list() -> WordList {
    let mut dict = WordList::new();
    for w in ["hello", "world", "the", "cat", "test"] {
        dict.insert(Lang::En, w);
    }
    for w in ["привет", "мир", "нет", "как", "дела", "свет", "пока"] {
        dict.insert(Lang::Ru, w);
    }
    dict
}

pub struct Fixture {
    pub engine: Engine,
    pub screen: Screen,
    pub slot: LayoutRequestSlot,
    seq: u64,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_dict(word_list())
    }

    pub fn with_dict(dict: impl Dictionary + 'static) -> Self {
        Self::with_config_and_dict(Config::default(), dict)
    }

    pub fn with_config_and_dict(config: Config, dict: impl Dictionary + 'static) -> Self {
        let screen = Screen::new();
        let slot = LayoutRequestSlot::new();
        let engine = Engine::new(
            config,
            Collaborators {
                dictionary: Arc::new(dict),
                semantic: None,
                injector: Box::new(ScreenInjector::new(screen.clone())),
                switch_slot: slot.clone(),
            },
        );
        Self {
            engine,
            screen,
            slot,
            seq: 0,
        }
    }

    pub fn with_state_dir(dir: &std::path::Path) -> Self {
        let screen = Screen::new();
        let slot = LayoutRequestSlot::new();
        let engine = Engine::with_state_dir(
            Config::default(),
            Collaborators {
                dictionary: Arc::new(word_list()),
                semantic: None,
                injector: Box::new(ScreenInjector::new(screen.clone())),
                switch_slot: slot.clone(),
            },
            dir,
        );
        Self {
            engine,
            screen,
            slot,
            seq: 0,
        }
    }

    pub fn failing_injection() -> Self {
        let screen = Screen::new();
        let slot = LayoutRequestSlot::new();
        let engine = Engine::new(
            Config::default(),
            Collaborators {
                dictionary: Arc::new(word_list()),
                semantic: None,
                injector: Box::new(FailingInjector),
                switch_slot: slot.clone(),
            },
        );
        Self {
            engine,
            screen,
            slot,
            seq: 0,
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Types `text` character by character: each keystroke is echoed to
    /// the screen first, then delivered to the engine, the way capture
    /// and echo interleave for a real application.
    pub fn type_str(&mut self, text: &str) -> Vec<CorrectionOutcome> {
        let mut outcomes = Vec::new();
        for ch in text.chars() {
            self.screen.push(ch);
            let seq = self.next_seq();
            if let Some(o) = self
                .engine
                .on_key_event(&KeyEvent::physical(Key::Char(ch), seq))
            {
                outcomes.push(o);
            }
        }
        outcomes
    }

    /// Types `text` and returns the one outcome it produced.
    pub fn type_expect_one(&mut self, text: &str) -> CorrectionOutcome {
        let outcomes = self.type_str(text);
        assert_eq!(outcomes.len(), 1, "expected one outcome, got {outcomes:?}");
        outcomes.into_iter().next().unwrap()
    }

    pub fn press_backspace(&mut self) {
        self.screen.pop();
        let seq = self.next_seq();
        let _ = self
            .engine
            .on_key_event(&KeyEvent::physical(Key::Backspace, seq));
    }

    pub fn press_nav(&mut self) {
        let seq = self.next_seq();
        let _ = self.engine.on_key_event(&KeyEvent::physical(Key::Nav, seq));
    }

    pub fn poll_after_delay(&mut self) -> Option<CorrectionOutcome> {
        self.engine
            .poll_idle(Instant::now() + std::time::Duration::from_millis(600))
    }
}
