use bevy::prelude::*;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// The four directional keys the runner responds to.
///
/// Variant names match the DOM `KeyboardEvent.key` values so snapshots and
/// config files read the same as the browser build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl DirectionKey {
    /// All directional keys in display order.
    pub fn all() -> &'static [DirectionKey] {
        &[
            Self::ArrowUp,
            Self::ArrowDown,
            Self::ArrowLeft,
            Self::ArrowRight,
        ]
    }

    /// DOM key name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ArrowUp => "ArrowUp",
            Self::ArrowDown => "ArrowDown",
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowRight => "ArrowRight",
        }
    }

    /// Arrow glyph for the HUD.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::ArrowUp => "↑",
            Self::ArrowDown => "↓",
            Self::ArrowLeft => "←",
            Self::ArrowRight => "→",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|key| key.name() == name)
    }

    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::ArrowUp => Some(Self::ArrowUp),
            KeyCode::ArrowDown => Some(Self::ArrowDown),
            KeyCode::ArrowLeft => Some(Self::ArrowLeft),
            KeyCode::ArrowRight => Some(Self::ArrowRight),
            _ => None,
        }
    }

    pub fn key_code(&self) -> KeyCode {
        match self {
            Self::ArrowUp => KeyCode::ArrowUp,
            Self::ArrowDown => KeyCode::ArrowDown,
            Self::ArrowLeft => KeyCode::ArrowLeft,
            Self::ArrowRight => KeyCode::ArrowRight,
        }
    }

    fn flag(&self) -> HeldKeys {
        match self {
            Self::ArrowUp => HeldKeys::UP,
            Self::ArrowDown => HeldKeys::DOWN,
            Self::ArrowLeft => HeldKeys::LEFT,
            Self::ArrowRight => HeldKeys::RIGHT,
        }
    }
}

bitflags! {
    /// Set of directional keys currently held down.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    struct HeldKeys: u8 {
        const UP = 0b0000_0001;
        const DOWN = 0b0000_0010;
        const LEFT = 0b0000_0100;
        const RIGHT = 0b0000_1000;
    }
}

/// Held/released flag for each directional key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    held: HeldKeys,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: DirectionKey, active: bool) {
        self.held.set(key.flag(), active);
    }

    pub fn is_held(&self, key: DirectionKey) -> bool {
        self.held.contains(key.flag())
    }

    pub fn any_held(&self) -> bool {
        !self.held.is_empty()
    }

    pub fn release_all(&mut self) {
        self.held = HeldKeys::empty();
    }

    /// Hold exactly `keys`, releasing everything else.
    pub fn hold_exclusive(&mut self, keys: &[DirectionKey]) {
        self.release_all();
        for key in keys {
            self.set(*key, true);
        }
    }

    /// Held keys in display order.
    pub fn held_keys(&self) -> impl Iterator<Item = DirectionKey> + '_ {
        DirectionKey::all()
            .iter()
            .copied()
            .filter(|key| self.is_held(*key))
    }

    /// Raw movement direction in canvas space (y grows downward).
    ///
    /// Each component is -1, 0 or 1; opposite keys cancel out.
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: DirectionKey, pos: DirectionKey| -> f32 {
            (self.is_held(pos) as i8 - self.is_held(neg) as i8) as f32
        };
        Vec2::new(
            axis(DirectionKey::ArrowLeft, DirectionKey::ArrowRight),
            axis(DirectionKey::ArrowUp, DirectionKey::ArrowDown),
        )
    }
}
