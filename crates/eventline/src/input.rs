use egui::{Pos2, Vec2};

/// Edge-and-level state of one mouse button for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Went down this tick.
    pub down: bool,
    /// Is currently held.
    pub held: bool,
    /// Went up this tick.
    pub released: bool,
}

impl ButtonState {
    pub const UP: Self = Self {
        down: false,
        held: false,
        released: false,
    };

    pub fn pressed() -> Self {
        Self {
            down: true,
            held: true,
            released: false,
        }
    }
    pub fn held() -> Self {
        Self {
            down: false,
            held: true,
            released: false,
        }
    }
    pub fn released() -> Self {
        Self {
            down: false,
            held: false,
            released: true,
        }
    }
}

/// Everything the graph reads from the outside world in one update tick.
/// Built from egui input by the graph tab; synthesized directly in tests.
#[derive(Clone, Debug)]
pub struct InputState {
    pub mouse: Pos2,
    pub mouse_delta: Vec2,
    pub left: ButtonState,
    pub middle: ButtonState,
    pub right: ButtonState,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub scroll_delta: Vec2,
}

// far enough away that it hits nothing, used when egui has no pointer yet
const OFFSCREEN: Pos2 = Pos2::new(-1.0e6, -1.0e6);

impl Default for InputState {
    fn default() -> Self {
        Self {
            mouse: OFFSCREEN,
            mouse_delta: Vec2::ZERO,
            left: ButtonState::UP,
            middle: ButtonState::UP,
            right: ButtonState::UP,
            shift: false,
            ctrl: false,
            alt: false,
            scroll_delta: Vec2::ZERO,
        }
    }
}

impl InputState {
    pub fn from_egui(input: &egui::InputState) -> Self {
        use egui::PointerButton;

        let button = |b: PointerButton| ButtonState {
            down: input.pointer.button_pressed(b),
            held: input.pointer.button_down(b),
            released: input.pointer.button_released(b),
        };

        Self {
            mouse: input.pointer.latest_pos().unwrap_or(OFFSCREEN),
            mouse_delta: input.pointer.delta(),
            left: button(PointerButton::Primary),
            middle: button(PointerButton::Middle),
            right: button(PointerButton::Secondary),
            shift: input.modifiers.shift,
            ctrl: input.modifiers.ctrl,
            alt: input.modifiers.alt,
            scroll_delta: input.raw_scroll_delta,
        }
    }
}
