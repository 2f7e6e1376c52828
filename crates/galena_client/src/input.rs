use bitflags::bitflags;
use glam::Vec2;

bitflags! {
    /// Movement buttons currently held, delivered by the embedding input
    /// source as discrete press/release events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Buttons: u8 {
        const FORWARD = 0b0000_0001;
        const BACK    = 0b0000_0010;
        const LEFT    = 0b0000_0100;
        const RIGHT   = 0b0000_1000;
        const JUMP    = 0b0001_0000;
    }
}

#[derive(Debug)]
pub struct InputState {
    buttons: Buttons,
    pub mouse_delta: Vec2,
    pub left_click: bool,
    pub right_click: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            buttons: Buttons::empty(),
            mouse_delta: Vec2::ZERO,
            left_click: false,
            right_click: false,
        }
    }
}

impl InputState {
    pub fn press(&mut self, button: Buttons) {
        self.buttons.insert(button);
    }

    pub fn release(&mut self, button: Buttons) {
        self.buttons.remove(button);
    }

    pub fn is_pressed(&self, button: Buttons) -> bool {
        self.buttons.contains(button)
    }

    pub fn add_mouse_delta(&mut self, delta: Vec2) {
        self.mouse_delta += delta;
    }

    pub fn clear_frame(&mut self) {
        self.mouse_delta = Vec2::ZERO;
    }

    pub fn consume_left_click(&mut self) -> bool {
        let value = self.left_click;
        self.left_click = false;
        value
    }

    pub fn consume_right_click(&mut self) -> bool {
        let value = self.right_click;
        self.right_click = false;
        value
    }
}
