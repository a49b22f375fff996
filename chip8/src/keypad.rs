pub const KEY_COUNT: usize = 16;

/// State of the 16-key hex keypad, written by the input collaborator between cycles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Keypad {
        Keypad::default()
    }

    /// Keys above `0xF` are ignored.
    pub fn set(&mut self, key: u8, pressed: bool) {
        if let Some(k) = self.keys.get_mut(key as usize) {
            *k = pressed;
        }
    }

    pub fn set_all(&mut self, keys: [bool; KEY_COUNT]) {
        self.keys = keys;
    }

    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }

    /// Keys above `0xF` never read as pressed.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).cloned().unwrap_or(false)
    }

    /// Lowest pressed key, if any.
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&pressed| pressed).map(|key| key as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowest_key_wins() {
        let mut keypad = Keypad::new();
        assert_eq!(keypad.first_pressed(), None);
        keypad.set(0xC, true);
        keypad.set(0x5, true);
        assert_eq!(keypad.first_pressed(), Some(0x5));
        keypad.set(0x5, false);
        assert_eq!(keypad.first_pressed(), Some(0xC));
    }

    #[test]
    fn out_of_range_keys() {
        let mut keypad = Keypad::new();
        keypad.set(0x10, true);
        assert_eq!(keypad.first_pressed(), None);
        assert!(!keypad.is_pressed(0x10));
        assert!(!keypad.is_pressed(0xFF));
    }

    #[test]
    fn set_all_overwrites() {
        let mut keypad = Keypad::new();
        keypad.set(0x1, true);
        let mut keys = [false; KEY_COUNT];
        keys[0xF] = true;
        keypad.set_all(keys);
        assert!(!keypad.is_pressed(0x1));
        assert!(keypad.is_pressed(0xF));
        keypad.release_all();
        assert!(!keypad.is_pressed(0xF));
    }
}
