use chip8::display::{Display, DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Characters used for increasing pixel intensity.
const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];

#[derive(Clone, Copy, Debug, PartialEq)]
enum PixelState {
    On,
    Decaying { age: f32 },
    Off,
}

impl PixelState {
    fn step(self, on: bool, delta_age: f32) -> PixelState {
        use self::PixelState::*;
        match (on, self) {
            (true, _) => On,
            (false, Off) => Off,
            (false, Decaying { age }) if age >= 1.0 => Off,
            (false, Decaying { age }) => Decaying { age: age + delta_age },
            (false, On) => Decaying { age: 0.0 },
        }
    }
}

/// Text rendering of the frame buffer where switched off pixels fade out over
/// `pixel_decay_time` seconds, which hides the flicker of XOR drawn sprites.
pub struct RenderBuf {
    pixel_decay_time: f32,
    state: [PixelState; DISPLAY_WIDTH * DISPLAY_HEIGHT],
    pixel_intensity: [f32; DISPLAY_WIDTH * DISPLAY_HEIGHT],
}

impl RenderBuf {
    pub fn new(pixel_decay_time: f32) -> RenderBuf {
        RenderBuf {
            pixel_decay_time,
            state: [PixelState::Off; DISPLAY_WIDTH * DISPLAY_HEIGHT],
            pixel_intensity: [0.0; DISPLAY_WIDTH * DISPLAY_HEIGHT],
        }
    }

    /// Folds the current frame in, `dt` seconds after the previous one.
    pub fn update(&mut self, frame: &Display, dt: f32) {
        use self::PixelState::*;

        // delta time represented in pixel age.
        let delta_age = if self.pixel_decay_time > 0.0 {
            dt / self.pixel_decay_time
        } else {
            1.0
        };

        for (index, &on) in frame.pixels().iter().enumerate() {
            let new_state = self.state[index].step(on, delta_age);

            self.state[index] = new_state;
            self.pixel_intensity[index] = match new_state {
                Off => 0.0,
                On => 1.0,
                Decaying { age } => Self::pixel_intensity_for_age(age),
            };
        }
    }

    fn pixel_intensity_for_age(age: f32) -> f32 {
        let c = -2f32.powf((age - 1.0) * 5.0) + 1.0;

        // clamp
        f32::min(f32::max(0.0, c), 1.0)
    }

    /// Whether some pixel is still fading out.
    pub fn is_fading(&self) -> bool {
        self.state.iter().any(|state| match *state {
            PixelState::Decaying { .. } => true,
            _ => false,
        })
    }

    pub fn get_intensity(&self, x: usize, y: usize) -> f32 {
        self.pixel_intensity[y * DISPLAY_WIDTH + x]
    }

    /// One line of text per screen row.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity((DISPLAY_WIDTH * 3 + 1) * DISPLAY_HEIGHT);
        for y in 0..DISPLAY_HEIGHT {
            for x in 0..DISPLAY_WIDTH {
                let intensity = self.get_intensity(x, y);
                let shade = (intensity * (SHADES.len() - 1) as f32).ceil() as usize;
                text.push(SHADES[shade.min(SHADES.len() - 1)]);
            }
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lit_pixels_render_solid() {
        let mut display = Display::new();
        display.draw(0, 0, &[0x80]);

        let mut render_buf = RenderBuf::new(0.3);
        render_buf.update(&display, 0.016);
        assert_eq!(render_buf.get_intensity(0, 0), 1.0);
        assert_eq!(render_buf.get_intensity(1, 0), 0.0);

        let text = render_buf.to_text();
        assert_eq!(text.lines().count(), DISPLAY_HEIGHT);
        assert!(text.starts_with("█ "));
    }

    #[test]
    fn switched_off_pixels_fade_out() {
        let mut display = Display::new();
        display.draw(0, 0, &[0x80]);

        let mut render_buf = RenderBuf::new(0.1);
        render_buf.update(&display, 0.016);

        display.clear();
        render_buf.update(&display, 0.05);
        let fading = render_buf.get_intensity(0, 0);
        assert!(fading > 0.0 && fading <= 1.0);
        assert!(render_buf.is_fading());

        for _ in 0..4 {
            render_buf.update(&display, 0.05);
        }
        assert_eq!(render_buf.get_intensity(0, 0), 0.0);
        assert!(!render_buf.is_fading());
    }
}
