use std::io::Write;

/// Rings the terminal bell while the machine's tone flag is up.
pub struct Beeper<W: Write> {
    out: W,
    beeping: bool,
}

impl<W: Write> Beeper<W> {
    pub fn new(out: W) -> Beeper<W> {
        Beeper {
            out,
            beeping: false,
        }
    }

    /// Emits one bell for every rising edge of `beeping`.
    pub fn set_beeping(&mut self, beeping: bool) -> ::Result<()> {
        if self.beeping != beeping {
            self.beeping = beeping;
            if beeping {
                self.out.write_all(b"\x07")?;
                self.out.flush()?;
            }
        }
        Ok(())
    }

    pub fn is_beeping(&self) -> bool {
        self.beeping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bell_on_rising_edge_only() {
        let mut beeper = Beeper::new(Vec::new());
        beeper.set_beeping(true).unwrap();
        beeper.set_beeping(true).unwrap();
        beeper.set_beeping(false).unwrap();
        beeper.set_beeping(true).unwrap();
        assert!(beeper.is_beeping());
        assert_eq!(beeper.out, b"\x07\x07".to_vec());
    }
}
