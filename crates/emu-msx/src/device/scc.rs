//! Konami SCC sound cartridge.
//!
//! Writing 0x3F to 0x9000 exposes the register window at 0x9800-0x98FF.
//! Writes that land are shadowed locally and forwarded to the sound core.

use emu_core::MemoryDevice;

use crate::sound::SoundChip;

const MODE_ADDRESS: u16 = 0x9000;
/// Mode latch value that enables the register window.
const MODE_SCC: u8 = 0x3F;
const WINDOW_START: u16 = 0x9800;
const WINDOW_END: u16 = 0x98FF;
/// Channel enable register.
const CHANNEL_ENABLE: u16 = 0x988F;

pub struct Scc {
    chip: Box<dyn SoundChip>,
    mode: u8,
    window: [u8; 256],
}

impl Scc {
    #[must_use]
    pub fn new(chip: Box<dyn SoundChip>) -> Self {
        Self {
            chip,
            mode: 0,
            window: [0; 256],
        }
    }

    /// Current value of the 0x9000 latch.
    #[must_use]
    pub fn mode(&self) -> u8 {
        self.mode
    }

    fn window_open(&self, address: u16) -> bool {
        self.mode == MODE_SCC && (WINDOW_START..=WINDOW_END).contains(&address)
    }

    /// Disable all five channels.
    pub fn silence(&mut self) {
        self.chip.write_register(CHANNEL_ENABLE, 0);
    }
}

impl MemoryDevice for Scc {
    fn write_mem(&mut self, address: u16, value: u8) -> bool {
        if address == MODE_ADDRESS {
            self.mode = value;
        } else if self.window_open(address) {
            self.window[usize::from(address - WINDOW_START)] = value;
        } else {
            return false;
        }
        self.chip.write_register(address, value);
        true
    }

    fn read_mem(&self, address: u16) -> u8 {
        if address == MODE_ADDRESS {
            self.mode
        } else if self.window_open(address) {
            self.window[usize::from(address - WINDOW_START)]
        } else {
            0xFF
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::{RecordingChip, SoundEvent};

    #[test]
    fn window_closed_until_mode_is_0x3f() {
        let chip = RecordingChip::new();
        let mut scc = Scc::new(Box::new(chip.clone()));

        assert!(!scc.write_mem(0x9800, 0x12));
        assert_eq!(scc.read_mem(0x9800), 0xFF);

        assert!(scc.write_mem(0x9000, 0x3F));
        assert!(scc.write_mem(0x9800, 0x12));
        assert_eq!(scc.read_mem(0x9800), 0x12);
        assert_eq!(scc.read_mem(0x9000), 0x3F);

        assert_eq!(chip.events(), vec![
            SoundEvent::Register(0x9000, 0x3F),
            SoundEvent::Register(0x9800, 0x12),
        ]);
    }

    #[test]
    fn closing_the_window_hides_the_shadow() {
        let mut scc = Scc::new(Box::new(RecordingChip::new()));
        scc.write_mem(0x9000, 0x3F);
        scc.write_mem(0x98FF, 0x55);
        scc.write_mem(0x9000, 0x00);
        assert_eq!(scc.read_mem(0x98FF), 0xFF);
        assert_eq!(scc.mode(), 0x00);
    }

    #[test]
    fn silence_clears_channel_enable() {
        let chip = RecordingChip::new();
        let mut scc = Scc::new(Box::new(chip.clone()));
        scc.silence();
        assert_eq!(chip.events(), vec![SoundEvent::Register(0x988F, 0)]);
    }
}
