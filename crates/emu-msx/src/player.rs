//! Bundled playback program for MGSDRV songs.
//!
//! Loaded at 0x0100 after the driver has gone resident. It initializes the
//! driver, starts the song at 0x8000, then calls the driver's interrupt
//! routine once per frame between ST16MS and WT16MS:
//!
//! ```text
//!         di
//!         ld   a,4
//!         out  (0xFD),a      ; page 1 -> segment 4
//!         call MGS_SYSCK
//!         call MGS_INITM
//!         xor  a
//!         ld   b,0
//!         call MGS_MSVST     ; master volume
//!         ld   de,0x8000
//!         ld   b,0xFF
//!         ld   hl,0xFFFF
//!         call MGS_PLYST
//!         ei
//! loop:   call ST16MS
//!         call MGS_INTER
//!         call WT16MS
//!         jr   loop
//! ```

/// Load and start address for COM programs.
pub const TPA_START: u16 = 0x0100;

/// Stack top for both runs.
pub const STACK_TOP: u16 = 0xD400;

/// Where the song data is loaded.
pub const SONG_ADDRESS: u16 = 0x8000;

pub const PLAYER_COM: [u8; 40] = [
    0xF3, 0x3E, 0x04, 0xD3, 0xFD, 0xCD, 0x10, 0x60, 0xCD, 0x13, 0x60, 0xAF, 0x06, 0x00, 0xCD, 0x22, //
    0x60, 0x11, 0x00, 0x80, 0x06, 0xFF, 0x21, 0xFF, 0xFF, 0xCD, 0x16, 0x60, 0xFB, 0xCD, 0x39, 0x00, //
    0xCD, 0x1F, 0x60, 0xCD, 0x3A, 0x00, 0x18, 0xF5,
];
