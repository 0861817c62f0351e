//! 256KB memory mapper RAM.
//!
//! Sixteen 16KB segments in one backing store. Each CPU page shows one
//! segment, chosen by writing its number to port 0xFC + page. Accesses are
//! resolved to (segment, offset) every time; nothing caches a page base.

use emu_core::{IoDevice, MemoryDevice};

/// Bytes per CPU page and per mapper segment.
pub const PAGE_SIZE: usize = 0x4000;

/// Segments in a 256KB mapper.
pub const SEGMENT_COUNT: usize = 16;

/// Port selecting the segment for page 0. Pages 1-3 follow.
const PORT_BASE: u8 = 0xFC;

pub struct MapperRam {
    store: Vec<u8>,
    /// Segment shown in each CPU page.
    pages: [u8; 4],
}

impl MapperRam {
    /// A mapper filled with `fill`, pages 0-3 showing segments 15-12.
    #[must_use]
    pub fn new(fill: u8) -> Self {
        Self {
            store: vec![fill; SEGMENT_COUNT * PAGE_SIZE],
            pages: [15, 14, 13, 12],
        }
    }

    #[must_use]
    pub fn segment(&self, page: u8) -> u8 {
        self.pages[usize::from(page & 3)]
    }

    pub fn select(&mut self, page: u8, segment: u8) {
        let segment = segment & (SEGMENT_COUNT as u8 - 1);
        log::debug!("mapper: page {} -> segment {segment}", page & 3);
        self.pages[usize::from(page & 3)] = segment;
    }

    /// The raw bytes of one segment.
    #[must_use]
    pub fn segment_data(&self, segment: u8) -> &[u8] {
        let start = usize::from(segment & (SEGMENT_COUNT as u8 - 1)) * PAGE_SIZE;
        &self.store[start..start + PAGE_SIZE]
    }

    fn index(&self, address: u16) -> usize {
        let page = usize::from(address >> 14);
        let offset = usize::from(address) % PAGE_SIZE;
        usize::from(self.pages[page]) * PAGE_SIZE + offset
    }
}

impl MemoryDevice for MapperRam {
    fn write_mem(&mut self, address: u16, value: u8) -> bool {
        let index = self.index(address);
        self.store[index] = value;
        true
    }

    fn read_mem(&self, address: u16) -> u8 {
        self.store[self.index(address)]
    }
}

impl IoDevice for MapperRam {
    fn out_port(&mut self, port: u8, value: u8) -> bool {
        if port < PORT_BASE {
            return false;
        }
        self.select(port - PORT_BASE, value);
        true
    }

    fn in_port(&mut self, port: u8) -> Option<u8> {
        (port >= PORT_BASE).then(|| self.segment(port - PORT_BASE))
    }
}
