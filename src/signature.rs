//! Device electronic signature
//!
//! Factory-programmed values in the information block.

use crate::pac::memory_map::{DESIG_FLASH_SIZE_BASE, DESIG_UNIQUE_ID_BASE};

/// Returns the flash size in KByte
pub fn flash_size_kb() -> u16 {
    const FLASH_SIZE: *const u16 = DESIG_FLASH_SIZE_BASE as *const u16;

    // NOTE(unsafe) read-only location, always mapped
    unsafe { core::ptr::read_volatile(FLASH_SIZE) }
}

/// Returns the 96-bit unique device ID, lowest word first
pub fn unique_id() -> [u32; 3] {
    const UNIQUE_ID: *const [u32; 3] = DESIG_UNIQUE_ID_BASE as *const [u32; 3];

    // NOTE(unsafe) read-only location, always mapped
    unsafe { core::ptr::read_volatile(UNIQUE_ID) }
}

/// Returns the unique device ID as bytes, in memory order
pub fn unique_id_bytes() -> [u8; 12] {
    id_bytes(unique_id())
}

/// Lays the ID words out little-endian, the way they sit in the information block
fn id_bytes(words: [u32; 3]) -> [u8; 12] {
    let mut bytes = [0u8; 12];
    for (chunk, word) in bytes.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use crate::pac::memory_map::INFO_BASE;

    #[test]
    fn signature_lives_in_the_information_block() {
        assert_eq!(super::DESIG_FLASH_SIZE_BASE, 0x1FFF_F7E0);
        assert_eq!(super::DESIG_UNIQUE_ID_BASE, 0x1FFF_F7AC);
        assert_eq!(super::DESIG_FLASH_SIZE_BASE - INFO_BASE, 0x7E0);
    }

    #[test]
    fn id_bytes_follow_memory_order() {
        let bytes = super::id_bytes([0x0403_0201, 0x0807_0605, 0x0C0B_0A09]);
        assert_eq!(bytes, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }
}
