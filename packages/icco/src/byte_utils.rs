// Big-endian accessors over payload bytes. Callers check lengths before
// reading; every message layout is validated against its exact size first.

pub trait ByteUtils {
    fn get_u8(&self, index: usize) -> u8;
    fn get_u16(&self, index: usize) -> u16;
    fn get_u64(&self, index: usize) -> u64;
    fn get_u128(&self, index: usize) -> u128;
    fn get_bytes32(&self, index: usize) -> [u8; 32];

    /// Reads a 32-byte big-endian integer, returning `None` when the value
    /// does not fit in a u128.
    fn get_u256_as_u128(&self, index: usize) -> Option<u128>;

    /// Reads a 32-byte big-endian integer, returning `None` when the value
    /// does not fit in a u64.
    fn get_u256_as_u64(&self, index: usize) -> Option<u64>;
}

impl ByteUtils for [u8] {
    fn get_u8(&self, index: usize) -> u8 {
        self[index]
    }

    fn get_u16(&self, index: usize) -> u16 {
        let mut bytes = [0u8; 2];
        bytes.copy_from_slice(&self[index..index + 2]);
        u16::from_be_bytes(bytes)
    }

    fn get_u64(&self, index: usize) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self[index..index + 8]);
        u64::from_be_bytes(bytes)
    }

    fn get_u128(&self, index: usize) -> u128 {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&self[index..index + 16]);
        u128::from_be_bytes(bytes)
    }

    fn get_bytes32(&self, index: usize) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&self[index..index + 32]);
        bytes
    }

    fn get_u256_as_u128(&self, index: usize) -> Option<u128> {
        if self[index..index + 16].iter().any(|&b| b != 0) {
            return None;
        }
        Some(self.get_u128(index + 16))
    }

    fn get_u256_as_u64(&self, index: usize) -> Option<u64> {
        if self[index..index + 24].iter().any(|&b| b != 0) {
            return None;
        }
        Some(self.get_u64(index + 24))
    }
}

/// Appends `value` as a 32-byte big-endian integer.
pub fn extend_u256_from_u128(buf: &mut Vec<u8>, value: u128) {
    buf.extend([0u8; 16]);
    buf.extend(value.to_be_bytes());
}

/// Appends `value` as a 32-byte big-endian integer.
pub fn extend_u256_from_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend([0u8; 24]);
    buf.extend(value.to_be_bytes());
}
