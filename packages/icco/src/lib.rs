pub mod allocation;
pub mod byte_utils;
pub mod common;
pub mod cryptography;
pub mod error;
pub mod messages;
pub mod replay;
#[cfg(feature = "testing")]
pub mod testing;
pub mod wormhole;
