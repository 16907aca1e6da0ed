use cosmwasm_std::{StdResult, Storage};
use cw_storage_plus::Map;

use crate::{error::CommonError, wormhole::ParsedVAA};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Admission {
    FirstSeen,
    AlreadySeen,
}

/// Replay key of a verified VAA: the bridge's hash of the whole signed body.
/// Emitter, sequence and timestamp are part of it, so two distinct messages
/// carrying identical payloads never collide.
pub fn vaa_digest(parsed: &ParsedVAA) -> Result<[u8; 32], CommonError> {
    parsed
        .hash
        .as_slice()
        .try_into()
        .map_err(|_| CommonError::malformed("vaa hash is not 32 bytes"))
}

/// At-most-once record of processed message bodies, kept in the host
/// contract's storage under `namespace`. Entries never expire.
pub struct ReplayGuard<'a>(Map<'a, &'a [u8], bool>);

impl<'a> ReplayGuard<'a> {
    pub const fn new(namespace: &'a str) -> Self {
        ReplayGuard(Map::new(namespace))
    }

    pub fn is_consumed(&self, storage: &dyn Storage, digest: &[u8; 32]) -> bool {
        self.0.has(storage, digest.as_slice())
    }

    pub fn admit(&self, storage: &mut dyn Storage, digest: &[u8; 32]) -> StdResult<Admission> {
        if self.is_consumed(storage, digest) {
            return Ok(Admission::AlreadySeen);
        }
        self.0.save(storage, digest.as_slice(), &true)?;
        Ok(Admission::FirstSeen)
    }
}
