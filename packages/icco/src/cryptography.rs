use cosmwasm_std::Uint128;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::{
    byte_utils::{extend_u256_from_u128, extend_u256_from_u64},
    common::SaleId,
    error::CommonError,
};

pub const SIGNATURE_LEN: usize = 65;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// Last 20 bytes of the keccak256 of the uncompressed public key.
pub fn ethereum_address(key: &VerifyingKey) -> [u8; 20] {
    let encoded = key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..32]);
    address
}

/// Recovers the signer of a 32-byte prehash from an `r ‖ s ‖ v` signature.
/// Accepts both raw (0, 1) and Ethereum-offset (27, 28) recovery ids.
pub fn ethereum_ecrecover(sig: &[u8], msg: &[u8; 32]) -> Result<[u8; 20], CommonError> {
    if sig.len() != SIGNATURE_LEN {
        return Err(CommonError::InvalidKycSignature);
    }

    let v = match sig[64] {
        v @ 0..=1 => v,
        v @ 27..=28 => v - 27,
        _ => return Err(CommonError::InvalidKycSignature),
    };
    let recovery_id = RecoveryId::from_byte(v).ok_or(CommonError::InvalidKycSignature)?;
    let signature =
        Signature::from_slice(&sig[0..64]).map_err(|_| CommonError::InvalidKycSignature)?;

    let recovered = VerifyingKey::recover_from_prehash(msg, &signature, recovery_id)
        .map_err(|_| CommonError::InvalidKycSignature)?;
    Ok(ethereum_address(&recovered))
}

/// Identifier of a local wallet as it appears in KYC attestations.
pub fn wallet_id(wallet: &str) -> [u8; 32] {
    keccak256(wallet.as_bytes())
}

/// Message a KYC authority signs to approve one contribution.
pub fn kyc_digest(
    conductor_address: &[u8; 32],
    sale_id: &SaleId,
    token_index: u8,
    amount: Uint128,
    wallet_id: &[u8; 32],
    previous_contribution: Uint128,
) -> [u8; 32] {
    let mut encoded = Vec::with_capacity(32 * 6);
    encoded.extend(conductor_address);
    encoded.extend(sale_id);
    extend_u256_from_u64(&mut encoded, token_index as u64);
    extend_u256_from_u128(&mut encoded, amount.u128());
    encoded.extend(wallet_id);
    extend_u256_from_u128(&mut encoded, previous_contribution.u128());
    keccak256(&encoded)
}

/// Checks that `sig` over `digest` was produced by the Ethereum address held
/// in the last 20 bytes of `kyc_authority`.
pub fn verify_kyc_signature(
    kyc_authority: &[u8; 32],
    digest: &[u8; 32],
    sig: &[u8],
) -> Result<(), CommonError> {
    let recovered = ethereum_ecrecover(sig, digest)?;
    if recovered != kyc_authority[12..32] {
        return Err(CommonError::InvalidKycSignature);
    }
    Ok(())
}

#[cfg(test)]
pub mod test {
    use super::*;
    use itertools::izip;
    use k256::ecdsa::SigningKey;

    #[test]
    fn test_ethereum_ecrecover() -> Result<(), CommonError> {
        let msgs = [
            "d62efc12bf7722b6cb53a67ce1179e6c3ef88daab5aa33e55c8ded771480802d",
            "ae82e15be2effa4800bc09610d54512abe1f52be6802a87385b895a6c8e4e0fd",
            "13dec14fa12d44fc90d66b322d9f2302590660b205c152b030ab4aafbea4aa6f",
            "7766bedc7da3c5bb93a70dcba06eda741f8da7732926d80a33e319d1a57b3e1b",
        ];
        let signatures = [
            "dc4d6e7afa4d286eeec1547d5bc1631d25b20748c6152b803ddc124debfbc2f95f93e61e2c6c0e3fa9a1d7d060da5901b94c1769d7e76fb083087320e853885400",
            "644659488ec8976cbc3a6b8118c826ca9753056136044d1b5bc62dea21bde8c44e2c4adc607bf32850f603ecf67a7028828f2fdc5bcf430b2c64f406bf1bffe400",
            "8b79f0f57c2a4e0ce4f9725c1e0f5f2b639cfbb03439bc6454ee59b5c46fb2cb3a562b272e9ffd1ea6e121292e4746298d44450a4d1554820cd7f93fd518c3a801",
            "4f8889df8c744e8c041e7f7aaf133e1da6708357d400d0ea7f19c15b70c1c0b37c8a3ec23d841ecb05e216a53f7c22e435185e51e557bfd522511309a0af0bfd01",
        ];

        let signer: [u8; 20] = hex::decode("1df62f291b2e969fb0849d99d9ce41e2f137006e")
            .unwrap()
            .try_into()
            .unwrap();

        for (msg, signature) in izip!(msgs.iter(), signatures.iter()) {
            let msg: [u8; 32] = hex::decode(msg).unwrap().try_into().unwrap();
            let mut signature = hex::decode(signature).unwrap();
            assert_eq!(ethereum_ecrecover(&signature, &msg)?, signer);

            // same signature with an ethereum style recovery id
            signature[64] += 27;
            assert_eq!(ethereum_ecrecover(&signature, &msg)?, signer);
        }
        Ok(())
    }

    #[test]
    fn malformed_signatures() {
        let msg = [1u8; 32];
        assert_eq!(
            ethereum_ecrecover(&[0u8; 64], &msg),
            Err(CommonError::InvalidKycSignature)
        );

        let mut sig = [1u8; 65];
        sig[64] = 2;
        assert_eq!(
            ethereum_ecrecover(&sig, &msg),
            Err(CommonError::InvalidKycSignature)
        );
    }

    #[test]
    fn kyc_signature_round_trip() {
        let authority_key = SigningKey::from_slice(&[7u8; 32]).unwrap();
        let mut kyc_authority = [0u8; 32];
        kyc_authority[12..].copy_from_slice(&ethereum_address(authority_key.verifying_key()));

        let digest = kyc_digest(
            &[9u8; 32],
            &[0u8; 32],
            1,
            Uint128::new(5),
            &wallet_id("buyer"),
            Uint128::zero(),
        );
        let (signature, recovery_id) = authority_key.sign_prehash_recoverable(&digest).unwrap();
        let mut sig = signature.to_bytes().to_vec();
        sig.push(recovery_id.to_byte());

        assert_eq!(verify_kyc_signature(&kyc_authority, &digest, &sig), Ok(()));

        // any change to the approved contribution invalidates the signature
        let other = kyc_digest(
            &[9u8; 32],
            &[0u8; 32],
            1,
            Uint128::new(6),
            &wallet_id("buyer"),
            Uint128::zero(),
        );
        assert_eq!(
            verify_kyc_signature(&kyc_authority, &other, &sig),
            Err(CommonError::InvalidKycSignature)
        );
    }

    #[test]
    fn kyc_digest_layout() {
        let digest = kyc_digest(
            &[0u8; 32],
            &[0u8; 32],
            0,
            Uint128::zero(),
            &[0u8; 32],
            Uint128::zero(),
        );
        assert_eq!(digest, keccak256(&[0u8; 192]));
    }
}
