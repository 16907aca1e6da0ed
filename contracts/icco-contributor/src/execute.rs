use cosmwasm_std::{Addr, Binary, Deps, DepsMut, Env, MessageInfo, Response, Storage, Uint128};

use icco::{
    common::SaleStatus,
    cryptography::{kyc_digest, verify_kyc_signature, wallet_id},
    error::CommonError,
    messages::{AuthorityUpdated, SaleAborted, SaleInit, SaleSealed},
    replay::vaa_digest,
    wormhole::{parse_vaa, post_message, ParsedVAA},
};

use crate::{
    error::ContributorError,
    state::{Buyer, Config, Sale, BUYERS, CONFIG, CONSUMED_MESSAGES, SALES},
};

pub fn init_sale(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    signed_vaa: &Binary,
    native_token_decimals: u8,
) -> Result<Response, ContributorError> {
    let (cfg, parsed) = verify_conductor_vaa(deps.as_ref(), &env, signed_vaa)?;
    let digest = vaa_digest(&parsed)?;
    if CONSUMED_MESSAGES.is_consumed(deps.storage, &digest) {
        return Ok(already_seen("init_sale", &digest));
    }

    let sale_init = SaleInit::deserialize(&parsed.payload)?;
    if sale_init.contributor_chain != cfg.chain_id {
        return Err(ContributorError::WrongChain);
    }

    let sale_id = sale_init.sale_id.as_slice();
    if SALES.has(deps.storage, sale_id) {
        return Err(ContributorError::SaleAlreadyExists);
    }
    let sale = Sale::from_sale_init(&sale_init, native_token_decimals)?;

    CONSUMED_MESSAGES.admit(deps.storage, &digest)?;
    SALES.save(deps.storage, sale_id, &sale)?;

    Ok(Response::new()
        .add_attribute("action", "init_sale")
        .add_attribute("sale_id", hex::encode(&sale.id))
        .add_attribute("token_chain", sale.token_chain.to_string())
        .add_attribute("token_address", hex::encode(&sale.token_address))
        .add_attribute("num_accepted_tokens", sale.totals.len().to_string()))
}

pub fn contribute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    sale_id: &[u8],
    token_index: u8,
    amount: Uint128,
    kyc_signature: Option<Binary>,
) -> Result<Response, ContributorError> {
    if amount.is_zero() {
        return Err(ContributorError::ZeroAmount);
    }

    let mut sale = load_sale(deps.storage, sale_id)?;
    let idx = sale.update_total_contributions(env.block.time.seconds(), token_index, amount)?;

    let buyer_key = (sale_id, &info.sender);
    let mut buyer = BUYERS
        .may_load(deps.storage, buyer_key)?
        .unwrap_or_else(|| Buyer::new(sale.totals.len()));

    if sale.requires_kyc() {
        let cfg = CONFIG.load(deps.storage)?;
        let signature = kyc_signature.ok_or(CommonError::InvalidKycSignature)?;
        let digest = kyc_digest(
            &cfg.conductor_address,
            &sale.id,
            token_index,
            amount,
            &wallet_id(info.sender.as_str()),
            buyer.get(idx)?.amount,
        );
        verify_kyc_signature(&sale.kyc_authority, &digest, signature.as_slice())?;
    }

    let contributed = buyer.contribute(idx, amount)?;

    SALES.save(deps.storage, sale_id, &sale)?;
    BUYERS.save(deps.storage, buyer_key, &buyer)?;

    Ok(Response::new()
        .add_attribute("action", "contribute")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("token_index", token_index.to_string())
        .add_attribute("buyer", info.sender.as_str())
        .add_attribute("amount", amount.to_string())
        .add_attribute("contributed", contributed.to_string()))
}

pub fn attest_contributions(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    sale_id: &[u8],
) -> Result<Response, ContributorError> {
    let cfg = CONFIG.load(deps.storage)?;
    let sale = load_sale(deps.storage, sale_id)?;
    let attested = sale.serialize_contributions(env.block.time.seconds(), cfg.chain_id)?;

    Ok(Response::new()
        .add_message(post_message(cfg.wormhole.as_str(), attested.clone())?)
        .set_data(Binary::from(attested))
        .add_attribute("action", "attest_contributions")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("chain_id", cfg.chain_id.to_string()))
}

pub fn sale_sealed(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    signed_vaa: &Binary,
) -> Result<Response, ContributorError> {
    let (_, parsed) = verify_conductor_vaa(deps.as_ref(), &env, signed_vaa)?;
    let digest = vaa_digest(&parsed)?;
    if CONSUMED_MESSAGES.is_consumed(deps.storage, &digest) {
        return Ok(already_seen("sale_sealed", &digest));
    }

    let sale_sealed = SaleSealed::deserialize(&parsed.payload)?;
    let sale_id = sale_sealed.sale_id.as_slice();
    let mut sale = load_sale(deps.storage, sale_id)?;
    sale.parse_sale_sealed(&sale_sealed)?;

    CONSUMED_MESSAGES.admit(deps.storage, &digest)?;
    SALES.save(deps.storage, sale_id, &sale)?;

    Ok(Response::new()
        .add_attribute("action", "sale_sealed")
        .add_attribute("sale_id", hex::encode(sale_id)))
}

pub fn sale_aborted(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    signed_vaa: &Binary,
) -> Result<Response, ContributorError> {
    let (_, parsed) = verify_conductor_vaa(deps.as_ref(), &env, signed_vaa)?;
    let digest = vaa_digest(&parsed)?;
    if CONSUMED_MESSAGES.is_consumed(deps.storage, &digest) {
        return Ok(already_seen("sale_aborted", &digest));
    }

    let sale_aborted = SaleAborted::deserialize(&parsed.payload)?;
    let sale_id = sale_aborted.sale_id.as_slice();
    let mut sale = load_sale(deps.storage, sale_id)?;
    sale.parse_sale_aborted()?;

    CONSUMED_MESSAGES.admit(deps.storage, &digest)?;
    SALES.save(deps.storage, sale_id, &sale)?;

    Ok(Response::new()
        .add_attribute("action", "sale_aborted")
        .add_attribute("sale_id", hex::encode(sale_id)))
}

pub fn update_kyc_authority(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    signed_vaa: &Binary,
) -> Result<Response, ContributorError> {
    let (_, parsed) = verify_conductor_vaa(deps.as_ref(), &env, signed_vaa)?;
    let digest = vaa_digest(&parsed)?;
    if CONSUMED_MESSAGES.is_consumed(deps.storage, &digest) {
        return Ok(already_seen("update_kyc_authority", &digest));
    }

    let authority_updated = AuthorityUpdated::deserialize(&parsed.payload)?;
    let sale_id = authority_updated.sale_id.as_slice();
    let mut sale = load_sale(deps.storage, sale_id)?;
    sale.update_kyc_authority(authority_updated.new_authority)?;

    CONSUMED_MESSAGES.admit(deps.storage, &digest)?;
    SALES.save(deps.storage, sale_id, &sale)?;

    Ok(Response::new()
        .add_attribute("action", "update_kyc_authority")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("kyc_authority", hex::encode(&sale.kyc_authority)))
}

pub fn claim_allocation(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    sale_id: &[u8],
    token_index: u8,
) -> Result<Response, ContributorError> {
    let sale = load_sale(deps.storage, sale_id)?;
    if sale.status != SaleStatus::Sealed {
        return Err(ContributorError::SaleNotSealed);
    }

    let idx = sale.get_index(token_index)?;
    let buyer_key = (sale_id, &info.sender);
    let mut buyer = load_buyer(deps.storage, buyer_key)?;
    let allocation = buyer.claim_allocation(idx, &sale.totals[idx])?;
    BUYERS.save(deps.storage, buyer_key, &buyer)?;

    Ok(Response::new()
        .add_attribute("action", "claim_allocation")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("token_index", token_index.to_string())
        .add_attribute("buyer", info.sender.as_str())
        .add_attribute("allocation", allocation.to_string()))
}

pub fn claim_excess(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    sale_id: &[u8],
    token_index: u8,
) -> Result<Response, ContributorError> {
    let sale = load_sale(deps.storage, sale_id)?;
    if sale.status != SaleStatus::Sealed {
        return Err(ContributorError::SaleNotSealed);
    }

    let idx = sale.get_index(token_index)?;
    let buyer_key = (sale_id, &info.sender);
    let mut buyer = load_buyer(deps.storage, buyer_key)?;
    let excess = buyer.claim_excess(idx, &sale.totals[idx])?;
    BUYERS.save(deps.storage, buyer_key, &buyer)?;

    Ok(Response::new()
        .add_attribute("action", "claim_excess")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("token_index", token_index.to_string())
        .add_attribute("buyer", info.sender.as_str())
        .add_attribute("excess", excess.to_string()))
}

pub fn claim_refund(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    sale_id: &[u8],
    token_index: u8,
) -> Result<Response, ContributorError> {
    let sale = load_sale(deps.storage, sale_id)?;
    if sale.status != SaleStatus::Aborted {
        return Err(ContributorError::SaleNotAborted);
    }

    let idx = sale.get_index(token_index)?;
    let buyer_key = (sale_id, &info.sender);
    let mut buyer = load_buyer(deps.storage, buyer_key)?;
    let refund = buyer.claim_refund(idx)?;
    BUYERS.save(deps.storage, buyer_key, &buyer)?;

    Ok(Response::new()
        .add_attribute("action", "claim_refund")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("token_index", token_index.to_string())
        .add_attribute("buyer", info.sender.as_str())
        .add_attribute("refund", refund.to_string()))
}

fn load_sale(storage: &dyn Storage, sale_id: &[u8]) -> Result<Sale, ContributorError> {
    SALES
        .may_load(storage, sale_id)?
        .ok_or(ContributorError::SaleNotFound)
}

// a wallet that never contributed has nothing to claim
fn load_buyer(storage: &dyn Storage, key: (&[u8], &Addr)) -> Result<Buyer, ContributorError> {
    BUYERS
        .may_load(storage, key)?
        .ok_or(ContributorError::NothingToClaim)
}

fn verify_conductor_vaa(
    deps: Deps,
    env: &Env,
    signed_vaa: &Binary,
) -> Result<(Config, ParsedVAA), ContributorError> {
    let cfg = CONFIG
        .may_load(deps.storage)?
        .ok_or(ContributorError::NotInitialized)?;
    let parsed = parse_vaa(
        deps,
        cfg.wormhole.as_str(),
        env.block.time.seconds(),
        signed_vaa,
    )?;

    if parsed.emitter_chain != cfg.conductor_chain
        || parsed.emitter_address[..] != cfg.conductor_address[..]
    {
        return Err(ContributorError::InvalidConductor);
    }
    Ok((cfg, parsed))
}

fn already_seen(action: &str, digest: &[u8; 32]) -> Response {
    Response::new()
        .add_attribute("action", action)
        .add_attribute("replay", "already_seen")
        .add_attribute("digest", hex::encode(digest))
}
