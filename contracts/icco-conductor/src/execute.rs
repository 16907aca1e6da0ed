use cosmwasm_std::{Binary, DepsMut, Env, MessageInfo, Response, Storage};

use icco::{
    common::sale_id_from_u64,
    error::CommonError,
    messages::ContributionsAttested,
    replay::vaa_digest,
    wormhole::{parse_vaa, post_message},
};

use crate::{
    error::ConductorError,
    msg::SaleConfig,
    state::{
        to_bytes32, Config, Sale, CONFIG, CONSUMED_MESSAGES, CONTRIBUTORS, NEXT_SALE_ID, SALES,
    },
};

pub fn register_contributor(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    chain_id: u16,
    emitter_address: &Binary,
) -> Result<Response, ConductorError> {
    let cfg = load_config(deps.storage)?;
    if info.sender != cfg.owner {
        return Err(ConductorError::Unauthorized);
    }

    let emitter_address = to_bytes32(emitter_address)?;
    CONTRIBUTORS.save(deps.storage, chain_id, &emitter_address)?;

    Ok(Response::new()
        .add_attribute("action", "register_contributor")
        .add_attribute("chain_id", chain_id.to_string())
        .add_attribute("emitter_address", hex::encode(emitter_address)))
}

pub fn create_sale(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    config: &SaleConfig,
) -> Result<Response, ConductorError> {
    let cfg = load_config(deps.storage)?;

    let sale_number = NEXT_SALE_ID.may_load(deps.storage)?.unwrap_or_default();
    let sale = Sale::from_config(
        sale_id_from_u64(sale_number),
        config,
        info.sender,
        env.block.time.seconds(),
    )?;

    let chains = sale.contributor_chains();
    for chain in &chains {
        if !CONTRIBUTORS.has(deps.storage, *chain) {
            return Err(ConductorError::UnregisteredContributor);
        }
    }

    let next_sale_number = sale_number
        .checked_add(1)
        .ok_or(CommonError::AmountTooLarge)?;

    let mut messages = Vec::with_capacity(chains.len());
    for sale_init in sale.sale_inits() {
        messages.push(post_message(cfg.wormhole.as_str(), sale_init.serialize())?);
    }

    SALES.save(deps.storage, sale.id.as_slice(), &sale)?;
    NEXT_SALE_ID.save(deps.storage, &next_sale_number)?;

    Ok(Response::new()
        .add_messages(messages)
        .set_data(Binary::from(sale.id.as_slice()))
        .add_attribute("action", "create_sale")
        .add_attribute("sale_id", hex::encode(sale.id))
        .add_attribute("initiator", sale.initiator.as_str())
        .add_attribute("num_accepted_tokens", sale.accepted_tokens.len().to_string())
        .add_attribute("num_contributor_chains", chains.len().to_string()))
}

pub fn collect_contribution(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    signed_vaa: &Binary,
) -> Result<Response, ConductorError> {
    let cfg = load_config(deps.storage)?;
    let parsed = parse_vaa(
        deps.as_ref(),
        cfg.wormhole.as_str(),
        env.block.time.seconds(),
        signed_vaa,
    )?;

    let emitter_address = CONTRIBUTORS
        .may_load(deps.storage, parsed.emitter_chain)?
        .ok_or(ConductorError::UnregisteredContributor)?;
    if parsed.emitter_address[..] != emitter_address[..] {
        return Err(ConductorError::InvalidEmitter);
    }

    let digest = vaa_digest(&parsed)?;
    if CONSUMED_MESSAGES.is_consumed(deps.storage, &digest) {
        return Ok(Response::new()
            .add_attribute("action", "collect_contribution")
            .add_attribute("replay", "already_seen")
            .add_attribute("digest", hex::encode(digest)));
    }

    let attested = ContributionsAttested::deserialize(&parsed.payload)?;
    let sale_id = attested.sale_id.as_slice();
    let mut sale = load_sale(deps.storage, sale_id)?;
    sale.collect_contributions(env.block.time.seconds(), parsed.emitter_chain, &attested)?;

    CONSUMED_MESSAGES.admit(deps.storage, &digest)?;
    SALES.save(deps.storage, sale_id, &sale)?;

    Ok(Response::new()
        .add_attribute("action", "collect_contribution")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("chain_id", parsed.emitter_chain.to_string())
        .add_attribute("num_collected", sale.num_collected().to_string()))
}

pub fn seal_sale(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    sale_id: &[u8],
) -> Result<Response, ConductorError> {
    let cfg = load_config(deps.storage)?;
    let mut sale = load_sale(deps.storage, sale_id)?;

    let (payload, result) = match sale.seal() {
        Ok(sealed) => (sealed.serialize(), "sealed"),
        Err(ConductorError::Common(CommonError::RaiseBelowMinimum)) => {
            (sale.abort()?.serialize(), "aborted")
        }
        Err(e) => return Err(e),
    };

    SALES.save(deps.storage, sale_id, &sale)?;

    Ok(Response::new()
        .add_message(post_message(cfg.wormhole.as_str(), payload.clone())?)
        .set_data(Binary::from(payload))
        .add_attribute("action", "seal_sale")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("result", result))
}

pub fn abort_sale(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    sale_id: &[u8],
) -> Result<Response, ConductorError> {
    let cfg = load_config(deps.storage)?;
    let mut sale = load_sale(deps.storage, sale_id)?;
    if info.sender != sale.initiator {
        return Err(ConductorError::Unauthorized);
    }

    let payload = sale.abort()?.serialize();
    SALES.save(deps.storage, sale_id, &sale)?;

    Ok(Response::new()
        .add_message(post_message(cfg.wormhole.as_str(), payload.clone())?)
        .set_data(Binary::from(payload))
        .add_attribute("action", "abort_sale")
        .add_attribute("sale_id", hex::encode(sale_id)))
}

pub fn update_kyc_authority(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    sale_id: &[u8],
    new_authority: &Binary,
) -> Result<Response, ConductorError> {
    let cfg = load_config(deps.storage)?;
    let mut sale = load_sale(deps.storage, sale_id)?;
    if info.sender != sale.initiator {
        return Err(ConductorError::Unauthorized);
    }

    let new_authority = to_bytes32(new_authority)?;
    let payload = sale.update_kyc_authority(new_authority)?.serialize();
    SALES.save(deps.storage, sale_id, &sale)?;

    Ok(Response::new()
        .add_message(post_message(cfg.wormhole.as_str(), payload.clone())?)
        .set_data(Binary::from(payload))
        .add_attribute("action", "update_kyc_authority")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("kyc_authority", hex::encode(new_authority)))
}

fn load_config(storage: &dyn Storage) -> Result<Config, ConductorError> {
    CONFIG
        .may_load(storage)?
        .ok_or(ConductorError::NotInitialized)
}

fn load_sale(storage: &dyn Storage, sale_id: &[u8]) -> Result<Sale, ConductorError> {
    SALES
        .may_load(storage, sale_id)?
        .ok_or(ConductorError::SaleNotFound)
}
