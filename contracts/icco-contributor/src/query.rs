use cosmwasm_std::{Binary, Deps, StdResult};

use crate::{
    error::ContributorError,
    msg::{
        BuyerResponse, ConfigResponse, SaleStatusResponse, SaleTimesResponse,
        TotalAllocationResponse, TotalContributionResponse,
    },
    state::{Sale, BUYERS, CONFIG, SALES},
};

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    match CONFIG.load(deps.storage) {
        Ok(cfg) => Ok(ConfigResponse {
            wormhole: cfg.wormhole.to_string(),
            chain_id: cfg.chain_id,
            conductor_chain: cfg.conductor_chain,
            conductor_address: cfg.conductor_address.to_vec(),
            owner: cfg.owner.to_string(),
        }),
        Err(_) => ContributorError::NotInitialized.std_err(),
    }
}

pub fn query_sale(deps: Deps, sale_id: &Binary) -> StdResult<Sale> {
    match SALES.load(deps.storage, sale_id.as_slice()) {
        Ok(sale) => Ok(sale),
        Err(_) => ContributorError::SaleNotFound.std_err(),
    }
}

pub fn query_sale_status(deps: Deps, sale_id: &Binary) -> StdResult<SaleStatusResponse> {
    let sale = query_sale(deps, sale_id)?;
    Ok(SaleStatusResponse {
        id: sale.id.to_vec(),
        status: sale.status,
    })
}

pub fn query_sale_times(deps: Deps, sale_id: &Binary) -> StdResult<SaleTimesResponse> {
    let sale = query_sale(deps, sale_id)?;
    Ok(SaleTimesResponse {
        id: sale.id.to_vec(),
        times: sale.times,
    })
}

pub fn query_total_contribution(
    deps: Deps,
    sale_id: &Binary,
    token_index: u8,
) -> StdResult<TotalContributionResponse> {
    let sale = query_sale(deps, sale_id)?;
    let idx = sale.get_index(token_index).map_err(|e| e.std())?;
    Ok(TotalContributionResponse {
        id: sale.id.to_vec(),
        token_index,
        amount: sale.totals[idx].contributions,
    })
}

pub fn query_total_allocation(
    deps: Deps,
    sale_id: &Binary,
    token_index: u8,
) -> StdResult<TotalAllocationResponse> {
    let sale = query_sale(deps, sale_id)?;
    let idx = sale.get_index(token_index).map_err(|e| e.std())?;
    let total = &sale.totals[idx];
    Ok(TotalAllocationResponse {
        id: sale.id.to_vec(),
        token_index,
        allocations: total.allocations,
        excess_contributions: total.excess_contributions,
    })
}

pub fn query_buyer(
    deps: Deps,
    sale_id: &Binary,
    token_index: u8,
    buyer: String,
) -> StdResult<BuyerResponse> {
    let sale = query_sale(deps, sale_id)?;
    let idx = sale.get_index(token_index).map_err(|e| e.std())?;

    let addr = deps.api.addr_validate(&buyer)?;
    let contribution = match BUYERS.may_load(deps.storage, (sale_id.as_slice(), &addr))? {
        Some(record) => *record.get(idx).map_err(|e| e.std())?,
        None => Default::default(),
    };

    Ok(BuyerResponse {
        id: sale.id.to_vec(),
        token_index,
        buyer,
        contribution,
    })
}
