use anyhow::Result;
use solana_client::rpc_client::{GetConfirmedSignaturesForAddress2Config, RpcClient};
use solana_client::rpc_config::{RpcSendTransactionConfig, RpcTransactionConfig};
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};
use solana_transaction_status::{option_serializer::OptionSerializer, UiTransactionEncoding};
use std::str::FromStr;

pub fn send_txn(client: &RpcClient, txn: &Transaction, wait_confirm: bool) -> Result<Signature> {
    Ok(client.send_and_confirm_transaction_with_spinner_and_config(
        txn,
        if wait_confirm {
            CommitmentConfig::confirmed()
        } else {
            CommitmentConfig::processed()
        },
        RpcSendTransactionConfig {
            skip_preflight: false,
            ..RpcSendTransactionConfig::default()
        },
    )?)
}

pub fn get_account(client: &RpcClient, addr: &Pubkey) -> Result<Option<Account>> {
    Ok(client
        .get_account_with_commitment(addr, CommitmentConfig::confirmed())?
        .value)
}

/// Cluster time of the latest confirmed slot.
pub fn get_cluster_time(client: &RpcClient) -> Result<u64> {
    let slot = client.get_slot_with_commitment(CommitmentConfig::confirmed())?;
    let block_time = client.get_block_time(slot)?;
    u64::try_from(block_time).map_err(|_| anyhow::format_err!("negative block time {}", block_time))
}

/// Successful transaction signatures involving `address`, oldest first.
pub fn get_signatures_for_address(
    client: &RpcClient,
    address: &Pubkey,
    until: Option<Signature>,
) -> Result<Vec<Signature>> {
    let mut signatures = Vec::new();
    let mut before = None;
    loop {
        let page = client.get_signatures_for_address_with_config(
            address,
            GetConfirmedSignaturesForAddress2Config {
                before,
                until,
                limit: None,
                commitment: Some(CommitmentConfig::confirmed()),
            },
        )?;
        let Some(last) = page.last() else {
            break;
        };
        before = Some(Signature::from_str(&last.signature)?);
        for status in page.iter().filter(|status| status.err.is_none()) {
            signatures.push(Signature::from_str(&status.signature)?);
        }
    }
    signatures.reverse();
    Ok(signatures)
}

/// Log messages of a confirmed transaction; `None` if it failed or carries no logs.
pub fn get_transaction_logs(client: &RpcClient, signature: &Signature) -> Result<Option<Vec<String>>> {
    let txn = client.get_transaction_with_config(
        signature,
        RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        },
    )?;
    let Some(meta) = txn.transaction.meta else {
        return Ok(None);
    };
    if meta.err.is_some() {
        return Ok(None);
    }
    match meta.log_messages {
        OptionSerializer::Some(logs) => Ok(Some(logs)),
        _ => Ok(None),
    }
}
