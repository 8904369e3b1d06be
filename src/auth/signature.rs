// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EIP-191 personal-message signature recovery.

use std::str::FromStr;

use alloy::primitives::Signature;
use thiserror::Error;

use crate::wallets::WalletAddress;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Not a 65-byte hex signature.
    #[error("malformed signature: {0}")]
    Malformed(String),

    /// Well-formed bytes that do not recover to a public key.
    #[error("signature recovery failed: {0}")]
    Recovery(String),

    #[error("signature was produced by {recovered}, not {claimed}")]
    Mismatch {
        claimed: WalletAddress,
        recovered: WalletAddress,
    },
}

/// Recover the address that signed `message` as an Ethereum personal message.
///
/// Accepts 65-byte hex signatures with or without `0x`, with `v` as 0/1 or
/// 27/28.
pub fn recover_signer(message: &str, signature_hex: &str) -> Result<WalletAddress, SignatureError> {
    let signature = Signature::from_str(signature_hex.trim())
        .map_err(|e| SignatureError::Malformed(e.to_string()))?;
    let address = signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|e| SignatureError::Recovery(e.to_string()))?;
    Ok(WalletAddress::from(address))
}

/// Check that `signature_hex` over `message` was produced by `claimed`.
pub fn verify_signature(
    message: &str,
    signature_hex: &str,
    claimed: &WalletAddress,
) -> Result<(), SignatureError> {
    let recovered = recover_signer(message, signature_hex)?;
    if &recovered != claimed {
        return Err(SignatureError::Mismatch {
            claimed: claimed.clone(),
            recovered,
        });
    }
    Ok(())
}
