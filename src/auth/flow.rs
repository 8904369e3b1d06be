// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet authentication flow.
//!
//! Every check that can reject a request runs before the first write, so
//! rejected requests leave users and nonces untouched. In particular a
//! signature mismatch keeps the pending nonce, letting the client retry the
//! same challenge with a new signature.

use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::challenge::challenge_message;
use super::error::AuthFlowError;
use super::signature::verify_signature;
use super::token::session_marker;
use crate::models::{scalar_text, VerifySignatureRequest};
use crate::oracle::observed_net_worth;
use crate::state::AppState;
use crate::storage::{Nonce, User};
use crate::wallets::{self, ConnectedWallet, Wallet, WalletAddress};

/// Result of a successful verification.
#[derive(Debug, Clone)]
pub struct VerifiedWallet {
    pub user: User,
    pub connected: Wallet,
    pub token: String,
}

fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, AuthFlowError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AuthFlowError::validation(message))
}

fn parse_address(raw: &str) -> Result<WalletAddress, AuthFlowError> {
    WalletAddress::parse(raw).map_err(|e| AuthFlowError::validation(format!("Invalid address: {}", e.0)))
}

/// Create a user from a display name.
pub fn save_fullname(state: &AppState, fullname: Option<&str>) -> Result<User, AuthFlowError> {
    let fullname = required(fullname, "Full name is required")?;
    let user = state.users().create(fullname)?;
    info!(user_id = %user.id, "Registered user");
    Ok(user)
}

/// Issue a fresh challenge for `raw_address`, replacing any pending one.
pub fn issue_nonce(state: &AppState, raw_address: &str) -> Result<Nonce, AuthFlowError> {
    let address = parse_address(raw_address)?;
    let nonce = state.nonces().upsert(&address, challenge_message())?;
    info!(address = %address, "Issued nonce");
    Ok(nonce)
}

/// Record wallet providers observed client-side as detected placeholders.
pub fn register_detected_wallets(
    state: &AppState,
    user_id: Option<&str>,
    detected: Option<&Value>,
) -> Result<User, AuthFlowError> {
    let user_id = required(user_id, "User ID is required")?;
    let Some(Value::Array(entries)) = detected else {
        return Err(AuthFlowError::validation("Detected wallets array is required"));
    };
    let names: Vec<&str> = entries.iter().filter_map(Value::as_str).collect();

    let (user, ()) = state
        .users()
        .update(user_id, |user| {
            let current = std::mem::take(&mut user.wallets);
            user.wallets = wallets::register_detected(current, &names);
        })?
        .ok_or(AuthFlowError::UserNotFound)?;

    info!(user_id = %user.id, detected = ?names, "Saved detected wallets");
    Ok(user)
}

/// Verify a signed challenge and merge the proven wallet into the user.
pub async fn verify_and_connect(
    state: &AppState,
    request: &VerifySignatureRequest,
) -> Result<VerifiedWallet, AuthFlowError> {
    let user_id = required(request.user_id.as_deref(), "User ID is required")?;
    let address = parse_address(required(request.address.as_deref(), "Address is required")?)?;
    let signature = required(request.signature.as_deref(), "Signature is required")?;
    let wallet_type = request
        .wallet_type
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    let client_balance = scalar_text(request.balance.as_ref());

    if state.users().get(user_id)?.is_none() {
        return Err(AuthFlowError::ProfileMissing);
    }

    let nonces = state.nonces();
    let nonce = nonces.find(&address)?.ok_or(AuthFlowError::NonceNotFound)?;

    verify_signature(&nonce.nonce, signature, &address)?;

    // A concurrent verification may have consumed it first.
    if !nonces.consume(&address, &nonce.nonce)? {
        return Err(AuthFlowError::NonceNotFound);
    }

    let balance = observed_net_worth(state.oracle(), &address)
        .await
        .or(client_balance);

    let incoming = ConnectedWallet {
        address: address.clone(),
        name: wallet_type,
        balance,
    };

    let (user, reconciliation) = state
        .users()
        .update(user_id, |user| {
            let result = wallets::reconcile(std::mem::take(&mut user.wallets), &incoming);
            user.wallets = result.wallets.clone();
            result
        })?
        .ok_or(AuthFlowError::ProfileMissing)?;

    let connected = reconciliation
        .connected_entry(&incoming)
        .cloned()
        .ok_or(AuthFlowError::ConnectedWalletMissing)?;

    info!(
        user_id = %user.id,
        address = %address,
        outcome = ?reconciliation.outcome,
        duplicates_removed = reconciliation.duplicates_removed,
        "Wallet connected"
    );

    Ok(VerifiedWallet {
        token: session_marker(&address, Utc::now()),
        user,
        connected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signature::tests::sign;
    use crate::oracle::tests::FixedOracle;
    use crate::oracle::NetWorthOracle;
    use crate::state::tests::test_state;
    use alloy::signers::local::PrivateKeySigner;
    use serde_json::json;
    use std::sync::Arc;

    fn verify_request(
        user_id: &str,
        signer: &PrivateKeySigner,
        signature: String,
        wallet_type: Option<&str>,
        balance: Option<Value>,
    ) -> VerifySignatureRequest {
        VerifySignatureRequest {
            address: Some(signer.address().to_string()),
            signature: Some(signature),
            wallet_type: wallet_type.map(str::to_string),
            balance,
            user_id: Some(user_id.to_string()),
        }
    }

    fn signed_request(
        state: &AppState,
        user_id: &str,
        signer: &PrivateKeySigner,
        wallet_type: Option<&str>,
        balance: Option<Value>,
    ) -> VerifySignatureRequest {
        let nonce = issue_nonce(state, &signer.address().to_string()).unwrap();
        let signature = sign(signer, &nonce.nonce);
        verify_request(user_id, signer, signature, wallet_type, balance)
    }

    #[tokio::test]
    async fn detected_wallet_is_upgraded_by_verification() {
        let (state, _dir) = test_state(None);
        let user = save_fullname(&state, Some("  Ada Lovelace ")).unwrap();
        assert_eq!(user.fullname, "Ada Lovelace");

        let detected = json!(["metamask", "rabby"]);
        let user = register_detected_wallets(&state, Some(&user.id), Some(&detected)).unwrap();
        assert_eq!(
            user.wallets,
            vec![Wallet::detected("metamask"), Wallet::detected("rabby")]
        );

        let signer = PrivateKeySigner::random();
        let request = signed_request(&state, &user.id, &signer, Some("metamask"), Some(json!("120.5")));
        let verified = verify_and_connect(&state, &request).await.unwrap();

        let address = WalletAddress::from(signer.address());
        assert_eq!(
            verified.user.wallets,
            vec![
                Wallet::connected("metamask", address.clone(), Some("120.5".into())),
                Wallet::detected("rabby"),
            ]
        );
        assert_eq!(verified.connected.address, Some(address.clone()));
        assert!(verified.token.starts_with(&format!("{address}_")));
    }

    #[tokio::test]
    async fn consumed_nonce_cannot_be_replayed() {
        let (state, _dir) = test_state(None);
        let user = save_fullname(&state, Some("Ada")).unwrap();
        let signer = PrivateKeySigner::random();

        let request = signed_request(&state, &user.id, &signer, Some("metamask"), None);
        verify_and_connect(&state, &request).await.unwrap();

        let err = verify_and_connect(&state, &request).await.unwrap_err();
        assert!(matches!(err, AuthFlowError::NonceNotFound));
    }

    #[tokio::test]
    async fn mismatch_keeps_nonce_for_retry() {
        let (state, _dir) = test_state(None);
        let user = save_fullname(&state, Some("Ada")).unwrap();
        let signer = PrivateKeySigner::random();
        let impostor = PrivateKeySigner::random();

        let nonce = issue_nonce(&state, &signer.address().to_string()).unwrap();
        let forged = verify_request(&user.id, &signer, sign(&impostor, &nonce.nonce), None, None);
        let err = verify_and_connect(&state, &forged).await.unwrap_err();
        assert!(matches!(err, AuthFlowError::SignatureMismatch));

        let genuine = verify_request(&user.id, &signer, sign(&signer, &nonce.nonce), None, None);
        let verified = verify_and_connect(&state, &genuine).await.unwrap();
        assert_eq!(verified.connected.name, "unknown");
    }

    #[tokio::test]
    async fn wallets_without_type_are_each_linked() {
        let (state, _dir) = test_state(None);
        let user = save_fullname(&state, Some("Ada")).unwrap();
        let first = PrivateKeySigner::random();
        let second = PrivateKeySigner::random();

        let request = signed_request(&state, &user.id, &first, None, None);
        verify_and_connect(&state, &request).await.unwrap();
        let request = signed_request(&state, &user.id, &second, None, None);
        let verified = verify_and_connect(&state, &request).await.unwrap();

        let second_address = WalletAddress::from(second.address());
        assert_eq!(verified.connected.address, Some(second_address.clone()));
        assert_eq!(
            verified.user.wallets,
            vec![
                Wallet::connected("unknown", WalletAddress::from(first.address()), None),
                Wallet::connected("unknown", second_address, None),
            ]
        );
    }

    #[tokio::test]
    async fn unknown_user_fails_before_consuming_nonce() {
        let (state, _dir) = test_state(None);
        let signer = PrivateKeySigner::random();

        let request = signed_request(&state, "missing-user", &signer, Some("metamask"), None);
        let err = verify_and_connect(&state, &request).await.unwrap_err();
        assert!(matches!(err, AuthFlowError::ProfileMissing));

        let address = WalletAddress::from(signer.address());
        assert!(state.nonces().find(&address).unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_nonce_is_rejected() {
        let (state, _dir) = test_state(None);
        let user = save_fullname(&state, Some("Ada")).unwrap();
        let signer = PrivateKeySigner::random();

        let request = verify_request(&user.id, &signer, sign(&signer, "never issued"), None, None);
        let err = verify_and_connect(&state, &request).await.unwrap_err();
        assert!(matches!(err, AuthFlowError::NonceNotFound));
    }

    #[tokio::test]
    async fn oracle_value_takes_precedence() {
        let oracle: Arc<dyn NetWorthOracle> = Arc::new(FixedOracle(Some("999.99".into())));
        let (state, _dir) = test_state(Some(oracle));
        let user = save_fullname(&state, Some("Ada")).unwrap();
        let signer = PrivateKeySigner::random();

        let request = signed_request(&state, &user.id, &signer, Some("rabby"), Some(json!("1")));
        let verified = verify_and_connect(&state, &request).await.unwrap();
        assert_eq!(verified.connected.balance, "999.99");
    }

    #[tokio::test]
    async fn oracle_failure_falls_back_to_client_balance() {
        let oracle: Arc<dyn NetWorthOracle> = Arc::new(FixedOracle(None));
        let (state, _dir) = test_state(Some(oracle));
        let user = save_fullname(&state, Some("Ada")).unwrap();

        let signer = PrivateKeySigner::random();
        let request = signed_request(&state, &user.id, &signer, Some("rabby"), Some(json!(42)));
        let verified = verify_and_connect(&state, &request).await.unwrap();
        assert_eq!(verified.connected.balance, "42");

        let other = PrivateKeySigner::random();
        let request = signed_request(&state, &user.id, &other, Some("phantom"), None);
        let verified = verify_and_connect(&state, &request).await.unwrap();
        assert_eq!(verified.connected.balance, "0");
        assert_eq!(verified.user.wallets.len(), 2);
    }

    #[tokio::test]
    async fn reconnecting_under_new_name_renames_entry() {
        let (state, _dir) = test_state(None);
        let user = save_fullname(&state, Some("Ada")).unwrap();
        let signer = PrivateKeySigner::random();

        let request = signed_request(&state, &user.id, &signer, Some("metamask"), Some(json!("5")));
        verify_and_connect(&state, &request).await.unwrap();

        let request = signed_request(&state, &user.id, &signer, Some("rabby"), None);
        let verified = verify_and_connect(&state, &request).await.unwrap();

        assert_eq!(verified.user.wallets.len(), 1);
        assert_eq!(verified.user.wallets[0].name, "rabby");
        assert_eq!(verified.user.wallets[0].balance, "5");

        let address = WalletAddress::from(signer.address());
        let owner = state.users().find_by_wallet_address(&address).unwrap().unwrap();
        assert_eq!(owner.id, user.id);
    }

    #[test]
    fn input_validation() {
        let (state, _dir) = test_state(None);

        assert!(matches!(
            save_fullname(&state, Some("   ")),
            Err(AuthFlowError::Validation(_))
        ));
        assert!(matches!(
            issue_nonce(&state, "0x1234"),
            Err(AuthFlowError::Validation(_))
        ));

        let user = save_fullname(&state, Some("Ada")).unwrap();
        assert!(matches!(
            register_detected_wallets(&state, Some(&user.id), Some(&json!("metamask"))),
            Err(AuthFlowError::Validation(_))
        ));
        assert!(matches!(
            register_detected_wallets(&state, None, Some(&json!([]))),
            Err(AuthFlowError::Validation(_))
        ));
        assert!(matches!(
            register_detected_wallets(&state, Some("missing"), Some(&json!([]))),
            Err(AuthFlowError::UserNotFound)
        ));
    }

    #[test]
    fn detected_registration_is_idempotent() {
        let (state, _dir) = test_state(None);
        let user = save_fullname(&state, Some("Ada")).unwrap();
        let detected = json!(["metamask", " ", "metamask", 7]);

        register_detected_wallets(&state, Some(&user.id), Some(&detected)).unwrap();
        let user = register_detected_wallets(&state, Some(&user.id), Some(&detected)).unwrap();
        assert_eq!(user.wallets, vec![Wallet::detected("metamask")]);
    }
}
