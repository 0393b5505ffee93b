//! `wordlab check-key`

use anyhow::Result;
use serde_json::json;
use wordlab_core::ProviderId;
use wordlab_providers::ProviderError;

use crate::context::Context;

/// Syntactic check only; the key is never sent anywhere.
pub fn execute(ctx: &Context, provider: ProviderId, key: String) -> Result<()> {
    let gateway = ctx.gateway()?;
    let rejection = match gateway.ensure_valid_key(provider, key.trim()) {
        Ok(()) => None,
        Err(e @ ProviderError::InvalidKeyFormat(_)) => Some(e),
        Err(e) => return Err(e.into()),
    };

    if !ctx.output.is_table() {
        ctx.output
            .json(&json!({ "provider": provider, "valid": rejection.is_none() }))?;
    } else if rejection.is_none() {
        ctx.output.success(&format!("Key looks like a valid {} key", provider));
    }

    match rejection {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
