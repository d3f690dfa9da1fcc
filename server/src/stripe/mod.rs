//! Stripe integration via REST API (no SDK dependency)

use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sha2::Sha256;
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A freshly created payment intent
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Convert a decimal currency amount to the provider's minor units (cents)
pub fn to_minor_units(amount: Decimal) -> Result<i64, BoxError> {
    let cents = amount * Decimal::from(100);
    if cents.fract() != Decimal::ZERO {
        return Err(format!("amount {amount} is not a whole number of cents").into());
    }
    cents
        .to_i64()
        .ok_or_else(|| format!("amount {amount} out of range").into())
}

/// Create a Stripe PaymentIntent for an order
pub async fn create_payment_intent(
    secret_key: &str,
    amount: Decimal,
    currency: &str,
    order_id: Uuid,
    restaurant_id: Uuid,
    table_id: Uuid,
    description: &str,
) -> Result<PaymentIntent, BoxError> {
    let amount_minor = to_minor_units(amount)?;

    let client = reqwest::Client::new();
    let resp: serde_json::Value = client
        .post("https://api.stripe.com/v1/payment_intents")
        .basic_auth(secret_key, None::<&str>)
        .form(&[
            ("amount", amount_minor.to_string().as_str()),
            ("currency", currency),
            ("metadata[order_id]", order_id.to_string().as_str()),
            (
                "metadata[restaurant_id]",
                restaurant_id.to_string().as_str(),
            ),
            ("metadata[table_id]", table_id.to_string().as_str()),
            ("description", description),
        ])
        .send()
        .await?
        .json()
        .await?;

    match (resp["id"].as_str(), resp["client_secret"].as_str()) {
        (Some(id), Some(client_secret)) => Ok(PaymentIntent {
            id: id.to_string(),
            client_secret: client_secret.to_string(),
        }),
        _ => Err(format!("Stripe create_payment_intent failed: {resp}").into()),
    }
}

/// Verify Stripe webhook signature (HMAC-SHA256)
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), &'static str> {
    let mut timestamp = "";
    let mut signature = "";
    for part in sig_header.split(',') {
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signature = v;
        }
    }

    if timestamp.is_empty() || signature.is_empty() {
        return Err("Invalid Stripe-Signature header");
    }

    let signed_payload = format!("{timestamp}.{}", std::str::from_utf8(payload).unwrap_or(""));
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(signed_payload.as_bytes());

    // Decode hex signature and use constant-time comparison via hmac::verify_slice
    let sig_bytes = hex::decode(signature).map_err(|_| "Invalid signature hex")?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "Webhook signature mismatch")?;

    // Reject events older than 5 minutes to prevent replay attacks
    let ts: i64 = timestamp.parse().map_err(|_| "Invalid timestamp")?;
    let now = chrono::Utc::now().timestamp();
    if (now - ts).abs() > 300 {
        return Err("Webhook timestamp too old");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(payload: &[u8], secret: &str, ts: i64) -> String {
        let signed_payload = format!("{ts}.{}", std::str::from_utf8(payload).unwrap());
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed_payload.as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());
        format!("t={ts},v1={sig}")
    }

    #[test]
    fn test_valid_signature() {
        let payload = br#"{"id":"evt_1","type":"payment_intent.succeeded"}"#;
        let secret = "whsec_test";
        let header = sign(payload, secret, chrono::Utc::now().timestamp());
        assert!(verify_webhook_signature(payload, &header, secret).is_ok());
    }

    #[test]
    fn test_tampered_payload() {
        let payload = br#"{"id":"evt_1"}"#;
        let secret = "whsec_test";
        let header = sign(payload, secret, chrono::Utc::now().timestamp());
        assert!(verify_webhook_signature(br#"{"id":"evt_2"}"#, &header, secret).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = sign(payload, "whsec_a", chrono::Utc::now().timestamp());
        assert!(verify_webhook_signature(payload, &header, "whsec_b").is_err());
    }

    #[test]
    fn test_stale_timestamp() {
        let payload = br#"{"id":"evt_1"}"#;
        let secret = "whsec_test";
        let header = sign(payload, secret, chrono::Utc::now().timestamp() - 600);
        assert_eq!(
            verify_webhook_signature(payload, &header, secret),
            Err("Webhook timestamp too old")
        );
    }

    #[test]
    fn test_malformed_header() {
        let payload = b"{}";
        assert!(verify_webhook_signature(payload, "garbage", "whsec_test").is_err());
        assert!(verify_webhook_signature(payload, "t=123", "whsec_test").is_err());
        assert!(verify_webhook_signature(payload, "v1=abcd", "whsec_test").is_err());
        assert!(verify_webhook_signature(payload, "t=123,v1=zzzz", "whsec_test").is_err());
    }

    #[test]
    fn test_to_minor_units() {
        use std::str::FromStr;
        assert_eq!(to_minor_units(Decimal::from_str("28.58").unwrap()).unwrap(), 2858);
        assert_eq!(to_minor_units(Decimal::from_str("0.01").unwrap()).unwrap(), 1);
        assert_eq!(to_minor_units(Decimal::from(5)).unwrap(), 500);
    }
}
