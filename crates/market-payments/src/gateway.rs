//! Gateway Redirect Parsing
//!
//! After checkout the gateway sends the browser back to `/vnpay-return` with
//! the outcome in the query string. Everything shown to the user is derived
//! from those parameters alone, so [`PaymentOutcome::from_query`] is a pure
//! function: the same query always renders the same result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::response_code::{Locale, ResponseCode};

pub const RESPONSE_CODE_PARAM: &str = "vnp_ResponseCode";
pub const TXN_REF_PARAM: &str = "vnp_TxnRef";
pub const AMOUNT_PARAM: &str = "vnp_Amount";

/// Shown when the redirect lacks a response code or transaction reference
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid payment response";

/// Gateway amounts are integers scaled by 100
const AMOUNT_SCALE: u32 = 2;

/// Fraction digits kept when rendering amounts
const DISPLAY_FRACTION_DIGITS: u32 = 3;

/// Raw redirect query, kept verbatim for forwarding to the backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayQuery {
    raw: String,
    pairs: Vec<(String, String)>,
}

impl GatewayQuery {
    /// Parse a query string, with or without the leading `?`
    pub fn parse(query: &str) -> Self {
        let raw = query.strip_prefix('?').unwrap_or(query).to_string();
        let pairs = url::form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { raw, pairs }
    }

    /// First value for `key`; empty values count as missing
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Query string without the leading `?`
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn response_code(&self) -> Option<ResponseCode> {
        self.get(RESPONSE_CODE_PARAM).map(ResponseCode::parse)
    }

    pub fn txn_ref(&self) -> Option<&str> {
        self.get(TXN_REF_PARAM)
    }

    /// Amount in display units (gateway value / 100).
    ///
    /// Values wider than `Decimal` (28 digits) are treated as missing.
    pub fn amount(&self) -> Option<Decimal> {
        let mut amount = parse_leading_integer(self.get(AMOUNT_PARAM)?)?;
        amount.set_scale(AMOUNT_SCALE).ok()?;
        Some(amount)
    }

    /// Both mandatory parameters are present
    pub fn is_well_formed(&self) -> bool {
        self.response_code().is_some() && self.txn_ref().is_some()
    }
}

/// Integer prefix of `raw` (`"5000000"`, `"-12"`, `"100abc"` → 100)
fn parse_leading_integer(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let mut value = Decimal::from_str_exact(&unsigned[..end]).ok()?;
    value.set_sign_negative(negative);
    Some(value)
}

/// Render with `,` thousands grouping and at most three fraction digits
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount
        .round_dp(DISPLAY_FRACTION_DIGITS)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

/// What the return page shows
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub success: bool,
    pub transaction_reference: String,
    pub display_amount: String,
    pub message: String,
}

impl PaymentOutcome {
    /// Outcome for a redirect that cannot be interpreted
    pub fn invalid() -> Self {
        Self {
            success: false,
            transaction_reference: String::new(),
            display_amount: "0".into(),
            message: INVALID_RESPONSE_MESSAGE.into(),
        }
    }

    /// Derive the outcome from the redirect parameters.
    ///
    /// Missing response code or transaction reference is an invalid
    /// response regardless of the amount.
    pub fn from_query(query: &GatewayQuery, locale: Locale) -> Self {
        let (Some(code), Some(txn_ref)) = (query.response_code(), query.txn_ref()) else {
            return Self::invalid();
        };

        Self {
            success: code.is_success(),
            transaction_reference: txn_ref.to_string(),
            display_amount: query.amount().map_or_else(|| "0".into(), format_amount),
            message: code.message(locale).into_owned(),
        }
    }

    /// Buttons offered under the result card, primary first
    pub const fn actions(&self) -> [RecoveryAction; 2] {
        if self.success {
            [RecoveryAction::Dashboard, RecoveryAction::ViewWallet]
        } else {
            [RecoveryAction::Retry, RecoveryAction::Dashboard]
        }
    }
}

/// Navigation offered after a payment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryAction {
    /// Back to the wallet to try again
    Retry,
    /// Back to the wallet to inspect the new balance
    ViewWallet,
    Dashboard,
}

impl RecoveryAction {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Retry | Self::ViewWallet => "/wallet",
            Self::Dashboard => "/dashboard",
        }
    }

    pub const fn label(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::Vi, Self::Retry) => "Thử lại",
            (Locale::Vi, Self::ViewWallet) => "Xem ví",
            (Locale::Vi, Self::Dashboard) => "Về trang chủ",
            (Locale::En, Self::Retry) => "Try again",
            (Locale::En, Self::ViewWallet) => "View wallet",
            (Locale::En, Self::Dashboard) => "Back to dashboard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response_code::fallback_message;
    use rust_decimal_macros::dec;

    fn outcome(query: &str) -> PaymentOutcome {
        PaymentOutcome::from_query(&GatewayQuery::parse(query), Locale::Vi)
    }

    #[test]
    fn test_success_redirect() {
        let result = outcome("?vnp_ResponseCode=00&vnp_TxnRef=ABC123&vnp_Amount=5000000");
        assert!(result.success);
        assert_eq!(result.transaction_reference, "ABC123");
        assert_eq!(result.display_amount, "50,000");
        assert_eq!(result.message, ResponseCode::Success.message(Locale::Vi));
        assert_eq!(result.actions(), [RecoveryAction::Dashboard, RecoveryAction::ViewWallet]);

        let large = outcome("vnp_ResponseCode=00&vnp_TxnRef=BIG&vnp_Amount=123456789012345678901");
        assert_eq!(large.display_amount, "1,234,567,890,123,456,789.01");
    }

    #[test]
    fn test_cancelled_redirect() {
        let result = outcome("vnp_ResponseCode=24&vnp_TxnRef=XYZ&vnp_Amount=1000000");
        assert!(!result.success);
        assert_eq!(result.message, ResponseCode::Cancelled.message(Locale::Vi));
        assert_ne!(result.message, fallback_message(Locale::Vi, "24"));
        assert_eq!(result.actions()[0], RecoveryAction::Retry);
    }

    #[test]
    fn test_unknown_code_uses_fallback() {
        let result = outcome("vnp_ResponseCode=99&vnp_TxnRef=R1");
        assert!(!result.success);
        assert_eq!(result.message, fallback_message(Locale::Vi, "99"));
        assert_eq!(result.display_amount, "0");
    }

    #[test]
    fn test_missing_parameters_are_invalid() {
        for query in [
            "vnp_TxnRef=ABC&vnp_Amount=5000000",
            "vnp_ResponseCode=00&vnp_Amount=5000000",
            "vnp_ResponseCode=&vnp_TxnRef=ABC",
            "",
        ] {
            let result = outcome(query);
            assert!(!result.success);
            assert_eq!(result.message, INVALID_RESPONSE_MESSAGE);
            assert_eq!(result, PaymentOutcome::invalid());
        }
    }

    #[test]
    fn test_outcome_is_deterministic() {
        let query = "vnp_Amount=12345&vnp_ResponseCode=51&vnp_TxnRef=T9&vnp_SecureHash=abc";
        assert_eq!(outcome(query), outcome(query));
    }

    #[test]
    fn test_query_keeps_raw_and_decodes_values() {
        let query = GatewayQuery::parse("?vnp_OrderInfo=Nap+tien%20vi&vnp_TxnRef=A%2B1");
        assert_eq!(query.as_str(), "vnp_OrderInfo=Nap+tien%20vi&vnp_TxnRef=A%2B1");
        assert_eq!(query.get("vnp_OrderInfo"), Some("Nap tien vi"));
        assert_eq!(query.txn_ref(), Some("A+1"));
    }

    #[test]
    fn test_amount_parsing() {
        let amount = |raw: &str| GatewayQuery::parse(&format!("vnp_Amount={raw}")).amount();
        assert_eq!(amount("5000000"), Some(dec!(50000)));
        assert_eq!(amount("12345"), Some(dec!(123.45)));
        assert_eq!(amount("100abc"), Some(dec!(1)));
        assert_eq!(amount("abc"), None);
        assert_eq!(amount("-12"), Some(dec!(-0.12)));
        // Wider than i64
        assert_eq!(
            amount("123456789012345678901"),
            Some(dec!(1234567890123456789.01))
        );
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(50000)), "50,000");
        assert_eq!(format_amount(dec!(1234567.5)), "1,234,567.5");
        assert_eq!(format_amount(dec!(123.45)), "123.45");
        assert_eq!(format_amount(dec!(999)), "999");
        assert_eq!(format_amount(dec!(0)), "0");
        assert_eq!(format_amount(dec!(-1500)), "-1,500");
        assert_eq!(format_amount(dec!(0.12345)), "0.123");
    }
}
