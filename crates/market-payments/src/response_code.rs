//! Gateway Response Codes
//!
//! The payment gateway reports the outcome of a checkout as a two-digit
//! `vnp_ResponseCode`. `00` is the only success; a handful of codes have a
//! specific explanation and every other value falls back to a generic
//! "failed or cancelled" message that quotes the raw code.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Language for user-facing payment messages
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Vietnamese, the gateway's home market
    #[default]
    Vi,
    En,
}

/// Parsed `vnp_ResponseCode`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    /// `00`
    Success,
    /// `07` transaction flagged as suspicious
    SuspectedFraud,
    /// `09` card/account not enrolled in internet banking
    NotEnrolled,
    /// `10` card/account verification failed more than three times
    VerificationFailed,
    /// `11` payment window expired
    Expired,
    /// `12` card/account locked
    AccountLocked,
    /// `13` wrong one-time password
    WrongOtp,
    /// `24` customer cancelled
    Cancelled,
    /// `51` insufficient balance
    InsufficientFunds,
    /// `65` daily limit exceeded
    DailyLimitExceeded,
    /// `75` issuing bank under maintenance
    BankMaintenance,
    /// `79` payment password wrong too many times
    PasswordRetriesExceeded,
    /// Anything else, kept verbatim
    Other(String),
}

impl ResponseCode {
    /// Every code with a dedicated message (success excluded)
    pub const KNOWN_FAILURES: [&'static str; 11] =
        ["07", "09", "10", "11", "12", "13", "24", "51", "65", "75", "79"];

    pub fn parse(raw: &str) -> Self {
        match raw {
            "00" => Self::Success,
            "07" => Self::SuspectedFraud,
            "09" => Self::NotEnrolled,
            "10" => Self::VerificationFailed,
            "11" => Self::Expired,
            "12" => Self::AccountLocked,
            "13" => Self::WrongOtp,
            "24" => Self::Cancelled,
            "51" => Self::InsufficientFunds,
            "65" => Self::DailyLimitExceeded,
            "75" => Self::BankMaintenance,
            "79" => Self::PasswordRetriesExceeded,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "00",
            Self::SuspectedFraud => "07",
            Self::NotEnrolled => "09",
            Self::VerificationFailed => "10",
            Self::Expired => "11",
            Self::AccountLocked => "12",
            Self::WrongOtp => "13",
            Self::Cancelled => "24",
            Self::InsufficientFunds => "51",
            Self::DailyLimitExceeded => "65",
            Self::BankMaintenance => "75",
            Self::PasswordRetriesExceeded => "79",
            Self::Other(raw) => raw,
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// User-facing explanation. Total over every code.
    pub fn message(&self, locale: Locale) -> Cow<'static, str> {
        let text = match (locale, self) {
            (Locale::Vi, Self::Success) => {
                "Thanh toán thành công! Số tiền sẽ được cập nhật vào ví của bạn."
            }
            (Locale::En, Self::Success) => {
                "Payment successful! The amount will be credited to your wallet."
            }
            (Locale::Vi, Self::SuspectedFraud) => {
                "Giao dịch bị nghi ngờ (liên quan tới lừa đảo, giao dịch bất thường)."
            }
            (Locale::En, Self::SuspectedFraud) => {
                "Transaction flagged as suspicious (possible fraud or unusual activity)."
            }
            (Locale::Vi, Self::NotEnrolled) => {
                "Giao dịch không thành công do: Thẻ/Tài khoản của khách hàng chưa đăng ký dịch vụ InternetBanking tại ngân hàng."
            }
            (Locale::En, Self::NotEnrolled) => {
                "Transaction failed: the card/account is not registered for internet banking."
            }
            (Locale::Vi, Self::VerificationFailed) => {
                "Giao dịch không thành công do: Khách hàng xác thực thông tin thẻ/tài khoản không đúng quá 3 lần"
            }
            (Locale::En, Self::VerificationFailed) => {
                "Transaction failed: card/account verification failed more than 3 times."
            }
            (Locale::Vi, Self::Expired) => {
                "Giao dịch không thành công do: Đã hết hạn chờ thanh toán."
            }
            (Locale::En, Self::Expired) => "Transaction failed: the payment window expired.",
            (Locale::Vi, Self::AccountLocked) => {
                "Giao dịch không thành công do: Thẻ/Tài khoản của khách hàng bị khóa."
            }
            (Locale::En, Self::AccountLocked) => "Transaction failed: the card/account is locked.",
            (Locale::Vi, Self::WrongOtp) => {
                "Giao dịch không thành công do Quý khách nhập sai mật khẩu xác thực giao dịch (OTP)."
            }
            (Locale::En, Self::WrongOtp) => {
                "Transaction failed: incorrect one-time password (OTP)."
            }
            (Locale::Vi, Self::Cancelled) => {
                "Giao dịch không thành công do: Khách hàng hủy giao dịch"
            }
            (Locale::En, Self::Cancelled) => "Transaction failed: you cancelled the payment.",
            (Locale::Vi, Self::InsufficientFunds) => {
                "Giao dịch không thành công do: Tài khoản của quý khách không đủ số dư để thực hiện giao dịch."
            }
            (Locale::En, Self::InsufficientFunds) => {
                "Transaction failed: insufficient account balance."
            }
            (Locale::Vi, Self::DailyLimitExceeded) => {
                "Giao dịch không thành công do: Tài khoản của Quý khách đã vượt quá hạn mức giao dịch trong ngày."
            }
            (Locale::En, Self::DailyLimitExceeded) => {
                "Transaction failed: the daily transaction limit was exceeded."
            }
            (Locale::Vi, Self::BankMaintenance) => "Ngân hàng thanh toán đang bảo trì.",
            (Locale::En, Self::BankMaintenance) => "The paying bank is under maintenance.",
            (Locale::Vi, Self::PasswordRetriesExceeded) => {
                "Giao dịch không thành công do: KH nhập sai mật khẩu thanh toán quá số lần quy định."
            }
            (Locale::En, Self::PasswordRetriesExceeded) => {
                "Transaction failed: payment password entered incorrectly too many times."
            }
            (_, Self::Other(raw)) => return Cow::Owned(fallback_message(locale, raw)),
        };
        Cow::Borrowed(text)
    }
}

/// Generic failure text quoting `code`
pub fn fallback_message(locale: Locale, code: &str) -> String {
    match locale {
        Locale::Vi => format!("Thanh toán thất bại hoặc bị hủy (Mã lỗi: {code})"),
        Locale::En => format!("Payment failed or cancelled (Error code: {code})"),
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
