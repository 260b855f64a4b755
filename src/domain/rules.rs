//! Indicator tables for free-text WHOIS responses.
//!
//! All matching is plain substring search over the lower-cased response.
//! Tables are evaluated top to bottom and the first hit wins.

use crate::types::SpecialStatusKind;

/// The name is free to register
pub const AVAILABLE_INDICATORS: &[&str] = &[
    "no match for",
    "not found",
    "no data found",
    "no entries found",
    "domain not found",
    "no object found",
    "no matching record",
    "status: free",
    "status: available",
    "available for registration",
    "this domain is available",
    "domain is available",
    "domain available",
    // whois.nic.ch (.ch / .li)
    "we do not have an entry in our database",
];

/// Someone holds the name
pub const REGISTERED_INDICATORS: &[&str] = &[
    "registrar:",
    "registrant:",
    "creation date:",
    "created:",
    "updated date:",
    "updated:",
    "expiration date:",
    "expires:",
    "name server:",
    "nserver:",
    "nameserver:",
    "status: active",
    "status: client",
    "status: ok",
    "status: locked",
    "domain name:",
    "domain:",
];

/// Registered, never special. Only consulted on the WHOIS re-check.
pub const CONNECT_INDICATOR: &str = "status: connect";

/// Held back by the registry
pub const RESERVED_INDICATORS: &[&str] = &[
    "status: reserved",
    "status: restricted",
    "status: blocked",
    "status: prohibited",
    "status: not available for registration",
    "status: not available for general registration",
    "domain reserved",
    "this domain is reserved",
    "reserved domain",
];

/// Special-status indicators, most severe and most specific first.
///
/// `status: pending` must stay below every `status: pending*` and
/// `status: transfer` spelling it would otherwise shadow.
pub const SPECIAL_STATUS_RULES: &[(&str, SpecialStatusKind)] = &[
    ("status: redemptionperiod", SpecialStatusKind::RedemptionPeriod),
    ("status: redemption", SpecialStatusKind::RedemptionPeriod),
    ("status: pendingdelete", SpecialStatusKind::PendingDelete),
    ("status: expire", SpecialStatusKind::Expired),
    ("status: quarantined", SpecialStatusKind::Quarantined),
    ("status: suspended", SpecialStatusKind::Suspended),
    ("status: hold", SpecialStatusKind::Hold),
    ("status: inactive", SpecialStatusKind::Inactive),
    ("status: reserved", SpecialStatusKind::Reserved),
    ("status: transfer", SpecialStatusKind::TransferPending),
    ("status: pendingtransfer", SpecialStatusKind::TransferPending),
    ("status: autorenewperiod", SpecialStatusKind::AutoRenewPeriod),
    ("status: grace", SpecialStatusKind::GracePeriod),
    ("status: pending", SpecialStatusKind::PendingRegistration),
];

/// Lower-cased WHOIS response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisText(String);

impl WhoisText {
    pub fn new(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn first_match(&self, indicators: &[&'static str]) -> Option<&'static str> {
        indicators.iter().copied().find(|indicator| self.0.contains(indicator))
    }

    pub fn indicates_available(&self) -> bool {
        self.first_match(AVAILABLE_INDICATORS).is_some()
    }

    /// Registered indicators used while collecting signatures
    pub fn indicates_registered(&self) -> bool {
        self.first_match(REGISTERED_INDICATORS).is_some()
    }

    /// Registered indicators used by the re-check, `status: connect` included
    pub fn indicates_registered_or_connect(&self) -> bool {
        self.indicates_registered() || self.0.contains(CONNECT_INDICATOR)
    }

    pub fn indicates_reserved(&self) -> bool {
        self.first_match(RESERVED_INDICATORS).is_some()
    }

    /// Special lifecycle state named in the text, if any.
    ///
    /// `status: connect` is a normal registered state and never yields a kind.
    pub fn special_status(&self) -> Option<SpecialStatusKind> {
        SPECIAL_STATUS_RULES
            .iter()
            .find(|(indicator, _)| self.0.contains(indicator))
            .map(|(_, kind)| *kind)
    }
}

/// Special status for raw WHOIS output: `(is_special, label)`
pub fn check_special_status(whois: &str) -> (bool, Option<SpecialStatusKind>) {
    let kind = WhoisText::new(whois).special_status();
    (kind.is_some(), kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_is_case_insensitive() {
        let text = WhoisText::new("Registrar: Example Corp\nCreation Date: 2001-01-01");
        assert!(text.indicates_registered());
        assert!(!text.indicates_available());
    }

    #[test]
    fn test_available_indicators() {
        assert!(WhoisText::new("No match for domain \"abc.li\".").indicates_available());
        assert!(WhoisText::new("Status: FREE").indicates_available());
        assert!(WhoisText::new(
            "We do not have an entry in our database matching your query."
        )
        .indicates_available());
    }

    #[test]
    fn test_connect_is_registered_but_not_special() {
        let text = WhoisText::new("Status: connect");
        assert!(!text.indicates_registered());
        assert!(text.indicates_registered_or_connect());
        assert_eq!(text.special_status(), None);
        assert_eq!(check_special_status("Status: connect"), (false, None));
    }

    #[test]
    fn test_reserved_indicators() {
        assert!(WhoisText::new("Status: Reserved").indicates_reserved());
        assert!(WhoisText::new("This domain is reserved by the registry").indicates_reserved());
        // EPP "prohibited" flags are ordinary locks
        assert!(!WhoisText::new("Status: clientTransferProhibited").indicates_reserved());
    }

    #[test]
    fn test_special_status_priority() {
        assert_eq!(
            WhoisText::new("status: pendingDelete").special_status(),
            Some(SpecialStatusKind::PendingDelete)
        );
        assert_eq!(
            WhoisText::new("status: pendingTransfer").special_status(),
            Some(SpecialStatusKind::TransferPending)
        );
        assert_eq!(
            WhoisText::new("status: pending").special_status(),
            Some(SpecialStatusKind::PendingRegistration)
        );
        assert_eq!(
            WhoisText::new("status: autoRenewPeriod\nstatus: redemptionPeriod").special_status(),
            Some(SpecialStatusKind::RedemptionPeriod)
        );
        assert_eq!(
            WhoisText::new("status: expired").special_status(),
            Some(SpecialStatusKind::Expired)
        );
    }

    #[test]
    fn test_blank_text_is_empty() {
        assert!(WhoisText::new("  \r\n").is_empty());
        assert!(WhoisText::default().is_empty());
    }
}
