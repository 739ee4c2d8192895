//! Browser Location Seam
//!
//! [`Navigator`] abstracts the page location: read it, leave it, or rewrite it
//! in place. [`ReturnParams`] decodes what the payment provider appends when it
//! redirects back.

use url::Url;

use crate::error::{CheckoutError, Result};

/// Query parameter carrying `success` or `cancel`
pub const STATUS_PARAM: &str = "payment";

/// Payment id parameter names, highest priority first
pub const PAYMENT_ID_ALIASES: [&str; 3] = ["paymentId", "token", "payment_id"];

/// Payer id parameter names, highest priority first
pub const PAYER_ID_ALIASES: [&str; 2] = ["PayerID", "payerId"];

/// Page location operations
pub trait Navigator {
    /// Full URL of the current page
    fn current_href(&self) -> Result<String>;

    /// Leave the page for `url`. Nothing in memory survives this.
    fn assign(&self, url: &str) -> Result<()>;

    /// Rewrite the visible URL without reloading
    fn replace_url(&self, url: &str) -> Result<()>;
}

/// Provider verdict carried on the return URL
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnStatus {
    Success,
    Cancel,
}

/// Identifiers decoded from a return redirect
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReturnParams {
    pub status: Option<ReturnStatus>,
    pub payment_id: Option<String>,
    pub payer_id: Option<String>,
}

impl ReturnParams {
    pub fn parse(href: &str) -> Result<Self> {
        let url = Url::parse(href)
            .map_err(|e| CheckoutError::MalformedReturn(format!("unparsable location: {e}")))?;
        Ok(Self::from_url(&url))
    }

    pub fn from_url(url: &Url) -> Self {
        let status = match first_param(url, &[STATUS_PARAM]).as_deref() {
            Some("success") => Some(ReturnStatus::Success),
            Some("cancel") => Some(ReturnStatus::Cancel),
            Some(other) => {
                tracing::debug!(value = other, "Ignoring unknown payment status");
                None
            }
            None => None,
        };

        Self {
            status,
            payment_id: first_param(url, &PAYMENT_ID_ALIASES),
            payer_id: first_param(url, &PAYER_ID_ALIASES),
        }
    }
}

/// First non-empty value among `names`, searched in priority order
pub fn first_param(url: &Url, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        url.query_pairs()
            .find(|(key, value)| key == *name && !value.is_empty())
            .map(|(_, value)| value.into_owned())
    })
}

/// Copy of `url` without the status flag or any id alias
pub fn strip_return_params(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_return_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut cleaned = url.clone();
    if kept.is_empty() {
        cleaned.set_query(None);
    } else {
        cleaned.query_pairs_mut().clear().extend_pairs(kept);
    }
    cleaned
}

fn is_return_param(key: &str) -> bool {
    key == STATUS_PARAM || PAYMENT_ID_ALIASES.contains(&key) || PAYER_ID_ALIASES.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_return() {
        let params =
            ReturnParams::parse("https://bhaijaanacademy.com/?payment=success&token=p1&PayerID=u1")
                .unwrap();
        assert_eq!(params.status, Some(ReturnStatus::Success));
        assert_eq!(params.payment_id.as_deref(), Some("p1"));
        assert_eq!(params.payer_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_alias_priority() {
        let params = ReturnParams::parse(
            "https://a.test/?payment_id=low&token=mid&paymentId=high&payerId=second&PayerID=first",
        )
        .unwrap();
        assert_eq!(params.payment_id.as_deref(), Some("high"));
        assert_eq!(params.payer_id.as_deref(), Some("first"));

        let params = ReturnParams::parse("https://a.test/?paymentId=&token=mid").unwrap();
        assert_eq!(params.payment_id.as_deref(), Some("mid"));
    }

    #[test]
    fn test_absent_and_unknown_status() {
        assert_eq!(ReturnParams::parse("https://a.test/").unwrap(), ReturnParams::default());
        assert_eq!(ReturnParams::parse("https://a.test/?payment=maybe").unwrap().status, None);
        assert!(matches!(
            ReturnParams::parse("not a url"),
            Err(CheckoutError::MalformedReturn(_))
        ));
    }

    #[test]
    fn test_strip_keeps_unrelated_params() {
        let url = Url::parse(
            "https://a.test/learn?ref=ad&payment=success&token=p1&PayerID=u1&paymentId=p1#form",
        )
        .unwrap();
        assert_eq!(strip_return_params(&url).as_str(), "https://a.test/learn?ref=ad#form");

        let url = Url::parse("https://a.test/?payment=cancel").unwrap();
        assert_eq!(strip_return_params(&url).as_str(), "https://a.test/");
    }
}
