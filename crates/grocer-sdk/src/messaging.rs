//! Hand-off to the shop's chat line after an order is placed.

use grocer_commerce::checkout::Order;
use grocer_commerce::Currency;

const CHAT_BASE: &str = "https://wa.me";

/// Builds prefilled chat links to the shop's phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatHandoff {
    phone: String,
}

impl ChatHandoff {
    /// `None` when `phone` contains no digits.
    pub fn new(phone: &str) -> Option<Self> {
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        (!digits.is_empty()).then_some(Self { phone: digits })
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Message announcing an order.
    pub fn order_message(order: &Order, currency: Currency) -> String {
        format!(
            "Hello, I just placed order {} for a total of {}. Thank you!",
            order.order_number,
            order.total(currency).display()
        )
    }

    /// Link opening a chat with `text` prefilled.
    pub fn link(&self, text: &str) -> Result<url::Url, url::ParseError> {
        url::Url::parse_with_params(&format!("{}/{}", CHAT_BASE, self.phone), [("text", text)])
    }

    /// Link prefilled with [`ChatHandoff::order_message`].
    pub fn order_link(&self, order: &Order, currency: Currency) -> Result<url::Url, url::ParseError> {
        self.link(&Self::order_message(order, currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        serde_json::from_value(serde_json::json!({
            "id": "o1", "order_number": "CMD-0042",
            "customer_name": "Awa", "customer_phone": "0708091011",
            "delivery_address": "Cocody", "subtotal": 25000,
            "shipping_fee": 4000, "total": 29000
        }))
        .unwrap()
    }

    #[test]
    fn test_phone_keeps_digits() {
        let chat = ChatHandoff::new("+225 07 08-09-10-11").unwrap();
        assert_eq!(chat.phone(), "2250708091011");
        assert!(ChatHandoff::new("n/a").is_none());
    }

    #[test]
    fn test_order_link_carries_number_and_total() {
        let chat = ChatHandoff::new("+2250708091011").unwrap();
        let link = chat.order_link(&order(), Currency::XOF).unwrap();

        assert_eq!(link.host_str(), Some("wa.me"));
        assert_eq!(link.path(), "/2250708091011");
        let text = link
            .query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(text.contains("CMD-0042"));
        assert!(text.contains("29 000 FCFA"));
    }
}
