//! Value objects embedded in orders.

use common::{Money, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// A line item snapshotted into an order at creation time.
///
/// Name, image, price, and seller are copied from the product so later
/// catalog edits never retroactively alter historical orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub product_image: String,
    pub quantity: u32,
    pub price: Money,
    pub seller: UserId,
}

impl OrderItem {
    /// Returns `price * quantity` for this line.
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// Where the order ships to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "India".to_string()
}

/// How the buyer intends to pay. Settlement is out of scope; only the
/// chosen method is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Stripe,
    Paypal,
    CashOnDelivery,
    #[default]
    Cod,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::Cod => "cod",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stripe" => Some(PaymentMethod::Stripe),
            "paypal" => Some(PaymentMethod::Paypal),
            "cash_on_delivery" => Some(PaymentMethod::CashOnDelivery),
            "cod" => Some(PaymentMethod::Cod),
            _ => None,
        }
    }
}

/// Payment state of the order as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// Raw result reported by the payment provider on buyer submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PaymentResult {
    pub id: Option<String>,
    pub status: Option<String>,
    pub update_time: Option<String>,
    pub email_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let item = OrderItem {
            product: ProductId::new(),
            product_name: "Widget".to_string(),
            product_image: String::new(),
            quantity: 3,
            price: Money::from_cents(1000),
            seller: UserId::new(),
        };
        assert_eq!(item.line_total().cents(), 3000);
    }

    #[test]
    fn address_country_defaults() {
        let address: DeliveryAddress = serde_json::from_str(
            r#"{"street":"1 Main St","city":"Pune","state":"MH","zip_code":"411001"}"#,
        )
        .unwrap();
        assert_eq!(address.country, "India");
    }

    #[test]
    fn payment_method_wire_round_trip() {
        for method in [
            PaymentMethod::Stripe,
            PaymentMethod::Paypal,
            PaymentMethod::CashOnDelivery,
            PaymentMethod::Cod,
        ] {
            assert_eq!(PaymentMethod::parse(method.as_str()), Some(method));
        }
    }
}
