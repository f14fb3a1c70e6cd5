//! # Backend Cart Listing Codec
//!
//! Decodes the backend's cart and product JSON into priced domain values,
//! and encodes the payloads the shell posts back.
//!
//! ## Wire Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  GET cart/list ──► { "carts": [WireCartLine] } ──► decode_cart_listing  │
//! │                                                      │                  │
//! │                                  ┌───────────────────┼────────────┐     │
//! │                                  ▼                   ▼            ▼     │
//! │                          unknown discount     bad price/qty     OK      │
//! │                          → undiscounted       → line dropped  CartLine  │
//! │                            (warn)               (warn)                  │
//! │                                                                         │
//! │  CartLine ──► change_quantity ──► CartLineUpdate ──► PUT cart/update    │
//! │  Product  ──► add_product     ──► NewCartLine    ──► POST cart/register │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backend field names are kept verbatim through `serde(rename)`; the
//! Rust side uses its own names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::validation::{validate_coupon_code, validate_unit_price};
use storefront_core::{
    CampaignDiscount, Discount, InventoryKind, LineAmounts, Money, PricingRules, Product, Variety,
};
use tracing::{debug, warn};

use crate::cart::{CartLine, ProductRef, VarietyRef};
use crate::error::{CartError, CartResult};

// =============================================================================
// Incoming: Products
// =============================================================================

/// A variety as the backend sends it inside a product.
#[derive(Debug, Clone, Deserialize)]
pub struct WireVariety {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "valor", default)]
    pub value: String,
    #[serde(default)]
    pub stock: i64,
}

impl From<WireVariety> for Variety {
    fn from(wire: WireVariety) -> Self {
        Variety {
            id: wire.id,
            value: wire.value,
            stock: wire.stock,
        }
    }
}

/// A product's running campaign.
#[derive(Debug, Clone, Deserialize)]
pub struct WireCampaign {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "type_campaign", default)]
    pub campaign_kind: i64,
    pub type_discount: i64,
    pub discount: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// A product from the catalog endpoints (card, detail, or populated
/// inside a cart line).
#[derive(Debug, Clone, Deserialize)]
pub struct WireProduct {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub sku: String,
    pub price_usd: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(rename = "type_inventario", default)]
    pub inventory_code: i64,
    #[serde(rename = "variedades", default)]
    pub varieties: Vec<WireVariety>,
    #[serde(rename = "campaing_discount", default)]
    pub campaign_discount: Option<WireCampaign>,
}

/// Decodes a single product.
///
/// A campaign whose discount terms are invalid is dropped with a warning;
/// the product is then shown at list price.
pub fn decode_product(wire: WireProduct) -> CartResult<Product> {
    let price = wire_money("price_usd", wire.price_usd)?;

    let campaign_discount = match wire.campaign_discount {
        Some(campaign) => match Discount::from_wire(campaign.type_discount, campaign.discount) {
            Ok(discount) => Some(CampaignDiscount {
                id: campaign.id,
                campaign_kind: campaign.campaign_kind,
                discount,
                starts_at: campaign.start_date,
                ends_at: campaign.end_date,
            }),
            Err(e) => {
                warn!(product_id = %wire.id, error = %e, "Ignoring campaign with invalid discount");
                None
            }
        },
        None => None,
    };

    Ok(Product {
        id: wire.id,
        title: wire.title,
        slug: wire.slug,
        sku: wire.sku,
        price,
        stock: wire.stock,
        inventory: InventoryKind::from_code(wire.inventory_code),
        varieties: wire.varieties.into_iter().map(Variety::from).collect(),
        campaign_discount,
    })
}

/// Parses a product detail response body.
pub fn parse_product(json: &str) -> CartResult<Product> {
    let wire: WireProduct = serde_json::from_str(json)?;
    decode_product(wire)
}

// =============================================================================
// Incoming: Cart Listing
// =============================================================================

/// The variety on a cart line: populated, or just its id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireVarietyRef {
    Populated(WireVariety),
    Id(String),
}

/// A cart line as the backend returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct WireCartLine {
    #[serde(rename = "_id")]
    pub id: String,
    pub product: WireProduct,
    /// Kept wide so an unknown code reaches the discount fallback
    /// instead of failing the whole listing.
    pub type_discount: i64,
    #[serde(default)]
    pub discount: f64,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
    #[serde(rename = "variedad", default)]
    pub variety: Option<WireVarietyRef>,
    #[serde(rename = "code_cupon", default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub code_discount: Option<String>,
    #[serde(rename = "price_unitario")]
    pub unit_price: f64,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub total: f64,
}

/// Response body of the cart listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CartListResponse {
    #[serde(default)]
    pub carts: Vec<WireCartLine>,
}

/// Parses a cart listing response body into priced cart lines.
///
/// ## Recovery Rules
/// - Unknown discount kind (any integer) or unusable discount amount: the
///   line is kept and priced without a discount
/// - Zero/negative price, quantity outside the rules, a non-finite number,
///   or amounts that overflow the cent range: the line is dropped
///
/// Only a body that isn't the expected JSON shape fails the whole call.
pub fn parse_cart_listing(json: &str, rules: &PricingRules) -> CartResult<Vec<CartLine>> {
    let response: CartListResponse = serde_json::from_str(json)?;
    Ok(decode_cart_listing(response, rules))
}

/// Decodes an already-deserialized listing. See [`parse_cart_listing`].
pub fn decode_cart_listing(response: CartListResponse, rules: &PricingRules) -> Vec<CartLine> {
    let received = response.carts.len();
    let lines: Vec<CartLine> = response
        .carts
        .into_iter()
        .filter_map(|wire| {
            let line_id = wire.id.clone();
            match decode_cart_line(wire, rules) {
                Ok(line) => Some(line),
                Err(e) => {
                    warn!(line_id = %line_id, error = %e, "Dropping cart line");
                    None
                }
            }
        })
        .collect();

    debug!(received, kept = lines.len(), "Decoded cart listing");
    lines
}

/// Decodes one cart line and checks it prices under `rules`.
pub fn decode_cart_line(wire: WireCartLine, rules: &PricingRules) -> CartResult<CartLine> {
    let unit_price = wire_money("price_unitario", wire.unit_price)?;
    validate_unit_price(unit_price)?;

    let discount = Discount::from_wire(wire.type_discount, wire.discount).unwrap_or_else(|e| {
        warn!(line_id = %wire.id, error = %e, "Pricing cart line without discount");
        Discount::none()
    });

    // Reject before storing: a line that can't be priced never reaches the cart
    rules.line_amounts(unit_price, wire.quantity, &discount)?;

    let server_amounts = LineAmounts {
        subtotal: wire_money("subtotal", wire.subtotal)?,
        total: wire_money("total", wire.total)?,
    };

    let variety = wire.variety.map(|v| match v {
        WireVarietyRef::Populated(variety) => VarietyRef::Populated(variety.into()),
        WireVarietyRef::Id(id) => VarietyRef::Id(id),
    });

    Ok(CartLine {
        id: wire.id,
        product: ProductRef {
            id: wire.product.id,
            title: wire.product.title,
            sku: wire.product.sku,
            stock: wire.product.stock,
            inventory: InventoryKind::from_code(wire.product.inventory_code),
        },
        variety,
        unit_price,
        quantity: wire.quantity,
        discount,
        coupon_code: wire.coupon_code,
        discount_code: wire.code_discount,
        server_amounts,
    })
}

fn wire_money(field: &str, amount: f64) -> CartResult<Money> {
    Money::from_decimal(amount).ok_or_else(|| CartError::InvalidWireValue {
        field: field.to_string(),
        value: amount.to_string(),
    })
}

// =============================================================================
// Outgoing
// =============================================================================

/// Body of a quantity change for an existing line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLineUpdate {
    #[serde(rename = "_id")]
    pub line_id: String,
    #[serde(rename = "product")]
    pub product_id: String,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
    pub type_discount: u8,
    pub discount: f64,
    #[serde(rename = "code_cupon")]
    pub coupon_code: Option<String>,
    pub code_discount: Option<String>,
    /// Undiscounted unit price.
    #[serde(rename = "price_unitario")]
    pub unit_price: f64,
    pub subtotal: f64,
    pub total: f64,
    #[serde(rename = "variedad", skip_serializing_if = "Option::is_none")]
    pub variety_id: Option<String>,
}

/// Body of an add-to-cart request.
///
/// The backend takes the user from the session token, so no user id is
/// sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCartLine {
    #[serde(rename = "product")]
    pub product_id: String,
    pub type_discount: u8,
    pub discount: f64,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
    #[serde(rename = "variedad")]
    pub variety_id: Option<String>,
    #[serde(rename = "code_cupon")]
    pub coupon_code: Option<String>,
    /// Campaign id when the product carries a campaign discount.
    pub code_discount: Option<String>,
    /// Undiscounted unit price, same as [`CartLineUpdate::unit_price`].
    #[serde(rename = "price_unitario")]
    pub unit_price: f64,
    pub subtotal: f64,
    pub total: f64,
}

/// Body of a coupon application request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponRequest {
    pub code: String,
}

impl CouponRequest {
    /// Validates and normalizes the code the user typed.
    pub fn new(code: &str) -> CartResult<Self> {
        Ok(CouponRequest {
            code: validate_coupon_code(code)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::DiscountRate;

    fn listing_json() -> &'static str {
        r#"{
            "carts": [
                {
                    "_id": "line-1",
                    "user": "u1",
                    "product": {
                        "_id": "p1", "title": "Runner", "sku": "RUN-1",
                        "price_usd": 100, "stock": 10, "type_inventario": 1
                    },
                    "type_discount": 1, "discount": 20, "cantidad": 3,
                    "variedad": null, "code_cupon": null, "code_discount": "camp-1",
                    "price_unitario": 100, "subtotal": 300, "total": 240
                },
                {
                    "_id": "line-2",
                    "product": {
                        "_id": "p2", "title": "Tee", "price_usd": 50,
                        "stock": 0, "type_inventario": 2
                    },
                    "type_discount": 2, "discount": 10, "cantidad": 2,
                    "variedad": { "_id": "v-red", "valor": "Red", "stock": 4 },
                    "price_unitario": 50, "subtotal": 100, "total": 80
                }
            ]
        }"#
    }

    #[test]
    fn test_parse_cart_listing() {
        let lines = parse_cart_listing(listing_json(), &PricingRules::default()).unwrap();
        assert_eq!(lines.len(), 2);

        let first = &lines[0];
        assert_eq!(first.unit_price, Money::from_cents(10000));
        assert_eq!(first.discount, Discount::Percent(DiscountRate::from_percent(20)));
        assert_eq!(first.discount_code.as_deref(), Some("camp-1"));
        assert!(first.variety.is_none());

        let second = &lines[1];
        assert_eq!(second.discount, Discount::Fixed(Money::from_cents(1000)));
        assert_eq!(second.product.inventory, InventoryKind::Variant);
        assert_eq!(second.available_stock(), 4);
        assert_eq!(second.server_amounts.total, Money::from_cents(8000));
    }

    #[test]
    fn test_variety_as_bare_id() {
        let json = r#"{ "carts": [{
            "_id": "l", "product": { "_id": "p", "price_usd": 5, "stock": 9, "type_inventario": 2 },
            "type_discount": 1, "discount": 0, "cantidad": 1, "variedad": "v-9",
            "price_unitario": 5, "subtotal": 5, "total": 5
        }]}"#;
        let lines = parse_cart_listing(json, &PricingRules::default()).unwrap();
        assert!(matches!(&lines[0].variety, Some(VarietyRef::Id(id)) if id == "v-9"));
        // Stock of an unpopulated variety is unknown
        assert_eq!(lines[0].available_stock(), 0);
    }

    #[test]
    fn test_unknown_discount_kind_prices_undiscounted() {
        let json = r#"{ "carts": [{
            "_id": "l", "product": { "_id": "p", "price_usd": 5 },
            "type_discount": 9, "discount": 50, "cantidad": 1,
            "price_unitario": 5, "subtotal": 5, "total": 2.5
        }]}"#;
        let lines = parse_cart_listing(json, &PricingRules::default()).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].discount.is_none());
    }

    #[test]
    fn test_invalid_lines_are_dropped() {
        let json = r#"{ "carts": [
            { "_id": "free", "product": { "_id": "p", "price_usd": 0 },
              "type_discount": 1, "discount": 0, "cantidad": 1, "price_unitario": 0 },
            { "_id": "zero-qty", "product": { "_id": "p", "price_usd": 5 },
              "type_discount": 1, "discount": 0, "cantidad": 0, "price_unitario": 5 },
            { "_id": "ok", "product": { "_id": "p", "price_usd": 5 },
              "type_discount": 1, "discount": 0, "cantidad": 1, "price_unitario": 5 }
        ]}"#;
        let lines = parse_cart_listing(json, &PricingRules::default()).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id, "ok");
    }

    #[test]
    fn test_out_of_range_discount_kind_keeps_listing() {
        let json = r#"{ "carts": [
            { "_id": "wide", "product": { "_id": "p1", "price_usd": 5 },
              "type_discount": 300, "discount": 10, "cantidad": 1, "price_unitario": 5 },
            { "_id": "negative", "product": { "_id": "p2", "price_usd": 5 },
              "type_discount": -1, "discount": 10, "cantidad": 1, "price_unitario": 5 },
            { "_id": "ok", "product": { "_id": "p3", "price_usd": 5 },
              "type_discount": 1, "discount": 10, "cantidad": 1, "price_unitario": 5 }
        ]}"#;
        let lines = parse_cart_listing(json, &PricingRules::default()).unwrap();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].discount.is_none());
        assert!(lines[1].discount.is_none());
        assert_eq!(lines[2].discount, Discount::Percent(DiscountRate::from_percent(10)));
    }

    #[test]
    fn test_overflowing_line_is_dropped() {
        let json = r#"{ "carts": [
            { "_id": "huge", "product": { "_id": "p1", "price_usd": 50000000000000000 },
              "type_discount": 1, "discount": 0, "cantidad": 2,
              "price_unitario": 50000000000000000 },
            { "_id": "ok", "product": { "_id": "p2", "price_usd": 5 },
              "type_discount": 1, "discount": 0, "cantidad": 2, "price_unitario": 5 }
        ]}"#;
        let lines = parse_cart_listing(json, &PricingRules::default()).unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id, "ok");
    }

    #[test]
    fn test_malformed_body_fails() {
        let err = parse_cart_listing("{ not json", &PricingRules::default()).unwrap_err();
        assert!(matches!(err, CartError::Json(_)));
    }

    #[test]
    fn test_parse_product_with_campaign() {
        let json = r#"{
            "_id": "p1", "title": "Jacket", "slug": "jacket", "sku": "JK-1",
            "price_usd": 80.5, "stock": 3, "type_inventario": 2,
            "variedades": [{ "_id": "v1", "valor": "M", "stock": 1 }],
            "campaing_discount": {
                "_id": "c1", "type_campaign": 1, "type_discount": 2, "discount": 20.5,
                "start_date": "2024-01-01T00:00:00.000Z", "end_date": "2099-12-31T23:59:59.000Z"
            }
        }"#;
        let product = parse_product(json).unwrap();
        assert_eq!(product.price, Money::from_cents(8050));
        assert_eq!(product.inventory, InventoryKind::Variant);
        assert_eq!(product.varieties.len(), 1);
        assert_eq!(
            product.effective_discount(),
            Discount::Fixed(Money::from_cents(2050))
        );
    }

    #[test]
    fn test_product_with_bad_campaign_keeps_list_price() {
        let json = r#"{
            "_id": "p1", "price_usd": 10,
            "campaing_discount": {
                "type_discount": 7, "discount": 1,
                "start_date": "2024-01-01T00:00:00Z", "end_date": "2024-02-01T00:00:00Z"
            }
        }"#;
        let product = parse_product(json).unwrap();
        assert!(!product.has_discount());
    }

    #[test]
    fn test_update_payload_shape() {
        let update = CartLineUpdate {
            line_id: "l1".into(),
            product_id: "p1".into(),
            quantity: 2,
            type_discount: 1,
            discount: 20.0,
            coupon_code: None,
            code_discount: None,
            unit_price: 100.0,
            subtotal: 200.0,
            total: 160.0,
            variety_id: None,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["_id"], "l1");
        assert_eq!(json["cantidad"], 2);
        assert_eq!(json["price_unitario"], 100.0);
        assert!(json.get("variedad").is_none());
    }

    #[test]
    fn test_coupon_request() {
        assert_eq!(CouponRequest::new(" spring-15 ").unwrap().code, "SPRING-15");
        assert!(CouponRequest::new("").is_err());
    }
}
