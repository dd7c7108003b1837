//! Account billing models.
//!
//! Timestamp fields are normalized from the API's raw strings whenever a record is
//! deserialized, through each record's wire type. They are not re-encoded.

use chrono::{DateTime, Utc};
use linode_core::id::{InvoiceId, PaymentId};
use linode_core::resource::Decodable;
use linode_core::timestamp;
use serde::{Deserialize, Serialize};

/// An invoice for billable activity on the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "InvoiceWire")]
pub struct Invoice {
    /// Invoice id.
    pub id: InvoiceId,
    /// Invoice label, e.g. `Invoice #123`.
    pub label: String,
    /// Amount due including tax (USD).
    pub total: f64,
    /// When the invoice was generated.
    #[serde(skip_serializing)]
    pub date: Option<DateTime<Utc>>,
    /// Tax amount (USD).
    pub tax: f64,
    /// Amount before tax (USD).
    pub subtotal: f64,
    /// Billing source, e.g. `linode` or `akamai`.
    pub billing_source: String,
    /// Breakdown of taxes applied.
    pub tax_summary: Vec<InvoiceTaxSummary>,
}

/// One tax line of an [`Invoice`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceTaxSummary {
    /// Tax amount (USD).
    pub tax: f64,
    /// Tax name, e.g. `PA STATE TAX`.
    pub name: String,
}

/// A single billable activity on an [`Invoice`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "InvoiceItemWire")]
pub struct InvoiceItem {
    /// Item label.
    pub label: String,
    /// Item type, e.g. `hourly` or `misc`.
    #[serde(rename = "type")]
    pub item_type: String,
    /// Price per unit (USD).
    pub unit_price: f64,
    /// Units billed.
    pub quantity: u64,
    /// Amount before tax (USD).
    pub amount: f64,
    /// Tax amount (USD).
    pub tax: f64,
    /// Region the activity took place in, when regional.
    pub region: Option<String>,
    /// Start of the billed period.
    #[serde(skip_serializing)]
    pub from: Option<DateTime<Utc>>,
    /// End of the billed period.
    #[serde(skip_serializing)]
    pub to: Option<DateTime<Utc>>,
    /// Amount including tax (USD).
    pub total: f64,
}

/// A payment applied to the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "PaymentWire")]
pub struct Payment {
    /// Payment id.
    pub id: PaymentId,
    /// When the payment was made.
    #[serde(skip_serializing)]
    pub date: Option<DateTime<Utc>>,
    /// Amount paid (USD).
    pub usd: f64,
}

/// Wire form of [`Invoice`], with the raw date string.
#[derive(Debug, Deserialize)]
pub struct InvoiceWire {
    id: InvoiceId,
    label: String,
    total: f64,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    tax: f64,
    #[serde(default)]
    subtotal: f64,
    #[serde(default)]
    billing_source: String,
    #[serde(default)]
    tax_summary: Vec<InvoiceTaxSummary>,
}

impl TryFrom<InvoiceWire> for Invoice {
    type Error = linode_core::Error;

    fn try_from(wire: InvoiceWire) -> linode_core::Result<Self> {
        Ok(Self {
            id: wire.id,
            label: wire.label,
            total: wire.total,
            date: timestamp::parse_optional(wire.date.as_deref())?,
            tax: wire.tax,
            subtotal: wire.subtotal,
            billing_source: wire.billing_source,
            tax_summary: wire.tax_summary,
        })
    }
}

impl Decodable for Invoice {
    type Wire = InvoiceWire;

    fn from_wire(wire: InvoiceWire) -> linode_core::Result<Self> {
        Self::try_from(wire)
    }
}

/// Wire form of [`InvoiceItem`], with the raw period strings.
#[derive(Debug, Deserialize)]
pub struct InvoiceItemWire {
    label: String,
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    unit_price: f64,
    #[serde(default)]
    quantity: u64,
    #[serde(default)]
    amount: f64,
    #[serde(default)]
    tax: f64,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    total: f64,
}

impl TryFrom<InvoiceItemWire> for InvoiceItem {
    type Error = linode_core::Error;

    fn try_from(wire: InvoiceItemWire) -> linode_core::Result<Self> {
        Ok(Self {
            from: timestamp::parse_optional(wire.from.as_deref())?,
            to: timestamp::parse_optional(wire.to.as_deref())?,
            label: wire.label,
            item_type: wire.item_type,
            unit_price: wire.unit_price,
            quantity: wire.quantity,
            amount: wire.amount,
            tax: wire.tax,
            region: wire.region,
            total: wire.total,
        })
    }
}

impl Decodable for InvoiceItem {
    type Wire = InvoiceItemWire;

    fn from_wire(wire: InvoiceItemWire) -> linode_core::Result<Self> {
        Self::try_from(wire)
    }
}

/// Wire form of [`Payment`], with the raw date string.
#[derive(Debug, Deserialize)]
pub struct PaymentWire {
    id: PaymentId,
    #[serde(default)]
    date: Option<String>,
    usd: f64,
}

impl TryFrom<PaymentWire> for Payment {
    type Error = linode_core::Error;

    fn try_from(wire: PaymentWire) -> linode_core::Result<Self> {
        Ok(Self {
            id: wire.id,
            date: timestamp::parse_optional(wire.date.as_deref())?,
            usd: wire.usd,
        })
    }
}

impl Decodable for Payment {
    type Wire = PaymentWire;

    fn from_wire(wire: PaymentWire) -> linode_core::Result<Self> {
        Self::try_from(wire)
    }
}

linode_core::plain_decodable!(InvoiceTaxSummary);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use linode_core::resource::decode;
    use linode_core::Error;
    use serde_json::json;

    fn invoice_json() -> serde_json::Value {
        json!({
            "id": 123,
            "label": "Invoice #123",
            "date": "2018-01-01T00:01:01",
            "subtotal": 120.25,
            "tax": 12.25,
            "total": 132.5,
            "billing_source": "linode",
            "tax_summary": [
                { "tax": 12.25, "name": "PA STATE TAX" }
            ]
        })
    }

    #[test]
    fn invoice_decodes_with_normalized_date() {
        let invoice: Invoice = decode(invoice_json().to_string().as_bytes()).unwrap();
        assert_eq!(invoice.id, InvoiceId::new(123));
        assert_eq!(invoice.label, "Invoice #123");
        assert_eq!(
            invoice.date,
            Some(Utc.with_ymd_and_hms(2018, 1, 1, 0, 1, 1).unwrap())
        );
        assert_eq!(invoice.tax_summary.len(), 1);
        assert_eq!(invoice.tax_summary[0].name, "PA STATE TAX");
    }

    #[test]
    fn invoice_reencode_omits_date_only() {
        let invoice: Invoice = decode(invoice_json().to_string().as_bytes()).unwrap();
        let encoded = serde_json::to_value(&invoice).unwrap();

        let mut expected = invoice_json();
        expected.as_object_mut().unwrap().remove("date");
        assert_eq!(encoded, expected);
    }

    #[test]
    fn invoice_with_null_date() {
        let mut value = invoice_json();
        value["date"] = serde_json::Value::Null;
        let invoice: Invoice = decode(value.to_string().as_bytes()).unwrap();
        assert!(invoice.date.is_none());
    }

    #[test]
    fn invoice_with_bad_date_fails() {
        let mut value = invoice_json();
        value["date"] = json!("not-a-date");
        let err = decode::<Invoice>(value.to_string().as_bytes()).unwrap_err();
        assert_eq!(err, Error::TimestampFormat("not-a-date".into()));
    }

    #[test]
    fn invoice_item_decodes_period() {
        let body = json!({
            "label": "Nanode 1GB",
            "type": "hourly",
            "unit_price": 0.0075,
            "quantity": 744,
            "amount": 5.0,
            "tax": 0.3,
            "region": "us-east",
            "from": "2023-05-01T00:00:00",
            "to": "2023-05-31T23:59:59.000Z",
            "total": 5.3
        });

        let item: InvoiceItem = decode(body.to_string().as_bytes()).unwrap();
        assert_eq!(item.item_type, "hourly");
        assert_eq!(item.quantity, 744);
        assert_eq!(item.region.as_deref(), Some("us-east"));
        assert_eq!(
            item.from,
            Some(Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            item.to,
            Some(Utc.with_ymd_and_hms(2023, 5, 31, 23, 59, 59).unwrap())
        );
    }

    #[test]
    fn invoice_item_without_region_or_period() {
        let body = json!({
            "label": "Credit",
            "type": "misc",
            "region": null,
            "from": null,
            "to": null
        });

        let item: InvoiceItem = decode(body.to_string().as_bytes()).unwrap();
        assert!(item.region.is_none());
        assert!(item.from.is_none());
        assert!(item.to.is_none());
        assert_eq!(item.total, 0.0);
    }

    #[test]
    fn invoice_item_serializes_type_field() {
        let body = json!({ "label": "Backup", "type": "hourly", "from": "2023-05-01T00:00:00" });
        let item: InvoiceItem = decode(body.to_string().as_bytes()).unwrap();
        let encoded = serde_json::to_value(&item).unwrap();
        assert_eq!(encoded["type"], "hourly");
        assert!(encoded.get("from").is_none());
    }

    #[test]
    fn payment_decodes() {
        let body = json!({ "id": 7, "date": "2020-01-01 12:30:00", "usd": 25.0 });
        let payment: Payment = decode(body.to_string().as_bytes()).unwrap();
        assert_eq!(payment.id, PaymentId::new(7));
        assert_eq!(
            payment.date,
            Some(Utc.with_ymd_and_hms(2020, 1, 1, 12, 30, 0).unwrap())
        );
        assert!((payment.usd - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn plain_serde_parses_invoice_date() {
        let invoice: Invoice = serde_json::from_str(
            r#"{"id": 1, "label": "x", "total": 1.0, "date": "2023-05-01T12:00:00"}"#,
        )
        .unwrap();
        assert_eq!(
            invoice.date,
            Some(Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn plain_serde_rejects_bad_invoice_date() {
        let err = serde_json::from_str::<Invoice>(
            r#"{"id": 1, "label": "x", "total": 1.0, "date": "not-a-date"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not-a-date"));
    }

    #[test]
    fn plain_serde_rejects_bad_item_period_and_payment_date() {
        assert!(serde_json::from_str::<InvoiceItem>(
            r#"{"label": "x", "type": "hourly", "to": "tomorrow"}"#
        )
        .is_err());
        assert!(serde_json::from_str::<Payment>(r#"{"id": 2, "date": "", "usd": 1.0}"#).is_err());
    }

    #[test]
    fn plain_serde_list_of_invoices() {
        let invoices: Vec<Invoice> =
            serde_json::from_value(serde_json::Value::Array(vec![invoice_json()])).unwrap();
        assert_eq!(invoices[0], decode::<Invoice>(invoice_json().to_string().as_bytes()).unwrap());
    }

    #[test]
    fn missing_required_field_is_decode_error() {
        let err = decode::<Payment>(br#"{"id": 7}"#).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
