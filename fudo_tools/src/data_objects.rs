use std::collections::HashMap;

use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::helpers::{lenient_f64, lenient_i64, lenient_string, object_or_default, resource_id, value_to_string};

//--------------------------------------      FudoSale       ---------------------------------------------------------
/// A `Sale` resource, as returned by the Fudo sales endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FudoSale {
    #[serde(deserialize_with = "resource_id")]
    pub id: String,
    #[serde(default, deserialize_with = "object_or_default")]
    pub attributes: SaleAttributes,
    #[serde(default)]
    pub relationships: Option<Value>,
    /// The customer for this sale, if the document included it. Filled in by [`SalesPage::sales`] and
    /// [`SaleDocument::sale`].
    #[serde(skip)]
    pub customer: Option<FudoCustomer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleAttributes {
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub closed_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sale_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sale_state: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub people: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub comment: Option<String>,
}

impl FudoSale {
    pub fn new<S: Into<String>>(id: S, attributes: SaleAttributes) -> Self {
        Self { id: id.into(), attributes, relationships: None, customer: None }
    }

    /// The id of the customer linked to this sale through `relationships.customer.data.id`, if any.
    pub fn customer_id(&self) -> Option<String> {
        self.relationships.as_ref().and_then(|r| value_to_string(&r["customer"]["data"]["id"]))
    }

    fn attach_customer(&mut self, customers: &HashMap<String, FudoCustomer>) {
        if let Some(id) = self.customer_id() {
            self.customer = customers.get(&id).cloned();
        }
    }
}

//--------------------------------------    FudoCustomer     ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FudoCustomer {
    #[serde(deserialize_with = "resource_id")]
    pub id: String,
    #[serde(default, deserialize_with = "object_or_default")]
    pub attributes: CustomerAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAttributes {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
}

//--------------------------------------      Documents      ---------------------------------------------------------
/// The document returned by `GET /sales`.
///
/// Resources are kept as raw JSON until [`SalesPage::sales`] is called, so that one malformed entry only costs that
/// entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesPage {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub included: Vec<Value>,
}

impl SalesPage {
    pub fn sales(self) -> Vec<FudoSale> {
        let customers = index_customers(&self.included);
        self.data
            .into_iter()
            .filter_map(|v| {
                serde_json::from_value::<FudoSale>(v)
                    .map_err(|e| warn!("🧾️ Skipping a sale that could not be decoded. {e}"))
                    .ok()
            })
            .map(|mut sale| {
                sale.attach_customer(&customers);
                sale
            })
            .collect()
    }
}

/// The document returned by `GET /sales/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleDocument {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub included: Vec<Value>,
}

impl SaleDocument {
    pub fn sale(self) -> Option<FudoSale> {
        let customers = index_customers(&self.included);
        let mut sale = serde_json::from_value::<FudoSale>(self.data)
            .map_err(|e| warn!("🧾️ Sale document could not be decoded. {e}"))
            .ok()?;
        sale.attach_customer(&customers);
        Some(sale)
    }
}

fn index_customers(included: &[Value]) -> HashMap<String, FudoCustomer> {
    included
        .iter()
        .filter(|v| v["type"].as_str().map(|t| t.eq_ignore_ascii_case("customer")).unwrap_or(false))
        .filter_map(|v| serde_json::from_value::<FudoCustomer>(v.clone()).ok())
        .map(|c| (c.id.clone(), c))
        .collect()
}

/// Response from the Fudo token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    /// Expiry, as a unix timestamp in seconds.
    pub exp: i64,
}
