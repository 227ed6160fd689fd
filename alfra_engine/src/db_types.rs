use std::{fmt::Display, str::FromStr};

use alfra_common::Pesos;
use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------      SaleType       ---------------------------------------------------------
/// How the POS says a sale is being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
pub enum SaleType {
    #[serde(rename = "EAT-IN")]
    #[sqlx(rename = "EAT-IN")]
    EatIn,
    #[serde(rename = "TAKEAWAY")]
    #[sqlx(rename = "TAKEAWAY")]
    Takeaway,
    #[serde(rename = "DELIVERY")]
    #[sqlx(rename = "DELIVERY")]
    Delivery,
    #[serde(rename = "COUNTER")]
    #[sqlx(rename = "COUNTER")]
    Counter,
    /// The POS sent something we don't recognise, or nothing at all.
    #[serde(rename = "UNKNOWN")]
    #[sqlx(rename = "UNKNOWN")]
    Unknown,
}

impl SaleType {
    /// Maps a raw POS value onto a `SaleType`. This never fails; anything unrecognised is `Unknown`.
    pub fn from_pos_value(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or(Self::Unknown)
    }
}

impl Display for SaleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaleType::EatIn => write!(f, "EAT-IN"),
            SaleType::Takeaway => write!(f, "TAKEAWAY"),
            SaleType::Delivery => write!(f, "DELIVERY"),
            SaleType::Counter => write!(f, "COUNTER"),
            SaleType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl FromStr for SaleType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('_', "-").as_str() {
            "EAT-IN" => Ok(Self::EatIn),
            "TAKEAWAY" => Ok(Self::Takeaway),
            "DELIVERY" => Ok(Self::Delivery),
            "COUNTER" => Ok(Self::Counter),
            "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(ConversionError(format!("Invalid sale type: {s}"))),
        }
    }
}

impl From<String> for SaleType {
    fn from(value: String) -> Self {
        Self::from_pos_value(Some(&value))
    }
}

//--------------------------------------      SaleState      ---------------------------------------------------------
/// The state of a sale on the POS. This is the POS's view of the order, and is distinct from [`OrderStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
pub enum SaleState {
    #[serde(rename = "OPEN")]
    #[sqlx(rename = "OPEN")]
    Open,
    #[serde(rename = "PENDING")]
    #[sqlx(rename = "PENDING")]
    Pending,
    #[serde(rename = "IN-COURSE")]
    #[sqlx(rename = "IN-COURSE")]
    InCourse,
    #[serde(rename = "CLOSED")]
    #[sqlx(rename = "CLOSED")]
    Closed,
    #[serde(rename = "CANCELED")]
    #[sqlx(rename = "CANCELED")]
    Canceled,
    #[serde(rename = "UNKNOWN")]
    #[sqlx(rename = "UNKNOWN")]
    Unknown,
}

impl SaleState {
    /// Maps a raw POS value onto a `SaleState`. This never fails; anything unrecognised is `Unknown`.
    pub fn from_pos_value(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or(Self::Unknown)
    }
}

impl Display for SaleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaleState::Open => write!(f, "OPEN"),
            SaleState::Pending => write!(f, "PENDING"),
            SaleState::InCourse => write!(f, "IN-COURSE"),
            SaleState::Closed => write!(f, "CLOSED"),
            SaleState::Canceled => write!(f, "CANCELED"),
            SaleState::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl FromStr for SaleState {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('_', "-").as_str() {
            "OPEN" => Ok(Self::Open),
            "PENDING" => Ok(Self::Pending),
            "IN-COURSE" => Ok(Self::InCourse),
            "CLOSED" => Ok(Self::Closed),
            "CANCELED" | "CANCELLED" => Ok(Self::Canceled),
            "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(ConversionError(format!("Invalid sale state: {s}"))),
        }
    }
}

impl From<String> for SaleState {
    fn from(value: String) -> Self {
        Self::from_pos_value(Some(&value))
    }
}

//--------------------------------------     OrderStatus     ---------------------------------------------------------
/// The application-level status of an order, as driven by restaurant staff.
///
/// There is no transition graph. Any status may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
pub enum OrderStatus {
    /// Seen on the POS, nobody has touched it yet.
    #[default]
    #[serde(rename = "pendiente")]
    #[sqlx(rename = "pendiente")]
    Pending,
    #[serde(rename = "en_preparacion")]
    #[sqlx(rename = "en_preparacion")]
    Preparing,
    #[serde(rename = "listo")]
    #[sqlx(rename = "listo")]
    Ready,
    #[serde(rename = "en_camino")]
    #[sqlx(rename = "en_camino")]
    OnTheWay,
    #[serde(rename = "entregado")]
    #[sqlx(rename = "entregado")]
    Delivered,
    #[serde(rename = "cancelado")]
    #[sqlx(rename = "cancelado")]
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pendiente"),
            OrderStatus::Preparing => write!(f, "en_preparacion"),
            OrderStatus::Ready => write!(f, "listo"),
            OrderStatus::OnTheWay => write!(f, "en_camino"),
            OrderStatus::Delivered => write!(f, "entregado"),
            OrderStatus::Cancelled => write!(f, "cancelado"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" => Ok(Self::Pending),
            "en_preparacion" => Ok(Self::Preparing),
            "listo" => Ok(Self::Ready),
            "en_camino" => Ok(Self::OnTheWay),
            "entregado" => Ok(Self::Delivered),
            "cancelado" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status in the database: {value}. This conversion cannot fail. Defaulting to pendiente");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------    StatusSource     ---------------------------------------------------------
/// Who (or what) originated a status change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum StatusSource {
    /// The admin panel
    Admin,
    /// The delivery staff screens
    Delivery,
    /// The point of sale itself
    Fudo,
    /// Any other API caller
    #[default]
    Api,
}

impl Display for StatusSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusSource::Admin => write!(f, "admin"),
            StatusSource::Delivery => write!(f, "delivery"),
            StatusSource::Fudo => write!(f, "fudo"),
            StatusSource::Api => write!(f, "api"),
        }
    }
}

impl FromStr for StatusSource {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "delivery" => Ok(Self::Delivery),
            "fudo" => Ok(Self::Fudo),
            "api" => Ok(Self::Api),
            s => Err(ConversionError(format!("Invalid status source: {s}"))),
        }
    }
}

//--------------------------------------        Role         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Delivery,
    Customer,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Delivery => write!(f, "delivery"),
            Role::Customer => write!(f, "customer"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "delivery" => Ok(Self::Delivery),
            "customer" => Ok(Self::Customer),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------       Profile       ---------------------------------------------------------
/// A known user of the system. The `id` is the subject assigned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub id: String,
    pub full_name: Option<String>,
    pub role: Role,
}

impl NewProfile {
    pub fn new<S: Into<String>>(id: S, role: Role) -> Self {
        Self { id: id.into(), full_name: None, role }
    }

    pub fn with_full_name<S: Into<String>>(mut self, name: S) -> Self {
        self.full_name = Some(name.into());
        self
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
/// An order as mirrored from the POS, together with its application-level status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    /// The sale id assigned by the POS. Unique.
    pub external_id: String,
    pub created_at_external: Option<DateTime<Utc>>,
    pub closed_at_external: Option<DateTime<Utc>>,
    pub total: Pesos,
    pub sale_type: SaleType,
    pub sale_state: SaleState,
    pub customer_name: Option<String>,
    pub status: OrderStatus,
    pub status_source: Option<StatusSource>,
    pub status_changed_at: Option<DateTime<Utc>>,
    pub status_changed_by: Option<String>,
    /// Incremented every time the row changes. Used for optimistic concurrency on status updates.
    pub version: i64,
    pub synced_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder      ---------------------------------------------------------
/// The POS-owned part of an order, as produced by projecting a raw sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub external_id: String,
    pub created_at_external: Option<DateTime<Utc>>,
    pub closed_at_external: Option<DateTime<Utc>>,
    pub total: Pesos,
    pub sale_type: SaleType,
    pub sale_state: SaleState,
    pub customer_name: Option<String>,
}

impl NewOrder {
    pub fn new<S: Into<String>>(external_id: S, total: Pesos) -> Self {
        Self {
            external_id: external_id.into(),
            created_at_external: None,
            closed_at_external: None,
            total,
            sale_type: SaleType::Unknown,
            sale_state: SaleState::Unknown,
            customer_name: None,
        }
    }

    pub fn with_sale_state(mut self, state: SaleState) -> Self {
        self.sale_state = state;
        self
    }

    pub fn with_sale_type(mut self, sale_type: SaleType) -> Self {
        self.sale_type = sale_type;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at_external = Some(created_at);
        self
    }

    /// True if the POS-owned fields of `order` are identical to this one.
    pub fn is_equivalent(&self, order: &Order) -> bool {
        self.external_id == order.external_id &&
            self.created_at_external == order.created_at_external &&
            self.closed_at_external == order.closed_at_external &&
            self.total == order.total &&
            self.sale_type == order.sale_type &&
            self.sale_state == order.sale_state &&
            self.customer_name == order.customer_name
    }
}

//--------------------------------------    StatusChange     ---------------------------------------------------------
/// A request to move an order to a new status, after the caller has been identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStatusChange {
    pub order_id: i64,
    pub new_status: OrderStatus,
    pub source: StatusSource,
    /// Profile id of the caller
    pub changed_by: String,
    /// If set, the change only applies if the order is still at this version.
    pub expected_version: Option<i64>,
}

/// One entry in the status audit trail of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StatusChange {
    pub id: i64,
    pub order_id: i64,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    pub source: StatusSource,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}
