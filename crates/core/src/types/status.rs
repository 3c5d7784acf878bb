//! Order lifecycle status.

use serde::{Deserialize, Serialize};

/// Fulfillment status of an order.
///
/// The happy path is forward-only: `Pending` -> `Confirmed` -> `Processing`
/// -> `Shipped` -> `Delivered`. `Cancelled` is reachable only from `Pending`
/// or `Confirmed`. `Delivered` and `Cancelled` are terminal. Skipping a step
/// (e.g., `Pending` -> `Shipped`) is never legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Initial state, assigned at order creation.
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether no further transitions are possible from this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// The statuses from which `target` is directly reachable.
    ///
    /// Used to build guarded status updates: an update constrained to these
    /// predecessors cannot apply an illegal transition, no matter how the
    /// current status changes concurrently.
    #[must_use]
    pub const fn legal_predecessors(target: Self) -> &'static [Self] {
        match target {
            Self::Pending => &[],
            Self::Confirmed => &[Self::Pending],
            Self::Processing => &[Self::Confirmed],
            Self::Shipped => &[Self::Processing],
            Self::Delivered => &[Self::Shipped],
            Self::Cancelled => &[Self::Pending, Self::Confirmed],
        }
    }

    /// The stored snake_case form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}
