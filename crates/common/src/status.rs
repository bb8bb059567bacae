//! Order status.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status of an order.
///
/// Encoded in the store as a small ordinal. There is no transition table:
/// any status may follow any other, and new orders always start as
/// `Unspecified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Unspecified,
    Pending,
    Processing,
    Completed,
    Cancelled,
}

/// Returned when a stored ordinal does not name a known status.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown order status ordinal: {0}")]
pub struct UnknownStatus(pub i16);

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Unspecified,
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Returns the ordinal stored in the `orders.status` column.
    pub fn as_i16(&self) -> i16 {
        match self {
            OrderStatus::Unspecified => 0,
            OrderStatus::Pending => 1,
            OrderStatus::Processing => 2,
            OrderStatus::Completed => 3,
            OrderStatus::Cancelled => 4,
        }
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Unspecified => "Unspecified",
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl TryFrom<i16> for OrderStatus {
    type Error = UnknownStatus;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OrderStatus::Unspecified),
            1 => Ok(OrderStatus::Pending),
            2 => Ok(OrderStatus::Processing),
            3 => Ok(OrderStatus::Completed),
            4 => Ok(OrderStatus::Cancelled),
            other => Err(UnknownStatus(other)),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unspecified() {
        assert_eq!(OrderStatus::default(), OrderStatus::Unspecified);
    }

    #[test]
    fn ordinals_are_stable() {
        let ordinals: Vec<i16> = OrderStatus::ALL.iter().map(|s| s.as_i16()).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3, 4]);
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::try_from(status.as_i16()), Ok(status));
        }
    }

    #[test]
    fn unknown_ordinal_is_rejected() {
        assert_eq!(OrderStatus::try_from(5), Err(UnknownStatus(5)));
        assert_eq!(OrderStatus::try_from(-1), Err(UnknownStatus(-1)));
    }
}
