use serde::ser::Serializer;
use serde::Serialize;

/// Slots left on an offering. Serialized as the string "unlimited" or a
/// number, matching what the booking UI renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Unlimited,
    Slots(u32),
}

impl Serialize for Remaining {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Remaining::Unlimited => serializer.serialize_str("unlimited"),
            Remaining::Slots(n) => serializer.serialize_u32(*n),
        }
    }
}

/// Result of an availability query. Counts only completed bookings;
/// pending and failed ones never hold a slot.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Availability {
    pub completed_count: u32,
    pub remaining: Remaining,
    pub is_unlimited: bool,
}

impl Availability {
    pub fn unlimited(completed_count: u32) -> Self {
        Self {
            completed_count,
            remaining: Remaining::Unlimited,
            is_unlimited: true,
        }
    }

    pub fn limited(completed_count: u32, capacity: u32) -> Self {
        Self {
            completed_count,
            remaining: Remaining::Slots(capacity.saturating_sub(completed_count)),
            is_unlimited: false,
        }
    }

    /// Whether a further booking could still complete.
    pub fn has_room(&self) -> bool {
        match self.remaining {
            Remaining::Unlimited => true,
            Remaining::Slots(n) => n > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limited_remaining_never_goes_negative() {
        let availability = Availability::limited(7, 5);
        assert_eq!(availability.remaining, Remaining::Slots(0));
        assert!(!availability.has_room());
    }

    #[test]
    fn unlimited_always_has_room() {
        let availability = Availability::unlimited(10_000);
        assert!(availability.is_unlimited);
        assert!(availability.has_room());
    }

    #[test]
    fn remaining_serializes_to_number_or_sentinel() {
        assert_eq!(
            serde_json::to_string(&Remaining::Slots(3)).unwrap(),
            "3"
        );
        assert_eq!(
            serde_json::to_string(&Remaining::Unlimited).unwrap(),
            "\"unlimited\""
        );
    }
}
