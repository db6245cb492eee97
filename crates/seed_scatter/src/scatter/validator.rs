//! Density and slope checks run before a species is committed to a surface point.
use crate::scatter::occupancy::OccupancyField;
use crate::scatter::species::Species;

/// Outcome of [`try_reserve`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reservation {
    Accepted,
    AlreadyOccupied,
    /// Surface angle is at or above the species limit.
    TooSteep,
    TooManyNeighbours {
        found: usize,
    },
    /// The index does not name a point in the field.
    UnknownPoint,
}

impl Reservation {
    #[inline]
    pub fn is_accepted(self) -> bool {
        matches!(self, Reservation::Accepted)
    }
}

/// Checks whether `species` may occupy the point at `index`.
///
/// Neighbours are occupied points strictly closer than
/// [`Species::closest_allowed_neighbour`]; the point is rejected only when their number
/// strictly exceeds [`Species::maximum_neighbours`]. The point itself is not marked:
/// the caller commits with [`OccupancyField::mark_occupied`] right after acceptance.
pub fn try_reserve(field: &OccupancyField, index: usize, species: &Species) -> Reservation {
    let Some(point) = field.get(index) else {
        return Reservation::UnknownPoint;
    };
    if point.occupied {
        return Reservation::AlreadyOccupied;
    }
    if point.angle >= species.max_angle {
        return Reservation::TooSteep;
    }

    let found = field.neighbours_within(point.position, species.closest_allowed_neighbour);
    if found > species.maximum_neighbours {
        return Reservation::TooManyNeighbours { found };
    }

    Reservation::Accepted
}
