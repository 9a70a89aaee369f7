use std::collections::HashSet;

use booking_cell::models::Booking;

use crate::models::Treatment;

/// Returns a copy of every treatment with the slots already taken by
/// `bookings` removed. `bookings` is expected to hold a single date.
///
/// Slot order is preserved and labels are compared exactly. Booked labels
/// that a treatment does not offer are ignored.
pub fn compute_availability(treatments: &[Treatment], bookings: &[Booking]) -> Vec<Treatment> {
    treatments
        .iter()
        .map(|treatment| {
            let booked: HashSet<&str> = bookings
                .iter()
                .filter(|booking| booking.treatment == treatment.name)
                .map(|booking| booking.slot.as_str())
                .collect();

            let slots = treatment
                .slots
                .iter()
                .filter(|slot| !booked.contains(slot.as_str()))
                .cloned()
                .collect();

            Treatment {
                slots,
                ..treatment.clone()
            }
        })
        .collect()
}
