use crate::models::{AppointmentAction, AppointmentStatus, BookingError};

/// The status transition table. Any (state, action) pair not listed here is
/// rejected, including re-running an action that already applied.
pub fn next_status(
    current: AppointmentStatus,
    action: AppointmentAction,
) -> Result<AppointmentStatus, BookingError> {
    use AppointmentAction::*;
    use AppointmentStatus::*;

    match (current, action) {
        (Pending, Confirm) => Ok(Confirmed),
        (Pending, Cancel) | (Confirmed, Cancel) => Ok(Cancelled),
        (Confirmed, Complete) => Ok(Completed),
        _ => Err(BookingError::InvalidTransition {
            from: current,
            action,
        }),
    }
}
