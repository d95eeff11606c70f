pub mod clock;
pub mod quota;

pub use clock::{Clock, ManualClock, SystemClock};
pub use quota::{estimate_tokens, Admission, QuotaDimension, QuotaLimits, QuotaSnapshot, QuotaTracker};
