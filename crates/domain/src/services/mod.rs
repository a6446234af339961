//! Domain services for the prize wheel.
//!
//! Services contain business logic that operates on domain models.

pub mod allow_list;
pub mod spin_gate;
pub mod store;
pub mod wheel;

pub use allow_list::{AllowListAdmin, AllowListError};
pub use spin_gate::{GatePolicy, SpinError, SpinGate};
pub use store::{InMemoryStore, StoreError, SubmissionStore};
pub use wheel::{Wheel, WheelError};
