pub mod availability;
pub mod treatment;

pub use availability::compute_availability;
pub use treatment::TreatmentService;
