pub mod gateway;
pub mod stripe;

pub use gateway::PaymentGateway;
pub use stripe::StripeClient;
