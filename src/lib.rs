pub mod client;
pub mod identity;
pub mod report;
pub mod runner;
pub mod utils;

/// Generated messages and client stub for the authentication service
/// contract (proto/auth.proto)
pub mod proto {
    tonic::include_proto!("auth.v1");
}

// Re-export common items
pub use report::generate_report;
pub use runner::run_load_test;
