pub mod grpc;
pub mod traits;

pub use grpc::{ClientError, GrpcAuthClient, TransportMode};
pub use traits::AuthApi;
