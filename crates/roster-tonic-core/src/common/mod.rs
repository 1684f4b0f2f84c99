//! Items shared by every roster gRPC service.
//!
//! - [`proto`] - Generated message types, clients and servers.
//! - [`methods`] - Fully-qualified method paths and the default public set.
//! - [`error`] - Translation of domain errors to [`tonic::Status`].

pub mod error;
pub mod methods;

pub mod proto {
    pub mod auth {
        pub mod v1 {
            tonic::include_proto!("auth.v1");
        }
    }

    pub mod employee {
        pub mod v1 {
            tonic::include_proto!("employee.v1");
        }
    }

    pub mod salary {
        pub mod v1 {
            tonic::include_proto!("salary.v1");
        }
    }

    /// Encoded descriptors for all three packages, for gRPC reflection.
    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("roster_descriptor");
}
