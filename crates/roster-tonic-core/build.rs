//! Compiles the `auth.v1`, `employee.v1` and `salary.v1` protobuf packages
//! into tonic client and server bindings.
//!
//! A file descriptor set is written next to the generated code so the server
//! can expose the services through gRPC reflection.
//!
//! # Panics
//!
//! Panics if `OUT_DIR` is unset or code generation fails.

use std::{env, path::PathBuf};

const PROTOS: &[&str] = &[
    "proto/auth/v1/auth.proto",
    "proto/employee/v1/employee.proto",
    "proto/salary/v1/salary.proto",
];

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("roster_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    for proto in PROTOS {
        println!("cargo:rerun-if-changed={proto}");
    }

    tonic_prost_build::configure()
        .compile_with_config(config, PROTOS, &["proto"])
        .unwrap();
}
