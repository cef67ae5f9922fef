// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! CRD YAML Generator
//!
//! Generates the Kubernetes CRD YAML for the `Gatekeeper` type defined in
//! src/crd.rs, keeping deploy/crds/ in sync with the Rust code.
//!
//! Usage:
//!   cargo run --bin crdgen

use gatekeeper_operator::crd::Gatekeeper;
use kube::CustomResourceExt;
use std::fs;
use std::path::Path;

const COPYRIGHT_HEADER: &str = "# Copyright (c) 2025 The Gatekeeper Operator Authors
# SPDX-License-Identifier: MIT
#
# This file is AUTO-GENERATED from src/crd.rs
# DO NOT EDIT MANUALLY - Run `cargo run --bin crdgen` to regenerate
#
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = Path::new("deploy/crds");
    fs::create_dir_all(output_dir)?;

    println!("Generating CRD YAML from src/crd.rs...");

    let crd = Gatekeeper::crd();
    let yaml = serde_yaml::to_string(&crd)?;
    let path = output_dir.join("gatekeepers.crd.yaml");
    fs::write(&path, format!("{COPYRIGHT_HEADER}{yaml}"))?;

    println!("✓ Wrote {}", path.display());
    Ok(())
}
