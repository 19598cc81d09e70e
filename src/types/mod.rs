// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource kinds managed by the k8ssandra chart.

pub mod backup;
pub mod datacenter;

pub use backup::{CassandraBackup, CassandraBackupSpec};
pub use datacenter::{CassandraDatacenter, CassandraDatacenterSpec};
