//! View-side helpers over loaded transcripts

mod cluster;

pub use cluster::{cluster, ClusterPosition, ClusteredMessage};
