//! clusterplot-io: Columnar cluster table I/O.
//!
//! This crate reads per-event cluster records chunk by chunk through the
//! [`ClusterTable`] trait. Tables are stored in HDF5 files (feature `hdf5`,
//! enabled by default) or held in memory with [`MemoryTable`].
//!

mod error;
#[cfg(feature = "hdf5")]
pub mod hdf5;
mod table;

pub use error::{Error, Result};
#[cfg(feature = "hdf5")]
pub use crate::hdf5::{
    write_cluster_tree, ClusterFile, ClusterTreeWriter, Hdf5ClusterTable, TableLocation,
    WriteOptions,
};
pub use table::{ClusterTable, EventChunks, MemoryTable};
