pub mod zip_builder;

pub use zip_builder::{RingKeyGenerator, ZipPackageBuilder};
