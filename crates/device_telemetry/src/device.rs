mod host_snapshot_source;

pub use host_snapshot_source::*;
