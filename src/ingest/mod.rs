/// Upstream data sources.
///
/// Each API gets its own file; today that is only the Environment Agency
/// flood-monitoring measure.
pub mod ea;

#[cfg(test)]
pub(crate) mod fixtures;
