pub(crate) mod drain;
pub(crate) mod level;
pub(crate) mod migrate;
pub(crate) mod serve;
