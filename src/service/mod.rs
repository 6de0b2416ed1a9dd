pub(crate) mod base_url;
pub(crate) mod database;
pub(crate) mod dataset;
pub(crate) mod identity;
