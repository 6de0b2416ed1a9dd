pub(crate) mod locale;
pub(crate) mod master_data;
pub(crate) mod service_radius;
