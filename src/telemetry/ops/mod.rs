pub mod rules;
pub mod addresses;
pub mod routing;
