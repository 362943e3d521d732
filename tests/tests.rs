mod api;
mod errors;
mod properties;
