//! editing of transit pattern geometries: the control points and segments that make up a
//! pattern shape, and the stops placed along it.
pub mod algorithm;
pub mod app;
pub mod config;
pub mod editor;
pub mod geometry;
pub mod model;
pub mod routing;

#[cfg(test)]
mod test_support;
