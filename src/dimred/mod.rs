//! # Dimensionality Reduction
//!
//! Manifold learning by isometric feature mapping. High-dimensional points are
//! mapped to a few coordinates that preserve distances measured along the data
//! manifold rather than straight through the ambient space.
//!
//! ## Currently Available
//! - **ISOMAP** ([`isomap`]): neighbor graph, geodesic distances and classical MDS
//! - **Classical MDS** ([`mds`]): coordinates from any complete distance matrix
//!
//! ## Algorithm Selection Guide
//! - Use **ISOMAP** when the points lie on a curved, connected low-dimensional manifold
//! - Use **classical MDS** directly when a full matrix of meaningful distances is already known

pub mod isomap;
pub mod mds;
