//! SSR Screen - Polymorphic SSR Marker Discovery
//!
//! Finds short tandem repeats in genome assemblies, annotates them, designs
//! flanking primers and keeps the markers whose primers amplify more than
//! one product size in silico.

pub mod analysis;

pub use analysis::*;
