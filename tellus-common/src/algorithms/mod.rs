/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 19/02/2024
Last Modified: 03/09/2024
License: MIT
*/
// private sub-modules defined in other files
mod ring_winding;

// exports identifiers from private sub-modules in the current module namespace
pub use self::ring_winding::{is_clockwise_order, ring_loop_sum};
