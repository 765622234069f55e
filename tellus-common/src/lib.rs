/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 11/02/2024
Last Modified: 19/05/2025
License: MIT
*/
pub mod algorithms;
pub mod structures;
pub mod utils;
