/*
This code is part of the Tellus geospatial data access library.
Authors: The Tellus Project Developers
Created: 11/02/2024
Last Modified: 27/08/2024
License: MIT
*/
// private sub-modules defined in other files
mod byte_order_reader;
mod progress;

// exports identifiers from private sub-modules in the current module namespace
pub use self::byte_order_reader::{ByteOrderReader, Endianness};
pub use self::progress::{ProgressHandler, SilentProgress};
