//! Domain and wire types shared between the events client core and its front ends.

pub mod domain;
pub mod error;
pub mod protocol;
