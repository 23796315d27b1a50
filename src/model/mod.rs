//! Model module for the CNN architecture used by the production classifier
//!
//! The network is defined with Burn; trained weights are loaded from a
//! `CompactRecorder` file by [`BurnClassifier`](crate::inference::BurnClassifier).

pub mod cnn;

pub use cnn::{BlightNet, BlightNetConfig};
